//! Graph module: an arena of signal nodes forming a DAG.
//!
//! Nodes live in a `Vec` and refer to their children by [`NodeId`]. A child
//! must exist before any node that uses it, so every child id is strictly
//! lower than its parent's id and the arena is acyclic by construction. The
//! same child may be listed by many parents; it is still a single node with a
//! single generation counter.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use crate::invariant_ppt::{assert_invariant, GRAPH_ACYCLIC, GRAPH_ARITY};
use crate::node::{NodeDef, NodeDefDyn};
use crate::states::NodeState;
use crate::units::UnitError;
use crate::waveform::Waveform;
use std::sync::Arc;
use thiserror::Error;

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Types of nodes in the signal graph.
///
/// Child order matters: oscillators take `[frequency]` (plus `duty_cycle`
/// for pulses), sample-and-hold takes `[frequency, input]`.
#[non_exhaustive]
#[derive(Clone)]
pub enum NodeType {
    /// Always outputs `value`.
    Constant {
        /// The output value.
        value: f64,
    },
    /// Uniform noise in (-1, 1), deterministic for a given seed.
    Noise {
        /// RNG seed, reapplied on every reset.
        seed: u64,
    },
    /// Phase-accumulating oscillator.
    Oscillator {
        /// Mapping from phase to amplitude.
        shape: Waveform,
    },
    /// Samples its input whenever its own phase wraps, holds it otherwise.
    SampleAndHold,
    /// Sum of two children.
    Sum,
    /// Product of two children.
    Product,
    /// Negation of one child.
    Complement,
    /// External node implemented via the NodeDef trait.
    External {
        /// The node definition.
        def: Arc<dyn NodeDefDyn>,
    },
}

impl std::fmt::Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Constant { value } => write!(f, "Constant({value})"),
            NodeType::Noise { seed } => write!(f, "Noise(seed={seed})"),
            NodeType::Oscillator { shape } => write!(f, "Oscillator({shape:?})"),
            NodeType::SampleAndHold => write!(f, "SampleAndHold"),
            NodeType::Sum => write!(f, "Sum"),
            NodeType::Product => write!(f, "Product"),
            NodeType::Complement => write!(f, "Complement"),
            NodeType::External { def } => write!(f, "External({})", def.name()),
        }
    }
}

impl NodeType {
    /// Number of children this node type requires.
    pub fn arity(&self) -> usize {
        match self {
            NodeType::Constant { .. } | NodeType::Noise { .. } => 0,
            NodeType::Oscillator { shape } => shape.arity(),
            NodeType::SampleAndHold | NodeType::Sum | NodeType::Product => 2,
            NodeType::Complement => 1,
            NodeType::External { def } => def.arity(),
        }
    }

    /// Short name for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Constant { .. } => "Constant",
            NodeType::Noise { .. } => "Noise",
            NodeType::Oscillator { .. } => "Oscillator",
            NodeType::SampleAndHold => "SampleAndHold",
            NodeType::Sum => "Sum",
            NodeType::Product => "Product",
            NodeType::Complement => "Complement",
            NodeType::External { def } => def.name(),
        }
    }

    fn validate(&self) -> Result<(), GraphError> {
        if let NodeType::Oscillator {
            shape: Waveform::Piecewise(values) | Waveform::PiecewiseLinear(values),
        } = self
        {
            if values.is_empty() {
                return Err(GraphError::EmptyValues);
            }
        }
        Ok(())
    }
}

/// A node in the graph.
#[derive(Debug)]
pub struct NodeData {
    /// The unique ID of this node.
    pub id: NodeId,
    /// The type of this node.
    pub node_type: NodeType,
    /// Ordered children; every id is lower than `id`.
    pub children: Vec<NodeId>,
    pub(crate) output: Option<f64>,
    pub(crate) generation: u64,
    pub(crate) state: NodeState,
    pub(crate) parents: usize,
}

impl NodeData {
    /// Output of the most recent advance; `None` when not yet computed or
    /// when an input had no value.
    pub fn output(&self) -> Option<f64> {
        self.output
    }

    /// Number of times this node has been advanced since the last reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of parent edges pointing at this node.
    pub fn parent_count(&self) -> usize {
        self.parents
    }
}

/// The signal graph: an arena of nodes.
#[derive(Debug, Default)]
pub struct Graph {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) scratch: Vec<Option<f64>>,
    pub(crate) stack: Vec<(NodeId, usize)>,
}

/// Errors that can occur when building or driving the graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Node does not exist.
    #[error("node {0:?} does not exist")]
    InvalidNode(NodeId),
    /// Wrong number of children for the node type.
    #[error("{kind} takes {expected} children, got {found}")]
    ArityMismatch {
        /// Node type name.
        kind: &'static str,
        /// Required child count.
        expected: usize,
        /// Supplied child count.
        found: usize,
    },
    /// Piecewise oscillator with no values.
    #[error("piecewise waveform needs at least one value")]
    EmptyValues,
    /// Only nodes without parents may be advanced or exported.
    #[error("node {0:?} has parents and cannot be driven directly")]
    NotARoot(NodeId),
    /// A shared child was reset or advanced through another root and no
    /// longer matches this root's tick count.
    #[error("node {0:?} is out of step with the root being advanced")]
    Desync(NodeId),
    /// Unit arithmetic failed while building a node.
    #[error(transparent)]
    Unit(#[from] UnitError),
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node whose children already exist in this graph.
    pub fn add_node(
        &mut self,
        node_type: NodeType,
        children: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let id = NodeId(self.nodes.len());
        if children.len() != node_type.arity() {
            return Err(GraphError::ArityMismatch {
                kind: node_type.name(),
                expected: node_type.arity(),
                found: children.len(),
            });
        }
        node_type.validate()?;
        if let Some(&missing) = children.iter().find(|c| c.0 >= id.0) {
            return Err(GraphError::InvalidNode(missing));
        }
        assert_invariant(
            GRAPH_ACYCLIC,
            children.iter().all(|c| *c < id),
            "Children precede their parent",
            Some("add_node"),
        );
        assert_invariant(
            GRAPH_ARITY,
            children.len() == node_type.arity(),
            "Child count matches node type",
            Some("add_node"),
        );

        for child in children {
            self.nodes[child.0].parents += 1;
        }
        let state = NodeState::for_type(&node_type);
        self.nodes.push(NodeData {
            id,
            node_type,
            children: children.to_vec(),
            output: None,
            generation: 0,
            state,
            parents: 0,
        });
        Ok(id)
    }

    /// Add an external node defined via NodeDef.
    pub fn add_external_node<T: NodeDef>(
        &mut self,
        def: T,
        children: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        self.add_node(NodeType::External { def: Arc::new(def) }, children)
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes.get(id.0).ok_or(GraphError::InvalidNode(id))
    }

    /// Output of a node after the last advance.
    pub fn output(&self, id: NodeId) -> Result<Option<f64>, GraphError> {
        self.node(id).map(NodeData::output)
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.nodes.iter()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fails unless `id` exists and has no parents.
    pub fn check_root(&self, id: NodeId) -> Result<(), GraphError> {
        if self.node(id)?.parents > 0 {
            return Err(GraphError::NotARoot(id));
        }
        Ok(())
    }
}

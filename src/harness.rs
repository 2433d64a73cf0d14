//! Tick audit harness: drives a graph and checks generation bookkeeping.

use crate::dsl::{Patch, Signal};
use crate::graph::{Graph, GraphError, NodeId};
use crate::invariant_ppt::{assert_invariant, TICK_SINGLE_ADVANCE};
use crate::plan::Plan;
use crate::units::Frequency;

/// Runs a graph tick by tick and records the root's outputs.
pub struct TickHarness {
    graph: Graph,
    plan: Plan,
    sample_rate: Frequency,
    ticks: u64,
    pub outputs: Vec<Option<f64>>,
}

impl TickHarness {
    /// Take ownership of `graph` and reset it from `root`.
    pub fn new(mut graph: Graph, root: NodeId, sample_rate: Frequency) -> Result<Self, GraphError> {
        graph.check_root(root)?;
        graph.reset(root)?;
        let plan = Plan::compile(&graph, root)?;
        Ok(Self {
            graph,
            plan,
            sample_rate,
            ticks: 0,
            outputs: Vec::new(),
        })
    }

    /// Compile a signal and wrap it.
    pub fn from_signal(signal: &Signal, sample_rate: Frequency) -> Result<Self, GraphError> {
        let patch = Patch::compile(signal)?;
        let root = patch.root();
        Self::new(patch.into_graph(), root, sample_rate)
    }

    /// Advance one sample.
    pub fn tick(&mut self) -> Result<Option<f64>, GraphError> {
        let out = self.graph.advance(self.plan.root, self.sample_rate)?;
        self.ticks += 1;
        self.outputs.push(out);
        Ok(out)
    }

    /// Advance `count` samples, asserting after each that every reachable
    /// node was advanced exactly once.
    pub fn run(&mut self, count: usize) -> Result<(), GraphError> {
        for _ in 0..count {
            self.tick()?;
            assert_invariant(
                TICK_SINGLE_ADVANCE,
                self.desynced().is_empty(),
                "Every reachable node advanced once this tick",
                Some("TickHarness::run"),
            );
        }
        Ok(())
    }

    /// Reachable nodes whose generation differs from the tick count.
    pub fn desynced(&self) -> Vec<NodeId> {
        self.plan
            .order
            .iter()
            .copied()
            .filter(|id| self.graph.nodes[id.0].generation != self.ticks)
            .collect()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Reset and clear recorded outputs.
    pub fn reset(&mut self) -> Result<(), GraphError> {
        self.graph.reset(self.plan.root)?;
        self.ticks = 0;
        self.outputs.clear();
        Ok(())
    }
}

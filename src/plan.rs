//! Plan module: the part of a graph reachable from one root.

use crate::graph::{Graph, GraphError, NodeId};
use crate::invariant_ppt::{assert_invariant, PLAN_REACHABLE_ONCE};

/// Nodes reachable from a root, children before parents, each listed once.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub root: NodeId,
    pub order: Vec<NodeId>,
    /// Parent edges per node, counted only among reachable parents.
    /// Indexed by `NodeId.0`; zero for unreachable nodes.
    pub fan_in: Vec<usize>,
}

impl Plan {
    /// Walk the graph from `root`.
    pub fn compile(graph: &Graph, root: NodeId) -> Result<Self, GraphError> {
        graph.node(root)?;
        let order = post_order(graph, root);

        let mut fan_in = vec![0; graph.len()];
        for &id in &order {
            for child in &graph.nodes[id.0].children {
                fan_in[child.0] += 1;
            }
        }

        let mut seen = vec![false; graph.len()];
        let unique = order.iter().all(|id| !std::mem::replace(&mut seen[id.0], true));
        assert_invariant(
            PLAN_REACHABLE_ONCE,
            unique && order.last() == Some(&root),
            "Each reachable node appears once, root last",
            Some("Plan::compile"),
        );

        Ok(Self {
            root,
            order,
            fan_in,
        })
    }

    /// Nodes with more than one reachable parent edge.
    pub fn shared(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|id| self.fan_in[id.0] > 1)
    }

    /// Whether `id` is reachable from the root.
    pub fn contains(&self, id: NodeId) -> bool {
        self.order.contains(&id)
    }
}

/// Depth-first post-order without recursion.
fn post_order(graph: &Graph, root: NodeId) -> Vec<NodeId> {
    let mut visited = vec![false; graph.len()];
    let mut order = Vec::new();
    let mut stack = vec![(root, 0usize)];
    visited[root.0] = true;

    while let Some(frame) = stack.last_mut() {
        let (id, cursor) = *frame;
        if let Some(&child) = graph.nodes[id.0].children.get(cursor) {
            frame.1 += 1;
            if !visited[child.0] {
                visited[child.0] = true;
                stack.push((child, 0));
            }
        } else {
            stack.pop();
            order.push(id);
        }
    }
    order
}

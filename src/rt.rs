//! RT module: per-sample evaluation of a graph.
//!
//! Each call to [`Graph::advance`] produces one sample at the root. A child
//! is advanced only while its generation equals its parent's generation
//! before the parent increments; the first parent to reach a shared child in
//! a tick advances it and every later parent sees it already ahead. Every
//! reachable node is therefore advanced exactly once per tick, without a
//! per-tick visited set, as long as nodes are only ever driven from a root.

// IMPORTANT: Do not call assert_invariant in advance(); it runs once per sample.

use crate::graph::{Graph, GraphError, NodeId, NodeType};
use crate::invariant_ppt::{assert_invariant, RESET_COMPLETE};
use crate::plan::Plan;
use crate::states::NodeState;
use crate::units::Frequency;
use crate::waveform::advance_phase;
use rand::distributions::Open01;
use rand::Rng;

impl Graph {
    /// Reset every node reachable from `root`, each exactly once: generation
    /// back to zero, output cleared, state rebuilt.
    pub fn reset(&mut self, root: NodeId) -> Result<(), GraphError> {
        let plan = Plan::compile(self, root)?;
        for id in &plan.order {
            let node = &mut self.nodes[id.0];
            node.generation = 0;
            node.output = None;
            node.state.reset(&node.node_type);
        }
        assert_invariant(
            RESET_COMPLETE,
            plan.order.iter().all(|id| self.nodes[id.0].generation == 0),
            "All reachable generations are zero after reset",
            Some("Graph::reset"),
        );
        Ok(())
    }

    /// Advance the graph by one sample and return the root's output.
    ///
    /// `root` must have no parents; inner nodes are only advanced through
    /// their ancestors. When several roots share a child they must be reset
    /// and advanced in lockstep; a child found out of step fails with
    /// [`GraphError::Desync`] and the graph needs a reset before further use.
    pub fn advance(
        &mut self,
        root: NodeId,
        sample_rate: Frequency,
    ) -> Result<Option<f64>, GraphError> {
        self.check_root(root)?;
        self.stack.clear();
        self.stack.push((root, 0));

        while let Some(frame) = self.stack.last_mut() {
            let (id, cursor) = *frame;
            let node = &self.nodes[id.0];
            if let Some(&child) = node.children.get(cursor) {
                frame.1 += 1;
                let behind = self.nodes[child.0].generation;
                if behind == node.generation {
                    self.stack.push((child, 0));
                } else if behind != node.generation + 1 {
                    // Another root reset or outran this shared child.
                    return Err(GraphError::Desync(child));
                }
                continue;
            }
            self.stack.pop();
            self.step_node(id, sample_rate);
        }

        Ok(self.nodes[root.0].output)
    }

    /// Increment the node's generation and compute its output from its
    /// children's current outputs.
    fn step_node(&mut self, id: NodeId, sample_rate: Frequency) {
        // Children always have lower ids, so they sit entirely in `before`.
        let (before, rest) = self.nodes.split_at_mut(id.0);
        let node = &mut rest[0];
        node.generation += 1;

        self.scratch.clear();
        self.scratch
            .extend(node.children.iter().map(|child| before[child.0].output));
        node.output = compute_sample(
            &node.node_type,
            &mut node.state,
            &self.scratch,
            sample_rate,
        );
    }
}

fn input(inputs: &[Option<f64>], index: usize) -> Option<f64> {
    inputs.get(index).copied().flatten()
}

/// One sample for a node, given its children's outputs for this tick.
/// Returns `None` when a required input is `None`.
pub(crate) fn compute_sample(
    node_type: &NodeType,
    state: &mut NodeState,
    inputs: &[Option<f64>],
    sample_rate: Frequency,
) -> Option<f64> {
    match (node_type, state) {
        (NodeType::Constant { value }, _) => Some(*value),
        (NodeType::Noise { .. }, NodeState::Noise { rng }) => {
            let unit: f64 = rng.sample(Open01);
            Some(unit * 2.0 - 1.0)
        }
        (NodeType::Oscillator { shape }, NodeState::Oscillator { phase }) => {
            let frequency = input(inputs, 0)?;
            let amplitude = shape.phase_to_amplitude(*phase, input(inputs, 1))?;
            *phase = advance_phase(*phase, frequency, sample_rate);
            Some(amplitude)
        }
        (NodeType::SampleAndHold, NodeState::SampleAndHold { phase, held }) => {
            let frequency = input(inputs, 0)?;
            let previous = *phase;
            *phase = advance_phase(previous, frequency, sample_rate);
            if *phase < previous {
                *held = input(inputs, 1)?;
            }
            Some(*held)
        }
        (NodeType::Sum, _) => Some(input(inputs, 0)? + input(inputs, 1)?),
        (NodeType::Product, _) => Some(input(inputs, 0)? * input(inputs, 1)?),
        (NodeType::Complement, _) => Some(-input(inputs, 0)?),
        (NodeType::External { def }, NodeState::External { state }) => {
            def.compute_sample(state.as_mut(), inputs, sample_rate)
        }
        // State is built from the node type, so the pairs above are exhaustive.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitExt;
    use crate::node::NodeDef;
    use crate::waveform::Waveform;
    use std::ops::Range;

    /// Passes its input through except on the ticks in `closed`, counted
    /// from one.
    struct Gate {
        closed: Range<u32>,
    }

    impl NodeDef for Gate {
        type State = u32;

        fn arity(&self) -> usize {
            1
        }

        fn init_state(&self) -> u32 {
            0
        }

        fn compute_sample(&self, tick: &mut u32, inputs: &[Option<f64>], _: Frequency) -> Option<f64> {
            *tick += 1;
            if self.closed.contains(&*tick) {
                None
            } else {
                inputs[0]
            }
        }
    }

    fn osc(graph: &mut Graph, shape: Waveform, hz: f64) -> NodeId {
        let freq = graph.add_node(NodeType::Constant { value: hz }, &[]).unwrap();
        graph
            .add_node(NodeType::Oscillator { shape }, &[freq])
            .unwrap()
    }

    #[test]
    fn rt_shared_child_advances_once_per_tick() {
        let mut graph = Graph::new();
        let saw = osc(&mut graph, Waveform::Sawtooth, 1.0);
        let sum = graph.add_node(NodeType::Sum, &[saw, saw]).unwrap();
        graph.reset(sum).unwrap();
        let rate = 4.0.hz();
        let outputs: Vec<_> = (0..4)
            .map(|_| graph.advance(sum, rate).unwrap().unwrap())
            .collect();
        // Sawtooth at phases 0, .25, .5, .75 doubled.
        assert_eq!(outputs, vec![2.0, 1.0, 0.0, -1.0]);
        assert_eq!(graph.node(saw).unwrap().generation(), 4);
        assert_eq!(graph.node(sum).unwrap().generation(), 4);
    }

    #[test]
    fn rt_rejects_inner_node() {
        let mut graph = Graph::new();
        let saw = osc(&mut graph, Waveform::Sawtooth, 1.0);
        let _neg = graph.add_node(NodeType::Complement, &[saw]).unwrap();
        assert_eq!(
            graph.advance(saw, 44100.0.hz()),
            Err(GraphError::NotARoot(saw))
        );
    }

    #[test]
    fn rt_reset_restores_initial_phase() {
        let mut graph = Graph::new();
        let sine = osc(&mut graph, Waveform::Sine, 440.0);
        let rate = 44100.0.hz();
        graph.reset(sine).unwrap();
        let first: Vec<_> = (0..32).map(|_| graph.advance(sine, rate).unwrap()).collect();
        graph.reset(sine).unwrap();
        let second: Vec<_> = (0..32).map(|_| graph.advance(sine, rate).unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(graph.node(sine).unwrap().generation(), 32);
    }

    #[test]
    fn rt_combinators_propagate_none() {
        let mut state = NodeState::Stateless;
        assert_eq!(
            compute_sample(&NodeType::Sum, &mut state, &[Some(1.0), None], 8.0.hz()),
            None
        );
        assert_eq!(
            compute_sample(&NodeType::Product, &mut state, &[None, Some(2.0)], 8.0.hz()),
            None
        );
        assert_eq!(
            compute_sample(&NodeType::Complement, &mut state, &[Some(0.5)], 8.0.hz()),
            Some(-0.5)
        );
    }

    #[test]
    fn rt_pulse_keeps_phase_while_duty_cycle_missing() {
        let mut graph = Graph::new();
        let freq = graph.add_node(NodeType::Constant { value: 1.0 }, &[]).unwrap();
        let duty = graph.add_node(NodeType::Constant { value: 0.3 }, &[]).unwrap();
        let gated = graph.add_external_node(Gate { closed: 2..4 }, &[duty]).unwrap();
        let pulse = graph
            .add_node(
                NodeType::Oscillator {
                    shape: Waveform::Pulse,
                },
                &[freq, gated],
            )
            .unwrap();
        graph.reset(pulse).unwrap();
        let rate = 4.0.hz();
        let outputs: Vec<_> = (0..5).map(|_| graph.advance(pulse, rate).unwrap()).collect();
        // Phase sits at .25 through the two missing ticks, so tick four is
        // still high; an advancing phase would have reached .75 and gone low.
        assert_eq!(
            outputs,
            vec![Some(1.0), None, None, Some(1.0), Some(-1.0)]
        );
    }

    #[test]
    fn rt_sample_and_hold_without_input_on_wrap() {
        let mut graph = Graph::new();
        let freq = graph.add_node(NodeType::Constant { value: 1.0 }, &[]).unwrap();
        let level = graph.add_node(NodeType::Constant { value: 0.5 }, &[]).unwrap();
        let gated = graph.add_external_node(Gate { closed: 4..5 }, &[level]).unwrap();
        let hold = graph.add_node(NodeType::SampleAndHold, &[freq, gated]).unwrap();
        graph.reset(hold).unwrap();
        let rate = 4.0.hz();
        let outputs: Vec<_> = (0..8).map(|_| graph.advance(hold, rate).unwrap()).collect();
        assert_eq!(
            outputs,
            vec![
                Some(0.0),
                Some(0.0),
                Some(0.0),
                None,
                Some(0.0),
                Some(0.0),
                Some(0.0),
                Some(0.5)
            ]
        );
    }


    #[test]
    fn rt_sample_and_hold_latches_on_wrap() {
        let mut graph = Graph::new();
        let freq = graph.add_node(NodeType::Constant { value: 1.0 }, &[]).unwrap();
        let ramp = osc(&mut graph, Waveform::Sawtooth, 1.0);
        let hold = graph.add_node(NodeType::SampleAndHold, &[freq, ramp]).unwrap();
        graph.reset(hold).unwrap();
        let rate = 4.0.hz();
        let outputs: Vec<_> = (0..6)
            .map(|_| graph.advance(hold, rate).unwrap().unwrap())
            .collect();
        // Holds 0 until the fourth tick wraps and captures the ramp's
        // sample at phase .75.
        assert_eq!(outputs, vec![0.0, 0.0, 0.0, -0.5, -0.5, -0.5]);
    }
}

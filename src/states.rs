//! Node state definitions for the evaluation engine.

use crate::graph::NodeType;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::any::Any;

/// Mutable per-node state, rebuilt from the node's type on every reset.
#[derive(Debug)]
pub enum NodeState {
    /// Constants and combinators.
    Stateless,
    /// Phase-accumulating oscillator.
    Oscillator {
        /// Current phase in [0, 1).
        phase: f64,
    },
    /// Sample-and-hold: its own phase plus the last sampled input.
    SampleAndHold {
        /// Current phase in [0, 1).
        phase: f64,
        /// Value captured at the last phase wrap.
        held: f64,
    },
    /// Noise source, re-seeded on reset.
    Noise {
        /// Generator for this node only.
        rng: StdRng,
    },
    /// External node with type-erased state.
    External {
        /// The node's runtime state.
        state: Box<dyn Any + Send>,
    },
}

impl NodeState {
    /// Initial state for a node of the given type.
    pub fn for_type(node_type: &NodeType) -> Self {
        match node_type {
            NodeType::Oscillator { .. } => NodeState::Oscillator { phase: 0.0 },
            NodeType::SampleAndHold => NodeState::SampleAndHold {
                phase: 0.0,
                held: 0.0,
            },
            NodeType::Noise { seed } => NodeState::Noise {
                rng: StdRng::seed_from_u64(*seed),
            },
            NodeType::External { def } => NodeState::External {
                state: def.init_state(),
            },
            NodeType::Constant { .. }
            | NodeType::Sum
            | NodeType::Product
            | NodeType::Complement => NodeState::Stateless,
        }
    }

    /// Restore the initial state.
    pub fn reset(&mut self, node_type: &NodeType) {
        *self = Self::for_type(node_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::Waveform;

    #[test]
    fn reset_zeroes_phase() {
        let node_type = NodeType::Oscillator {
            shape: Waveform::Sine,
        };
        let mut state = NodeState::for_type(&node_type);
        if let NodeState::Oscillator { phase } = &mut state {
            *phase = 0.75;
        }
        state.reset(&node_type);
        assert!(matches!(state, NodeState::Oscillator { phase } if phase == 0.0));
    }

    #[test]
    fn combinators_carry_no_state() {
        assert!(matches!(NodeState::for_type(&NodeType::Sum), NodeState::Stateless));
        assert!(matches!(
            NodeState::for_type(&NodeType::Constant { value: 1.0 }),
            NodeState::Stateless
        ));
    }
}

//! Trait-based node definitions for user-supplied generators.

#![forbid(unsafe_code)]

use crate::units::Frequency;
use std::any::Any;

/// Object-safe node definition, stored behind `Arc` in the graph.
pub trait NodeDefDyn: Send + Sync {
    fn name(&self) -> &'static str;
    fn arity(&self) -> usize;
    fn init_state(&self) -> Box<dyn Any + Send>;
    fn compute_sample(
        &self,
        state: &mut dyn Any,
        inputs: &[Option<f64>],
        sample_rate: Frequency,
    ) -> Option<f64>;
}

/// Generic node definition; implement this for custom nodes.
///
/// `inputs` holds this tick's outputs of the node's children, in order. A
/// `None` input means that child had no value this tick; most nodes should
/// propagate it by returning `None`.
pub trait NodeDef: Send + Sync + 'static {
    type State: Send + 'static;
    fn name(&self) -> &'static str {
        "External"
    }
    fn arity(&self) -> usize;
    /// Fresh state; also used on every reset.
    fn init_state(&self) -> Self::State;
    fn compute_sample(
        &self,
        state: &mut Self::State,
        inputs: &[Option<f64>],
        sample_rate: Frequency,
    ) -> Option<f64>;
}

impl<T: NodeDef> NodeDefDyn for T {
    fn name(&self) -> &'static str {
        <T as NodeDef>::name(self)
    }

    fn arity(&self) -> usize {
        <T as NodeDef>::arity(self)
    }

    fn init_state(&self) -> Box<dyn Any + Send> {
        Box::new(<T as NodeDef>::init_state(self))
    }

    fn compute_sample(
        &self,
        state: &mut dyn Any,
        inputs: &[Option<f64>],
        sample_rate: Frequency,
    ) -> Option<f64> {
        // State is always built by this definition's init_state, so a failed
        // downcast means the slot was wired to the wrong node.
        let typed = state.downcast_mut::<<T as NodeDef>::State>()?;
        <T as NodeDef>::compute_sample(self, typed, inputs, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitExt;

    struct Counter;

    impl NodeDef for Counter {
        type State = u32;
        fn arity(&self) -> usize {
            0
        }
        fn init_state(&self) -> u32 {
            0
        }
        fn compute_sample(&self, state: &mut u32, _: &[Option<f64>], _: Frequency) -> Option<f64> {
            *state += 1;
            Some(f64::from(*state))
        }
    }

    #[test]
    fn dyn_dispatch_uses_typed_state() {
        let def: &dyn NodeDefDyn = &Counter;
        let mut state = def.init_state();
        assert_eq!(def.compute_sample(state.as_mut(), &[], 1.0.hz()), Some(1.0));
        assert_eq!(def.compute_sample(state.as_mut(), &[], 1.0.hz()), Some(2.0));
        assert_eq!(def.name(), "External");
    }

    #[test]
    fn mismatched_state_yields_no_sample() {
        let def: &dyn NodeDefDyn = &Counter;
        let mut wrong: Box<dyn Any + Send> = Box::new("not a counter");
        assert_eq!(def.compute_sample(wrong.as_mut(), &[], 1.0.hz()), None);
    }
}

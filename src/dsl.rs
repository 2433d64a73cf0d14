//! DSL module: composable signal expressions that compile into a graph.
//!
//! A [`Signal`] is an immutable, reference-counted description of a node and
//! its inputs. Cloning a `Signal` and using it in several places shares it:
//! [`Patch::compile`] interns each distinct `Signal` once, so a cloned
//! modulator becomes a single graph node with several parents.
//!
//! ```
//! use tonegraph::dsl::{sawtooth, sine, Patch};
//! use tonegraph::units::UnitExt;
//!
//! let vibrato = 440.0.hz() + 100.0 * sine(1.0.hz());
//! let voice = 0.5 * sawtooth(vibrato);
//! let mut patch = Patch::compile(&voice).unwrap();
//! let samples: Vec<f64> = patch.samples(8000.0.hz(), 0.01.sec()).unwrap().collect();
//! assert_eq!(samples.len(), 80);
//! ```

use crate::graph::{Graph, GraphError, NodeId, NodeType};
use crate::invariant_ppt::{assert_invariant, PATCH_SHARES_IDENTICAL};
use crate::node::NodeDef;
use crate::sequence::{ExportError, RenderConfig, SampleSequence};
use crate::units::{Dimension, Duration, Frequency, Quantity, Scalar};
use crate::waveform::Waveform;
use crate::wav;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;
use std::sync::Arc;

/// Seed used by [`noise`].
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_0F_401CE;

/// A node expression. Cheap to clone; clones share identity.
#[derive(Clone)]
pub struct Signal(Rc<SignalDef>);

struct SignalDef {
    node_type: NodeType,
    inputs: Vec<Signal>,
}

impl Signal {
    fn node(node_type: NodeType, inputs: Vec<Signal>) -> Self {
        Signal(Rc::new(SignalDef { node_type, inputs }))
    }

    /// The node type this expression compiles to.
    pub fn node_type(&self) -> &NodeType {
        &self.0.node_type
    }

    /// Input expressions, in child order.
    pub fn inputs(&self) -> &[Signal] {
        &self.0.inputs
    }

    /// Whether both handles refer to the same node.
    pub fn same_node(&self, other: &Signal) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inputs().is_empty() {
            write!(f, "{:?}", self.node_type())
        } else {
            f.debug_tuple(&format!("{:?}", self.node_type()))
                .field(&self.inputs())
                .finish()
        }
    }
}

impl From<f64> for Signal {
    fn from(value: f64) -> Self {
        constant(value)
    }
}

impl<D: Dimension> From<Quantity<D>> for Signal {
    fn from(value: Quantity<D>) -> Self {
        constant(value)
    }
}

impl From<&Signal> for Signal {
    fn from(signal: &Signal) -> Self {
        signal.clone()
    }
}

/// Always outputs `value`.
pub fn constant(value: impl Scalar) -> Signal {
    Signal::node(
        NodeType::Constant {
            value: value.value(),
        },
        Vec::new(),
    )
}

/// Uniform noise in (-1, 1) with the default seed.
pub fn noise() -> Signal {
    noise_seeded(DEFAULT_NOISE_SEED)
}

/// Uniform noise in (-1, 1); identical seeds give identical streams.
pub fn noise_seeded(seed: u64) -> Signal {
    Signal::node(NodeType::Noise { seed }, Vec::new())
}

fn oscillator(shape: Waveform, frequency: impl Into<Signal>) -> Signal {
    Signal::node(NodeType::Oscillator { shape }, vec![frequency.into()])
}

pub fn sine(frequency: impl Into<Signal>) -> Signal {
    oscillator(Waveform::Sine, frequency)
}

pub fn sawtooth(frequency: impl Into<Signal>) -> Signal {
    oscillator(Waveform::Sawtooth, frequency)
}

pub fn triangle(frequency: impl Into<Signal>) -> Signal {
    oscillator(Waveform::Triangle, frequency)
}

/// +1 while phase ≤ duty cycle, -1 after.
pub fn pulse(frequency: impl Into<Signal>, duty_cycle: impl Into<Signal>) -> Signal {
    Signal::node(
        NodeType::Oscillator {
            shape: Waveform::Pulse,
        },
        vec![frequency.into(), duty_cycle.into()],
    )
}

/// Pulse with a duty cycle of one half.
pub fn square(frequency: impl Into<Signal>) -> Signal {
    pulse(frequency, 0.5)
}

/// Periodic waveform given by a function of phase in [0, 1).
pub fn function_wave<F>(frequency: impl Into<Signal>, function: F) -> Signal
where
    F: Fn(f64) -> f64 + Send + Sync + 'static,
{
    oscillator(Waveform::Function(Arc::new(function)), frequency)
}

fn collect_values<S: Scalar>(values: impl IntoIterator<Item = S>) -> Result<Arc<[f64]>, GraphError> {
    let values: Arc<[f64]> = values.into_iter().map(|v| v.value()).collect();
    if values.is_empty() {
        return Err(GraphError::EmptyValues);
    }
    Ok(values)
}

/// Steps through `values` once per period.
pub fn piecewise<S: Scalar>(
    frequency: impl Into<Signal>,
    values: impl IntoIterator<Item = S>,
) -> Result<Signal, GraphError> {
    Ok(oscillator(Waveform::Piecewise(collect_values(values)?), frequency))
}

/// Steps through `values` once every `length`.
pub fn piecewise_over<S: Scalar>(
    length: Duration,
    values: impl IntoIterator<Item = S>,
) -> Result<Signal, GraphError> {
    piecewise(length.inverse()?, values)
}

/// Like [`piecewise`], interpolating linearly towards the next value.
pub fn piecewise_linear<S: Scalar>(
    frequency: impl Into<Signal>,
    values: impl IntoIterator<Item = S>,
) -> Result<Signal, GraphError> {
    Ok(oscillator(
        Waveform::PiecewiseLinear(collect_values(values)?),
        frequency,
    ))
}

/// Like [`piecewise_over`], interpolating linearly towards the next value.
pub fn piecewise_linear_over<S: Scalar>(
    length: Duration,
    values: impl IntoIterator<Item = S>,
) -> Result<Signal, GraphError> {
    piecewise_linear(length.inverse()?, values)
}

/// Captures `input` each time its own phase wraps at `frequency`.
pub fn sample_and_hold(frequency: impl Into<Signal>, input: impl Into<Signal>) -> Signal {
    Signal::node(NodeType::SampleAndHold, vec![frequency.into(), input.into()])
}

/// A user-defined node.
pub fn external<T: NodeDef>(def: T, inputs: Vec<Signal>) -> Result<Signal, GraphError> {
    let node_type = NodeType::External { def: Arc::new(def) };
    if node_type.arity() != inputs.len() {
        return Err(GraphError::ArityMismatch {
            kind: node_type.name(),
            expected: node_type.arity(),
            found: inputs.len(),
        });
    }
    Ok(Signal::node(node_type, inputs))
}

impl Add for Signal {
    type Output = Signal;
    fn add(self, rhs: Signal) -> Signal {
        Signal::node(NodeType::Sum, vec![self, rhs])
    }
}

impl Mul for Signal {
    type Output = Signal;
    fn mul(self, rhs: Signal) -> Signal {
        Signal::node(NodeType::Product, vec![self, rhs])
    }
}

impl Neg for Signal {
    type Output = Signal;
    fn neg(self) -> Signal {
        Signal::node(NodeType::Complement, vec![self])
    }
}

impl Sub for Signal {
    type Output = Signal;
    fn sub(self, rhs: Signal) -> Signal {
        self + (-rhs)
    }
}

/// Scalars on either side of a signal operator become constants.
macro_rules! scalar_operands {
    ($($op:ident :: $method:ident),*) => {$(
        impl $op<f64> for Signal {
            type Output = Signal;
            fn $method(self, rhs: f64) -> Signal {
                $op::$method(self, Signal::from(rhs))
            }
        }

        impl $op<Signal> for f64 {
            type Output = Signal;
            fn $method(self, rhs: Signal) -> Signal {
                $op::$method(Signal::from(self), rhs)
            }
        }

        impl<D: Dimension> $op<Quantity<D>> for Signal {
            type Output = Signal;
            fn $method(self, rhs: Quantity<D>) -> Signal {
                $op::$method(self, Signal::from(rhs))
            }
        }

        impl<D: Dimension> $op<Signal> for Quantity<D> {
            type Output = Signal;
            fn $method(self, rhs: Signal) -> Signal {
                $op::$method(Signal::from(self), rhs)
            }
        }
    )*};
}

scalar_operands!(Add::add, Sub::sub, Mul::mul);

/// A signal compiled into its own graph, with the root it plays from.
#[derive(Debug)]
pub struct Patch {
    graph: Graph,
    root: NodeId,
}

impl Patch {
    /// Compile `signal` into a fresh graph. Each distinct `Signal` becomes
    /// exactly one node, however many expressions refer to it.
    pub fn compile(signal: &Signal) -> Result<Self, GraphError> {
        let mut graph = Graph::new();
        let mut interned = HashMap::new();
        let root = intern(&mut graph, &mut interned, signal)?;
        assert_invariant(
            PATCH_SHARES_IDENTICAL,
            interned.len() == graph.len(),
            "One graph node per distinct signal",
            Some("Patch::compile"),
        );
        Ok(Self { graph, root })
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Reset the graph and stream `floor(sample_rate × duration)` samples.
    pub fn samples(
        &mut self,
        sample_rate: Frequency,
        duration: Duration,
    ) -> Result<SampleSequence<'_>, ExportError> {
        SampleSequence::new(&mut self.graph, self.root, sample_rate, duration)
    }

    /// Render into a buffer.
    pub fn render(&mut self, config: &RenderConfig) -> Result<Vec<f64>, ExportError> {
        Ok(self.samples(config.sample_rate, config.duration)?.collect())
    }

    /// Render and encode as a mono 16-bit WAV file image.
    pub fn to_wav(&mut self, config: &RenderConfig) -> Result<Vec<u8>, ExportError> {
        let samples = self.samples(config.sample_rate, config.duration)?;
        wav::encode(samples, config.sample_rate)
    }
}

fn intern(
    graph: &mut Graph,
    interned: &mut HashMap<*const SignalDef, NodeId>,
    signal: &Signal,
) -> Result<NodeId, GraphError> {
    let key = Rc::as_ptr(&signal.0);
    if let Some(&id) = interned.get(&key) {
        return Ok(id);
    }
    let children = signal
        .inputs()
        .iter()
        .map(|input| intern(graph, interned, input))
        .collect::<Result<Vec<_>, _>>()?;
    let id = graph.add_node(signal.node_type().clone(), &children)?;
    interned.insert(key, id);
    Ok(id)
}

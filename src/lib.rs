//! Pull-based signal-flow graphs for deterministic audio sample generation.
//!
//! Build a graph from generators and combinators (see [`dsl`]), parameterize
//! it with typed quantities (see [`units`]), then stream samples with
//! [`sequence::SampleSequence`] or encode them with [`wav`].

pub mod dsl;
pub mod graph;
#[doc(hidden)]
pub mod harness;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod node;
pub mod note;
pub mod plan;
pub mod rt;
pub mod sequence;
pub mod states;
pub mod units;
pub mod wav;
pub mod waveform;

pub use dsl::{Patch, Signal};
pub use graph::{Graph, GraphError, NodeId, NodeType};
pub use sequence::{samples, ExportError, RenderConfig, SampleSequence};
pub use units::{Duration, Frequency, Interval, UnitError, UnitExt};

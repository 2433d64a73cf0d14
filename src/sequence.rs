//! Sample export: a one-shot stream of samples drawn from a graph root.

use crate::graph::{Graph, GraphError, NodeId};
use crate::invariant_ppt::{assert_invariant, EXPORT_STARTS_RESET};
use crate::units::{Duration, Frequency};
use std::iter::FusedIterator;
use thiserror::Error;

/// Sample rate used when none is given.
pub const DEFAULT_SAMPLE_RATE: Frequency = Frequency::hz(44100.0);

/// Rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    pub sample_rate: Frequency,
    pub duration: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            duration: Duration::sec(1.0),
        }
    }
}

impl RenderConfig {
    /// Default sample rate, given duration.
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    /// `floor(sample_rate × duration)`, validated.
    pub fn sample_count(&self) -> Result<usize, ExportError> {
        sample_count(self.sample_rate, self.duration)
    }
}

/// Errors while exporting or encoding samples.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// Sample rate must be finite and positive.
    #[error("invalid sample rate {0}")]
    InvalidSampleRate(Frequency),
    /// Duration must be finite and not negative.
    #[error("invalid duration {0}")]
    InvalidDuration(Duration),
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// WAV encoding failed.
    #[error("wav encoding failed: {0}")]
    Wav(String),
}

impl From<hound::Error> for ExportError {
    fn from(err: hound::Error) -> Self {
        ExportError::Wav(err.to_string())
    }
}

fn sample_count(sample_rate: Frequency, duration: Duration) -> Result<usize, ExportError> {
    if !sample_rate.value().is_finite() || sample_rate.value() <= 0.0 {
        return Err(ExportError::InvalidSampleRate(sample_rate));
    }
    if !duration.value().is_finite() || duration.value() < 0.0 {
        return Err(ExportError::InvalidDuration(duration));
    }
    Ok((sample_rate * duration).floor() as usize)
}

/// Samples drawn from a graph, one `advance` per element.
///
/// Construction resets the graph. The stream yields at most
/// `floor(sample_rate × duration)` samples and ends early the first time the
/// root has no output. It cannot be restarted; build a new one, which resets
/// the graph again.
#[derive(Debug)]
pub struct SampleSequence<'g> {
    graph: &'g mut Graph,
    root: NodeId,
    sample_rate: Frequency,
    remaining: usize,
}

impl<'g> SampleSequence<'g> {
    pub fn new(
        graph: &'g mut Graph,
        root: NodeId,
        sample_rate: Frequency,
        duration: Duration,
    ) -> Result<Self, ExportError> {
        let remaining = sample_count(sample_rate, duration)?;
        graph.check_root(root)?;
        graph.reset(root)?;
        assert_invariant(
            EXPORT_STARTS_RESET,
            graph.node(root)?.generation() == 0,
            "Export begins from a freshly reset root",
            Some("SampleSequence::new"),
        );
        Ok(Self {
            graph,
            root,
            sample_rate,
            remaining,
        })
    }

    pub fn sample_rate(&self) -> Frequency {
        self.sample_rate
    }

    /// Samples left before the requested length is reached.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl Iterator for SampleSequence<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let sample = self
            .graph
            .advance(self.root, self.sample_rate)
            .ok()
            .flatten();
        if sample.is_none() {
            self.remaining = 0;
        }
        sample
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl FusedIterator for SampleSequence<'_> {}

/// Stream samples from `root`.
pub fn samples(
    graph: &mut Graph,
    root: NodeId,
    sample_rate: Frequency,
    duration: Duration,
) -> Result<SampleSequence<'_>, ExportError> {
    SampleSequence::new(graph, root, sample_rate, duration)
}

/// Render offline to a buffer.
pub fn render_offline(
    graph: &mut Graph,
    root: NodeId,
    config: &RenderConfig,
) -> Result<Vec<f64>, ExportError> {
    Ok(samples(graph, root, config.sample_rate, config.duration)?.collect())
}

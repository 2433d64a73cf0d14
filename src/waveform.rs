//! Waveform shapes: phase-to-amplitude mappings for oscillators.

use crate::units::Frequency;
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

/// Shape of a phase-accumulating oscillator.
///
/// Every shape maps a phase in [0, 1) to an amplitude. `Pulse` additionally
/// reads its duty cycle from the oscillator's second child.
#[derive(Clone)]
pub enum Waveform {
    /// `sin(2π·phase)`.
    Sine,
    /// `2(1 - phase) - 1`, falling from +1 to -1.
    Sawtooth,
    /// `4·phase - 1` rising to +1 at half phase, then `4(1 - phase) - 1`.
    Triangle,
    /// +1 while `phase ≤ duty_cycle`, -1 after.
    Pulse,
    /// Arbitrary pure function of phase.
    Function(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
    /// `values.len()` equal steps across one period.
    Piecewise(Arc<[f64]>),
    /// Steps with linear interpolation towards the next value, wrapping.
    PiecewiseLinear(Arc<[f64]>),
}

impl fmt::Debug for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waveform::Sine => write!(f, "Sine"),
            Waveform::Sawtooth => write!(f, "Sawtooth"),
            Waveform::Triangle => write!(f, "Triangle"),
            Waveform::Pulse => write!(f, "Pulse"),
            Waveform::Function(_) => write!(f, "Function"),
            Waveform::Piecewise(values) => f.debug_tuple("Piecewise").field(values).finish(),
            Waveform::PiecewiseLinear(values) => {
                f.debug_tuple("PiecewiseLinear").field(values).finish()
            }
        }
    }
}

impl Waveform {
    /// Number of children an oscillator of this shape takes.
    pub fn arity(&self) -> usize {
        match self {
            Waveform::Pulse => 2,
            _ => 1,
        }
    }

    /// Amplitude at `phase`. `duty_cycle` is only consulted by `Pulse`.
    pub fn phase_to_amplitude(&self, phase: f64, duty_cycle: Option<f64>) -> Option<f64> {
        match self {
            Waveform::Sine => Some((phase * TAU).sin()),
            Waveform::Sawtooth => Some(2.0 * (1.0 - phase) - 1.0),
            Waveform::Triangle => {
                let rising = if phase < 0.5 { phase } else { 1.0 - phase };
                Some(rising * 4.0 - 1.0)
            }
            Waveform::Pulse => {
                let duty = duty_cycle?;
                Some(if phase <= duty { 1.0 } else { -1.0 })
            }
            Waveform::Function(function) => Some(function(phase)),
            Waveform::Piecewise(values) => {
                let (index, _) = step(phase, values.len())?;
                values.get(index).copied()
            }
            Waveform::PiecewiseLinear(values) => {
                let (index, fraction) = step(phase, values.len())?;
                let a = *values.get(index)?;
                let b = *values.get((index + 1) % values.len())?;
                Some(a + fraction * (b - a))
            }
        }
    }
}

/// Step index and fractional position within the step.
fn step(phase: f64, count: usize) -> Option<(usize, f64)> {
    if count == 0 {
        return None;
    }
    let position = phase * count as f64;
    // Rounding can land exactly on `count` for phases just below 1.
    let index = (position.floor() as usize).min(count - 1);
    Some((index, position - index as f64))
}

/// Phase after one sample at `frequency` hertz, wrapped into [0, 1).
pub fn advance_phase(phase: f64, frequency: f64, sample_rate: Frequency) -> f64 {
    let next = (phase + frequency / sample_rate.value()).rem_euclid(1.0);
    if next >= 1.0 {
        0.0
    } else {
        next
    }
}

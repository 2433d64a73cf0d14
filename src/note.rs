//! Note names and equal-tempered transposition.

use crate::units::{Frequency, Interval};
use std::ops::{Add, Sub};

/// A pitch class anchored at octave 0. Combine with an octave number to get a
/// [`Frequency`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Frequency of this note in octave 0.
    pub base: Frequency,
}

pub const C: Note = Note::new(16.3515978312874);
pub const D: Note = Note::new(18.354047994838);
pub const E: Note = Note::new(20.6017223070544);
pub const F: Note = Note::new(21.8267644645627);
pub const G: Note = Note::new(24.4997147488593);
pub const A: Note = Note::new(27.5);
pub const B: Note = Note::new(30.8677063285078);

impl Note {
    const fn new(hz: f64) -> Self {
        Self {
            base: Frequency::hz(hz),
        }
    }

    /// The natural note in the given octave, e.g. `C.at(4.0)` is middle C.
    pub fn at(self, octave: f64) -> Frequency {
        self.base + Interval::octaves(octave)
    }

    /// One semitone above the natural note in the given octave.
    pub fn sharp_at(self, octave: f64) -> Frequency {
        self.base + Interval::semitones(1.0) + Interval::octaves(octave)
    }
}

/// Transposition: `f · 2^(i/12)`.
impl Add<Interval> for Frequency {
    type Output = Frequency;
    fn add(self, rhs: Interval) -> Frequency {
        Frequency::hz(self.value() * 2f64.powf(rhs.value() / 12.0))
    }
}

impl Sub<Interval> for Frequency {
    type Output = Frequency;
    fn sub(self, rhs: Interval) -> Frequency {
        self + (-rhs)
    }
}

pub fn sharp(note: Frequency) -> Frequency {
    note + Interval::semitones(1.0)
}

pub fn flat(note: Frequency) -> Frequency {
    note - Interval::semitones(1.0)
}

pub fn octave_up(note: Frequency) -> Frequency {
    note + Interval::octaves(1.0)
}

pub fn octave_down(note: Frequency) -> Frequency {
    note - Interval::octaves(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitExt;
    use approx::assert_relative_eq;

    #[test]
    fn a4_is_concert_pitch() {
        assert_relative_eq!(A.at(4.0).value(), 440.0, epsilon = 1e-9);
        assert_relative_eq!(C.at(4.0).value(), 261.6255653005986, epsilon = 1e-9);
    }

    #[test]
    fn sharps_and_flats_meet() {
        assert_relative_eq!(sharp(C.at(5.0)).value(), C.sharp_at(5.0).value(), epsilon = 1e-6);
        assert_relative_eq!(sharp(C.sharp_at(5.0)).value(), D.at(5.0).value(), epsilon = 1e-6);
        assert_relative_eq!(flat(E.at(5.0)).value(), D.sharp_at(5.0).value(), epsilon = 1e-6);
    }

    #[test]
    fn octave_shifts_double_and_halve() {
        assert_relative_eq!(octave_up(C.at(5.0)).value(), C.at(6.0).value(), epsilon = 1e-9);
        assert_relative_eq!(octave_down(E.at(4.0)).value(), E.at(3.0).value(), epsilon = 1e-9);
        assert_relative_eq!((C.at(4.0) + 1.0.octaves()).value(), 2.0 * C.at(4.0).value(), epsilon = 1e-9);
    }

    #[test]
    fn fifth_above_c() {
        let g = C.at(4.0) + 7.0.semitones();
        assert_relative_eq!(g.value(), G.at(4.0).value(), epsilon = 1e-3);
    }
}

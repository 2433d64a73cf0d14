//! Units module: dimensioned scalars checked at compile time.
//!
//! A [`Quantity`] carries a phantom [`Dimension`] tag. Adding, subtracting and
//! comparing are only implemented between identical dimensions, so
//! `Frequency + Duration` is a type error. Multiplying a quantity by its
//! inverse dimension yields a plain `f64`, and dividing a scalar by a quantity
//! yields the inverse dimension.
//!
//! Divisions are checked: any division whose result is not finite returns
//! [`UnitError::NonFinite`] instead of propagating infinity or NaN.

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use thiserror::Error;

/// A physical dimension tag. Every dimension names its reciprocal.
pub trait Dimension: Copy + fmt::Debug + 'static {
    /// The dimension obtained by taking the reciprocal.
    type Inverse: Dimension<Inverse = Self>;
    /// Unit label used for display.
    const LABEL: &'static str;
}

/// Cycles per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hertz;

/// Seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seconds;

/// Equal-tempered semitones. Self-inverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Semitones;

impl Dimension for Hertz {
    type Inverse = Seconds;
    const LABEL: &'static str = "Hz";
}

impl Dimension for Seconds {
    type Inverse = Hertz;
    const LABEL: &'static str = "sec";
}

impl Dimension for Semitones {
    type Inverse = Semitones;
    const LABEL: &'static str = "semitones";
}

/// A rate, e.g. a pitch or a sample rate.
pub type Frequency = Quantity<Hertz>;
/// A span of time.
pub type Duration = Quantity<Seconds>;
/// A pitch distance.
pub type Interval = Quantity<Semitones>;

/// Errors produced by checked quantity arithmetic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The operation produced infinity or NaN.
    #[error("{operation} produced a non-finite value in {unit}")]
    NonFinite {
        /// The operation that failed.
        operation: &'static str,
        /// Label of the unit the result would have had.
        unit: &'static str,
    },
}

/// Anything that can be read as a plain number.
pub trait Scalar {
    /// The raw numeric value.
    fn value(&self) -> f64;
}

impl Scalar for f64 {
    fn value(&self) -> f64 {
        *self
    }
}

impl<D: Dimension> Scalar for Quantity<D> {
    fn value(&self) -> f64 {
        self.value
    }
}

/// A scalar tagged with a dimension.
pub struct Quantity<D: Dimension> {
    value: f64,
    unit: PhantomData<D>,
}

impl<D: Dimension> Quantity<D> {
    /// Wrap a raw value in this dimension.
    pub const fn new(value: f64) -> Self {
        Self {
            value,
            unit: PhantomData,
        }
    }

    /// The raw value in base units.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// The display label of this dimension.
    pub fn label(&self) -> &'static str {
        D::LABEL
    }

    /// The reciprocal, in the inverse dimension.
    pub fn inverse(self) -> Result<Quantity<D::Inverse>, UnitError> {
        checked(
            1.0 / self.value,
            "inverse",
            <D::Inverse as Dimension>::LABEL,
        )
        .map(Quantity::new)
    }

    /// In-place division by a scalar. Leaves `self` untouched on error.
    pub fn checked_div_assign(&mut self, rhs: f64) -> Result<(), UnitError> {
        *self = (*self / rhs)?;
        Ok(())
    }
}

fn checked(value: f64, operation: &'static str, unit: &'static str) -> Result<f64, UnitError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(UnitError::NonFinite { operation, unit })
    }
}

impl Quantity<Hertz> {
    /// Frequency in hertz.
    pub const fn hz(value: f64) -> Self {
        Self::new(value)
    }

    /// Frequency in kilohertz.
    pub fn khz(value: f64) -> Self {
        Self::new(value * 1000.0)
    }
}

impl Quantity<Seconds> {
    /// Duration in seconds.
    pub const fn sec(value: f64) -> Self {
        Self::new(value)
    }

    /// Duration in milliseconds.
    pub fn msec(value: f64) -> Self {
        Self::new(value * 0.001)
    }

    /// Duration in minutes.
    pub fn minutes(value: f64) -> Self {
        Self::new(value * 60.0)
    }
}

impl Quantity<Semitones> {
    /// Interval in semitones.
    pub const fn semitones(value: f64) -> Self {
        Self::new(value)
    }

    /// Interval in octaves.
    pub fn octaves(value: f64) -> Self {
        Self::new(value * 12.0)
    }
}

/// Literal suffixes, e.g. `440.0.hz()` or `250.0.msec()`.
pub trait UnitExt {
    /// Hertz.
    fn hz(self) -> Frequency;
    /// Kilohertz.
    fn khz(self) -> Frequency;
    /// Seconds.
    fn sec(self) -> Duration;
    /// Milliseconds.
    fn msec(self) -> Duration;
    /// Minutes.
    fn minutes(self) -> Duration;
    /// Semitones.
    fn semitones(self) -> Interval;
    /// Octaves.
    fn octaves(self) -> Interval;
}

impl UnitExt for f64 {
    fn hz(self) -> Frequency {
        Frequency::hz(self)
    }
    fn khz(self) -> Frequency {
        Frequency::khz(self)
    }
    fn sec(self) -> Duration {
        Duration::sec(self)
    }
    fn msec(self) -> Duration {
        Duration::msec(self)
    }
    fn minutes(self) -> Duration {
        Duration::minutes(self)
    }
    fn semitones(self) -> Interval {
        Interval::semitones(self)
    }
    fn octaves(self) -> Interval {
        Interval::octaves(self)
    }
}

impl<D: Dimension> Clone for Quantity<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Dimension> Copy for Quantity<D> {}

impl<D: Dimension> fmt::Debug for Quantity<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity({} {})", self.value, D::LABEL)
    }
}

impl<D: Dimension> fmt::Display for Quantity<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, D::LABEL)
    }
}

impl<D: Dimension> Default for Quantity<D> {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl<D: Dimension> PartialEq for Quantity<D> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<D: Dimension> PartialOrd for Quantity<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<D: Dimension> Add for Quantity<D> {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.value + rhs.value)
    }
}

impl<D: Dimension> Sub for Quantity<D> {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.value - rhs.value)
    }
}

impl<D: Dimension> AddAssign for Quantity<D> {
    fn add_assign(&mut self, rhs: Self) {
        self.value += rhs.value;
    }
}

impl<D: Dimension> SubAssign for Quantity<D> {
    fn sub_assign(&mut self, rhs: Self) {
        self.value -= rhs.value;
    }
}

impl<D: Dimension> Neg for Quantity<D> {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.value)
    }
}

impl<D: Dimension> Mul<f64> for Quantity<D> {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.value * rhs)
    }
}

impl<D: Dimension> Mul<Quantity<D>> for f64 {
    type Output = Quantity<D>;
    fn mul(self, rhs: Quantity<D>) -> Quantity<D> {
        Quantity::new(self * rhs.value)
    }
}

impl<D: Dimension> MulAssign<f64> for Quantity<D> {
    fn mul_assign(&mut self, rhs: f64) {
        self.value *= rhs;
    }
}

/// `T × T⁻¹` is dimensionless.
impl<D: Dimension> Mul<Quantity<D::Inverse>> for Quantity<D> {
    type Output = f64;
    fn mul(self, rhs: Quantity<D::Inverse>) -> f64 {
        self.value * rhs.value()
    }
}

impl<D: Dimension> Div<f64> for Quantity<D> {
    type Output = Result<Self, UnitError>;
    fn div(self, rhs: f64) -> Self::Output {
        checked(self.value / rhs, "division by scalar", D::LABEL).map(Self::new)
    }
}

/// Ratio of two like quantities.
impl<D: Dimension> Div for Quantity<D> {
    type Output = Result<f64, UnitError>;
    fn div(self, rhs: Self) -> Self::Output {
        checked(self.value / rhs.value, "ratio", "dimensionless")
    }
}

/// `k / T` has the inverse dimension.
impl<D: Dimension> Div<Quantity<D>> for f64 {
    type Output = Result<Quantity<D::Inverse>, UnitError>;
    fn div(self, rhs: Quantity<D>) -> Self::Output {
        checked(
            self / rhs.value,
            "reciprocal",
            <D::Inverse as Dimension>::LABEL,
        )
        .map(Quantity::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn suffixes_scale_to_base_units() {
        assert_eq!(1000.0.hz(), 1.0.khz());
        assert_eq!(60.0.sec(), 1.0.minutes());
        assert!(59.0.sec() < 1.0.minutes());
        assert_relative_eq!(33.0.msec().value(), 0.033, epsilon = 1e-12);
        assert_eq!(1.0.octaves(), 12.0.semitones());
    }

    #[test]
    fn display_uses_unit_label() {
        assert_eq!(440.0.hz().to_string(), "440 Hz");
        assert_eq!(5.0.sec().to_string(), "5 sec");
        assert_eq!(7.0.semitones().to_string(), "7 semitones");
    }

    #[test]
    fn like_units_add_and_scale() {
        assert_eq!(50.0.hz() + 20.0.hz(), 70.0.hz());
        assert_relative_eq!((20.0.sec() - 500.0.msec()).value(), 19.5);
        assert_eq!(100.0.hz() * 2.0, 200.0.hz());
        assert_eq!(5.0 * 60.0.sec(), 300.0.sec());
        assert_eq!((10.0.minutes() / 12.0).unwrap(), 50.0.sec());

        let mut f = 10.0.hz();
        f += 5.0.hz();
        f -= 1.0.hz();
        f *= 2.0;
        assert_eq!(f, 28.0.hz());
        f.checked_div_assign(4.0).unwrap();
        assert_eq!(f, 7.0.hz());
    }

    #[test]
    fn reciprocal_flips_dimension() {
        let period: Duration = (1.0 / 10.0.hz()).unwrap();
        assert_relative_eq!(period.value(), 0.1);
        let rate: Frequency = (1.0 / 4.0.sec()).unwrap();
        assert_eq!(rate, 0.25.hz());
        assert_eq!(5.0.hz() * 20.0.sec(), 100.0);
    }

    #[test]
    fn zero_division_is_rejected() {
        assert!(matches!(
            1.0 / 0.0.hz(),
            Err(UnitError::NonFinite { unit: "sec", .. })
        ));
        assert!(0.0.sec().inverse().is_err());
        assert!((3.0.hz() / 0.0).is_err());
        assert!((0.0.hz() / 0.0.hz()).is_err());

        let mut span = 3.0.sec();
        assert!(span.checked_div_assign(0.0).is_err());
        assert_eq!(span, 3.0.sec());
    }

    proptest! {
        #[test]
        fn add_then_sub_round_trips(a in -1.0e6f64..1.0e6, b in -1.0e6f64..1.0e6) {
            let qa = Frequency::hz(a);
            let qb = Frequency::hz(b);
            let back = (qa + qb) - qb;
            prop_assert!((back.value() - a).abs() <= 1e-6 * a.abs().max(1.0));
        }

        #[test]
        fn inverse_is_involutive(a in 1.0e-3f64..1.0e6) {
            let q = Duration::sec(a);
            let back = q.inverse().unwrap().inverse().unwrap();
            prop_assert!((back.value() - a).abs() <= 1e-9 * a);
        }

        #[test]
        fn self_ratio_is_one(a in prop::num::f64::NORMAL) {
            let q = Interval::semitones(a);
            prop_assert_eq!((q / q).unwrap(), 1.0);
        }
    }
}

//! Confidence scores for claims and canonical entries

use std::fmt;

/// A confidence score in `[0.0, 1.0]`
///
/// Low-trust appends never fail, so [`Confidence::clamped`] folds any input
/// into range. Oracle decisions go through [`Confidence::new`] instead, which
/// rejects out-of-range values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Confidence(f64);

impl Confidence {
    /// Full confidence, used for seeded and human-confirmed entries
    pub const CERTAIN: Confidence = Confidence(1.0);

    /// Default confidence for a low-trust append
    pub const TENTATIVE: Confidence = Confidence(0.5);

    /// Create a confidence score, rejecting NaN and values outside `[0, 1]`
    ///
    /// # Examples
    ///
    /// ```
    /// use stratum_domain::Confidence;
    ///
    /// assert!(Confidence::new(0.8).is_ok());
    /// assert!(Confidence::new(1.2).is_err());
    /// ```
    pub fn new(value: f64) -> Result<Self, String> {
        if value.is_nan() || !(0.0..=1.0).contains(&value) {
            return Err(format!("confidence {} is outside [0.0, 1.0]", value));
        }
        Ok(Self(value))
    }

    /// Create a confidence score, clamping into `[0, 1]` (NaN becomes 0.0)
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    /// Get the raw value
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Confidence {
    fn default() -> Self {
        Self::TENTATIVE
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: clamping always lands inside the unit interval
        #[test]
        fn test_clamped_in_range(value: f64) {
            let c = Confidence::clamped(value);
            prop_assert!((0.0..=1.0).contains(&c.value()));
        }

        /// Property: in-range values survive `new` unchanged
        #[test]
        fn test_new_preserves_in_range(value in 0.0f64..=1.0) {
            prop_assert_eq!(Confidence::new(value).unwrap().value(), value);
        }
    }
}

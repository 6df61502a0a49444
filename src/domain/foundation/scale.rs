//! Bounded numeric value objects: the 1-5 wellness scale and percentages.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Wellness scale score: 1 (very poor) to 5 (great).
///
/// Used for sleep quality and energy level on check-ins. Out-of-range input
/// is a validation error, never a clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScaleScore {
    VeryPoor = 1,
    Poor = 2,
    Okay = 3,
    Good = 4,
    Great = 5,
}

impl ScaleScore {
    /// Creates a ScaleScore from an integer, returning error if out of range.
    pub fn try_from_i16(value: i16) -> Result<Self, ValidationError> {
        match value {
            1 => Ok(ScaleScore::VeryPoor),
            2 => Ok(ScaleScore::Poor),
            3 => Ok(ScaleScore::Okay),
            4 => Ok(ScaleScore::Good),
            5 => Ok(ScaleScore::Great),
            _ => Err(ValidationError::out_of_range("scale", 1, 5, value as i32)),
        }
    }

    /// Returns the numeric value.
    pub fn value(&self) -> i16 {
        *self as i16
    }

    /// Returns the display label matching the extraction rubric.
    pub fn label(&self) -> &'static str {
        match self {
            ScaleScore::VeryPoor => "very poor",
            ScaleScore::Poor => "poor",
            ScaleScore::Okay => "okay",
            ScaleScore::Good => "good",
            ScaleScore::Great => "great",
        }
    }
}

impl fmt::Display for ScaleScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.value())
    }
}

/// A value between 0 and 100 inclusive, used for milestone progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    /// Zero percent.
    pub const ZERO: Self = Self(0);

    /// One hundred percent.
    pub const HUNDRED: Self = Self(100);

    /// Creates a Percentage, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range(
                "percentage",
                0,
                100,
                value as i32,
            ));
        }
        Ok(Self(value))
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns true if this percentage is complete.
    pub fn is_complete(&self) -> bool {
        self.0 == 100
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod scale_score {
        use super::*;

        #[test]
        fn try_from_i16_accepts_valid_values() {
            assert_eq!(ScaleScore::try_from_i16(1).unwrap(), ScaleScore::VeryPoor);
            assert_eq!(ScaleScore::try_from_i16(2).unwrap(), ScaleScore::Poor);
            assert_eq!(ScaleScore::try_from_i16(3).unwrap(), ScaleScore::Okay);
            assert_eq!(ScaleScore::try_from_i16(4).unwrap(), ScaleScore::Good);
            assert_eq!(ScaleScore::try_from_i16(5).unwrap(), ScaleScore::Great);
        }

        #[test]
        fn try_from_i16_rejects_out_of_range() {
            assert!(ScaleScore::try_from_i16(0).is_err());
            assert!(ScaleScore::try_from_i16(6).is_err());
            assert!(ScaleScore::try_from_i16(-1).is_err());

            match ScaleScore::try_from_i16(7) {
                Err(ValidationError::OutOfRange { min, max, actual, .. }) => {
                    assert_eq!(min, 1);
                    assert_eq!(max, 5);
                    assert_eq!(actual, 7);
                }
                other => panic!("Expected OutOfRange, got {:?}", other),
            }
        }

        #[test]
        fn value_returns_correct_integer() {
            assert_eq!(ScaleScore::VeryPoor.value(), 1);
            assert_eq!(ScaleScore::Great.value(), 5);
        }

        #[test]
        fn label_matches_rubric() {
            assert_eq!(ScaleScore::VeryPoor.label(), "very poor");
            assert_eq!(ScaleScore::Great.label(), "great");
        }

        #[test]
        fn ordering_follows_scale() {
            assert!(ScaleScore::VeryPoor < ScaleScore::Poor);
            assert!(ScaleScore::Good < ScaleScore::Great);
        }

        #[test]
        fn displays_as_fraction_of_five() {
            assert_eq!(format!("{}", ScaleScore::Poor), "2/5");
        }
    }

    mod percentage {
        use super::*;

        #[test]
        fn try_new_accepts_valid_values() {
            assert!(Percentage::try_new(0).is_ok());
            assert!(Percentage::try_new(50).is_ok());
            assert!(Percentage::try_new(100).is_ok());
        }

        #[test]
        fn try_new_rejects_over_100() {
            assert!(Percentage::try_new(101).is_err());
        }

        #[test]
        fn is_complete_only_at_hundred() {
            assert!(Percentage::HUNDRED.is_complete());
            assert!(!Percentage::try_new(99).unwrap().is_complete());
        }

        #[test]
        fn serializes_as_bare_number() {
            let json = serde_json::to_string(&Percentage::try_new(42).unwrap()).unwrap();
            assert_eq!(json, "42");
        }

        #[test]
        fn displays_with_percent_sign() {
            assert_eq!(format!("{}", Percentage::HUNDRED), "100%");
        }
    }
}

//! Amplitude constraints on formation ports.
//!
//! Written as `5` (exact), `5+` (at least) or `3..10` (inclusive range),
//! both in RunicHDL brackets and as the `amplitude` parameter of a
//! synthesized `FormationInput` node.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmplitudeSpec {
    Exact(u32),
    Min(u32),
    Range(u32, u32),
}

impl AmplitudeSpec {
    /// The magnitude a source should emit for this constraint.
    pub fn nominal(&self) -> u32 {
        match *self {
            AmplitudeSpec::Exact(n) | AmplitudeSpec::Min(n) => n,
            AmplitudeSpec::Range(min, _) => min,
        }
    }

    /// Whether `magnitude` satisfies the constraint.
    pub fn accepts(&self, magnitude: u32) -> bool {
        match *self {
            AmplitudeSpec::Exact(n) => magnitude == n,
            AmplitudeSpec::Min(n) => magnitude >= n,
            AmplitudeSpec::Range(min, max) => (min..=max).contains(&magnitude),
        }
    }

    /// A range whose lower bound exceeds its upper bound.
    pub fn is_inverted(&self) -> bool {
        matches!(*self, AmplitudeSpec::Range(min, max) if min > max)
    }
}

impl Default for AmplitudeSpec {
    fn default() -> Self {
        AmplitudeSpec::Exact(1)
    }
}

impl fmt::Display for AmplitudeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmplitudeSpec::Exact(n) => write!(f, "{n}"),
            AmplitudeSpec::Min(n) => write!(f, "{n}+"),
            AmplitudeSpec::Range(min, max) => write!(f, "{min}..{max}"),
        }
    }
}

impl FromStr for AmplitudeSpec {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidAmplitude {
            text: s.to_string(),
        };
        let text = s.trim();
        let number = |t: &str| t.trim().parse::<u32>().map_err(|_| invalid());

        if let Some((min, max)) = text.split_once("..") {
            return Ok(AmplitudeSpec::Range(number(min)?, number(max)?));
        }
        if let Some(min) = text.strip_suffix('+') {
            return Ok(AmplitudeSpec::Min(number(min)?));
        }
        Ok(AmplitudeSpec::Exact(number(text)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_forms() {
        assert_eq!("5".parse::<AmplitudeSpec>().unwrap(), AmplitudeSpec::Exact(5));
        assert_eq!("5+".parse::<AmplitudeSpec>().unwrap(), AmplitudeSpec::Min(5));
        assert_eq!(
            "3..10".parse::<AmplitudeSpec>().unwrap(),
            AmplitudeSpec::Range(3, 10)
        );
    }

    #[test]
    fn display_matches_source_notation() {
        for text in ["7", "7+", "2..9"] {
            assert_eq!(text.parse::<AmplitudeSpec>().unwrap().to_string(), text);
        }
    }

    #[test]
    fn rejects_garbage_and_negatives() {
        assert!("".parse::<AmplitudeSpec>().is_err());
        assert!("ten".parse::<AmplitudeSpec>().is_err());
        assert!("-3".parse::<AmplitudeSpec>().is_err());
        assert!("3..".parse::<AmplitudeSpec>().is_err());
    }

    #[test]
    fn nominal_magnitude() {
        assert_eq!(AmplitudeSpec::Exact(5).nominal(), 5);
        assert_eq!(AmplitudeSpec::Min(5).nominal(), 5);
        assert_eq!(AmplitudeSpec::Range(3, 10).nominal(), 3);
        assert_eq!(AmplitudeSpec::default().nominal(), 1);
    }

    #[test]
    fn accepts_and_inverted() {
        assert!(AmplitudeSpec::Range(3, 10).accepts(10));
        assert!(!AmplitudeSpec::Range(3, 10).accepts(11));
        assert!(AmplitudeSpec::Min(3).accepts(30));
        assert!(AmplitudeSpec::Range(9, 2).is_inverted());
        assert!(!AmplitudeSpec::Range(2, 2).is_inverted());
    }
}

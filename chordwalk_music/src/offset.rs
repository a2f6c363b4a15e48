// Running pitch offset of a melody, kept inside a soft range.
//
// The melody is written as bare scale degrees, which lose octave information.
// `OffsetTracker` remembers how far the line has wandered from its starting
// reference, in staff lines, so the generator can steer back before the tune
// drifts out of a singable range. The bound is soft: a consonant leap that
// escapes a dead end may step past it, and the free-running steps then pull
// the line back.
//
// One tracker belongs to one melody pass and is handed to melody.rs by
// `&mut`; nothing here is global.

use crate::degree::{ScaleDegree, distance};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Floor and ceiling for the running offset, plus the attempt budgets that
/// keep the random walks finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorLimits {
    pub offset_floor: i32,
    pub offset_ceiling: i32,
    /// Resample budget for one chord choice (reroll draws and rejected repeats).
    pub max_chord_attempts: usize,
    /// How many progressions a form section may reject before giving up.
    pub max_section_attempts: usize,
}

impl Default for GeneratorLimits {
    fn default() -> Self {
        GeneratorLimits {
            offset_floor: -8,
            offset_ceiling: 8,
            max_chord_attempts: 1_000,
            max_section_attempts: 10_000,
        }
    }
}

impl GeneratorLimits {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.offset_floor >= self.offset_ceiling {
            return Err(ConfigError::OffsetBounds {
                floor: self.offset_floor,
                ceiling: self.offset_ceiling,
            });
        }
        Ok(())
    }
}

/// Cumulative staff-line displacement from the melody's reference note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTracker {
    current: i32,
    floor: i32,
    ceiling: i32,
}

impl OffsetTracker {
    pub fn new(limits: &GeneratorLimits) -> Self {
        OffsetTracker {
            current: 0,
            floor: limits.offset_floor,
            ceiling: limits.offset_ceiling,
        }
    }

    /// Start from a given offset instead of zero.
    pub fn starting_at(limits: &GeneratorLimits, current: i32) -> Self {
        OffsetTracker {
            current,
            ..Self::new(limits)
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn at_floor(&self) -> bool {
        self.current <= self.floor
    }

    pub fn at_ceiling(&self) -> bool {
        self.current >= self.ceiling
    }

    /// Whether moving `from -> to` keeps the offset inside the bound in the
    /// direction of travel.
    pub fn is_viable(&self, from: ScaleDegree, to: ScaleDegree) -> bool {
        let next = self.current + distance(from, to);
        if next < self.current {
            next >= self.floor
        } else {
            next <= self.ceiling
        }
    }

    /// Record the move `from -> to` and return `to`.
    pub fn advance(&mut self, from: ScaleDegree, to: ScaleDegree) -> ScaleDegree {
        self.current += distance(from, to);
        to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(n: u8) -> ScaleDegree {
        ScaleDegree::new(n).unwrap()
    }

    #[test]
    fn test_default_limits() {
        let limits = GeneratorLimits::default();
        assert_eq!((limits.offset_floor, limits.offset_ceiling), (-8, 8));
        limits.validate().unwrap();
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let limits = GeneratorLimits {
            offset_floor: 3,
            offset_ceiling: 3,
            ..GeneratorLimits::default()
        };
        assert!(matches!(
            limits.validate(),
            Err(ConfigError::OffsetBounds { floor: 3, ceiling: 3 })
        ));
    }

    #[test]
    fn test_advance_accumulates_distance() {
        let mut tracker = OffsetTracker::new(&GeneratorLimits::default());
        assert_eq!(tracker.advance(d(1), d(3)), d(3));
        tracker.advance(d(3), d(6));
        tracker.advance(d(6), d(1));
        // +2, -4, +2
        assert_eq!(tracker.current(), 0);
    }

    #[test]
    fn test_viability_at_the_floor() {
        let limits = GeneratorLimits::default();
        let tracker = OffsetTracker::starting_at(&limits, -8);
        assert!(tracker.at_floor());
        assert!(!tracker.is_viable(d(3), d(2)));
        assert!(tracker.is_viable(d(3), d(4)));
        assert!(tracker.is_viable(d(3), d(3)));
    }

    #[test]
    fn test_viability_at_the_ceiling() {
        let limits = GeneratorLimits::default();
        let tracker = OffsetTracker::starting_at(&limits, 7);
        assert!(!tracker.at_ceiling());
        assert!(tracker.is_viable(d(7), d(1)));
        assert!(!tracker.is_viable(d(1), d(3)));
        assert!(tracker.is_viable(d(1), d(6)));
    }
}

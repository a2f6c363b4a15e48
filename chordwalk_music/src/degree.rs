// Scale-degree arithmetic on a seven-line diatonic staff.
//
// A `ScaleDegree` is a position 1-7 within the key and is cyclic: after 7
// comes 1, before 1 comes 7. The same type names a chord (by its root) and a
// melody note (by its staff position).
//
// `distance` measures how many staff lines separate two degrees. Plain
// subtraction is wrong whenever a move crosses the 7|1 boundary, so those
// moves are looked up in a small table. A few fifth leaps that do not touch
// the boundary are also fixed in the table (6->3 and 5->2 rise, their reverses
// fall). Other fifths, such as 7->3 or 5->1, fall through to plain
// subtraction.
//
// Used by melody.rs for the running pitch offset and by bassline.rs for
// measuring bass leaps.

use crate::error::InvalidDegree;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scale degree in 1..=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ScaleDegree(u8);

impl ScaleDegree {
    pub const TONIC: ScaleDegree = ScaleDegree(1);
    pub const LEADING_TONE: ScaleDegree = ScaleDegree(7);

    pub const ALL: [ScaleDegree; 7] = [
        ScaleDegree(1),
        ScaleDegree(2),
        ScaleDegree(3),
        ScaleDegree(4),
        ScaleDegree(5),
        ScaleDegree(6),
        ScaleDegree(7),
    ];

    /// Returns `None` outside 1..=7.
    pub fn new(value: u8) -> Option<Self> {
        (1..=7).contains(&value).then_some(ScaleDegree(value))
    }

    /// Fold any integer onto 1..=7 cyclically, so 8 is 1 and 0 is 7.
    pub fn wrapping(value: i32) -> Self {
        ScaleDegree((value - 1).rem_euclid(7) as u8 + 1)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Zero-based index for per-degree tables.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The degree `steps` scale steps above this one (negative goes down).
    pub fn above(self, steps: i32) -> Self {
        Self::wrapping(self.0 as i32 + steps)
    }

    pub fn step_up(self) -> Self {
        self.above(1)
    }

    pub fn step_down(self) -> Self {
        self.above(-1)
    }
}

impl TryFrom<u8> for ScaleDegree {
    type Error = InvalidDegree;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ScaleDegree::new(value).ok_or(InvalidDegree(value))
    }
}

impl From<ScaleDegree> for u8 {
    fn from(degree: ScaleDegree) -> u8 {
        degree.0
    }
}

impl fmt::Display for ScaleDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed number of staff lines travelled from `older` to `newer`.
///
/// Positive is upward. Moves across the 7|1 boundary treat the far side as
/// 8 or 0 depending on direction, and 6->3 / 5->2 are read as rising fourths.
pub fn distance(older: ScaleDegree, newer: ScaleDegree) -> i32 {
    let o = older.0 as i32;
    let n = newer.0 as i32;
    match (older.0, newer.0) {
        // Rising into the tonic: 1 is read as 8.
        (4 | 6 | 7, 1) => 8 - o,
        // Falling onto the leading tone: 7 is read as 0.
        (1 | 2 | 4, 7) => -o,
        // Falling out of the tonic: 1 is read as 8.
        (1, 4 | 6) => n - 8,
        // Rising out of the leading tone: 7 is read as 0.
        (7, 2 | 4) => n,
        (6, 3) | (5, 2) => 4,
        (3, 6) | (2, 5) => -4,
        _ => n - o,
    }
}

pub fn is_trending_down(older: ScaleDegree, newer: ScaleDegree) -> bool {
    distance(older, newer) < 0
}

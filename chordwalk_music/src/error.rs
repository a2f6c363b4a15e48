// Error types for table validation and form assembly.
//
// Generation itself never fails: every branch of the progression, melody and
// bassline passes is total over its small integer domain. What can fail is
// loading a chord graph that would make those passes produce invalid degrees
// (caught once, up front, as `ConfigError`) and the rejection sampling used to
// pick form sections (`ComposeError`).

use thiserror::Error;

/// A raw value that is not a scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scale degree {0} is outside 1..=7")]
pub struct InvalidDegree(pub u8);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected {expected} chord entries, found {found}")]
    WrongChordCount { expected: usize, found: usize },

    #[error("chord {degree} has no allowed successors")]
    NoSuccessors { degree: u8 },

    #[error("chord {degree} has duplicate probability {percent}%, must be at most 100")]
    DupeProbability { degree: u8, percent: u8 },

    #[error("chord {degree} tones must start at its root, found {found}")]
    ToneRoot { degree: u8, found: u8 },

    #[error("chord {degree} lists the same tone twice")]
    RepeatedTone { degree: u8 },

    #[error("dominant set is empty")]
    NoDominants,

    #[error("chord {degree} is reachable from the tonic but cannot reach a dominant")]
    UnreachableDominant { degree: u8 },

    #[error("offset floor {floor} must be below ceiling {ceiling}")]
    OffsetBounds { floor: i32, ceiling: i32 },

    #[error("failed to read tables: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tables: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no acceptable {section} section after {attempts} attempts")]
    SectionRejected { section: char, attempts: usize },
}

// Key tables: the chord graph and chord qualities for one mode.
//
// Everything the generators know about harmony lives in a `ModeTables`:
// which chords may follow which, how strongly each chord is discouraged
// (reroll count), how often a chord may repeat itself, the triad tones of
// each chord, and which degrees count as predominant and dominant. Chord
// quality is an explicit per-degree field, so a new mode is a new table and
// never a change to generation code.
//
// This module provides:
// - The built-in major and minor tables
// - JSON loading with up-front validation (fail fast on a bad graph)
// - Roman-numeral naming and harmonic function labels
//
// Consumed by progression.rs (graph walk), melody.rs (chord tones) and
// bassline.rs (thirds and naming).

use crate::degree::ScaleDegree;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

/// Triad quality, which decides how the roman numeral is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
}

impl ChordQuality {
    /// Roman numeral for a chord of this quality rooted on `root`.
    pub fn numeral(self, root: ScaleDegree) -> String {
        const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];
        let upper = NUMERALS[root.index()];
        match self {
            ChordQuality::Major => upper.to_string(),
            ChordQuality::Minor => upper.to_lowercase(),
            ChordQuality::Diminished => format!("{}o", upper.to_lowercase()),
            ChordQuality::Augmented => format!("{upper}+"),
        }
    }
}

/// The two built-in tonalities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    pub fn tables(self) -> ModeTables {
        match self {
            Mode::Major => ModeTables::major(),
            Mode::Minor => ModeTables::minor(),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    /// `M` is major and `m` is minor; the full words are accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Mode::Major),
            "m" => Ok(Mode::Minor),
            _ => match s.to_lowercase().as_str() {
                "major" => Ok(Mode::Major),
                "minor" => Ok(Mode::Minor),
                _ => Err(format!("unknown mode '{s}', expected M or m")),
            },
        }
    }
}

/// Role a chord plays in a cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HarmonicFunction {
    Tonic,
    Predominant,
    Dominant,
    Other,
}

/// Per-degree row of the chord graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChordEntry {
    pub quality: ChordQuality,
    /// Chords allowed to come next.
    pub follows: Vec<ScaleDegree>,
    /// Extra draws this chord must survive when picked; higher is rarer.
    pub reroll: u32,
    /// Percent chance that a repeat of this chord is kept.
    pub dupe_percent: u8,
    /// Root, third and fifth.
    pub tones: [ScaleDegree; 3],
}

/// Chord graph and qualities for one mode.
///
/// Construct with `major()`, `minor()`, `new()`, `from_json()` or any serde
/// deserializer; all but the presets validate, and the presets are covered by
/// tests. Accessors index by degree and rely on the seven-entry shape checked
/// by `validate()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawModeTables")]
pub struct ModeTables {
    name: String,
    chords: Vec<ChordEntry>,
    predominants: Vec<ScaleDegree>,
    dominants: Vec<ScaleDegree>,
}

/// Wire shape of `ModeTables` before validation.
#[derive(Deserialize)]
struct RawModeTables {
    name: String,
    chords: Vec<ChordEntry>,
    predominants: Vec<ScaleDegree>,
    dominants: Vec<ScaleDegree>,
}

impl TryFrom<RawModeTables> for ModeTables {
    type Error = ConfigError;

    fn try_from(raw: RawModeTables) -> Result<Self, Self::Error> {
        ModeTables::new(raw.name, raw.chords, raw.predominants, raw.dominants)
    }
}

impl ModeTables {
    pub fn new(
        name: impl Into<String>,
        chords: Vec<ChordEntry>,
        predominants: Vec<ScaleDegree>,
        dominants: Vec<ScaleDegree>,
    ) -> Result<Self, ConfigError> {
        let tables = ModeTables {
            name: name.into(),
            chords,
            predominants,
            dominants,
        };
        tables.validate()?;
        Ok(tables)
    }

    pub fn major() -> Self {
        use ChordQuality::*;
        Self::common_practice(
            "major",
            [Major, Minor, Minor, Major, Major, Minor, Diminished],
        )
    }

    pub fn minor() -> Self {
        use ChordQuality::*;
        Self::common_practice(
            "minor",
            [Minor, Diminished, Major, Minor, Major, Minor, Diminished],
        )
    }

    /// The shared chord graph behind both presets, with per-mode qualities.
    fn common_practice(name: &str, qualities: [ChordQuality; 7]) -> Self {
        let follows: [&[i32]; 7] = [
            &[1, 2, 3, 4, 5, 6, 7],
            &[2, 4, 5, 7],
            &[2, 3, 4],
            &[2, 4, 5, 7],
            &[1, 6],
            &[1, 2, 3, 4, 5, 6, 7],
            &[1, 5, 6, 7],
        ];
        // Generally prefer movement over a static bassline.
        let reroll = [0, 1, 2, 0, 0, 1, 2];
        let dupe_percent = [25, 5, 1, 15, 5, 10, 1];

        let chords = ScaleDegree::ALL
            .iter()
            .map(|&root| {
                let i = root.index();
                ChordEntry {
                    quality: qualities[i],
                    follows: follows[i].iter().map(|&n| ScaleDegree::wrapping(n)).collect(),
                    reroll: reroll[i],
                    dupe_percent: dupe_percent[i],
                    tones: [root, root.above(2), root.above(4)],
                }
            })
            .collect();

        ModeTables {
            name: name.to_string(),
            chords,
            predominants: vec![ScaleDegree::wrapping(2), ScaleDegree::wrapping(4)],
            dominants: vec![ScaleDegree::wrapping(5), ScaleDegree::wrapping(7)],
        }
    }

    /// Parse and validate tables from JSON text.
    /// Validation failures keep their own `ConfigError` variant rather than
    /// surfacing as a parse error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawModeTables = serde_json::from_str(json)?;
        ModeTables::try_from(raw)
    }

    /// Load and validate tables from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Check that the graph can only ever produce valid degrees and that a
    /// walk from the tonic can always still reach a cadence.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chords.len() != 7 {
            return Err(ConfigError::WrongChordCount {
                expected: 7,
                found: self.chords.len(),
            });
        }
        for (root, entry) in ScaleDegree::ALL.iter().zip(&self.chords) {
            let degree = root.value();
            if entry.follows.is_empty() {
                return Err(ConfigError::NoSuccessors { degree });
            }
            if entry.dupe_percent > 100 {
                return Err(ConfigError::DupeProbability {
                    degree,
                    percent: entry.dupe_percent,
                });
            }
            if entry.tones[0] != *root {
                return Err(ConfigError::ToneRoot {
                    degree,
                    found: entry.tones[0].value(),
                });
            }
            let [r, t, f] = entry.tones;
            if r == t || t == f || r == f {
                return Err(ConfigError::RepeatedTone { degree });
            }
        }
        if self.dominants.is_empty() {
            return Err(ConfigError::NoDominants);
        }

        // Every chord the walk can visit must still have a path to a dominant,
        // otherwise progression generation could never stop.
        for degree in self.reachable_from(ScaleDegree::TONIC) {
            let ahead = self.reachable_from(degree);
            if !ahead.iter().any(|d| self.is_dominant(*d)) && !self.is_dominant(degree) {
                return Err(ConfigError::UnreachableDominant {
                    degree: degree.value(),
                });
            }
        }
        Ok(())
    }

    /// Degrees reachable in one or more moves from `start`.
    fn reachable_from(&self, start: ScaleDegree) -> BTreeSet<ScaleDegree> {
        let mut seen = BTreeSet::new();
        let mut frontier = vec![start];
        while let Some(degree) = frontier.pop() {
            for &next in &self.chords[degree.index()].follows {
                if seen.insert(next) {
                    frontier.push(next);
                }
            }
        }
        seen
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self, chord: ScaleDegree) -> &ChordEntry {
        &self.chords[chord.index()]
    }

    pub fn follows(&self, chord: ScaleDegree) -> &[ScaleDegree] {
        &self.entry(chord).follows
    }

    pub fn reroll_count(&self, chord: ScaleDegree) -> u32 {
        self.entry(chord).reroll
    }

    pub fn dupe_percent(&self, chord: ScaleDegree) -> u8 {
        self.entry(chord).dupe_percent
    }

    pub fn chord_tones(&self, chord: ScaleDegree) -> [ScaleDegree; 3] {
        self.entry(chord).tones
    }

    pub fn third_of(&self, chord: ScaleDegree) -> ScaleDegree {
        self.entry(chord).tones[1]
    }

    pub fn quality(&self, chord: ScaleDegree) -> ChordQuality {
        self.entry(chord).quality
    }

    pub fn is_dominant(&self, chord: ScaleDegree) -> bool {
        self.dominants.contains(&chord)
    }

    pub fn function_of(&self, chord: ScaleDegree) -> HarmonicFunction {
        if chord == ScaleDegree::TONIC {
            HarmonicFunction::Tonic
        } else if self.dominants.contains(&chord) {
            HarmonicFunction::Dominant
        } else if self.predominants.contains(&chord) {
            HarmonicFunction::Predominant
        } else {
            HarmonicFunction::Other
        }
    }

    /// Roman numeral in root position, e.g. `ii` or `viio`.
    pub fn numeral(&self, chord: ScaleDegree) -> String {
        self.quality(chord).numeral(chord)
    }
}

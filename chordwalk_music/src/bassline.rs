// Bassline smoothing: choosing chord inversions after the fact.
//
// The progression is generated in root position. This pass walks the finished
// piece once, left to right, and decides for each chord whether to sound it
// in first inversion (third in the bass). Two things are weighed:
//
// - Bass correctness: the bass should match the first melody note of the
//   measure. Inverting is preferred when it makes the bass match and root
//   position does not.
// - Leap size: when inverting does not change whether the bass matches, invert
//   only if the bass moves a strictly shorter distance from the previous bass
//   (which is the previous chord's third if that chord was inverted).
//
// The leading-tone chord is always inverted. The final chord is always
// replaced by the tonic in root position, whatever came before.
//
// The pass is greedy: each decision sees only the previous one.

use crate::degree::{ScaleDegree, distance};
use crate::melody::Measure;
use crate::mode::{ChordQuality, ModeTables};
use serde::{Deserialize, Serialize};

/// Which chord tone sounds in the bass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inversion {
    Root,
    First,
    Second,
}

impl Inversion {
    /// Figured-bass suffix for a roman numeral.
    pub fn figure(self) -> &'static str {
        match self {
            Inversion::Root => "",
            Inversion::First => "6",
            Inversion::Second => "64",
        }
    }
}

/// A chord root with its inversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedChord {
    pub root: ScaleDegree,
    pub inversion: Inversion,
}

impl AnnotatedChord {
    pub fn root_position(root: ScaleDegree) -> Self {
        AnnotatedChord {
            root,
            inversion: Inversion::Root,
        }
    }

    pub fn first_inversion(root: ScaleDegree) -> Self {
        AnnotatedChord {
            root,
            inversion: Inversion::First,
        }
    }

    pub fn is_inverted(&self) -> bool {
        self.inversion != Inversion::Root
    }

    /// Degree sounding in the bass.
    pub fn bass(&self, tables: &ModeTables) -> ScaleDegree {
        let [root, third, fifth] = tables.chord_tones(self.root);
        match self.inversion {
            Inversion::Root => root,
            Inversion::First => third,
            Inversion::Second => fifth,
        }
    }

    /// Roman numeral with figure, e.g. `IV6`.
    pub fn symbol(&self, tables: &ModeTables) -> String {
        format!("{}{}", tables.numeral(self.root), self.inversion.figure())
    }

    /// How the chord is meant to be voiced. A `6` on a diminished triad is
    /// played with both lower tones raised an octave, i.e. second inversion.
    pub fn voiced_inversion(&self, tables: &ModeTables) -> Inversion {
        match (self.inversion, tables.quality(self.root)) {
            (Inversion::First, ChordQuality::Diminished) => Inversion::Second,
            (inversion, _) => inversion,
        }
    }
}

/// Annotate `progression` with inversions that smooth the bass against the
/// first note of each measure. Neither input is modified.
pub fn smooth_bassline(
    tables: &ModeTables,
    progression: &[ScaleDegree],
    measures: &[Measure],
) -> Vec<AnnotatedChord> {
    let lead = |i: usize| measures.get(i).and_then(|m| m.first()).copied();
    let mut chords: Vec<AnnotatedChord> = Vec::with_capacity(progression.len());

    for (i, &chord) in progression.iter().enumerate() {
        let third = tables.third_of(chord);
        let root_matches = lead(i) == Some(chord);
        let third_matches = lead(i) == Some(third);
        let correctness_better = third_matches && !root_matches;

        let invert = match chords.last() {
            None => correctness_better,
            Some(_) if chord == ScaleDegree::LEADING_TONE => true,
            Some(prev) => {
                let bass = prev.bass(tables);
                let root_leap = distance(bass, chord).abs();
                let third_leap = distance(bass, third).abs();
                correctness_better || (root_matches == third_matches && third_leap < root_leap)
            }
        };

        chords.push(if invert {
            AnnotatedChord::first_inversion(chord)
        } else {
            AnnotatedChord::root_position(chord)
        });
    }

    // The piece always ends on a plain tonic.
    if let Some(last) = chords.last_mut() {
        *last = AnnotatedChord::root_position(ScaleDegree::TONIC);
    }
    chords
}

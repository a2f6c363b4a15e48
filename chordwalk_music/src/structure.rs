// Form assembly: turning progressions and melodies into a finished piece.
//
// Two forms are supported:
// - A-B-A. Two sections of exactly `pattern_len` chords are drawn by
//   rejection sampling (B must differ from A), each gets its own melody, and
//   the piece plays A, B, then A again.
// - Through-composed. One progression of at least `min_bars` chords with its
//   melody.
//
// Either way the piece is closed with a one-note tonic bar when it does not
// already end on the tonic (sections always end on a dominant, so in practice
// it always is), and the bassline is smoothed over the whole thing.
//
// Whether the B section's melody continues A's running offset or starts
// fresh is controlled by `OffsetCarry`.

use crate::bassline::{AnnotatedChord, smooth_bassline};
use crate::degree::{ScaleDegree, distance};
use crate::error::ComposeError;
use crate::melody::{Measure, Melody, generate_melody};
use crate::mode::ModeTables;
use crate::offset::{GeneratorLimits, OffsetTracker};
use crate::progression::{ChordProgression, generate_progression, join_degrees};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// How the running pitch offset crosses from the A section into B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OffsetCarry {
    /// B starts from zero, independent of A.
    Isolated,
    /// B continues from wherever A's melody ended.
    Carried,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Exact chord count of the A and B sections.
    pub pattern_len: usize,
    pub offset_carry: OffsetCarry,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            pattern_len: 4,
            offset_carry: OffsetCarry::Isolated,
        }
    }
}

/// A finished piece: chords, inversions and melody, bar by bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// Chord roots before inversion.
    pub progression: ChordProgression,
    /// Smoothed chords, parallel to `progression`.
    pub chords: Vec<AnnotatedChord>,
    pub measures: Vec<Measure>,
    /// Running offset after each note, shaped like `measures`.
    pub offsets: Vec<Vec<i32>>,
}

impl Piece {
    pub fn chord_symbols(&self, tables: &ModeTables) -> Vec<String> {
        self.chords.iter().map(|c| c.symbol(tables)).collect()
    }

    /// Symbols as the chords are actually voiced, so a `viio6` reads `viio64`.
    pub fn voiced_symbols(&self, tables: &ModeTables) -> Vec<String> {
        self.chords
            .iter()
            .map(|c| format!("{}{}", tables.numeral(c.root), c.voiced_inversion(tables).figure()))
            .collect()
    }
}

/// Compose an A-B-A piece.
pub fn compose_aba(
    tables: &ModeTables,
    form: &FormConfig,
    limits: &GeneratorLimits,
    rng: &mut impl Rng,
) -> Result<Piece, ComposeError> {
    limits.validate()?;

    let a_chords = pick_section(tables, form.pattern_len, None, 'A', limits, rng)?;
    let mut tracker = OffsetTracker::new(limits);
    let a = generate_melody(tables, &a_chords, &mut tracker, rng);

    let b_chords = pick_section(tables, form.pattern_len, Some(&a_chords), 'B', limits, rng)?;
    if form.offset_carry == OffsetCarry::Isolated {
        tracker = OffsetTracker::new(limits);
    }
    let b = generate_melody(tables, &b_chords, &mut tracker, rng);

    let mut progression = ChordProgression::new();
    let mut melody = Melody::default();
    for (chords, section) in [(&a_chords, &a), (&b_chords, &b), (&a_chords, &a)] {
        progression.extend_from_slice(chords);
        melody.measures.extend_from_slice(&section.measures);
        melody.offsets.extend_from_slice(&section.offsets);
    }

    let closing_from = match form.offset_carry {
        OffsetCarry::Isolated => last_offset(&melody),
        OffsetCarry::Carried => tracker.current(),
    };
    close_on_tonic(&mut progression, &mut melody, closing_from);
    Ok(finish(tables, progression, melody))
}

/// Compose a single through-composed progression of at least `min_bars`.
pub fn compose_through(
    tables: &ModeTables,
    min_bars: usize,
    limits: &GeneratorLimits,
    rng: &mut impl Rng,
) -> Result<Piece, ComposeError> {
    limits.validate()?;

    let mut progression = generate_progression(tables, min_bars, limits, rng);
    let mut tracker = OffsetTracker::new(limits);
    let mut melody = generate_melody(tables, &progression, &mut tracker, rng);
    close_on_tonic(&mut progression, &mut melody, tracker.current());
    Ok(finish(tables, progression, melody))
}

/// Draw progressions until one is exactly `pattern_len` long and differs from
/// `differ_from`.
fn pick_section(
    tables: &ModeTables,
    pattern_len: usize,
    differ_from: Option<&[ScaleDegree]>,
    section: char,
    limits: &GeneratorLimits,
    rng: &mut impl Rng,
) -> Result<ChordProgression, ComposeError> {
    for attempt in 1..=limits.max_section_attempts {
        let candidate = generate_progression(tables, pattern_len, limits, rng);
        if candidate.len() == pattern_len
            && differ_from.is_none_or(|other| other != candidate.as_slice())
        {
            debug!(
                "section {section} after {attempt} attempts: {}",
                join_degrees(&candidate)
            );
            return Ok(candidate);
        }
    }
    Err(ComposeError::SectionRejected {
        section,
        attempts: limits.max_section_attempts,
    })
}

fn last_offset(melody: &Melody) -> i32 {
    melody
        .offsets
        .last()
        .and_then(|bar| bar.last())
        .copied()
        .unwrap_or(0)
}

/// Append a tonic chord with a single tonic note unless the piece already
/// ends on the tonic. `from_offset` is the running offset before that note.
fn close_on_tonic(progression: &mut ChordProgression, melody: &mut Melody, from_offset: i32) {
    if progression.is_empty() || progression.last() == Some(&ScaleDegree::TONIC) {
        return;
    }
    let last_note = melody
        .measures
        .last()
        .and_then(|bar| bar.last())
        .copied()
        .unwrap_or(ScaleDegree::TONIC);
    progression.push(ScaleDegree::TONIC);
    melody.measures.push(vec![ScaleDegree::TONIC]);
    melody
        .offsets
        .push(vec![from_offset + distance(last_note, ScaleDegree::TONIC)]);
}

fn finish(tables: &ModeTables, progression: ChordProgression, melody: Melody) -> Piece {
    let chords = smooth_bassline(tables, &progression, &melody.measures);
    let piece = Piece {
        progression,
        chords,
        measures: melody.measures,
        offsets: melody.offsets,
    };
    info!(
        "composed {} bars in {}: {}",
        piece.chords.len(),
        tables.name(),
        piece.chord_symbols(tables).join(" ")
    );
    piece
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn d(n: u8) -> ScaleDegree {
        ScaleDegree::new(n).unwrap()
    }

    fn aba(seed: u64, offset_carry: OffsetCarry) -> Piece {
        let form = FormConfig {
            offset_carry,
            ..FormConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        compose_aba(&ModeTables::major(), &form, &GeneratorLimits::default(), &mut rng).unwrap()
    }

    #[test]
    fn test_aba_shape() {
        for seed in 0..30 {
            let piece = aba(seed, OffsetCarry::Isolated);
            assert_eq!(piece.progression.len(), 13);
            assert_eq!(piece.chords.len(), 13);
            assert_eq!(piece.measures.len(), 13);
            assert_eq!(piece.offsets.len(), 13);

            let p = &piece.progression;
            assert_eq!(p[0..4], p[8..12]);
            assert_ne!(p[0..4], p[4..8]);
            assert_eq!(piece.measures[0..4], piece.measures[8..12]);
            assert_eq!(p[12], d(1));
            assert_eq!(piece.measures[12], vec![d(1)]);
            assert_eq!(piece.chords[12], AnnotatedChord::root_position(d(1)));
        }
    }

    #[test]
    fn test_isolated_sections_start_fresh() {
        for seed in 0..20 {
            let piece = aba(seed, OffsetCarry::Isolated);
            let b_first = piece.measures[4][0];
            assert_eq!(piece.offsets[4][0], distance(d(1), b_first));
            let closing = piece.offsets[11][3] + distance(piece.measures[11][3], d(1));
            assert_eq!(piece.offsets[12][0], closing);
        }
    }

    #[test]
    fn test_carried_sections_continue() {
        for seed in 0..20 {
            let piece = aba(seed, OffsetCarry::Carried);
            let b_first = piece.measures[4][0];
            assert_eq!(
                piece.offsets[4][0],
                piece.offsets[3][3] + distance(d(1), b_first)
            );
            let closing = piece.offsets[7][3] + distance(piece.measures[11][3], d(1));
            assert_eq!(piece.offsets[12][0], closing);
        }
    }

    #[test]
    fn test_sections_mostly_within_offset_bounds() {
        let mut total = 0;
        let mut inside = 0;
        for seed in 0..300 {
            let piece = aba(seed, OffsetCarry::Isolated);
            for offset in piece.offsets.iter().flatten() {
                total += 1;
                if (-8..=8).contains(offset) {
                    inside += 1;
                }
            }
        }
        assert!(inside * 100 >= total * 95, "{inside} of {total} inside");
    }

    #[test]
    fn test_same_seed_same_piece() {
        assert_eq!(aba(42, OffsetCarry::Isolated), aba(42, OffsetCarry::Isolated));
    }

    #[test]
    fn test_through_composed() {
        let tables = ModeTables::minor();
        let limits = GeneratorLimits::default();
        for seed in 0..30 {
            let mut rng = StdRng::seed_from_u64(seed);
            let piece = compose_through(&tables, 10, &limits, &mut rng).unwrap();
            let n = piece.progression.len();
            assert!(n >= 11);
            assert!(tables.is_dominant(piece.progression[n - 2]));
            assert_eq!(piece.progression[n - 1], d(1));
            assert_eq!(piece.chords[n - 1], AnnotatedChord::root_position(d(1)));
            assert_eq!(piece.chord_symbols(&tables)[n - 1], "i");
        }
    }

    #[test]
    fn test_impossible_section_is_rejected() {
        let limits = GeneratorLimits {
            max_section_attempts: 25,
            ..GeneratorLimits::default()
        };
        // No progression is a single chord: the tonic is never a dominant.
        let form = FormConfig {
            pattern_len: 1,
            ..FormConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let result = compose_aba(&ModeTables::major(), &form, &limits, &mut rng);
        assert!(matches!(
            result,
            Err(ComposeError::SectionRejected { section: 'A', attempts: 25 })
        ));
    }

    #[test]
    fn test_bad_limits_fail_fast() {
        let limits = GeneratorLimits {
            offset_floor: 8,
            offset_ceiling: -8,
            ..GeneratorLimits::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let result = compose_through(&ModeTables::major(), 4, &limits, &mut rng);
        assert!(matches!(
            result,
            Err(ComposeError::Config(ConfigError::OffsetBounds { .. }))
        ));
    }

    #[test]
    fn test_voiced_symbols() {
        let tables = ModeTables::major();
        let piece = Piece {
            progression: vec![d(1), d(7), d(4), d(1)],
            chords: vec![
                AnnotatedChord::root_position(d(1)),
                AnnotatedChord::first_inversion(d(7)),
                AnnotatedChord::first_inversion(d(4)),
                AnnotatedChord::root_position(d(1)),
            ],
            measures: vec![],
            offsets: vec![],
        };
        assert_eq!(piece.chord_symbols(&tables), ["I", "viio6", "IV6", "I"]);
        assert_eq!(piece.voiced_symbols(&tables), ["I", "viio64", "IV6", "I"]);
    }

    #[test]
    fn test_close_on_tonic_skips_tonic_endings() {
        let mut progression = vec![d(1), d(5), d(1)];
        let mut melody = Melody {
            measures: vec![vec![d(1)], vec![d(2)], vec![d(1)]],
            offsets: vec![vec![0], vec![1], vec![0]],
        };
        close_on_tonic(&mut progression, &mut melody, 0);
        assert_eq!(progression.len(), 3);
        assert_eq!(melody.measures.len(), 3);
    }
}

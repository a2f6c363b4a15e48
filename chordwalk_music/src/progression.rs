// Chord progression generation: a biased random walk over the chord graph.
//
// A progression starts on the tonic and repeatedly picks a successor from the
// current chord's `follows` list. Two knobs shape the walk:
//
// - Reroll. A freshly picked chord must survive `reroll` further draws from
//   the same `follows` list. Any draw that lands elsewhere replaces it, and the
//   replacement must survive its own reroll count. Chords with high counts are
//   therefore picked less often without touching the uniform draw itself.
// - Repeats. Landing on the current chord again is kept only `dupe_percent`
//   percent of the time; otherwise the whole pick is redone.
//
// The walk stops once it is long enough and sits on a dominant. Both inner
// loops are random and unbounded in principle, so each is capped by
// `GeneratorLimits::max_chord_attempts`.

use crate::degree::ScaleDegree;
use crate::mode::ModeTables;
use crate::offset::GeneratorLimits;
use log::{debug, trace, warn};
use rand::Rng;

/// Chord roots in order. Starts on the tonic and, once generated, ends on a
/// dominant.
pub type ChordProgression = Vec<ScaleDegree>;

/// Generate a progression of at least `min_len` chords ending on a dominant.
pub fn generate_progression(
    tables: &ModeTables,
    min_len: usize,
    limits: &GeneratorLimits,
    rng: &mut impl Rng,
) -> ChordProgression {
    let mut progression = vec![ScaleDegree::TONIC];
    let mut last = ScaleDegree::TONIC;
    while progression.len() < min_len || !tables.is_dominant(last) {
        last = next_chord(tables, last, limits, rng);
        progression.push(last);
    }
    debug!("generated progression {}", join_degrees(&progression));
    progression
}

/// Pick the chord after `current`, applying reroll and repeat rules.
pub fn next_chord(
    tables: &ModeTables,
    current: ScaleDegree,
    limits: &GeneratorLimits,
    rng: &mut impl Rng,
) -> ScaleDegree {
    let mut next = reroll(tables, current, pick_successor(tables, current, rng), limits, rng);
    let mut rejected = 0;
    while next == current {
        if rng.random_range(0..100u8) < tables.dupe_percent(next) {
            trace!("kept repeated chord {next}");
            return next;
        }
        rejected += 1;
        if rejected >= limits.max_chord_attempts {
            let fallback = tables
                .follows(current)
                .iter()
                .copied()
                .find(|&d| d != current)
                .unwrap_or(current);
            warn!("chord {current} repeated {rejected} times, moving to {fallback}");
            return fallback;
        }
        next = reroll(tables, current, pick_successor(tables, current, rng), limits, rng);
    }
    next
}

/// Make `candidate` survive its reroll budget of fresh draws from `previous`'s
/// successors. A draw that differs replaces the candidate and restarts the
/// budget with the replacement's own count.
pub fn reroll(
    tables: &ModeTables,
    previous: ScaleDegree,
    candidate: ScaleDegree,
    limits: &GeneratorLimits,
    rng: &mut impl Rng,
) -> ScaleDegree {
    let mut chord = candidate;
    let mut remaining = tables.reroll_count(chord);
    let mut draws = 0;
    while remaining > 0 {
        if draws >= limits.max_chord_attempts {
            warn!("reroll after {previous} gave up after {draws} draws, keeping {chord}");
            break;
        }
        draws += 1;
        remaining -= 1;
        let redraw = pick_successor(tables, previous, rng);
        if redraw != chord {
            trace!("rerolled {chord} -> {redraw}");
            chord = redraw;
            remaining = tables.reroll_count(chord);
        }
    }
    chord
}

fn pick_successor(tables: &ModeTables, chord: ScaleDegree, rng: &mut impl Rng) -> ScaleDegree {
    let follows = tables.follows(chord);
    follows[rng.random_range(0..follows.len())]
}

pub(crate) fn join_degrees(degrees: &[ScaleDegree]) -> String {
    degrees
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

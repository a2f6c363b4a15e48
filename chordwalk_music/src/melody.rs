// Melody generation: one four-note measure per chord, voice-led by step.
//
// Each measure is shaped `[c ? ? c]`: its first and last notes must be chord
// tones of the measure's chord, the inner two run freely. Notes move by scale
// step wherever possible.
//
// - Consonant notes take the first chord tone (in root, third, fifth order)
//   that is one step away and keeps the running offset in range. If no such
//   step exists the line leaps to a random other chord tone, which is the only
//   move allowed to overshoot the range.
// - Free notes turn back at the edge of the range and otherwise continue in
//   the direction of the previous interval (falling lines keep falling while
//   they can, anything else rises).
//
// The first measure is seeded by hand: a random tonic-chord tone, a step
// either way, then one free note and one consonant note. The last two notes
// and the `OffsetTracker` carry across measure boundaries.

use crate::degree::{ScaleDegree, is_trending_down};
use crate::mode::ModeTables;
use crate::offset::OffsetTracker;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const NOTES_PER_MEASURE: usize = 4;

/// The notes sung over one chord.
pub type Measure = Vec<ScaleDegree>;

/// Measures plus the running offset after every note, in the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Melody {
    pub measures: Vec<Measure>,
    pub offsets: Vec<Vec<i32>>,
}

/// The two most recent notes. The trend is read from `prev -> curr`.
#[derive(Debug, Clone, Copy)]
struct Recent {
    prev: ScaleDegree,
    curr: ScaleDegree,
}

impl Recent {
    fn push(&mut self, note: ScaleDegree) {
        self.prev = self.curr;
        self.curr = note;
    }
}

/// Generate one measure per chord of `progression`.
pub fn generate_melody(
    tables: &ModeTables,
    progression: &[ScaleDegree],
    tracker: &mut OffsetTracker,
    rng: &mut impl Rng,
) -> Melody {
    let mut melody = Melody::default();
    let Some((&first_chord, rest)) = progression.split_first() else {
        return melody;
    };

    let (opening, opening_offsets, mut recent) =
        opening_measure(tables, first_chord, tracker, rng);
    melody.measures.push(opening);
    melody.offsets.push(opening_offsets);

    for &chord in rest {
        let mut measure = Measure::with_capacity(NOTES_PER_MEASURE);
        let mut offsets = Vec::with_capacity(NOTES_PER_MEASURE);
        for i in 0..NOTES_PER_MEASURE {
            let consonant = i == 0 || i == NOTES_PER_MEASURE - 1;
            let note = next_note(tables, recent.prev, recent.curr, chord, consonant, tracker, rng);
            recent.push(note);
            measure.push(note);
            offsets.push(tracker.current());
        }
        melody.measures.push(measure);
        melody.offsets.push(offsets);
    }
    melody
}

/// The hand-seeded first measure.
fn opening_measure(
    tables: &ModeTables,
    chord: ScaleDegree,
    tracker: &mut OffsetTracker,
    rng: &mut impl Rng,
) -> (Measure, Vec<i32>, Recent) {
    let tones = tables.chord_tones(chord);
    let start = tones[rng.random_range(0..tones.len())];
    tracker.advance(ScaleDegree::TONIC, start);
    let mut offsets = vec![tracker.current()];

    // Coin flip for the opening direction.
    let second = if rng.random_bool(0.5) {
        start.step_down()
    } else {
        start.step_up()
    };
    tracker.advance(start, second);
    offsets.push(tracker.current());

    let mut recent = Recent {
        prev: start,
        curr: second,
    };
    let mut measure = vec![start, second];
    for consonant in [false, true] {
        let note = next_note(tables, recent.prev, recent.curr, chord, consonant, tracker, rng);
        recent.push(note);
        measure.push(note);
        offsets.push(tracker.current());
    }
    (measure, offsets, recent)
}

/// Choose the note after `curr` over `chord` and record the move in `tracker`.
pub fn next_note(
    tables: &ModeTables,
    prev: ScaleDegree,
    curr: ScaleDegree,
    chord: ScaleDegree,
    consonant: bool,
    tracker: &mut OffsetTracker,
    rng: &mut impl Rng,
) -> ScaleDegree {
    let up = curr.step_up();
    let down = curr.step_down();

    if consonant {
        let tones = tables.chord_tones(chord);
        if let Some(&tone) = tones
            .iter()
            .find(|&&t| (t == up || t == down) && t != curr && tracker.is_viable(curr, t))
        {
            return tracker.advance(curr, tone);
        }
        // Dead end: leap anywhere in the chord, even out of range.
        let others: Vec<ScaleDegree> = tones.iter().copied().filter(|&t| t != curr).collect();
        let leap = others[rng.random_range(0..others.len())];
        return tracker.advance(curr, leap);
    }

    if tracker.at_floor() {
        return tracker.advance(curr, up);
    }
    if tracker.at_ceiling() {
        return tracker.advance(curr, down);
    }
    if is_trending_down(prev, curr) && tracker.is_viable(curr, down) {
        tracker.advance(curr, down)
    } else {
        tracker.advance(curr, up)
    }
}

// Chordwalk Music Generator
//
// A procedural tonal composer. Chord progressions are walked through a
// per-mode successor graph until they reach a dominant, a single-voice melody
// is laid over the chords one four-note bar per chord, and a final pass picks
// chord inversions that keep the bassline smooth against the melody.
//
// Architecture:
// - degree.rs: Scale degrees 1-7 and the signed staff distance between them
// - mode.rs: Major/minor chord tables (successor graph, reroll counts,
//   repeat chances, chord tones), validation, JSON loading, roman numerals
// - offset.rs: Generator limits and the running pitch-offset tracker
// - progression.rs: Biased random walk over the chord graph
// - melody.rs: Four-note bars alternating consonant and stepwise notes
// - bassline.rs: Greedy root/first-inversion choice per chord
// - structure.rs: A-B-A and through-composed form assembly into a `Piece`
// - error.rs: Configuration and composition errors
//
// All randomness flows through a caller-supplied `rand::Rng`, so a seeded
// `StdRng` gives reproducible output.

pub mod bassline;
pub mod degree;
pub mod error;
pub mod melody;
pub mod mode;
pub mod offset;
pub mod progression;
pub mod structure;

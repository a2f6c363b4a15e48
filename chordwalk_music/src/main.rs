// Chordwalk Music Generator: CLI entry point.
//
// Composes one piece and prints it: the chord symbols with their inversions,
// the melody bar by bar, and the running pitch offset under each note.
//
// Usage:
//   cargo run -p chordwalk_music -- [MIN_BARS] [M|m] [--form aba|through]
//     [--seed N] [--tables FILE] [--carry-offset] [--json] [--verbose]
//
// MIN_BARS only applies to the through-composed form; A-B-A sections are
// always four chords long. Set RUST_LOG for finer logging control.

use chordwalk_music::mode::{Mode, ModeTables};
use chordwalk_music::offset::GeneratorLimits;
use chordwalk_music::structure::{FormConfig, OffsetCarry, Piece, compose_aba, compose_through};
use clap::{Parser, ValueEnum};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Form {
    /// Two four-chord sections played A, B, A
    Aba,
    /// One progression of at least MIN_BARS chords
    Through,
}

/// Generates a tonal chord progression with melody and smoothed bassline.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Minimum number of chords for the through-composed form
    #[arg(default_value_t = 16)]
    min_bars: usize,

    /// Key: M for major, m for minor
    #[arg(default_value = "M")]
    mode: Mode,

    #[arg(long, value_enum, default_value_t = Form::Aba)]
    form: Form,

    /// Seed for reproducible output; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// JSON chord tables to use instead of the built-in mode
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Continue the melody's offset from A into B instead of restarting it
    #[arg(long)]
    carry_offset: bool,

    /// Print the piece as JSON
    #[arg(long)]
    json: bool,

    /// Log generation details and print harmonic functions and voicings
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let tables = match &cli.tables {
        Some(path) => {
            info!("loading chord tables from {}", path.display());
            ModeTables::load(path)?
        }
        None => cli.mode.tables(),
    };

    let mut rng = match cli.seed {
        Some(seed) => {
            info!("seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let limits = GeneratorLimits::default();
    let piece = match cli.form {
        Form::Aba => {
            let form = FormConfig {
                offset_carry: if cli.carry_offset {
                    OffsetCarry::Carried
                } else {
                    OffsetCarry::Isolated
                },
                ..FormConfig::default()
            };
            compose_aba(&tables, &form, &limits, &mut rng)?
        }
        Form::Through => compose_through(&tables, cli.min_bars, &limits, &mut rng)?,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&piece)?);
        return Ok(());
    }

    println!("=== Chordwalk ({}) ===", tables.name());
    if let Some(seed) = cli.seed {
        println!("Seed: {seed}");
    }
    print_piece(&tables, &piece, cli.verbose);
    Ok(())
}

/// One row per bar: chord symbol, then each note with its offset. Verbose
/// rows add the harmonic function and the voicing.
fn print_piece(tables: &ModeTables, piece: &Piece, verbose: bool) {
    let symbols = piece.chord_symbols(tables);
    let voiced = piece.voiced_symbols(tables);
    for (bar, symbol) in symbols.iter().enumerate() {
        let notes: Vec<String> = piece.measures[bar]
            .iter()
            .zip(&piece.offsets[bar])
            .map(|(note, offset)| format!("{note}({offset:+})"))
            .collect();
        let detail = if verbose {
            let function = format!("{:?}", tables.function_of(piece.progression[bar]));
            format!(" {function:<12} {:<8}", voiced[bar])
        } else {
            String::new()
        };
        println!("{:>3}  {symbol:<6}{detail} {}", bar + 1, notes.join(" "));
    }
}

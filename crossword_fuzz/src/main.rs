//! `regex_crossword_solver_fuzz`: generates semi-random regex source
//! strings, parses and constrains each one with and without the optimizer
//! (§8 Property 2, §9 "Open Questions carried from source" (c)), and exits
//! nonzero the moment an optimized regex narrows a constraint differently
//! from its unoptimized twin.
//!
//! Grounded on `examples/original_source/source/fuzz_tests/fuzz_tests.cpp`:
//! same character alphabet, same length distribution, same
//! "too many repetition operators" skip heuristic, same sidecar-file
//! crash trail and periodic statistics.

use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use regexp::constraint::Constraint;
use regexp::optimizer::OptimizerFlags;
use regexp::{Alphabet, Regex};

/// The sidecar file a crash leaves behind with the offending regex source
/// (§6 "Persisted state").
const SIDECAR_PATH: &str = "fuzz_test_regex.txt";

/// A regex with two or more repetition operators can blow up the
/// alternative-enumeration cost; skip constraining those rather than
/// timing out the whole run, exactly as the original's
/// `would_take_too_long_to_constrain`.
const MAX_REPETITION_OPERATORS: usize = 1;

const MIN_LENGTH: usize = 0;
const MAX_LENGTH: usize = 20;

/// Printable ASCII, duplicating the `0-9:;<=>?` run -- kept exactly as the
/// original's `random_char` table (it biases the distribution toward
/// digits and punctuation, which is deliberate: it exercises shorthand
/// classes and counted repetition more often).
const RANDOM_CHARS: &str = concat!(
    " !\"#$%&'()*+,-./",
    "0123456789:;<=>?",
    "0123456789:;<=>?",
    "@ABCDEFGHIJKLMNO",
    "PQRSTUVWXYZ[\\]^_",
    "`abcdefghijklmno",
    "pqrstuvwxyz{|}~",
);

#[derive(Parser, Debug)]
#[command(
    name = "regex_crossword_solver_fuzz",
    about = "Fuzz-test the regex engine's constrain operation against its optimizer"
)]
struct Args {
    /// Use a time-based seed instead of the fixed default, so the sequence
    /// of tests differs across runs.
    #[arg(long)]
    randomize: bool,

    /// Run exactly this many tests, then stop. Without this, runs until
    /// interrupted.
    #[arg(long = "num-tests")]
    num_tests: Option<u64>,

    /// Seed the RNG explicitly, to replay a specific run (e.g. the one
    /// that produced a leftover sidecar file).
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Default)]
struct Stats {
    unparseable: u64,
    bad_structure: u64,
    skipped_too_slow: u64,
    constrained: u64,
}

impl Stats {
    fn total(&self) -> u64 {
        self.unparseable + self.bad_structure + self.skipped_too_slow + self.constrained
    }

    fn report(&self) {
        let total = self.total().max(1);
        let pct = |n: u64| (n as f64) / (total as f64) * 100.0;
        tracing::info!(
            unparseable = self.unparseable,
            unparseable_pct = format!("{:.2}%", pct(self.unparseable)),
            bad_structure = self.bad_structure,
            bad_structure_pct = format!("{:.2}%", pct(self.bad_structure)),
            skipped_too_slow = self.skipped_too_slow,
            skipped_pct = format!("{:.2}%", pct(self.skipped_too_slow)),
            constrained = self.constrained,
            constrained_pct = format!("{:.2}%", pct(self.constrained)),
            total = self.total(),
            "fuzz statistics"
        );
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn random_string(rng: &mut StdRng) -> String {
    let chars: Vec<char> = RANDOM_CHARS.chars().collect();
    let length = rng.gen_range(MIN_LENGTH..=MAX_LENGTH);
    (0..length)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}

fn would_take_too_long_to_constrain(s: &str) -> bool {
    let num_kleene_or_plus_or_question = s.chars().filter(|&c| c == '*' || c == '+' || c == '?').count();
    let has_counted_repetition = s.contains('{') && s.contains('}');
    let num_repetition_operators =
        num_kleene_or_plus_or_question + if has_counted_repetition { 1 } else { 0 };
    num_repetition_operators > MAX_REPETITION_OPERATORS
}

fn save_regex_string_to_disk(s: &str) {
    if let Ok(mut f) = fs::File::create(SIDECAR_PATH) {
        let _ = f.write_all(s.as_bytes());
    }
}

fn remove_regex_string_from_disk() {
    let _ = fs::remove_file(SIDECAR_PATH);
}

/// OR-combines every exactly-fitting value's constraint, independent of
/// which optimizer flags built the regex -- this is the quantity spec §8
/// Property 2 asserts optimization-invariant.
fn combined_constraint(regex: &Regex, n: usize) -> Constraint {
    regex.constrain(&Constraint::all(n, Alphabet::all()))
}

/// Parses, optionally optimizes, and compares `source`'s constrained
/// output with and without the optimizer. Returns `Err` with a diagnostic
/// the moment the two disagree.
fn check_constraints(source: &str) -> regexp::Result<bool> {
    let unoptimized = match Regex::with_flags(source, source.chars().count(), OptimizerFlags::empty()) {
        Ok(r) => r,
        Err(_) => return Ok(false),
    };

    let explicit_characters = unoptimized.explicit_characters();
    if explicit_characters.is_empty() {
        // A regex of only anchors/epsilon/backreferences has no character
        // to seed an alphabet with; nothing to constrain.
        return Ok(false);
    }

    Alphabet::reset();
    Alphabet::set(&explicit_characters)?;

    let optimized = Regex::with_flags(source, source.chars().count(), OptimizerFlags::ALL)?;

    let n = source.chars().count();
    let plain = combined_constraint(&unoptimized, n);
    let with_optimizations = combined_constraint(&optimized, n);

    if plain != with_optimizations {
        return Err(failure::format_err!(
            "different constraints for {:?} without and with optimizations",
            source
        ));
    }

    Ok(true)
}

fn test_string(source: &str, stats: &mut Stats) -> regexp::Result<()> {
    let parsed = match regexp::parser::parse(source) {
        Ok(outcome) => outcome,
        Err(_) => {
            stats.unparseable += 1;
            return Ok(());
        }
    };
    if parsed.group_count > 9 {
        stats.bad_structure += 1;
        return Ok(());
    }

    if would_take_too_long_to_constrain(source) {
        stats.skipped_too_slow += 1;
        return Ok(());
    }

    match check_constraints(source)? {
        true => stats.constrained += 1,
        false => stats.skipped_too_slow += 1,
    }
    Ok(())
}

fn run(args: Args) -> regexp::Result<()> {
    if let Some(leftover) = read_leftover_sidecar() {
        tracing::warn!(
            regex = %leftover,
            path = SIDECAR_PATH,
            "a previous run left a sidecar file behind; it may have crashed on this regex"
        );
    }

    let seed = if args.randomize {
        time_seed()
    } else {
        args.seed.unwrap_or(0)
    };
    let mut rng = StdRng::seed_from_u64(seed);

    let mut stats = Stats::default();
    let mut i: u64 = 0;
    loop {
        if let Some(limit) = args.num_tests {
            if i >= limit {
                break;
            }
        }

        if i != 0 && i % 1000 == 0 {
            stats.report();
        }
        i += 1;

        let s = random_string(&mut rng);
        save_regex_string_to_disk(&s);
        test_string(&s, &mut stats)?;
        remove_regex_string_from_disk();
    }

    stats.report();
    Ok(())
}

fn read_leftover_sidecar() -> Option<String> {
    if Path::new(SIDECAR_PATH).exists() {
        fs::read_to_string(SIDECAR_PATH).ok()
    } else {
        None
    }
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, sidecar = SIDECAR_PATH, "fuzz run found a discrepancy");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

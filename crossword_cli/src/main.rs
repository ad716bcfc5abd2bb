mod cli;
mod errors;
mod grid_reader;
mod printer;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;
use crate::errors::CommandLineError;

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

fn run() -> errors::Result<()> {
    let args = Cli::parse().solve_args();

    let grid_path = args.grid.ok_or_else(|| CommandLineError::InvalidStopAfter {
        value: "<missing grid path>".to_string(),
    })?;

    let stop_after = args.stop_after.unwrap_or(usize::MAX);
    if stop_after == 0 {
        return Err(CommandLineError::InvalidStopAfter {
            value: "0".to_string(),
        }
        .into());
    }

    tracing::debug!(path = %grid_path.display(), stop_after, "loading grid");
    let grid = grid_reader::read_grid(&grid_path)?;

    let solutions = grid.solve(stop_after);
    tracing::debug!(count = solutions.len(), "search finished");

    if solutions.is_empty() {
        println!("no solutions found");
    }
    for (i, solution) in solutions.iter().enumerate() {
        println!("solution {}:", i + 1);
        println!("{}", printer::render(solution));
    }

    Ok(())
}

fn main() -> ExitCode {
    init_logging();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "solver failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

//! Command-line surface (§6 "CLI"): a grid path and an optional
//! `--stop-after=N`, with `solve` as the implicit default subcommand so
//! `regex_crossword_solver GRID [--stop-after=N]` keeps working without
//! naming it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "regex_crossword_solver", about = "Solve regex crosswords")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub solve: SolveArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Solve a grid file and print every solution up to the cap.
    Solve(SolveArgs),
}

#[derive(Args, Debug, Default)]
pub struct SolveArgs {
    /// Path to a grid file (§6 grid file format).
    pub grid: Option<PathBuf>,

    /// Stop after finding this many solutions. Defaults to finding all of
    /// them.
    #[arg(long)]
    pub stop_after: Option<usize>,
}

impl Cli {
    /// Resolves the implicit-default-subcommand shape: `solve` applies
    /// whether or not the user typed its name.
    pub fn solve_args(self) -> SolveArgs {
        match self.command {
            Some(Command::Solve(args)) => args,
            None => self.solve,
        }
    }
}

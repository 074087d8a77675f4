//! Command-line front end: reads one or more DIMACS CNF files, runs the solver over each, and
//! prints solutions in the usual `s`/`v` DIMACS result format.
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use sat_core::{SolveTarget, Solver, SolverConfig};

/// A CDCL based SAT solver.
#[derive(Parser, Debug)]
#[clap(name = "sat")]
struct Opts {
    /// CNF file to solve. May be given more than once to solve several files in one run.
    #[clap(long = "cnf-file", required = true, multiple_occurrences(true))]
    cnf_file: Vec<PathBuf>,

    /// Logging verbosity, passed straight through to `env_logger`'s filter syntax.
    #[clap(long = "log-level", default_value = "info")]
    log_level: String,

    /// Write results to this file instead of stdout.
    #[clap(long = "output")]
    output: Option<PathBuf>,

    /// How many solutions to request per file: a count, or `all`.
    #[clap(long = "solutions", default_value = "1")]
    solutions: SolutionsArg,
}

/// The `--solutions` flag's value: either a bounded count or every solution.
#[derive(Debug, Clone, Copy)]
enum SolutionsArg {
    Count(u32),
    All,
}

impl FromStr for SolutionsArg {
    type Err = anyhow::Error;

    fn from_str(text: &str) -> Result<SolutionsArg> {
        if text.eq_ignore_ascii_case("all") {
            Ok(SolutionsArg::All)
        } else {
            text.parse::<u32>().map(SolutionsArg::Count).with_context(|| {
                format!("invalid --solutions value '{}', expected a number or 'all'", text)
            })
        }
    }
}

impl From<SolutionsArg> for SolveTarget {
    fn from(arg: SolutionsArg) -> SolveTarget {
        match arg {
            SolutionsArg::Count(n) => SolveTarget::Count(n),
            SolutionsArg::All => SolveTarget::All,
        }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            1
        }
    };
    std::process::exit(exit_code);
}

fn init_logging(level: &str) {
    env_logger::Builder::new()
        .parse_filters(level)
        .target(env_logger::Target::Stderr)
        .init();
}

/// Runs every requested file in turn, returning the process exit code: zero unless some file
/// failed to parse or the solver itself faulted (a proven UNSATISFIABLE result is still exit code
/// zero).
fn run() -> Result<i32> {
    let opts = Opts::parse();
    init_logging(&opts.log_level);

    let mut out: Box<dyn Write> = match &opts.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating output file '{}'", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    let mut exit_code = 0;
    for path in &opts.cnf_file {
        if let Err(err) = solve_one(path, opts.solutions, &mut *out) {
            error!("{}: {}", path.display(), err);
            exit_code = 1;
        }
    }

    Ok(exit_code)
}

fn solve_one(path: &Path, solutions: SolutionsArg, out: &mut dyn Write) -> Result<()> {
    info!("reading '{}'", path.display());
    let file = File::open(path).with_context(|| format!("opening '{}'", path.display()))?;
    let model = sat_dimacs::parse(file).with_context(|| format!("parsing '{}'", path.display()))?;

    let mut solver = Solver::new(&model, SolverConfig::default())?;
    let found = solver.solve(SolveTarget::from(solutions))?;

    if found.is_empty() {
        info!("UNSAT");
        writeln!(out, "s UNSATISFIABLE")?;
    } else {
        for solution in &found {
            writeln!(out, "s SATISFIABLE")?;
            write!(out, "v")?;
            for lit in solution.literals() {
                write!(out, " {}", lit)?;
            }
            writeln!(out, " 0")?;
        }
    }

    Ok(())
}

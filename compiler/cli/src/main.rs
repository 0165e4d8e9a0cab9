#![warn(clippy::nursery, clippy::pedantic, unused_crate_dependencies)]
#![allow(
    clippy::cognitive_complexity,
    clippy::match_same_arms,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines
)]

use clap::{Parser, Subcommand};
use tracing::{Level, Metadata};
use tracing_subscriber::{
    filter,
    fmt::{format::FmtSpan, writer::BoxMakeWriter},
    prelude::*,
};

mod analyze;
mod check;
mod print;
mod run;
mod utils;

#[derive(Parser, Debug)]
#[command(
    name = "hoist",
    about = "Hoists constant expressions of IR modules into globals."
)]
struct CliOptions {
    /// Show what the pass does while it runs.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::Options),

    /// Show which operations are constant expressions.
    Analyze(utils::OnlyPath),

    /// Parse and verify a module without changing it.
    Check(utils::OnlyPath),

    /// Print a module with syntax highlighting.
    Print(utils::OnlyPath),
}

fn main() -> ProgramResult {
    let options = CliOptions::parse();
    init_logger(options.verbose);

    match options.command {
        Command::Run(options) => run::run(options),
        Command::Analyze(options) => analyze::analyze(options),
        Command::Check(options) => check::check(options),
        Command::Print(options) => print::print(options),
    }
}

pub type ProgramResult = Result<(), Exit>;
#[derive(Debug)]
pub enum Exit {
    FileNotFound,
    CodeContainsErrors,
    InvalidModule,
    CouldNotWriteOutput,
}

fn init_logger(verbose: bool) {
    let hoist_level = if verbose { Level::DEBUG } else { Level::INFO };
    let console_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(BoxMakeWriter::new(std::io::stderr))
        .with_span_events(FmtSpan::ENTER)
        .with_filter(filter::filter_fn(|metadata| {
            // For external crates, show only the error logs.
            metadata.level() <= &Level::ERROR
                || metadata
                    .module_path()
                    .unwrap_or_default()
                    .starts_with("hoist")
        }))
        .with_filter(filter::filter_fn(level_for(
            "hoist_frontend::string_to_ir",
            Level::WARN,
        )))
        .with_filter(filter::filter_fn(level_for(
            "hoist_frontend::hoist",
            hoist_level,
        )))
        .with_filter(filter::filter_fn(level_for(
            "hoist_frontend::const_expr",
            Level::INFO,
        )))
        .with_filter(filter::filter_fn(level_for("hoist_frontend", Level::DEBUG)))
        .with_filter(filter::filter_fn(level_for("hoist_cli", Level::DEBUG)));
    tracing_subscriber::registry().with(console_log).init();
}
fn level_for(module: &'static str, level: Level) -> impl Fn(&Metadata) -> bool {
    move |metadata| {
        if metadata
            .module_path()
            .unwrap_or_default()
            .starts_with(module)
        {
            metadata.level() <= &level
        } else {
            true
        }
    }
}

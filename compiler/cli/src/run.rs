use crate::{
    print::print_rich_ir,
    utils::{read_module, verify_module},
    Exit, ProgramResult,
};
use clap::{Parser, ValueHint};
use hoist_frontend::{
    const_expr::DefaultHoistingPolicy,
    hoist::{HoistIntoGlobals, HoistOptions},
    rich_ir::ToRichIr,
};
use std::{
    fs,
    path::PathBuf,
    time::{Duration, Instant},
};
use tracing::{debug, error, info};

/// Hoist constant expressions into globals.
///
/// This command reads the given module, runs the hoisting pass on it and
/// prints the result. Every use of a constant expression that escapes into
/// runtime code then loads a private global instead, and the global is
/// computed by a new initializer.
#[derive(Parser, Debug)]
pub(crate) struct Options {
    #[arg(value_hint = ValueHint::FilePath)]
    path: PathBuf,

    /// Write the transformed module to this file instead of printing it.
    #[arg(long, short, value_hint = ValueHint::FilePath)]
    output: Option<PathBuf>,

    /// Keep constant expressions that became unused.
    #[arg(long)]
    no_cleanup: bool,

    /// Verify the module after hoisting, even in release builds.
    #[arg(long)]
    verify: bool,
}

pub(crate) fn run(options: Options) -> ProgramResult {
    let mut module = read_module(&options.path)?;

    let hoist_options = HoistOptions {
        verify: false,
        cleanup: !options.no_cleanup,
    };
    debug!(
        "Running `{}` on {}.",
        HoistIntoGlobals::<DefaultHoistingPolicy>::NAME,
        options.path.display(),
    );
    let start = Instant::now();
    let summary = HoistIntoGlobals::<DefaultHoistingPolicy>::default()
        .with_options(hoist_options)
        .run(&mut module);
    debug!("Hoisting took {}.", format_duration(start.elapsed()));
    info!("{summary}.");

    if options.verify || cfg!(debug_assertions) {
        verify_module(&module)?;
    }

    match options.output {
        Some(output) => fs::write(&output, module.to_string()).map_err(|error| {
            error!("Couldn't write to {}: {error}", output.display());
            Exit::CouldNotWriteOutput
        }),
        None => {
            print_rich_ir(&module.to_rich_ir());
            Ok(())
        }
    }
}

fn format_duration(duration: Duration) -> String {
    if duration < Duration::from_millis(1) {
        format!("{} µs", duration.as_micros())
    } else {
        format!("{} ms", duration.as_millis())
    }
}

use crate::Exit;
use clap::{Parser, ValueHint};
use hoist_frontend::{ir::Module, string_to_ir::parse_module};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::error;

#[derive(Parser, Debug)]
pub(crate) struct OnlyPath {
    #[arg(value_hint = ValueHint::FilePath)]
    pub path: PathBuf,
}

/// Reads, parses and verifies the module at `path`.
pub fn read_module(path: &Path) -> Result<Module, Exit> {
    let source = fs::read_to_string(path).map_err(|error| {
        if error.kind() == ErrorKind::NotFound {
            error!("The given file doesn't exist.");
        } else {
            error!("Couldn't read {}: {error}", path.display());
        }
        Exit::FileNotFound
    })?;
    let module = parse_module(&source).map_err(|error| {
        error!("{}:{error}", path.display());
        Exit::CodeContainsErrors
    })?;
    verify_module(&module)?;
    Ok(module)
}

pub fn verify_module(module: &Module) -> Result<(), Exit> {
    module.verify().map_err(|error| {
        error!("The module is invalid: {error}");
        Exit::InvalidModule
    })
}

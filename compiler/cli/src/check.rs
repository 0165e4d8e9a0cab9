use crate::{
    utils::{read_module, OnlyPath},
    ProgramResult,
};
use tracing::info;

pub(crate) fn check(options: OnlyPath) -> ProgramResult {
    let module = read_module(&options.path)?;
    info!("{} is valid: {}.", options.path.display(), module.statistics());
    Ok(())
}

use crate::{
    print::print_rich_ir,
    utils::{read_module, OnlyPath},
    ProgramResult,
};
use hoist_frontend::{const_expr::ConstExprAnalysis, rich_ir::ToRichIr};
use tracing::debug;

pub(crate) fn analyze(options: OnlyPath) -> ProgramResult {
    let module = read_module(&options.path)?;
    let analysis = ConstExprAnalysis::new(&module);
    debug!(
        "{} const-expr operations.",
        analysis.const_expr_operations().count(),
    );
    print_rich_ir(&analysis.report(&module).to_rich_ir());
    Ok(())
}

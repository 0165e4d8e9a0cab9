use super::log::HoistLog;
use crate::{
    ir::{Module, OperationId, UseDefIndex},
    utils::HashSetExtension,
};
use itertools::Itertools;
use rustc_hash::FxHashSet;
use std::io::Write;
use tracing::debug;

/// Erases operations from `candidates` until none of the remaining ones has
/// an unused result set. Returns how many operations were erased.
///
/// Erasing an operation can make its operands' producers dead, so this loops
/// until nothing changes.
pub fn erase_dead_operations<W: Write>(
    module: &mut Module,
    index: &mut UseDefIndex,
    mut candidates: FxHashSet<OperationId>,
    mut log: Option<&mut HoistLog<W>>,
) -> usize {
    let mut erased_count = 0;
    let mut made_changes = true;
    while made_changes {
        made_changes = false;
        for id in candidates.iter().copied().sorted().collect_vec() {
            let Some(operation) = index.operation(id) else {
                candidates.remove(&id);
                continue;
            };
            if operation.result_ids().any(|result| index.has_uses(result)) {
                continue;
            }

            debug!("Erasing dead {operation}");
            if let Some(log) = log.as_deref_mut() {
                log.log_erase(&operation.to_string());
            }
            module
                .erase_operation(id)
                .expect("The index only contains operations of the module.");
            index.remove_operation(id);
            candidates.force_remove(&id);
            erased_count += 1;
            made_changes = true;
        }
    }
    erased_count
}

use super::{
    materialize::{self, ModuleBegin, HOISTED_GLOBAL_NAME},
    HoistedGlobal, HoistedGlobals,
};
use crate::{
    ir::{Id, Module, Operation, OperationKind, SymbolTable, UseDefIndex},
    utils::HashMapExtension,
};
use itertools::Itertools;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Moves the computation of `value` into a new initializer at the end of the
/// module.
///
/// The defining operation and its backward slice are cloned into the
/// initializer. Slice operations that were hoisted before are replaced by
/// loads of their globals. Each result of the defining operation gets stored
/// into a new private, immutable global, which is recorded in `hoisted`.
/// `index` learns about the initializer's operations.
pub fn clone_const_expr_into_initializer(
    module: &mut Module,
    index: &mut UseDefIndex,
    symbols: &mut SymbolTable,
    hoisted: &mut HoistedGlobals,
    value: Id,
) {
    let root = index
        .definition_of(value)
        .cloned()
        .expect("Hoisted values are always operation results.");
    let slice = index
        .backward_slice(root.id)
        .into_iter()
        .filter_map(|id| index.operation(id).cloned())
        .collect_vec();

    let mut initializer = materialize::create_initializer(root.location);
    let mut mapping = FxHashMap::default();
    for source in &slice {
        let existing = source
            .result_ids()
            .map(|result| hoisted.get(&result).cloned())
            .collect_vec();
        if existing.iter().all(Option::is_some) {
            for (result, global) in source.result_ids().zip(existing.into_iter().flatten()) {
                let load = module.ids.values.generate();
                initializer.body.push(Operation {
                    id: module.ids.operations.generate(),
                    results: vec![(load, global.type_)],
                    kind: OperationKind::Load {
                        global: global.name,
                    },
                    location: global.location,
                });
                mapping.insert(result, load);
            }
        } else {
            debug_assert!(
                existing.iter().all(Option::is_none),
                "Operations with multiple results are always hoisted as a whole.",
            );
            debug!("  Cloning {source}");
            let clone = source.clone_with_mapping(&mut mapping, &mut module.ids);
            initializer.body.push(clone);
        }
    }
    let clone = root.clone_with_mapping(&mut mapping, &mut module.ids);
    debug!("  Cloning {root}");
    initializer.body.push(clone);

    let mut module_begin = ModuleBegin::default();
    for (result, type_) in &root.results {
        let name = module_begin.create_global(
            module,
            symbols,
            root.location,
            HOISTED_GLOBAL_NAME,
            false,
            type_.clone(),
        );
        hoisted.force_insert(
            *result,
            HoistedGlobal {
                name: name.clone(),
                type_: type_.clone(),
                location: root.location,
            },
        );
        initializer.body.push(Operation {
            id: module.ids.operations.generate(),
            results: vec![],
            kind: OperationKind::Store {
                value: mapping[result],
                global: name,
            },
            location: root.location,
        });
    }
    initializer.body.push(Operation {
        id: module.ids.operations.generate(),
        results: vec![],
        kind: OperationKind::Return { values: vec![] },
        location: root.location,
    });
    for operation in &initializer.body {
        index.add_operation(operation);
    }
    materialize::append_initializer(module, initializer);
}

use super::{utils::backward_slice_by, Id, Module, Operand, Operation, OperationId};
use rustc_hash::FxHashMap;

/// Use-def chains of a module, kept up to date by the caller while it mutates
/// the module.
///
/// Lookups are hash-based, unlike the module-wide scans of [`Module`]'s own
/// helpers. Uses of a value are in pre-order as long as new operations only
/// get added at the end of the module or directly before an existing
/// operation that doesn't use them yet.
#[derive(Debug, Default)]
pub struct UseDefIndex {
    operations: FxHashMap<OperationId, Operation>,
    definitions: FxHashMap<Id, OperationId>,
    uses: FxHashMap<Id, Vec<Operand>>,
}
impl UseDefIndex {
    #[must_use]
    pub fn new(module: &Module) -> Self {
        let mut index = Self::default();
        for operation in module.operations() {
            index.add_operation(operation);
        }
        index
    }

    #[must_use]
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.operations.get(&id)
    }
    #[must_use]
    pub fn definition_of(&self, value: Id) -> Option<&Operation> {
        self.definitions
            .get(&value)
            .and_then(|operation| self.operations.get(operation))
    }
    #[must_use]
    pub fn uses_of(&self, value: Id) -> &[Operand] {
        self.uses.get(&value).map_or(&[], Vec::as_slice)
    }
    #[must_use]
    pub fn has_uses(&self, value: Id) -> bool {
        !self.uses_of(value).is_empty()
    }
    #[must_use]
    pub fn operand(&self, operand: Operand) -> Option<Id> {
        self.operation(operand.owner)?
            .operands()
            .get(operand.index)
            .copied()
    }

    /// Same as [`Module::backward_slice`].
    #[must_use]
    pub fn backward_slice(&self, root: OperationId) -> Vec<OperationId> {
        backward_slice_by(root, |operation| {
            self.operation(operation)
                .map(|operation| {
                    operation
                        .operands()
                        .into_iter()
                        .filter_map(|operand| self.definitions.get(&operand).copied())
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    pub fn add_operation(&mut self, operation: &Operation) {
        for result in operation.result_ids() {
            self.definitions.insert(result, operation.id);
        }
        for (index, value) in operation.operands().into_iter().enumerate() {
            self.uses.entry(value).or_default().push(Operand {
                owner: operation.id,
                index,
            });
        }
        self.operations.insert(operation.id, operation.clone());
    }
    /// Records that `operand` now uses `value`.
    pub fn set_operand(&mut self, operand: Operand, value: Id) {
        let Some(owner) = self.operations.get_mut(&operand.owner) else {
            return;
        };
        let mut operands = owner.kind.operands_mut();
        let Some(slot) = operands.get_mut(operand.index) else {
            return;
        };
        let previous = std::mem::replace(&mut **slot, value);
        if let Some(uses) = self.uses.get_mut(&previous) {
            uses.retain(|it| *it != operand);
        }
        self.uses.entry(value).or_default().push(operand);
    }
    pub fn remove_operation(&mut self, id: OperationId) {
        let Some(operation) = self.operations.remove(&id) else {
            return;
        };
        for result in operation.result_ids() {
            self.definitions.remove(&result);
        }
        for value in operation.operands() {
            if let Some(uses) = self.uses.get_mut(&value) {
                uses.retain(|operand| operand.owner != id);
            }
        }
    }
}

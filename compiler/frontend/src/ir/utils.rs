use super::{Id, IdGenerators, Module, Operand, Operation, OperationId};
use rustc_hash::{FxHashMap, FxHashSet};

impl Module {
    /// All uses of `value` in pre-order.
    #[must_use]
    pub fn uses_of(&self, value: Id) -> Vec<Operand> {
        self.operations()
            .flat_map(|operation| {
                operation
                    .operands()
                    .into_iter()
                    .enumerate()
                    .filter(move |(_, operand)| *operand == value)
                    .map(move |(index, _)| Operand {
                        owner: operation.id,
                        index,
                    })
            })
            .collect()
    }
    #[must_use]
    pub fn has_uses(&self, value: Id) -> bool {
        self.operations()
            .any(|operation| operation.operands().contains(&value))
    }
    /// How often each value is used. Unused values have no entry.
    #[must_use]
    pub fn use_counts(&self) -> FxHashMap<Id, usize> {
        let mut counts = FxHashMap::default();
        for operation in self.operations() {
            for operand in operation.operands() {
                *counts.entry(operand).or_default() += 1;
            }
        }
        counts
    }

    /// Maps each operation result to the operation defining it. Parameters
    /// have no defining operation.
    #[must_use]
    pub fn definitions(&self) -> FxHashMap<Id, OperationId> {
        self.operations()
            .flat_map(|operation| operation.result_ids().map(|id| (id, operation.id)))
            .collect()
    }
    #[must_use]
    pub fn definition_of(&self, value: Id) -> Option<&Operation> {
        self.operations()
            .find(|operation| operation.result_ids().any(|id| id == value))
    }

    /// The operations transitively producing the operands of `root`, ordered
    /// so that producers come before their consumers. `root` itself is
    /// excluded, as are parameters.
    #[must_use]
    pub fn backward_slice(&self, root: OperationId) -> Vec<OperationId> {
        let definitions = self.definitions();
        backward_slice_by(root, |operation| {
            self.operation(operation)
                .map(|operation| {
                    operation
                        .operands()
                        .into_iter()
                        .filter_map(|operand| definitions.get(&operand).copied())
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// Inserts `operation` directly before `target` in the same body. Returns
    /// `false` if `target` doesn't exist.
    pub fn insert_before(&mut self, target: OperationId, operation: Operation) -> bool {
        for body in self.bodies_mut() {
            if let Some(index) = body.position(target) {
                body.insert(index, operation);
                return true;
            }
        }
        false
    }
    pub fn erase_operation(&mut self, id: OperationId) -> Option<Operation> {
        self.bodies_mut().find_map(|body| body.remove(id))
    }
}

/// Iterative post-order DFS over `producers`, starting at the producers of
/// `root`.
pub(super) fn backward_slice_by<F>(root: OperationId, producers: F) -> Vec<OperationId>
where
    F: Fn(OperationId) -> Vec<OperationId>,
{
    let mut visited = FxHashSet::default();
    visited.insert(root);
    let mut slice = vec![];
    // The flag marks operations whose producers were already pushed.
    let mut stack = producers(root)
        .into_iter()
        .rev()
        .map(|producer| (producer, false))
        .collect::<Vec<_>>();
    while let Some((operation, producers_done)) = stack.pop() {
        if producers_done {
            slice.push(operation);
            continue;
        }
        if !visited.insert(operation) {
            continue;
        }
        stack.push((operation, true));
        for producer in producers(operation).into_iter().rev() {
            if !visited.contains(&producer) {
                stack.push((producer, false));
            }
        }
    }
    slice
}

impl Operation {
    /// Clones this operation with fresh ids. Operands are remapped through
    /// `mapping` (unmapped ones are kept) and the new results are recorded in
    /// it.
    #[must_use]
    pub fn clone_with_mapping(
        &self,
        mapping: &mut FxHashMap<Id, Id>,
        ids: &mut IdGenerators,
    ) -> Self {
        let mut kind = self.kind.clone();
        kind.replace_id_references(mapping);
        let results = self
            .results
            .iter()
            .map(|(id, type_)| {
                let new_id = ids.values.generate();
                mapping.insert(*id, new_id);
                (new_id, type_.clone())
            })
            .collect();
        Self {
            id: ids.operations.generate(),
            results,
            kind,
            location: self.location,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ir::{BinaryOperator, Module, Type, UnaryOperator};
    use rustc_hash::FxHashMap;

    fn diamond() -> Module {
        Module::build(|module| {
            module.push_function("main", vec![Type::Int], |body, parameters| {
                let two = body.push_constant(2);
                let negated = body.push_unary(UnaryOperator::Negate, two);
                let three = body.push_constant(3);
                let sum = body.push_binary(BinaryOperator::Add, negated, three);
                let product = body.push_binary(BinaryOperator::Multiply, sum, negated);
                let scaled = body.push_binary(BinaryOperator::Multiply, product, parameters[0]);
                body.push_return(vec![scaled, product]);
            });
        })
    }

    #[test]
    fn backward_slice_is_topologically_ordered() {
        let module = diamond();
        let product = module.operations().nth(4).unwrap();
        let slice = module
            .backward_slice(product.id)
            .into_iter()
            .map(|id| module.operation(id).unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            slice,
            [
                "$1: Int = constant 2",
                "$2: Int = negate $1",
                "$3: Int = constant 3",
                "$4: Int = add $2 $3",
            ],
        );
    }

    #[test]
    fn backward_slice_stops_at_parameters() {
        let module = diamond();
        let scaled = module.operations().nth(5).unwrap();
        assert_eq!(module.backward_slice(scaled.id).len(), 5);
        let constant = module.operations().next().unwrap();
        assert!(module.backward_slice(constant.id).is_empty());
    }

    #[test]
    fn uses_are_listed_in_pre_order() {
        let module = diamond();
        let negated = module.operations().nth(1).unwrap().results[0].0;
        let uses = module
            .uses_of(negated)
            .into_iter()
            .map(|operand| operand.to_string())
            .collect::<Vec<_>>();
        assert_eq!(uses, ["operand #0 of op3", "operand #1 of op4"]);
        assert_eq!(module.use_counts()[&negated], 2);
    }

    #[test]
    fn cloning_remaps_operands_and_results() {
        let mut module = diamond();
        let sum = module.operations().nth(3).unwrap().clone();
        let negated = sum.operands()[0];
        let mut mapping = FxHashMap::default();
        let replacement = module.ids.values.generate();
        mapping.insert(negated, replacement);

        let clone = sum.clone_with_mapping(&mut mapping, &mut module.ids);
        assert_eq!(clone.to_string(), "$8: Int = add $7 $3");
        assert_eq!(mapping[&sum.results[0].0], clone.results[0].0);
        assert_ne!(clone.id, sum.id);
    }

    #[test]
    fn erased_operations_disappear() {
        let mut module = diamond();
        let constant = module.operations().next().unwrap().id;
        assert!(module.erase_operation(constant).is_some());
        assert!(module.operation(constant).is_none());
        assert!(module.erase_operation(constant).is_none());
    }
}

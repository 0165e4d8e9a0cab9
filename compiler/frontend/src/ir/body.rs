use super::{
    id::{Id, OperationId},
    operation::{BinaryOperator, Operation, OperationKind, UnaryOperator},
    types::{Literal, Type},
    IdGenerators,
};
use crate::{
    position::Location,
    rich_ir::{RichIrBuilder, ToRichIr},
};
use rustc_hash::FxHashMap;
use std::{slice, vec};

/// A straight-line sequence of operations. Valid bodies end with a `return`.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Body {
    operations: Vec<Operation>,
}
impl Body {
    #[must_use]
    pub fn new(operations: Vec<Operation>) -> Self {
        Self { operations }
    }

    pub fn iter(&self) -> slice::Iter<'_, Operation> {
        self.operations.iter()
    }
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, Operation> {
        self.operations.iter_mut()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    #[must_use]
    pub fn position(&self, id: OperationId) -> Option<usize> {
        self.operations.iter().position(|operation| operation.id == id)
    }
    #[must_use]
    pub fn get(&self, id: OperationId) -> Option<&Operation> {
        self.operations.iter().find(|operation| operation.id == id)
    }
    pub fn get_mut(&mut self, id: OperationId) -> Option<&mut Operation> {
        self.operations
            .iter_mut()
            .find(|operation| operation.id == id)
    }
    #[must_use]
    pub fn terminator(&self) -> Option<&Operation> {
        self.operations
            .last()
            .filter(|operation| operation.kind.is_terminator())
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }
    pub fn insert(&mut self, index: usize, operation: Operation) {
        self.operations.insert(index, operation);
    }
    pub fn remove(&mut self, id: OperationId) -> Option<Operation> {
        let index = self.position(id)?;
        Some(self.operations.remove(index))
    }
}
impl IntoIterator for Body {
    type Item = Operation;
    type IntoIter = vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}
impl<'a> IntoIterator for &'a Body {
    type Item = &'a Operation;
    type IntoIter = slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
impl ToRichIr for Body {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        self.operations.build_rich_ir(builder);
    }
}

/// Appends operations to a body, generating fresh ids and inferring result
/// types from the operands.
pub struct BodyBuilder<'a> {
    ids: &'a mut IdGenerators,
    types: FxHashMap<Id, Type>,
    location: Location,
    body: Body,
}
impl<'a> BodyBuilder<'a> {
    pub fn new(ids: &'a mut IdGenerators) -> Self {
        Self {
            ids,
            types: FxHashMap::default(),
            location: Location::Unknown,
            body: Body::default(),
        }
    }

    pub fn new_parameter(&mut self, type_: Type) -> Id {
        let id = self.ids.values.generate();
        self.types.insert(id, type_);
        id
    }
    /// Operations pushed afterwards get this location.
    pub fn set_location(&mut self, location: impl Into<Location>) {
        self.location = location.into();
    }

    #[must_use]
    pub fn type_of(&self, id: Id) -> &Type {
        &self.types[&id]
    }

    pub fn push(&mut self, kind: OperationKind, result_types: Vec<Type>) -> Vec<Id> {
        let results = result_types
            .into_iter()
            .map(|type_| {
                let id = self.ids.values.generate();
                self.types.insert(id, type_.clone());
                (id, type_)
            })
            .collect::<Vec<_>>();
        let result_ids = results.iter().map(|(id, _)| *id).collect();
        self.body.push(Operation {
            id: self.ids.operations.generate(),
            results,
            kind,
            location: self.location,
        });
        result_ids
    }
    fn push_single(&mut self, kind: OperationKind, type_: Type) -> Id {
        self.push(kind, vec![type_])[0]
    }

    pub fn push_constant(&mut self, value: impl Into<Literal>) -> Id {
        let value = value.into();
        let type_ = value.type_();
        self.push_single(OperationKind::Constant(value), type_)
    }
    pub fn push_binary(&mut self, operator: BinaryOperator, lhs: Id, rhs: Id) -> Id {
        let type_ = operator.result_type(self.type_of(lhs));
        self.push_single(OperationKind::Binary { operator, lhs, rhs }, type_)
    }
    pub fn push_unary(&mut self, operator: UnaryOperator, operand: Id) -> Id {
        let type_ = operator.result_type(self.type_of(operand));
        self.push_single(OperationKind::Unary { operator, operand }, type_)
    }
    pub fn push_divrem(&mut self, dividend: Id, divisor: Id) -> (Id, Id) {
        let type_ = self.type_of(dividend).clone();
        let results = self.push(
            OperationKind::DivRem { dividend, divisor },
            vec![type_.clone(), type_],
        );
        (results[0], results[1])
    }
    pub fn push_splat(&mut self, value: Id, length: Id) -> Id {
        let type_ = Type::list(self.type_of(value).clone());
        self.push_single(OperationKind::Splat { value, length }, type_)
    }
    pub fn push_load(&mut self, global: impl Into<String>, type_: Type) -> Id {
        self.push_single(
            OperationKind::Load {
                global: global.into(),
            },
            type_,
        )
    }
    pub fn push_store(&mut self, value: Id, global: impl Into<String>) {
        self.push(
            OperationKind::Store {
                value,
                global: global.into(),
            },
            vec![],
        );
    }
    pub fn push_call(
        &mut self,
        function: impl Into<String>,
        arguments: Vec<Id>,
        result_types: Vec<Type>,
    ) -> Vec<Id> {
        self.push(
            OperationKind::Call {
                function: function.into(),
                arguments,
            },
            result_types,
        )
    }
    pub fn push_return(&mut self, values: Vec<Id>) {
        self.push(OperationKind::Return { values }, vec![]);
    }

    #[must_use]
    pub fn finish(self) -> Body {
        self.body
    }
}

use super::{
    id::{Id, OperationId},
    types::{Literal, Type},
};
use crate::{
    impl_display_via_richir,
    position::Location,
    rich_ir::{RichIrBuilder, ToRichIr, TokenType},
};
use rustc_hash::FxHashMap;
use strum_macros::{Display, EnumString, IntoStaticStr};

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equals,
    LessThan,
    And,
    Or,
    Concatenate,
}
impl BinaryOperator {
    /// The result type for operands of type `operand`.
    #[must_use]
    pub fn result_type(self, operand: &Type) -> Type {
        match self {
            Self::Equals | Self::LessThan | Self::And | Self::Or => Type::Bool,
            Self::Concatenate => Type::Text,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Remainder => {
                operand.clone()
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Display, EnumString, Eq, Hash, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "snake_case")]
pub enum UnaryOperator {
    Negate,
    Not,
}
impl UnaryOperator {
    #[must_use]
    pub fn result_type(self, operand: &Type) -> Type {
        match self {
            Self::Negate => operand.clone(),
            Self::Not => Type::Bool,
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum OperationKind {
    Constant(Literal),
    Binary {
        operator: BinaryOperator,
        lhs: Id,
        rhs: Id,
    },
    Unary {
        operator: UnaryOperator,
        operand: Id,
    },
    /// Quotient and remainder as two results.
    DivRem {
        dividend: Id,
        divisor: Id,
    },
    /// A list containing `value` `length` times.
    Splat {
        value: Id,
        length: Id,
    },
    Load {
        global: String,
    },
    Store {
        value: Id,
        global: String,
    },
    Call {
        function: String,
        arguments: Vec<Id>,
    },
    Return {
        values: Vec<Id>,
    },
}
impl OperationKind {
    /// The textual name, as used by the printer and the parser.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant(_) => "constant",
            Self::Binary { operator, .. } => (*operator).into(),
            Self::Unary { operator, .. } => (*operator).into(),
            Self::DivRem { .. } => "divrem",
            Self::Splat { .. } => "splat",
            Self::Load { .. } => "load",
            Self::Store { .. } => "store",
            Self::Call { .. } => "call",
            Self::Return { .. } => "return",
        }
    }

    /// Computations that neither touch globals nor have side effects.
    #[must_use]
    pub const fn is_pure(&self) -> bool {
        match self {
            Self::Constant(_)
            | Self::Binary { .. }
            | Self::Unary { .. }
            | Self::DivRem { .. }
            | Self::Splat { .. } => true,
            Self::Load { .. } | Self::Store { .. } | Self::Call { .. } | Self::Return { .. } => {
                false
            }
        }
    }
    #[must_use]
    pub const fn is_terminator(&self) -> bool {
        matches!(self, Self::Return { .. })
    }

    /// How many results this kind of operation produces. Calls may produce any
    /// number of results.
    #[must_use]
    pub const fn result_count(&self) -> Option<usize> {
        match self {
            Self::Constant(_)
            | Self::Binary { .. }
            | Self::Unary { .. }
            | Self::Splat { .. }
            | Self::Load { .. } => Some(1),
            Self::DivRem { .. } => Some(2),
            Self::Store { .. } | Self::Return { .. } => Some(0),
            Self::Call { .. } => None,
        }
    }

    /// Operands in order. Their indices are the operand indices used by
    /// [`super::Operand`].
    #[must_use]
    pub fn operands(&self) -> Vec<Id> {
        match self {
            Self::Constant(_) | Self::Load { .. } => vec![],
            Self::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            Self::Unary { operand, .. } => vec![*operand],
            Self::DivRem { dividend, divisor } => vec![*dividend, *divisor],
            Self::Splat { value, length } => vec![*value, *length],
            Self::Store { value, .. } => vec![*value],
            Self::Call { arguments, .. } => arguments.clone(),
            Self::Return { values } => values.clone(),
        }
    }
    pub fn operands_mut(&mut self) -> Vec<&mut Id> {
        match self {
            Self::Constant(_) | Self::Load { .. } => vec![],
            Self::Binary { lhs, rhs, .. } => vec![lhs, rhs],
            Self::Unary { operand, .. } => vec![operand],
            Self::DivRem { dividend, divisor } => vec![dividend, divisor],
            Self::Splat { value, length } => vec![value, length],
            Self::Store { value, .. } => vec![value],
            Self::Call { arguments, .. } => arguments.iter_mut().collect(),
            Self::Return { values } => values.iter_mut().collect(),
        }
    }

    #[must_use]
    pub fn referenced_global(&self) -> Option<&str> {
        match self {
            Self::Load { global } | Self::Store { global, .. } => Some(global),
            _ => None,
        }
    }

    /// Replaces operands according to `mapping`. Operands without an entry
    /// are kept.
    pub fn replace_id_references(&mut self, mapping: &FxHashMap<Id, Id>) {
        for operand in self.operands_mut() {
            if let Some(replacement) = mapping.get(operand) {
                *operand = *replacement;
            }
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Operation {
    pub id: OperationId,
    pub results: Vec<(Id, Type)>,
    pub kind: OperationKind,
    pub location: Location,
}
impl Operation {
    pub fn result_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.results.iter().map(|(id, _)| *id)
    }
    #[must_use]
    pub fn result_type(&self, result: Id) -> Option<&Type> {
        self.results
            .iter()
            .find(|(id, _)| *id == result)
            .map(|(_, type_)| type_)
    }
    #[must_use]
    pub fn operands(&self) -> Vec<Id> {
        self.kind.operands()
    }
}
impl_display_via_richir!(Operation);
impl ToRichIr for Operation {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        if !self.results.is_empty() {
            builder.push_children_custom(
                &self.results,
                |builder, (id, type_)| {
                    id.build_rich_ir(builder);
                    builder.push(": ", None);
                    type_.build_rich_ir(builder);
                },
                ", ",
            );
            builder.push(" = ", None);
        }
        self.kind.build_rich_ir(builder);
    }
}
impl_display_via_richir!(OperationKind);
impl ToRichIr for OperationKind {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        builder.push(self.name(), TokenType::Keyword);
        match self {
            Self::Constant(literal) => {
                builder.push(" ", None);
                literal.build_rich_ir(builder);
            }
            Self::Load { global } => {
                builder.push(" ", None);
                builder.push(format!("@{global}"), TokenType::Symbol);
            }
            Self::Store { value, global } => {
                builder.push(" ", None);
                value.build_rich_ir(builder);
                builder.push(" ", None);
                builder.push(format!("@{global}"), TokenType::Symbol);
            }
            Self::Call {
                function,
                arguments,
            } => {
                builder.push(" ", None);
                builder.push(format!("@{function}"), TokenType::Function);
                for argument in arguments {
                    builder.push(" ", None);
                    argument.build_rich_ir(builder);
                }
            }
            _ => {
                for operand in self.operands() {
                    builder.push(" ", None);
                    operand.build_rich_ir(builder);
                }
            }
        }
    }
}

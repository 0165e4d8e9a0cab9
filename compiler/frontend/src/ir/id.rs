use crate::{
    impl_countable_id,
    rich_ir::{RichIrBuilder, ToRichIr, TokenType},
};
use std::fmt::{self, Debug, Display, Formatter};

/// An SSA value: an operation result or a function parameter.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Id(usize);
impl_countable_id!(Id);

impl Debug for Id {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}
impl Display for Id {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "${}", self.0)
    }
}
impl ToRichIr for Id {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        builder.push(self.to_string(), TokenType::Variable);
    }
}

/// Identifies an operation independently of its position in a body.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct OperationId(usize);
impl_countable_id!(OperationId);

impl Debug for OperationId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}
impl Display for OperationId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "op{}", self.0)
    }
}

use crate::rich_ir::{RichIrBuilder, ToRichIr, TokenType};
use num_bigint::BigInt;
use std::fmt::{self, Display, Formatter};

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    Int,
    Bool,
    Text,
    List(Box<Type>),
}
impl Type {
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }
}
impl Display for Type {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Int => write!(f, "Int"),
            Self::Bool => write!(f, "Bool"),
            Self::Text => write!(f, "Text"),
            Self::List(element) => write!(f, "List[{element}]"),
        }
    }
}
impl ToRichIr for Type {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        builder.push(self.to_string(), TokenType::Type);
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Literal {
    Int(BigInt),
    Bool(bool),
    Text(String),
}
impl Literal {
    #[must_use]
    pub const fn type_(&self) -> Type {
        match self {
            Self::Int(_) => Type::Int,
            Self::Bool(_) => Type::Bool,
            Self::Text(_) => Type::Text,
        }
    }
}
impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Int(value.into())
    }
}
impl From<BigInt> for Literal {
    fn from(value: BigInt) -> Self {
        Self::Int(value)
    }
}
impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
impl Display for Literal {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => {
                write!(f, "\"")?;
                for character in value.chars() {
                    match character {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        character => write!(f, "{character}")?,
                    }
                }
                write!(f, "\"")
            }
        }
    }
}
impl ToRichIr for Literal {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        let token_type = match self {
            Self::Int(_) | Self::Bool(_) => TokenType::Int,
            Self::Text(_) => TokenType::Text,
        };
        builder.push(self.to_string(), token_type);
    }
}

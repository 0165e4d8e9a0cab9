use super::{Item, Module};
use std::{fmt, ops::Add};

/// Item and operation counts, logged before and after passes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Statistics {
    pub globals: usize,
    pub functions: usize,
    pub initializers: usize,
    pub operations: usize,
}
impl Add for Statistics {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            globals: self.globals + other.globals,
            functions: self.functions + other.functions,
            initializers: self.initializers + other.initializers,
            operations: self.operations + other.operations,
        }
    }
}
impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} globals, {} functions, {} initializers, {} operations",
            self.globals, self.functions, self.initializers, self.operations,
        )
    }
}

impl Module {
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.items
            .iter()
            .fold(Statistics::default(), |statistics, item| {
                statistics + item.statistics()
            })
    }
}
impl Item {
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        match self {
            Self::Global(_) => Statistics {
                globals: 1,
                ..Statistics::default()
            },
            Self::Function(function) => Statistics {
                functions: 1,
                operations: function.body.len(),
                ..Statistics::default()
            },
            Self::Initializer(initializer) => Statistics {
                initializers: 1,
                operations: initializer.body.len(),
                ..Statistics::default()
            },
        }
    }
}

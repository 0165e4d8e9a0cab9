use super::{Body, Id, Item, Module, OperationKind, Type};
use crate::position::Location;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::error;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum VerificationError {
    #[error("symbol `@{name}` is defined more than once")]
    DuplicateSymbol { name: String },
    #[error("{location}: value `{id}` is defined more than once")]
    ValueDefinedTwice { id: Id, location: Location },
    #[error("{location}: value `{id}` is used before it is defined in the same body")]
    UndefinedValue { id: Id, location: Location },
    #[error("{location}: `{operation}` produces {expected} results, but {found} are declared")]
    WrongResultCount {
        operation: &'static str,
        expected: usize,
        found: usize,
        location: Location,
    },
    #[error("{location}: global `@{name}` is not declared before it is used")]
    GlobalNotDeclared { name: String, location: Location },
    #[error("{location}: global `@{name}` has type {expected}, but is accessed as {found}")]
    GlobalTypeMismatch {
        name: String,
        expected: Type,
        found: Type,
        location: Location,
    },
    #[error("{location}: immutable global `@{name}` is stored outside of an initializer")]
    StoreToImmutableGlobal { name: String, location: Location },
    #[error("{location}: {routine} doesn't end with a `return`")]
    MissingReturn { routine: String, location: Location },
    #[error("{location}: `return` must be the last operation of {routine}")]
    ReturnNotLast { routine: String, location: Location },
    #[error("{location}: initializers can't return values")]
    InitializerReturnsValues { location: Location },
}

impl Module {
    pub fn verify(&self) -> Result<(), VerificationError> {
        let mut symbols = FxHashSet::default();
        for name in self.items.iter().filter_map(Item::symbol) {
            if !symbols.insert(name) {
                return Err(VerificationError::DuplicateSymbol {
                    name: name.to_string(),
                });
            }
        }

        let mut context = Context {
            declared_globals: FxHashMap::default(),
            defined: FxHashSet::default(),
        };
        for item in &self.items {
            match item {
                Item::Global(global) => {
                    context
                        .declared_globals
                        .insert(&global.name, (&global.type_, global.is_mutable));
                }
                Item::Function(function) => {
                    let routine = format!("function `@{}`", function.name);
                    let mut scope = FxHashMap::default();
                    for (id, type_) in &function.parameters {
                        context.define(*id, function.location)?;
                        scope.insert(*id, type_);
                    }
                    context.verify_body(
                        &function.body,
                        scope,
                        &routine,
                        false,
                        function.location,
                    )?;
                }
                Item::Initializer(initializer) => {
                    context.verify_body(
                        &initializer.body,
                        FxHashMap::default(),
                        "an initializer",
                        true,
                        initializer.location,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Panics if the module is invalid. Used after passes in debug builds.
    pub fn validate(&self) {
        if let Err(error) = self.verify() {
            error!("Module is invalid! {error}");
            error!("This is the module:\n{self}");
            panic!("Module is invalid!");
        }
    }
}

struct Context<'m> {
    /// Globals declared so far with their type and mutability.
    declared_globals: FxHashMap<&'m str, (&'m Type, bool)>,
    defined: FxHashSet<Id>,
}
impl<'m> Context<'m> {
    fn define(&mut self, id: Id, location: Location) -> Result<(), VerificationError> {
        if self.defined.insert(id) {
            Ok(())
        } else {
            Err(VerificationError::ValueDefinedTwice { id, location })
        }
    }

    fn verify_body(
        &mut self,
        body: &'m Body,
        mut scope: FxHashMap<Id, &'m Type>,
        routine: &str,
        is_initializer: bool,
        location: Location,
    ) -> Result<(), VerificationError> {
        let Some(last) = body.iter().last() else {
            return Err(VerificationError::MissingReturn {
                routine: routine.to_string(),
                location,
            });
        };
        if !last.kind.is_terminator() {
            return Err(VerificationError::MissingReturn {
                routine: routine.to_string(),
                location: last.location,
            });
        }

        for operation in body {
            let location = operation.location;
            if operation.kind.is_terminator() && operation.id != last.id {
                return Err(VerificationError::ReturnNotLast {
                    routine: routine.to_string(),
                    location,
                });
            }
            for id in operation.operands() {
                if !scope.contains_key(&id) {
                    return Err(VerificationError::UndefinedValue { id, location });
                }
            }
            if let Some(expected) = operation.kind.result_count() {
                if expected != operation.results.len() {
                    return Err(VerificationError::WrongResultCount {
                        operation: operation.kind.name(),
                        expected,
                        found: operation.results.len(),
                        location,
                    });
                }
            }

            match &operation.kind {
                OperationKind::Load { global } => {
                    let (type_, _) = self.global(global, location)?;
                    let found = &operation.results[0].1;
                    check_global_type(global, type_, found, location)?;
                }
                OperationKind::Store { value, global } => {
                    let (type_, is_mutable) = self.global(global, location)?;
                    check_global_type(global, type_, scope[value], location)?;
                    if !is_mutable && !is_initializer {
                        return Err(VerificationError::StoreToImmutableGlobal {
                            name: global.clone(),
                            location,
                        });
                    }
                }
                OperationKind::Return { values } if is_initializer && !values.is_empty() => {
                    return Err(VerificationError::InitializerReturnsValues { location });
                }
                _ => {}
            }

            for (id, type_) in &operation.results {
                self.define(*id, location)?;
                scope.insert(*id, type_);
            }
        }
        Ok(())
    }

    fn global(
        &self,
        name: &str,
        location: Location,
    ) -> Result<(&'m Type, bool), VerificationError> {
        self.declared_globals
            .get(name)
            .copied()
            .ok_or_else(|| VerificationError::GlobalNotDeclared {
                name: name.to_string(),
                location,
            })
    }
}

fn check_global_type(
    name: &str,
    expected: &Type,
    found: &Type,
    location: Location,
) -> Result<(), VerificationError> {
    if expected == found {
        Ok(())
    } else {
        Err(VerificationError::GlobalTypeMismatch {
            name: name.to_string(),
            expected: expected.clone(),
            found: found.clone(),
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::VerificationError;
    use crate::ir::{BinaryOperator, Global, Item, Module, OperationKind, Type};

    #[test]
    fn well_formed_module_verifies() {
        let module = Module::build(|module| {
            module.push_global(Global::new("limit", Type::Int));
            module.push_initializer(|body| {
                let value = body.push_constant(3);
                body.push_store(value, "limit");
                body.push_return(vec![]);
            });
            module.push_function("main", vec![Type::Int], |body, parameters| {
                let limit = body.push_load("limit", Type::Int);
                let sum = body.push_binary(BinaryOperator::Add, limit, parameters[0]);
                body.push_return(vec![sum]);
            });
        });
        assert_eq!(module.verify(), Ok(()));
    }

    #[test]
    fn globals_must_be_declared_before_use() {
        let module = Module::build(|module| {
            module.push_function("main", vec![], |body, _| {
                let value = body.push_load("later", Type::Int);
                body.push_return(vec![value]);
            });
            module.push_global(Global::new("later", Type::Int));
        });
        assert!(matches!(
            module.verify(),
            Err(VerificationError::GlobalNotDeclared { name, .. }) if name == "later",
        ));
    }

    #[test]
    fn immutable_globals_are_only_stored_in_initializers() {
        let module = Module::build(|module| {
            module.push_global(Global::new("limit", Type::Int));
            module.push_function("main", vec![], |body, _| {
                let value = body.push_constant(3);
                body.push_store(value, "limit");
                body.push_return(vec![]);
            });
        });
        assert!(matches!(
            module.verify(),
            Err(VerificationError::StoreToImmutableGlobal { .. }),
        ));
    }

    #[test]
    fn global_types_must_match() {
        let module = Module::build(|module| {
            module.push_global(Global::new("flag", Type::Bool).mutable());
            module.push_function("main", vec![], |body, _| {
                let value = body.push_constant(3);
                body.push_store(value, "flag");
                body.push_return(vec![]);
            });
        });
        assert_eq!(
            module.verify().unwrap_err().to_string(),
            "<unknown>: global `@flag` has type Bool, but is accessed as Int",
        );
    }

    #[test]
    fn bodies_end_with_a_single_return() {
        let missing = Module::build(|module| {
            module.push_function("main", vec![], |body, _| {
                body.push_constant(1);
            });
        });
        assert!(matches!(
            missing.verify(),
            Err(VerificationError::MissingReturn { .. }),
        ));

        let early = Module::build(|module| {
            module.push_function("main", vec![], |body, _| {
                body.push_return(vec![]);
                body.push_return(vec![]);
            });
        });
        assert!(matches!(
            early.verify(),
            Err(VerificationError::ReturnNotLast { .. }),
        ));

        let returning_initializer = Module::build(|module| {
            module.push_initializer(|body| {
                let value = body.push_constant(1);
                body.push_return(vec![value]);
            });
        });
        assert!(matches!(
            returning_initializer.verify(),
            Err(VerificationError::InitializerReturnsValues { .. }),
        ));
    }

    #[test]
    fn values_are_scoped_to_their_body() {
        let mut module = Module::build(|module| {
            module.push_function("first", vec![], |body, _| {
                let value = body.push_constant(1);
                body.push_return(vec![value]);
            });
            module.push_function("second", vec![], |body, _| {
                let value = body.push_constant(2);
                body.push_return(vec![value]);
            });
        });
        let Item::Function(first) = &module.items[0] else {
            unreachable!()
        };
        let foreign = first.body.iter().next().unwrap().results[0].0;
        let Item::Function(second) = &mut module.items[1] else {
            unreachable!()
        };
        let return_ = second.body.iter_mut().last().unwrap();
        return_.kind = OperationKind::Return {
            values: vec![foreign],
        };

        assert!(matches!(
            module.verify(),
            Err(VerificationError::UndefinedValue { id, .. }) if id == foreign,
        ));
    }

    #[test]
    fn symbols_are_unique() {
        let module = Module::build(|module| {
            module.push_global(Global::new("main", Type::Int));
            module.push_function("main", vec![], |body, _| body.push_return(vec![]));
        });
        assert_eq!(
            module.verify(),
            Err(VerificationError::DuplicateSymbol {
                name: "main".to_string(),
            }),
        );
    }
}

pub use self::{
    body::*, id::*, item::*, operation::*, statistics::*, symbol_table::*, types::*,
    use_def::*, validate::*,
};
use crate::{
    id::IdGenerator,
    impl_display_via_richir,
    position::Location,
    rich_ir::{RichIrBuilder, ToRichIr},
};
use std::fmt::{self, Display, Formatter};

mod body;
mod id;
mod item;
mod operation;
mod statistics;
mod symbol_table;
mod types;
mod use_def;
mod utils;
mod validate;

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct IdGenerators {
    pub values: IdGenerator<Id>,
    pub operations: IdGenerator<OperationId>,
}

/// A module: globals, functions, and initializers in module order.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Module {
    pub ids: IdGenerators,
    pub items: Vec<Item>,
}
impl Module {
    pub fn build<F>(function: F) -> Self
    where
        F: FnOnce(&mut ModuleBuilder),
    {
        let mut builder = ModuleBuilder {
            module: Self::default(),
        };
        function(&mut builder);
        builder.module
    }

    pub fn globals(&self) -> impl Iterator<Item = &Global> {
        self.items.iter().filter_map(|item| match item {
            Item::Global(global) => Some(global),
            _ => None,
        })
    }
    #[must_use]
    pub fn global(&self, name: &str) -> Option<&Global> {
        self.globals().find(|global| global.name == name)
    }
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(function) => Some(function),
            _ => None,
        })
    }
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|function| function.name == name)
    }
    pub fn initializers(&self) -> impl Iterator<Item = &Initializer> {
        self.items.iter().filter_map(|item| match item {
            Item::Initializer(initializer) => Some(initializer),
            _ => None,
        })
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.items.iter().filter_map(Item::body)
    }
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.items.iter_mut().filter_map(Item::body_mut)
    }

    /// All operations in pre-order: items in module order, operations in body
    /// order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.bodies().flat_map(Body::iter)
    }
    #[must_use]
    pub fn operation(&self, id: OperationId) -> Option<&Operation> {
        self.bodies().find_map(|body| body.get(id))
    }
    pub fn operation_mut(&mut self, id: OperationId) -> Option<&mut Operation> {
        self.bodies_mut().find_map(|body| body.get_mut(id))
    }
}
impl ToRichIr for Module {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        let mut previous: Option<&Item> = None;
        for item in &self.items {
            if let Some(previous) = previous {
                builder.push_newline();
                let both_globals = matches!(previous, Item::Global(_))
                    && matches!(item, Item::Global(_));
                if !both_globals {
                    builder.push_newline();
                }
            }
            item.build_rich_ir(builder);
            previous = Some(item);
        }
    }
}
impl_display_via_richir!(Module);

pub struct ModuleBuilder {
    module: Module,
}
impl ModuleBuilder {
    pub fn push_global(&mut self, global: Global) {
        self.module.items.push(global.into());
    }

    /// The builder function takes the body builder and the parameters.
    pub fn push_function<F>(
        &mut self,
        name: impl Into<String>,
        parameter_types: Vec<Type>,
        function: F,
    ) where
        F: FnOnce(&mut BodyBuilder, &[Id]),
    {
        let mut builder = BodyBuilder::new(&mut self.module.ids);
        let parameters = parameter_types
            .into_iter()
            .map(|type_| (builder.new_parameter(type_.clone()), type_))
            .collect::<Vec<_>>();
        let parameter_ids = parameters.iter().map(|(id, _)| *id).collect::<Vec<_>>();
        function(&mut builder, &parameter_ids);
        let body = builder.finish();
        self.module.items.push(
            Function {
                name: name.into(),
                parameters,
                body,
                location: Location::Unknown,
            }
            .into(),
        );
    }

    pub fn push_initializer<F>(&mut self, function: F)
    where
        F: FnOnce(&mut BodyBuilder),
    {
        let mut builder = BodyBuilder::new(&mut self.module.ids);
        function(&mut builder);
        let body = builder.finish();
        self.module.items.push(
            Initializer {
                body,
                location: Location::Unknown,
            }
            .into(),
        );
    }
}

/// A use of a value: the operand at `index` of the operation `owner`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Operand {
    pub owner: OperationId,
    pub index: usize,
}
impl Operand {
    #[must_use]
    pub fn get(self, module: &Module) -> Option<Id> {
        let owner = module.operation(self.owner)?;
        owner.kind.operands().get(self.index).copied()
    }
    /// Redirects this use to `value`. Returns `false` if the operand doesn't
    /// exist.
    pub fn set(self, module: &mut Module, value: Id) -> bool {
        let Some(owner) = module.operation_mut(self.owner) else {
            return false;
        };
        let mut operands = owner.kind.operands_mut();
        let Some(operand) = operands.get_mut(self.index) else {
            return false;
        };
        **operand = value;
        true
    }
}
impl Display for Operand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "operand #{} of {}", self.index, self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printing_separates_routines_with_blank_lines() {
        let module = Module::build(|module| {
            module.push_global(Global::new("limit", Type::Int).with_initial_value(10));
            module.push_global(Global::new("counter", Type::Int).mutable().private());
            module.push_function("main", vec![Type::Int], |body, parameters| {
                let two = body.push_constant(2);
                let (quotient, remainder) = body.push_divrem(parameters[0], two);
                body.push_store(quotient, "counter");
                body.push_call("print", vec![remainder], vec![]);
                body.push_return(vec![quotient]);
            });
            module.push_initializer(|body| body.push_return(vec![]));
        });
        insta::assert_snapshot!(module, @r###"
        global @limit: Int = 10
        global private mutable @counter: Int

        func @main($0: Int) {
          $1: Int = constant 2
          $2: Int, $3: Int = divrem $0 $1
          store $2 @counter
          call @print $3
          return $2
        }

        initializer {
          return
        }
        "###);
    }

    #[test]
    fn operations_are_visited_in_pre_order() {
        let module = Module::build(|module| {
            module.push_initializer(|body| {
                let value = body.push_constant(true);
                body.push_store(value, "flag");
                body.push_return(vec![]);
            });
            module.push_function("main", vec![], |body, _| {
                let value = body.push_constant("hi");
                body.push_return(vec![value]);
            });
        });
        let names = module
            .operations()
            .map(|operation| operation.kind.name())
            .collect::<Vec<_>>();
        assert_eq!(names, ["constant", "store", "return", "constant", "return"]);
    }

    #[test]
    fn operands_can_be_redirected() {
        let mut module = Module::build(|module| {
            module.push_function("main", vec![Type::Int, Type::Int], |body, parameters| {
                let sum = body.push_binary(BinaryOperator::Add, parameters[0], parameters[0]);
                body.push_return(vec![sum]);
            });
        });
        let add = module.operations().next().unwrap().clone();
        let operand = Operand {
            owner: add.id,
            index: 1,
        };
        let parameter = module.function("main").unwrap().parameters[1].0;

        assert!(operand.set(&mut module, parameter));
        assert_eq!(operand.get(&module), Some(parameter));
        assert!(!Operand { owner: add.id, index: 2 }.set(&mut module, parameter));
        assert_eq!(module.operations().next().unwrap().to_string(), "$2: Int = add $0 $1");
    }
}

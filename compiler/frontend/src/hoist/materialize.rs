use crate::{
    ir::{Global, Initializer, Module, SymbolTable, Type, Visibility},
    position::Location,
};

/// Base name of hoisted globals. Clashes get a numeric suffix.
pub const HOISTED_GLOBAL_NAME: &str = "hoisted";

/// Inserts globals at the start of the module.
///
/// Globals inserted through the same point keep their relative order. A new
/// point inserts before everything, including globals from earlier points.
#[derive(Debug, Default)]
pub struct ModuleBegin {
    next_index: usize,
}
impl ModuleBegin {
    /// Creates a private global with a unique name based on `name` and returns
    /// that name.
    pub fn create_global(
        &mut self,
        module: &mut Module,
        symbols: &mut SymbolTable,
        location: Location,
        name: &str,
        is_mutable: bool,
        type_: Type,
    ) -> String {
        let name = symbols.insert(name);
        let global = Global {
            name: name.clone(),
            type_,
            is_mutable,
            visibility: Visibility::Private,
            initial_value: None,
            location,
        };
        module.items.insert(self.next_index, global.into());
        self.next_index += 1;
        name
    }
}

/// An empty initializer, to be appended to the module by
/// [`append_initializer`] once its body is complete.
#[must_use]
pub fn create_initializer(location: Location) -> Initializer {
    Initializer::new(location)
}
pub fn append_initializer(module: &mut Module, initializer: Initializer) {
    module.items.push(initializer.into());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string_to_ir::parse_module;

    #[test]
    fn later_insertion_points_go_first() {
        let mut module =
            parse_module("global @hoisted: Int\nfunc @main() {\n  return\n}").unwrap();
        let mut symbols = SymbolTable::new(&module);
        let mut create = |begin: &mut ModuleBegin, is_mutable: bool, type_: Type| {
            begin.create_global(
                &mut module,
                &mut symbols,
                Location::Unknown,
                HOISTED_GLOBAL_NAME,
                is_mutable,
                type_,
            );
        };

        let mut first = ModuleBegin::default();
        create(&mut first, false, Type::Int);
        create(&mut first, false, Type::Bool);
        let mut second = ModuleBegin::default();
        create(&mut second, true, Type::Text);
        append_initializer(&mut module, create_initializer(Location::Unknown));

        insta::assert_snapshot!(module, @r###"
        global private mutable @hoisted_2: Text
        global private @hoisted_0: Int
        global private @hoisted_1: Bool
        global @hoisted: Int

        func @main() {
          return
        }

        initializer {
        }
        "###);
    }
}

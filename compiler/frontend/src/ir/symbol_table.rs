use super::Module;
use rustc_hash::FxHashSet;

/// The symbols defined by a module's globals and functions.
///
/// Inserting a name that is already taken renames it by appending `_0`,
/// `_1`, and so on. The counter is shared by all names of one table.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    symbols: FxHashSet<String>,
    uniquing_counter: usize,
}
impl SymbolTable {
    #[must_use]
    pub fn new(module: &Module) -> Self {
        Self {
            symbols: module
                .items
                .iter()
                .filter_map(|item| item.symbol().map(ToString::to_string))
                .collect(),
            uniquing_counter: 0,
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains(name)
    }

    /// Reserves a unique name based on `name` and returns it.
    pub fn insert(&mut self, name: &str) -> String {
        if self.symbols.insert(name.to_string()) {
            return name.to_string();
        }
        loop {
            let candidate = format!("{name}_{}", self.uniquing_counter);
            self.uniquing_counter += 1;
            if self.symbols.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SymbolTable;
    use crate::ir::{Global, Module, Type};

    #[test]
    fn taken_names_get_a_suffix() {
        let module = Module::build(|module| {
            module.push_global(Global::new("hoisted", Type::Int));
            module.push_global(Global::new("hoisted_1", Type::Int));
            module.push_function("main", vec![], |body, _| body.push_return(vec![]));
        });
        let mut symbols = SymbolTable::new(&module);
        assert!(symbols.contains("main"));

        assert_eq!(symbols.insert("hoisted"), "hoisted_0");
        assert_eq!(symbols.insert("hoisted"), "hoisted_2");
        assert_eq!(symbols.insert("fresh"), "fresh");
        assert_eq!(symbols.insert("fresh"), "fresh_3");
        assert_eq!(symbols.insert("main"), "main_4");
    }
}

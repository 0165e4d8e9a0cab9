//! Hoisting moves constant computations out of functions into initializers,
//! which run once when the module is loaded.
//!
//! Here's a before-and-after example:
//!
//! ```text
//!                                  |  global private @hoisted: Int
//!                                  |
//! func @main($x: Int) {            |  func @main($x: Int) {
//!   $a: Int = constant 2           |    $h: Int = load @hoisted
//!   $b: Int = constant 3           |    $d: Int = multiply $h $x
//!   $c: Int = add $a $b            |    return $d
//!   $d: Int = multiply $c $x       |  }
//!   return $d                      |
//! }                                |  initializer {
//!                                  |    $a: Int = constant 2
//!                                  |    $b: Int = constant 3
//!                                  |    $c: Int = add $a $b
//!                                  |    store $c @hoisted
//!                                  |    return
//!                                  |  }
//! ```
//!
//! The pass is greedy: a const-expr is only hoisted where its value escapes
//! into runtime code, so each hoisted subgraph is as large as possible. Uses by
//! other hoistable const-exprs are internal edges of a bigger subgraph and
//! don't get their own global.
//!
//! Each value is hoisted at most once. Later uses of the same value, both in
//! runtime code and inside later hoisted subgraphs, load the existing global.
//!
//! Afterwards, the original const-expr operations that became unused are
//! erased.

pub use self::log::HoistLog;
use self::escape::UseKind;
use crate::{
    const_expr::{ConstExprAnalysis, DefaultHoistingPolicy, HoistingPolicy},
    ir::{Id, Module, Operand, Operation, OperationKind, SymbolTable, Type, UseDefIndex},
    position::Location,
};
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::{
    fmt::{self, Display, Formatter},
    io::{self, Write},
};
use tracing::{debug, trace};

mod dead_code;
mod escape;
mod log;
mod materialize;
mod slice;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HoistOptions {
    /// Validate the module after hoisting and panic if it's invalid.
    pub verify: bool,
    /// Erase const-expr operations that became unused.
    pub cleanup: bool,
}
impl Default for HoistOptions {
    fn default() -> Self {
        Self {
            verify: cfg!(debug_assertions),
            cleanup: true,
        }
    }
}

/// What a single run of the pass did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HoistSummary {
    /// Uses that now load a hoisted global.
    pub hoisted_uses: usize,
    pub globals: usize,
    pub initializers: usize,
    pub erased_operations: usize,
}
impl Display for HoistSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} uses hoisted into {} globals and {} initializers, {} dead operations erased",
            self.hoisted_uses, self.globals, self.initializers, self.erased_operations,
        )
    }
}

/// The global a value was hoisted into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HoistedGlobal {
    pub name: String,
    pub type_: Type,
    pub location: Location,
}
pub type HoistedGlobals = FxHashMap<Id, HoistedGlobal>;

pub struct HoistIntoGlobals<P: HoistingPolicy = DefaultHoistingPolicy> {
    policy: P,
    options: HoistOptions,
}
impl<P: HoistingPolicy + Default> Default for HoistIntoGlobals<P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}
impl<P: HoistingPolicy> HoistIntoGlobals<P> {
    pub const NAME: &'static str = "hoist-into-globals";
    pub const DESCRIPTION: &'static str =
        "Greedily hoists eligible constant expressions into globals";

    pub fn new(policy: P) -> Self {
        Self {
            policy,
            options: HoistOptions::default(),
        }
    }
    #[must_use]
    pub fn with_options(mut self, options: HoistOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the pass, logging to the file named by `HOIST_LOG` if it's set.
    pub fn run(&self, module: &mut Module) -> HoistSummary {
        match log::from_env() {
            Some(mut log) => self.run_with_log(module, Some(&mut *log)),
            None => self.run_with_log(module, None::<&mut HoistLog<io::Sink>>),
        }
    }
    pub fn run_with_log<W: Write>(
        &self,
        module: &mut Module,
        mut log: Option<&mut HoistLog<W>>,
    ) -> HoistSummary {
        let statistics_before = module.statistics();
        if let Some(log) = log.as_deref_mut() {
            log.log_pass_start(module);
        }

        let analysis = ConstExprAnalysis::new(module);
        trace!("Const-expr analysis:\n{}", analysis.report(module));
        let mut index = UseDefIndex::new(module);
        let symbols = SymbolTable::new(module);
        let mut summary = {
            let mut context = Context {
                module: &mut *module,
                index: &mut index,
                analysis: &analysis,
                policy: &self.policy,
                symbols,
                hoisted: HoistedGlobals::default(),
                summary: HoistSummary::default(),
                log: log.as_deref_mut(),
            };
            context.hoist_escapes();
            context.summary
        };

        if self.options.cleanup {
            let mut candidates = FxHashSet::default();
            analysis.populate_const_expr_operations(&mut candidates);
            summary.erased_operations = dead_code::erase_dead_operations(
                module,
                &mut index,
                candidates,
                log.as_deref_mut(),
            );
        }
        if self.options.verify {
            module.validate();
        }

        let statistics_after = module.statistics();
        debug!("Done. {summary}. Went from {statistics_before} to {statistics_after}.");
        if let Some(log) = log {
            log.log_pass_end(statistics_before, statistics_after);
        }
        summary
    }
}

impl Module {
    /// Runs [`HoistIntoGlobals`] with the default policy and options.
    pub fn hoist_into_globals(&mut self) -> HoistSummary {
        HoistIntoGlobals::<DefaultHoistingPolicy>::default().run(self)
    }
}

struct Context<'a, P: HoistingPolicy + ?Sized, W: Write> {
    module: &'a mut Module,
    index: &'a mut UseDefIndex,
    analysis: &'a ConstExprAnalysis,
    policy: &'a P,
    symbols: SymbolTable,
    hoisted: HoistedGlobals,
    summary: HoistSummary,
    log: Option<&'a mut HoistLog<W>>,
}
impl<P: HoistingPolicy + ?Sized, W: Write> Context<'_, P, W> {
    fn hoist_escapes(&mut self) {
        // Operations created while hoisting have no analysis info, so
        // visiting a snapshot skips nothing relevant.
        let operations = self
            .module
            .operations()
            .map(|operation| operation.id)
            .collect_vec();
        for id in operations {
            let Some(info) = self.analysis.lookup(id) else {
                continue;
            };
            if info.is_root || !info.is_const_expr() {
                continue;
            }
            let Some(operation) = self.index.operation(id) else {
                continue;
            };
            if !self.policy.is_hoistable_const_expr_leaf(info, operation) {
                continue;
            }

            debug!("Processing const-expr {operation}");
            let results = operation.result_ids().collect_vec();
            for result in results {
                for operand in self.index.uses_of(result).to_vec() {
                    let kind =
                        escape::classify_use(self.index, self.analysis, self.policy, operand);
                    debug!("  {operand}: {kind}");
                    if kind == UseKind::Escape {
                        self.hoist_use(operand);
                    }
                }
            }
        }
    }

    /// Replaces the used value by a load of its hoisted global, hoisting it
    /// first if necessary.
    fn hoist_use(&mut self, operand: Operand) {
        let value = self
            .index
            .operand(operand)
            .expect("Uses always refer to an existing operand.");
        let location = self
            .index
            .operation(operand.owner)
            .expect("Uses always belong to an existing operation.")
            .location;

        let is_new = !self.hoisted.contains_key(&value);
        if is_new {
            let globals_before = self.hoisted.len();
            slice::clone_const_expr_into_initializer(
                self.module,
                self.index,
                &mut self.symbols,
                &mut self.hoisted,
                value,
            );
            self.summary.globals += self.hoisted.len() - globals_before;
            self.summary.initializers += 1;
        }
        let global = self
            .hoisted
            .get(&value)
            .cloned()
            .expect("Hoisting a value creates a global for each of its operation's results.");

        let load = self.module.ids.values.generate();
        let load_operation = Operation {
            id: self.module.ids.operations.generate(),
            results: vec![(load, global.type_)],
            kind: OperationKind::Load {
                global: global.name.clone(),
            },
            location,
        };
        self.index.add_operation(&load_operation);
        assert!(
            self.module.insert_before(operand.owner, load_operation),
            "The consumer of a hoisted value is part of the module.",
        );
        assert!(
            operand.set(self.module, load),
            "The consumer of a hoisted value has the operand.",
        );
        self.index.set_operand(operand, load);
        self.summary.hoisted_uses += 1;

        if let Some(log) = self.log.as_deref_mut() {
            if log.is_enabled() {
                let initializer = if is_new {
                    self.module.items.last().map(ToString::to_string)
                } else {
                    None
                };
                log.log_hoist(operand, &global.name, initializer.as_deref());
            }
        }
    }
}

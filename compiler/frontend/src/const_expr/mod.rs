//! Finds the operations whose results can be computed without any runtime
//! input.
//!
//! # Roots
//!
//! Roots are const-expr by themselves: constants and loads of immutable
//! globals. Hoisting never starts at a root because they are already as cheap
//! as a load.
//!
//! # Non-root const-exprs
//!
//! Pure computations (binary, unary, `divrem`, and `splat`) whose operands are
//! all const-expr. Everything else, including loads of mutable globals, stores,
//! calls, and parameters, is not const-expr.
//!
//! Only function bodies are analyzed. Initializers already run once at load
//! time, so there's nothing to gain from hoisting out of them.

pub use self::policy::{DefaultHoistingPolicy, HoistingPolicy};
use crate::{
    ir::{Id, Module, Operation, OperationId, OperationKind},
    rich_ir::{RichIrBuilder, ToRichIr, TokenType},
    utils::HashMapExtension,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::{self, Display, Formatter};
use tracing::trace;

mod policy;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConstExprState {
    Constant,
    NonConstant,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConstExprInfo {
    pub operation: OperationId,
    pub is_root: bool,
    pub state: ConstExprState,
}
impl ConstExprInfo {
    #[must_use]
    pub const fn is_const_expr(&self) -> bool {
        matches!(self.state, ConstExprState::Constant)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConstExprAnalysis {
    infos: FxHashMap<OperationId, ConstExprInfo>,
    /// Results of analyzed operations, mapped to their defining operation.
    definitions: FxHashMap<Id, OperationId>,
    /// Analyzed operations in pre-order.
    order: Vec<OperationId>,
}
impl ConstExprAnalysis {
    #[must_use]
    pub fn new(module: &Module) -> Self {
        let immutable_globals = module
            .globals()
            .filter(|global| !global.is_mutable)
            .map(|global| global.name.as_str())
            .collect::<FxHashSet<_>>();

        let mut analysis = Self::default();
        for function in module.functions() {
            for operation in &function.body {
                let info = analysis.classify(operation, &immutable_globals);
                trace!("{operation}: {:?} (root: {})", info.state, info.is_root);
                for result in operation.result_ids() {
                    analysis.definitions.force_insert(result, operation.id);
                }
                analysis.order.push(operation.id);
                analysis.infos.force_insert(operation.id, info);
            }
        }
        analysis
    }
    fn classify(
        &self,
        operation: &Operation,
        immutable_globals: &FxHashSet<&str>,
    ) -> ConstExprInfo {
        let (is_root, state) = match &operation.kind {
            OperationKind::Constant(_) => (true, ConstExprState::Constant),
            OperationKind::Load { global } if immutable_globals.contains(global.as_str()) => {
                (true, ConstExprState::Constant)
            }
            kind if kind.is_pure()
                && kind
                    .operands()
                    .into_iter()
                    .all(|operand| self.is_value_const_expr(operand)) =>
            {
                (false, ConstExprState::Constant)
            }
            _ => (false, ConstExprState::NonConstant),
        };
        ConstExprInfo {
            operation: operation.id,
            is_root,
            state,
        }
    }

    #[must_use]
    pub fn lookup(&self, operation: OperationId) -> Option<&ConstExprInfo> {
        self.infos.get(&operation)
    }
    /// The info of the operation defining `value`. Parameters have none.
    #[must_use]
    pub fn lookup_value(&self, value: Id) -> Option<&ConstExprInfo> {
        self.definitions
            .get(&value)
            .and_then(|operation| self.lookup(*operation))
    }
    fn is_value_const_expr(&self, value: Id) -> bool {
        self.lookup_value(value)
            .is_some_and(ConstExprInfo::is_const_expr)
    }

    /// Adds all const-expr operations, including roots.
    pub fn populate_const_expr_operations(&self, operations: &mut FxHashSet<OperationId>) {
        operations.extend(self.const_expr_operations());
    }
    pub fn const_expr_operations(&self) -> impl Iterator<Item = OperationId> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|operation| self.infos[operation].is_const_expr())
    }

    /// A printable view listing the state of each analyzed operation.
    #[must_use]
    pub const fn report<'a>(&'a self, module: &'a Module) -> ConstExprReport<'a> {
        ConstExprReport {
            analysis: self,
            module,
        }
    }
}

pub struct ConstExprReport<'a> {
    analysis: &'a ConstExprAnalysis,
    module: &'a Module,
}
impl ToRichIr for ConstExprReport<'_> {
    fn build_rich_ir(&self, builder: &mut RichIrBuilder) {
        let mut is_first = true;
        for function in self.module.functions() {
            if !is_first {
                builder.push_newline();
            }
            is_first = false;

            builder.push("func", TokenType::Keyword);
            builder.push(" ", None);
            builder.push(format!("@{}", function.name), TokenType::Function);
            builder.indent();
            for operation in &function.body {
                builder.push_newline();
                operation.build_rich_ir(builder);
                let state = match self.analysis.lookup(operation.id) {
                    Some(info) if info.is_root => "root",
                    Some(info) if info.is_const_expr() => "const-expr",
                    Some(_) => "runtime",
                    None => "not analyzed",
                };
                builder.push(format!("  # {state}"), TokenType::Comment);
            }
            builder.dedent();
        }
    }
}
impl Display for ConstExprReport<'_> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.to_rich_ir().text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::string_to_ir::parse_module;

    fn analyze(source: &str) -> (Module, ConstExprAnalysis) {
        let module = parse_module(source).unwrap();
        let analysis = ConstExprAnalysis::new(&module);
        (module, analysis)
    }

    #[test]
    fn operations_are_classified() {
        let (module, analysis) = analyze(
            r"
            global @limit: Int
            global mutable @counter: Int

            func @main($x: Int) {
              $a: Int = constant 2
              $b: Int = load @limit
              $c: Int = add $a $b
              $d: Int = load @counter
              $e: Int = add $c $d
              $f: Int = multiply $c $x
              $g: Int, $h: Int = divrem $c $a
              $i: List[Int] = splat $g $h
              $j: Int = call @random
              $k: Int = negate $j
              return $e $f $i $k
            }
            ",
        );
        insta::assert_snapshot!(analysis.report(&module), @r###"
        func @main
          $1: Int = constant 2  # root
          $2: Int = load @limit  # root
          $3: Int = add $1 $2  # const-expr
          $4: Int = load @counter  # runtime
          $5: Int = add $3 $4  # runtime
          $6: Int = multiply $3 $0  # runtime
          $7: Int, $8: Int = divrem $3 $1  # const-expr
          $9: List[Int] = splat $7 $8  # const-expr
          $10: Int = call @random  # runtime
          $11: Int = negate $10  # runtime
          return $5 $6 $9 $11  # runtime
        "###);
    }

    #[test]
    fn values_are_looked_up_through_their_definition() {
        let (module, analysis) = analyze(
            r"
            func @main($x: Int) {
              $a: Int = constant 2
              $b: Int, $c: Int = divrem $a $a
              return $x $c
            }
            ",
        );
        let parameter = module.function("main").unwrap().parameters[0].0;
        assert!(analysis.lookup_value(parameter).is_none());

        let divrem = module.operations().nth(1).unwrap();
        let remainder = divrem.results[1].0;
        let info = analysis.lookup_value(remainder).unwrap();
        assert_eq!(info.operation, divrem.id);
        assert!(info.is_const_expr());
        assert!(!info.is_root);
    }

    #[test]
    fn initializers_are_not_analyzed() {
        let (module, analysis) = analyze(
            r"
            global @limit: Int
            initializer {
              $a: Int = constant 2
              store $a @limit
              return
            }
            func @main() {
              $a: Int = constant 3
              return $a
            }
            ",
        );
        let initializer_constant = module.operations().next().unwrap();
        assert!(analysis.lookup(initializer_constant.id).is_none());

        let mut operations = FxHashSet::default();
        analysis.populate_const_expr_operations(&mut operations);
        let function_constant = module.operations().nth(3).unwrap();
        assert_eq!(operations, [function_constant.id].into_iter().collect());
    }
}

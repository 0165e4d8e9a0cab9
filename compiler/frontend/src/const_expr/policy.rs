use super::ConstExprInfo;
use crate::ir::{Operation, OperationKind};

/// Decides where hoisting is allowed.
pub trait HoistingPolicy {
    /// Whether the const-expr `operation` may be hoisted as the root of a
    /// subgraph.
    fn is_hoistable_const_expr_leaf(&self, info: &ConstExprInfo, operation: &Operation) -> bool;

    /// Whether the operand at `operand_index` of `owner` may be replaced by a
    /// load of a hoisted global.
    fn is_hoistable_const_expr_consuming_operand(
        &self,
        owner: &Operation,
        operand_index: usize,
    ) -> bool;
}

/// Hoists everything except `splat`s.
///
/// Splatted lists are cheap to compute but expensive to store, so they are
/// kept at their use and their length stays an inline value.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultHoistingPolicy;
impl HoistingPolicy for DefaultHoistingPolicy {
    fn is_hoistable_const_expr_leaf(&self, _info: &ConstExprInfo, operation: &Operation) -> bool {
        !matches!(operation.kind, OperationKind::Splat { .. })
    }

    fn is_hoistable_const_expr_consuming_operand(
        &self,
        owner: &Operation,
        operand_index: usize,
    ) -> bool {
        !matches!(owner.kind, OperationKind::Splat { .. } if operand_index == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{const_expr::ConstExprAnalysis, string_to_ir::parse_module};

    #[test]
    fn splats_are_neither_leaves_nor_take_hoisted_lengths() {
        let module = parse_module(
            r"
            func @main($x: Int) {
              $a: Int = constant 2
              $b: Int = add $a $a
              $c: List[Int] = splat $b $b
              return $c
            }
            ",
        )
        .unwrap();
        let analysis = ConstExprAnalysis::new(&module);
        let policy = DefaultHoistingPolicy;
        let add = module.operations().nth(1).unwrap();
        let splat = module.operations().nth(2).unwrap();

        assert!(policy.is_hoistable_const_expr_leaf(analysis.lookup(add.id).unwrap(), add));
        assert!(!policy.is_hoistable_const_expr_leaf(analysis.lookup(splat.id).unwrap(), splat));
        assert!(policy.is_hoistable_const_expr_consuming_operand(splat, 0));
        assert!(!policy.is_hoistable_const_expr_consuming_operand(splat, 1));
        assert!(policy.is_hoistable_const_expr_consuming_operand(add, 1));
    }
}

use crate::{
    const_expr::{ConstExprAnalysis, HoistingPolicy},
    ir::{Operand, UseDefIndex},
};
use std::fmt::{self, Display, Formatter};

/// How a use of a hoistable value relates to the const-expr graph.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum UseKind {
    /// The consumer is itself a hoistable const-expr and will carry the
    /// value along when it gets hoisted.
    InternalEdge,
    /// The policy doesn't allow replacing this operand.
    InvalidOperand,
    /// The value flows into runtime code here, so this use gets a load of a
    /// hoisted global.
    Escape,
}
impl Display for UseKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::InternalEdge => write!(f, "skip (const-expr)"),
            Self::InvalidOperand => write!(f, "skip (invalid operand)"),
            Self::Escape => write!(f, "hoist"),
        }
    }
}

/// Classifies a use of a value produced by a hoistable const-expr leaf.
///
/// Consumers created during the pass (such as loads) have no analysis info
/// and count as runtime code.
pub fn classify_use<P: HoistingPolicy + ?Sized>(
    index: &UseDefIndex,
    analysis: &ConstExprAnalysis,
    policy: &P,
    operand: Operand,
) -> UseKind {
    let owner = index
        .operation(operand.owner)
        .expect("Uses always belong to an existing operation.");
    if let Some(info) = analysis.lookup(owner.id) {
        if info.is_const_expr() && policy.is_hoistable_const_expr_leaf(info, owner) {
            return UseKind::InternalEdge;
        }
    }
    if !policy.is_hoistable_const_expr_consuming_operand(owner, operand.index) {
        return UseKind::InvalidOperand;
    }
    UseKind::Escape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        const_expr::DefaultHoistingPolicy, id::CountableId, ir::OperationId,
        string_to_ir::parse_module,
    };

    #[test]
    fn uses_are_classified_by_their_consumer() {
        let module = parse_module(
            r"
            func @main($x: Int) {
              $a: Int = constant 2
              $b: Int = add $a $a
              $c: Int = multiply $b $b
              $d: Int = add $b $x
              $e: List[Int] = splat $x $b
              $f: List[Int] = splat $b $a
              return $c $d $e $f
            }
            ",
        )
        .unwrap();
        let analysis = ConstExprAnalysis::new(&module);
        let index = UseDefIndex::new(&module);
        let sum = module.operations().nth(1).unwrap().results[0].0;

        let kinds = module
            .uses_of(sum)
            .into_iter()
            .map(|operand| {
                let kind = classify_use(&index, &analysis, &DefaultHoistingPolicy, operand);
                format!("{operand}: {kind}")
            })
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                "operand #0 of op2: skip (const-expr)",
                "operand #1 of op2: skip (const-expr)",
                "operand #0 of op3: hoist",
                "operand #1 of op4: skip (invalid operand)",
                "operand #0 of op5: hoist",
            ],
        );
    }

    #[test]
    #[should_panic = "Uses always belong to an existing operation."]
    fn uses_by_unknown_operations_panic() {
        let module = parse_module("func @main() {\n  return\n}").unwrap();
        let analysis = ConstExprAnalysis::new(&module);
        let index = UseDefIndex::new(&module);
        let operand = Operand {
            owner: OperationId::from_usize(42),
            index: 0,
        };
        classify_use(&index, &analysis, &DefaultHoistingPolicy, operand);
    }
}

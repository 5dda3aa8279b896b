//! Dispatch over expression variants.
//!
//! [`ExpressionVisitor`] is the seam through which tree-processing components consume
//! [`SymbolicExpression`]s: a processor implements one method per node variant and picks
//! its own output type. [`SymbolicExpression::accept`] holds the one exhaustive `match`
//! over the closed variant set, so adding a processor never touches the node definitions,
//! and adding a variant makes every processor fail to compile until it handles it.
//!
//! Processors in this crate:
//! - [`VariableCollector`] - gathers free variables and detects name/type conflicts
//! - `Z3Translator` (feature `solver`) - emits Z3 formulas

use std::collections::BTreeMap;

use crate::{
    symbolic::{
        expr::{
            BinaryOp, BoolConstant, IntConstant, LogicalOp, SymbolicExpression, TernaryOp,
            UnaryOp, Variable,
        },
        types::ExpressionType,
    },
    Error, Result,
};

/// A tree-processing component that handles each expression variant.
///
/// Implementors either recurse by calling [`SymbolicExpression::accept`] on the children
/// of the node they are visiting, or handle one node per call and let a driver feed them
/// every node from [`SymbolicExpression::nodes`].
pub trait ExpressionVisitor {
    /// The result produced for each visited node.
    type Output;

    /// Handles a variable.
    fn visit_variable(&mut self, expr: &Variable) -> Self::Output;

    /// Handles an integer constant.
    fn visit_int_constant(&mut self, expr: &IntConstant) -> Self::Output;

    /// Handles a boolean constant.
    fn visit_bool_constant(&mut self, expr: &BoolConstant) -> Self::Output;

    /// Handles a unary operation.
    fn visit_unary(&mut self, expr: &UnaryOp) -> Self::Output;

    /// Handles a binary operation.
    fn visit_binary(&mut self, expr: &BinaryOp) -> Self::Output;

    /// Handles a logical operation.
    fn visit_logical(&mut self, expr: &LogicalOp) -> Self::Output;

    /// Handles a ternary operation.
    fn visit_ternary(&mut self, expr: &TernaryOp) -> Self::Output;
}

impl SymbolicExpression {
    /// Dispatches this node to the matching handler of `visitor`.
    ///
    /// # Arguments
    ///
    /// * `visitor` - The processor to run on this node.
    ///
    /// # Returns
    ///
    /// Whatever the processor produces for this node.
    pub fn accept<V: ExpressionVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Variable(expr) => visitor.visit_variable(expr),
            Self::IntConstant(expr) => visitor.visit_int_constant(expr),
            Self::BoolConstant(expr) => visitor.visit_bool_constant(expr),
            Self::Unary(expr) => visitor.visit_unary(expr),
            Self::Binary(expr) => visitor.visit_binary(expr),
            Self::Logical(expr) => visitor.visit_logical(expr),
            Self::Ternary(expr) => visitor.visit_ternary(expr),
        }
    }

    /// Collects the free variables of this expression.
    ///
    /// # Returns
    ///
    /// A map from variable name to type, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VariableRedeclared`] if the same name occurs with two different types.
    pub fn variables(&self) -> Result<BTreeMap<String, ExpressionType>> {
        let mut collector = VariableCollector::new();
        collector.collect(self)?;
        Ok(collector.into_variables())
    }
}

/// Gathers the variables referenced by one or more expression trees.
///
/// The collector can be fed several trees of the same session; it reports the first name
/// seen with two different types.
///
/// Each visit handles a single node. [`collect`](Self::collect) drives the walk, so trees
/// of any depth are collected without recursion.
#[derive(Debug, Default, Clone)]
pub struct VariableCollector {
    variables: BTreeMap<String, ExpressionType>,
}

impl VariableCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the variables of `expr` to the collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VariableRedeclared`] on a name/type conflict.
    pub fn collect(&mut self, expr: &SymbolicExpression) -> Result<()> {
        expr.nodes().try_for_each(|node| node.accept(self))
    }

    /// Returns the variables collected so far.
    #[must_use]
    pub fn variables(&self) -> &BTreeMap<String, ExpressionType> {
        &self.variables
    }

    /// Consumes the collector, returning the collected variables.
    #[must_use]
    pub fn into_variables(self) -> BTreeMap<String, ExpressionType> {
        self.variables
    }
}

impl ExpressionVisitor for VariableCollector {
    type Output = Result<()>;

    fn visit_variable(&mut self, expr: &Variable) -> Result<()> {
        match self.variables.get(expr.name()) {
            Some(existing) if existing != expr.ty() => Err(Error::VariableRedeclared {
                name: expr.name().to_string(),
                existing: existing.clone(),
                requested: expr.ty().clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.variables
                    .insert(expr.name().to_string(), expr.ty().clone());
                Ok(())
            }
        }
    }

    fn visit_int_constant(&mut self, _expr: &IntConstant) -> Result<()> {
        Ok(())
    }

    fn visit_bool_constant(&mut self, _expr: &BoolConstant) -> Result<()> {
        Ok(())
    }

    fn visit_unary(&mut self, _expr: &UnaryOp) -> Result<()> {
        Ok(())
    }

    fn visit_binary(&mut self, _expr: &BinaryOp) -> Result<()> {
        Ok(())
    }

    fn visit_logical(&mut self, _expr: &LogicalOp) -> Result<()> {
        Ok(())
    }

    fn visit_ternary(&mut self, _expr: &TernaryOp) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::ops::BinaryOperator;

    /// Counts nodes per variant, to check that `accept` reaches the right handler.
    #[derive(Default)]
    struct VariantCounter {
        counts: [usize; 7],
    }

    impl ExpressionVisitor for VariantCounter {
        type Output = ();

        fn visit_variable(&mut self, _expr: &Variable) {
            self.counts[0] += 1;
        }

        fn visit_int_constant(&mut self, _expr: &IntConstant) {
            self.counts[1] += 1;
        }

        fn visit_bool_constant(&mut self, _expr: &BoolConstant) {
            self.counts[2] += 1;
        }

        fn visit_unary(&mut self, expr: &UnaryOp) {
            self.counts[3] += 1;
            expr.operand().accept(self);
        }

        fn visit_binary(&mut self, expr: &BinaryOp) {
            self.counts[4] += 1;
            expr.left().accept(self);
            expr.right().accept(self);
        }

        fn visit_logical(&mut self, expr: &LogicalOp) {
            self.counts[5] += 1;
            for operand in expr.operands() {
                operand.accept(self);
            }
        }

        fn visit_ternary(&mut self, expr: &TernaryOp) {
            self.counts[6] += 1;
            expr.condition().accept(self);
            expr.then_branch().accept(self);
            expr.else_branch().accept(self);
        }
    }

    #[test]
    fn test_accept_dispatches_every_variant() -> Result<()> {
        let x = SymbolicExpression::variable("x", ExpressionType::int());
        let neg = SymbolicExpression::neg(x.clone())?;
        let cmp = SymbolicExpression::binary(BinaryOperator::Le, neg, SymbolicExpression::int(3))?;
        let guard = SymbolicExpression::and(vec![cmp, SymbolicExpression::bool(true)])?;
        let expr = SymbolicExpression::if_else(guard, x, SymbolicExpression::int(0))?;

        let mut counter = VariantCounter::default();
        expr.accept(&mut counter);
        assert_eq!(counter.counts, [2, 2, 1, 1, 1, 1, 1]);
        Ok(())
    }

    #[test]
    fn test_collect_variables() -> Result<()> {
        let a = SymbolicExpression::variable("a", ExpressionType::array(ExpressionType::int()));
        let i = SymbolicExpression::variable("i", ExpressionType::int());
        let read = SymbolicExpression::array_get(a, i.clone())?;
        let expr = SymbolicExpression::binary(BinaryOperator::Eq, read, i)?;

        let vars = expr.variables()?;
        assert_eq!(vars.len(), 2);
        assert_eq!(
            vars.get("a"),
            Some(&ExpressionType::array(ExpressionType::int()))
        );
        assert_eq!(vars.get("i"), Some(&ExpressionType::int()));
        assert!(SymbolicExpression::int(4).variables()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_collect_detects_conflicting_types() -> Result<()> {
        let as_int = SymbolicExpression::binary(
            BinaryOperator::Gt,
            SymbolicExpression::variable("v", ExpressionType::int()),
            SymbolicExpression::int(0),
        )?;
        let as_bool = SymbolicExpression::variable("v", ExpressionType::bool());

        let mut collector = VariableCollector::new();
        collector.collect(&as_int)?;
        let err = collector.collect(&as_bool).unwrap_err();
        assert_eq!(
            err,
            Error::VariableRedeclared {
                name: "v".to_string(),
                existing: ExpressionType::int(),
                requested: ExpressionType::bool(),
            }
        );
        assert_eq!(collector.variables().len(), 1);
        Ok(())
    }

    #[test]
    fn test_collect_deep_tree() -> Result<()> {
        let mut expr = SymbolicExpression::variable("deep", ExpressionType::int());
        for _ in 0..100_000 {
            expr = SymbolicExpression::neg(expr)?;
        }
        let expr = SymbolicExpression::binary(
            BinaryOperator::Lt,
            expr,
            SymbolicExpression::variable("bound", ExpressionType::int()),
        )?;

        let vars = expr.variables()?;
        assert_eq!(
            vars.keys().map(String::as_str).collect::<Vec<_>>(),
            ["bound", "deep"]
        );
        Ok(())
    }

    #[test]
    fn test_collector_visits_one_node_per_call() -> Result<()> {
        let x = SymbolicExpression::variable("x", ExpressionType::int());
        let neg = SymbolicExpression::neg(x)?;

        let mut collector = VariableCollector::new();
        neg.accept(&mut collector)?;
        assert!(collector.variables().is_empty());

        collector.collect(&neg)?;
        assert_eq!(collector.variables().len(), 1);
        Ok(())
    }
}

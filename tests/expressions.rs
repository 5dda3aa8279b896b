//! Expression model integration tests.
//!
//! These tests exercise the public API end to end without a solver:
//! 1. Build trees through the validating constructors
//! 2. Verify typing rules and the errors for ill-typed input
//! 3. Check the canonical rendering
//! 4. Process trees with a custom visitor
//! 5. Feed trees through the front-end interface

use proptest::prelude::*;
use symexpr::{
    frontend::{FunctionSummary, ProgramSource, ProgramTable, SymbolTable},
    symbolic::{
        BinaryOp, BinaryOperator, BoolConstant, ExpressionType, ExpressionVisitor, IntConstant,
        LogicalOp, LogicalOperator, SymbolicExpression, TernaryOp, UnaryOp, Variable,
    },
    Error, Result,
};

fn int_var(name: &str) -> SymbolicExpression {
    SymbolicExpression::variable(name, ExpressionType::int())
}

fn bool_var(name: &str) -> SymbolicExpression {
    SymbolicExpression::variable(name, ExpressionType::bool())
}

fn int_array(name: &str) -> SymbolicExpression {
    SymbolicExpression::variable(name, ExpressionType::array(ExpressionType::int()))
}

/// One expression of each type, used to build operand pairs.
fn sample_of(ty: &ExpressionType) -> SymbolicExpression {
    match ty {
        ExpressionType::Int => SymbolicExpression::int(1),
        ExpressionType::Bool => SymbolicExpression::bool(true),
        ExpressionType::Array(_) => SymbolicExpression::variable("arr", ty.clone()),
    }
}

fn arb_type() -> impl Strategy<Value = ExpressionType> {
    let leaf = prop_oneof![Just(ExpressionType::int()), Just(ExpressionType::bool())];
    leaf.prop_recursive(3, 8, 1, |inner| inner.prop_map(ExpressionType::array))
}

const COMPARISONS: [BinaryOperator; 6] = [
    BinaryOperator::Eq,
    BinaryOperator::Ne,
    BinaryOperator::Lt,
    BinaryOperator::Le,
    BinaryOperator::Gt,
    BinaryOperator::Ge,
];

const ARITHMETIC: [BinaryOperator; 5] = [
    BinaryOperator::Add,
    BinaryOperator::Sub,
    BinaryOperator::Mul,
    BinaryOperator::Div,
    BinaryOperator::Mod,
];

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    #[test]
    fn comparisons_of_equal_types_are_bool(ty in arb_type(), op_index in 0usize..6) {
        let op = COMPARISONS[op_index];
        let expr = SymbolicExpression::binary(op, sample_of(&ty), sample_of(&ty));
        prop_assert!(expr.is_ok(), "{:?} over {} failed: {:?}", op, ty, expr.as_ref().err());
        let expr = expr.unwrap();
        prop_assert_eq!(expr.ty(), &ExpressionType::bool());
    }

    #[test]
    fn arithmetic_keeps_int_type(a in any::<i64>(), b in any::<i64>(), op_index in 0usize..5) {
        let op = ARITHMETIC[op_index];
        let expr =
            SymbolicExpression::binary(op, SymbolicExpression::int(a), SymbolicExpression::int(b));
        prop_assert!(expr.is_ok());
        let expr = expr.unwrap();
        prop_assert_eq!(expr.ty(), &ExpressionType::int());
    }

    #[test]
    fn mismatched_operands_are_rejected(left in arb_type(), right in arb_type()) {
        prop_assume!(left != right);
        let result =
            SymbolicExpression::binary(BinaryOperator::Eq, sample_of(&left), sample_of(&right));
        prop_assert!(matches!(result, Err(Error::TypeMismatch(_))));
    }

    #[test]
    fn ternary_takes_then_type(ty in arb_type(), flag in any::<bool>()) {
        let expr = SymbolicExpression::if_else(
            SymbolicExpression::bool(flag),
            sample_of(&ty),
            sample_of(&ty),
        );
        prop_assert!(expr.is_ok());
        let expr = expr.unwrap();
        prop_assert_eq!(expr.ty(), &ty);
    }

    #[test]
    fn variadic_logical_accepts_any_count(count in 1usize..16) {
        let operands: Vec<SymbolicExpression> =
            (0..count).map(|i| bool_var(&format!("p{i}"))).collect();
        let and = SymbolicExpression::and(operands.clone());
        let or = SymbolicExpression::or(operands);
        prop_assert!(and.is_ok());
        prop_assert!(or.is_ok());
        let and = and.unwrap();
        prop_assert_eq!(and.node_count(), count + 1);
    }
}

#[test]
fn test_add_int_bool_is_rejected() {
    let result = SymbolicExpression::binary(
        BinaryOperator::Add,
        SymbolicExpression::int(1),
        SymbolicExpression::bool(true),
    );
    assert!(matches!(result, Err(Error::TypeMismatch(_))));
}

#[test]
fn test_arithmetic_on_non_int_is_rejected() {
    for op in ARITHMETIC {
        let result = SymbolicExpression::binary(op, bool_var("a"), bool_var("b"));
        assert!(matches!(result, Err(Error::TypeMismatch(_))), "{op:?}");

        let result = SymbolicExpression::binary(op, int_array("a"), int_array("b"));
        assert!(matches!(result, Err(Error::TypeMismatch(_))), "{op:?}");
    }
    assert!(matches!(
        SymbolicExpression::neg(bool_var("p")),
        Err(Error::TypeMismatch(_))
    ));
}

#[test]
fn test_logical_arity() -> Result<()> {
    assert!(matches!(
        SymbolicExpression::logical(LogicalOperator::And, vec![]),
        Err(Error::InvalidArity { found: 0, .. })
    ));
    assert!(matches!(
        SymbolicExpression::logical(LogicalOperator::Implies, vec![bool_var("a")]),
        Err(Error::InvalidArity { found: 1, .. })
    ));
    assert!(matches!(
        SymbolicExpression::logical(LogicalOperator::Not, vec![bool_var("a"), bool_var("b")]),
        Err(Error::InvalidArity { found: 2, .. })
    ));

    let not = SymbolicExpression::logical(LogicalOperator::Not, vec![bool_var("a")])?;
    assert_eq!(not.ty(), &ExpressionType::bool());
    Ok(())
}

#[test]
fn test_logical_checks_arity_before_types() {
    // Wrong count and wrong type together report the arity.
    let result = SymbolicExpression::logical(LogicalOperator::Implies, vec![int_var("x")]);
    assert!(matches!(result, Err(Error::InvalidArity { .. })));

    let result =
        SymbolicExpression::logical(LogicalOperator::Implies, vec![bool_var("p"), int_var("x")]);
    assert!(matches!(result, Err(Error::TypeMismatch(_))));
}

#[test]
fn test_ternary_validation() -> Result<()> {
    assert!(matches!(
        SymbolicExpression::if_else(int_var("c"), int_var("a"), int_var("b")),
        Err(Error::TypeMismatch(_))
    ));
    assert!(matches!(
        SymbolicExpression::if_else(bool_var("c"), int_var("a"), bool_var("b")),
        Err(Error::TypeMismatch(_))
    ));

    let expr = SymbolicExpression::if_else(bool_var("c"), bool_var("a"), bool_var("b"))?;
    assert_eq!(expr.ty(), &ExpressionType::bool());
    Ok(())
}

#[test]
fn test_array_get() -> Result<()> {
    let matrix = SymbolicExpression::variable(
        "m",
        ExpressionType::array(ExpressionType::array(ExpressionType::bool())),
    );
    let row = SymbolicExpression::array_get(matrix, int_var("i"))?;
    assert_eq!(row.ty(), &ExpressionType::array(ExpressionType::bool()));

    let cell = SymbolicExpression::array_get(row, SymbolicExpression::int(0))?;
    assert_eq!(cell.ty(), &ExpressionType::bool());
    assert_eq!(cell.to_string(), "((m [] i) [] 0)");

    assert!(matches!(
        SymbolicExpression::array_get(int_var("x"), int_var("i")),
        Err(Error::TypeMismatch(_))
    ));
    assert!(matches!(
        SymbolicExpression::array_get(int_array("a"), bool_var("p")),
        Err(Error::TypeMismatch(_))
    ));
    Ok(())
}

#[test]
fn test_render_path_condition() -> Result<()> {
    let x = int_var("x");
    let lt = SymbolicExpression::binary(BinaryOperator::Lt, x.clone(), SymbolicExpression::int(5))?;
    assert_eq!(lt.to_string(), "(x < 5)");
    assert_eq!(lt.ty(), &ExpressionType::bool());

    let sum =
        SymbolicExpression::binary(BinaryOperator::Add, x.clone(), SymbolicExpression::int(-3))?;
    let neg = SymbolicExpression::neg(sum)?;
    assert_eq!(neg.to_string(), "((x + -3) -)");

    let guarded = SymbolicExpression::implies(
        SymbolicExpression::not(bool_var("p"))?,
        SymbolicExpression::or(vec![lt, bool_var("q")])?,
    )?;
    assert_eq!(guarded.to_string(), "(!p => ((x < 5) || q))");

    let choice = SymbolicExpression::if_else(bool_var("p"), x, SymbolicExpression::int(0))?;
    assert_eq!(choice.to_string(), "(if (p) x else 0)");
    Ok(())
}

/// Renders a tree in prefix notation, as an example of an out-of-crate processor.
struct PrefixPrinter;

impl ExpressionVisitor for PrefixPrinter {
    type Output = String;

    fn visit_variable(&mut self, expr: &Variable) -> String {
        expr.name().to_string()
    }

    fn visit_int_constant(&mut self, expr: &IntConstant) -> String {
        expr.value().to_string()
    }

    fn visit_bool_constant(&mut self, expr: &BoolConstant) -> String {
        expr.value().to_string()
    }

    fn visit_unary(&mut self, expr: &UnaryOp) -> String {
        format!("({} {})", expr.operator(), expr.operand().accept(self))
    }

    fn visit_binary(&mut self, expr: &BinaryOp) -> String {
        let left = expr.left().accept(self);
        let right = expr.right().accept(self);
        format!("({} {left} {right})", expr.operator())
    }

    fn visit_logical(&mut self, expr: &LogicalOp) -> String {
        let operands: Vec<String> = expr.operands().iter().map(|o| o.accept(self)).collect();
        format!("({} {})", expr.operator(), operands.join(" "))
    }

    fn visit_ternary(&mut self, expr: &TernaryOp) -> String {
        format!(
            "(ite {} {} {})",
            expr.condition().accept(self),
            expr.then_branch().accept(self),
            expr.else_branch().accept(self)
        )
    }
}

#[test]
fn test_custom_visitor() -> Result<()> {
    let x = int_var("x");
    let lower =
        SymbolicExpression::binary(BinaryOperator::Gt, x.clone(), SymbolicExpression::int(0))?;
    let upper =
        SymbolicExpression::binary(BinaryOperator::Lt, x.clone(), SymbolicExpression::int(100))?;
    let both = SymbolicExpression::and(vec![lower, upper])?;
    let expr =
        SymbolicExpression::if_else(both, SymbolicExpression::neg(x)?, SymbolicExpression::int(1))?;

    assert_eq!(
        expr.accept(&mut PrefixPrinter),
        "(ite (&& (> x 0) (< x 100)) (- x) 1)"
    );
    Ok(())
}

#[test]
fn test_tree_metrics() -> Result<()> {
    let x = int_var("x");
    let lower =
        SymbolicExpression::binary(BinaryOperator::Gt, x.clone(), SymbolicExpression::int(0))?;
    let upper = SymbolicExpression::binary(BinaryOperator::Lt, x, SymbolicExpression::int(100))?;
    let both = SymbolicExpression::and(vec![lower, upper])?;

    assert_eq!(both.depth(), 2);
    assert_eq!(both.node_count(), 7);
    assert!(!both.is_constant());
    assert!(SymbolicExpression::int(4).is_constant());

    let vars = both.variables()?;
    assert_eq!(vars.len(), 1);
    assert_eq!(vars.get("x"), Some(&ExpressionType::int()));
    Ok(())
}

#[test]
fn test_frontend_summary() -> Result<()> {
    let mut symbols = SymbolTable::new();
    symbols.declare("n", ExpressionType::int())?;
    symbols.declare("buf", ExpressionType::array(ExpressionType::int()))?;

    let mut summary = FunctionSummary::new("checked_read");
    for (name, ty) in symbols.iter() {
        summary.symbols_mut().declare(name, ty.clone())?;
    }

    let n = summary.symbols().variable("n")?;
    let buf = summary.symbols().variable("buf")?;
    summary.add_path_condition(SymbolicExpression::binary(
        BinaryOperator::Ge,
        n.clone(),
        SymbolicExpression::int(0),
    )?)?;
    summary.set_result(SymbolicExpression::array_get(buf, n)?)?;

    let stray =
        SymbolicExpression::binary(BinaryOperator::Eq, int_var("m"), SymbolicExpression::int(1))?;
    assert_eq!(
        summary.add_path_condition(stray),
        Err(Error::UnknownVariable("m".to_string()))
    );

    let program: ProgramTable = std::iter::once(summary).collect();
    let found = program.function("checked_read")?;
    let found = found.as_ref();
    assert_eq!(found.map(|f| f.path_conditions().len()), Some(1));
    assert_eq!(
        found.and_then(FunctionSummary::result).map(ToString::to_string),
        Some("(buf [] n)".to_string())
    );
    assert!(program.function("main")?.is_none());
    Ok(())
}

#[test]
fn test_deep_path_condition() -> Result<()> {
    const LEVELS: usize = 100_000;

    let mut summary = FunctionSummary::new("countdown");
    summary.symbols_mut().declare("n", ExpressionType::int())?;

    let mut value = summary.symbols().variable("n")?;
    for _ in 0..LEVELS {
        value = SymbolicExpression::neg(value)?;
    }
    let condition =
        SymbolicExpression::binary(BinaryOperator::Lt, value, SymbolicExpression::int(0))?;
    assert_eq!(condition.depth(), LEVELS + 1);

    summary.add_path_condition(condition.clone())?;
    assert!(matches!(
        summary.add_path_condition(bool_var("p")),
        Err(Error::UnknownVariable(_))
    ));

    let combined = summary.path_condition()?;
    assert_eq!(combined, condition);
    assert_eq!(combined.node_count(), LEVELS + 3);
    assert!(combined.to_string().ends_with("(n -) -) < 0)"));

    drop(summary);
    drop(combined);
    drop(condition);
    Ok(())
}

#[test]
fn test_expressions_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SymbolicExpression>();
    assert_send_sync::<ExpressionType>();
    assert_send_sync::<SymbolTable>();
}

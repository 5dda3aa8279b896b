//! Symbolic expression tree representation.
//!
//! This module defines [`SymbolicExpression`], an immutable, typed expression tree over
//! symbolic variables and constants, together with one struct per node variant.
//!
//! # Construction
//!
//! Composite nodes ([`UnaryOp`], [`BinaryOp`], [`LogicalOp`], [`TernaryOp`]) can only be
//! built through their validating `new` constructors (or the shorthands on
//! [`SymbolicExpression`]). Construction is the single point where typing rules are
//! checked; a node that exists is well-typed, and [`SymbolicExpression::ty`] cannot fail.
//!
//! # Rendering
//!
//! Every node implements [`Display`](fmt::Display) with a fully parenthesised form:
//!
//! ```text
//! (x < 5)                     binary
//! (x -)                       unary negation
//! !b    (a && b)    (a => b)  logical
//! (if (c) 1 else 2)           ternary
//! ```
//!
//! The text is meant for logs and diagnostics and is not parsed back.

use std::{
    fmt,
    hash::{Hash, Hasher},
    mem,
};

use crate::{
    symbolic::{
        ops::{BinaryOperator, LogicalOperator, TernaryOperator, UnaryOperator},
        types::ExpressionType,
    },
    Error, Result,
};

static INT: ExpressionType = ExpressionType::Int;
static BOOL: ExpressionType = ExpressionType::Bool;

/// A named symbolic variable.
///
/// The name is the variable's sole identity: two variables with the same name denote the
/// same symbolic quantity within a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    name: String,
    ty: ExpressionType,
}

impl Variable {
    /// Creates a new symbolic variable.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name.
    /// * `ty` - The variable's type.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: ExpressionType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the variable type.
    #[must_use]
    pub const fn ty(&self) -> &ExpressionType {
        &self.ty
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A 64-bit signed integer constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntConstant {
    value: i64,
}

impl IntConstant {
    /// Creates a new integer constant.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self { value }
    }

    /// Returns the constant value.
    #[must_use]
    pub const fn value(&self) -> i64 {
        self.value
    }
}

impl fmt::Display for IntConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A boolean constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoolConstant {
    value: bool,
}

impl BoolConstant {
    /// Creates a new boolean constant.
    #[must_use]
    pub const fn new(value: bool) -> Self {
        Self { value }
    }

    /// Returns the constant value.
    #[must_use]
    pub const fn value(&self) -> bool {
        self.value
    }
}

impl fmt::Display for BoolConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A unary operation. The only operator is integer negation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnaryOp {
    operator: UnaryOperator,
    operand: Box<SymbolicExpression>,
}

impl UnaryOp {
    /// Creates a unary operation after checking the operand type.
    ///
    /// # Arguments
    ///
    /// * `operator` - The unary operator.
    /// * `operand` - The operand expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the operand kind is not accepted by the operator.
    pub fn new(operator: UnaryOperator, operand: SymbolicExpression) -> Result<Self> {
        let kind = operand.ty().kind();
        if !operator.operand_kinds().contains_kind(kind) {
            return Err(type_mismatch!(
                "`{}` expects {} operand, found {}",
                operator,
                operator.operand_kinds(),
                operand.ty()
            ));
        }

        Ok(Self {
            operator,
            operand: Box::new(operand),
        })
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> UnaryOperator {
        self.operator
    }

    /// Returns the operand.
    #[must_use]
    pub fn operand(&self) -> &SymbolicExpression {
        &self.operand
    }

    /// Returns the result type, which is always `int`.
    #[must_use]
    pub fn ty(&self) -> &ExpressionType {
        match self.operator {
            UnaryOperator::Neg => &INT,
        }
    }
}

impl UnaryOp {
    fn push_pieces<'a>(&'a self, pending: &mut Vec<Piece<'a>>) {
        pending.extend([
            Piece::Text(")"),
            Piece::Symbol(&self.operator),
            Piece::Text(" "),
            Piece::Expr(&self.operand),
            Piece::Text("("),
        ]);
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = Vec::new();
        self.push_pieces(&mut pending);
        render(pending, f)
    }
}

/// A binary operation.
///
/// # Typing rules
///
/// | Operator | Left | Right | Result |
/// |---|---|---|---|
/// | `+ - * / %` | int | same as left | left |
/// | `== != < <= > >=` | any | same as left | bool |
/// | `[]` | `array[T]` | int | `T` |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryOp {
    operator: BinaryOperator,
    left: Box<SymbolicExpression>,
    right: Box<SymbolicExpression>,
    result: ExpressionType,
}

impl BinaryOp {
    /// Creates a binary operation after checking the operand types.
    ///
    /// # Arguments
    ///
    /// * `operator` - The binary operator.
    /// * `left` - The left operand expression.
    /// * `right` - The right operand expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the operand types disagree (for any operator but
    /// array indexing), if an arithmetic operator receives non-integer operands, or if
    /// array indexing receives a non-array base or a non-integer index.
    pub fn new(
        operator: BinaryOperator,
        left: SymbolicExpression,
        right: SymbolicExpression,
    ) -> Result<Self> {
        let result = Self::result_type(operator, left.ty(), right.ty())?;
        Ok(Self {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            result,
        })
    }

    fn result_type(
        operator: BinaryOperator,
        left: &ExpressionType,
        right: &ExpressionType,
    ) -> Result<ExpressionType> {
        if operator == BinaryOperator::ArrayGet {
            let ExpressionType::Array(element) = left else {
                return Err(type_mismatch!(
                    "`{}` expects an array to index, found {}",
                    operator,
                    left
                ));
            };
            if !right.is_int() {
                return Err(type_mismatch!(
                    "`{}` expects an int index, found {}",
                    operator,
                    right
                ));
            }
            return Ok((**element).clone());
        }

        if left != right {
            return Err(type_mismatch!(
                "operands of `{}` disagree: {} vs {}",
                operator,
                left,
                right
            ));
        }
        if !operator.operand_kinds().contains_kind(left.kind()) {
            return Err(type_mismatch!(
                "`{}` expects {} operands, found {}",
                operator,
                operator.operand_kinds(),
                left
            ));
        }

        if operator.is_comparison() {
            Ok(ExpressionType::Bool)
        } else {
            Ok(left.clone())
        }
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> BinaryOperator {
        self.operator
    }

    /// Returns the left operand.
    #[must_use]
    pub fn left(&self) -> &SymbolicExpression {
        &self.left
    }

    /// Returns the right operand.
    #[must_use]
    pub fn right(&self) -> &SymbolicExpression {
        &self.right
    }

    /// Returns the result type, derived from the operator and operand types at construction.
    #[must_use]
    pub const fn ty(&self) -> &ExpressionType {
        &self.result
    }
}

impl BinaryOp {
    fn push_pieces<'a>(&'a self, pending: &mut Vec<Piece<'a>>) {
        pending.extend([
            Piece::Text(")"),
            Piece::Expr(&self.right),
            Piece::Text(" "),
            Piece::Symbol(&self.operator),
            Piece::Text(" "),
            Piece::Expr(&self.left),
            Piece::Text("("),
        ]);
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = Vec::new();
        self.push_pieces(&mut pending);
        render(pending, f)
    }
}

/// A logical operation over boolean operands.
///
/// `And` and `Or` are variadic (at least one operand), `Not` takes exactly one operand and
/// `Implies` exactly two. The result is always `bool`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalOp {
    operator: LogicalOperator,
    operands: Vec<SymbolicExpression>,
}

impl LogicalOp {
    /// Creates a logical operation after checking operand count and types.
    ///
    /// The operand count is checked before the operand types.
    ///
    /// # Arguments
    ///
    /// * `operator` - The logical operator.
    /// * `operands` - The operands, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArity`] if the operand count does not match the operator's
    /// arity, or [`Error::TypeMismatch`] if any operand is not boolean.
    pub fn new(operator: LogicalOperator, operands: Vec<SymbolicExpression>) -> Result<Self> {
        let arity = operator.arity();
        if !arity.accepts(operands.len()) {
            return Err(Error::InvalidArity {
                operator,
                expected: arity,
                found: operands.len(),
            });
        }

        if let Some((index, operand)) = operands
            .iter()
            .enumerate()
            .find(|(_, operand)| !operand.ty().is_bool())
        {
            return Err(type_mismatch!(
                "operand {} of `{}` must be bool, found {}",
                index,
                operator,
                operand.ty()
            ));
        }

        Ok(Self { operator, operands })
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> LogicalOperator {
        self.operator
    }

    /// Returns the operands in order.
    #[must_use]
    pub fn operands(&self) -> &[SymbolicExpression] {
        &self.operands
    }

    /// Returns the result type, which is always `bool`.
    #[must_use]
    pub fn ty(&self) -> &ExpressionType {
        &BOOL
    }
}

impl LogicalOp {
    fn push_pieces<'a>(&'a self, pending: &mut Vec<Piece<'a>>) {
        if self.operator == LogicalOperator::Not {
            pending.extend(self.operands.iter().map(Piece::Expr));
            pending.push(Piece::Text("!"));
            return;
        }

        pending.push(Piece::Text(")"));
        for (i, operand) in self.operands.iter().enumerate().rev() {
            pending.push(Piece::Expr(operand));
            if i > 0 {
                pending.extend([
                    Piece::Text(" "),
                    Piece::Symbol(&self.operator),
                    Piece::Text(" "),
                ]);
            }
        }
        pending.push(Piece::Text("("));
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = Vec::new();
        self.push_pieces(&mut pending);
        render(pending, f)
    }
}

/// A ternary operation. The only operator is the conditional value `IfElse`.
///
/// The condition must be boolean and both branches must have the same kind; the result
/// has the then-branch's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TernaryOp {
    operator: TernaryOperator,
    condition: Box<SymbolicExpression>,
    then_branch: Box<SymbolicExpression>,
    else_branch: Box<SymbolicExpression>,
}

impl TernaryOp {
    /// Creates a ternary operation after checking the condition and branch types.
    ///
    /// # Arguments
    ///
    /// * `operator` - The ternary operator.
    /// * `condition` - The boolean condition.
    /// * `then_branch` - The value when the condition holds.
    /// * `else_branch` - The value otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if the condition is not boolean or the branch kinds
    /// differ.
    pub fn new(
        operator: TernaryOperator,
        condition: SymbolicExpression,
        then_branch: SymbolicExpression,
        else_branch: SymbolicExpression,
    ) -> Result<Self> {
        if !condition.ty().is_bool() {
            return Err(type_mismatch!(
                "condition of `{}` must be bool, found {}",
                operator,
                condition.ty()
            ));
        }
        if then_branch.ty().kind() != else_branch.ty().kind() {
            return Err(type_mismatch!(
                "branches of `{}` disagree: {} vs {}",
                operator,
                then_branch.ty(),
                else_branch.ty()
            ));
        }

        Ok(Self {
            operator,
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> TernaryOperator {
        self.operator
    }

    /// Returns the condition.
    #[must_use]
    pub fn condition(&self) -> &SymbolicExpression {
        &self.condition
    }

    /// Returns the then-branch.
    #[must_use]
    pub fn then_branch(&self) -> &SymbolicExpression {
        &self.then_branch
    }

    /// Returns the else-branch.
    #[must_use]
    pub fn else_branch(&self) -> &SymbolicExpression {
        &self.else_branch
    }

    /// Returns the result type, the then-branch's type.
    #[must_use]
    pub fn ty(&self) -> &ExpressionType {
        match self.operator {
            TernaryOperator::IfElse => self.then_branch.ty(),
        }
    }
}

impl TernaryOp {
    fn push_pieces<'a>(&'a self, pending: &mut Vec<Piece<'a>>) {
        match self.operator {
            TernaryOperator::IfElse => pending.extend([
                Piece::Text(")"),
                Piece::Expr(&self.else_branch),
                Piece::Text(" else "),
                Piece::Expr(&self.then_branch),
                Piece::Text(") "),
                Piece::Expr(&self.condition),
                Piece::Text("(if ("),
            ]),
        }
    }
}

impl fmt::Display for TernaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = Vec::new();
        self.push_pieces(&mut pending);
        render(pending, f)
    }
}

/// A unit of rendering work: a subtree still to expand, or text to emit as is.
enum Piece<'a> {
    Expr(&'a SymbolicExpression),
    Text(&'static str),
    Symbol(&'a dyn fmt::Display),
}

/// Writes `pending` from the top of the stack down, expanding subtrees in place.
fn render<'a>(mut pending: Vec<Piece<'a>>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    while let Some(piece) = pending.pop() {
        match piece {
            Piece::Text(text) => f.write_str(text)?,
            Piece::Symbol(symbol) => write!(f, "{symbol}")?,
            Piece::Expr(expr) => match expr {
                SymbolicExpression::Variable(v) => write!(f, "{v}")?,
                SymbolicExpression::IntConstant(c) => write!(f, "{c}")?,
                SymbolicExpression::BoolConstant(c) => write!(f, "{c}")?,
                SymbolicExpression::Unary(op) => op.push_pieces(&mut pending),
                SymbolicExpression::Binary(op) => op.push_pieces(&mut pending),
                SymbolicExpression::Logical(op) => op.push_pieces(&mut pending),
                SymbolicExpression::Ternary(op) => op.push_pieces(&mut pending),
            },
        }
    }
    Ok(())
}

/// A typed symbolic expression.
///
/// This is a closed sum over the seven node variants. Nodes own their children
/// exclusively, so an expression is always a tree. Trees are immutable and can be shared
/// read-only across threads.
///
/// # Examples
///
/// ```rust
/// use symexpr::symbolic::{BinaryOperator, ExpressionType, SymbolicExpression};
///
/// let x = SymbolicExpression::variable("x", ExpressionType::int());
/// let cmp = SymbolicExpression::binary(BinaryOperator::Lt, x, SymbolicExpression::int(5))?;
///
/// assert_eq!(cmp.to_string(), "(x < 5)");
/// assert_eq!(cmp.ty(), &ExpressionType::bool());
/// # Ok::<(), symexpr::Error>(())
/// ```
///
/// # Deep trees
///
/// Cloning, comparison, hashing, rendering, the tree metrics and dropping all walk the
/// tree with an explicit stack, so their stack usage does not grow with the depth of the
/// tree.
pub enum SymbolicExpression {
    /// A named symbolic variable.
    Variable(Variable),
    /// An integer constant.
    IntConstant(IntConstant),
    /// A boolean constant.
    BoolConstant(BoolConstant),
    /// A unary operation.
    Unary(UnaryOp),
    /// A binary operation.
    Binary(BinaryOp),
    /// A logical operation.
    Logical(LogicalOp),
    /// A ternary operation.
    Ternary(TernaryOp),
}

impl SymbolicExpression {
    /// Creates a variable expression.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name.
    /// * `ty` - The variable type.
    #[must_use]
    pub fn variable(name: impl Into<String>, ty: ExpressionType) -> Self {
        Self::Variable(Variable::new(name, ty))
    }

    /// Creates an integer constant expression.
    #[must_use]
    pub const fn int(value: i64) -> Self {
        Self::IntConstant(IntConstant::new(value))
    }

    /// Creates a boolean constant expression.
    #[must_use]
    pub const fn bool(value: bool) -> Self {
        Self::BoolConstant(BoolConstant::new(value))
    }

    /// Creates a unary operation expression.
    ///
    /// # Errors
    ///
    /// See [`UnaryOp::new`].
    pub fn unary(operator: UnaryOperator, operand: Self) -> Result<Self> {
        UnaryOp::new(operator, operand).map(Self::Unary)
    }

    /// Creates an integer negation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `operand` is not an integer.
    pub fn neg(operand: Self) -> Result<Self> {
        Self::unary(UnaryOperator::Neg, operand)
    }

    /// Creates a binary operation expression.
    ///
    /// # Arguments
    ///
    /// * `operator` - The binary operator.
    /// * `left` - The left operand expression.
    /// * `right` - The right operand expression.
    ///
    /// # Errors
    ///
    /// See [`BinaryOp::new`].
    pub fn binary(operator: BinaryOperator, left: Self, right: Self) -> Result<Self> {
        BinaryOp::new(operator, left, right).map(Self::Binary)
    }

    /// Creates an array read `array[index]`.
    ///
    /// # Errors
    ///
    /// See [`BinaryOp::new`].
    pub fn array_get(array: Self, index: Self) -> Result<Self> {
        Self::binary(BinaryOperator::ArrayGet, array, index)
    }

    /// Creates a logical operation expression.
    ///
    /// # Errors
    ///
    /// See [`LogicalOp::new`].
    pub fn logical(operator: LogicalOperator, operands: Vec<Self>) -> Result<Self> {
        LogicalOp::new(operator, operands).map(Self::Logical)
    }

    /// Creates a conjunction of one or more boolean operands.
    ///
    /// # Errors
    ///
    /// See [`LogicalOp::new`].
    pub fn and(operands: Vec<Self>) -> Result<Self> {
        Self::logical(LogicalOperator::And, operands)
    }

    /// Creates a disjunction of one or more boolean operands.
    ///
    /// # Errors
    ///
    /// See [`LogicalOp::new`].
    pub fn or(operands: Vec<Self>) -> Result<Self> {
        Self::logical(LogicalOperator::Or, operands)
    }

    /// Creates a boolean negation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if `operand` is not boolean.
    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: Self) -> Result<Self> {
        Self::logical(LogicalOperator::Not, vec![operand])
    }

    /// Creates an implication `antecedent => consequent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] if either side is not boolean.
    pub fn implies(antecedent: Self, consequent: Self) -> Result<Self> {
        Self::logical(LogicalOperator::Implies, vec![antecedent, consequent])
    }

    /// Creates a ternary operation expression.
    ///
    /// # Errors
    ///
    /// See [`TernaryOp::new`].
    pub fn ternary(
        operator: TernaryOperator,
        condition: Self,
        then_branch: Self,
        else_branch: Self,
    ) -> Result<Self> {
        TernaryOp::new(operator, condition, then_branch, else_branch).map(Self::Ternary)
    }

    /// Creates a conditional value `if condition then then_branch else else_branch`.
    ///
    /// # Errors
    ///
    /// See [`TernaryOp::new`].
    pub fn if_else(condition: Self, then_branch: Self, else_branch: Self) -> Result<Self> {
        Self::ternary(TernaryOperator::IfElse, condition, then_branch, else_branch)
    }

    /// Returns the type of this expression.
    ///
    /// Infallible: the type was validated when the node was constructed.
    #[must_use]
    pub fn ty(&self) -> &ExpressionType {
        match self {
            Self::Variable(v) => v.ty(),
            Self::IntConstant(_) => &INT,
            Self::BoolConstant(_) => &BOOL,
            Self::Unary(op) => op.ty(),
            Self::Binary(op) => op.ty(),
            Self::Logical(op) => op.ty(),
            Self::Ternary(op) => op.ty(),
        }
    }

    /// Checks if this expression is a constant.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::IntConstant(_) | Self::BoolConstant(_))
    }

    /// Returns the variable if this expression is one.
    #[must_use]
    pub const fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the depth of the expression tree.
    ///
    /// The depth is the length of the longest path from the root to a leaf.
    /// Constants and variables have depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 0_usize)];
        let mut children = Vec::new();
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            node.push_children(&mut children);
            pending.extend(children.drain(..).map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Returns the number of nodes in the expression tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Iterates over every node of the tree in pre-order, starting with `self`.
    ///
    /// Children are visited left to right: operands in order, and for a ternary the
    /// condition, then-branch and else-branch.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use symexpr::symbolic::{ExpressionType, SymbolicExpression};
    ///
    /// let x = SymbolicExpression::variable("x", ExpressionType::int());
    /// let neg = SymbolicExpression::neg(x)?;
    /// let rendered: Vec<String> = neg.nodes().map(ToString::to_string).collect();
    /// assert_eq!(rendered, ["(x -)", "x"]);
    /// # Ok::<(), symexpr::Error>(())
    /// ```
    pub fn nodes(&self) -> impl Iterator<Item = &Self> {
        Nodes {
            pending: vec![self],
        }
    }

    /// Pushes the direct children onto `stack` so that the first child ends on top.
    fn push_children<'a>(&'a self, stack: &mut Vec<&'a Self>) {
        match self {
            Self::Variable(_) | Self::IntConstant(_) | Self::BoolConstant(_) => {}
            Self::Unary(op) => stack.push(&op.operand),
            Self::Binary(op) => stack.extend([&*op.right, &*op.left]),
            Self::Logical(op) => stack.extend(op.operands.iter().rev()),
            Self::Ternary(op) => {
                stack.extend([&*op.else_branch, &*op.then_branch, &*op.condition]);
            }
        }
    }

    /// Moves the direct children onto `stack`, leaving leaves in their place.
    fn detach_children(&mut self, stack: &mut Vec<Self>) {
        match self {
            Self::Variable(_) | Self::IntConstant(_) | Self::BoolConstant(_) => {}
            Self::Unary(op) => stack.push(mem::replace(&mut *op.operand, Self::bool(false))),
            Self::Binary(op) => {
                stack.push(mem::replace(&mut *op.left, Self::bool(false)));
                stack.push(mem::replace(&mut *op.right, Self::bool(false)));
            }
            Self::Logical(op) => stack.append(&mut op.operands),
            Self::Ternary(op) => {
                stack.push(mem::replace(&mut *op.condition, Self::bool(false)));
                stack.push(mem::replace(&mut *op.then_branch, Self::bool(false)));
                stack.push(mem::replace(&mut *op.else_branch, Self::bool(false)));
            }
        }
    }

    /// Copies this node on top of children already copied onto `copies`, last child on top.
    fn copy_node(&self, copies: &mut Vec<Self>) -> Self {
        fn take(copies: &mut Vec<SymbolicExpression>) -> Box<SymbolicExpression> {
            Box::new(copies.pop().unwrap_or(SymbolicExpression::bool(false)))
        }

        match self {
            Self::Variable(v) => Self::Variable(v.clone()),
            Self::IntConstant(c) => Self::IntConstant(*c),
            Self::BoolConstant(c) => Self::BoolConstant(*c),
            Self::Unary(op) => Self::Unary(UnaryOp {
                operator: op.operator,
                operand: take(copies),
            }),
            Self::Binary(op) => {
                let right = take(copies);
                let left = take(copies);
                Self::Binary(BinaryOp {
                    operator: op.operator,
                    left,
                    right,
                    result: op.result.clone(),
                })
            }
            Self::Logical(op) => {
                let first = copies.len().saturating_sub(op.operands.len());
                Self::Logical(LogicalOp {
                    operator: op.operator,
                    operands: copies.split_off(first),
                })
            }
            Self::Ternary(op) => {
                let else_branch = take(copies);
                let then_branch = take(copies);
                let condition = take(copies);
                Self::Ternary(TernaryOp {
                    operator: op.operator,
                    condition,
                    then_branch,
                    else_branch,
                })
            }
        }
    }

    /// Compares the node itself, ignoring the contents of its children.
    fn same_node(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Variable(a), Self::Variable(b)) => a == b,
            (Self::IntConstant(a), Self::IntConstant(b)) => a == b,
            (Self::BoolConstant(a), Self::BoolConstant(b)) => a == b,
            (Self::Unary(a), Self::Unary(b)) => a.operator == b.operator,
            (Self::Binary(a), Self::Binary(b)) => a.operator == b.operator,
            (Self::Logical(a), Self::Logical(b)) => {
                a.operator == b.operator && a.operands.len() == b.operands.len()
            }
            (Self::Ternary(a), Self::Ternary(b)) => a.operator == b.operator,
            _ => false,
        }
    }

    fn hash_node<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Self::Variable(v) => v.hash(state),
            Self::IntConstant(c) => c.hash(state),
            Self::BoolConstant(c) => c.hash(state),
            Self::Unary(op) => op.operator.hash(state),
            Self::Binary(op) => op.operator.hash(state),
            Self::Logical(op) => {
                op.operator.hash(state);
                op.operands.len().hash(state);
            }
            Self::Ternary(op) => op.operator.hash(state),
        }
    }
}

/// Pre-order walk over a tree, see [`SymbolicExpression::nodes`].
struct Nodes<'a> {
    pending: Vec<&'a SymbolicExpression>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = &'a SymbolicExpression;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.pending.pop()?;
        node.push_children(&mut self.pending);
        Some(node)
    }
}

impl Clone for SymbolicExpression {
    fn clone(&self) -> Self {
        // Post-order: a node is copied once all of its children sit on `copies`.
        let mut pending = Vec::new();
        let mut children = Vec::new();
        let mut copies = Vec::new();

        self.push_children(&mut children);
        pending.extend(children.drain(..).map(|child| (child, false)));
        while let Some((node, expanded)) = pending.pop() {
            if expanded {
                let copy = node.copy_node(&mut copies);
                copies.push(copy);
            } else {
                pending.push((node, true));
                node.push_children(&mut children);
                pending.extend(children.drain(..).map(|child| (child, false)));
            }
        }
        self.copy_node(&mut copies)
    }
}

impl PartialEq for SymbolicExpression {
    fn eq(&self, other: &Self) -> bool {
        // Equal pre-order node sequences with equal child counts describe equal trees.
        let mut left = self.nodes();
        let mut right = other.nodes();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) if a.same_node(b) => {}
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

impl Eq for SymbolicExpression {}

impl Hash for SymbolicExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for node in self.nodes() {
            node.hash_node(state);
        }
    }
}

impl Drop for SymbolicExpression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            // `node` goes out of scope with leaf children only.
            node.detach_children(&mut pending);
        }
    }
}

impl fmt::Debug for SymbolicExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolicExpression")
            .field("expr", &format_args!("{self}"))
            .field("ty", self.ty())
            .finish()
    }
}

impl fmt::Display for SymbolicExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(vec![Piece::Expr(self)], f)
    }
}

impl From<Variable> for SymbolicExpression {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}

impl From<IntConstant> for SymbolicExpression {
    fn from(value: IntConstant) -> Self {
        Self::IntConstant(value)
    }
}

impl From<BoolConstant> for SymbolicExpression {
    fn from(value: BoolConstant) -> Self {
        Self::BoolConstant(value)
    }
}

impl From<UnaryOp> for SymbolicExpression {
    fn from(value: UnaryOp) -> Self {
        Self::Unary(value)
    }
}

impl From<BinaryOp> for SymbolicExpression {
    fn from(value: BinaryOp) -> Self {
        Self::Binary(value)
    }
}

impl From<LogicalOp> for SymbolicExpression {
    fn from(value: LogicalOp) -> Self {
        Self::Logical(value)
    }
}

impl From<TernaryOp> for SymbolicExpression {
    fn from(value: TernaryOp) -> Self {
        Self::Ternary(value)
    }
}

impl From<i64> for SymbolicExpression {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

impl From<bool> for SymbolicExpression {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

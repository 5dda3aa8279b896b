//! Z3 translation of symbolic expressions.
//!
//! [`Z3Translator`] walks a [`SymbolicExpression`] through the [`ExpressionVisitor`]
//! dispatch and produces the equivalent Z3 formula as a [`z3::ast::Dynamic`], ready to be
//! asserted by whoever owns the solver.
//!
//! # Sorts
//!
//! | Expression type | Z3 sort |
//! |-----------------|---------|
//! | `int` | `Int` (unbounded) |
//! | `bool` | `Bool` |
//! | `array[T]` | `Array Int T'` with `T'` the sort of `T` |
//!
//! # Sessions
//!
//! A translator is one solving session. Variables are cached by name, so every occurrence
//! of `x` in every tree translated by the same translator maps to the same Z3 constant.
//! [`Z3Translator::reset`] starts over with an empty cache; [`Z3Translator::close`] (or
//! dropping the translator) releases the cached handles.
//!
//! Z3's context is per thread: create, use and drop a translator on the same thread.
//!
//! # Example
//!
//! ```rust,no_run
//! use symexpr::symbolic::{BinaryOperator, ExpressionType, SymbolicExpression, Z3Translator};
//!
//! let x = SymbolicExpression::variable("x", ExpressionType::int());
//! let lower =
//!     SymbolicExpression::binary(BinaryOperator::Gt, x.clone(), SymbolicExpression::int(0))?;
//! let upper = SymbolicExpression::binary(BinaryOperator::Lt, x, SymbolicExpression::int(100))?;
//! let both = SymbolicExpression::and(vec![lower, upper])?;
//!
//! let mut translator = Z3Translator::new();
//! let formula = translator.translate_bool(&both)?;
//!
//! let solver = z3::Solver::new();
//! solver.assert(&formula);
//! assert_eq!(solver.check(), z3::SatResult::Sat);
//! # Ok::<(), symexpr::Error>(())
//! ```

use std::collections::HashMap;

use log::{debug, trace};
use z3::{
    ast::{Array, Ast, Bool, Dynamic, Int},
    Sort,
};

use crate::{
    symbolic::{
        expr::{
            BinaryOp, BoolConstant, IntConstant, LogicalOp, SymbolicExpression, TernaryOp,
            UnaryOp, Variable,
        },
        ops::{BinaryOperator, LogicalOperator, TernaryOperator, UnaryOperator},
        types::ExpressionType,
        visitor::ExpressionVisitor,
    },
    Error, Result,
};

/// Configuration for a [`Z3Translator`].
///
/// # Examples
///
/// ```rust
/// use symexpr::symbolic::TranslatorConfig;
///
/// let config = TranslatorConfig {
///     max_depth: 64,
///     ..TranslatorConfig::default()
/// };
/// assert!(config.check_variable_types);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorConfig {
    /// Maximum number of nested nodes translated before giving up with
    /// [`Error::RecursionLimit`].
    pub max_depth: usize,
    /// Reject a variable name that reappears with a different type in the same session.
    ///
    /// When disabled, the latest type wins and replaces the cached constant.
    pub check_variable_types: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            max_depth: 4096,
            check_variable_types: true,
        }
    }
}

impl TranslatorConfig {
    /// Creates a configuration with a tight nesting limit and all checks enabled.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            max_depth: 1024,
            check_variable_types: true,
        }
    }

    /// Creates a configuration with variable type checks disabled.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            max_depth: 4096,
            check_variable_types: false,
        }
    }

    /// Creates a configuration without a nesting limit.
    ///
    /// Deep trees may then exhaust the thread's stack.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
            check_variable_types: true,
        }
    }
}

/// Translates [`SymbolicExpression`] trees into Z3 formulas for one solving session.
///
/// The translator is the only stateful piece of the engine: it owns the name-keyed cache
/// of Z3 constants. It is driven through `&mut self`, so one session cannot be used from
/// two places at once; build one translator per path or thread instead.
pub struct Z3Translator {
    variables: HashMap<String, (ExpressionType, Dynamic)>,
    config: TranslatorConfig,
    depth: usize,
}

impl Z3Translator {
    /// Creates a translator with the default [`TranslatorConfig`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TranslatorConfig::default())
    }

    /// Creates a translator with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Limits and checks for this session.
    ///
    /// # Returns
    ///
    /// A fresh translator with an empty variable cache.
    #[must_use]
    pub fn with_config(config: TranslatorConfig) -> Self {
        debug!(
            "Opening translator session (max_depth: {}, check_variable_types: {})",
            config.max_depth, config.check_variable_types
        );
        Self {
            variables: HashMap::new(),
            config,
            depth: 0,
        }
    }

    /// Returns the configuration of this session.
    #[must_use]
    pub const fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translates an expression into a Z3 formula.
    ///
    /// # Arguments
    ///
    /// * `expr` - The expression to translate.
    ///
    /// # Returns
    ///
    /// A Z3 AST whose sort matches `expr.ty()`.
    ///
    /// # Errors
    ///
    /// - [`Error::TranslationError`] for an operator/sort combination Z3 cannot express,
    ///   or a variable name reused with another type
    /// - [`Error::RecursionLimit`] if the tree nests deeper than `max_depth`
    ///
    /// After an error the cache may hold variables created before the failure.
    pub fn translate(&mut self, expr: &SymbolicExpression) -> Result<Dynamic> {
        let result = self.translate_nested(expr);
        if let Err(error) = &result {
            debug!(
                "Failed to translate {} expression of {} nodes: {error}",
                expr.ty(),
                expr.node_count()
            );
        }
        result
    }

    /// Translates a boolean expression, such as a path condition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TranslationError`] if `expr` is not boolean, plus every error of
    /// [`translate`](Self::translate).
    pub fn translate_bool(&mut self, expr: &SymbolicExpression) -> Result<Bool> {
        let value = self.translate(expr)?;
        value
            .as_bool()
            .ok_or_else(|| translation_error!("expected a bool formula for `{}`", expr))
    }

    /// Returns the cached Z3 constant for `name`, if it was translated in this session.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&Dynamic> {
        self.variables.get(name).map(|(_, value)| value)
    }

    /// Iterates over the cached variables as `(name, type, constant)`.
    pub fn cached_variables(&self) -> impl Iterator<Item = (&str, &ExpressionType, &Dynamic)> {
        self.variables
            .iter()
            .map(|(name, (ty, value))| (name.as_str(), ty, value))
    }

    /// Returns the number of cached variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns `true` if no variable has been translated in this session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Starts a fresh session by clearing the variable cache.
    ///
    /// Variables translated afterwards get new handles.
    pub fn reset(&mut self) {
        debug!(
            "Resetting translator session ({} cached variables)",
            self.variables.len()
        );
        self.variables.clear();
        self.depth = 0;
    }

    /// Ends the session and releases every cached handle.
    pub fn close(self) {
        drop(self);
    }

    fn translate_nested(&mut self, expr: &SymbolicExpression) -> Result<Dynamic> {
        if self.depth >= self.config.max_depth {
            return Err(Error::RecursionLimit(self.config.max_depth));
        }

        self.depth += 1;
        let result = expr.accept(self);
        self.depth -= 1;
        result
    }

    fn nested_int(&mut self, expr: &SymbolicExpression) -> Result<Int> {
        let value = self.translate_nested(expr)?;
        value
            .as_int()
            .ok_or_else(|| translation_error!("expected an int formula for `{}`", expr))
    }

    fn nested_bool(&mut self, expr: &SymbolicExpression) -> Result<Bool> {
        let value = self.translate_nested(expr)?;
        value
            .as_bool()
            .ok_or_else(|| translation_error!("expected a bool formula for `{}`", expr))
    }

    fn nested_array(&mut self, expr: &SymbolicExpression) -> Result<Array> {
        let value = self.translate_nested(expr)?;
        value
            .as_array()
            .ok_or_else(|| translation_error!("expected an array formula for `{}`", expr))
    }

    fn declare(name: &str, ty: &ExpressionType) -> Dynamic {
        match ty {
            ExpressionType::Int => Dynamic::from_ast(&Int::new_const(name)),
            ExpressionType::Bool => Dynamic::from_ast(&Bool::new_const(name)),
            ExpressionType::Array(element) => {
                Dynamic::from_ast(&Array::new_const(name, &Sort::int(), &sort_of(element)))
            }
        }
    }

    fn equality(&mut self, expr: &BinaryOp) -> Result<Bool> {
        match expr.left().ty() {
            ExpressionType::Int => {
                let left = self.nested_int(expr.left())?;
                let right = self.nested_int(expr.right())?;
                Ok(left.eq(&right))
            }
            ExpressionType::Bool => {
                let left = self.nested_bool(expr.left())?;
                let right = self.nested_bool(expr.right())?;
                Ok(left.eq(&right))
            }
            ExpressionType::Array(_) => {
                let left = self.nested_array(expr.left())?;
                let right = self.nested_array(expr.right())?;
                Ok(left.eq(&right))
            }
        }
    }
}

impl Default for Z3Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Z3Translator {
    fn drop(&mut self) {
        debug!(
            "Closing translator session ({} cached variables)",
            self.variables.len()
        );
        self.variables.clear();
    }
}

/// Maps an expression type to its Z3 sort.
fn sort_of(ty: &ExpressionType) -> Sort {
    match ty {
        ExpressionType::Int => Sort::int(),
        ExpressionType::Bool => Sort::bool(),
        ExpressionType::Array(element) => Sort::array(&Sort::int(), &sort_of(element)),
    }
}

impl ExpressionVisitor for Z3Translator {
    type Output = Result<Dynamic>;

    fn visit_variable(&mut self, expr: &Variable) -> Result<Dynamic> {
        if let Some((ty, value)) = self.variables.get(expr.name()) {
            if ty == expr.ty() {
                return Ok(value.clone());
            }
            if self.config.check_variable_types {
                return Err(translation_error!(
                    "variable `{}` requested as {} but cached as {}",
                    expr.name(),
                    expr.ty(),
                    ty
                ));
            }
        }

        trace!("Declaring Z3 constant `{}` of type {}", expr.name(), expr.ty());
        let value = Self::declare(expr.name(), expr.ty());
        self.variables.insert(
            expr.name().to_string(),
            (expr.ty().clone(), value.clone()),
        );
        Ok(value)
    }

    fn visit_int_constant(&mut self, expr: &IntConstant) -> Result<Dynamic> {
        Ok(Dynamic::from_ast(&Int::from_i64(expr.value())))
    }

    fn visit_bool_constant(&mut self, expr: &BoolConstant) -> Result<Dynamic> {
        Ok(Dynamic::from_ast(&Bool::from_bool(expr.value())))
    }

    fn visit_unary(&mut self, expr: &UnaryOp) -> Result<Dynamic> {
        match expr.operator() {
            UnaryOperator::Neg => {
                let operand = self.nested_int(expr.operand())?;
                Ok(Dynamic::from_ast(&operand.unary_minus()))
            }
        }
    }

    fn visit_binary(&mut self, expr: &BinaryOp) -> Result<Dynamic> {
        let op = expr.operator();
        match op {
            BinaryOperator::Eq => Ok(Dynamic::from_ast(&self.equality(expr)?)),
            BinaryOperator::Ne => Ok(Dynamic::from_ast(&self.equality(expr)?.not())),
            BinaryOperator::ArrayGet => {
                let array = self.nested_array(expr.left())?;
                let index = self.nested_int(expr.right())?;
                Ok(array.select(&index))
            }
            _ => {
                if !expr.left().ty().is_int() {
                    return Err(translation_error!(
                        "operator `{}` is only defined for int operands, found {}",
                        op,
                        expr.left().ty()
                    ));
                }

                let left = self.nested_int(expr.left())?;
                let right = self.nested_int(expr.right())?;
                let value = match op {
                    BinaryOperator::Add => Dynamic::from_ast(&Int::add(&[left, right])),
                    BinaryOperator::Sub => Dynamic::from_ast(&Int::sub(&[left, right])),
                    BinaryOperator::Mul => Dynamic::from_ast(&Int::mul(&[left, right])),
                    BinaryOperator::Div => Dynamic::from_ast(&left.div(&right)),
                    BinaryOperator::Mod => Dynamic::from_ast(&left.modulo(&right)),
                    BinaryOperator::Lt => Dynamic::from_ast(&left.lt(&right)),
                    BinaryOperator::Le => Dynamic::from_ast(&left.le(&right)),
                    BinaryOperator::Gt => Dynamic::from_ast(&left.gt(&right)),
                    BinaryOperator::Ge => Dynamic::from_ast(&left.ge(&right)),
                    BinaryOperator::Eq | BinaryOperator::Ne | BinaryOperator::ArrayGet => {
                        return Err(translation_error!("unexpected operator `{}`", op));
                    }
                };
                Ok(value)
            }
        }
    }

    fn visit_logical(&mut self, expr: &LogicalOp) -> Result<Dynamic> {
        let operands = expr
            .operands()
            .iter()
            .map(|operand| self.nested_bool(operand))
            .collect::<Result<Vec<Bool>>>()?;

        let value = match (expr.operator(), operands.as_slice()) {
            (LogicalOperator::And, [_, ..]) => Bool::and(&operands),
            (LogicalOperator::Or, [_, ..]) => Bool::or(&operands),
            (LogicalOperator::Not, [operand]) => operand.not(),
            (LogicalOperator::Implies, [antecedent, consequent]) => {
                antecedent.implies(consequent)
            }
            (op, _) => {
                return Err(translation_error!(
                    "`{}` cannot take {} operand(s)",
                    op,
                    operands.len()
                ));
            }
        };
        Ok(Dynamic::from_ast(&value))
    }

    fn visit_ternary(&mut self, expr: &TernaryOp) -> Result<Dynamic> {
        match expr.operator() {
            TernaryOperator::IfElse => {
                let condition = self.nested_bool(expr.condition())?;
                let then_branch = self.translate_nested(expr.then_branch())?;
                let else_branch = self.translate_nested(expr.else_branch())?;

                if then_branch.get_sort() != else_branch.get_sort() {
                    return Err(translation_error!(
                        "branches of `{}` have different sorts: {} and {}",
                        expr,
                        expr.then_branch().ty(),
                        expr.else_branch().ty()
                    ));
                }

                Ok(condition.ite(&then_branch, &else_branch))
            }
        }
    }
}

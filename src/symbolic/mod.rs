//! Typed symbolic expressions and their translation to Z3.
//!
//! This module provides the analytical core of a symbolic-execution toolchain:
//!
//! - Building expression trees whose type-correctness is checked at construction
//! - Processing trees through a visitor interface
//! - Translating trees into Z3 formulas within a solving session
//!
//! # Architecture
//!
//! ```text
//! SymbolTable → SymbolicExpression (validated tree) → Z3Translator → z3::ast::Dynamic
//! ```
//!
//! Trees are immutable once built: every constructor validates its operands and returns
//! [`Error::TypeMismatch`](crate::Error::TypeMismatch) or
//! [`Error::InvalidArity`](crate::Error::InvalidArity) instead of producing an ill-typed
//! node. Consumers can then rely on [`SymbolicExpression::ty`] without re-checking.
//!
//! # Module Structure
//!
//! - `types` - The type lattice ([`ExpressionType`], [`TypeKind`], [`KindSet`])
//! - `ops` - Operators and their typing tables ([`BinaryOperator`], [`LogicalOperator`], ...)
//! - `expr` - Expression nodes and the [`SymbolicExpression`] sum type
//! - `visitor` - Dispatch over node variants ([`ExpressionVisitor`], [`VariableCollector`])
//! - `translator` - Z3 translation ([`Z3Translator`], feature `solver`)
//!
//! # Example
//!
//! ```rust
//! use symexpr::symbolic::{BinaryOperator, ExpressionType, SymbolicExpression};
//!
//! let x = SymbolicExpression::variable("x", ExpressionType::int());
//! let cond = SymbolicExpression::binary(BinaryOperator::Lt, x, SymbolicExpression::int(5))?;
//!
//! assert_eq!(cond.ty(), &ExpressionType::bool());
//! assert_eq!(cond.to_string(), "(x < 5)");
//! # Ok::<(), symexpr::Error>(())
//! ```

mod expr;
mod ops;
mod types;
mod visitor;

// Translation needs a system libz3, which is gated behind the solver feature
#[cfg(feature = "solver")]
mod translator;

pub use expr::{
    BinaryOp, BoolConstant, IntConstant, LogicalOp, SymbolicExpression, TernaryOp, UnaryOp,
    Variable,
};
pub use ops::{Arity, BinaryOperator, LogicalOperator, TernaryOperator, UnaryOperator};
pub use types::{ExpressionType, KindSet, TypeKind};
pub use visitor::{ExpressionVisitor, VariableCollector};

#[cfg(feature = "solver")]
pub use translator::{TranslatorConfig, Z3Translator};

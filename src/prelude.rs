//! # symexpr Prelude
//!
//! This module provides the most commonly used types and traits of the symexpr library.
//! Import it to get quick access to everything needed to build, inspect and translate
//! symbolic expressions.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all symexpr operations
pub use crate::Error;

/// The result type used throughout symexpr
pub use crate::Result;

// ================================================================================================
// Type Lattice
// ================================================================================================

/// Expression types and their kinds
pub use crate::symbolic::{ExpressionType, KindSet, TypeKind};

// ================================================================================================
// Expression Model
// ================================================================================================

/// The expression sum type
pub use crate::symbolic::SymbolicExpression;

/// Individual expression nodes
pub use crate::symbolic::{
    BinaryOp, BoolConstant, IntConstant, LogicalOp, TernaryOp, UnaryOp, Variable,
};

/// Operators
pub use crate::symbolic::{Arity, BinaryOperator, LogicalOperator, TernaryOperator, UnaryOperator};

// ================================================================================================
// Processing
// ================================================================================================

/// Visitor dispatch and the free-variable collector
pub use crate::symbolic::{ExpressionVisitor, VariableCollector};

/// Z3 translation
#[cfg(feature = "solver")]
pub use crate::symbolic::{TranslatorConfig, Z3Translator};

// ================================================================================================
// Front End Interface
// ================================================================================================

/// Symbols and function summaries supplied by a program front end
pub use crate::frontend::{FunctionSummary, ProgramSource, ProgramTable, SymbolTable};

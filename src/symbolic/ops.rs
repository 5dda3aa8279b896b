//! Symbolic operator types.
//!
//! This module defines the operators that can appear in expression nodes, one enum per
//! node family:
//!
//! - [`UnaryOperator`]: Neg
//! - [`BinaryOperator`]: arithmetic (Add, Sub, Mul, Div, Mod), comparison (Eq, Ne, Lt, Le,
//!   Gt, Ge) and array indexing (ArrayGet)
//! - [`LogicalOperator`]: And, Or, Not, Implies
//! - [`TernaryOperator`]: IfElse
//!
//! Each operator knows which operand kinds it accepts and how many operands it takes;
//! the validating constructors in [`expr`](super::expr) consult these tables.

use std::fmt;

use strum::{EnumCount, EnumIter};

use crate::symbolic::types::KindSet;

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum UnaryOperator {
    /// Arithmetic negation.
    Neg,
}

impl UnaryOperator {
    /// Returns the operand kinds this operator accepts.
    #[must_use]
    pub const fn operand_kinds(self) -> KindSet {
        match self {
            Self::Neg => KindSet::INT,
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Neg => write!(f, "-"),
        }
    }
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum BinaryOperator {
    // Arithmetic operations
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Integer division.
    Div,
    /// Modulo.
    Mod,

    // Comparison operations (result is bool)
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,

    // Array operations
    /// Array indexing: `left[right]`.
    ArrayGet,
}

impl BinaryOperator {
    /// Checks if this is an arithmetic operation (Add, Sub, Mul, Div, Mod).
    ///
    /// Arithmetic operations require integer operands and produce the operand type.
    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(self, Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod)
    }

    /// Checks if this is a comparison (Eq, Ne, Lt, Le, Gt, Ge).
    ///
    /// Comparisons always produce a boolean.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge
        )
    }

    /// Checks if this is an ordering comparison (Lt, Le, Gt, Ge).
    ///
    /// Ordering comparisons are only translatable for integer operands.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    /// Checks if this operation is commutative.
    ///
    /// # Returns
    ///
    /// `true` for Add, Mul, Eq and Ne.
    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(self, Self::Add | Self::Mul | Self::Eq | Self::Ne)
    }

    /// Returns the kinds accepted for the left operand.
    ///
    /// For every operator but [`ArrayGet`](Self::ArrayGet) the right operand must have
    /// exactly the left operand's type.
    #[must_use]
    pub const fn operand_kinds(self) -> KindSet {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod => KindSet::INT,
            Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => KindSet::all(),
            Self::ArrayGet => KindSet::ARRAY,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
            Self::Mod => write!(f, "%"),
            Self::Eq => write!(f, "=="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
            Self::ArrayGet => write!(f, "[]"),
        }
    }
}

/// The number of operands an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// Exactly this many operands.
    Exactly(usize),
    /// This many operands or more.
    AtLeast(usize),
}

impl Arity {
    /// Checks whether `count` operands satisfy this arity.
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(n) => write!(f, "exactly {n}"),
            Self::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// A logical operator over boolean operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum LogicalOperator {
    /// Variadic conjunction.
    And,
    /// Variadic disjunction.
    Or,
    /// Negation.
    Not,
    /// Implication: operand 0 implies operand 1.
    Implies,
}

impl LogicalOperator {
    /// Returns the number of operands this operator accepts.
    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::And | Self::Or => Arity::AtLeast(1),
            Self::Not => Arity::Exactly(1),
            Self::Implies => Arity::Exactly(2),
        }
    }

    /// Checks if this operator takes any number of operands.
    #[must_use]
    pub const fn is_variadic(self) -> bool {
        matches!(self.arity(), Arity::AtLeast(_))
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::Not => write!(f, "!"),
            Self::Implies => write!(f, "=>"),
        }
    }
}

/// A ternary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum TernaryOperator {
    /// Conditional value: `if condition then a else b`.
    IfElse,
}

impl fmt::Display for TernaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IfElse => write!(f, "?"),
        }
    }
}

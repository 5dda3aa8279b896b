//! Type lattice for symbolic expressions.
//!
//! This module defines [`ExpressionType`], the finite set of value kinds a symbolic
//! expression can have, and [`TypeKind`], its fieldless discriminant.
//!
//! # Type Categories
//!
//! - **Scalars**: [`ExpressionType::Int`] (64-bit signed, unbounded in the solver) and
//!   [`ExpressionType::Bool`]
//! - **Arrays**: [`ExpressionType::Array`], integer-indexed with an arbitrary element type,
//!   nested arrays included
//!
//! The element type of an array is part of the enum variant, so it is present exactly when
//! the kind is `Array`. Equality is structural and recurses into element types.

use std::fmt;

use bitflags::bitflags;
use strum::{EnumCount, EnumIter};

/// The kind of an [`ExpressionType`], without element information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum TypeKind {
    /// Integer values.
    Int,
    /// Boolean values.
    Bool,
    /// Integer-indexed arrays.
    Array,
}

impl TypeKind {
    /// Returns the single-element [`KindSet`] for this kind.
    #[must_use]
    pub const fn as_set(self) -> KindSet {
        match self {
            Self::Int => KindSet::INT,
            Self::Bool => KindSet::BOOL,
            Self::Array => KindSet::ARRAY,
        }
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Array => write!(f, "array"),
        }
    }
}

bitflags! {
    /// A set of [`TypeKind`]s.
    ///
    /// Operators describe the operand kinds they accept with a `KindSet`, which keeps the
    /// legality tables in [`ops`](super::ops) declarative.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        /// Integer operands.
        const INT = 0b001;
        /// Boolean operands.
        const BOOL = 0b010;
        /// Array operands.
        const ARRAY = 0b100;
    }
}

impl KindSet {
    /// Checks whether `kind` is a member of this set.
    #[must_use]
    pub const fn contains_kind(self, kind: TypeKind) -> bool {
        self.contains(kind.as_set())
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, _) in self.iter_names() {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{}", name.to_ascii_lowercase())?;
            first = false;
        }
        if first {
            write!(f, "none")?;
        }
        Ok(())
    }
}

/// The type of a symbolic expression.
///
/// Two types are equal when their kinds match and, for arrays, their element types are
/// recursively equal.
///
/// # Examples
///
/// ```rust
/// use symexpr::symbolic::{ExpressionType, TypeKind};
///
/// let matrix = ExpressionType::array(ExpressionType::array(ExpressionType::int()));
/// assert_eq!(matrix.kind(), TypeKind::Array);
/// assert_eq!(matrix.to_string(), "array[array[int]]");
/// assert_ne!(matrix, ExpressionType::array(ExpressionType::int()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    /// Integer type.
    Int,
    /// Boolean type.
    Bool,
    /// Integer-indexed array of the boxed element type.
    Array(Box<ExpressionType>),
}

impl ExpressionType {
    /// Creates the integer type.
    #[must_use]
    pub const fn int() -> Self {
        Self::Int
    }

    /// Creates the boolean type.
    #[must_use]
    pub const fn bool() -> Self {
        Self::Bool
    }

    /// Creates an array type with the given element type.
    ///
    /// # Arguments
    ///
    /// * `element` - The type of the array's elements.
    ///
    /// # Returns
    ///
    /// A new [`ExpressionType::Array`].
    #[must_use]
    pub fn array(element: Self) -> Self {
        Self::Array(Box::new(element))
    }

    /// Returns the kind of this type.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Int => TypeKind::Int,
            Self::Bool => TypeKind::Bool,
            Self::Array(_) => TypeKind::Array,
        }
    }

    /// Returns the element type if this is an array type.
    #[must_use]
    pub fn element(&self) -> Option<&Self> {
        match self {
            Self::Array(element) => Some(element),
            _ => None,
        }
    }

    /// Checks if this is the integer type.
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int)
    }

    /// Checks if this is the boolean type.
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    /// Checks if this is an array type.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns the array nesting depth (0 for scalars).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Int | Self::Bool => 0,
            Self::Array(element) => 1 + element.depth(),
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::Array(element) => write!(f, "array[{element}]"),
        }
    }
}

use thiserror::Error;

use crate::symbolic::{Arity, ExpressionType, LogicalOperator};

#[cfg_attr(not(feature = "solver"), allow(unused_macros))]
macro_rules! translation_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::TranslationError {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::TranslationError {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! type_mismatch {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        crate::Error::TypeMismatch(format!($fmt $(, $arg)*))
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Construction Errors
/// - [`Error::TypeMismatch`] - Operand types violate the operator's typing rules
/// - [`Error::InvalidArity`] - Wrong number of operands for a logical operator
///
/// ## Translation Errors
/// - [`Error::TranslationError`] - Operator/sort combination the translator cannot map
/// - [`Error::RecursionLimit`] - Expression nesting exceeded the configured limit
///
/// ## Symbol Errors
/// - [`Error::UnknownVariable`] - Lookup of a name that was never declared
/// - [`Error::VariableRedeclared`] - A name was bound to two different types
///
/// None of these errors is transient. Construction errors discard the node that was being
/// built; translation errors leave the current session in an unspecified state and the
/// caller decides whether to reset or discard it.
///
/// # Examples
///
/// ```rust
/// use symexpr::{Error, symbolic::{BinaryOperator, SymbolicExpression}};
///
/// let result = SymbolicExpression::binary(
///     BinaryOperator::Add,
///     SymbolicExpression::int(1),
///     SymbolicExpression::bool(true),
/// );
///
/// match result {
///     Err(Error::TypeMismatch(message)) => println!("rejected: {message}"),
///     Err(e) => println!("other error: {e}"),
///     Ok(expr) => println!("built {expr}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The operands of a node do not satisfy its operator's typing rules.
    ///
    /// Raised only by the validating constructors, never afterwards.
    #[error("Type mismatch - {0}")]
    TypeMismatch(String),

    /// A logical operator received the wrong number of operands.
    ///
    /// # Fields
    ///
    /// * `operator` - The logical operator being constructed
    /// * `expected` - The operand count the operator accepts
    /// * `found` - The operand count that was supplied
    #[error("Invalid arity - `{operator}` expects {expected} operand(s), found {found}")]
    InvalidArity {
        /// The operator being constructed
        operator: LogicalOperator,
        /// What the operator accepts
        expected: Arity,
        /// What was supplied
        found: usize,
    },

    /// The translator met an operator/sort combination it cannot map.
    ///
    /// This never happens for trees built through the validating constructors, except for
    /// the cases those constructors deliberately leave to the backend (ordering comparisons
    /// over non-integer operands, conditional branches of different array sorts, a variable
    /// name reused with another type). The error records where it was raised.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the unsupported combination
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Translation error - {file}:{line}: {message}")]
    TranslationError {
        /// What could not be translated
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Recursion limit reached.
    ///
    /// The translator walks trees recursively; to avoid overflowing the stack a maximum
    /// nesting depth is enforced. The associated value is the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A variable name was looked up but never declared.
    #[error("Unknown variable - {0}")]
    UnknownVariable(String),

    /// A variable name was declared twice with different types.
    ///
    /// Names are the sole identity of symbolic variables, so a session must never bind one
    /// name to two types.
    #[error("Variable `{name}` redeclared as {requested}, previously declared as {existing}")]
    VariableRedeclared {
        /// The offending name
        name: String,
        /// The type already bound to the name
        existing: ExpressionType,
        /// The conflicting type
        requested: ExpressionType,
    },
}

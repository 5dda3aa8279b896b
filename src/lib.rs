// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # symexpr
//!
//! A typed symbolic-expression engine with a translation layer to the Z3 SMT solver, built
//! as the analytical core of a symbolic-execution toolchain.
//!
//! ## Features
//!
//! - **Type-checked construction** - Ill-typed trees are rejected when they are built
//! - **Closed expression model** - Variables, constants, unary, binary, logical and
//!   conditional nodes
//! - **Integer-indexed arrays** - Arbitrarily nested element types
//! - **Visitor dispatch** - New processors without touching the node definitions
//! - **Z3 translation** - Session-scoped variable cache and sort-correct formulas
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symexpr::prelude::*;
//!
//! let mut symbols = SymbolTable::new();
//! symbols.declare("x", ExpressionType::int())?;
//!
//! let x = symbols.variable("x")?;
//! let cond = SymbolicExpression::and(vec![
//!     SymbolicExpression::binary(BinaryOperator::Gt, x.clone(), SymbolicExpression::int(0))?,
//!     SymbolicExpression::binary(BinaryOperator::Lt, x, SymbolicExpression::int(100))?,
//! ])?;
//! println!("{cond}");  // ((x > 0) && (x < 100))
//!
//! let mut translator = Z3Translator::new();
//! let formula = translator.translate_bool(&cond)?;
//!
//! let solver = z3::Solver::new();
//! solver.assert(&formula);
//! assert_eq!(solver.check(), z3::SatResult::Sat);
//! # Ok::<(), symexpr::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`symbolic`] - Type lattice, operators, expression nodes, visitor dispatch and the Z3
//!   translator
//! - [`frontend`] - Symbol tables and function summaries handed over by a program front end
//! - [`prelude`] - Re-exports for glob imports
//!
//! ## Cargo Features
//!
//! - `solver` (default) - Enables `symbolic::Z3Translator`. Requires a system `libz3`.
//!
//! Without `solver` the expression model and the front-end interface are still available.
//!
//! ## Logging
//!
//! The crate emits diagnostics through the [`log`](https://docs.rs/log) facade and never
//! installs a logger itself.
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`], with [`Error`] describing the failure.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use symexpr::prelude::*;
///
/// let p = SymbolicExpression::variable("p", ExpressionType::bool());
/// let q = SymbolicExpression::not(p)?;
/// assert_eq!(q.to_string(), "!p");
/// # Ok::<(), symexpr::Error>(())
/// ```
pub mod prelude;

/// Typed symbolic expressions and their translation to Z3.
///
/// # Key Types
///
/// - [`symbolic::ExpressionType`] - `int`, `bool` or `array[T]`
/// - [`symbolic::SymbolicExpression`] - A validated, immutable expression tree
/// - [`symbolic::ExpressionVisitor`] - Per-variant processing of trees
/// - `symbolic::Z3Translator` - Translation into Z3 formulas (feature `solver`)
pub mod symbolic;

/// Interface to the program front end.
///
/// See [`frontend::SymbolTable`] and [`frontend::ProgramSource`].
pub mod frontend;

/// `symexpr` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `symexpr` Error type
///
/// # Examples
///
/// ```rust
/// use symexpr::{Error, frontend::SymbolTable};
///
/// let symbols = SymbolTable::new();
/// match symbols.variable("x") {
///     Err(Error::UnknownVariable(name)) => println!("undeclared: {name}"),
///     Err(e) => println!("Error: {e}"),
///     Ok(var) => println!("found {var}"),
/// }
/// ```
pub use error::Error;

//! Interface to the program front end that supplies variables and path conditions.
//!
//! Building an SSA or control-flow representation from source text is outside this
//! crate. A front end hands over what the engine needs through the types here:
//!
//! - [`SymbolTable`] - the names and types of the variables of one session
//! - [`FunctionSummary`] - a function's symbols, path conditions and result expression
//! - [`ProgramSource`] - lookup of function summaries by name
//! - [`ProgramTable`] - an in-memory [`ProgramSource`]
//!
//! A name is bound to one type for the lifetime of a symbol table, so trees built through
//! [`SymbolTable::variable`] never disagree with each other about a variable's type.
//!
//! # Example
//!
//! ```rust
//! use symexpr::{
//!     frontend::{FunctionSummary, ProgramSource, ProgramTable},
//!     symbolic::{BinaryOperator, ExpressionType, SymbolicExpression},
//! };
//!
//! let mut summary = FunctionSummary::new("clamp");
//! summary.symbols_mut().declare("x", ExpressionType::int())?;
//!
//! let x = summary.symbols().variable("x")?;
//! let positive = SymbolicExpression::binary(BinaryOperator::Gt, x, SymbolicExpression::int(0))?;
//! summary.add_path_condition(positive)?;
//!
//! let mut program = ProgramTable::new();
//! program.insert(summary);
//!
//! assert!(program.function("clamp")?.is_some());
//! assert!(program.function("missing")?.is_none());
//! # Ok::<(), symexpr::Error>(())
//! ```

use std::collections::{btree_map, BTreeMap};

use crate::{
    symbolic::{ExpressionType, SymbolicExpression, VariableCollector},
    Error, Result,
};

/// Ordered mapping from variable name to [`ExpressionType`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    symbols: BTreeMap<String, ExpressionType>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `ty`.
    ///
    /// Declaring a name again with the same type is a no-op.
    ///
    /// # Arguments
    ///
    /// * `name` - The variable name.
    /// * `ty` - The variable's type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VariableRedeclared`] if `name` is already bound to another type.
    pub fn declare(&mut self, name: impl Into<String>, ty: ExpressionType) -> Result<()> {
        match self.symbols.entry(name.into()) {
            btree_map::Entry::Occupied(entry) => {
                if *entry.get() == ty {
                    Ok(())
                } else {
                    Err(Error::VariableRedeclared {
                        name: entry.key().clone(),
                        existing: entry.get().clone(),
                        requested: ty,
                    })
                }
            }
            btree_map::Entry::Vacant(entry) => {
                entry.insert(ty);
                Ok(())
            }
        }
    }

    /// Returns the type bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExpressionType> {
        self.symbols.get(name)
    }

    /// Checks whether `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Builds a variable expression for a declared name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariable`] if `name` was never declared.
    pub fn variable(&self, name: &str) -> Result<SymbolicExpression> {
        self.symbols
            .get(name)
            .map(|ty| SymbolicExpression::variable(name, ty.clone()))
            .ok_or_else(|| Error::UnknownVariable(name.to_string()))
    }

    /// Checks that every variable of `expr` is declared here with the same type.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownVariable`] for an undeclared name
    /// - [`Error::VariableRedeclared`] for a name used with a type other than its declaration
    pub fn check(&self, expr: &SymbolicExpression) -> Result<()> {
        let mut collector = VariableCollector::new();
        collector.collect(expr)?;

        for (name, ty) in collector.variables() {
            match self.symbols.get(name) {
                None => return Err(Error::UnknownVariable(name.clone())),
                Some(existing) if existing != ty => {
                    return Err(Error::VariableRedeclared {
                        name: name.clone(),
                        existing: existing.clone(),
                        requested: ty.clone(),
                    })
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Returns the number of declared variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if no variable is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over the declarations in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExpressionType)> {
        self.symbols.iter().map(|(name, ty)| (name.as_str(), ty))
    }
}

/// What the front end knows about one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSummary {
    name: String,
    symbols: SymbolTable,
    path_conditions: Vec<SymbolicExpression>,
    result: Option<SymbolicExpression>,
}

impl FunctionSummary {
    /// Creates an empty summary for the function `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbols: SymbolTable::new(),
            path_conditions: Vec::new(),
            result: None,
        }
    }

    /// Returns the function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameters and locals of the function.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns the symbol table for declaring parameters and locals.
    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Appends a condition that holds on the summarized path.
    ///
    /// # Arguments
    ///
    /// * `condition` - A boolean expression over declared variables.
    ///
    /// # Errors
    ///
    /// - [`Error::TypeMismatch`] if `condition` is not boolean
    /// - [`Error::UnknownVariable`] or [`Error::VariableRedeclared`] if it uses a variable
    ///   that disagrees with the symbol table
    pub fn add_path_condition(&mut self, condition: SymbolicExpression) -> Result<()> {
        if !condition.ty().is_bool() {
            return Err(type_mismatch!(
                "path condition `{}` must be bool, found {}",
                condition,
                condition.ty()
            ));
        }
        self.symbols.check(&condition)?;
        self.path_conditions.push(condition);
        Ok(())
    }

    /// Returns the path conditions in insertion order.
    #[must_use]
    pub fn path_conditions(&self) -> &[SymbolicExpression] {
        &self.path_conditions
    }

    /// Returns the conjunction of all path conditions.
    ///
    /// # Returns
    ///
    /// `true` for no condition, the condition itself for one, and `(c1 && c2 && ...)`
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Propagates construction errors of the conjunction, which cannot occur for conditions
    /// accepted by [`add_path_condition`](Self::add_path_condition).
    pub fn path_condition(&self) -> Result<SymbolicExpression> {
        match self.path_conditions.as_slice() {
            [] => Ok(SymbolicExpression::bool(true)),
            [single] => Ok(single.clone()),
            conditions => SymbolicExpression::and(conditions.to_vec()),
        }
    }

    /// Sets the expression the function returns on the summarized path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVariable`] or [`Error::VariableRedeclared`] if `result` uses a
    /// variable that disagrees with the symbol table.
    pub fn set_result(&mut self, result: SymbolicExpression) -> Result<()> {
        self.symbols.check(&result)?;
        self.result = Some(result);
        Ok(())
    }

    /// Returns the result expression, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&SymbolicExpression> {
        self.result.as_ref()
    }
}

/// A provider of function summaries, implemented by program front ends.
pub trait ProgramSource {
    /// Looks up the summary of the function `name`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` if the program has no such function.
    ///
    /// # Errors
    ///
    /// Front-end specific failures while building the summary.
    fn function(&self, name: &str) -> Result<Option<FunctionSummary>>;
}

/// An in-memory [`ProgramSource`].
#[derive(Debug, Clone, Default)]
pub struct ProgramTable {
    functions: BTreeMap<String, FunctionSummary>,
}

impl ProgramTable {
    /// Creates an empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function summary, returning the one it replaces.
    pub fn insert(&mut self, summary: FunctionSummary) -> Option<FunctionSummary> {
        self.functions.insert(summary.name().to_string(), summary)
    }

    /// Returns the number of functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns `true` if the program has no function.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Iterates over the function names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl ProgramSource for ProgramTable {
    fn function(&self, name: &str) -> Result<Option<FunctionSummary>> {
        Ok(self.functions.get(name).cloned())
    }
}

impl FromIterator<FunctionSummary> for ProgramTable {
    fn from_iter<I: IntoIterator<Item = FunctionSummary>>(iter: I) -> Self {
        let mut table = Self::new();
        for summary in iter {
            table.insert(summary);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::BinaryOperator;

    #[test]
    fn test_declare_is_idempotent() -> Result<()> {
        let mut symbols = SymbolTable::new();
        symbols.declare("x", ExpressionType::int())?;
        symbols.declare("x", ExpressionType::int())?;
        assert_eq!(symbols.len(), 1);

        let err = symbols
            .declare("x", ExpressionType::array(ExpressionType::int()))
            .unwrap_err();
        assert!(matches!(err, Error::VariableRedeclared { ref name, .. } if name == "x"));
        assert_eq!(symbols.get("x"), Some(&ExpressionType::int()));
        Ok(())
    }

    #[test]
    fn test_variable_lookup() -> Result<()> {
        let mut symbols = SymbolTable::new();
        symbols.declare("flag", ExpressionType::bool())?;
        symbols.declare("a", ExpressionType::int())?;

        let flag = symbols.variable("flag")?;
        assert_eq!(flag.ty(), &ExpressionType::bool());
        assert_eq!(
            symbols.variable("nope"),
            Err(Error::UnknownVariable("nope".to_string()))
        );

        let names: Vec<&str> = symbols.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "flag"]);
        Ok(())
    }

    #[test]
    fn test_check_against_declarations() -> Result<()> {
        let mut symbols = SymbolTable::new();
        symbols.declare("x", ExpressionType::int())?;

        let ok = SymbolicExpression::binary(
            BinaryOperator::Lt,
            symbols.variable("x")?,
            SymbolicExpression::int(5),
        )?;
        symbols.check(&ok)?;

        let undeclared = SymbolicExpression::variable("y", ExpressionType::int());
        assert_eq!(
            symbols.check(&undeclared),
            Err(Error::UnknownVariable("y".to_string()))
        );

        let retyped = SymbolicExpression::variable("x", ExpressionType::bool());
        assert!(matches!(
            symbols.check(&retyped),
            Err(Error::VariableRedeclared { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_path_conditions() -> Result<()> {
        let mut summary = FunctionSummary::new("f");
        assert_eq!(summary.path_condition()?, SymbolicExpression::bool(true));

        summary.symbols_mut().declare("x", ExpressionType::int())?;
        let x = summary.symbols().variable("x")?;

        assert!(matches!(
            summary.add_path_condition(x.clone()),
            Err(Error::TypeMismatch(_))
        ));

        let lower =
            SymbolicExpression::binary(BinaryOperator::Gt, x.clone(), SymbolicExpression::int(0))?;
        let upper =
            SymbolicExpression::binary(BinaryOperator::Lt, x.clone(), SymbolicExpression::int(9))?;
        summary.add_path_condition(lower.clone())?;
        assert_eq!(summary.path_condition()?, lower);

        summary.add_path_condition(upper)?;
        assert_eq!(summary.path_conditions().len(), 2);
        assert_eq!(
            summary.path_condition()?.to_string(),
            "((x > 0) && (x < 9))"
        );

        summary.set_result(x)?;
        assert!(summary.result().is_some());
        Ok(())
    }

    #[test]
    fn test_program_table_lookup() -> Result<()> {
        let program: ProgramTable = ["main", "helper"]
            .into_iter()
            .map(FunctionSummary::new)
            .collect();

        assert_eq!(program.len(), 2);
        assert_eq!(program.names().collect::<Vec<_>>(), ["helper", "main"]);
        assert_eq!(
            program.function("main")?.map(|f| f.name().to_string()),
            Some("main".to_string())
        );
        assert!(program.function("absent")?.is_none());
        Ok(())
    }
}

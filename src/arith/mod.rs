//! Arithmetic language the math compiler hands its rewritten text to.
//!
//! The rewritten text only contains numbers, operators, built-in math functions and
//! the placeholder variables (`x1`, `x2`, ...) standing in for resolved calls.

/// Evaluation, constant folding and built-in functions.
pub mod eval;
/// Tokenizer for arithmetic source text.
pub mod lexer;
/// Parser and arithmetic AST definitions.
pub mod parser;

use crate::context::CompileOptions;
use crate::error::ExprError;

pub use eval::is_builtin_name;

/// Characters that end a name when scanning backward from a `.` or `(`.
pub const SEPARATORS: &str = " ,+-*/%^=<>!&|()";

#[derive(Debug, Clone, PartialEq)]
/// A parsed arithmetic expression over a fixed list of placeholder variables.
pub struct Program {
    source: String,
    params: Vec<String>,
    root: parser::Expr,
}

impl Program {
    /// Parses `source`, resolving identifiers against `params` then built-in constants.
    pub fn parse(source: &str, params: &[String]) -> Result<Self, ExprError> {
        Self::parse_bounded(source, params, CompileOptions::default().max_depth)
    }

    /// Like [`Program::parse`], failing with [`ExprError::NestingTooDeep`] once
    /// parentheses, call arguments or unary prefixes nest deeper than `max_depth`.
    pub fn parse_bounded(
        source: &str,
        params: &[String],
        max_depth: usize,
    ) -> Result<Self, ExprError> {
        let tokens = lexer::tokenize(source)?;
        let root = parser::parse(&tokens, params, max_depth)?;
        Ok(Self {
            source: source.to_string(),
            params: params.to_vec(),
            root,
        })
    }

    /// The constant `0` program used when preparation fails.
    pub fn zero() -> Self {
        Self {
            source: "0".to_string(),
            params: Vec::new(),
            root: parser::Expr::Number(0.0),
        }
    }

    /// Folds constant subtrees.
    pub fn optimize(&mut self) {
        let root = std::mem::replace(&mut self.root, parser::Expr::Number(0.0));
        self.root = eval::fold(root);
    }

    /// Evaluates the program with `values[i]` bound to the `i`-th parameter.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        eval::evaluate(&self.root, values)
    }

    /// Source text the program was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Declared parameter names, in placeholder order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The folded value, when the program no longer depends on any parameter.
    pub fn as_constant(&self) -> Option<f64> {
        match self.root {
            parser::Expr::Number(n) => Some(n),
            _ => None,
        }
    }
}

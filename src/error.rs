//! Error definitions for expression preparation.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
/// Preparation-time failure of a math or text expression.
///
/// Positions are byte offsets into the expression that produced the error. Errors
/// coming out of a nested parameter are shifted into the enclosing expression's
/// coordinates with [`ExprError::shifted`].
pub enum ExprError {
    /// A parameter list reached the end of the expression before its closing `)`.
    #[error("unterminated parentheses at {position}")]
    UnterminatedParentheses { position: usize },
    /// A text literal has no closing `"`.
    #[error("unterminated quotes at {position}")]
    UnterminatedQuotes { position: usize },
    /// More parameters than declared were passed to a function.
    #[error("too many parameters in function call at {position}")]
    TooManyParameters { position: usize },
    /// Parameter count outside the declared range.
    #[error(
        "wrong parameter count at {position}: expected {expected_min} to {expected_max}, got {found}"
    )]
    WrongParameterCount {
        position: usize,
        expected_min: usize,
        expected_max: usize,
        found: usize,
    },
    /// A resolved function is not followed by its parameter parentheses.
    #[error("missing parameter parentheses at {position}")]
    MissingParameterParentheses { position: usize },
    /// No text function, member function or numeric fallback matched the call.
    #[error("unrecognized function '{name}' at {position}")]
    UnrecognizedFunction { name: String, position: usize },
    /// Two text terms are not joined by `+`.
    #[error("missing '+' between strings at {position}")]
    MissingConcatenationOperator { position: usize },
    /// Two `+` follow each other with no term in between.
    #[error("missing term between two '+' at {position}")]
    MissingTermBetweenOperators { position: usize },
    /// A text expression with no literal and no function.
    #[error("empty or invalid expression at {position}: expected a quoted text or a function")]
    EmptyOrInvalidExpression { position: usize },
    /// The rewritten arithmetic was rejected by the arithmetic compiler.
    #[error("arithmetic syntax error: {0}")]
    ArithmeticSyntax(String),
    /// Parameter, parenthesis or unary nesting exceeded [`crate::CompileOptions::max_depth`].
    #[error("nesting too deep: more than {limit} nested levels")]
    NestingTooDeep { limit: usize },
    /// Compile options could not be read.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl ExprError {
    /// Byte offset of the failure, when the failure has one.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::UnterminatedParentheses { position }
            | Self::UnterminatedQuotes { position }
            | Self::TooManyParameters { position }
            | Self::WrongParameterCount { position, .. }
            | Self::MissingParameterParentheses { position }
            | Self::UnrecognizedFunction { position, .. }
            | Self::MissingConcatenationOperator { position }
            | Self::MissingTermBetweenOperators { position }
            | Self::EmptyOrInvalidExpression { position } => Some(*position),
            Self::ArithmeticSyntax(_) | Self::NestingTooDeep { .. } | Self::InvalidOptions(_) => {
                None
            }
        }
    }

    /// Moves the error position by `base`; errors without a position are unchanged.
    pub fn shifted(self, base: usize) -> Self {
        match self {
            Self::UnterminatedParentheses { position } => Self::UnterminatedParentheses {
                position: base + position,
            },
            Self::UnterminatedQuotes { position } => Self::UnterminatedQuotes {
                position: base + position,
            },
            Self::TooManyParameters { position } => Self::TooManyParameters {
                position: base + position,
            },
            Self::WrongParameterCount {
                position,
                expected_min,
                expected_max,
                found,
            } => Self::WrongParameterCount {
                position: base + position,
                expected_min,
                expected_max,
                found,
            },
            Self::MissingParameterParentheses { position } => Self::MissingParameterParentheses {
                position: base + position,
            },
            Self::UnrecognizedFunction { name, position } => Self::UnrecognizedFunction {
                name,
                position: base + position,
            },
            Self::MissingConcatenationOperator { position } => {
                Self::MissingConcatenationOperator {
                    position: base + position,
                }
            }
            Self::MissingTermBetweenOperators { position } => Self::MissingTermBetweenOperators {
                position: base + position,
            },
            Self::EmptyOrInvalidExpression { position } => Self::EmptyOrInvalidExpression {
                position: base + position,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(ExprError::UnterminatedQuotes { position: 3 }
            .to_string()
            .contains("unterminated quotes at 3"));
        assert!(ExprError::ArithmeticSyntax("boom".to_string())
            .to_string()
            .contains("arithmetic syntax error: boom"));
    }

    #[test]
    fn shifting_moves_positions_only_when_present() {
        let nested = ExprError::UnrecognizedFunction {
            name: "Nope".to_string(),
            position: 6,
        };
        assert_eq!(nested.shifted(13).position(), Some(19));

        let arithmetic = ExprError::ArithmeticSyntax("x".to_string());
        assert_eq!(arithmetic.clone().shifted(13), arithmetic);
        assert_eq!(arithmetic.position(), None);
    }
}

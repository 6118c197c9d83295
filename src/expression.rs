//! Expression values with lazily prepared math and text forms.

use tracing::debug;

use crate::context::{Identifier, IdentifierTable, ResolutionContext};
use crate::error::ExprError;
use crate::instruction::{CompiledMath, CompiledText};
use crate::{math, text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Comparison operator an expression spells out exactly.
pub enum ComparisonOperator {
    Equal,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    NotEqual,
}

impl ComparisonOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Equal),
            "<" => Some(Self::Less),
            ">" => Some(Self::Greater),
            "<=" => Some(Self::LessOrEqual),
            ">=" => Some(Self::GreaterOrEqual),
            "!=" => Some(Self::NotEqual),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Modification operator an expression spells out exactly.
pub enum ModificationOperator {
    Set,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ModificationOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Set),
            "+" => Some(Self::Add),
            "-" => Some(Self::Subtract),
            "*" => Some(Self::Multiply),
            "/" => Some(Self::Divide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Prepared<T> {
    form: T,
    succeeded: bool,
}

#[derive(Debug, Clone, PartialEq)]
/// Raw expression text plus its compiled forms.
///
/// The math and text forms are prepared independently and cached for the lifetime of
/// the value. A failed math preparation still leaves a form that evaluates to `0`; a
/// failed text preparation leaves an empty instruction list.
pub struct Expression {
    raw: String,
    comparison: Option<ComparisonOperator>,
    modification: Option<ModificationOperator>,
    identifier: Option<Identifier>,
    math: Option<Prepared<CompiledMath>>,
    text: Option<Prepared<CompiledText>>,
    first_error: Option<ExprError>,
}

impl Expression {
    pub fn new(raw: impl Into<String>, identifiers: &dyn IdentifierTable) -> Self {
        let raw = raw.into();
        Self {
            comparison: ComparisonOperator::from_symbol(&raw),
            modification: ModificationOperator::from_symbol(&raw),
            identifier: identifiers.id_of(&raw),
            raw,
            math: None,
            text: None,
            first_error: None,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn comparison_operator(&self) -> Option<ComparisonOperator> {
        self.comparison
    }

    pub fn modification_operator(&self) -> Option<ModificationOperator> {
        self.modification
    }

    /// Identifier of the raw text, if the identifier table knew it at construction.
    pub fn identifier(&self) -> Option<Identifier> {
        self.identifier
    }

    /// Compiles the math form. Returns whether compilation succeeded.
    #[tracing::instrument(level = "debug", skip(self, ctx), fields(raw = %self.raw))]
    pub fn prepare_math(&mut self, ctx: &ResolutionContext<'_>) -> bool {
        self.prepare_math_at(ctx, 0).is_ok()
    }

    /// Compiles the text form. Returns whether compilation succeeded.
    #[tracing::instrument(level = "debug", skip(self, ctx), fields(raw = %self.raw))]
    pub fn prepare_text(&mut self, ctx: &ResolutionContext<'_>) -> bool {
        self.prepare_text_at(ctx, 0).is_ok()
    }

    /// Compiles both forms; both always run.
    pub fn prepare_both(&mut self, ctx: &ResolutionContext<'_>) -> bool {
        let math_ok = self.prepare_math(ctx);
        let text_ok = self.prepare_text(ctx);
        math_ok && text_ok
    }

    /// The math form, compiling it on first use.
    pub fn math_form(&mut self, ctx: &ResolutionContext<'_>) -> &CompiledMath {
        if self.math.is_none() {
            self.prepare_math(ctx);
        }
        &self
            .math
            .get_or_insert_with(|| Prepared {
                form: CompiledMath::zero(),
                succeeded: false,
            })
            .form
    }

    /// The text form, compiling it on first use.
    pub fn text_form(&mut self, ctx: &ResolutionContext<'_>) -> &CompiledText {
        if self.text.is_none() {
            self.prepare_text(ctx);
        }
        &self
            .text
            .get_or_insert_with(|| Prepared {
                form: CompiledText::default(),
                succeeded: false,
            })
            .form
    }

    /// The math form, if it was prepared.
    pub fn compiled_math(&self) -> Option<&CompiledMath> {
        self.math.as_ref().map(|prepared| &prepared.form)
    }

    /// The text form, if it was prepared.
    pub fn compiled_text(&self) -> Option<&CompiledText> {
        self.text.as_ref().map(|prepared| &prepared.form)
    }

    /// `None` until the math form is prepared, then whether it succeeded.
    pub fn math_succeeded(&self) -> Option<bool> {
        self.math.as_ref().map(|prepared| prepared.succeeded)
    }

    /// `None` until the text form is prepared, then whether it succeeded.
    pub fn text_succeeded(&self) -> Option<bool> {
        self.text.as_ref().map(|prepared| prepared.succeeded)
    }

    /// First error of the latest failed preparation, when diagnostics are enabled.
    pub fn first_error(&self) -> Option<&ExprError> {
        self.first_error.as_ref()
    }

    pub fn first_error_message(&self) -> Option<String> {
        self.first_error.as_ref().map(ToString::to_string)
    }

    pub fn first_error_position(&self) -> Option<usize> {
        self.first_error.as_ref().and_then(ExprError::position)
    }

    pub(crate) fn prepare_math_at(
        &mut self,
        ctx: &ResolutionContext<'_>,
        depth: usize,
    ) -> Result<(), ExprError> {
        match math::compile_at(&self.raw, ctx, depth) {
            Ok(form) => {
                debug!(
                    instructions = form.instructions().len(),
                    rewritten = form.rewritten(),
                    "math expression prepared"
                );
                self.math = Some(Prepared {
                    form,
                    succeeded: true,
                });
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "math expression rejected");
                self.math = Some(Prepared {
                    form: CompiledMath::zero(),
                    succeeded: false,
                });
                self.record(ctx, &err);
                Err(err)
            }
        }
    }

    pub(crate) fn prepare_text_at(
        &mut self,
        ctx: &ResolutionContext<'_>,
        depth: usize,
    ) -> Result<(), ExprError> {
        match text::compile_at(&self.raw, ctx, depth) {
            Ok(form) => {
                debug!(
                    instructions = form.instructions().len(),
                    "text expression prepared"
                );
                self.text = Some(Prepared {
                    form,
                    succeeded: true,
                });
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "text expression rejected");
                self.text = Some(Prepared {
                    form: CompiledText::default(),
                    succeeded: false,
                });
                self.record(ctx, &err);
                Err(err)
            }
        }
    }

    fn record(&mut self, ctx: &ResolutionContext<'_>, err: &ExprError) {
        if ctx.options.diagnostics {
            self.first_error = Some(err.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MapIdentifiers;

    #[test]
    fn classifies_single_operator_texts() {
        let identifiers = MapIdentifiers::new();
        let equal = Expression::new("=", &identifiers);
        assert_eq!(equal.comparison_operator(), Some(ComparisonOperator::Equal));
        assert_eq!(equal.modification_operator(), Some(ModificationOperator::Set));

        let plus = Expression::new("+", &identifiers);
        assert_eq!(plus.comparison_operator(), None);
        assert_eq!(plus.modification_operator(), Some(ModificationOperator::Add));

        let le = Expression::new("<=", &identifiers);
        assert_eq!(le.comparison_operator(), Some(ComparisonOperator::LessOrEqual));

        let other = Expression::new("= ", &identifiers);
        assert_eq!(other.comparison_operator(), None);
        assert_eq!(other.modification_operator(), None);
    }

    #[test]
    fn caches_identifier_of_known_names() {
        let mut identifiers = MapIdentifiers::new();
        let player = identifiers.intern("Player");
        assert_eq!(Expression::new("Player", &identifiers).identifier(), Some(player));
        assert_eq!(Expression::new("Nobody", &identifiers).identifier(), None);
    }

    #[test]
    fn new_expression_is_unprepared() {
        let identifiers = MapIdentifiers::new();
        let expr = Expression::new("1+1", &identifiers);
        assert_eq!(expr.raw(), "1+1");
        assert!(expr.compiled_math().is_none());
        assert!(expr.compiled_text().is_none());
        assert_eq!(expr.math_succeeded(), None);
        assert!(expr.first_error().is_none());
    }
}

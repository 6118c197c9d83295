//! Binding raw call parameters to their declared kinds.

use crate::context::{Binding, ParameterDeclaration, ResolutionContext};
use crate::error::ExprError;
use crate::expression::Expression;

/// Prepares `parameter` as its declaration requires.
///
/// Errors from the nested preparation are shifted by `base`, the parameter's offset in
/// the enclosing expression.
pub fn bind_parameter(
    parameter: &mut Expression,
    declaration: &ParameterDeclaration,
    ctx: &ResolutionContext<'_>,
    depth: usize,
    base: usize,
) -> Result<(), ExprError> {
    let result = match declaration.kind.binding() {
        Binding::Math => parameter.prepare_math_at(ctx, depth + 1),
        Binding::Text => parameter.prepare_text_at(ctx, depth + 1),
        Binding::Verbatim => Ok(()),
    };
    result.map_err(|err| err.shifted(base))
}

/// Pushes `raw` as the next parameter and binds it against its declaration.
///
/// A parameter past the declared list is rejected only when diagnostics are enabled;
/// otherwise it stays unbound and the caller's count check decides.
pub fn append_parameter(
    parameters: &mut Vec<Expression>,
    raw: &str,
    base: usize,
    declarations: &[ParameterDeclaration],
    ctx: &ResolutionContext<'_>,
    depth: usize,
) -> Result<(), ExprError> {
    let index = parameters.len();
    parameters.push(Expression::new(raw, ctx.identifiers));

    let Some(declaration) = declarations.get(index) else {
        if ctx.options.diagnostics {
            return Err(ExprError::TooManyParameters { position: base });
        }
        return Ok(());
    };

    match parameters.last_mut() {
        Some(parameter) => bind_parameter(parameter, declaration, ctx, depth, base),
        None => Ok(()),
    }
}

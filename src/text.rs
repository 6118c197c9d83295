//! Compiler for text expressions: quoted literals and calls joined by `+`.

use crate::arith::SEPARATORS;
use crate::binder::bind_parameter;
use crate::context::{required_count, ResolutionContext, ValueKind};
use crate::error::ExprError;
use crate::expression::Expression;
use crate::instruction::{CompiledText, TextInstruction};
use crate::resolve::{resolve_call, CallSite};
use crate::scanner::{earliest, precedes, unescape_quotes, Scanner};

/// Compiles `source` as a text expression.
pub fn compile(source: &str, ctx: &ResolutionContext<'_>) -> Result<CompiledText, ExprError> {
    compile_at(source, ctx, 0)
}

pub(crate) fn compile_at(
    source: &str,
    ctx: &ResolutionContext<'_>,
    depth: usize,
) -> Result<CompiledText, ExprError> {
    ctx.check_depth(depth)?;

    let scanner = Scanner::new(source);
    let mut next_dot = scanner.find(b'.', 0);
    let mut next_paren = scanner.find(b'(', 0);
    let mut next_quote = scanner.find(b'"', 0);

    if earliest(&[next_dot, next_paren, next_quote]).is_none() {
        return Err(ExprError::EmptyOrInvalidExpression { position: 0 });
    }

    let mut instructions = Vec::new();
    let mut parse_position = 0;

    while next_dot.is_some() || next_paren.is_some() || next_quote.is_some() {
        let literal = next_quote
            .filter(|_| precedes(next_quote, next_dot) && precedes(next_quote, next_paren));

        parse_position = match literal {
            Some(open) => {
                let close = scanner
                    .closing_quote(open + 1)
                    .ok_or(ExprError::UnterminatedQuotes { position: open })?;
                instructions.push(TextInstruction::Constant(unescape_quotes(
                    scanner.slice(open + 1, close),
                )));
                close + 1
            }
            None => {
                let site =
                    CallSite::locate(&scanner, SEPARATORS, parse_position, next_dot, next_paren)
                        .ok_or(ExprError::EmptyOrInvalidExpression {
                            position: parse_position,
                        })?;
                let (instruction, close) = compile_call(&scanner, &site, ctx, depth)?;
                instructions.push(instruction);
                close + 1
            }
        };

        let next_plus = scanner.find(b'+', parse_position);
        next_dot = scanner.find(b'.', parse_position);
        next_paren = scanner.find(b'(', parse_position);
        next_quote = scanner.find(b'"', parse_position);

        if let Some(next_token) = earliest(&[next_dot, next_paren, next_quote]) {
            match next_plus {
                Some(plus) if plus < next_token => {
                    if precedes(scanner.find(b'+', plus + 1), Some(next_token)) {
                        return Err(ExprError::MissingTermBetweenOperators { position: plus });
                    }
                }
                _ => {
                    return Err(ExprError::MissingConcatenationOperator {
                        position: next_token,
                    })
                }
            }
        }
    }

    Ok(CompiledText::new(instructions))
}

/// Compiles the call at `site`; returns the instruction and the position of the
/// closing parenthesis.
fn compile_call(
    scanner: &Scanner<'_>,
    site: &CallSite<'_>,
    ctx: &ResolutionContext<'_>,
    depth: usize,
) -> Result<(TextInstruction, usize), ExprError> {
    let function_name_end = site.function_name_end.unwrap_or(site.name_end);
    let open = site
        .function_name_end
        .and_then(|end| scanner.open_paren_from(end))
        .ok_or(ExprError::MissingParameterParentheses {
            position: function_name_end,
        })?;
    let list = scanner.parameter_list(open + 1);
    let close = list.close.ok_or(ExprError::UnterminatedParentheses {
        position: list.end.saturating_sub(1),
    })?;

    let Some(resolved) = resolve_call(ctx, ValueKind::Text, site, site.function_name) else {
        // No text function: the call may still be a number, converted implicitly.
        let mut implicit = Expression::new(
            scanner.slice(site.name_start, close + 1),
            ctx.identifiers,
        );
        if implicit.prepare_math_at(ctx, depth + 1).is_ok() {
            return Ok((TextInstruction::NumberToText(Box::new(implicit)), close));
        }
        return Err(ExprError::UnrecognizedFunction {
            name: site.function_name.to_string(),
            position: site.name_start,
        });
    };

    let count = resolved.receivers.len() + list.pieces.len();
    let mut parameters = Vec::with_capacity(count);
    let mut offsets = Vec::with_capacity(count);
    for receiver in &resolved.receivers {
        parameters.push(Expression::new(receiver.as_str(), ctx.identifiers));
        offsets.push(site.name_start);
    }
    // Every piece counts, an empty last one included.
    for piece in &list.pieces {
        parameters.push(Expression::new(piece.text, ctx.identifiers));
        offsets.push(piece.start);
    }

    let declarations = resolved.declarations;
    let expected_min = required_count(declarations);
    let expected_max = declarations.len();
    if parameters.len() < expected_max || parameters.len() < expected_min {
        return Err(ExprError::WrongParameterCount {
            position: function_name_end,
            expected_min,
            expected_max,
            found: parameters.len(),
        });
    }

    for ((parameter, declaration), offset) in parameters
        .iter_mut()
        .zip(declarations)
        .zip(offsets.iter().copied())
    {
        bind_parameter(parameter, declaration, ctx, depth, offset)?;
    }

    Ok((
        TextInstruction::Call {
            callable: resolved.callable,
            parameters,
        },
        close,
    ))
}

//! Compiler for numeric expressions.
//!
//! Every resolved call is replaced by a placeholder variable (`x1`, `x2`, ...) and the
//! remaining text, now pure arithmetic, is handed to [`crate::arith`]. Names that do
//! not resolve are copied through untouched, so the arithmetic compiler has the last
//! word on whether they are valid.

use crate::arith::{is_builtin_name, Program, SEPARATORS};
use crate::binder::append_parameter;
use crate::context::{required_count, ResolutionContext, ValueKind};
use crate::error::ExprError;
use crate::expression::Expression;
use crate::instruction::{placeholder, CompiledMath, MathInstruction};
use crate::resolve::{resolve_call, CallSite, Resolved};
use crate::scanner::{has_inner_separator, Scanner};

/// Compiles `source` as a numeric expression.
pub fn compile(source: &str, ctx: &ResolutionContext<'_>) -> Result<CompiledMath, ExprError> {
    compile_at(source, ctx, 0)
}

pub(crate) fn compile_at(
    source: &str,
    ctx: &ResolutionContext<'_>,
    depth: usize,
) -> Result<CompiledMath, ExprError> {
    ctx.check_depth(depth)?;

    let scanner = Scanner::new(source);
    let mut rewritten = String::with_capacity(source.len());
    let mut instructions: Vec<MathInstruction> = Vec::new();
    let mut parse_position = 0;
    let mut next_dot = scanner.find(b'.', 0);
    let mut next_paren = scanner.find(b'(', 0);

    while let Some(site) =
        CallSite::locate(&scanner, SEPARATORS, parse_position, next_dot, next_paren)
    {
        // A method-form name running to the end of the text names nothing.
        let (function_name, function_name_end) = match site.function_name_end {
            Some(end) => (site.function_name, end),
            None => ("", scanner.len() - 1),
        };

        let resume = if has_inner_separator(function_name, SEPARATORS) {
            rewritten.push_str(scanner.slice(parse_position, site.name_end + 1));
            site.name_end + 1
        } else {
            let resolved = if is_builtin_name(function_name) {
                None
            } else {
                resolve_call(ctx, ValueKind::Number, &site, function_name)
            };

            match resolved {
                Some(resolved) => {
                    let (instruction, close) =
                        bind_call(&scanner, function_name_end, resolved, ctx, depth)?;
                    instructions.push(instruction);
                    rewritten.push_str(scanner.slice(parse_position, site.name_start));
                    rewritten.push_str(&placeholder(instructions.len()));
                    close + 1
                }
                None => {
                    rewritten.push_str(scanner.slice(parse_position, function_name_end + 1));
                    function_name_end + 1
                }
            }
        };

        parse_position = resume;
        next_dot = scanner.find(b'.', resume);
        next_paren = scanner.find(b'(', resume);
    }

    rewritten.push_str(scanner.slice(parse_position, scanner.len()));

    let params: Vec<String> = (1..=instructions.len()).map(placeholder).collect();
    let mut program = Program::parse_bounded(&rewritten, &params, ctx.options.max_depth)?;
    program.optimize();

    Ok(CompiledMath::new(instructions, program))
}

/// Binds the parameter list following `function_name_end`; returns the instruction and
/// the position of the closing parenthesis.
fn bind_call(
    scanner: &Scanner<'_>,
    function_name_end: usize,
    resolved: Resolved<'_>,
    ctx: &ResolutionContext<'_>,
    depth: usize,
) -> Result<(MathInstruction, usize), ExprError> {
    let open = scanner.open_paren_from(function_name_end).ok_or(
        ExprError::MissingParameterParentheses {
            position: function_name_end,
        },
    )?;
    let list = scanner.parameter_list(open + 1);
    let declarations = resolved.declarations;

    let mut parameters: Vec<Expression> = resolved
        .receivers
        .iter()
        .map(|receiver| Expression::new(receiver.as_str(), ctx.identifiers))
        .collect();

    if let Some((last, leading)) = list.pieces.split_last() {
        for piece in leading {
            append_parameter(
                &mut parameters,
                piece.text,
                piece.start,
                declarations,
                ctx,
                depth,
            )?;
        }
        // A blank last parameter is no parameter: `Func()` or `Func(1, )`.
        if last.text.bytes().any(|b| b != b' ') {
            append_parameter(
                &mut parameters,
                last.text,
                last.start,
                declarations,
                ctx,
                depth,
            )?;
        }
    }

    let close = list.close.ok_or(ExprError::UnterminatedParentheses {
        position: list.end.saturating_sub(1),
    })?;

    let expected_min = required_count(declarations);
    let expected_max = declarations.len();
    if parameters.len() > expected_max || parameters.len() < expected_min {
        return Err(ExprError::WrongParameterCount {
            position: function_name_end,
            expected_min,
            expected_max,
            found: parameters.len(),
        });
    }

    Ok((
        MathInstruction {
            callable: resolved.callable,
            parameters,
        },
        close,
    ))
}

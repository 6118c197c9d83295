mod common;

use pretty_assertions::assert_eq;

use common::{raws, Fixture, PHYSICS, SPRITE};
use scene_expr::{compile_text, Callable, ExprError, Expression, TextInstruction};

fn constant(text: &str) -> TextInstruction {
    TextInstruction::Constant(text.to_string())
}

#[test]
fn literals_concatenate() {
    let fixture = Fixture::new();
    let compiled = compile_text(r#""abc" + "def""#, &fixture.ctx()).unwrap();
    assert_eq!(compiled.instructions(), &[constant("abc"), constant("def")]);
}

#[test]
fn escaped_quotes_are_unescaped() {
    let fixture = Fixture::new();
    let compiled = compile_text(r#""say \"hi\"""#, &fixture.ctx()).unwrap();
    assert_eq!(compiled.instructions(), &[constant(r#"say "hi""#)]);
}

#[test]
fn free_text_call_with_a_text_parameter() {
    let fixture = Fixture::new();
    let compiled = compile_text(r#"Upper("abc") + "!""#, &fixture.ctx()).unwrap();

    let [TextInstruction::Call {
        callable,
        parameters,
    }, last] = compiled.instructions()
    else {
        panic!("unexpected instructions: {:?}", compiled.instructions());
    };
    assert_eq!(*callable, Callable::Free(fixture.functions.upper));
    assert_eq!(raws(parameters), vec![r#""abc""#]);
    assert_eq!(
        parameters[0].compiled_text().unwrap().instructions(),
        &[constant("abc")]
    );
    assert_eq!(last, &constant("!"));
}

#[test]
fn empty_parameter_lists_still_pass_one_parameter() {
    let fixture = Fixture::new();
    let compiled = compile_text("Player.Name()", &fixture.ctx()).unwrap();

    let TextInstruction::Call {
        callable,
        parameters,
    } = &compiled.instructions()[0]
    else {
        panic!("expected a call");
    };
    assert_eq!(
        *callable,
        Callable::ObjectMember {
            object_type: SPRITE,
            function: fixture.functions.name,
        }
    );
    assert_eq!(raws(parameters), vec!["Player", ""]);
}

#[test]
fn component_text_call() {
    let fixture = Fixture::new();
    let compiled = compile_text("Player.Physics::State()", &fixture.ctx()).unwrap();

    let TextInstruction::Call {
        callable,
        parameters,
    } = &compiled.instructions()[0]
    else {
        panic!("expected a call");
    };
    assert_eq!(
        *callable,
        Callable::ComponentMember {
            component_type: PHYSICS,
            function: fixture.functions.state,
        }
    );
    assert_eq!(raws(parameters), vec!["Player", "Physics", ""]);
}

#[test]
fn numeric_calls_are_converted_to_text() {
    let fixture = Fixture::new();
    let compiled = compile_text(r#""x: " + Player.X()"#, &fixture.ctx()).unwrap();

    assert_eq!(compiled.instructions()[0], constant("x: "));
    let TextInstruction::NumberToText(number) = &compiled.instructions()[1] else {
        panic!("expected a converted number");
    };
    assert_eq!(number.raw(), "Player.X()");
    assert_eq!(number.compiled_math().unwrap().rewritten(), "x1");

    let compiled = compile_text(r#""v" + sin(0)"#, &fixture.ctx()).unwrap();
    let TextInstruction::NumberToText(number) = &compiled.instructions()[1] else {
        panic!("expected a converted number");
    };
    assert_eq!(number.compiled_math().unwrap().evaluate_with(&[]), 0.0);
}

#[test]
fn terms_need_a_plus_between_them() {
    let fixture = Fixture::new();
    assert_eq!(
        compile_text(r#""abc" "def""#, &fixture.ctx()).unwrap_err(),
        ExprError::MissingConcatenationOperator { position: 6 }
    );
    assert_eq!(
        compile_text(r#""a" + + "b""#, &fixture.ctx()).unwrap_err(),
        ExprError::MissingTermBetweenOperators { position: 4 }
    );
}

#[test]
fn bare_words_are_not_text() {
    let fixture = Fixture::new();
    assert_eq!(
        compile_text("hello", &fixture.ctx()).unwrap_err(),
        ExprError::EmptyOrInvalidExpression { position: 0 }
    );
}

#[test]
fn unterminated_literal() {
    let fixture = Fixture::new();
    assert_eq!(
        compile_text(r#""abc"#, &fixture.ctx()).unwrap_err(),
        ExprError::UnterminatedQuotes { position: 0 }
    );
}

#[test]
fn too_few_parameters() {
    let fixture = Fixture::new();
    assert_eq!(
        compile_text(r#"Join("a")"#, &fixture.ctx()).unwrap_err(),
        ExprError::WrongParameterCount {
            position: 4,
            expected_min: 2,
            expected_max: 2,
            found: 1,
        }
    );
}

#[test]
fn nested_failure_reports_the_inner_position() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut expr = Expression::new(r#"Player.Label("a" + Enemy.Nope())"#, ctx.identifiers);

    assert!(!expr.prepare_text(&ctx));
    assert_eq!(
        expr.first_error(),
        Some(&ExprError::UnrecognizedFunction {
            name: "Nope".to_string(),
            position: 19,
        })
    );
    assert_eq!(
        expr.first_error_message().as_deref(),
        Some("unrecognized function 'Nope' at 19")
    );
    assert!(expr.compiled_text().unwrap().is_empty());
}

#[test]
fn unclosed_call_parameters() {
    let fixture = Fixture::new();
    assert_eq!(
        compile_text(r#"Upper("a""#, &fixture.ctx()).unwrap_err(),
        ExprError::UnterminatedParentheses { position: 8 }
    );
}

#[test]
fn call_without_parentheses() {
    let fixture = Fixture::new();
    assert_eq!(
        compile_text(r#"Player.Name + "a""#, &fixture.ctx()).unwrap_err(),
        ExprError::MissingParameterParentheses { position: 11 }
    );
}

#[test]
fn component_text_call_without_the_component() {
    common::init_logging();
    let fixture = Fixture::new();
    assert_eq!(
        compile_text("Enemy.Physics::State()", &fixture.ctx()).unwrap_err(),
        ExprError::UnrecognizedFunction {
            name: "Physics::State".to_string(),
            position: 0,
        }
    );
}

#[test]
fn extra_text_parameters_are_kept_unbound() {
    let fixture = Fixture::new();
    let compiled = compile_text(r#"Upper("a", "b")"#, &fixture.ctx()).unwrap();

    let TextInstruction::Call { parameters, .. } = &compiled.instructions()[0] else {
        panic!("expected a call");
    };
    assert_eq!(raws(parameters), vec![r#""a""#, r#" "b""#]);
    assert_eq!(parameters[0].text_succeeded(), Some(true));
    assert_eq!(parameters[1].text_succeeded(), None);
}

#[test]
fn quiet_text_preparation_keeps_no_error() {
    let fixture = Fixture::new();
    let ctx = fixture.quiet_ctx();
    let mut expr = Expression::new(r#""abc"#, ctx.identifiers);

    assert!(!expr.prepare_text(&ctx));
    assert_eq!(expr.text_succeeded(), Some(false));
    assert!(expr.first_error().is_none());
    assert!(expr.compiled_text().unwrap().is_empty());
}

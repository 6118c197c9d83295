mod common;

use std::collections::HashMap;

use pretty_assertions::assert_eq;

use common::Fixture;
use scene_expr::{
    CallDispatcher, CompileOptions, Expression, FunctionId, IdentifierTable, MathInstruction,
    TypeId,
};

/// Answers every call with a fixed value per function and records what was called.
struct FixedValues {
    values: HashMap<FunctionId, f64>,
    calls: Vec<String>,
}

impl CallDispatcher for FixedValues {
    type Output = f64;

    fn call_free(&mut self, function: FunctionId, parameters: &[Expression]) -> f64 {
        self.calls.push(format!("free {}", parameters.len()));
        self.values.get(&function).copied().unwrap_or_default()
    }

    fn call_object_member(
        &mut self,
        _object_type: TypeId,
        function: FunctionId,
        parameters: &[Expression],
    ) -> f64 {
        self.calls.push(format!("object {}", parameters[0].raw()));
        self.values.get(&function).copied().unwrap_or_default()
    }

    fn call_component_member(
        &mut self,
        _component_type: TypeId,
        function: FunctionId,
        parameters: &[Expression],
    ) -> f64 {
        self.calls
            .push(format!("component {}.{}", parameters[0].raw(), parameters[1].raw()));
        self.values.get(&function).copied().unwrap_or_default()
    }
}

#[test]
fn math_form_is_compiled_on_first_use() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut expr = ctx.expression("1+1");

    assert_eq!(expr.math_succeeded(), None);
    assert_eq!(expr.math_form(&ctx).evaluate_with(&[]), 2.0);
    assert_eq!(expr.math_succeeded(), Some(true));
    assert!(expr.compiled_text().is_none());
}

#[test]
fn text_form_is_compiled_on_first_use() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut expr = ctx.expression(r#""a" + "b""#);

    assert_eq!(expr.text_form(&ctx).instructions().len(), 2);
    assert_eq!(expr.text_succeeded(), Some(true));
}

#[test]
fn both_forms_are_attempted() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut expr = ctx.expression(r#""a""#);

    assert!(!expr.prepare_both(&ctx));
    assert_eq!(expr.math_succeeded(), Some(false));
    assert_eq!(expr.text_succeeded(), Some(true));
    assert!(expr
        .first_error_message()
        .unwrap()
        .starts_with("arithmetic syntax error"));
    assert_eq!(expr.math_form(&ctx).evaluate_with(&[]), 0.0);
}

#[test]
fn options_read_from_json_switch_diagnostics_off() {
    let fixture = Fixture::new();
    let options = CompileOptions::from_json(r#"{"diagnostics": false}"#).unwrap();
    let ctx = fixture.ctx().with_options(options);
    let mut expr = ctx.expression("Player.Nope(");

    assert!(!expr.prepare_math(&ctx));
    assert!(expr.first_error().is_none());
    assert_eq!(expr.first_error_position(), None);
}

#[test]
fn compiled_math_drives_a_dispatcher() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();
    let mut expr = ctx.expression("Player.X() * 10 + Player.Physics::Speed(1) + Random(5)");
    assert!(expr.prepare_math(&ctx));

    let mut dispatcher = FixedValues {
        values: HashMap::from([
            (fixture.functions.x, 2.0),
            (fixture.functions.speed, 3.0),
            (fixture.functions.random, 4.0),
        ]),
        calls: Vec::new(),
    };
    let compiled = expr.compiled_math().unwrap();
    assert_eq!(compiled.program().params(), ["x1", "x2", "x3"]);
    assert_eq!(
        compiled.instructions()[1].callable.function(),
        fixture.functions.speed
    );
    let values: Vec<f64> = compiled
        .instructions()
        .iter()
        .map(|instruction: &MathInstruction| instruction.invoke(&mut dispatcher))
        .collect();

    assert_eq!(compiled.evaluate_with(&values), 27.0);
    assert_eq!(
        dispatcher.calls,
        vec!["object Player", "component Player.Physics", "free 1"]
    );
}

#[test]
fn operator_and_identifier_caches() {
    let fixture = Fixture::new();
    let ctx = fixture.ctx();

    let player = ctx.expression("Player");
    assert_eq!(player.identifier(), fixture.identifiers.id_of("Player"));
    assert!(player.comparison_operator().is_none());

    let unknown = ctx.expression("Ghost");
    assert_eq!(unknown.identifier(), None);
}

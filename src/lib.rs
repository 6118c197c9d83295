//! Preparation of behavior expressions: object, component and free function calls
//! mixed with arithmetic (math expressions) or with quoted text joined by `+`
//! (text expressions).
//!
//! An [`Expression`] holds raw text such as `Player.X() + 2 * Player.Physics::Speed(3)`
//! and compiles it on demand against a [`ResolutionContext`] into a [`CompiledMath`]
//! or a [`CompiledText`], ready to be evaluated repeatedly by the host.

pub mod arith;
pub mod binder;
pub mod context;
pub mod error;
pub mod expression;
pub mod instruction;
pub mod math;
pub mod resolve;
pub mod scanner;
pub mod text;

pub use context::{
    CompileOptions, FunctionEntry, FunctionId, FunctionRegistry, Identifier, IdentifierTable,
    MapIdentifiers, MapRegistry, MapScene, ParameterDeclaration, ParameterKind,
    ResolutionContext, SceneModel, TypeId, ValueKind,
};
pub use error::ExprError;
pub use expression::{ComparisonOperator, Expression, ModificationOperator};
pub use instruction::{
    CallDispatcher, Callable, CompiledMath, CompiledText, MathInstruction, TextInstruction,
};

/// Compiles `raw` as a math expression without keeping an [`Expression`] around.
pub fn compile_math(raw: &str, ctx: &ResolutionContext<'_>) -> Result<CompiledMath, ExprError> {
    math::compile(raw, ctx)
}

/// Compiles `raw` as a text expression without keeping an [`Expression`] around.
pub fn compile_text(raw: &str, ctx: &ResolutionContext<'_>) -> Result<CompiledText, ExprError> {
    text::compile(raw, ctx)
}

#[cfg(test)]
mod tests {
    use crate::{
        compile_math, compile_text, MapIdentifiers, MapRegistry, MapScene, ResolutionContext,
        TextInstruction,
    };

    #[test]
    fn pure_arithmetic_needs_no_registry() {
        let registry = MapRegistry::new();
        let scene = MapScene::new();
        let identifiers = MapIdentifiers::new();
        let ctx = ResolutionContext::new(&registry, &scene, &identifiers);

        let compiled = compile_math("2+3*4", &ctx).unwrap();
        assert!(compiled.instructions().is_empty());
        assert_eq!(compiled.evaluate_with(&[]), 14.0);
    }

    #[test]
    fn literal_text_needs_no_registry() {
        let registry = MapRegistry::new();
        let scene = MapScene::new();
        let identifiers = MapIdentifiers::new();
        let ctx = ResolutionContext::new(&registry, &scene, &identifiers);

        let compiled = compile_text("\"hello\"", &ctx).unwrap();
        assert_eq!(
            compiled.instructions(),
            &[TextInstruction::Constant("hello".to_string())]
        );
    }
}

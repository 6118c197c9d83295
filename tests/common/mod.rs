#![allow(dead_code)]

use scene_expr::{
    CompileOptions, FunctionId, MapIdentifiers, MapRegistry, MapScene, ParameterDeclaration,
    ParameterKind, ResolutionContext, TypeId, ValueKind,
};

pub const SPRITE: TypeId = TypeId(1);
pub const PHYSICS: TypeId = TypeId(10);

/// Handles of the functions registered by [`Fixture::new`].
pub struct Functions {
    pub random: FunctionId,
    pub x: FunctionId,
    pub func: FunctionId,
    pub var: FunctionId,
    pub speed: FunctionId,
    pub upper: FunctionId,
    pub join: FunctionId,
    pub name: FunctionId,
    pub label: FunctionId,
    pub state: FunctionId,
}

/// A small scene: `Player` (sprite with physics), `Enemy` and `Big Boss` (plain sprites).
pub struct Fixture {
    pub registry: MapRegistry,
    pub scene: MapScene,
    pub identifiers: MapIdentifiers,
    pub functions: Functions,
}

fn required(kinds: &[ParameterKind]) -> Vec<ParameterDeclaration> {
    kinds
        .iter()
        .cloned()
        .map(ParameterDeclaration::required)
        .collect()
}

impl Fixture {
    pub fn new() -> Self {
        use ParameterKind::{Automatism, Expression, Object, Text};

        let mut registry = MapRegistry::new();
        let functions = Functions {
            random: registry.register_free(ValueKind::Number, "Random", required(&[Expression])),
            x: registry.register_object(ValueKind::Number, SPRITE, "X", required(&[Object])),
            func: registry.register_object(
                ValueKind::Number,
                SPRITE,
                "Func",
                required(&[Object, Expression, Expression]),
            ),
            var: registry.register_object(
                ValueKind::Number,
                SPRITE,
                "Var",
                required(&[Object, Text]),
            ),
            speed: registry.register_component(
                ValueKind::Number,
                PHYSICS,
                "Speed",
                required(&[Object, Automatism, Expression]),
            ),
            upper: registry.register_free(ValueKind::Text, "Upper", required(&[Text])),
            join: registry.register_free(ValueKind::Text, "Join", required(&[Text, Text])),
            name: registry.register_object(ValueKind::Text, SPRITE, "Name", required(&[Object])),
            label: registry.register_object(
                ValueKind::Text,
                SPRITE,
                "Label",
                required(&[Object, Text]),
            ),
            state: registry.register_component(
                ValueKind::Text,
                PHYSICS,
                "State",
                required(&[Object, Automatism]),
            ),
        };

        let mut scene = MapScene::new();
        scene
            .add_object("Player", SPRITE)
            .add_object("Enemy", SPRITE)
            .add_object("Big Boss", SPRITE)
            .add_component_type("Physics", PHYSICS)
            .attach("Player", PHYSICS);

        let mut identifiers = MapIdentifiers::new();
        identifiers.intern("Player");
        identifiers.intern("Enemy");

        Self {
            registry,
            scene,
            identifiers,
            functions,
        }
    }

    pub fn ctx(&self) -> ResolutionContext<'_> {
        ResolutionContext::new(&self.registry, &self.scene, &self.identifiers)
    }

    pub fn quiet_ctx(&self) -> ResolutionContext<'_> {
        self.ctx().with_options(CompileOptions {
            diagnostics: false,
            ..CompileOptions::default()
        })
    }
}

pub fn raws(parameters: &[scene_expr::Expression]) -> Vec<&str> {
    parameters.iter().map(|p| p.raw()).collect()
}

/// Routes preparation logs to the test output.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

//! Lookups an expression needs while it is being prepared.
//!
//! Preparation never reaches for global state: everything it may consult is bundled
//! in a [`ResolutionContext`] and passed down explicitly, recursion included.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ExprError;

const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Declared type of an object or of a component.
pub struct TypeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Handle of a registered function, meaningful to the registry that issued it.
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Interned identifier.
pub struct Identifier(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Namespace a function is registered in: numeric or text-producing.
pub enum ValueKind {
    Number,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Semantic kind of a declared parameter.
pub enum ParameterKind {
    /// Numeric sub-expression.
    Expression,
    /// Text sub-expression.
    Text,
    Layer,
    Color,
    File,
    JoyAxis,
    /// Object receiver; the object name itself.
    Object,
    /// Component receiver; the component name itself.
    Automatism,
    /// Any other kind, bound as text.
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a raw parameter is prepared.
pub enum Binding {
    Math,
    Text,
    /// Kept as raw text.
    Verbatim,
}

impl ParameterKind {
    pub fn binding(&self) -> Binding {
        match self {
            ParameterKind::Expression => Binding::Math,
            ParameterKind::Object | ParameterKind::Automatism => Binding::Verbatim,
            _ => Binding::Text,
        }
    }
}

impl From<String> for ParameterKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "expression" => ParameterKind::Expression,
            "text" => ParameterKind::Text,
            "layer" => ParameterKind::Layer,
            "color" => ParameterKind::Color,
            "file" => ParameterKind::File,
            "joyaxis" => ParameterKind::JoyAxis,
            "object" => ParameterKind::Object,
            "automatism" => ParameterKind::Automatism,
            _ => ParameterKind::Other(value),
        }
    }
}

impl From<ParameterKind> for String {
    fn from(value: ParameterKind) -> Self {
        match value {
            ParameterKind::Expression => "expression".to_string(),
            ParameterKind::Text => "text".to_string(),
            ParameterKind::Layer => "layer".to_string(),
            ParameterKind::Color => "color".to_string(),
            ParameterKind::File => "file".to_string(),
            ParameterKind::JoyAxis => "joyaxis".to_string(),
            ParameterKind::Object => "object".to_string(),
            ParameterKind::Automatism => "automatism".to_string(),
            ParameterKind::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Declaration of one function parameter.
pub struct ParameterDeclaration {
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    #[serde(default)]
    pub optional: bool,
}

impl ParameterDeclaration {
    pub fn required(kind: ParameterKind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    pub fn optional(kind: ParameterKind) -> Self {
        Self {
            kind,
            optional: true,
        }
    }
}

/// Number of non-optional declarations.
pub fn required_count(declarations: &[ParameterDeclaration]) -> usize {
    declarations.iter().filter(|d| !d.optional).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A registered function and its declared parameters.
///
/// Member functions declare their receivers too: an object function starts with an
/// `object` parameter, a component function with `object` then `automatism`. This
/// holds for text component functions as well; the component name is never passed
/// after the written parameters.
pub struct FunctionEntry {
    pub id: FunctionId,
    pub parameters: Vec<ParameterDeclaration>,
}

/// Registry of callable functions.
pub trait FunctionRegistry {
    /// Free (global or extension-provided) function named `name`.
    fn free_function(&self, kind: ValueKind, name: &str) -> Option<&FunctionEntry>;
    /// Function `name` of objects of type `object_type`.
    fn object_function(
        &self,
        kind: ValueKind,
        object_type: TypeId,
        name: &str,
    ) -> Option<&FunctionEntry>;
    /// Function `name` of components of type `component_type`.
    fn component_function(
        &self,
        kind: ValueKind,
        component_type: TypeId,
        name: &str,
    ) -> Option<&FunctionEntry>;
}

/// Type information about the objects and components an expression can name.
pub trait SceneModel {
    /// Declared type of the object named `object`.
    fn object_type(&self, object: &str) -> Option<TypeId>;
    /// Declared type of the component named `component`.
    fn component_type(&self, component: &str) -> Option<TypeId>;
    /// Types of the components attached to `object`.
    fn attached_components(&self, object: &str) -> Vec<TypeId>;
}

/// Name-to-identifier lookup.
pub trait IdentifierTable {
    fn id_of(&self, name: &str) -> Option<Identifier>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Preparation options.
pub struct CompileOptions {
    /// Capture the first error of each expression. When off, failures are still
    /// reported through return values but no message or position is kept, and a call
    /// with more parameters than declared is not rejected on the spot.
    pub diagnostics: bool,
    /// Maximum parameter nesting depth.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            diagnostics: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CompileOptions {
    /// Reads options from JSON; missing fields take their defaults.
    pub fn from_json(input: &str) -> Result<Self, ExprError> {
        serde_json::from_str(input).map_err(|e| ExprError::InvalidOptions(e.to_string()))
    }
}

#[derive(Clone, Copy)]
/// Everything preparation may consult.
pub struct ResolutionContext<'a> {
    pub registry: &'a dyn FunctionRegistry,
    pub scene: &'a dyn SceneModel,
    pub identifiers: &'a dyn IdentifierTable,
    pub options: CompileOptions,
}

impl<'a> ResolutionContext<'a> {
    pub fn new(
        registry: &'a dyn FunctionRegistry,
        scene: &'a dyn SceneModel,
        identifiers: &'a dyn IdentifierTable,
    ) -> Self {
        Self {
            registry,
            scene,
            identifiers,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Creates an uncompiled expression whose identifier id comes from this context.
    pub fn expression(&self, raw: impl Into<String>) -> crate::Expression {
        crate::Expression::new(raw, self.identifiers)
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<(), ExprError> {
        if depth > self.options.max_depth {
            return Err(ExprError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Scope {
    Free,
    Object(TypeId),
    Component(TypeId),
}

#[derive(Debug, Clone, Default)]
/// [`FunctionRegistry`] implementation backed by a map.
pub struct MapRegistry {
    entries: HashMap<(ValueKind, Scope, String), FunctionEntry>,
    next_id: u32,
}

impl MapRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a free function and returns its handle.
    pub fn register_free(
        &mut self,
        kind: ValueKind,
        name: &str,
        parameters: Vec<ParameterDeclaration>,
    ) -> FunctionId {
        self.insert(kind, Scope::Free, name, parameters)
    }

    /// Registers a function on objects of type `object_type`.
    pub fn register_object(
        &mut self,
        kind: ValueKind,
        object_type: TypeId,
        name: &str,
        parameters: Vec<ParameterDeclaration>,
    ) -> FunctionId {
        self.insert(kind, Scope::Object(object_type), name, parameters)
    }

    /// Registers a function on components of type `component_type`.
    pub fn register_component(
        &mut self,
        kind: ValueKind,
        component_type: TypeId,
        name: &str,
        parameters: Vec<ParameterDeclaration>,
    ) -> FunctionId {
        self.insert(kind, Scope::Component(component_type), name, parameters)
    }

    fn insert(
        &mut self,
        kind: ValueKind,
        scope: Scope,
        name: &str,
        parameters: Vec<ParameterDeclaration>,
    ) -> FunctionId {
        let id = FunctionId(self.next_id);
        self.next_id += 1;
        self.entries
            .insert((kind, scope, name.to_string()), FunctionEntry { id, parameters });
        id
    }

    fn lookup(&self, kind: ValueKind, scope: Scope, name: &str) -> Option<&FunctionEntry> {
        self.entries.get(&(kind, scope, name.to_string()))
    }
}

impl FunctionRegistry for MapRegistry {
    fn free_function(&self, kind: ValueKind, name: &str) -> Option<&FunctionEntry> {
        self.lookup(kind, Scope::Free, name)
    }

    fn object_function(
        &self,
        kind: ValueKind,
        object_type: TypeId,
        name: &str,
    ) -> Option<&FunctionEntry> {
        self.lookup(kind, Scope::Object(object_type), name)
    }

    fn component_function(
        &self,
        kind: ValueKind,
        component_type: TypeId,
        name: &str,
    ) -> Option<&FunctionEntry> {
        self.lookup(kind, Scope::Component(component_type), name)
    }
}

#[derive(Debug, Clone, Default)]
/// [`SceneModel`] implementation backed by maps.
pub struct MapScene {
    objects: HashMap<String, (TypeId, Vec<TypeId>)>,
    components: HashMap<String, TypeId>,
}

impl MapScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, name: &str, object_type: TypeId) -> &mut Self {
        self.objects
            .entry(name.to_string())
            .or_insert_with(|| (object_type, Vec::new()))
            .0 = object_type;
        self
    }

    pub fn add_component_type(&mut self, name: &str, component_type: TypeId) -> &mut Self {
        self.components.insert(name.to_string(), component_type);
        self
    }

    /// Attaches a component of `component_type` to an already added object.
    pub fn attach(&mut self, object: &str, component_type: TypeId) -> &mut Self {
        if let Some((_, attached)) = self.objects.get_mut(object) {
            if !attached.contains(&component_type) {
                attached.push(component_type);
            }
        }
        self
    }
}

impl SceneModel for MapScene {
    fn object_type(&self, object: &str) -> Option<TypeId> {
        self.objects.get(object).map(|(object_type, _)| *object_type)
    }

    fn component_type(&self, component: &str) -> Option<TypeId> {
        self.components.get(component).copied()
    }

    fn attached_components(&self, object: &str) -> Vec<TypeId> {
        self.objects
            .get(object)
            .map(|(_, attached)| attached.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
/// [`IdentifierTable`] implementation that interns names on request.
pub struct MapIdentifiers {
    ids: HashMap<String, Identifier>,
}

impl MapIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of `name`, assigning the next free one if needed.
    pub fn intern(&mut self, name: &str) -> Identifier {
        let next = Identifier(self.ids.len() as u32);
        *self.ids.entry(name.to_string()).or_insert(next)
    }
}

impl IdentifierTable for MapIdentifiers {
    fn id_of(&self, name: &str) -> Option<Identifier> {
        self.ids.get(name).copied()
    }
}

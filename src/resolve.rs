//! Locating call sites and resolving them against the function registry.

use tracing::warn;

use crate::context::{ParameterDeclaration, ResolutionContext, ValueKind};
use crate::instruction::Callable;
use crate::scanner::{precedes, restore_spaces, Scanner};

const COMPONENT_SEPARATOR: &str = "::";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A candidate call found by the expression scanners.
pub struct CallSite<'s> {
    /// Start of the name before the `.` or `(`.
    pub name_start: usize,
    /// Position of the `.` or `(` that ended the name.
    pub name_end: usize,
    /// Name before `name_end` with `~` decoded to spaces.
    pub object_name: String,
    /// Function name: the name itself for `Func(...)`, the text after the `.` for
    /// `Object.Func(...)`.
    pub function_name: &'s str,
    /// Where the function name ends; `None` when a method-form name runs to the end.
    pub function_name_end: Option<usize>,
    /// `Func(...)` rather than `Object.Func(...)`.
    pub is_bare: bool,
}

impl<'s> CallSite<'s> {
    /// Reads the call site whose name ends at the earlier of `next_dot`/`next_paren`.
    ///
    /// The name never starts before `parse_position`.
    pub fn locate(
        scanner: &Scanner<'s>,
        separators: &str,
        parse_position: usize,
        next_dot: Option<usize>,
        next_paren: Option<usize>,
    ) -> Option<Self> {
        let is_bare = precedes(next_paren, next_dot);
        let name_end = if is_bare { next_paren? } else { next_dot? };
        let name_start = scanner
            .name_start(separators, name_end)
            .max(parse_position);
        let name_before = scanner.slice(name_start, name_end);

        let (function_name, function_name_end) = if is_bare {
            (name_before, Some(name_end))
        } else {
            let end = scanner.find_any(" (", name_end);
            let function_name = scanner.slice(name_end + 1, end.unwrap_or(scanner.len()));
            (function_name, end)
        };

        Some(Self {
            name_start,
            name_end,
            object_name: restore_spaces(name_before),
            function_name,
            function_name_end,
            is_bare,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A call resolved against the registry.
pub struct Resolved<'r> {
    pub callable: Callable,
    pub declarations: &'r [ParameterDeclaration],
    /// Receiver names passed ahead of the written parameters: none for free functions,
    /// the object for object functions, the object then the component for component
    /// functions.
    pub receivers: Vec<String>,
}

/// Resolves `function_name` at `site`, in order: free function (bare form), object
/// function, then `Component::Function` on a component attached to the object.
///
/// A component function on a component the object does not have resolves to `None`
/// after logging a warning.
pub fn resolve_call<'r>(
    ctx: &ResolutionContext<'r>,
    kind: ValueKind,
    site: &CallSite<'_>,
    function_name: &str,
) -> Option<Resolved<'r>> {
    let registry = ctx.registry;
    let scene = ctx.scene;

    if site.is_bare {
        let entry = registry.free_function(kind, function_name)?;
        return Some(Resolved {
            callable: Callable::Free(entry.id),
            declarations: &entry.parameters,
            receivers: Vec::new(),
        });
    }

    let object = site.object_name.as_str();
    if let Some(object_type) = scene.object_type(object) {
        if let Some(entry) = registry.object_function(kind, object_type, function_name) {
            return Some(Resolved {
                callable: Callable::ObjectMember {
                    object_type,
                    function: entry.id,
                },
                declarations: &entry.parameters,
                receivers: vec![object.to_string()],
            });
        }
    }

    let (component, member) = function_name.split_once(COMPONENT_SEPARATOR)?;
    let component_type = scene.component_type(component)?;
    let entry = registry.component_function(kind, component_type, member)?;

    if !scene.attached_components(object).contains(&component_type) {
        warn!(
            object,
            component, "component function called on an object without that component"
        );
        return None;
    }

    Some(Resolved {
        callable: Callable::ComponentMember {
            component_type,
            function: entry.id,
        },
        declarations: &entry.parameters,
        receivers: vec![object.to_string(), component.to_string()],
    })
}

//! Compiled forms produced by preparation.

use crate::arith::Program;
use crate::context::{FunctionId, TypeId};
use crate::expression::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A resolved function together with the receiver shape it is called with.
pub enum Callable {
    /// Free (global or extension-provided) function.
    Free(FunctionId),
    /// Member function of an object type; the object name is the first parameter.
    ObjectMember {
        object_type: TypeId,
        function: FunctionId,
    },
    /// Member function of a component type; the object name and the component name
    /// are the first two parameters.
    ComponentMember {
        component_type: TypeId,
        function: FunctionId,
    },
}

/// Host-side evaluator of resolved calls.
pub trait CallDispatcher {
    type Output;

    fn call_free(&mut self, function: FunctionId, parameters: &[Expression]) -> Self::Output;

    fn call_object_member(
        &mut self,
        object_type: TypeId,
        function: FunctionId,
        parameters: &[Expression],
    ) -> Self::Output;

    fn call_component_member(
        &mut self,
        component_type: TypeId,
        function: FunctionId,
        parameters: &[Expression],
    ) -> Self::Output;
}

impl Callable {
    /// Routes the call to the dispatcher method matching its shape.
    pub fn dispatch<D: CallDispatcher>(
        &self,
        dispatcher: &mut D,
        parameters: &[Expression],
    ) -> D::Output {
        match *self {
            Callable::Free(function) => dispatcher.call_free(function, parameters),
            Callable::ObjectMember {
                object_type,
                function,
            } => dispatcher.call_object_member(object_type, function, parameters),
            Callable::ComponentMember {
                component_type,
                function,
            } => dispatcher.call_component_member(component_type, function, parameters),
        }
    }

    pub fn function(&self) -> FunctionId {
        match *self {
            Callable::Free(function)
            | Callable::ObjectMember { function, .. }
            | Callable::ComponentMember { function, .. } => function,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A resolved numeric call and its prepared parameters.
pub struct MathInstruction {
    pub callable: Callable,
    pub parameters: Vec<Expression>,
}

impl MathInstruction {
    pub fn invoke<D: CallDispatcher>(&self, dispatcher: &mut D) -> D::Output {
        self.callable.dispatch(dispatcher, &self.parameters)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One text-producing step of a compiled text expression.
pub enum TextInstruction {
    /// Literal text.
    Constant(String),
    /// Resolved text call and its prepared parameters.
    Call {
        callable: Callable,
        parameters: Vec<Expression>,
    },
    /// Numeric sub-expression converted to text.
    NumberToText(Box<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
/// Compiled numeric expression.
///
/// `instructions[k]` supplies the value of placeholder `x{k+1}` in the program.
pub struct CompiledMath {
    instructions: Vec<MathInstruction>,
    program: Program,
}

impl CompiledMath {
    pub(crate) fn new(instructions: Vec<MathInstruction>, program: Program) -> Self {
        Self {
            instructions,
            program,
        }
    }

    /// No instructions and the constant `0`.
    pub fn zero() -> Self {
        Self {
            instructions: Vec::new(),
            program: Program::zero(),
        }
    }

    pub fn instructions(&self) -> &[MathInstruction] {
        &self.instructions
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Arithmetic text with calls replaced by placeholders.
    pub fn rewritten(&self) -> &str {
        self.program.source()
    }

    /// Evaluates the arithmetic with `values[k]` as the result of instruction `k`.
    pub fn evaluate_with(&self, values: &[f64]) -> f64 {
        self.program.evaluate(values)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Compiled text expression; concatenating the instruction outputs in order gives
/// the result.
pub struct CompiledText {
    instructions: Vec<TextInstruction>,
}

impl CompiledText {
    pub(crate) fn new(instructions: Vec<TextInstruction>) -> Self {
        Self { instructions }
    }

    pub fn instructions(&self) -> &[TextInstruction] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Placeholder variable name for the `index`-th (1-based) resolved call.
pub fn placeholder(index: usize) -> String {
    format!("x{index}")
}

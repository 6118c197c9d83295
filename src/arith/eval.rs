//! Evaluation and constant folding for arithmetic ASTs.

use std::f64::consts;

use super::parser::{BinaryOp, Expr, UnaryOp};

/// Named constants recognised by the arithmetic language.
pub const CONSTANTS: &[(&str, f64)] = &[("pi", consts::PI), ("e", consts::E)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Built-in math functions.
pub enum Builtin {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Exp,
    Ln,
    Log,
    Log10,
    Log2,
    Abs,
    Sign,
    Rint,
    Int,
    Ceil,
    Floor,
    Min,
    Max,
    Sum,
    Avg,
    If,
}

const BUILTINS: &[(&str, Builtin)] = &[
    ("sin", Builtin::Sin),
    ("cos", Builtin::Cos),
    ("tan", Builtin::Tan),
    ("asin", Builtin::Asin),
    ("acos", Builtin::Acos),
    ("atan", Builtin::Atan),
    ("sinh", Builtin::Sinh),
    ("cosh", Builtin::Cosh),
    ("tanh", Builtin::Tanh),
    ("sqrt", Builtin::Sqrt),
    ("exp", Builtin::Exp),
    ("ln", Builtin::Ln),
    ("log", Builtin::Log),
    ("log10", Builtin::Log10),
    ("log2", Builtin::Log2),
    ("abs", Builtin::Abs),
    ("sign", Builtin::Sign),
    ("rint", Builtin::Rint),
    ("int", Builtin::Int),
    ("ceil", Builtin::Ceil),
    ("floor", Builtin::Floor),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("sum", Builtin::Sum),
    ("avg", Builtin::Avg),
    ("if", Builtin::If),
];

impl Builtin {
    /// Looks up a built-in function by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, builtin)| *builtin)
    }

    /// Whether the function can be called with `count` arguments.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Builtin::Min | Builtin::Max | Builtin::Sum | Builtin::Avg => count >= 1,
            Builtin::If => count == 3,
            _ => count == 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        let first = args.first().copied().unwrap_or(0.0);
        match self {
            Builtin::Sin => first.sin(),
            Builtin::Cos => first.cos(),
            Builtin::Tan => first.tan(),
            Builtin::Asin => first.asin(),
            Builtin::Acos => first.acos(),
            Builtin::Atan => first.atan(),
            Builtin::Sinh => first.sinh(),
            Builtin::Cosh => first.cosh(),
            Builtin::Tanh => first.tanh(),
            Builtin::Sqrt => first.sqrt(),
            Builtin::Exp => first.exp(),
            Builtin::Ln | Builtin::Log => first.ln(),
            Builtin::Log10 => first.log10(),
            Builtin::Log2 => first.log2(),
            Builtin::Abs => first.abs(),
            Builtin::Sign => {
                if first > 0.0 {
                    1.0
                } else if first < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            Builtin::Rint => first.round(),
            Builtin::Int => first.trunc(),
            Builtin::Ceil => first.ceil(),
            Builtin::Floor => first.floor(),
            Builtin::Min => args.iter().copied().fold(f64::INFINITY, f64::min),
            Builtin::Max => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Builtin::Sum => args.iter().sum(),
            Builtin::Avg => args.iter().sum::<f64>() / args.len().max(1) as f64,
            Builtin::If => {
                if truthy(first) {
                    args.get(1).copied().unwrap_or(0.0)
                } else {
                    args.get(2).copied().unwrap_or(0.0)
                }
            }
        }
    }
}

/// Value of a named constant, if `name` is one.
pub fn constant_value(name: &str) -> Option<f64> {
    CONSTANTS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, value)| *value)
}

/// Whether `name` is a built-in function or constant.
pub fn is_builtin_name(name: &str) -> bool {
    Builtin::from_name(name).is_some() || constant_value(name).is_some()
}

/// Evaluates an AST with `vars[i]` bound to [`Expr::Var`]`(i)`.
///
/// Unbound variables read as `0`. Division by zero follows IEEE-754.
pub fn evaluate(expr: &Expr, vars: &[f64]) -> f64 {
    match expr {
        Expr::Number(n) => *n,
        Expr::Var(index) => vars.get(*index).copied().unwrap_or(0.0),
        Expr::Unary { op, expr } => {
            let value = evaluate(expr, vars);
            match op {
                UnaryOp::Neg => -value,
                UnaryOp::Not => boolean(!truthy(value)),
            }
        }
        Expr::Binary { op, left, right } => {
            eval_binary(*op, evaluate(left, vars), evaluate(right, vars))
        }
        Expr::Call { function, args } => {
            let evaluated: Vec<f64> = args.iter().map(|arg| evaluate(arg, vars)).collect();
            function.apply(&evaluated)
        }
    }
}

/// Folds every variable-free subtree into a single number.
pub fn fold(expr: Expr) -> Expr {
    match expr {
        Expr::Unary { op, expr } => match fold(*expr) {
            Expr::Number(n) => Expr::Number(evaluate(
                &Expr::Unary {
                    op,
                    expr: Box::new(Expr::Number(n)),
                },
                &[],
            )),
            other => Expr::Unary {
                op,
                expr: Box::new(other),
            },
        },
        Expr::Binary { op, left, right } => match (fold(*left), fold(*right)) {
            (Expr::Number(l), Expr::Number(r)) => Expr::Number(eval_binary(op, l, r)),
            (l, r) => Expr::Binary {
                op,
                left: Box::new(l),
                right: Box::new(r),
            },
        },
        Expr::Call { function, args } => {
            let args: Vec<Expr> = args.into_iter().map(fold).collect();
            if args.iter().all(|arg| matches!(arg, Expr::Number(_))) {
                Expr::Number(evaluate(&Expr::Call { function, args }, &[]))
            } else {
                Expr::Call { function, args }
            }
        }
        leaf => leaf,
    }
}

fn eval_binary(op: BinaryOp, l: f64, r: f64) -> f64 {
    match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        BinaryOp::Mod => l % r,
        BinaryOp::Pow => l.powf(r),
        BinaryOp::Eq => boolean(l == r),
        BinaryOp::NotEq => boolean(l != r),
        BinaryOp::Lt => boolean(l < r),
        BinaryOp::Lte => boolean(l <= r),
        BinaryOp::Gt => boolean(l > r),
        BinaryOp::Gte => boolean(l >= r),
        BinaryOp::And => boolean(truthy(l) && truthy(r)),
        BinaryOp::Or => boolean(truthy(l) || truthy(r)),
    }
}

fn truthy(value: f64) -> bool {
    value != 0.0
}

fn boolean(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

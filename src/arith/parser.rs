//! Recursive-descent parser and AST for arithmetic over placeholder variables.

use crate::error::ExprError;

use super::eval::{constant_value, Builtin};
use super::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
/// Arithmetic AST node.
pub enum Expr {
    /// Number literal or folded constant.
    Number(f64),
    /// Placeholder variable, by index into the declared parameter names.
    Var(usize),
    /// Unary operation.
    Unary {
        /// Unary operator.
        op: UnaryOp,
        /// Operand expression.
        expr: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Binary operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Built-in math function call.
    Call {
        /// Called function.
        function: Builtin,
        /// Call argument expressions.
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Unary operators.
pub enum UnaryOp {
    /// Arithmetic negation (`-x`).
    Neg,
    /// Logical negation (`!x`), zero is false.
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Binary operators of the arithmetic language.
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `&&`
    And,
    /// `||`
    Or,
}

/// Parses a token stream into an arithmetic AST.
///
/// Identifiers resolve first against `params` (yielding [`Expr::Var`]), then against
/// the built-in constants. Parentheses, call arguments and unary prefixes may nest at
/// most `max_depth` levels.
pub fn parse(tokens: &[Token], params: &[String], max_depth: usize) -> Result<Expr, ExprError> {
    let mut parser = Parser {
        tokens,
        params,
        pos: 0,
        depth: 0,
        max_depth,
    };
    if matches!(parser.current().kind, TokenKind::Eof) {
        return Err(ExprError::ArithmeticSyntax("empty expression".to_string()));
    }
    let expr = parser.parse_or()?;
    if !matches!(parser.current().kind, TokenKind::Eof) {
        return Err(ExprError::ArithmeticSyntax(format!(
            "unexpected token after expression at position {}",
            parser.current().pos
        )));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    params: &'a [String],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn nested(
        &mut self,
        rule: fn(&mut Self) -> Result<Expr, ExprError>,
    ) -> Result<Expr, ExprError> {
        if self.depth >= self.max_depth {
            return Err(ExprError::NestingTooDeep {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_and()?;
        while self.consume_if(|k| matches!(k, TokenKind::OrOr)).is_some() {
            let right = self.parse_and()?;
            expr = binary(BinaryOp::Or, expr, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_equality()?;
        while self
            .consume_if(|k| matches!(k, TokenKind::AndAnd))
            .is_some()
        {
            let right = self.parse_equality()?;
            expr = binary(BinaryOp::And, expr, right);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.current().kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_comparison()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_term()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Lte => BinaryOp::Lte,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::Gte => BinaryOp::Gte,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_term()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_factor()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_factor()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_factor(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            expr = binary(op, expr, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.consume_if(|k| matches!(k, TokenKind::Minus)).is_some() {
            let expr = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(expr),
            });
        }

        if self.consume_if(|k| matches!(k, TokenKind::Bang)).is_some() {
            let expr = self.nested(Self::parse_unary)?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(expr),
            });
        }

        self.parse_power()
    }

    // Right-associative: 2^3^2 == 2^(3^2).
    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;
        if self.consume_if(|k| matches!(k, TokenKind::Caret)).is_some() {
            let exponent = self.nested(Self::parse_unary)?;
            return Ok(binary(BinaryOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let token = self.current().clone();
        match token.kind {
            TokenKind::Number(n) => {
                self.pos += 1;
                Ok(Expr::Number(n))
            }
            TokenKind::Ident(ref name) => {
                self.pos += 1;
                if self
                    .consume_if(|k| matches!(k, TokenKind::LParen))
                    .is_some()
                {
                    return self.parse_call(name, token.pos);
                }

                if let Some(index) = self.params.iter().position(|p| p == name) {
                    return Ok(Expr::Var(index));
                }
                constant_value(name).map(Expr::Number).ok_or_else(|| {
                    ExprError::ArithmeticSyntax(format!(
                        "unknown variable '{name}' at {}",
                        token.pos
                    ))
                })
            }
            TokenKind::LParen => {
                self.pos += 1;
                let expr = self.nested(Self::parse_or)?;
                self.expect(
                    |k| matches!(k, TokenKind::RParen),
                    "expected ')' after expression",
                )?;
                Ok(expr)
            }
            _ => Err(ExprError::ArithmeticSyntax(format!(
                "unexpected token {:?} at {}",
                token.kind, token.pos
            ))),
        }
    }

    fn parse_call(&mut self, name: &str, pos: usize) -> Result<Expr, ExprError> {
        let function = Builtin::from_name(name).ok_or_else(|| {
            ExprError::ArithmeticSyntax(format!("unknown function '{name}' at {pos}"))
        })?;

        let mut args = Vec::new();
        if self
            .consume_if(|k| matches!(k, TokenKind::RParen))
            .is_none()
        {
            loop {
                args.push(self.nested(Self::parse_or)?);
                if self.consume_if(|k| matches!(k, TokenKind::Comma)).is_some() {
                    continue;
                }
                self.expect(
                    |k| matches!(k, TokenKind::RParen),
                    "expected ')' after call",
                )?;
                break;
            }
        }

        if !function.accepts(args.len()) {
            return Err(ExprError::ArithmeticSyntax(format!(
                "{name} does not accept {} arguments (at {pos})",
                args.len()
            )));
        }

        Ok(Expr::Call { function, args })
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn consume_if(&mut self, predicate: fn(&TokenKind) -> bool) -> Option<&Token> {
        if predicate(&self.current().kind) {
            let current = &self.tokens[self.pos];
            self.pos += 1;
            Some(current)
        } else {
            None
        }
    }

    fn expect(
        &mut self,
        predicate: fn(&TokenKind) -> bool,
        message: &str,
    ) -> Result<(), ExprError> {
        if self.consume_if(predicate).is_some() {
            Ok(())
        } else {
            Err(ExprError::ArithmeticSyntax(format!(
                "{} at {}",
                message,
                self.current().pos
            )))
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

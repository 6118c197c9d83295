use crate::error::ExprError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Comma,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Lte,
    Gt,
    Gte,
    AndAnd,
    OrOr,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let mut chars = input.char_indices().peekable();
    let mut tokens = Vec::new();

    while let Some((idx, ch)) = chars.peek().copied() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let single = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '^' => Some(TokenKind::Caret),
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };
        if let Some(kind) = single {
            chars.next();
            tokens.push(Token { kind, pos: idx });
            continue;
        }

        match ch {
            '0'..='9' => {
                let start = idx;
                let mut end = idx;
                let mut seen_dot = false;
                while let Some((i, c)) = chars.peek().copied() {
                    if c.is_ascii_digit() {
                        end = i;
                        chars.next();
                    } else if c == '.' && !seen_dot {
                        seen_dot = true;
                        end = i;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let raw = &input[start..=end];
                let n: f64 = raw.parse().map_err(|e| {
                    ExprError::ArithmeticSyntax(format!(
                        "invalid number literal '{raw}' at {start}: {e}"
                    ))
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(n),
                    pos: start,
                });
            }
            '!' => {
                chars.next();
                let kind = if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                };
                tokens.push(Token { kind, pos: idx });
            }
            '=' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::EqEq,
                        pos: idx,
                    });
                } else {
                    return Err(ExprError::ArithmeticSyntax(format!(
                        "unexpected '=' at {idx}; use '==' for equality"
                    )));
                }
            }
            '<' => {
                chars.next();
                let kind = if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                };
                tokens.push(Token { kind, pos: idx });
            }
            '>' => {
                chars.next();
                let kind = if matches!(chars.peek(), Some((_, '='))) {
                    chars.next();
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                };
                tokens.push(Token { kind, pos: idx });
            }
            '&' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '&'))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::AndAnd,
                        pos: idx,
                    });
                } else {
                    return Err(ExprError::ArithmeticSyntax(format!(
                        "unexpected '&' at {idx}; expected '&&'"
                    )));
                }
            }
            '|' => {
                chars.next();
                if matches!(chars.peek(), Some((_, '|'))) {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::OrOr,
                        pos: idx,
                    });
                } else {
                    return Err(ExprError::ArithmeticSyntax(format!(
                        "unexpected '|' at {idx}; expected '||'"
                    )));
                }
            }
            c if is_ident_start(c) => {
                let start = idx;
                let mut end = idx;
                while let Some((i, cc)) = chars.peek().copied() {
                    if is_ident_continue(cc) {
                        end = i;
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(input[start..=end].to_string()),
                    pos: start,
                });
            }
            _ => {
                return Err(ExprError::ArithmeticSyntax(format!(
                    "unexpected character '{}' at {}",
                    ch, idx
                )))
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        pos: input.len(),
    });
    Ok(tokens)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

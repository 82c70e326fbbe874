//! Parser for scalar material-property formulas.
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | power
//! power   := primary ('^' unary)?
//! primary := number | ident | ident '(' expr (',' expr)* ')' | '(' expr ')'
//! ```
//!
//! Identifiers become member symbols; the caller resolves them against the
//! behaviour description. Known functions: `exp`, `log`, `sqrt`, `pow`, `min`.

use crate::error::{ExprError, ExprResult};
use crate::expr::{Func, ScalarExpr};

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    Comma,
}

fn tokenize(src: &str) -> ExprResult<Vec<(usize, Token)>> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            c if c.is_ascii_digit() || c == '.' => {
                while i < bytes.len() && ((bytes[i] as char).is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                // exponent part
                if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
                    let mut j = i + 1;
                    if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                        j += 1;
                    }
                    if j < bytes.len() && (bytes[j] as char).is_ascii_digit() {
                        i = j;
                        while i < bytes.len() && (bytes[i] as char).is_ascii_digit() {
                            i += 1;
                        }
                    }
                }
                let text = &src[start..i];
                let value = text.parse::<f64>().map_err(|_| ExprError::Parse {
                    position: start,
                    message: format!("invalid number '{text}'"),
                })?;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                while i < bytes.len()
                    && ((bytes[i] as char).is_ascii_alphanumeric() || bytes[i] == b'_')
                {
                    i += 1;
                }
                tokens.push((start, Token::Ident(src[start..i].to_string())));
                continue;
            }
            other => {
                return Err(ExprError::Parse {
                    position: start,
                    message: format!("unexpected character '{other}'"),
                });
            }
        };
        tokens.push((start, token));
        i += 1;
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(o, _)| *o).unwrap_or(self.len)
    }

    fn error(&self, message: impl Into<String>) -> ExprError {
        ExprError::Parse {
            position: self.offset(),
            message: message.into(),
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> ExprResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn expr(&mut self) -> ExprResult<ScalarExpr> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                lhs = lhs + self.term()?;
            } else if self.eat(&Token::Minus) {
                lhs = lhs - self.term()?;
            } else {
                return Ok(lhs);
            }
        }
    }

    fn term(&mut self) -> ExprResult<ScalarExpr> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                lhs = lhs * self.unary()?;
            } else if self.eat(&Token::Slash) {
                lhs = ScalarExpr::div(lhs, self.unary()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> ExprResult<ScalarExpr> {
        if self.eat(&Token::Minus) {
            return Ok(-self.unary()?);
        }
        self.power()
    }

    fn power(&mut self) -> ExprResult<ScalarExpr> {
        let base = self.primary()?;
        if self.eat(&Token::Caret) {
            let exponent = self.unary()?;
            return Ok(ScalarExpr::pow(base, exponent));
        }
        Ok(base)
    }

    fn arguments(&mut self) -> ExprResult<Vec<ScalarExpr>> {
        let mut args = vec![self.expr()?];
        while self.eat(&Token::Comma) {
            args.push(self.expr()?);
        }
        self.expect(&Token::RParen, "')'")?;
        Ok(args)
    }

    fn call(&mut self, name: &str) -> ExprResult<ScalarExpr> {
        let at = self.offset();
        let mut args = self.arguments()?;
        let arity_error = |n: usize| ExprError::Parse {
            position: at,
            message: format!("function '{name}' expects {n} argument(s)"),
        };
        let unary = |f: Func, args: &mut Vec<ScalarExpr>| match args.pop() {
            Some(a) if args.is_empty() => Ok(ScalarExpr::call(f, a)),
            _ => Err(arity_error(1)),
        };
        match name {
            "exp" => unary(Func::Exp, &mut args),
            "log" => unary(Func::Log, &mut args),
            "sqrt" => unary(Func::Sqrt, &mut args),
            "pow" | "min" => {
                if args.len() != 2 {
                    return Err(arity_error(2));
                }
                let b = args.remove(1);
                let a = args.remove(0);
                Ok(if name == "pow" {
                    ScalarExpr::pow(a, b)
                } else {
                    ScalarExpr::min(a, b)
                })
            }
            other => Err(ExprError::Parse {
                position: at,
                message: format!("unknown function '{other}'"),
            }),
        }
    }

    fn primary(&mut self) -> ExprResult<ScalarExpr> {
        let token = self.peek().cloned();
        match token {
            Some(Token::Number(v)) => {
                self.pos += 1;
                Ok(ScalarExpr::Const(v))
            }
            Some(Token::Ident(name)) => {
                self.pos += 1;
                if self.eat(&Token::LParen) {
                    self.call(&name)
                } else {
                    Ok(ScalarExpr::member(name))
                }
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let e = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(e)
            }
            _ => Err(self.error("expected a number, an identifier or '('")),
        }
    }
}

/// Parse a formula such as `"E0 * (1 - 2e-4 * (T - 293.15))"`.
pub fn parse_formula(src: &str) -> ExprResult<ScalarExpr> {
    let tokens = tokenize(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        len: src.len(),
    };
    let e = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(e)
}

//! Expression parsing by precedence climbing

use std::rc::Rc;

use super::{PResult, Parser};
use crate::ast::{
    AssignTarget, BinaryOp, Expr, ExprKind, FunctionDecl, LogicalOp, NumberLiteral, Stmt,
    StmtKind, UnaryOp,
};
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};
use crate::stack::ensure_sufficient_stack;

/// Name given to anonymous functions.
pub(crate) const LAMBDA_NAME: &str = "<lambda>";

// ═══════════════════════════════════════════════════════════════════════
// Binding Powers
// ═══════════════════════════════════════════════════════════════════════

const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_EQUALITY: u8 = 3;
const PREC_COMPARISON: u8 = 4;
const PREC_TERM: u8 = 5;
const PREC_FACTOR: u8 = 6;
const PREC_POWER: u8 = 7;

#[derive(Debug, Clone, Copy)]
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// The static infix table: precedence and operator for a token kind.
fn infix_operator(kind: &TokenKind) -> Option<(u8, Infix)> {
    let entry = match kind {
        TokenKind::OrOr => (PREC_OR, Infix::Logical(LogicalOp::Or)),
        TokenKind::AndAnd => (PREC_AND, Infix::Logical(LogicalOp::And)),
        TokenKind::EqualEqual => (PREC_EQUALITY, Infix::Binary(BinaryOp::Equal)),
        TokenKind::BangEqual => (PREC_EQUALITY, Infix::Binary(BinaryOp::NotEqual)),
        TokenKind::Greater => (PREC_COMPARISON, Infix::Binary(BinaryOp::Greater)),
        TokenKind::GreaterEqual => (PREC_COMPARISON, Infix::Binary(BinaryOp::GreaterEqual)),
        TokenKind::Less => (PREC_COMPARISON, Infix::Binary(BinaryOp::Less)),
        TokenKind::LessEqual => (PREC_COMPARISON, Infix::Binary(BinaryOp::LessEqual)),
        TokenKind::Plus => (PREC_TERM, Infix::Binary(BinaryOp::Add)),
        TokenKind::Minus => (PREC_TERM, Infix::Binary(BinaryOp::Subtract)),
        TokenKind::Star => (PREC_FACTOR, Infix::Binary(BinaryOp::Multiply)),
        TokenKind::Slash => (PREC_FACTOR, Infix::Binary(BinaryOp::Divide)),
        TokenKind::Percent => (PREC_FACTOR, Infix::Binary(BinaryOp::Remainder)),
        TokenKind::Caret => (PREC_POWER, Infix::Binary(BinaryOp::Power)),
        _ => return None,
    };
    Some(entry)
}

fn is_right_associative(prec: u8) -> bool {
    prec == PREC_POWER
}

impl Parser {
    /// Parse a full expression (assignment level).
    pub(crate) fn expression(&mut self) -> PResult<Expr> {
        ensure_sufficient_stack(|| self.assignment())
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.binary(PREC_OR)?;

        if !self.check(&TokenKind::Equal) {
            return Ok(expr);
        }

        let equals = self.advance();
        let value = self.assignment()?;
        let span = expr.span;

        let target = match expr.kind {
            ExprKind::Identifier(name) => AssignTarget::Identifier(name),
            ExprKind::Member { object, name } => AssignTarget::Member { object, name },
            ExprKind::Index { object, index } => AssignTarget::Index { object, index },
            _ => return Err(ParseError::new(equals, "invalid assignment target")),
        };

        Ok(Expr::new(
            ExprKind::Assign {
                target,
                value: Box::new(value),
            },
            span,
        ))
    }

    /// Climb operators whose precedence is at least `min_prec`.
    fn binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.unary()?;

        while let Some((prec, op)) = infix_operator(&self.peek().kind) {
            if prec < min_prec {
                break;
            }
            self.advance();

            let next_min = if is_right_associative(prec) {
                prec
            } else {
                prec + 1
            };
            let right = ensure_sufficient_stack(|| self.binary(next_min))?;

            let span = left.span;
            let (left_box, right_box) = (Box::new(left), Box::new(right));
            let kind = match op {
                Infix::Binary(op) => ExprKind::Binary {
                    op,
                    left: left_box,
                    right: right_box,
                },
                Infix::Logical(op) => ExprKind::Logical {
                    op,
                    left: left_box,
                    right: right_box,
                },
            };
            left = Expr::new(kind, span);
        }

        Ok(left)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Negate,
            _ => return self.call(),
        };

        let token = self.advance();
        let operand = ensure_sufficient_stack(|| self.unary())?;
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            token.span(),
        ))
    }

    /// Primary followed by any number of calls, member accesses and indexes.
    fn call(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            let span = expr.span;
            if self.match_kind(&TokenKind::LeftParen) {
                let args = self.arguments()?;
                expr = Expr::new(
                    ExprKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.match_kind(&TokenKind::Dot) {
                let name = self.consume(&TokenKind::Identifier, "expected property name after `.`")?;
                expr = Expr::new(
                    ExprKind::Member {
                        object: Box::new(expr),
                        name: name.lexeme,
                    },
                    span,
                );
            } else if self.match_kind(&TokenKind::LeftBracket) {
                let index = self.expression()?;
                self.consume(&TokenKind::RightBracket, "expected `]` after index")?;
                expr = Expr::new(
                    ExprKind::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// Arguments after an opening `(`, through the closing `)`.
    fn arguments(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RightParen, "expected `)` after arguments")?;
        Ok(args)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let span = self.peek().span();

        let kind = match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                ExprKind::Number(parse_number(&token)?)
            }
            TokenKind::String => ExprKind::String(self.advance().lexeme),
            TokenKind::True => {
                self.advance();
                ExprKind::Boolean(true)
            }
            TokenKind::False => {
                self.advance();
                ExprKind::Boolean(false)
            }
            TokenKind::Null => {
                self.advance();
                ExprKind::Null
            }
            TokenKind::Undefined => {
                self.advance();
                ExprKind::Undefined
            }
            TokenKind::Identifier => ExprKind::Identifier(self.advance().lexeme),
            TokenKind::LeftParen if self.is_lambda_start() => return self.lambda(),
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.expression()?;
                self.consume(&TokenKind::RightParen, "expected `)` after expression")?;
                ExprKind::Grouping(Box::new(inner))
            }
            TokenKind::LeftBracket => {
                self.advance();
                ExprKind::Array(self.array_elements()?)
            }
            TokenKind::LeftBrace => {
                self.advance();
                ExprKind::Object(self.object_entries()?)
            }
            _ => return Err(self.error_at_current("expected expression")),
        };

        Ok(Expr::new(kind, span))
    }

    fn array_elements(&mut self) -> PResult<Vec<Expr>> {
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RightBracket) {
            elements.push(self.expression()?);
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        self.consume(&TokenKind::RightBracket, "expected `]` after array elements")?;
        Ok(elements)
    }

    fn object_entries(&mut self) -> PResult<Vec<(String, Expr)>> {
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RightBrace) {
            let key = match self.peek().kind {
                TokenKind::Identifier | TokenKind::String => self.advance().lexeme,
                _ => return Err(self.error_at_current("expected property name")),
            };
            self.consume(&TokenKind::Colon, "expected `:` after property name")?;
            let value = self.expression()?;
            entries.push((key, value));

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        self.consume(&TokenKind::RightBrace, "expected `}` after object literal")?;
        Ok(entries)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lambdas
    // ═══════════════════════════════════════════════════════════════════

    /// Look ahead from a `(` for `( ident, ... ) =>`.
    fn is_lambda_start(&self) -> bool {
        let mut offset = 1;

        if matches!(self.peek_at(offset), Some(t) if t.kind == TokenKind::RightParen) {
            return matches!(self.peek_at(offset + 1), Some(t) if t.kind == TokenKind::Arrow);
        }

        loop {
            match self.peek_at(offset).map(|t| &t.kind) {
                Some(TokenKind::Identifier) => offset += 1,
                _ => return false,
            }
            match self.peek_at(offset).map(|t| &t.kind) {
                Some(TokenKind::Comma) => offset += 1,
                Some(TokenKind::RightParen) => {
                    return matches!(
                        self.peek_at(offset + 1),
                        Some(t) if t.kind == TokenKind::Arrow
                    )
                }
                _ => return false,
            }
        }
    }

    fn lambda(&mut self) -> PResult<Expr> {
        let span = self.peek().span();
        let params = self.parameters()?;
        self.consume(&TokenKind::Arrow, "expected `=>` after lambda parameters")?;

        let body = if self.match_kind(&TokenKind::LeftBrace) {
            self.block()?
        } else {
            let value = self.expression()?;
            let value_span = value.span;
            vec![Stmt::new(StmtKind::Return(Some(value)), value_span)]
        };

        let decl = FunctionDecl {
            name: LAMBDA_NAME.to_string(),
            params,
            body,
            span,
        };
        Ok(Expr::new(ExprKind::Lambda(Rc::new(decl)), span))
    }
}

/// Classify a number lexeme as integer or float.
fn parse_number(token: &Token) -> PResult<NumberLiteral> {
    let lexeme = token.lexeme.as_str();
    if !lexeme.contains('.') {
        if let Ok(n) = lexeme.parse::<i64>() {
            return Ok(NumberLiteral::Integer(n));
        }
    }
    lexeme
        .parse::<f64>()
        .map(NumberLiteral::Float)
        .map_err(|_| ParseError::new(token.clone(), "invalid number literal"))
}

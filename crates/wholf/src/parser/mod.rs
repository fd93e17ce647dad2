//! Parser: tokens to syntax tree
//!
//! Statements are parsed by recursive descent ([`stmt`]), expressions by
//! precedence climbing over a static binding-power table ([`expr`]).
//!
//! The parser never stops at the first error. A failed declaration is
//! recorded, tokens are skipped up to a synchronization point, and parsing
//! resumes, so one pass reports every independent mistake. A program with
//! any error is never returned, not even partially.

mod expr;
mod stmt;

use tracing::trace;

use crate::ast::Program;
use crate::error::{ParseError, SyntaxError};
use crate::lexer::{self, Token, TokenKind};

type PResult<T> = Result<T, ParseError>;

/// Parse a token sequence into a program.
///
/// Lexical error tokens are reported as [`SyntaxError::Lex`] alongside any
/// grammar errors. Errors are returned in source order.
pub fn parse(tokens: Vec<Token>) -> Result<Program, Vec<SyntaxError>> {
    Parser::new(tokens).parse_program()
}

/// Scan and parse `source` in one step.
pub fn parse_source(source: &str) -> Result<Program, Vec<SyntaxError>> {
    parse(lexer::scan(source))
}

/// Recursive-descent parser state.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<SyntaxError>,

    /// Number of enclosing `{ ... }` blocks, for error recovery
    block_depth: usize,
}

impl Parser {
    /// Create a parser. Error tokens are moved to the error list up front.
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut errors = Vec::new();
        let mut kept = Vec::with_capacity(tokens.len());

        for token in tokens {
            match token.kind {
                TokenKind::Error(ref error) => errors.push(SyntaxError::Lex {
                    error: error.clone(),
                    span: token.span(),
                }),
                TokenKind::Eof => {
                    kept.push(token);
                    break;
                }
                _ => kept.push(token),
            }
        }

        if !matches!(kept.last(), Some(t) if t.kind == TokenKind::Eof) {
            let (line, column) = kept.last().map(|t| (t.line, t.column)).unwrap_or((1, 1));
            kept.push(Token::new(TokenKind::Eof, "", line, column));
        }

        Self {
            tokens: kept,
            current: 0,
            errors,
            block_depth: 0,
        }
    }

    /// Parse the whole token sequence.
    pub fn parse_program(mut self) -> Result<Program, Vec<SyntaxError>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => self.recover(err),
            }
        }

        if self.errors.is_empty() {
            trace!(statements = statements.len(), "parsed program");
            Ok(Program { statements })
        } else {
            let mut errors = self.errors;
            errors.sort_by_key(|e| {
                let span = e.span();
                (span.line, span.column)
            });
            Err(errors)
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Token Cursor
    // ═══════════════════════════════════════════════════════════════════

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.current + offset)
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &TokenKind, message: &str) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Accept a `;`, or nothing when the statement ends the block or input.
    fn consume_terminator(&mut self, message: &str) -> PResult<()> {
        if self.match_kind(&TokenKind::Semicolon)
            || self.check(&TokenKind::RightBrace)
            || self.is_at_end()
        {
            Ok(())
        } else {
            Err(self.error_at_current(message))
        }
    }

    fn error_at_current(&self, message: &str) -> ParseError {
        ParseError::new(self.peek().clone(), message)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Error Recovery
    // ═══════════════════════════════════════════════════════════════════

    fn recover(&mut self, err: ParseError) {
        trace!(error = %err, "parse error, synchronizing");
        self.errors.push(SyntaxError::Parse(err));
        self.synchronize();
    }

    /// Skip tokens until a likely statement boundary: just after a `;`,
    /// before a statement keyword, or before the `}` closing the current
    /// block.
    fn synchronize(&mut self) {
        let start = self.current;

        while !self.is_at_end() {
            if self.current > start && self.previous().kind == TokenKind::Semicolon {
                return;
            }

            let kind = &self.peek().kind;
            if kind.starts_statement() {
                return;
            }
            if *kind == TokenKind::RightBrace && self.block_depth > 0 {
                return;
            }

            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StmtKind;
    use crate::error::LexError;
    use crate::lexer::Span;

    fn errors(source: &str) -> Vec<SyntaxError> {
        parse_source(source).expect_err("expected syntax errors")
    }

    #[test]
    fn test_empty_program() {
        let program = parse_source("").unwrap();
        assert!(program.statements.is_empty());
    }

    #[test]
    fn test_missing_eof_is_tolerated() {
        let tokens = vec![Token::new(TokenKind::Number, "1", 1, 1)];
        let program = parse(tokens).unwrap();
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_lex_errors_are_reported() {
        let errs = errors("let s = \"abc");
        assert!(errs.iter().any(|e| matches!(
            e,
            SyntaxError::Lex {
                error: LexError::UnterminatedString,
                span
            } if *span == Span::new(1, 9)
        )));
    }

    #[test]
    fn test_recovers_after_semicolon() {
        let errs = errors("let = 1; let y = ; let z = 3;");
        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].span(), Span::new(1, 5));
        assert_eq!(errs[1].span(), Span::new(1, 18));
    }

    #[test]
    fn test_recovers_inside_blocks() {
        let errs = errors("function f() { let = 1; return 2 +; }\nlet ok = 1;\nlet x = );");
        assert_eq!(errs.len(), 3);
        assert_eq!(errs[2].span().line, 3);
    }

    #[test]
    fn test_unbalanced_closing_brace_at_top_level() {
        let errs = errors("} let a = 1;");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_statement_keyword_is_sync_point() {
        let errs = errors("1 + * 2 while (true) {}");
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_successful_parse_keeps_order() {
        let program = parse_source("let a = 1; a;").unwrap();
        assert!(matches!(program.statements[0].kind, StmtKind::VarDecl { .. }));
        assert!(matches!(program.statements[1].kind, StmtKind::Expression(_)));
    }
}

//! Lexer: source text to tokens
//!
//! A single left-to-right scan with one- and two-character lookahead.
//! Lexical errors never abort the scan; they are emitted as
//! [`TokenKind::Error`] tokens carrying a [`LexError`] and the position where
//! the bad construct started.

mod token;

pub use token::{Span, Token, TokenKind};

use crate::error::LexError;

/// Scan `source` into tokens.
///
/// The result always ends with exactly one [`TokenKind::Eof`] token.
pub fn scan(source: &str) -> Vec<Token> {
    Lexer::new(source).scan_tokens()
}

/// Character-level scanner state.
pub struct Lexer {
    chars: Vec<char>,
    tokens: Vec<Token>,

    /// Index of the first character of the token being scanned
    start: usize,
    /// Index of the next unread character
    current: usize,

    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
}

impl Lexer {
    /// Create a lexer over `source`.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
        }
    }

    /// Consume the lexer and produce the full token sequence.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        loop {
            self.skip_trivia();
            if self.is_at_end() {
                break;
            }
            self.mark_start();
            let c = self.advance();
            self.scan_token(c);
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.line, self.column));
        self.tokens
    }

    // ═══════════════════════════════════════════════════════════════════
    // Cursor
    // ═══════════════════════════════════════════════════════════════════

    fn is_at_end(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn peek(&self) -> char {
        self.chars.get(self.current).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.current + 1).copied().unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.current];
        self.current += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }
        self.advance();
        true
    }

    fn mark_start(&mut self) {
        self.start = self.current;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn current_lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Token Emission
    // ═══════════════════════════════════════════════════════════════════

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.current_lexeme();
        self.add_token_with_lexeme(kind, lexeme);
    }

    fn add_token_with_lexeme(&mut self, kind: TokenKind, lexeme: String) {
        self.tokens
            .push(Token::new(kind, lexeme, self.start_line, self.start_column));
    }

    fn add_error(&mut self, error: LexError) {
        self.add_token(TokenKind::Error(error));
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scanning
    // ═══════════════════════════════════════════════════════════════════

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\r' | '\t' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_next() == '/' => {
                    while self.peek() != '\n' && !self.is_at_end() {
                        self.advance();
                    }
                }
                '/' if self.peek_next() == '*' => self.block_comment(),
                _ => return,
            }
        }
    }

    /// Skip a `/* ... */` comment. An unterminated comment runs to the end
    /// of input and is reported at its opening delimiter.
    fn block_comment(&mut self) {
        self.mark_start();
        self.advance();
        self.advance();

        while !self.is_at_end() {
            if self.peek() == '*' && self.peek_next() == '/' {
                self.advance();
                self.advance();
                return;
            }
            self.advance();
        }

        self.add_error(LexError::UnterminatedComment);
    }

    fn scan_token(&mut self, c: char) {
        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            '[' => self.add_token(TokenKind::LeftBracket),
            ']' => self.add_token(TokenKind::RightBracket),
            ',' => self.add_token(TokenKind::Comma),
            ';' => self.add_token(TokenKind::Semicolon),
            '.' => self.add_token(TokenKind::Dot),
            ':' => self.add_token(TokenKind::Colon),
            '+' => self.add_token(TokenKind::Plus),
            '-' => self.add_token(TokenKind::Minus),
            '*' => self.add_token(TokenKind::Star),
            '/' => self.add_token(TokenKind::Slash),
            '%' => self.add_token(TokenKind::Percent),
            '^' => self.add_token(TokenKind::Caret),

            '!' => {
                let kind = if self.match_char('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.match_char('=') {
                    TokenKind::EqualEqual
                } else if self.match_char('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.match_char('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.match_char('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '&' => {
                if self.match_char('&') {
                    self.add_token(TokenKind::AndAnd);
                } else {
                    self.add_error(LexError::UnexpectedCharacter('&'));
                }
            }
            '|' => {
                if self.match_char('|') {
                    self.add_token(TokenKind::OrOr);
                } else {
                    self.add_error(LexError::UnexpectedCharacter('|'));
                }
            }

            '"' => self.string(),
            c if c.is_ascii_digit() => self.number(),
            c if c.is_alphabetic() || c == '_' => self.identifier(),

            other => self.add_error(LexError::UnexpectedCharacter(other)),
        }
    }

    fn string(&mut self) {
        let mut value = String::new();

        loop {
            if self.is_at_end() {
                self.add_error(LexError::UnterminatedString);
                return;
            }

            match self.advance() {
                '"' => break,
                '\\' => {
                    if self.is_at_end() {
                        self.add_error(LexError::UnterminatedString);
                        return;
                    }
                    match self.advance() {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '"' => value.push('"'),
                        '\\' => value.push('\\'),
                        other => {
                            value.push('\\');
                            value.push(other);
                        }
                    }
                }
                c => value.push(c),
            }
        }

        self.add_token_with_lexeme(TokenKind::String, value);
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A trailing `.` is left for member access
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        self.add_token(TokenKind::Number);
    }

    fn identifier(&mut self) {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = self.current_lexeme();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        self.add_token_with_lexeme(kind, text);
    }
}

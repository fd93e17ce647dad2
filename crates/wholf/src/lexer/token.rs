//! Token types produced by the lexer

use std::fmt;

use serde::Serialize;

use crate::error::LexError;

/// A 1-indexed source position (line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    /// Line number (1-indexed)
    pub line: usize,

    /// Column number (1-indexed)
    pub column: usize,
}

impl Span {
    /// Create a new span.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The closed set of token kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // ═══════════════════════════════════════════════════════════════════
    // Keywords
    // ═══════════════════════════════════════════════════════════════════
    /// `let`
    Let,
    /// `const`
    Const,
    /// `function`
    Function,
    /// `class`
    Class,
    /// `if`
    If,
    /// `else`
    Else,
    /// `while`
    While,
    /// `for`
    For,
    /// `foreach`
    Foreach,
    /// `return`
    Return,
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `true`
    True,
    /// `false`
    False,
    /// `null`
    Null,
    /// `undefined`
    Undefined,

    // ═══════════════════════════════════════════════════════════════════
    // Operators
    // ═══════════════════════════════════════════════════════════════════
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `^`
    Caret,
    /// `!`
    Bang,
    /// `!=`
    BangEqual,
    /// `=`
    Equal,
    /// `==`
    EqualEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,

    // ═══════════════════════════════════════════════════════════════════
    // Punctuation
    // ═══════════════════════════════════════════════════════════════════
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `=>`
    Arrow,

    // ═══════════════════════════════════════════════════════════════════
    // Literals
    // ═══════════════════════════════════════════════════════════════════
    /// Numeric literal; the lexeme holds the digits
    Number,
    /// String literal; the lexeme holds the decoded contents
    String,
    /// Identifier
    Identifier,

    /// A lexical error. Scanning continues after it.
    Error(LexError),

    /// End of input
    Eof,
}

impl TokenKind {
    /// Look up a lexeme in the keyword table.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "let" => TokenKind::Let,
            "const" => TokenKind::Const,
            "function" => TokenKind::Function,
            "class" => TokenKind::Class,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            "for" => TokenKind::For,
            "foreach" => TokenKind::Foreach,
            "return" => TokenKind::Return,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this token begins a declaration or statement.
    ///
    /// The parser resynchronizes on these after an error.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
        )
    }
}

/// A lexical token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What kind of token this is
    pub kind: TokenKind,

    /// Source text of the token (decoded contents for strings)
    pub lexeme: String,

    /// Line of the first character
    pub line: usize,

    /// Column of the first character
    pub column: usize,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    /// The position of this token.
    pub fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    /// Human-readable description used in parser diagnostics.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Number => format!("number `{}`", self.lexeme),
            TokenKind::String => format!("string \"{}\"", self.lexeme.escape_default()),
            TokenKind::Identifier => format!("identifier `{}`", self.lexeme),
            TokenKind::Error(err) => err.to_string(),
            _ => format!("`{}`", self.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(TokenKind::keyword("foreach"), Some(TokenKind::Foreach));
        assert_eq!(TokenKind::keyword("undefined"), Some(TokenKind::Undefined));
        assert_eq!(TokenKind::keyword("foo"), None);
        assert_eq!(TokenKind::keyword("Let"), None);
    }

    #[test]
    fn test_starts_statement() {
        assert!(TokenKind::Class.starts_statement());
        assert!(TokenKind::Return.starts_statement());
        assert!(!TokenKind::Else.starts_statement());
        assert!(!TokenKind::Identifier.starts_statement());
    }

    #[test]
    fn test_describe_eof() {
        let token = Token::new(TokenKind::Eof, "", 3, 7);
        assert_eq!(token.describe(), "end of input");
        assert_eq!(token.span(), Span::new(3, 7));
    }
}

//! Declaration and statement parsing by recursive descent

use std::rc::Rc;

use super::{PResult, Parser};
use crate::ast::{ClassDecl, FunctionDecl, Stmt, StmtKind};
use crate::lexer::TokenKind;
use crate::stack::ensure_sufficient_stack;

impl Parser {
    /// declaration := varDecl | functionDecl | classDecl | statement
    pub(super) fn declaration(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| self.declaration_inner())
    }

    fn declaration_inner(&mut self) -> PResult<Stmt> {
        match self.peek().kind {
            TokenKind::Let => {
                self.advance();
                self.var_declaration(false)
            }
            TokenKind::Const => {
                self.advance();
                self.var_declaration(true)
            }
            TokenKind::Function => {
                let span = self.advance().span();
                let decl = self.function("function")?;
                Ok(Stmt::new(StmtKind::Function(decl), span))
            }
            TokenKind::Class => {
                self.advance();
                self.class_declaration()
            }
            _ => self.statement(),
        }
    }

    /// After `let`/`const`: `name (= initializer)? ;`
    fn var_declaration(&mut self, constant: bool) -> PResult<Stmt> {
        let span = self.previous().span();
        let name = self.consume(&TokenKind::Identifier, "expected variable name")?;

        let initializer = if self.match_kind(&TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };

        if constant && initializer.is_none() {
            return Err(self.error_at_current("expected `=` after constant name"));
        }

        self.consume_terminator("expected `;` after variable declaration")?;

        Ok(Stmt::new(
            StmtKind::VarDecl {
                name: name.lexeme,
                initializer,
                constant,
            },
            span,
        ))
    }

    /// `name(params) { body }`, shared by functions and methods.
    fn function(&mut self, kind: &str) -> PResult<Rc<FunctionDecl>> {
        let name = self.consume(&TokenKind::Identifier, &format!("expected {kind} name"))?;
        let span = name.span();
        let params = self.parameters()?;
        self.consume(
            &TokenKind::LeftBrace,
            &format!("expected `{{` before {kind} body"),
        )?;
        let body = self.block()?;

        Ok(Rc::new(FunctionDecl {
            name: name.lexeme,
            params,
            body,
            span,
        }))
    }

    /// `( ident, ... )`
    pub(super) fn parameters(&mut self) -> PResult<Vec<String>> {
        self.consume(&TokenKind::LeftParen, "expected `(` before parameters")?;

        let mut params = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                let param = self.consume(&TokenKind::Identifier, "expected parameter name")?;
                params.push(param.lexeme);
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume(&TokenKind::RightParen, "expected `)` after parameters")?;
        Ok(params)
    }

    fn class_declaration(&mut self) -> PResult<Stmt> {
        let span = self.previous().span();
        let name = self.consume(&TokenKind::Identifier, "expected class name")?;
        self.consume(&TokenKind::LeftBrace, "expected `{` before class body")?;

        let mut methods = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            // `function` before a method name is optional
            self.match_kind(&TokenKind::Function);
            methods.push(self.function("method")?);
        }

        self.consume(&TokenKind::RightBrace, "expected `}` after class body")?;

        Ok(Stmt::new(
            StmtKind::Class(ClassDecl {
                name: name.lexeme,
                methods,
            }),
            span,
        ))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════

    fn statement(&mut self) -> PResult<Stmt> {
        ensure_sufficient_stack(|| self.statement_inner())
    }

    fn statement_inner(&mut self) -> PResult<Stmt> {
        let span = self.peek().span();

        let kind = match self.peek().kind {
            TokenKind::If => {
                self.advance();
                self.if_statement()?
            }
            TokenKind::While => {
                self.advance();
                self.while_statement()?
            }
            TokenKind::For => {
                self.advance();
                self.for_statement()?
            }
            TokenKind::Foreach => {
                self.advance();
                self.foreach_statement()?
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon)
                    || self.check(&TokenKind::RightBrace)
                    || self.is_at_end()
                {
                    None
                } else {
                    Some(self.expression()?)
                };
                self.consume_terminator("expected `;` after return value")?;
                StmtKind::Return(value)
            }
            TokenKind::Break => {
                self.advance();
                self.consume_terminator("expected `;` after `break`")?;
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                self.consume_terminator("expected `;` after `continue`")?;
                StmtKind::Continue
            }
            TokenKind::LeftBrace => {
                self.advance();
                StmtKind::Block(self.block()?)
            }
            _ => {
                let expr = self.expression()?;
                self.consume_terminator("expected `;` after expression")?;
                StmtKind::Expression(expr)
            }
        };

        Ok(Stmt::new(kind, span))
    }

    /// Declarations up to the closing `}` (the `{` is already consumed).
    ///
    /// Errors inside the block are recorded here and parsing resumes at the
    /// next statement of the same block.
    pub(super) fn block(&mut self) -> PResult<Vec<Stmt>> {
        self.block_depth += 1;
        let mut statements = Vec::new();

        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => self.recover(err),
            }
        }

        self.block_depth -= 1;
        self.consume(&TokenKind::RightBrace, "expected `}` after block")?;
        Ok(statements)
    }

    fn if_statement(&mut self) -> PResult<StmtKind> {
        self.consume(&TokenKind::LeftParen, "expected `(` after `if`")?;
        let condition = self.expression()?;
        self.consume(&TokenKind::RightParen, "expected `)` after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(&TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(StmtKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> PResult<StmtKind> {
        self.consume(&TokenKind::LeftParen, "expected `(` after `while`")?;
        let condition = self.expression()?;
        self.consume(&TokenKind::RightParen, "expected `)` after while condition")?;
        let body = Box::new(self.statement()?);

        Ok(StmtKind::While { condition, body })
    }

    fn for_statement(&mut self) -> PResult<StmtKind> {
        self.consume(&TokenKind::LeftParen, "expected `(` after `for`")?;

        let init = match self.peek().kind {
            TokenKind::Semicolon => {
                self.advance();
                None
            }
            TokenKind::Let | TokenKind::Const => {
                let constant = self.advance().kind == TokenKind::Const;
                Some(Box::new(self.var_declaration(constant)?))
            }
            _ => {
                let span = self.peek().span();
                let expr = self.expression()?;
                self.consume(&TokenKind::Semicolon, "expected `;` after loop initializer")?;
                Some(Box::new(Stmt::new(StmtKind::Expression(expr), span)))
            }
        };

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&TokenKind::Semicolon, "expected `;` after loop condition")?;

        let increment = if self.check(&TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(&TokenKind::RightParen, "expected `)` after for clauses")?;

        let body = Box::new(self.statement()?);

        Ok(StmtKind::For {
            init,
            condition,
            increment,
            body,
        })
    }

    /// `foreach (name : iterable) body`; `in` is accepted in place of `:`
    /// and a leading `let` is allowed.
    fn foreach_statement(&mut self) -> PResult<StmtKind> {
        self.consume(&TokenKind::LeftParen, "expected `(` after `foreach`")?;
        self.match_kind(&TokenKind::Let);
        let variable = self.consume(&TokenKind::Identifier, "expected loop variable name")?;

        let is_in = self.check(&TokenKind::Identifier) && self.peek().lexeme == "in";
        if is_in {
            self.advance();
        } else {
            self.consume(&TokenKind::Colon, "expected `:` after loop variable")?;
        }

        let iterable = self.expression()?;
        self.consume(&TokenKind::RightParen, "expected `)` after foreach iterable")?;
        let body = Box::new(self.statement()?);

        Ok(StmtKind::Foreach {
            variable: variable.lexeme,
            iterable,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{ExprKind, StmtKind};
    use crate::error::SyntaxError;
    use crate::lexer::Span;
    use crate::parser::parse_source;

    fn first(source: &str) -> StmtKind {
        let mut program = parse_source(source).expect("parse failed");
        std::mem::take(&mut program.statements)
            .into_iter()
            .next()
            .map(|s| s.kind)
            .expect("no statements")
    }

    fn parse_message(source: &str) -> String {
        match parse_source(source).unwrap_err().into_iter().next() {
            Some(SyntaxError::Parse(err)) => err.message,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_var_declarations() {
        assert!(matches!(
            first("let x = 1;"),
            StmtKind::VarDecl { ref name, initializer: Some(_), constant: false } if name == "x"
        ));
        assert!(matches!(
            first("let x;"),
            StmtKind::VarDecl { initializer: None, .. }
        ));
        assert!(matches!(
            first("const y = 2;"),
            StmtKind::VarDecl { constant: true, .. }
        ));
    }

    #[test]
    fn test_const_requires_initializer() {
        assert_eq!(parse_message("const y;"), "expected `=` after constant name");
    }

    #[test]
    fn test_optional_semicolon_at_end_of_input_and_block() {
        assert!(parse_source("let x = 1").is_ok());
        assert!(parse_source("{ x = 1 }").is_ok());
        assert_eq!(parse_message("x = 1 y = 2;"), "expected `;` after expression");
    }

    #[test]
    fn test_function_declaration() {
        match first("function add(a, b) { return a + b; }") {
            StmtKind::Function(decl) => {
                assert_eq!(decl.name, "add");
                assert_eq!(decl.params, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(decl.body.len(), 1);
                assert_eq!(decl.span, Span::new(1, 10));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_class_methods_with_and_without_keyword() {
        match first("class P { constructor(x) { this.x = x; } function get() { return this.x; } }") {
            StmtKind::Class(class) => {
                assert_eq!(class.name, "P");
                let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(names, vec!["constructor", "get"]);
            }
            other => panic!("expected class, got {other:?}"),
        }
    }

    #[test]
    fn test_if_else_binds_to_nearest_if() {
        match first("if (a) if (b) x; else y;") {
            StmtKind::If {
                else_branch: None,
                then_branch,
                ..
            } => assert!(matches!(
                then_branch.kind,
                StmtKind::If {
                    else_branch: Some(_),
                    ..
                }
            )),
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_for_clauses() {
        match first("for (let i = 0; i < 3; i = i + 1) {}") {
            StmtKind::For {
                init: Some(init),
                condition: Some(_),
                increment: Some(_),
                ..
            } => assert!(matches!(init.kind, StmtKind::VarDecl { .. })),
            other => panic!("expected for, got {other:?}"),
        }

        assert!(matches!(
            first("for (;;) break;"),
            StmtKind::For {
                init: None,
                condition: None,
                increment: None,
                ..
            }
        ));

        match first("for (i = 0; i < 3; i = i + 1) {}") {
            StmtKind::For { init: Some(init), .. } => {
                assert!(matches!(init.kind, StmtKind::Expression(_)))
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn test_foreach_forms() {
        for source in [
            "foreach (x : items) print(x);",
            "foreach (x in items) print(x);",
            "foreach (let x : items) print(x);",
        ] {
            match first(source) {
                StmtKind::Foreach { variable, iterable, .. } => {
                    assert_eq!(variable, "x");
                    assert!(matches!(iterable.kind, ExprKind::Identifier(ref n) if n == "items"));
                }
                other => panic!("expected foreach, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_return_forms() {
        let program = parse_source("function f() { return; } function g() { return 1 }").unwrap();
        for (stmt, has_value) in program.statements.iter().zip([false, true]) {
            match &stmt.kind {
                StmtKind::Function(decl) => {
                    assert!(matches!(decl.body[0].kind, StmtKind::Return(ref v) if v.is_some() == has_value));
                }
                other => panic!("expected function, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_block_statement_and_object_literal_positions() {
        // `{` at statement start always opens a block
        assert!(parse_source("{ a: 1 }").is_err());
        assert!(matches!(
            first("let o = { a: 1 };"),
            StmtKind::VarDecl { initializer: Some(ref e), .. } if matches!(e.kind, ExprKind::Object(_))
        ));
    }

    #[test]
    fn test_multiple_errors_are_all_reported() {
        let errs = parse_source("let 1 = 2;\nlet b = ;\nclass { }\n").unwrap_err();
        assert_eq!(errs.len(), 3);
        let lines: Vec<_> = errs.iter().map(|e| e.span().line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_deeply_nested_statements() {
        let blocks = format!("{}1;{}", "{ ".repeat(5000), " }".repeat(5000));
        assert!(parse_source(&blocks).is_ok());

        let chain = format!("{}1;", "if (1) ".repeat(50_000));
        assert!(parse_source(&chain).is_ok());

        let loops = format!("{}1;", "while (x) ".repeat(20_000));
        assert!(parse_source(&loops).is_ok());
    }
}

//! Abstract syntax tree
//!
//! A closed set of expression and statement variants. Every node carries the
//! position of the token that begins it, so runtime errors can point back at
//! source.

use std::fmt;
use std::rc::Rc;

use crate::lexer::Span;
use crate::stack::ensure_sufficient_stack;

/// A parsed program: the ordered top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order
    pub statements: Vec<Stmt>,
}

impl Drop for Program {
    fn drop(&mut self) {
        dismantle(std::mem::take(&mut self.statements));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The expression variant
    pub kind: ExprKind,

    /// Where the expression begins
    pub span: Span,
}

impl Expr {
    /// Create an expression node.
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `42`, `3.5`
    Number(NumberLiteral),
    /// `"text"`
    String(String),
    /// `true` / `false`
    Boolean(bool),
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    /// A variable reference
    Identifier(String),
    /// `-x`, `!x`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Expr>,
    },
    /// Arithmetic, comparison and equality operators
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Expr>,
        /// Right operand
        right: Box<Expr>,
    },
    /// Short-circuiting `&&` / `||`
    Logical {
        /// Operator
        op: LogicalOp,
        /// Left operand
        left: Box<Expr>,
        /// Right operand (evaluated only when needed)
        right: Box<Expr>,
    },
    /// `target = value`
    Assign {
        /// Where the value is stored
        target: AssignTarget,
        /// The assigned value
        value: Box<Expr>,
    },
    /// `callee(args...)`
    Call {
        /// The called expression
        callee: Box<Expr>,
        /// Arguments in source order
        args: Vec<Expr>,
    },
    /// `( inner )`
    Grouping(Box<Expr>),
    /// `[a, b, c]`
    Array(Vec<Expr>),
    /// `{ key: value, ... }`
    Object(Vec<(String, Expr)>),
    /// `object.name`
    Member {
        /// The accessed value
        object: Box<Expr>,
        /// Property name
        name: String,
    },
    /// `object[index]`
    Index {
        /// The indexed value
        object: Box<Expr>,
        /// The index expression
        index: Box<Expr>,
    },
    /// `(a, b) => expr` or `(a, b) => { ... }`
    Lambda(Rc<FunctionDecl>),
}

/// A numeric literal, already classified as integer or float.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    /// Digit run with no fractional part that fits in `i64`
    Integer(i64),
    /// Everything else
    Float(f64),
}

/// A valid left-hand side of an assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// `name = ...`
    Identifier(String),
    /// `object.name = ...`
    Member {
        /// The object being updated
        object: Box<Expr>,
        /// Property name
        name: String,
    },
    /// `object[index] = ...`
    Index {
        /// The container being updated
        object: Box<Expr>,
        /// The index expression
        index: Box<Expr>,
    },
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-`
    Negate,
    /// `!`
    Not,
}

/// Binary (non-short-circuit) operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Remainder,
    /// `^`
    Power,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
}

/// Short-circuit operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::Power => "^",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "&&"),
            LogicalOp::Or => write!(f, "||"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════

/// A statement node.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    /// The statement variant
    pub kind: StmtKind,

    /// Where the statement begins
    pub span: Span,
}

impl Stmt {
    /// Create a statement node.
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// An expression evaluated for its value or side effects
    Expression(Expr),
    /// `let name = init;` / `const name = init;`
    VarDecl {
        /// Bound name
        name: String,
        /// Initial value (`undefined` when absent)
        initializer: Option<Expr>,
        /// Declared with `const`
        constant: bool,
    },
    /// `{ ... }`
    Block(Vec<Stmt>),
    /// `if (cond) then else other`
    If {
        /// Condition
        condition: Expr,
        /// Taken when the condition is truthy
        then_branch: Box<Stmt>,
        /// Taken otherwise
        else_branch: Option<Box<Stmt>>,
    },
    /// `while (cond) body`
    While {
        /// Loop condition
        condition: Expr,
        /// Loop body
        body: Box<Stmt>,
    },
    /// `for (init; cond; incr) body`
    For {
        /// Runs once, in the loop's own scope
        init: Option<Box<Stmt>>,
        /// Checked before each iteration (absent means always true)
        condition: Option<Expr>,
        /// Runs after each iteration
        increment: Option<Expr>,
        /// Loop body
        body: Box<Stmt>,
    },
    /// `foreach (name : iterable) body`
    Foreach {
        /// Loop variable
        variable: String,
        /// Iterated value
        iterable: Expr,
        /// Loop body
        body: Box<Stmt>,
    },
    /// `function name(params) { body }`
    Function(Rc<FunctionDecl>),
    /// `class Name { methods }`
    Class(ClassDecl),
    /// `return value;`
    Return(Option<Expr>),
    /// `break;`
    Break,
    /// `continue;`
    Continue,
}

impl StmtKind {
    /// Short name of the statement kind, for tracing.
    pub fn name(&self) -> &'static str {
        match self {
            StmtKind::Expression(_) => "expression",
            StmtKind::VarDecl { .. } => "variable declaration",
            StmtKind::Block(_) => "block",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::For { .. } => "for",
            StmtKind::Foreach { .. } => "foreach",
            StmtKind::Function(_) => "function declaration",
            StmtKind::Class(_) => "class declaration",
            StmtKind::Return(_) => "return",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
        }
    }
}

/// A function declaration; also used for methods and lambdas.
///
/// Shared by reference between the tree and the function values created from
/// it, so calling a function never clones its body.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    /// Function name (`<lambda>` for anonymous functions)
    pub name: String,

    /// Parameter names in order
    pub params: Vec<String>,

    /// Body statements
    pub body: Vec<Stmt>,

    /// Where the declaration begins
    pub span: Span,
}

impl Drop for FunctionDecl {
    fn drop(&mut self) {
        let body = std::mem::take(&mut self.body);
        ensure_sufficient_stack(|| dismantle(body));
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Class name
    pub name: String,

    /// Methods in declaration order
    pub methods: Vec<Rc<FunctionDecl>>,
}

// ═══════════════════════════════════════════════════════════════════════
// Teardown
// ═══════════════════════════════════════════════════════════════════════

/// Drop a statement list without recursing once per nesting level.
///
/// Nodes are moved onto explicit worklists and their children detached
/// before each node is freed, so `if (a) if (b) ...` nested a hundred
/// thousand deep is released in constant native stack.
fn dismantle(statements: Vec<Stmt>) {
    let mut stmts = statements;
    let mut exprs = Vec::new();
    loop {
        if let Some(stmt) = stmts.pop() {
            stmt.kind.detach(&mut stmts, &mut exprs);
        } else if let Some(expr) = exprs.pop() {
            expr.kind.detach(&mut exprs);
        } else {
            break;
        }
    }
}

impl StmtKind {
    fn detach(self, stmts: &mut Vec<Stmt>, exprs: &mut Vec<Expr>) {
        match self {
            StmtKind::Expression(expr) => exprs.push(expr),
            StmtKind::VarDecl { initializer, .. } => exprs.extend(initializer),
            StmtKind::Block(body) => stmts.extend(body),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                exprs.push(condition);
                stmts.push(*then_branch);
                stmts.extend(else_branch.map(|b| *b));
            }
            StmtKind::While { condition, body } => {
                exprs.push(condition);
                stmts.push(*body);
            }
            StmtKind::For {
                init,
                condition,
                increment,
                body,
            } => {
                stmts.extend(init.map(|b| *b));
                exprs.extend(condition);
                exprs.extend(increment);
                stmts.push(*body);
            }
            StmtKind::Foreach { iterable, body, .. } => {
                exprs.push(iterable);
                stmts.push(*body);
            }
            StmtKind::Return(value) => exprs.extend(value),
            // Function bodies are released by `FunctionDecl`'s own drop
            StmtKind::Function(_) | StmtKind::Class(_) | StmtKind::Break | StmtKind::Continue => {}
        }
    }
}

impl ExprKind {
    fn detach(self, exprs: &mut Vec<Expr>) {
        match self {
            ExprKind::Unary { operand, .. } | ExprKind::Grouping(operand) => exprs.push(*operand),
            ExprKind::Binary { left, right, .. } | ExprKind::Logical { left, right, .. } => {
                exprs.push(*left);
                exprs.push(*right);
            }
            ExprKind::Assign { target, value } => {
                match target {
                    AssignTarget::Identifier(_) => {}
                    AssignTarget::Member { object, .. } => exprs.push(*object),
                    AssignTarget::Index { object, index } => {
                        exprs.push(*object);
                        exprs.push(*index);
                    }
                }
                exprs.push(*value);
            }
            ExprKind::Call { callee, args } => {
                exprs.push(*callee);
                exprs.extend(args);
            }
            ExprKind::Array(items) => exprs.extend(items),
            ExprKind::Object(entries) => exprs.extend(entries.into_iter().map(|(_, value)| value)),
            ExprKind::Member { object, .. } => exprs.push(*object),
            ExprKind::Index { object, index } => {
                exprs.push(*object);
                exprs.push(*index);
            }
            ExprKind::Number(_)
            | ExprKind::String(_)
            | ExprKind::Boolean(_)
            | ExprKind::Null
            | ExprKind::Undefined
            | ExprKind::Identifier(_)
            | ExprKind::Lambda(_) => {}
        }
    }
}

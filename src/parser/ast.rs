// AST definitions for Gordian scripts

use std::sync::Arc;

use crate::interpreter::errors::ScriptError;

/// A parsed statement list, shared so that threads and callables can hold it
pub type Block = Arc<[Stmt]>;

/// A whole parsed script
#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Block,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    And,
    Or,
    // Relational
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
    Ne,
    // String concatenation (a `+` chain containing a string literal)
    Concat,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Ge => ">=",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Concat | BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }

    pub fn is_additive(self) -> bool {
        matches!(self, BinOp::Add | BinOp::Sub)
    }

    pub fn is_multiplicative(self) -> bool {
        matches!(self, BinOp::Mul | BinOp::Div | BinOp::Mod)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,  // -x
    Plus, // +x
    Not,  // !x
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
    List(Vec<Expr>),
    Variable(String),
    /// `name(args)` resolved against value-returning callables
    Call {
        name: String,
        args: Vec<Expr>,
    },
    /// `object.name`
    Member {
        object: Box<Expr>,
        name: String,
    },
    /// `object.name(args)`
    MethodCall {
        object: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    /// `target[index]`
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    /// `new Class(args)`
    New {
        class: String,
        args: Vec<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

/// Something a statement can assign to or delete
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    Name(String),
    Member { object: Expr, name: String },
}

/// The target of a call statement
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    Name(String),
    Method { object: Expr, name: String },
}

/// One `if` / `elseif` / `else` arm; `else` has no condition
#[derive(Debug, Clone)]
pub struct Branch {
    pub condition: Option<Expr>,
    pub body: Block,
}

/// A statement with the source line it starts on
#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub line: usize,
}

impl Stmt {
    pub fn new(kind: StmtKind, line: usize) -> Self {
        Stmt { kind, line }
    }
}

/// Statement nodes
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// `place = value;`
    Assign { place: Place, value: Expr },
    /// `place += value;` and friends
    Compound { place: Place, op: BinOp, value: Expr },
    /// `place++;` / `place--;`
    Step { place: Place, delta: f64 },
    /// `del place;`
    Delete(Place),
    /// `make name;`
    Make(String),
    /// `name(args);` / `object.name(args);`
    Call { callee: Callee, args: Vec<Expr> },
    /// `return expr;` / `return;`
    Return(Option<Expr>),
    If { branches: Vec<Branch> },
    While { condition: Expr, body: Block },
    For { count: Expr, body: Block },
    Count {
        name: String,
        from: Expr,
        to: Expr,
        body: Block,
    },
    Try { body: Block, handler: Option<Block> },
    Thread { body: Block },
    Def {
        name: String,
        params: Vec<String>,
        body: Block,
    },
    Class {
        name: String,
        parent: Option<Expr>,
        body: Block,
    },
    /// A statement that failed to parse; raises its error when executed
    Invalid(ScriptError),
}

/// Whether a callable body textually contains `return`, nested blocks included.
pub fn contains_return(body: &[Stmt]) -> bool {
    body.iter().any(|stmt| match &stmt.kind {
        StmtKind::Return(_) => true,
        StmtKind::If { branches } => branches.iter().any(|b| contains_return(&b.body)),
        StmtKind::While { body, .. }
        | StmtKind::For { body, .. }
        | StmtKind::Count { body, .. }
        | StmtKind::Thread { body } => contains_return(body),
        StmtKind::Try { body, handler } => {
            contains_return(body) || handler.as_deref().is_some_and(contains_return)
        }
        StmtKind::Def { body, .. } | StmtKind::Class { body, .. } => contains_return(body),
        _ => false,
    })
}

/// Arities of the `def construct(...)` overloads declared at the top of a class body.
pub fn constructor_arities(body: &[Stmt], constructor: &str) -> Vec<usize> {
    body.iter()
        .filter_map(|stmt| match &stmt.kind {
            StmtKind::Def { name, params, .. } if name == constructor => Some(params.len()),
            _ => None,
        })
        .collect()
}

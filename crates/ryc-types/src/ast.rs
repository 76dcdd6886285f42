//! AST node types for the ryc language.
//!
//! Every node carries a [`Span`] for error reporting.
//! Recursive expression variants are boxed; function declarations are
//! reference-counted so closures can share them without cloning bodies.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use crate::numeric::{ArithOp, Number};
use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete program: top-level statements run in the global scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// `{ stmts... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    FuncDecl(Rc<FuncDecl>),
    Return(ReturnStmt),
    Break(Span),
    Continue(Span),
    Block(Block),
    Expr(ExprStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::VarDecl(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::FuncDecl(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
            Stmt::Block(b) => b.span,
            Stmt::Expr(s) => s.span,
        }
    }
}

/// `var|const name: Type[[size]] [= init];`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Ident,
    pub ty: TypeAnnotation,
    pub init: Option<Expr>,
    pub is_const: bool,
    pub span: Span,
}

/// `if (cond) { ... } [else { ... } | else if ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub span: Span,
}

/// The else branch of an if statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    /// `else if cond { ... }`
    ElseIf(Box<IfStmt>),
    /// `else { ... }`
    Block(Block),
}

/// `while (cond) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for (init; cond; update) { ... }`; every header part may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<ForInit>>,
    pub condition: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

/// The init clause of a `for` header.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expr(Expr),
}

/// `func name(var p: T, ...) -> R { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    /// `void` when the `-> Type` clause is omitted.
    pub return_type: TypeAnnotation,
    pub body: Block,
    pub span: Span,
}

/// A function parameter: `var name: Type[[]]`
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeAnnotation,
    pub span: Span,
}

/// `return [expr];`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// An expression used as a statement: `f(x);`
#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression node. Uses `Box` for recursive variants.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    /// `42`, `3.14`
    NumberLit(Number),
    /// `"hello"` (escapes already processed)
    StringLit(String),
    /// `'a'`
    CharLit(u8),
    /// `true` / `false`
    BoolLit(bool),
    /// `null`
    NullLit,
    /// `{a, b, c}`
    ArrayLit(Vec<Expr>),

    // ── Names, access & calls ──
    Identifier(String),
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `callee(args...)`
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `static_cast<T>(expr)`
    Cast {
        target: TypeAnnotation,
        expr: Box<Expr>,
    },

    // ── Operators ──
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `-x`, `+x`, `!x`, `*x`, `&x`
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `++x`, `x--`, ...
    Update {
        op: UpdateOp,
        prefix: bool,
        target: Box<Expr>,
    },
    /// `target = value` (right-associative)
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

// ── Binary Operators ──────────────────────────────────────────────────────────

/// Binary operators (in precedence order, lowest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Comparison
    Eq,
    NotEq,
    Greater,
    Less,
    GreaterEq,
    LessEq,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    /// Returns the operator symbol for error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "||",
            BinOp::And => "&&",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Greater => ">",
            BinOp::Less => "<",
            BinOp::GreaterEq => ">=",
            BinOp::LessEq => "<=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }

    /// The kernel operator for arithmetic operators.
    pub fn arith(&self) -> Option<ArithOp> {
        match self {
            BinOp::Add => Some(ArithOp::Add),
            BinOp::Sub => Some(ArithOp::Sub),
            BinOp::Mul => Some(ArithOp::Mul),
            BinOp::Div => Some(ArithOp::Div),
            BinOp::Mod => Some(ArithOp::Rem),
            _ => None,
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq
                | BinOp::NotEq
                | BinOp::Greater
                | BinOp::Less
                | BinOp::GreaterEq
                | BinOp::LessEq
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinOp::Or | BinOp::And)
    }

    /// Whether `ord` satisfies this comparison operator.
    pub fn test_ordering(&self, ord: Ordering) -> bool {
        match self {
            BinOp::Eq => ord == Ordering::Equal,
            BinOp::NotEq => ord != Ordering::Equal,
            BinOp::Greater => ord == Ordering::Greater,
            BinOp::Less => ord == Ordering::Less,
            BinOp::GreaterEq => ord != Ordering::Less,
            BinOp::LessEq => ord != Ordering::Greater,
            _ => false,
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prefix operators that do not write back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `!x`
    Not,
    /// `*x`
    Deref,
    /// `&x`
    AddrOf,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
        }
    }
}

/// `++` / `--`, prefix or postfix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Inc => "++",
            UpdateOp::Dec => "--",
        }
    }

    pub fn arith(&self) -> ArithOp {
        match self {
            UpdateOp::Inc => ArithOp::Add,
            UpdateOp::Dec => ArithOp::Sub,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Type Annotations
// ══════════════════════════════════════════════════════════════════════════════

/// A built-in type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeName {
    Int,
    Float,
    Bool,
    String,
    Char,
    Auto,
    Void,
}

impl TypeName {
    /// Map a type keyword to its type name.
    pub fn from_keyword(word: &str) -> Option<TypeName> {
        Some(match word {
            "int" => TypeName::Int,
            "float" => TypeName::Float,
            "bool" => TypeName::Bool,
            "string" => TypeName::String,
            "char" => TypeName::Char,
            "auto" => TypeName::Auto,
            "void" => TypeName::Void,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TypeName::Int => "int",
            TypeName::Float => "float",
            TypeName::Bool => "bool",
            TypeName::String => "string",
            TypeName::Char => "char",
            TypeName::Auto => "auto",
            TypeName::Void => "void",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type annotation: `int`, `float[]`, `char[16]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub base: TypeName,
    pub array: Option<ArraySuffix>,
    pub span: Span,
}

/// Largest size accepted in `T[N]`.
pub const MAX_ARRAY_SIZE: usize = 1 << 20;

/// The `[]` / `[N]` suffix of an array type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySuffix {
    pub size: Option<usize>,
}

impl TypeAnnotation {
    pub fn scalar(base: TypeName, span: Span) -> Self {
        Self {
            base,
            array: None,
            span,
        }
    }

    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    /// Declared element count, for `T[N]`.
    pub fn size(&self) -> Option<usize> {
        self.array.and_then(|a| a.size)
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        match self.array {
            Some(ArraySuffix { size: Some(n) }) => write!(f, "[{n}]"),
            Some(ArraySuffix { size: None }) => f.write_str("[]"),
            None => Ok(()),
        }
    }
}

//! The untyped syntax tree produced by the parser.
//!
//! The tree mirrors surface syntax: type annotations are still raw
//! identifier strings, and nothing carries a resolved type yet. The
//! analyzer lowers this tree into the typed IR; the evaluator walks it
//! directly.
//!
//! `LetStmt` and `DefStmt` are split out as structs because object
//! literals reuse them for fields and methods. A `DefStmt` keeps its
//! parameter names and their optional annotations as parallel lists (the
//! analyzer checks the length invariant), and shares its parameter list
//! and body behind `Rc` so a function value can capture them without
//! cloning the subtree.

use std::rc::Rc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

/// A whole compilation unit: the ordered top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
	pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
	Let(LetStmt),
	Def(DefStmt),
	If { condition: Expr, then_body: Vec<Stmt>, else_body: Vec<Stmt> },
	For { name: String, iterable: Expr, body: Vec<Stmt> },
	Return(Option<Expr>),
	Expression(Expr),
	Assignment { target: Expr, value: Expr },
}

/// `LET name (: Type)? (= value)? ;` -- also an object field.
#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
	pub name:      String,
	pub type_name: Option<String>,
	pub value:     Option<Expr>,
}

/// `DEF name(params) (: Type)? DO body END` -- also an object method.
#[derive(Debug, Clone, PartialEq)]
pub struct DefStmt {
	pub name:            String,
	pub parameters:      Rc<Vec<String>>,
	pub parameter_types: Vec<Option<String>>,
	pub return_type:     Option<String>,
	pub body:            Rc<Vec<Stmt>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	Literal(Literal),
	Group(Box<Expr>),
	Binary { operator: String, left: Box<Expr>, right: Box<Expr> },
	Variable(String),
	Property { receiver: Box<Expr>, name: String },
	Function { name: String, arguments: Vec<Expr> },
	Method { receiver: Box<Expr>, name: String, arguments: Vec<Expr> },
	Object(ObjectExpr),
}

/// `OBJECT name? DO fields methods END`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpr {
	pub name:    Option<String>,
	pub fields:  Vec<LetStmt>,
	pub methods: Vec<DefStmt>,
}

/// A decoded literal value. Signs are consumed at lex time, so a negative
/// number arrives here already negative; strings and characters arrive
/// unquoted and unescaped.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
	Nil,
	Boolean(bool),
	Integer(BigInt),
	Decimal(BigDecimal),
	Character(char),
	String(String),
}

//! The typed intermediate representation produced by the analyzer.
//!
//! Same shape as the AST with the open questions closed: every
//! expression carries its resolved type, declarations carry resolved
//! types instead of raw annotation names, and assignment is split into
//! its variable and property forms so a consumer never re-inspects the
//! target expression. A code generator can walk this tree without ever
//! touching a scope.

use crate::{analyzer::types::Type, ast::Literal};

#[derive(Debug, Clone, PartialEq)]
pub struct Source {
	pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
	Let(LetStmt),
	Def(DefStmt),
	If { condition: Expr, then_body: Vec<Stmt>, else_body: Vec<Stmt> },
	For { name: String, ty: Type, iterable: Expr, body: Vec<Stmt> },
	/// A bare `RETURN;` is materialized as a NIL literal here.
	Return { value: Expr },
	Expression(Expr),
	Assignment(Assignment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetStmt {
	pub name:  String,
	pub ty:    Type,
	pub value: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefStmt {
	pub name:       String,
	pub parameters: Vec<Parameter>,
	pub returns:    Type,
	pub body:       Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
	pub name: String,
	pub ty:   Type,
}

/// Assignments split by the shape of their target.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
	Variable { target: Variable, value: Expr },
	Property { target: Property, value: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
	Literal { value: Literal, ty: Type },
	Group(Box<Expr>),
	Binary { operator: String, left: Box<Expr>, right: Box<Expr>, ty: Type },
	Variable(Variable),
	Property(Property),
	Function { name: String, arguments: Vec<Expr>, ty: Type },
	Method { receiver: Box<Expr>, name: String, arguments: Vec<Expr>, ty: Type },
	Object(ObjectExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
	pub name: String,
	pub ty:   Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
	pub receiver: Box<Expr>,
	pub name:     String,
	pub ty:       Type,
}

/// An object literal together with the `Type::Object` it constructs.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpr {
	pub name:    Option<String>,
	pub fields:  Vec<LetStmt>,
	pub methods: Vec<DefStmt>,
	pub ty:      Type,
}

impl Expr {
	/// The resolved type of this expression. Groups pass the inner type
	/// through; for call forms this is the return type.
	pub fn ty(&self) -> &Type {
		match self {
			Expr::Literal { ty, .. }
			| Expr::Binary { ty, .. }
			| Expr::Function { ty, .. }
			| Expr::Method { ty, .. } => ty,
			Expr::Group(inner) => inner.ty(),
			Expr::Variable(variable) => &variable.ty,
			Expr::Property(property) => &property.ty,
			Expr::Object(object) => &object.ty,
		}
	}
}

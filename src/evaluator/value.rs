//! Runtime values.
//!
//! Three families: primitives (the literal shapes plus lists), callables,
//! and objects. Numbers are arbitrary precision throughout -- integers
//! are `BigInt`, decimals are `BigDecimal` with the scale the literal was
//! written at.
//!
//! A callable is either a native host closure or a declared function that
//! captured the scope it was defined in; the evaluator runs declared
//! bodies itself. An object is its member scope plus an optional name,
//! and that scope is shared by reference -- which is also what object
//! equality means.

use std::{cmp::Ordering, fmt::{self, Debug, Display}, rc::Rc};

use anyhow::anyhow;
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use num_traits::Zero;

use crate::{ast::Stmt, error::evaluator::EvaluateError, scope::Scope};

#[derive(Debug, Clone)]
pub enum RuntimeValue {
	Primitive(Primitive),
	Function(FunctionValue),
	Object(ObjectValue),
}

/// The primitive shapes: the literal values plus lists built by the
/// standard environment.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
	Nil,
	Boolean(bool),
	Integer(BigInt),
	Decimal(BigDecimal),
	Character(char),
	String(String),
	List(Vec<RuntimeValue>),
}

/// A native function takes its already-evaluated arguments and may fail
/// with an evaluate error of its own.
pub type NativeFunction = Rc<dyn Fn(Vec<RuntimeValue>) -> Result<RuntimeValue, EvaluateError>>;

#[derive(Clone)]
pub struct FunctionValue {
	pub name: String,
	pub body: FunctionBody,
}

#[derive(Clone)]
pub enum FunctionBody {
	Native(NativeFunction),
	Declared(DeclaredFunction),
}

#[derive(Clone)]
pub struct DeclaredFunction {
	pub parameters: Rc<Vec<String>>,
	pub body:       Rc<Vec<Stmt>>,
	/// The scope the function was defined in; each call runs in a fresh
	/// child of it.
	pub closure:    Scope<RuntimeValue>,
	/// Methods receive the receiver as a hidden first argument bound to
	/// `this`.
	pub binds_this: bool,
}

/// An object literal's runtime form. The member scope has no parent and
/// is aliased, not copied, so mutating a property through one handle is
/// visible through every other.
#[derive(Debug, Clone)]
pub struct ObjectValue {
	pub name:  Option<String>,
	pub scope: Scope<RuntimeValue>,
}

impl PartialEq for RuntimeValue {
	/// Primitives compare structurally; functions and objects compare by
	/// identity.
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(RuntimeValue::Primitive(left), RuntimeValue::Primitive(right)) => left == right,
			(RuntimeValue::Function(left), RuntimeValue::Function(right)) => left.ptr_eq(right),
			(RuntimeValue::Object(left), RuntimeValue::Object(right)) => left == right,
			_ => false,
		}
	}
}

impl PartialEq for ObjectValue {
	fn eq(&self, other: &Self) -> bool { self.name == other.name && self.scope.ptr_eq(&other.scope) }
}

impl RuntimeValue {
	pub fn nil() -> Self { RuntimeValue::Primitive(Primitive::Nil) }

	pub fn boolean(value: bool) -> Self { RuntimeValue::Primitive(Primitive::Boolean(value)) }

	pub fn integer(value: impl Into<BigInt>) -> Self {
		RuntimeValue::Primitive(Primitive::Integer(value.into()))
	}

	pub fn string(value: impl Into<String>) -> Self {
		RuntimeValue::Primitive(Primitive::String(value.into()))
	}

	/// A short name for error messages.
	pub fn kind(&self) -> &'static str {
		match self {
			RuntimeValue::Primitive(primitive) => primitive.kind(),
			RuntimeValue::Function(_) => "Function",
			RuntimeValue::Object(_) => "Object",
		}
	}

	pub fn as_primitive(&self) -> Option<&Primitive> {
		match self {
			RuntimeValue::Primitive(primitive) => Some(primitive),
			_ => None,
		}
	}

	pub fn as_boolean(&self) -> Option<bool> {
		match self {
			RuntimeValue::Primitive(Primitive::Boolean(value)) => Some(*value),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[RuntimeValue]> {
		match self {
			RuntimeValue::Primitive(Primitive::List(values)) => Some(values),
			_ => None,
		}
	}

	pub fn as_function(&self) -> Option<&FunctionValue> {
		match self {
			RuntimeValue::Function(function) => Some(function),
			_ => None,
		}
	}

	pub fn as_object(&self) -> Option<&ObjectValue> {
		match self {
			RuntimeValue::Object(object) => Some(object),
			_ => None,
		}
	}

	pub fn is_string(&self) -> bool {
		matches!(self, RuntimeValue::Primitive(Primitive::String(_)))
	}
}

impl Primitive {
	pub fn kind(&self) -> &'static str {
		match self {
			Primitive::Nil => "Nil",
			Primitive::Boolean(_) => "Boolean",
			Primitive::Integer(_) => "Integer",
			Primitive::Decimal(_) => "Decimal",
			Primitive::Character(_) => "Character",
			Primitive::String(_) => "String",
			Primitive::List(_) => "List",
		}
	}

	/// `+ - * /` over same-kind numeric operands. Integer division is
	/// the big-integer quotient; decimal division keeps the larger
	/// operand scale and rounds half-even.
	pub fn numeric(operator: &str, left: &Primitive, right: &Primitive) -> Result<Primitive, EvaluateError> {
		match (left, right) {
			(Primitive::Integer(a), Primitive::Integer(b)) => match operator {
				"+" => Ok(Primitive::Integer(a + b)),
				"-" => Ok(Primitive::Integer(a - b)),
				"*" => Ok(Primitive::Integer(a * b)),
				"/" => {
					if b.is_zero() {
						return Err(EvaluateError::DivisionByZero);
					}
					Ok(Primitive::Integer(a / b))
				}
				_ => Err(anyhow!("unsupported numeric operator '{operator}'").into()),
			},
			(Primitive::Decimal(a), Primitive::Decimal(b)) => match operator {
				"+" => Ok(Primitive::Decimal(a + b)),
				"-" => Ok(Primitive::Decimal(a - b)),
				"*" => Ok(Primitive::Decimal(a * b)),
				"/" => {
					if b.is_zero() {
						return Err(EvaluateError::DivisionByZero);
					}
					let scale = a.fractional_digit_count().max(b.fractional_digit_count());
					Ok(Primitive::Decimal((a / b).with_scale_round(scale, RoundingMode::HalfEven)))
				}
				_ => Err(anyhow!("unsupported numeric operator '{operator}'").into()),
			},
			_ => Err(EvaluateError::UnexpectedType {
				expected: "numeric operands of the same kind",
				received: format!("{} and {}", left.kind(), right.kind()),
			}),
		}
	}

	/// `< <= > >=` over same-kind comparable operands.
	pub fn compare(left: &Primitive, right: &Primitive) -> Result<Ordering, EvaluateError> {
		let ordering = match (left, right) {
			(Primitive::Boolean(a), Primitive::Boolean(b)) => a.cmp(b),
			(Primitive::Integer(a), Primitive::Integer(b)) => a.cmp(b),
			(Primitive::Decimal(a), Primitive::Decimal(b)) => a.cmp(b),
			(Primitive::Character(a), Primitive::Character(b)) => a.cmp(b),
			(Primitive::String(a), Primitive::String(b)) => a.cmp(b),
			_ => {
				return Err(EvaluateError::UnexpectedType {
					expected: "comparable operands of the same kind",
					received: format!("{} and {}", left.kind(), right.kind()),
				});
			}
		};
		Ok(ordering)
	}
}

impl FunctionValue {
	fn ptr_eq(&self, other: &Self) -> bool {
		match (&self.body, &other.body) {
			(FunctionBody::Native(left), FunctionBody::Native(right)) => Rc::ptr_eq(left, right),
			(FunctionBody::Declared(left), FunctionBody::Declared(right)) => {
				Rc::ptr_eq(&left.body, &right.body) && left.closure.ptr_eq(&right.closure)
			}
			_ => false,
		}
	}
}

impl Debug for FunctionValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let body = match &self.body {
			FunctionBody::Native(_) => "native",
			FunctionBody::Declared(_) => "declared",
		};
		f.debug_struct("FunctionValue").field("name", &self.name).field("body", &body).finish()
	}
}

/// The print form used by string concatenation and the `print`/`log`
/// builtins.
impl Display for RuntimeValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RuntimeValue::Primitive(primitive) => write!(f, "{primitive}"),
			RuntimeValue::Function(function) => write!(f, "DEF {}", function.name),
			RuntimeValue::Object(object) => match &object.name {
				Some(name) => write!(f, "OBJECT {name}"),
				None => write!(f, "OBJECT"),
			},
		}
	}
}

impl Display for Primitive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Primitive::Nil => write!(f, "NIL"),
			Primitive::Boolean(value) => write!(f, "{value}"),
			Primitive::Integer(value) => write!(f, "{value}"),
			Primitive::Decimal(value) => write!(f, "{value}"),
			Primitive::Character(value) => write!(f, "{value}"),
			Primitive::String(value) => write!(f, "{value}"),
			Primitive::List(values) => {
				write!(f, "[")?;
				for (index, value) in values.iter().enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{value}")?;
				}
				write!(f, "]")
			}
		}
	}
}

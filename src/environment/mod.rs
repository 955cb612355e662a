//! The standard environment: the names installed into the initial scope
//! of each back half of the pipeline.
//!
//! The pipeline itself never conjures built-ins; callers hand the
//! analyzer and evaluator an already-populated scope, and these two
//! constructors are the stock population. `list` is the one asymmetry:
//! it is variadic, which `Type::Function` cannot express, so it exists
//! only at runtime.

use std::rc::Rc;

use num_bigint::BigInt;

use crate::{
	analyzer::types::{FunctionType, Type},
	error::evaluator::EvaluateError,
	evaluator::value::{FunctionBody, FunctionValue, NativeFunction, Primitive, RuntimeValue},
	scope::Scope,
};

/// The initial runtime scope: `print`, `log`, `list`, and `range`.
pub fn runtime_scope() -> Scope<RuntimeValue> {
	let scope = Scope::new(None);
	define_native(&scope, "print", Rc::new(print));
	define_native(&scope, "log", Rc::new(log));
	define_native(&scope, "list", Rc::new(list));
	define_native(&scope, "range", Rc::new(range));
	scope
}

/// The initial analyzer scope, typing the fixed-arity built-ins.
pub fn analyzer_scope() -> Scope<Type> {
	let scope = Scope::new(None);
	scope.define("print", Type::Function(FunctionType::new(vec![Type::Any], Type::Nil)));
	scope.define("log", Type::Function(FunctionType::new(vec![Type::Any], Type::Any)));
	scope.define("range", Type::Function(FunctionType::new(vec![Type::Integer, Type::Integer], Type::Iterable)));
	scope
}

fn define_native(scope: &Scope<RuntimeValue>, name: &str, native: NativeFunction) {
	let function = FunctionValue { name: name.to_string(), body: FunctionBody::Native(native) };
	scope.define(name, RuntimeValue::Function(function));
}

/// Writes the value's print form, returns NIL.
fn print(arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, EvaluateError> {
	let value = single_argument("print", arguments)?;
	println!("{value}");
	Ok(RuntimeValue::nil())
}

/// Writes the value with a `log: ` prefix and passes it through, so a
/// call composes inside a larger expression.
fn log(arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, EvaluateError> {
	let value = single_argument("log", arguments)?;
	println!("log: {value}");
	Ok(value)
}

/// Wraps the arguments, in order, as a list.
fn list(arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, EvaluateError> {
	Ok(RuntimeValue::Primitive(Primitive::List(arguments)))
}

/// `range(l, r)`: the half-open integer list `[l, r)`.
fn range(arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, EvaluateError> {
	if arguments.len() != 2 {
		return Err(EvaluateError::ArityMismatch {
			name:     "range".to_string(),
			expected: 2,
			received: arguments.len(),
		});
	}
	let low = require_integer(&arguments[0])?;
	let high = require_integer(&arguments[1])?;
	if high < low {
		return Err(EvaluateError::InvalidRange);
	}
	let mut elements = Vec::new();
	let mut current = low.clone();
	while &current < high {
		elements.push(RuntimeValue::Primitive(Primitive::Integer(current.clone())));
		current += 1u32;
	}
	Ok(RuntimeValue::Primitive(Primitive::List(elements)))
}

fn single_argument(name: &str, mut arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, EvaluateError> {
	if arguments.len() != 1 {
		return Err(EvaluateError::ArityMismatch {
			name:     name.to_string(),
			expected: 1,
			received: arguments.len(),
		});
	}
	Ok(arguments.remove(0))
}

fn require_integer(value: &RuntimeValue) -> Result<&BigInt, EvaluateError> {
	match value {
		RuntimeValue::Primitive(Primitive::Integer(value)) => Ok(value),
		other => {
			Err(EvaluateError::UnexpectedType { expected: "an Integer", received: other.kind().to_string() })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn call(name: &str, arguments: Vec<RuntimeValue>) -> Result<RuntimeValue, EvaluateError> {
		let scope = runtime_scope();
		let Some(RuntimeValue::Function(function)) = scope.get(name, true) else {
			panic!("{name} is not installed");
		};
		let FunctionBody::Native(native) = function.body else { panic!("{name} is not native") };
		native(arguments)
	}

	fn int(value: i64) -> RuntimeValue { RuntimeValue::integer(value) }

	#[test]
	fn runtime_scope_installs_the_builtins() {
		let scope = runtime_scope();
		for name in ["print", "log", "list", "range"] {
			assert!(scope.get(name, true).is_some(), "missing builtin {name}");
		}
	}

	#[test]
	fn analyzer_scope_types_the_builtins() {
		let scope = analyzer_scope();
		for name in ["print", "log", "range"] {
			assert!(matches!(scope.get(name, true), Some(Type::Function(_))), "missing builtin {name}");
		}
	}

	#[test]
	fn range_is_half_open() {
		let result = call("range", vec![int(1), int(4)]).unwrap();
		assert_eq!(
			result,
			RuntimeValue::Primitive(Primitive::List(vec![int(1), int(2), int(3)]))
		);
	}

	#[test]
	fn range_accepts_an_empty_span_and_rejects_a_reversed_one() {
		let empty = call("range", vec![int(2), int(2)]).unwrap();
		assert_eq!(empty, RuntimeValue::Primitive(Primitive::List(vec![])));
		assert!(matches!(call("range", vec![int(3), int(2)]), Err(EvaluateError::InvalidRange)));
	}

	#[test]
	fn range_checks_its_arguments() {
		assert!(call("range", vec![int(1)]).is_err());
		assert!(call("range", vec![int(1), RuntimeValue::string("x")]).is_err());
	}

	#[test]
	fn list_wraps_its_arguments_in_order() {
		let result = call("list", vec![int(1), RuntimeValue::string("two")]).unwrap();
		assert_eq!(
			result,
			RuntimeValue::Primitive(Primitive::List(vec![int(1), RuntimeValue::string("two")]))
		);
	}

	#[test]
	fn log_passes_its_argument_through() {
		assert_eq!(call("log", vec![int(7)]).unwrap(), int(7));
		assert!(call("log", vec![]).is_err());
	}

	#[test]
	fn print_returns_nil() {
		assert_eq!(call("print", vec![int(7)]).unwrap(), RuntimeValue::nil());
		assert!(call("print", vec![int(1), int(2)]).is_err());
	}
}

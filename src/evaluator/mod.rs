//! Tree-walking evaluation: untyped AST in, runtime value out.
//!
//! The evaluator does not depend on a prior analyzer pass; it re-checks
//! everything dynamically. Its one piece of state is the current scope.
//! Every lexical block -- an IF branch, each FOR iteration, a function or
//! method body -- runs in a fresh child scope, and the previous scope is
//! restored on every exit path, errors included.
//!
//! `RETURN` is control flow, not an error. Executing a statement yields a
//! `Flow`: either a plain value or a return value unwinding toward the
//! enclosing call. Call sites collapse the return form; the top level
//! turns an escaped return into an evaluate error. Since unwinding is an
//! ordinary value, the scope save/restore around a block needs no
//! special casing to survive it.
//!
//! Declared functions capture the scope they were defined in, so a call
//! resolves names against the definition site, and a function sees its
//! own binding for recursion. Methods are the same callables with a
//! hidden leading argument bound to `this` and the object scope as their
//! closure.

pub mod value;

use std::{collections::HashSet, mem};

use crate::{
	ast::{DefStmt, Expr, LetStmt, Literal, ObjectExpr, Source, Stmt},
	error::evaluator::EvaluateError,
	evaluator::value::{
		DeclaredFunction, FunctionBody, FunctionValue, ObjectValue, Primitive, RuntimeValue,
	},
	scope::Scope,
};

/// What executing a statement produced: a plain value, or a `RETURN`
/// unwinding toward the enclosing call.
enum Flow {
	Value(RuntimeValue),
	Return(RuntimeValue),
}

pub struct Evaluator {
	scope: Scope<RuntimeValue>,
}

impl Evaluator {
	/// The initial scope supplies the built-in values; see
	/// `environment::runtime_scope`.
	pub fn new(scope: Scope<RuntimeValue>) -> Self { Self { scope } }

	/// Evaluates a whole source; the result is the value of the last
	/// top-level statement, NIL for an empty source.
	pub fn evaluate(&mut self, source: &Source) -> Result<RuntimeValue, EvaluateError> {
		match self.eval_block(&source.statements)? {
			Flow::Value(value) => Ok(value),
			Flow::Return(_) => Err(EvaluateError::ReturnOutsideFunction),
		}
	}

	/// Runs statements in the current scope; the block's value is the
	/// last statement's value.
	fn eval_block(&mut self, statements: &[Stmt]) -> Result<Flow, EvaluateError> {
		let mut value = RuntimeValue::nil();
		for statement in statements {
			match self.eval_stmt(statement)? {
				Flow::Value(result) => value = result,
				Flow::Return(result) => return Ok(Flow::Return(result)),
			}
		}
		Ok(Flow::Value(value))
	}

	/// Runs a block with `scope` swapped in, restoring the previous
	/// scope on every exit path, including errors.
	fn eval_block_in(&mut self, statements: &[Stmt], scope: Scope<RuntimeValue>) -> Result<Flow, EvaluateError> {
		let previous = mem::replace(&mut self.scope, scope);
		let result = self.eval_block(statements);
		self.scope = previous;
		result
	}

	fn eval_stmt(&mut self, statement: &Stmt) -> Result<Flow, EvaluateError> {
		match statement {
			Stmt::Let(let_stmt) => self.eval_let(let_stmt),
			Stmt::Def(def) => self.eval_def(def),
			Stmt::If { condition, then_body, else_body } => self.eval_if(condition, then_body, else_body),
			Stmt::For { name, iterable, body } => self.eval_for(name, iterable, body),
			Stmt::Return(value) => {
				let value = match value {
					Some(value) => self.eval_expr(value)?,
					None => RuntimeValue::nil(),
				};
				Ok(Flow::Return(value))
			}
			Stmt::Expression(expression) => Ok(Flow::Value(self.eval_expr(expression)?)),
			Stmt::Assignment { target, value } => self.eval_assignment(target, value),
		}
	}

	fn eval_let(&mut self, let_stmt: &LetStmt) -> Result<Flow, EvaluateError> {
		if self.scope.get(&let_stmt.name, true).is_some() {
			return Err(EvaluateError::AlreadyDefined(let_stmt.name.clone()));
		}
		let value = match &let_stmt.value {
			Some(value) => self.eval_expr(value)?,
			None => RuntimeValue::nil(),
		};
		self.scope.define(&let_stmt.name, value.clone());
		Ok(Flow::Value(value))
	}

	/// The function value captures the current scope, so later calls --
	/// including recursive ones -- resolve names against the definition
	/// site.
	fn eval_def(&mut self, def: &DefStmt) -> Result<Flow, EvaluateError> {
		if self.scope.get(&def.name, true).is_some() {
			return Err(EvaluateError::AlreadyDefined(def.name.clone()));
		}
		check_distinct_parameters(def)?;
		let function = FunctionValue {
			name: def.name.clone(),
			body: FunctionBody::Declared(DeclaredFunction {
				parameters: def.parameters.clone(),
				body:       def.body.clone(),
				closure:    self.scope.clone(),
				binds_this: false,
			}),
		};
		let value = RuntimeValue::Function(function);
		self.scope.define(&def.name, value.clone());
		Ok(Flow::Value(value))
	}

	/// The chosen branch runs in a child scope; the statement's value is
	/// the branch's value.
	fn eval_if(
		&mut self,
		condition: &Expr,
		then_body: &[Stmt],
		else_body: &[Stmt],
	) -> Result<Flow, EvaluateError> {
		let condition = self.eval_boolean_operand(condition)?;
		let branch = if condition { then_body } else { else_body };
		self.eval_block_in(branch, self.scope.child())
	}

	/// Each iteration gets its own child scope with the loop variable
	/// freshly bound; the loop's value is NIL.
	fn eval_for(&mut self, name: &str, iterable: &Expr, body: &[Stmt]) -> Result<Flow, EvaluateError> {
		let iterable = self.eval_expr(iterable)?;
		let elements = match iterable.as_list() {
			Some(elements) => elements.to_vec(),
			None => return Err(unexpected_type("a List", &iterable)),
		};
		for element in elements {
			let iteration_scope = self.scope.child();
			iteration_scope.define(name, element);
			if let Flow::Return(value) = self.eval_block_in(body, iteration_scope)? {
				return Ok(Flow::Return(value));
			}
		}
		Ok(Flow::Value(RuntimeValue::nil()))
	}

	/// The target must already be bound -- assignment never declares.
	/// The existence check runs before the value is evaluated.
	fn eval_assignment(&mut self, target: &Expr, value: &Expr) -> Result<Flow, EvaluateError> {
		match target {
			Expr::Variable(name) => {
				if self.scope.get(name, false).is_none() {
					return Err(EvaluateError::UndefinedVariable(name.clone()));
				}
				let value = self.eval_expr(value)?;
				self.scope.set(name, value.clone());
				Ok(Flow::Value(value))
			}
			Expr::Property { receiver, name } => {
				let receiver = self.eval_expr(receiver)?;
				let scope = require_object(&receiver)?.scope.clone();
				if scope.get(name, true).is_none() {
					return Err(EvaluateError::UndefinedProperty(name.clone()));
				}
				let value = self.eval_expr(value)?;
				scope.set(name, value.clone());
				Ok(Flow::Value(value))
			}
			_ => Err(EvaluateError::InvalidAssignmentTarget),
		}
	}

	fn eval_expr(&mut self, expression: &Expr) -> Result<RuntimeValue, EvaluateError> {
		match expression {
			Expr::Literal(literal) => Ok(eval_literal(literal)),
			Expr::Group(inner) => self.eval_expr(inner),
			Expr::Binary { operator, left, right } => self.eval_binary(operator, left, right),
			Expr::Variable(name) => {
				self.scope.get(name, false).ok_or_else(|| EvaluateError::UndefinedVariable(name.clone()))
			}
			Expr::Property { receiver, name } => {
				let receiver = self.eval_expr(receiver)?;
				require_object(&receiver)?
					.scope
					.get(name, true)
					.ok_or_else(|| EvaluateError::UndefinedProperty(name.clone()))
			}
			Expr::Function { name, arguments } => self.eval_function(name, arguments),
			Expr::Method { receiver, name, arguments } => self.eval_method(receiver, name, arguments),
			Expr::Object(object) => self.eval_object(object),
		}
	}

	fn eval_binary(&mut self, operator: &str, left: &Expr, right: &Expr) -> Result<RuntimeValue, EvaluateError> {
		// AND/OR first: the right operand must not run when the left
		// already decides the result.
		match operator {
			"AND" => {
				if !self.eval_boolean_operand(left)? {
					return Ok(RuntimeValue::boolean(false));
				}
				return Ok(RuntimeValue::boolean(self.eval_boolean_operand(right)?));
			}
			"OR" => {
				if self.eval_boolean_operand(left)? {
					return Ok(RuntimeValue::boolean(true));
				}
				return Ok(RuntimeValue::boolean(self.eval_boolean_operand(right)?));
			}
			_ => {}
		}
		let left = self.eval_expr(left)?;
		let right = self.eval_expr(right)?;
		match operator {
			// As soon as either side is a string, `+` concatenates print
			// forms; NIL concatenates as the literal text `NIL`.
			"+" => {
				if left.is_string() || right.is_string() {
					return Ok(RuntimeValue::string(format!("{left}{right}")));
				}
				eval_numeric(operator, &left, &right)
			}
			"-" | "*" | "/" => eval_numeric(operator, &left, &right),
			"==" | "!=" => eval_equality(operator == "==", &left, &right),
			"<" | "<=" | ">" | ">=" => {
				let ordering = Primitive::compare(require_primitive(&left)?, require_primitive(&right)?)?;
				let result = match operator {
					"<" => ordering.is_lt(),
					"<=" => ordering.is_le(),
					">" => ordering.is_gt(),
					_ => ordering.is_ge(),
				};
				Ok(RuntimeValue::boolean(result))
			}
			_ => Err(anyhow::anyhow!("parser produced unknown operator '{operator}'").into()),
		}
	}

	fn eval_boolean_operand(&mut self, expression: &Expr) -> Result<bool, EvaluateError> {
		let value = self.eval_expr(expression)?;
		value.as_boolean().ok_or_else(|| unexpected_type("a Boolean", &value))
	}

	fn eval_function(&mut self, name: &str, arguments: &[Expr]) -> Result<RuntimeValue, EvaluateError> {
		let value =
			self.scope.get(name, false).ok_or_else(|| EvaluateError::UndefinedFunction(name.to_string()))?;
		let function = match value.as_function() {
			Some(function) => function.clone(),
			None => return Err(unexpected_type("a Function", &value)),
		};
		let arguments = self.eval_arguments(arguments)?;
		self.call(&function, arguments)
	}

	/// The receiver is prepended as a hidden first argument; the
	/// callable binds it to `this`.
	fn eval_method(
		&mut self,
		receiver: &Expr,
		name: &str,
		arguments: &[Expr],
	) -> Result<RuntimeValue, EvaluateError> {
		let receiver = self.eval_expr(receiver)?;
		let value = require_object(&receiver)?
			.scope
			.get(name, true)
			.ok_or_else(|| EvaluateError::UndefinedMethod(name.to_string()))?;
		let method = match value.as_function() {
			Some(function) => function.clone(),
			None => return Err(unexpected_type("a Function", &value)),
		};
		let mut invocation = Vec::with_capacity(arguments.len() + 1);
		invocation.push(receiver);
		invocation.extend(self.eval_arguments(arguments)?);
		self.call(&method, invocation)
	}

	/// Arguments evaluate strictly left to right before the callee runs.
	fn eval_arguments(&mut self, arguments: &[Expr]) -> Result<Vec<RuntimeValue>, EvaluateError> {
		arguments.iter().map(|argument| self.eval_expr(argument)).collect()
	}

	/// Invokes a callable. A declared body runs in a fresh child of the
	/// captured scope; the caller's scope is restored on every exit
	/// path, and a `RETURN` collapses into the call's value here.
	pub(crate) fn call(
		&mut self,
		function: &FunctionValue,
		arguments: Vec<RuntimeValue>,
	) -> Result<RuntimeValue, EvaluateError> {
		let declared = match &function.body {
			FunctionBody::Native(native) => return native(arguments),
			FunctionBody::Declared(declared) => declared,
		};
		let hidden = usize::from(declared.binds_this);
		if arguments.len() != declared.parameters.len() + hidden {
			return Err(EvaluateError::ArityMismatch {
				name:     function.name.clone(),
				expected: declared.parameters.len(),
				received: arguments.len().saturating_sub(hidden),
			});
		}
		let call_scope = declared.closure.child();
		let mut arguments = arguments.into_iter();
		if declared.binds_this {
			if let Some(receiver) = arguments.next() {
				call_scope.define("this", receiver);
			}
		}
		for (name, value) in declared.parameters.iter().zip(arguments) {
			call_scope.define(name, value);
		}
		match self.eval_block_in(&declared.body, call_scope)? {
			Flow::Return(value) => Ok(value),
			// Without a RETURN, a method yields its body's last value
			// and a function yields NIL.
			Flow::Value(value) => Ok(if declared.binds_this { value } else { RuntimeValue::nil() }),
		}
	}

	/// Builds the object scope -- parentless, so members are reachable
	/// only through the receiver -- defining fields first, then methods
	/// closing over it.
	fn eval_object(&mut self, object: &ObjectExpr) -> Result<RuntimeValue, EvaluateError> {
		let object_scope: Scope<RuntimeValue> = Scope::new(None);
		for field in &object.fields {
			if object_scope.get(&field.name, true).is_some() {
				return Err(EvaluateError::AlreadyDefined(field.name.clone()));
			}
			// Field initializers evaluate in the enclosing scope.
			let value = match &field.value {
				Some(value) => self.eval_expr(value)?,
				None => RuntimeValue::nil(),
			};
			object_scope.define(&field.name, value);
		}
		for method in &object.methods {
			check_distinct_parameters(method)?;
			if object_scope.get(&method.name, true).is_some() {
				return Err(EvaluateError::AlreadyDefined(method.name.clone()));
			}
			let function = FunctionValue {
				name: method.name.clone(),
				body: FunctionBody::Declared(DeclaredFunction {
					parameters: method.parameters.clone(),
					body:       method.body.clone(),
					closure:    object_scope.clone(),
					binds_this: true,
				}),
			};
			object_scope.define(&method.name, RuntimeValue::Function(function));
		}
		Ok(RuntimeValue::Object(ObjectValue { name: object.name.clone(), scope: object_scope }))
	}
}

fn eval_literal(literal: &Literal) -> RuntimeValue {
	RuntimeValue::Primitive(match literal {
		Literal::Nil => Primitive::Nil,
		Literal::Boolean(value) => Primitive::Boolean(*value),
		Literal::Integer(value) => Primitive::Integer(value.clone()),
		Literal::Decimal(value) => Primitive::Decimal(value.clone()),
		Literal::Character(value) => Primitive::Character(*value),
		Literal::String(value) => Primitive::String(value.clone()),
	})
}

fn eval_numeric(
	operator: &str,
	left: &RuntimeValue,
	right: &RuntimeValue,
) -> Result<RuntimeValue, EvaluateError> {
	let left = require_primitive(left)?;
	let right = require_primitive(right)?;
	Ok(RuntimeValue::Primitive(Primitive::numeric(operator, left, right)?))
}

fn eval_equality(
	want_equal: bool,
	left: &RuntimeValue,
	right: &RuntimeValue,
) -> Result<RuntimeValue, EvaluateError> {
	// Objects compare by identity, and an object never equals a
	// non-object.
	if let (RuntimeValue::Object(left), RuntimeValue::Object(right)) = (left, right) {
		return Ok(RuntimeValue::boolean((left == right) == want_equal));
	}
	if matches!(left, RuntimeValue::Object(_)) || matches!(right, RuntimeValue::Object(_)) {
		return Ok(RuntimeValue::boolean(!want_equal));
	}
	let left = require_primitive(left)?;
	let right = require_primitive(right)?;
	Ok(RuntimeValue::boolean((left == right) == want_equal))
}

fn require_primitive(value: &RuntimeValue) -> Result<&Primitive, EvaluateError> {
	value.as_primitive().ok_or_else(|| unexpected_type("a primitive value", value))
}

fn require_object(value: &RuntimeValue) -> Result<&ObjectValue, EvaluateError> {
	value.as_object().ok_or_else(|| unexpected_type("an Object", value))
}

fn unexpected_type(expected: &'static str, received: &RuntimeValue) -> EvaluateError {
	EvaluateError::UnexpectedType { expected, received: received.kind().to_string() }
}

fn check_distinct_parameters(def: &DefStmt) -> Result<(), EvaluateError> {
	let mut seen = HashSet::new();
	for parameter in def.parameters.iter() {
		if !seen.insert(parameter.as_str()) {
			return Err(EvaluateError::DuplicateParameter(parameter.clone()));
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use num_bigint::BigInt;

	use super::*;
	use crate::{environment, lexer::Lexer, parser::Parser};

	fn eval(input: &str) -> Result<RuntimeValue, EvaluateError> {
		let tokens = Lexer::new(input).lex().unwrap();
		let source = Parser::new(tokens).parse_source().unwrap();
		Evaluator::new(environment::runtime_scope()).evaluate(&source)
	}

	fn eval_ok(input: &str) -> RuntimeValue {
		eval(input).unwrap_or_else(|error| panic!("evaluation of {input:?} failed: {error}"))
	}

	fn eval_fails(input: &str) {
		assert!(eval(input).is_err(), "expected evaluation failure: {input}");
	}

	fn int(value: i64) -> RuntimeValue { RuntimeValue::integer(value) }

	#[test]
	fn source_yields_the_last_statement_value() {
		assert_eq!(eval_ok("1; 2; 3;"), int(3));
		assert_eq!(eval_ok(""), RuntimeValue::nil());
	}

	#[test]
	fn let_defines_and_rejects_redefinition() {
		assert_eq!(eval_ok("LET x = 1 + 2 * 3; x;"), int(7));
		assert_eq!(eval_ok("LET x; x;"), RuntimeValue::nil());
		eval_fails("LET x = 1; LET x = 2;");
	}

	#[test]
	fn variables_resolve_through_the_scope_chain() {
		assert_eq!(eval_ok("LET x = 1; IF TRUE DO x = 2; END x;"), int(2));
		eval_fails("missing;");
	}

	#[test]
	fn block_scopes_do_not_leak() {
		// The IF body's binding dies with its scope.
		assert_eq!(eval_ok("IF TRUE DO LET x = 1; END LET x = 2; x;"), int(2));
	}

	#[test]
	fn functions_call_and_return() {
		assert_eq!(eval_ok("DEF one(): Integer DO RETURN 1; END one();"), int(1));
		// Without a RETURN a function yields NIL.
		assert_eq!(eval_ok("DEF f() DO 42; END f();"), RuntimeValue::nil());
		assert_eq!(eval_ok("DEF add(a, b) DO RETURN a + b; END add(2, 3);"), int(5));
		eval_fails("DEF f(a) DO END f();");
		eval_fails("DEF f(a, a) DO END");
	}

	#[test]
	fn recursion() {
		let program = "DEF fact(n) DO IF n == 0 DO RETURN 1; ELSE RETURN n * fact(n - 1); END END fact(5);";
		assert_eq!(eval_ok(program), int(120));
	}

	#[test]
	fn functions_capture_their_definition_scope() {
		let program = "LET x = 1; DEF get() DO RETURN x; END IF TRUE DO LET x = 99; get(); END get();";
		assert_eq!(eval_ok(program), int(1));
	}

	#[test]
	fn return_outside_a_function_is_an_error() {
		eval_fails("RETURN 1;");
		eval_fails("IF TRUE DO RETURN 1; END");
	}

	#[test]
	fn return_unwinds_nested_blocks() {
		let program = "DEF f() DO FOR i IN range(0, 10) DO IF i == 3 DO RETURN i; END END RETURN -1; END f();";
		assert_eq!(eval_ok(program), int(3));
	}

	#[test]
	fn if_requires_a_boolean() {
		eval_fails("IF 1 DO END");
		eval_fails("IF NIL DO END");
		assert_eq!(eval_ok("IF FALSE DO 1; ELSE 2; END"), int(2));
	}

	#[test]
	fn for_iterates_a_list() {
		assert_eq!(eval_ok("LET r = 0; FOR i IN range(1, 4) DO r = r + i; END r;"), int(6));
		assert_eq!(eval_ok("FOR i IN list() DO i; END"), RuntimeValue::nil());
		eval_fails("FOR i IN 1 DO END");
	}

	#[test]
	fn loop_variables_are_fresh_per_iteration() {
		// A LET in the body would collide with itself if iterations
		// shared a scope.
		assert_eq!(eval_ok("LET r = 0; FOR i IN range(0, 3) DO LET d = i; r = r + d; END r;"), int(3));
	}

	#[test]
	fn string_concatenation() {
		assert_eq!(eval_ok("LET s = \"hi \"; s + 1;"), RuntimeValue::string("hi 1"));
		assert_eq!(eval_ok("1 + \" hi\";"), RuntimeValue::string("1 hi"));
		assert_eq!(eval_ok("\"v: \" + NIL;"), RuntimeValue::string("v: NIL"));
		assert_eq!(eval_ok("\"b: \" + TRUE;"), RuntimeValue::string("b: true"));
	}

	#[test]
	fn numeric_operators_require_matching_kinds() {
		assert_eq!(eval_ok("7 / 2;"), int(3));
		eval_fails("1 + 1.5;");
		eval_fails("1 / 0;");
		eval_fails("NIL + 1;");
	}

	#[test]
	fn short_circuiting() {
		assert_eq!(eval_ok("TRUE OR (1 / 0);"), RuntimeValue::boolean(true));
		assert_eq!(eval_ok("FALSE AND (1 / 0);"), RuntimeValue::boolean(false));
		// The right side does run when the left does not decide.
		eval_fails("FALSE OR (1 / 0);");
		eval_fails("TRUE AND 1;");
		eval_fails("1 AND TRUE;");
	}

	#[test]
	fn equality() {
		assert_eq!(eval_ok("1 == 1;"), RuntimeValue::boolean(true));
		assert_eq!(eval_ok("1 != 2;"), RuntimeValue::boolean(true));
		assert_eq!(eval_ok("NIL == NIL;"), RuntimeValue::boolean(true));
		assert_eq!(eval_ok("1 == 1.0;"), RuntimeValue::boolean(false));
		assert_eq!(eval_ok("\"a\" == \"a\";"), RuntimeValue::boolean(true));
	}

	#[test]
	fn object_equality_is_identity() {
		assert_eq!(eval_ok("LET o = OBJECT DO END; o == o;"), RuntimeValue::boolean(true));
		assert_eq!(
			eval_ok("LET a = OBJECT DO END; LET b = OBJECT DO END; a == b;"),
			RuntimeValue::boolean(false)
		);
		assert_eq!(eval_ok("LET o = OBJECT DO END; o == 1;"), RuntimeValue::boolean(false));
		assert_eq!(eval_ok("LET o = OBJECT DO END; o != 1;"), RuntimeValue::boolean(true));
	}

	#[test]
	fn comparisons() {
		assert_eq!(eval_ok("1 < 2;"), RuntimeValue::boolean(true));
		assert_eq!(eval_ok("\"a\" < \"b\";"), RuntimeValue::boolean(true));
		assert_eq!(eval_ok("2.5 >= 2.5;"), RuntimeValue::boolean(true));
		eval_fails("1 < 1.5;");
		eval_fails("NIL < 1;");
	}

	#[test]
	fn objects_hold_state_through_methods() {
		let program = "LET o = OBJECT DO LET x = 10; \
		               DEF bump() DO this.x = this.x + 1; RETURN this.x; END END; \
		               o.bump(); o.bump();";
		assert_eq!(eval_ok(program), int(12));
	}

	#[test]
	fn property_access_and_assignment() {
		assert_eq!(eval_ok("LET o = OBJECT DO LET x = 1; END; o.x;"), int(1));
		assert_eq!(eval_ok("LET o = OBJECT DO LET x = 1; END; o.x = 5; o.x;"), int(5));
		eval_fails("LET o = OBJECT DO END; o.missing;");
		eval_fails("LET o = OBJECT DO END; o.missing = 1;");
		eval_fails("1 .x;");
	}

	#[test]
	fn object_field_initializers_see_the_enclosing_scope() {
		assert_eq!(eval_ok("LET a = 41; LET o = OBJECT DO LET x = a + 1; END; o.x;"), int(42));
	}

	#[test]
	fn methods_do_not_see_the_enclosing_lexical_scope() {
		// The object scope has no parent; only `this` and parameters are
		// in reach.
		eval_fails("LET a = 1; LET o = OBJECT DO DEF m() DO RETURN a; END END; o.m();");
	}

	#[test]
	fn method_arity_counts_user_arguments() {
		eval_fails("LET o = OBJECT DO DEF m(a) DO END END; o.m();");
		assert_eq!(
			eval_ok("LET o = OBJECT DO DEF m(a) DO RETURN a; END END; o.m(7);"),
			int(7)
		);
	}

	#[test]
	fn methods_without_return_yield_their_last_value() {
		assert_eq!(eval_ok("LET o = OBJECT DO DEF m() DO 5; END END; o.m();"), int(5));
	}

	#[test]
	fn objects_are_shared_by_reference() {
		let program = "LET a = OBJECT DO LET x = 1; END; LET b = a; b.x = 9; a.x;";
		assert_eq!(eval_ok(program), int(9));
	}

	#[test]
	fn scope_is_restored_after_an_error() {
		let scope = environment::runtime_scope();
		scope.define("x", RuntimeValue::integer(1));
		let mut evaluator = Evaluator::new(scope.clone());

		let tokens = Lexer::new("DEF f() DO LET y = 1; RETURN 1 / 0; END f();").lex().unwrap();
		let source = Parser::new(tokens).parse_source().unwrap();
		assert!(evaluator.evaluate(&source).is_err());

		// The failed call's scope is gone; the original is current again.
		let tokens = Lexer::new("y;").lex().unwrap();
		let source = Parser::new(tokens).parse_source().unwrap();
		assert!(evaluator.evaluate(&source).is_err());
		let tokens = Lexer::new("x;").lex().unwrap();
		let source = Parser::new(tokens).parse_source().unwrap();
		assert_eq!(evaluator.evaluate(&source).unwrap(), RuntimeValue::integer(BigInt::from(1)));
	}

	#[test]
	fn arguments_evaluate_left_to_right() {
		let program = "LET s = \"\"; \
		               DEF tag(x) DO s = s + x; RETURN x; END \
		               DEF pair(a, b) DO RETURN s; END \
		               pair(tag(1), tag(2));";
		assert_eq!(eval_ok(program), RuntimeValue::string("12"));
	}
}

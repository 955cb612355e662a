//! Semantic analysis: untyped AST in, typed IR out.
//!
//! The analyzer resolves every name against the lexical scope, checks the
//! subtype lattice at every boundary where a value flows into a typed
//! slot, and lowers each node into its IR form. It shares the scope
//! discipline with the evaluator: one mutable scope pointer, a child
//! pushed for every lexical block, and the previous scope restored on
//! both the success and the error path.
//!
//! Declarations are checked against the current scope only, so shadowing
//! an outer name is fine while redeclaring in the same block is not. A
//! function's type is defined before its body is analyzed, which is what
//! makes recursive self-reference resolve. Object literals get a
//! two-pass treatment: every method signature lands in the object scope
//! first, then each body is analyzed in a scope that extends the object
//! scope with `this` and the parameters -- so a method can call a method
//! declared after it.

pub mod ir;
pub mod types;

use std::collections::HashSet;

use anyhow::anyhow;

use crate::{
	analyzer::types::{FunctionType, ObjectType, Type},
	ast,
	error::analyzer::AnalyzeError,
	scope::Scope,
};

/// Sentinel binding carrying the enclosing function's declared return
/// type; `RETURN` checks against it. The `$` keeps it out of the
/// identifier grammar, so user code can never name it.
const RETURNS: &str = "$RETURNS";

pub struct Analyzer {
	scope: Scope<Type>,
}

impl Analyzer {
	/// The initial scope supplies the built-in names; see
	/// `environment::analyzer_scope`.
	pub fn new(scope: Scope<Type>) -> Self { Self { scope } }

	pub fn analyze(&mut self, source: &ast::Source) -> Result<ir::Source, AnalyzeError> {
		let statements = self.analyze_block(&source.statements)?;
		Ok(ir::Source { statements })
	}

	fn analyze_block(&mut self, statements: &[ast::Stmt]) -> Result<Vec<ir::Stmt>, AnalyzeError> {
		statements.iter().map(|statement| self.analyze_stmt(statement)).collect()
	}

	/// Runs `analyze` with `scope` swapped in, restoring the previous
	/// scope on every exit path.
	fn in_scope<R>(
		&mut self,
		scope: Scope<Type>,
		analyze: impl FnOnce(&mut Self) -> Result<R, AnalyzeError>,
	) -> Result<R, AnalyzeError> {
		let previous = std::mem::replace(&mut self.scope, scope);
		let result = analyze(self);
		self.scope = previous;
		result
	}

	fn analyze_stmt(&mut self, statement: &ast::Stmt) -> Result<ir::Stmt, AnalyzeError> {
		match statement {
			ast::Stmt::Let(let_stmt) => Ok(ir::Stmt::Let(self.analyze_let(let_stmt)?)),
			ast::Stmt::Def(def) => Ok(ir::Stmt::Def(self.analyze_def(def)?)),
			ast::Stmt::If { condition, then_body, else_body } => {
				self.analyze_if(condition, then_body, else_body)
			}
			ast::Stmt::For { name, iterable, body } => self.analyze_for(name, iterable, body),
			ast::Stmt::Return(value) => self.analyze_return(value.as_ref()),
			ast::Stmt::Expression(expression) => Ok(ir::Stmt::Expression(self.analyze_expr(expression)?)),
			ast::Stmt::Assignment { target, value } => self.analyze_assignment(target, value),
		}
	}

	/// Also used for object fields, which share the LET shape.
	fn analyze_let(&mut self, let_stmt: &ast::LetStmt) -> Result<ir::LetStmt, AnalyzeError> {
		if self.scope.get(&let_stmt.name, true).is_some() {
			return Err(AnalyzeError::AlreadyDefined(let_stmt.name.clone()));
		}
		let value = let_stmt.value.as_ref().map(|value| self.analyze_expr(value)).transpose()?;
		let ty = self.resolve_type(let_stmt.type_name.as_deref(), value.as_ref())?;
		self.scope.define(&let_stmt.name, ty.clone());
		Ok(ir::LetStmt { name: let_stmt.name.clone(), ty, value })
	}

	/// The function type is defined in the enclosing scope before the
	/// body is analyzed so recursive self-references resolve. The body
	/// runs in a child scope holding the parameters and `$RETURNS`.
	fn analyze_def(&mut self, def: &ast::DefStmt) -> Result<ir::DefStmt, AnalyzeError> {
		if self.scope.get(&def.name, true).is_some() {
			return Err(AnalyzeError::AlreadyDefined(def.name.clone()));
		}
		check_distinct_parameters(def)?;
		let (parameter_types, returns) = self.resolve_signature(def)?;
		let function = Type::Function(FunctionType::new(parameter_types.clone(), returns.clone()));
		self.scope.define(&def.name, function);

		let body_scope = self.scope.child();
		for (name, ty) in def.parameters.iter().zip(&parameter_types) {
			body_scope.define(name, ty.clone());
		}
		body_scope.define(RETURNS, returns.clone());
		let body = self.in_scope(body_scope, |analyzer| analyzer.analyze_block(&def.body))?;

		let parameters = def
			.parameters
			.iter()
			.zip(parameter_types)
			.map(|(name, ty)| ir::Parameter { name: name.clone(), ty })
			.collect();
		Ok(ir::DefStmt { name: def.name.clone(), parameters, returns, body })
	}

	/// Parameter annotations may be shorter than the parameter list;
	/// missing ones default to Any, as does a missing return annotation.
	fn resolve_signature(&self, def: &ast::DefStmt) -> Result<(Vec<Type>, Type), AnalyzeError> {
		if def.parameter_types.len() > def.parameters.len() {
			return Err(AnalyzeError::TooManyParameterTypes(def.name.clone()));
		}
		let mut parameter_types = Vec::with_capacity(def.parameters.len());
		for index in 0..def.parameters.len() {
			let annotation = def.parameter_types.get(index).and_then(|name| name.as_deref());
			parameter_types.push(self.resolve_type(annotation, None)?);
		}
		let returns = self.resolve_type(def.return_type.as_deref(), None)?;
		Ok((parameter_types, returns))
	}

	fn analyze_if(
		&mut self,
		condition: &ast::Expr,
		then_body: &[ast::Stmt],
		else_body: &[ast::Stmt],
	) -> Result<ir::Stmt, AnalyzeError> {
		let condition = self.analyze_expr(condition)?;
		require_subtype(condition.ty(), &Type::Boolean)?;
		let then_body = self.in_scope(self.scope.child(), |analyzer| analyzer.analyze_block(then_body))?;
		let else_body = self.in_scope(self.scope.child(), |analyzer| analyzer.analyze_block(else_body))?;
		Ok(ir::Stmt::If { condition, then_body, else_body })
	}

	fn analyze_for(
		&mut self,
		name: &str,
		iterable: &ast::Expr,
		body: &[ast::Stmt],
	) -> Result<ir::Stmt, AnalyzeError> {
		let iterable = self.analyze_expr(iterable)?;
		require_subtype(iterable.ty(), &Type::Iterable)?;
		let loop_scope = self.scope.child();
		// The iterable protocol yields integers at this stage.
		loop_scope.define(name, Type::Integer);
		let body = self.in_scope(loop_scope, |analyzer| analyzer.analyze_block(body))?;
		Ok(ir::Stmt::For { name: name.to_string(), ty: Type::Integer, iterable, body })
	}

	fn analyze_return(&mut self, value: Option<&ast::Expr>) -> Result<ir::Stmt, AnalyzeError> {
		let Some(expected) = self.scope.get(RETURNS, false) else {
			return Err(AnalyzeError::ReturnOutsideFunction);
		};
		let value = match value {
			Some(value) => self.analyze_expr(value)?,
			None => ir::Expr::Literal { value: ast::Literal::Nil, ty: Type::Nil },
		};
		require_subtype(value.ty(), &expected)?;
		Ok(ir::Stmt::Return { value })
	}

	fn analyze_assignment(&mut self, target: &ast::Expr, value: &ast::Expr) -> Result<ir::Stmt, AnalyzeError> {
		match target {
			ast::Expr::Variable(name) => {
				let target = self.analyze_variable(name)?;
				let value = self.analyze_expr(value)?;
				require_subtype(value.ty(), &target.ty)?;
				Ok(ir::Stmt::Assignment(ir::Assignment::Variable { target, value }))
			}
			ast::Expr::Property { receiver, name } => {
				let target = self.analyze_property(receiver, name)?;
				let value = self.analyze_expr(value)?;
				require_subtype(value.ty(), &target.ty)?;
				Ok(ir::Stmt::Assignment(ir::Assignment::Property { target, value }))
			}
			_ => Err(AnalyzeError::InvalidAssignmentTarget),
		}
	}

	fn analyze_expr(&mut self, expression: &ast::Expr) -> Result<ir::Expr, AnalyzeError> {
		match expression {
			ast::Expr::Literal(literal) => analyze_literal(literal),
			ast::Expr::Group(inner) => Ok(ir::Expr::Group(Box::new(self.analyze_expr(inner)?))),
			ast::Expr::Binary { operator, left, right } => self.analyze_binary(operator, left, right),
			ast::Expr::Variable(name) => Ok(ir::Expr::Variable(self.analyze_variable(name)?)),
			ast::Expr::Property { receiver, name } => {
				Ok(ir::Expr::Property(self.analyze_property(receiver, name)?))
			}
			ast::Expr::Function { name, arguments } => self.analyze_function(name, arguments),
			ast::Expr::Method { receiver, name, arguments } => {
				self.analyze_method(receiver, name, arguments)
			}
			ast::Expr::Object(object) => Ok(ir::Expr::Object(self.analyze_object(object)?)),
		}
	}

	fn analyze_binary(
		&mut self,
		operator: &str,
		left: &ast::Expr,
		right: &ast::Expr,
	) -> Result<ir::Expr, AnalyzeError> {
		let left = self.analyze_expr(left)?;
		let right = self.analyze_expr(right)?;
		let ty = match operator {
			// `+` concatenates as soon as either side is a string; the
			// evaluator stringifies the other side to match.
			"+" => {
				if *left.ty() == Type::String || *right.ty() == Type::String {
					Type::String
				} else {
					numeric_operands(operator, &left, &right)?
				}
			}
			"-" | "*" | "/" => numeric_operands(operator, &left, &right)?,
			"<" | "<=" | ">" | ">=" => {
				if !left.ty().is_subtype_of(&Type::Comparable) {
					return Err(AnalyzeError::InvalidOperands {
						operator: operator.to_string(),
						message:  "must be Comparable",
					});
				}
				if left.ty() != right.ty() {
					return Err(AnalyzeError::InvalidOperands {
						operator: operator.to_string(),
						message:  "must be the same type",
					});
				}
				Type::Boolean
			}
			"==" | "!=" => {
				if !left.ty().is_subtype_of(&Type::Equatable) || !right.ty().is_subtype_of(&Type::Equatable) {
					return Err(AnalyzeError::InvalidOperands {
						operator: operator.to_string(),
						message:  "must be Equatable",
					});
				}
				Type::Boolean
			}
			"AND" | "OR" => {
				require_subtype(left.ty(), &Type::Boolean)?;
				require_subtype(right.ty(), &Type::Boolean)?;
				Type::Boolean
			}
			_ => return Err(anyhow!("parser produced unknown operator '{operator}'").into()),
		};
		Ok(ir::Expr::Binary {
			operator: operator.to_string(),
			left: Box::new(left),
			right: Box::new(right),
			ty,
		})
	}

	/// Inside a method, an object member must be reached through `this`:
	/// a bare name that is a member but not a local is rejected.
	fn analyze_variable(&mut self, name: &str) -> Result<ir::Variable, AnalyzeError> {
		if let Some(Type::Object(this)) = self.scope.get("this", false) {
			let is_member = this.scope.get(name, true).is_some();
			let is_local = self.scope.get(name, true).is_some();
			if is_member && !is_local {
				return Err(AnalyzeError::DirectMemberAccess(name.to_string()));
			}
		}
		let ty =
			self.scope.get(name, false).ok_or_else(|| AnalyzeError::UndefinedVariable(name.to_string()))?;
		Ok(ir::Variable { name: name.to_string(), ty })
	}

	fn analyze_property(&mut self, receiver: &ast::Expr, name: &str) -> Result<ir::Property, AnalyzeError> {
		let receiver = self.analyze_expr(receiver)?;
		let ty = match receiver.ty() {
			Type::Object(object) => object
				.scope
				.get(name, true)
				.ok_or_else(|| AnalyzeError::UndefinedProperty(name.to_string()))?,
			other => return Err(AnalyzeError::NotAnObject(other.to_string())),
		};
		Ok(ir::Property { receiver: Box::new(receiver), name: name.to_string(), ty })
	}

	fn analyze_function(&mut self, name: &str, arguments: &[ast::Expr]) -> Result<ir::Expr, AnalyzeError> {
		let ty =
			self.scope.get(name, false).ok_or_else(|| AnalyzeError::UndefinedVariable(name.to_string()))?;
		let Type::Function(function) = ty else {
			return Err(AnalyzeError::NotAFunction(name.to_string()));
		};
		let arguments = self.analyze_arguments(name, arguments, &function.parameters)?;
		Ok(ir::Expr::Function { name: name.to_string(), arguments, ty: (*function.returns).clone() })
	}

	/// The receiver is passed implicitly, so the arity check counts only
	/// the user-visible arguments.
	fn analyze_method(
		&mut self,
		receiver: &ast::Expr,
		name: &str,
		arguments: &[ast::Expr],
	) -> Result<ir::Expr, AnalyzeError> {
		let receiver = self.analyze_expr(receiver)?;
		let method = match receiver.ty() {
			Type::Object(object) => object
				.scope
				.get(name, false)
				.ok_or_else(|| AnalyzeError::UndefinedMethod(name.to_string()))?,
			other => return Err(AnalyzeError::NotAnObject(other.to_string())),
		};
		let Type::Function(function) = method else {
			return Err(AnalyzeError::NotAFunction(name.to_string()));
		};
		let arguments = self.analyze_arguments(name, arguments, &function.parameters)?;
		Ok(ir::Expr::Method {
			receiver: Box::new(receiver),
			name: name.to_string(),
			arguments,
			ty: (*function.returns).clone(),
		})
	}

	/// Arity plus per-argument subtype checks shared by function and
	/// method calls.
	fn analyze_arguments(
		&mut self,
		name: &str,
		arguments: &[ast::Expr],
		parameters: &[Type],
	) -> Result<Vec<ir::Expr>, AnalyzeError> {
		if arguments.len() != parameters.len() {
			return Err(AnalyzeError::ArityMismatch {
				name:     name.to_string(),
				expected: parameters.len(),
				received: arguments.len(),
			});
		}
		let mut analyzed = Vec::with_capacity(arguments.len());
		for (argument, parameter) in arguments.iter().zip(parameters) {
			let argument = self.analyze_expr(argument)?;
			require_subtype(argument.ty(), parameter)?;
			analyzed.push(argument);
		}
		Ok(analyzed)
	}

	/// Objects are analyzed in two passes over the methods: signatures
	/// into the object scope first, then each body in a scope extending
	/// the object scope with `this` and the parameters.
	fn analyze_object(&mut self, object: &ast::ObjectExpr) -> Result<ir::ObjectExpr, AnalyzeError> {
		if let Some(name) = &object.name {
			if types::lookup(name).is_some() {
				return Err(AnalyzeError::ObjectNameIsType(name.clone()));
			}
		}
		let object_scope: Scope<Type> = Scope::new(None);
		let object_type = Type::Object(ObjectType { scope: object_scope.clone() });

		// Fields are analyzed in the object scope itself; the LET rule
		// supplies the duplicate check.
		let fields = self.in_scope(object_scope.clone(), |analyzer| {
			object.fields.iter().map(|field| analyzer.analyze_let(field)).collect::<Result<Vec<_>, _>>()
		})?;

		for method in &object.methods {
			if object_scope.get(&method.name, true).is_some() {
				return Err(AnalyzeError::AlreadyDefined(method.name.clone()));
			}
			let (parameter_types, returns) = self.resolve_signature(method)?;
			object_scope.define(&method.name, Type::Function(FunctionType::new(parameter_types, returns)));
		}

		let mut methods = Vec::with_capacity(object.methods.len());
		for method in &object.methods {
			let method_scope = object_scope.child();
			method_scope.define("this", object_type.clone());
			let (parameter_types, _) = self.resolve_signature(method)?;
			for (name, ty) in method.parameters.iter().zip(parameter_types) {
				method_scope.define(name, ty);
			}
			methods.push(self.in_scope(method_scope, |analyzer| analyzer.analyze_def(method))?);
		}

		Ok(ir::ObjectExpr { name: object.name.clone(), fields, methods, ty: object_type })
	}

	/// Resolves a declared/inferred pair: a declared name wins and the
	/// value must be its subtype; an inferred value's type is used
	/// otherwise; with neither the type is Any.
	fn resolve_type(&self, type_name: Option<&str>, value: Option<&ir::Expr>) -> Result<Type, AnalyzeError> {
		let declared = match type_name {
			Some(name) => {
				Some(types::lookup(name).ok_or_else(|| AnalyzeError::UnknownType(name.to_string()))?)
			}
			None => None,
		};
		if let (Some(declared), Some(value)) = (&declared, value) {
			require_subtype(value.ty(), declared)?;
		}
		match declared {
			Some(declared) => Ok(declared),
			None => Ok(value.map(|value| value.ty().clone()).unwrap_or(Type::Any)),
		}
	}
}

fn analyze_literal(literal: &ast::Literal) -> Result<ir::Expr, AnalyzeError> {
	let ty = match literal {
		ast::Literal::Nil => Type::Nil,
		ast::Literal::Boolean(_) => Type::Boolean,
		ast::Literal::Integer(_) => Type::Integer,
		ast::Literal::Decimal(_) => Type::Decimal,
		ast::Literal::String(_) => Type::String,
		// The type algebra has no Character type, so there is nothing a
		// character literal could resolve to.
		ast::Literal::Character(_) => {
			return Err(anyhow!("character literals have no static type").into());
		}
	};
	Ok(ir::Expr::Literal { value: literal.clone(), ty })
}

fn numeric_operands(operator: &str, left: &ir::Expr, right: &ir::Expr) -> Result<Type, AnalyzeError> {
	if !matches!(left.ty(), Type::Integer | Type::Decimal) {
		return Err(AnalyzeError::InvalidOperands {
			operator: operator.to_string(),
			message:  "must be numeric",
		});
	}
	if left.ty() != right.ty() {
		return Err(AnalyzeError::InvalidOperands {
			operator: operator.to_string(),
			message:  "must be the same type",
		});
	}
	Ok(left.ty().clone())
}

fn require_subtype(ty: &Type, expected: &Type) -> Result<(), AnalyzeError> {
	if ty.is_subtype_of(expected) {
		return Ok(());
	}
	Err(AnalyzeError::NotSubtype { found: ty.to_string(), expected: expected.to_string() })
}

fn check_distinct_parameters(def: &ast::DefStmt) -> Result<(), AnalyzeError> {
	let mut seen = HashSet::new();
	for parameter in def.parameters.iter() {
		if !seen.insert(parameter.as_str()) {
			return Err(AnalyzeError::DuplicateParameter(parameter.clone()));
		}
	}
	Ok(())
}

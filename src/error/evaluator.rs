/// Errors produced during evaluation. A non-local `RETURN` is control
/// flow, not an error; it only becomes `ReturnOutsideFunction` when it
/// escapes every enclosing call.
#[derive(thiserror::Error, Debug)]
pub enum EvaluateError {
	/// Evaluator invariant broken, not a user error
	#[error("internal evaluator error: {0}")]
	Internal(#[from] anyhow::Error),
	#[error("'{0}' is already defined in this scope")]
	AlreadyDefined(String),
	#[error("Variable '{0}' is not defined")]
	UndefinedVariable(String),
	#[error("Property '{0}' is not defined on the receiver")]
	UndefinedProperty(String),
	#[error("Method '{0}' is not defined on the receiver")]
	UndefinedMethod(String),
	#[error("Function '{0}' is not defined")]
	UndefinedFunction(String),
	#[error("Expected {expected}, received {received}")]
	UnexpectedType { expected: &'static str, received: String },
	#[error("'{name}' expects {expected} arguments but got {received}")]
	ArityMismatch { name: String, expected: usize, received: usize },
	#[error("Duplicate parameter name '{0}'")]
	DuplicateParameter(String),
	#[error("Division by zero")]
	DivisionByZero,
	#[error("RETURN outside of a function")]
	ReturnOutsideFunction,
	#[error("Invalid assignment target")]
	InvalidAssignmentTarget,
	#[error("Range bounds are reversed")]
	InvalidRange,
}

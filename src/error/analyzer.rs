/// Errors produced during semantic analysis. Fatal for the whole analyze
/// call; a failed analysis yields no partial IR.
#[derive(thiserror::Error, Debug)]
pub enum AnalyzeError {
	/// Analyzer invariant broken, not a user error
	#[error("internal analyzer error: {0}")]
	Internal(#[from] anyhow::Error),
	#[error("'{0}' is already defined in this scope")]
	AlreadyDefined(String),
	#[error("Type '{0}' is not defined")]
	UnknownType(String),
	#[error("Type {found} is not a subtype of {expected}")]
	NotSubtype { found: String, expected: String },
	#[error("Variable '{0}' is not defined")]
	UndefinedVariable(String),
	#[error("Property '{0}' is not defined on the receiver")]
	UndefinedProperty(String),
	#[error("Method '{0}' is not defined on the receiver")]
	UndefinedMethod(String),
	#[error("'{0}' is not a function")]
	NotAFunction(String),
	#[error("Expected an object receiver, found {0}")]
	NotAnObject(String),
	#[error("'{name}' expects {expected} arguments but got {received}")]
	ArityMismatch { name: String, expected: usize, received: usize },
	#[error("Duplicate parameter name '{0}'")]
	DuplicateParameter(String),
	#[error("More parameter types than parameters for '{0}'")]
	TooManyParameterTypes(String),
	#[error("RETURN outside of a function")]
	ReturnOutsideFunction,
	#[error("Use 'this.{0}' to access object members")]
	DirectMemberAccess(String),
	#[error("Invalid assignment target")]
	InvalidAssignmentTarget,
	#[error("Object name '{0}' collides with a built-in type")]
	ObjectNameIsType(String),
	#[error("Operands of '{operator}' {message}")]
	InvalidOperands { operator: String, message: &'static str },
}

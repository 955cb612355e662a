/// Errors produced during parsing. Fatal for the whole parse; there is no
/// resynchronization.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
	/// Parser invariant broken, not a user error
	#[error("internal parser error: {0}")]
	Internal(#[from] anyhow::Error),
	#[error("Unexpected end of input: expected {0}")]
	UnexpectedEof(&'static str),
	#[error("Expected {expected}, found {found}")]
	Expected { expected: &'static str, found: String },
	#[error("Unexpected token '{0}'")]
	UnexpectedToken(String),
}

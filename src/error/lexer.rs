/// Errors produced during lexical analysis. The first one is fatal for
/// the whole lex call; there is no recovery or skipping.
#[derive(thiserror::Error, Debug)]
pub enum LexError {
	/// Lexer invariant broken, not a user error
	#[error("internal lexer error: {0}")]
	Internal(#[from] anyhow::Error),
	#[error("Unexpected character '{0}'")]
	UnexpectedCharacter(char),
	#[error("Invalid escape sequence")]
	InvalidEscape,
	#[error("Invalid character literal")]
	InvalidCharacterLiteral,
	#[error("Unterminated character literal")]
	UnterminatedCharacter,
	#[error("Invalid character in string literal")]
	InvalidStringCharacter,
	#[error("Unterminated string literal")]
	UnterminatedString,
}

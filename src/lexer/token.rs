//! A lexical token: its kind plus the exact source substring it matched.
//!
//! Keywords are not their own kinds. `LET`, `DO`, `AND` and friends come
//! out of the lexer as plain identifiers, and the parser matches them by
//! literal text; that keeps the lexical grammar down to six shapes. The
//! literal always borrows the source, quotes and signs included -- the
//! parser owns decoding.

/// The kind of lexeme a token represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
	Identifier,
	Integer,
	Decimal,
	Character,
	String,
	Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
	pub kind:    TokenKind,
	pub literal: &'src str,
}

impl<'src> Token<'src> {
	pub fn new(kind: TokenKind, literal: &'src str) -> Self { Self { kind, literal } }
}

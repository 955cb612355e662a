//! Lexical analysis: characters in, tokens out.
//!
//! The driver loop discards whitespace and `//` comments and hands
//! everything else to a token rule picked by the first character. Each
//! rule works against a `CharStream` that tracks the current byte index
//! and the length of the pending lexeme; `peek` checks a run of
//! character-class predicates without moving, `advance_if` does the same
//! but consumes on success, and `emit` slices the pending lexeme out of
//! the source.
//!
//! Two rules need real lookahead. A `+` or `-` starts a number only when
//! a digit follows, so `1 - 2` is three tokens while `1 -2` is two. An
//! `e` extends a number only when its digits are actually present, so
//! `1e5` is one token while `1e` is an integer followed by an
//! identifier. Both fall out of multi-character `peek` calls rather than
//! backtracking.

mod token;

pub use token::{Token, TokenKind};

use anyhow::anyhow;

use crate::error::lexer::LexError;

/// A character-class predicate; a `peek` takes one per lookahead
/// character.
type Pattern = fn(char) -> bool;

pub struct Lexer<'src> {
	chars: CharStream<'src>,
}

impl<'src> Lexer<'src> {
	pub fn new(input: &'src str) -> Self { Self { chars: CharStream::new(input) } }

	/// Lexes the whole input. The first unrecognized character is fatal;
	/// nothing is skipped or recovered.
	pub fn lex(mut self) -> Result<Vec<Token<'src>>, LexError> {
		let mut tokens = Vec::new();
		while !self.chars.end() {
			if self.chars.advance_if(&[whitespace]) {
				self.chars.emit();
			} else if self.chars.peek(&[slash, slash]) {
				self.lex_comment();
			} else {
				tokens.push(self.lex_token()?);
			}
		}
		Ok(tokens)
	}

	/// `//` runs to the end of the line; one trailing CR or LF is
	/// consumed with it.
	fn lex_comment(&mut self) {
		self.chars.advance_if(&[slash]);
		self.chars.advance_if(&[slash]);
		while !self.chars.end() && !self.chars.peek(&[line_break]) {
			self.chars.advance_if(&[any]);
		}
		self.chars.advance_if(&[line_break]);
		self.chars.emit();
	}

	fn lex_token(&mut self) -> Result<Token<'src>, LexError> {
		if self.chars.peek(&[identifier_start]) {
			Ok(self.lex_identifier())
		} else if self.chars.peek(&[single_quote]) {
			self.lex_character()
		} else if self.chars.peek(&[double_quote]) {
			self.lex_string()
		} else if self.chars.peek(&[digit]) || self.chars.peek(&[sign, digit]) {
			self.lex_number()
		} else {
			self.lex_operator()
		}
	}

	/// `[A-Za-z_][A-Za-z0-9_-]*` -- `-` is allowed after the first
	/// character, so `a-b` is a single identifier.
	fn lex_identifier(&mut self) -> Token<'src> {
		self.chars.advance_if(&[identifier_start]);
		while self.chars.advance_if(&[identifier_continue]) {}
		Token::new(TokenKind::Identifier, self.chars.emit())
	}

	/// `[+-]?[0-9]+(\.[0-9]+)?(e[+-]?[0-9]+)?` -- a `.` makes the token a
	/// decimal; an exponent alone does not.
	fn lex_number(&mut self) -> Result<Token<'src>, LexError> {
		if self.chars.peek(&[sign, digit]) {
			self.chars.advance_if(&[sign]);
		}
		if !self.chars.advance_if(&[digit]) {
			return Err(anyhow!("number rule entered without a digit").into());
		}
		while self.chars.advance_if(&[digit]) {}
		if self.chars.peek(&[dot, digit]) {
			self.chars.advance_if(&[dot]);
			while self.chars.advance_if(&[digit]) {}
			self.lex_exponent()?;
			return Ok(Token::new(TokenKind::Decimal, self.chars.emit()));
		}
		self.lex_exponent()?;
		Ok(Token::new(TokenKind::Integer, self.chars.emit()))
	}

	/// Consumes `e[+-]?[0-9]+` only when the digits are guaranteed to be
	/// there; otherwise the `e` is left for the next token.
	fn lex_exponent(&mut self) -> Result<(), LexError> {
		if !self.chars.peek(&[exponent]) {
			return Ok(());
		}
		if self.chars.peek(&[exponent, sign, digit]) || self.chars.peek(&[exponent, digit]) {
			self.chars.advance_if(&[exponent]);
			self.chars.advance_if(&[sign]);
			if !self.chars.advance_if(&[digit]) {
				return Err(anyhow!("exponent consumed without a following digit").into());
			}
			while self.chars.advance_if(&[digit]) {}
		}
		Ok(())
	}

	fn lex_escape(&mut self) -> Result<(), LexError> {
		self.chars.advance_if(&[backslash]);
		if !self.chars.advance_if(&[escape]) {
			return Err(LexError::InvalidEscape);
		}
		Ok(())
	}

	/// `'` then one escape or one plain character, then `'`.
	fn lex_character(&mut self) -> Result<Token<'src>, LexError> {
		self.chars.advance_if(&[single_quote]);
		if self.chars.peek(&[backslash]) {
			self.lex_escape()?;
		} else if !self.chars.advance_if(&[character_body]) {
			return Err(LexError::InvalidCharacterLiteral);
		}
		if !self.chars.advance_if(&[single_quote]) {
			return Err(LexError::UnterminatedCharacter);
		}
		Ok(Token::new(TokenKind::Character, self.chars.emit()))
	}

	/// `"` then any run of escapes or plain characters, then `"`. Raw CR
	/// and LF are illegal inside the quotes.
	fn lex_string(&mut self) -> Result<Token<'src>, LexError> {
		self.chars.advance_if(&[double_quote]);
		while !self.chars.end() && !self.chars.peek(&[double_quote]) {
			if self.chars.peek(&[backslash]) {
				self.lex_escape()?;
			} else if !self.chars.advance_if(&[string_body]) {
				return Err(LexError::InvalidStringCharacter);
			}
		}
		if !self.chars.advance_if(&[double_quote]) {
			return Err(LexError::UnterminatedString);
		}
		Ok(Token::new(TokenKind::String, self.chars.emit()))
	}

	/// `[<>!=]=?`, or any single character no other rule claims.
	fn lex_operator(&mut self) -> Result<Token<'src>, LexError> {
		if self.chars.peek(&[comparison_start]) {
			if !self.chars.advance_if(&[comparison_start, equals_sign]) {
				self.chars.advance_if(&[comparison_start]);
			}
		} else if !self.chars.advance_if(&[operator_any]) {
			let found = self.chars.peek_char().unwrap_or('\0');
			return Err(LexError::UnexpectedCharacter(found));
		}
		Ok(Token::new(TokenKind::Operator, self.chars.emit()))
	}
}

/// Character-level lexer state: the input, the current byte `index`, and
/// the byte `length` of the pending lexeme since the last `emit`.
struct CharStream<'src> {
	input:  &'src str,
	index:  usize,
	length: usize,
}

impl<'src> CharStream<'src> {
	fn new(input: &'src str) -> Self { Self { input, index: 0, length: 0 } }

	fn end(&self) -> bool { self.index >= self.input.len() }

	/// True when the next characters each match their pattern, in order,
	/// without advancing.
	fn peek(&self, patterns: &[Pattern]) -> bool {
		let mut rest = self.input[self.index..].chars();
		patterns.iter().all(|pattern| rest.next().is_some_and(|c| pattern(c)))
	}

	/// Like `peek`, but consumes the matched characters on success.
	fn advance_if(&mut self, patterns: &[Pattern]) -> bool {
		if !self.peek(patterns) {
			return false;
		}
		for c in self.input[self.index..].chars().take(patterns.len()) {
			self.index += c.len_utf8();
			self.length += c.len_utf8();
		}
		true
	}

	fn peek_char(&self) -> Option<char> { self.input[self.index..].chars().next() }

	/// Returns the pending lexeme and resets it.
	fn emit(&mut self) -> &'src str {
		let literal = &self.input[self.index - self.length..self.index];
		self.length = 0;
		literal
	}
}

fn whitespace(c: char) -> bool { matches!(c, ' ' | '\u{0008}' | '\n' | '\r' | '\t') }

fn line_break(c: char) -> bool { matches!(c, '\n' | '\r') }

fn any(_: char) -> bool { true }

fn digit(c: char) -> bool { c.is_ascii_digit() }

fn sign(c: char) -> bool { matches!(c, '+' | '-') }

fn dot(c: char) -> bool { c == '.' }

fn exponent(c: char) -> bool { c == 'e' }

fn identifier_start(c: char) -> bool { c.is_ascii_alphabetic() || c == '_' }

fn identifier_continue(c: char) -> bool { c.is_ascii_alphanumeric() || c == '_' || c == '-' }

fn single_quote(c: char) -> bool { c == '\'' }

fn double_quote(c: char) -> bool { c == '"' }

fn backslash(c: char) -> bool { c == '\\' }

fn slash(c: char) -> bool { c == '/' }

fn escape(c: char) -> bool { matches!(c, 'b' | 'f' | 'n' | 'r' | 't' | '\'' | '"' | '\\') }

fn character_body(c: char) -> bool { !matches!(c, '\'' | '\\' | '\r' | '\n') }

fn string_body(c: char) -> bool { !matches!(c, '"' | '\\' | '\r' | '\n') }

fn comparison_start(c: char) -> bool { matches!(c, '<' | '>' | '!' | '=') }

fn equals_sign(c: char) -> bool { c == '=' }

fn operator_any(c: char) -> bool {
	!(c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '"') || whitespace(c))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lex(input: &str) -> Vec<Token<'_>> { Lexer::new(input).lex().unwrap() }

	fn lex_fails(input: &str) { assert!(Lexer::new(input).lex().is_err(), "expected failure: {input}") }

	fn kinds(input: &str) -> Vec<TokenKind> { lex(input).iter().map(|t| t.kind).collect() }

	fn literals(input: &str) -> Vec<String> {
		lex(input).iter().map(|t| t.literal.to_string()).collect()
	}

	#[test]
	fn empty_and_whitespace() {
		assert!(lex("").is_empty());
		assert!(lex("  \t\r\n \u{0008}").is_empty());
	}

	#[test]
	fn identifiers() {
		assert_eq!(literals("x _name snake_case CamelCase x1"), ["x", "_name", "snake_case", "CamelCase", "x1"]);
		assert_eq!(kinds("x"), [TokenKind::Identifier]);
	}

	#[test]
	fn hyphen_continues_identifiers() {
		// `-` is part of the identifier continuation class, so `a-b` is
		// one token, not a subtraction.
		assert_eq!(literals("a-b"), ["a-b"]);
		assert_eq!(literals("a-3"), ["a-3"]);
		assert_eq!(kinds("a-3"), [TokenKind::Identifier]);
	}

	#[test]
	fn keywords_are_identifiers() {
		assert_eq!(kinds("LET DEF IF RETURN OBJECT"), vec![TokenKind::Identifier; 5]);
	}

	#[test]
	fn integers_and_decimals() {
		assert_eq!(kinds("0 42 007"), vec![TokenKind::Integer; 3]);
		assert_eq!(kinds("3.14 0.5 123.456"), vec![TokenKind::Decimal; 3]);
		// The fraction needs a digit after the dot; `1.` is an integer
		// and an operator.
		assert_eq!(kinds("1."), [TokenKind::Integer, TokenKind::Operator]);
	}

	#[test]
	fn signed_numbers_need_a_digit() {
		assert_eq!(literals("-35"), ["-35"]);
		assert_eq!(literals("+35"), ["+35"]);
		// A digit right after the sign absorbs it, context-free.
		assert_eq!(literals("5-3"), ["5", "-3"]);
		// With a space in between the sign is an operator.
		assert_eq!(literals("1 - 2"), ["1", "-", "2"]);
		assert_eq!(kinds("1 - 2"), [TokenKind::Integer, TokenKind::Operator, TokenKind::Integer]);
		assert_eq!(literals("1 -2"), ["1", "-2"]);
	}

	#[test]
	fn exponents() {
		assert_eq!(kinds("1e10"), [TokenKind::Integer]);
		assert_eq!(literals("1e10"), ["1e10"]);
		assert_eq!(kinds("1.5e-2"), [TokenKind::Decimal]);
		assert_eq!(literals("-2e+3"), ["-2e+3"]);
	}

	#[test]
	fn dangling_exponent_is_left_behind() {
		assert_eq!(literals("1e"), ["1", "e"]);
		assert_eq!(kinds("1e"), [TokenKind::Integer, TokenKind::Identifier]);
		assert_eq!(literals("1.5e+"), ["1.5", "e", "+"]);
		assert_eq!(literals("1e+x"), ["1", "e", "+", "x"]);
	}

	#[test]
	fn character_literals() {
		assert_eq!(literals("'c'"), ["'c'"]);
		assert_eq!(kinds("'c'"), [TokenKind::Character]);
		assert_eq!(literals(r"'\n'"), [r"'\n'"]);
		assert_eq!(literals(r"'\''"), [r"'\''"]);
		lex_fails("''");
		lex_fails("'ab'");
		lex_fails("'a");
		lex_fails("'\n'");
	}

	#[test]
	fn string_literals() {
		assert_eq!(literals(r#""""#), [r#""""#]);
		assert_eq!(literals(r#""hello world""#), [r#""hello world""#]);
		assert_eq!(literals(r#""esc \"quote\"""#), [r#""esc \"quote\"""#]);
		assert_eq!(kinds(r#""hi""#), [TokenKind::String]);
		lex_fails(r#""unterminated"#);
		lex_fails("\"line\nbreak\"");
		lex_fails(r#""bad \m escape""#);
	}

	#[test]
	fn operators() {
		assert_eq!(literals("+ * / ; , : . ( )"), ["+", "*", "/", ";", ",", ":", ".", "(", ")"]);
		assert_eq!(kinds("="), [TokenKind::Operator]);
	}

	#[test]
	fn comparison_operators_take_the_longer_match() {
		assert_eq!(literals("< <= > >= == != ! ="), ["<", "<=", ">", ">=", "==", "!=", "!", "="]);
		assert_eq!(literals("<=="), ["<=", "="]);
	}

	#[test]
	fn comments_are_discarded() {
		assert!(lex("// a comment").is_empty());
		assert_eq!(literals("1 // trailing\n2"), ["1", "2"]);
		assert_eq!(literals("// first\n// second\nx"), ["x"]);
		// A single slash is just an operator.
		assert_eq!(literals("1 / 2"), ["1", "/", "2"]);
	}

	#[test]
	fn literals_reconstruct_the_input() {
		// With nothing discarded, the emitted literals are exactly the
		// input, in order.
		let input = "1+2*3;";
		assert_eq!(literals(input).concat(), input);
	}

	#[test]
	fn literals_relex_to_the_same_kind() {
		for token in lex("count 1e5 2.75 'x' \"s\" <=") {
			let relexed = lex(token.literal);
			assert_eq!(relexed.len(), 1);
			assert_eq!(relexed[0].kind, token.kind);
			assert_eq!(relexed[0].literal, token.literal);
		}
	}

	#[test]
	fn statement_shaped_input() {
		assert_eq!(
			literals("LET average = (low + high) / 2;"),
			["LET", "average", "=", "(", "low", "+", "high", ")", "/", "2", ";"]
		);
	}
}

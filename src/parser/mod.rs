//! Recursive descent parsing: tokens in, untyped AST out.
//!
//! Each grammar rule is a function; precedence is encoded by which rule
//! calls which. Keywords are matched by literal text over identifier
//! tokens, so `LET` is only special where a statement may begin.
//!
//! ``` BNF
//! source      -> stmt* ;
//! stmt        -> letStmt | defStmt | ifStmt | forStmt | returnStmt | exprOrAssign ;
//! letStmt     -> "LET" IDENT (":" IDENT)? ("=" expr)? ";" ;
//! defStmt     -> "DEF" IDENT "(" params? ")" (":" IDENT)? "DO" stmt* "END" ;
//! ifStmt      -> "IF" expr "DO" stmt* ("ELSE" stmt*)? "END" ;
//! forStmt     -> "FOR" IDENT "IN" expr "DO" stmt* "END" ;
//! returnStmt  -> "RETURN" expr? ";" ;
//! exprOrAssign-> expr ("=" expr)? ";" ;
//! expr        -> logical ;
//! logical     -> comparison (("AND" | "OR") comparison)* ;
//! comparison  -> additive (("<=" | ">=" | "==" | "!=" | "<" | ">") additive)* ;
//! additive    -> multiplicative (("+" | "-") multiplicative)* ;
//! multiplicative -> secondary (("*" | "/") secondary)* ;
//! secondary   -> primary ("." IDENT ("(" args? ")")?)* ;
//! primary     -> literal | "(" expr ")" | objectExpr | IDENT ("(" args? ")")? ;
//! objectExpr  -> "OBJECT" IDENT? "DO" letStmt* defStmt* "END" ;
//! ```
//!
//! The `TokenStream` mirrors the lexer's `CharStream` one level up:
//! `peek` and `advance` take patterns that are either a token kind or a
//! literal text, and a multi-pattern call must match consecutive tokens.
//! Instead of emitting substrings, literal decoding here turns token text
//! into values -- numbers to big integers/decimals, quoted literals to
//! their unescaped contents.

use std::{rc::Rc, str::FromStr};

use TokenPattern::{Kind, Text};
use anyhow::{Context, anyhow};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{
	ast::{DefStmt, Expr, LetStmt, Literal, ObjectExpr, Source, Stmt},
	error::parser::ParseError,
	lexer::{Token, TokenKind},
};

/// Two-character comparison operators are probed before their
/// one-character prefixes.
const COMPARISON_OPERATORS: [&str; 6] = ["<=", ">=", "==", "!=", "<", ">"];

pub struct Parser<'src> {
	tokens: TokenStream<'src>,
}

impl<'src> Parser<'src> {
	pub fn new(tokens: Vec<Token<'src>>) -> Self { Self { tokens: TokenStream::new(tokens) } }

	/// Parses a whole source, consuming every token. The empty token
	/// sequence is a valid, empty program.
	pub fn parse_source(mut self) -> Result<Source, ParseError> {
		let mut statements = Vec::new();
		while self.tokens.has(0) {
			statements.push(self.parse_stmt()?);
		}
		Ok(Source { statements })
	}

	/// Parses a single expression, leaving any trailing tokens alone.
	pub fn parse_expression(mut self) -> Result<Expr, ParseError> { self.parse_expr() }

	fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
		if !self.tokens.has(0) {
			return Err(ParseError::UnexpectedEof("a statement"));
		}
		if self.tokens.peek(&[Text("LET")]) {
			Ok(Stmt::Let(self.parse_let_stmt()?))
		} else if self.tokens.peek(&[Text("DEF")]) {
			Ok(Stmt::Def(self.parse_def_stmt()?))
		} else if self.tokens.peek(&[Text("IF")]) {
			self.parse_if_stmt()
		} else if self.tokens.peek(&[Text("FOR")]) {
			self.parse_for_stmt()
		} else if self.tokens.peek(&[Text("RETURN")]) {
			self.parse_return_stmt()
		} else {
			self.parse_expression_or_assignment_stmt()
		}
	}

	fn parse_let_stmt(&mut self) -> Result<LetStmt, ParseError> {
		self.expect("LET")?;
		let name = self.expect_identifier()?;
		let type_name = self.parse_optional_type_name()?;
		let value = if self.tokens.advance(&[Text("=")]) { Some(self.parse_expr()?) } else { None };
		self.expect(";")?;
		Ok(LetStmt { name, type_name, value })
	}

	fn parse_def_stmt(&mut self) -> Result<DefStmt, ParseError> {
		self.expect("DEF")?;
		let name = self.expect_identifier()?;
		let mut parameters = Vec::new();
		let mut parameter_types = Vec::new();
		self.expect("(")?;
		if !self.tokens.peek(&[Text(")")]) {
			loop {
				parameters.push(self.expect_identifier()?);
				parameter_types.push(self.parse_optional_type_name()?);
				if !self.tokens.advance(&[Text(",")]) {
					break;
				}
			}
		}
		self.expect(")")?;
		let return_type = self.parse_optional_type_name()?;
		self.expect("DO")?;
		let body = self.parse_body(&["END"])?;
		self.expect("END")?;
		Ok(DefStmt {
			name,
			parameters: Rc::new(parameters),
			parameter_types,
			return_type,
			body: Rc::new(body),
		})
	}

	fn parse_if_stmt(&mut self) -> Result<Stmt, ParseError> {
		self.expect("IF")?;
		let condition = self.parse_expr()?;
		self.expect("DO")?;
		let then_body = self.parse_body(&["ELSE", "END"])?;
		let else_body =
			if self.tokens.advance(&[Text("ELSE")]) { self.parse_body(&["END"])? } else { Vec::new() };
		self.expect("END")?;
		Ok(Stmt::If { condition, then_body, else_body })
	}

	fn parse_for_stmt(&mut self) -> Result<Stmt, ParseError> {
		self.expect("FOR")?;
		let name = self.expect_identifier()?;
		self.expect("IN")?;
		let iterable = self.parse_expr()?;
		self.expect("DO")?;
		let body = self.parse_body(&["END"])?;
		self.expect("END")?;
		Ok(Stmt::For { name, iterable, body })
	}

	fn parse_return_stmt(&mut self) -> Result<Stmt, ParseError> {
		self.expect("RETURN")?;
		let value = if self.tokens.peek(&[Text(";")]) {
			None
		} else {
			if !self.tokens.has(0) {
				return Err(ParseError::UnexpectedEof("an expression after RETURN"));
			}
			Some(self.parse_expr()?)
		};
		self.expect(";")?;
		Ok(Stmt::Return(value))
	}

	fn parse_expression_or_assignment_stmt(&mut self) -> Result<Stmt, ParseError> {
		let target = self.parse_expr()?;
		if self.tokens.advance(&[Text("=")]) {
			let value = self.parse_expr()?;
			self.expect(";")?;
			return Ok(Stmt::Assignment { target, value });
		}
		self.expect(";")?;
		Ok(Stmt::Expression(target))
	}

	/// Statements up to (not consuming) one of the terminator keywords.
	fn parse_body(&mut self, terminators: &[&'static str]) -> Result<Vec<Stmt>, ParseError> {
		let mut body = Vec::new();
		while !terminators.iter().any(|terminator| self.tokens.peek(&[Text(terminator)])) {
			if !self.tokens.has(0) {
				return Err(ParseError::UnexpectedEof("'END'"));
			}
			body.push(self.parse_stmt()?);
		}
		Ok(body)
	}

	fn parse_expr(&mut self) -> Result<Expr, ParseError> { self.parse_logical_expr() }

	fn parse_logical_expr(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.parse_comparison_expr()?;
		loop {
			let operator = if self.tokens.advance(&[Text("AND")]) {
				"AND"
			} else if self.tokens.advance(&[Text("OR")]) {
				"OR"
			} else {
				break;
			};
			if !self.tokens.has(0) {
				return Err(ParseError::UnexpectedEof("an operand after the logical operator"));
			}
			let right = self.parse_comparison_expr()?;
			expr = binary(operator, expr, right);
		}
		Ok(expr)
	}

	fn parse_comparison_expr(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.parse_additive_expr()?;
		'operators: loop {
			for operator in COMPARISON_OPERATORS {
				if self.tokens.advance(&[Text(operator)]) {
					if !self.tokens.has(0) {
						return Err(ParseError::UnexpectedEof("an operand after the comparison operator"));
					}
					let right = self.parse_additive_expr()?;
					expr = binary(operator, expr, right);
					continue 'operators;
				}
			}
			break;
		}
		Ok(expr)
	}

	fn parse_additive_expr(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.parse_multiplicative_expr()?;
		loop {
			let operator = if self.tokens.advance(&[Text("+")]) {
				"+"
			} else if self.tokens.advance(&[Text("-")]) {
				"-"
			} else {
				break;
			};
			if !self.tokens.has(0) {
				return Err(ParseError::UnexpectedEof("an operand after the additive operator"));
			}
			let right = self.parse_multiplicative_expr()?;
			expr = binary(operator, expr, right);
		}
		Ok(expr)
	}

	fn parse_multiplicative_expr(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.parse_secondary_expr()?;
		loop {
			let operator = if self.tokens.advance(&[Text("*")]) {
				"*"
			} else if self.tokens.advance(&[Text("/")]) {
				"/"
			} else {
				break;
			};
			if !self.tokens.has(0) {
				return Err(ParseError::UnexpectedEof("an operand after the multiplicative operator"));
			}
			let right = self.parse_secondary_expr()?;
			expr = binary(operator, expr, right);
		}
		Ok(expr)
	}

	/// Property and method access chain off any primary: `a.b.c(1).d`.
	fn parse_secondary_expr(&mut self) -> Result<Expr, ParseError> {
		let mut expr = self.parse_primary_expr()?;
		while self.tokens.advance(&[Text(".")]) {
			let name = self.expect_identifier()?;
			if self.tokens.peek(&[Text("(")]) {
				let arguments = self.parse_arguments()?;
				expr = Expr::Method { receiver: Box::new(expr), name, arguments };
			} else {
				expr = Expr::Property { receiver: Box::new(expr), name };
			}
		}
		Ok(expr)
	}

	fn parse_primary_expr(&mut self) -> Result<Expr, ParseError> {
		if !self.tokens.has(0) {
			return Err(ParseError::UnexpectedEof("an expression"));
		}
		if self.tokens.peek(&[Kind(TokenKind::Integer)])
			|| self.tokens.peek(&[Kind(TokenKind::Decimal)])
			|| self.tokens.peek(&[Kind(TokenKind::Character)])
			|| self.tokens.peek(&[Kind(TokenKind::String)])
			|| self.tokens.peek(&[Text("NIL")])
			|| self.tokens.peek(&[Text("TRUE")])
			|| self.tokens.peek(&[Text("FALSE")])
		{
			return Ok(Expr::Literal(self.parse_literal()?));
		}
		if self.tokens.peek(&[Text("(")]) {
			return self.parse_group_expr();
		}
		if self.tokens.peek(&[Text("OBJECT")]) {
			return self.parse_object_expr();
		}
		if self.tokens.peek(&[Kind(TokenKind::Identifier)]) {
			return self.parse_variable_or_function_expr();
		}
		Err(ParseError::UnexpectedToken(self.tokens.get(0)?.literal.to_string()))
	}

	fn parse_literal(&mut self) -> Result<Literal, ParseError> {
		if self.tokens.advance(&[Text("NIL")]) {
			return Ok(Literal::Nil);
		}
		if self.tokens.advance(&[Text("TRUE")]) {
			return Ok(Literal::Boolean(true));
		}
		if self.tokens.advance(&[Text("FALSE")]) {
			return Ok(Literal::Boolean(false));
		}
		let token = *self.tokens.get(0)?;
		self.tokens.advance(&[Kind(token.kind)]);
		match token.kind {
			TokenKind::Integer => decode_integer(token.literal),
			TokenKind::Decimal => decode_decimal(token.literal),
			TokenKind::Character => decode_character(token.literal),
			TokenKind::String => Ok(Literal::String(unescape(strip_quotes(token.literal)))),
			_ => Err(ParseError::UnexpectedToken(token.literal.to_string())),
		}
	}

	fn parse_group_expr(&mut self) -> Result<Expr, ParseError> {
		self.expect("(")?;
		let expr = self.parse_expr()?;
		self.expect(")")?;
		Ok(Expr::Group(Box::new(expr)))
	}

	/// The name is optional, so a bare `OBJECT DO` must not mistake `DO`
	/// for it. Fields all come before methods.
	fn parse_object_expr(&mut self) -> Result<Expr, ParseError> {
		self.expect("OBJECT")?;
		let name = if self.tokens.peek(&[Kind(TokenKind::Identifier)]) && !self.tokens.peek(&[Text("DO")]) {
			Some(self.expect_identifier()?)
		} else {
			None
		};
		self.expect("DO")?;
		let mut fields = Vec::new();
		while self.tokens.peek(&[Text("LET")]) {
			fields.push(self.parse_let_stmt()?);
		}
		let mut methods = Vec::new();
		while self.tokens.peek(&[Text("DEF")]) {
			methods.push(self.parse_def_stmt()?);
		}
		self.expect("END")?;
		Ok(Expr::Object(ObjectExpr { name, fields, methods }))
	}

	fn parse_variable_or_function_expr(&mut self) -> Result<Expr, ParseError> {
		let name = self.expect_identifier()?;
		if self.tokens.peek(&[Text("(")]) {
			let arguments = self.parse_arguments()?;
			return Ok(Expr::Function { name, arguments });
		}
		Ok(Expr::Variable(name))
	}

	/// `( expr ("," expr)* )`
	fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
		self.expect("(")?;
		let mut arguments = Vec::new();
		if !self.tokens.peek(&[Text(")")]) {
			loop {
				arguments.push(self.parse_expr()?);
				if !self.tokens.advance(&[Text(",")]) {
					break;
				}
			}
		}
		self.expect(")")?;
		Ok(arguments)
	}

	fn parse_optional_type_name(&mut self) -> Result<Option<String>, ParseError> {
		if !self.tokens.advance(&[Text(":")]) {
			return Ok(None);
		}
		Ok(Some(self.expect_identifier()?))
	}

	/// Consumes the literal `expected` or fails with what was found.
	fn expect(&mut self, expected: &'static str) -> Result<(), ParseError> {
		if self.tokens.advance(&[Text(expected)]) {
			return Ok(());
		}
		Err(ParseError::Expected { expected, found: self.found() })
	}

	fn expect_identifier(&mut self) -> Result<String, ParseError> {
		if !self.tokens.peek(&[Kind(TokenKind::Identifier)]) {
			return Err(ParseError::Expected { expected: "an identifier", found: self.found() });
		}
		let name = self.tokens.get(0)?.literal.to_string();
		self.tokens.advance(&[Kind(TokenKind::Identifier)]);
		Ok(name)
	}

	/// Describes the current position for error messages.
	fn found(&self) -> String {
		match self.tokens.get(0) {
			Ok(token) => format!("'{}'", token.literal),
			Err(_) => "end of input".to_string(),
		}
	}
}

fn binary(operator: &str, left: Expr, right: Expr) -> Expr {
	Expr::Binary { operator: operator.to_string(), left: Box::new(left), right: Box::new(right) }
}

/// INTEGER tokens may carry an exponent; those decode through
/// `BigDecimal` and collapse back to an integer when exactly integral.
fn decode_integer(literal: &str) -> Result<Literal, ParseError> {
	if literal.contains('e') {
		let decimal = BigDecimal::from_str(literal)
			.with_context(|| format!("lexer emitted unparsable integer '{literal}'"))?;
		if decimal.is_integer() {
			let (value, _) = decimal.with_scale(0).into_bigint_and_exponent();
			return Ok(Literal::Integer(value));
		}
		return Ok(Literal::Decimal(decimal));
	}
	let value =
		BigInt::from_str(literal).with_context(|| format!("lexer emitted unparsable integer '{literal}'"))?;
	Ok(Literal::Integer(value))
}

/// The scale of a decimal literal is the digit count after its decimal
/// point, which `BigDecimal` preserves from the text.
fn decode_decimal(literal: &str) -> Result<Literal, ParseError> {
	let value = BigDecimal::from_str(literal)
		.with_context(|| format!("lexer emitted unparsable decimal '{literal}'"))?;
	Ok(Literal::Decimal(value))
}

fn decode_character(literal: &str) -> Result<Literal, ParseError> {
	let unescaped = unescape(strip_quotes(literal));
	let value = unescaped.chars().next().ok_or_else(|| anyhow!("lexer emitted empty character literal"))?;
	Ok(Literal::Character(value))
}

fn strip_quotes(literal: &str) -> &str { &literal[1..literal.len() - 1] }

/// `\n \t \r \b` decode to their control characters; any other escaped
/// character stands for itself, which also covers `\\ \' \"`.
fn unescape(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut chars = text.chars();
	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('n') => out.push('\n'),
			Some('t') => out.push('\t'),
			Some('r') => out.push('\r'),
			Some('b') => out.push('\u{0008}'),
			Some(other) => out.push(other),
			None => out.push('\\'),
		}
	}
	out
}

/// Pattern for matching tokens: by kind or by exact literal text.
#[derive(Clone, Copy)]
enum TokenPattern<'p> {
	Kind(TokenKind),
	Text(&'p str),
}

struct TokenStream<'src> {
	tokens: Vec<Token<'src>>,
	index:  usize,
}

impl<'src> TokenStream<'src> {
	fn new(tokens: Vec<Token<'src>>) -> Self { Self { tokens, index: 0 } }

	/// True when a token exists at `index + offset`.
	fn has(&self, offset: usize) -> bool { self.index + offset < self.tokens.len() }

	/// The token at `index + offset`; running past the end is a grammar
	/// bug in the caller, not a user error.
	fn get(&self, offset: usize) -> Result<&Token<'src>, ParseError> {
		self.tokens
			.get(self.index + offset)
			.ok_or_else(|| ParseError::Internal(anyhow!("token stream exhausted")))
	}

	/// True when the next tokens match their patterns, in order, without
	/// advancing.
	fn peek(&self, patterns: &[TokenPattern]) -> bool {
		patterns.iter().enumerate().all(|(offset, pattern)| {
			self.tokens.get(self.index + offset).is_some_and(|token| match *pattern {
				Kind(kind) => token.kind == kind,
				Text(text) => token.literal == text,
			})
		})
	}

	/// Like `peek`, but advances past the matched tokens on success.
	fn advance(&mut self, patterns: &[TokenPattern]) -> bool {
		let matched = self.peek(patterns);
		if matched {
			self.index += patterns.len();
		}
		matched
	}
}

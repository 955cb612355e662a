//! # Sable
//!
//! A complete front end and tree-walking interpreter for Sable, a small
//! dynamically-typed, statically-analyzable imperative/object language:
//!
//! ``` markdown
//! LET counter = OBJECT DO
//!     LET count = 0;
//!     DEF bump(): Integer DO
//!         this.count = this.count + 1;
//!         RETURN this.count;
//!     END
//! END;
//! counter.bump(); // 1
//! ```

//! ## Lexing
//!
//! The [`lexer`] turns characters into flat `{kind, literal}` tokens --
//! identifiers, integers, decimals, characters, strings, operators --
//! discarding whitespace and `//` comments. Signs are consumed at lex
//! time when a digit follows, so `-3` is one token, and keywords stay
//! plain identifiers for the parser to recognize by text.

//! ## Parsing
//!
//! The [`parser`] is recursive descent over the token stream, with
//! operator precedence encoded in the rule chain, producing the untyped
//! [`ast`]. Literals are decoded here: numbers into arbitrary-precision
//! integers and decimals, quoted literals into their unescaped contents.

//! ## Analysis
//!
//! The [`analyzer`] walks the AST with a `Scope` of types, checks every
//! flow of a value into a typed slot against a small subtype lattice
//! (`Any` on top, `Equatable` and `Comparable` in the middle), and lowers
//! the program into a typed [`analyzer::ir`] where every expression
//! carries its resolved type. A host-language code generator can consume
//! that IR as a plain tree walk.

//! ## Evaluation
//!
//! The [`evaluator`] walks the same AST directly with a `Scope` of
//! runtime values -- no analyzer pass required -- pushing a child scope
//! for every lexical block and restoring it on every exit path. `RETURN`
//! unwinds as a control-flow value, not an error; functions capture their
//! defining scope; objects own a parentless member scope reached only
//! through the receiver.
//!
//! The four stages fail with four error taxa, one per stage, carried by
//! the top-level [`Error`]. The [`Sable`] facade wires the stages
//! together for callers that just want to run source text.

pub mod analyzer;
pub mod ast;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod sable;
pub mod scope;
mod utils;

pub use crate::{
	analyzer::{Analyzer, ir, types::Type},
	error::Error,
	evaluator::{Evaluator, value::RuntimeValue},
	lexer::{Lexer, Token, TokenKind},
	parser::Parser,
	sable::Sable,
	scope::Scope,
};

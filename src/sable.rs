//! The assembled pipeline.
//!
//! Characters flow one way:
//!
//! ``` markdown
//! chars -> Lexer -> tokens -> Parser -> AST -> Analyzer -> IR
//!                                          \-> Evaluator -> RuntimeValue
//! ```
//!
//! The analyzer and evaluator are peers over the same AST. `evaluate`
//! runs the dynamic half alone, `check` runs the static half alone, and
//! `run` is the analyze-first front-end: reject ill-typed programs, then
//! execute. Each call builds its stage state fresh, so a facade value
//! carries nothing between runs.

use crate::{
	analyzer::{Analyzer, ir},
	ast,
	environment,
	error::Error,
	evaluator::{Evaluator, value::RuntimeValue},
	lexer::Lexer,
	parser::Parser,
};

pub struct Sable;

impl Sable {
	fn parse(&self, source: &str) -> Result<ast::Source, Error> {
		let tokens = Lexer::new(source).lex()?;
		Ok(Parser::new(tokens).parse_source()?)
	}

	/// Lexes, parses, and evaluates under the standard environment.
	pub fn evaluate(&self, source: &str) -> Result<RuntimeValue, Error> {
		let parsed = self.parse(source)?;
		Ok(Evaluator::new(environment::runtime_scope()).evaluate(&parsed)?)
	}

	/// Lexes, parses, and type-checks, yielding the typed IR.
	pub fn check(&self, source: &str) -> Result<ir::Source, Error> {
		let parsed = self.parse(source)?;
		Ok(Analyzer::new(environment::analyzer_scope()).analyze(&parsed)?)
	}

	/// The analyze-first front-end: report static errors, then execute.
	pub fn run(&self, source: &str) -> Result<RuntimeValue, Error> {
		let parsed = self.parse(source)?;
		Analyzer::new(environment::analyzer_scope()).analyze(&parsed)?;
		Ok(Evaluator::new(environment::runtime_scope()).evaluate(&parsed)?)
	}
}

pub mod analyzer;
pub mod evaluator;
pub mod lexer;
pub mod parser;

use crate::error::{analyzer::AnalyzeError, evaluator::EvaluateError, lexer::LexError, parser::ParseError};

/// Top-level error type: one variant per pipeline stage. Every stage is
/// fatal on its own error; a stage that fails produces no partial result
/// for the next one.
#[derive(thiserror::Error, Debug)]
pub enum Error {
	#[error("lex error: {0}")]
	Lex(#[from] LexError),
	#[error("parse error: {0}")]
	Parse(#[from] ParseError),
	#[error("analyze error: {0}")]
	Analyze(#[from] AnalyzeError),
	#[error("evaluate error: {0}")]
	Evaluate(#[from] EvaluateError),
}

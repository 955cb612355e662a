//! End-to-end pipeline scenarios, driven through the public facade.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use sable::{Error, RuntimeValue, Sable, evaluator::value::Primitive};

fn evaluate(source: &str) -> RuntimeValue {
	Sable.evaluate(source).unwrap_or_else(|error| panic!("evaluation of {source:?} failed: {error}"))
}

fn check(source: &str) {
	Sable.check(source).unwrap_or_else(|error| panic!("analysis of {source:?} failed: {error}"));
}

fn int(value: i64) -> RuntimeValue { RuntimeValue::integer(value) }

fn string(value: &str) -> RuntimeValue { RuntimeValue::string(value) }

#[test]
fn arithmetic_with_precedence() {
	assert_eq!(evaluate("LET x = 1 + 2 * 3; x;"), int(7));
}

#[test]
fn recursive_factorial() {
	let program = "DEF fact(n) DO \
	               IF n == 0 DO RETURN 1; ELSE RETURN n * fact(n - 1); END \
	               END \
	               fact(5);";
	assert_eq!(evaluate(program), int(120));
}

#[test]
fn string_concatenation_stringifies_the_other_operand() {
	assert_eq!(evaluate("LET s = \"hi \"; s + 1;"), string("hi 1"));
}

#[test]
fn for_over_a_half_open_range() {
	assert_eq!(evaluate("LET r = 0; FOR i IN range(1, 4) DO r = r + i; END r;"), int(6));
}

#[test]
fn object_state_mutates_through_methods() {
	let program = "LET o = OBJECT DO \
	               LET x = 10; \
	               DEF bump() DO this.x = this.x + 1; RETURN this.x; END \
	               END; \
	               o.bump(); o.bump();";
	assert_eq!(evaluate(program), int(12));
}

#[test]
fn or_short_circuits_past_a_division_by_zero() {
	assert_eq!(evaluate("TRUE OR (1 / 0);"), RuntimeValue::Primitive(Primitive::Boolean(true)));
}

#[test]
fn big_numbers_do_not_overflow() {
	// 2^100, far past any machine integer.
	let program = "DEF power(base, exponent) DO \
	               IF exponent == 0 DO RETURN 1; \
	               ELSE RETURN base * power(base, exponent - 1); END \
	               END \
	               power(2, 100);";
	let expected = BigInt::from_str("1267650600228229401496703205376").unwrap();
	assert_eq!(evaluate(program), RuntimeValue::integer(expected));
}

#[test]
fn decimal_division_rounds_half_even_at_the_larger_scale() {
	assert_eq!(
		evaluate("1.00 / 3.0;"),
		RuntimeValue::Primitive(Primitive::Decimal(BigDecimal::from_str("0.33").unwrap()))
	);
}

#[test]
fn exponent_literals_flow_through_the_whole_pipeline() {
	assert_eq!(evaluate("1e3 + 1;"), int(1001));
}

#[test]
fn fibonacci_through_nested_calls() {
	let program = "DEF fib(n) DO \
	               IF n < 2 DO RETURN n; END \
	               RETURN fib(n - 1) + fib(n - 2); \
	               END \
	               fib(10);";
	assert_eq!(evaluate(program), int(55));
}

#[test]
fn objects_compose_with_lists_and_loops() {
	let program = "LET accumulator = OBJECT DO \
	               LET total = 0; \
	               DEF add(n) DO this.total = this.total + n; RETURN this.total; END \
	               END; \
	               FOR i IN list(10, 20, 30) DO accumulator.add(i); END \
	               accumulator.total;";
	assert_eq!(evaluate(program), int(60));
}

#[test]
fn log_composes_inside_expressions() {
	assert_eq!(evaluate("1 + log(2);"), int(3));
}

#[test]
fn annotated_programs_analyze_and_run_identically() {
	let program = "DEF double(n: Integer): Integer DO RETURN n * 2; END \
	               LET x: Integer = double(21); \
	               x;";
	check(program);
	assert_eq!(Sable.run(program).unwrap(), int(42));
}

#[test]
fn analysis_catches_what_evaluation_would_miss() {
	// The ELSE branch never runs, so evaluation succeeds; the analyzer
	// still rejects the ill-typed comparison inside it.
	let program = "IF TRUE DO 1; ELSE 1 < 2.5; END";
	assert!(Sable.evaluate(program).is_ok());
	assert!(matches!(Sable.run(program), Err(Error::Analyze(_))));
}

#[test]
fn stage_errors_surface_under_their_taxon() {
	assert!(matches!(Sable.evaluate("LET x = \"unterminated;"), Err(Error::Lex(_))));
	assert!(matches!(Sable.evaluate("IF DO END"), Err(Error::Parse(_))));
	assert!(matches!(Sable.check("RETURN 1;"), Err(Error::Analyze(_))));
	assert!(matches!(Sable.evaluate("missing();"), Err(Error::Evaluate(_))));
}

#[test]
fn returns_unwind_only_to_the_nearest_call() {
	let program = "DEF inner() DO RETURN 1; END \
	               DEF outer() DO inner(); RETURN 2; END \
	               outer();";
	assert_eq!(evaluate(program), int(2));
}

#[test]
fn comments_and_whitespace_are_invisible() {
	let program = "// setup\nLET x = 1; // one\n\t x + 1;";
	assert_eq!(evaluate(program), int(2));
}

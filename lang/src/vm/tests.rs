use super::*;
use crate::codegen::{self, Chunk, Opcode};
use crate::lexer::token::Span;
use crate::parser::parse;

/// Compile and run a source, capturing stdout; `input` backs `gets`.
fn run_source(source: &str, input: &str) -> (Result<Value, RuntimeError>, String) {
    let parsed = parse(source);
    assert!(
        parsed.errors.is_empty(),
        "unexpected parse errors for {source:?}: {:?}",
        parsed.errors
    );
    let chunk = match codegen::compile(&parsed.program) {
        Ok(chunk) => chunk,
        Err(errors) => panic!("unexpected compile errors for {source:?}: {errors:?}"),
    };

    let mut stdout: Vec<u8> = Vec::new();
    let mut stdin = input.as_bytes();
    let result = Vm::new(&chunk, &mut stdout, &mut stdin).run();
    (result, String::from_utf8(stdout).unwrap())
}

fn eval(source: &str) -> Value {
    let (result, _) = run_source(source, "");
    result.unwrap_or_else(|error| panic!("runtime error for {source:?}: {error}"))
}

fn eval_error(source: &str) -> String {
    let (result, _) = run_source(source, "");
    match result {
        Ok(value) => panic!("expected a runtime error for {source:?}, got {value:?}"),
        Err(error) => error.message,
    }
}

fn run_chunk(chunk: &Chunk) -> (Result<Value, RuntimeError>, String) {
    let mut stdout: Vec<u8> = Vec::new();
    let mut stdin: &[u8] = b"";
    let result = Vm::new(chunk, &mut stdout, &mut stdin).run();
    (result, String::from_utf8(stdout).unwrap())
}

fn raw_chunk(instructions: Vec<u8>, value_pool: Vec<Value>) -> Chunk {
    let mut chunk = Chunk::new("test", "(test)", Span::ZERO);
    chunk.push_bytes(&instructions);
    for value in value_pool {
        let _ = chunk.add_value(value);
    }
    chunk
}

#[test]
fn run_integer_literal() {
    assert_eq!(eval("124"), Value::Integer(124));
}

#[test]
fn run_float_literal() {
    assert_eq!(eval("12e4"), Value::Float(120000.0));
}

#[test]
fn run_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), Value::Integer(7));
    assert_eq!(eval("(1 + 2) * 3"), Value::Integer(9));
    assert_eq!(eval("10 - 2 - 3"), Value::Integer(5));
    assert_eq!(eval("-5 + 1"), Value::Integer(-4));
    assert_eq!(eval("+5"), Value::Integer(5));
}

#[test]
fn run_integer_division_truncates_toward_zero() {
    assert_eq!(eval("7 / 2"), Value::Integer(3));
    assert_eq!(eval("-7 / 2"), Value::Integer(-3));
}

#[test]
fn run_float_promotion() {
    assert_eq!(eval("1 + 2.5"), Value::Float(3.5));
    assert_eq!(eval("2.5 + 1"), Value::Float(3.5));
    assert_eq!(eval("10 / 4.0"), Value::Float(2.5));
    assert_eq!(eval("1.5 * 2"), Value::Float(3.0));
}

#[test]
fn run_division_by_zero() {
    assert_eq!(eval_error("1 / 0"), "division by zero");
}

#[test]
fn run_string_concatenation() {
    assert_eq!(
        eval(r#""foo" + "bar""#),
        Value::String("foobar".to_string())
    );
}

#[test]
fn run_equality() {
    assert_eq!(eval("1 == 1"), Value::Boolean(true));
    assert_eq!(eval("1 == 2"), Value::Boolean(false));
    assert_eq!(eval("1 != 2"), Value::Boolean(true));
    // Numeric equality crosses the integer/float boundary.
    assert_eq!(eval("1 == 1.0"), Value::Boolean(true));
    // Strings never equal numbers; no error either.
    assert_eq!(eval(r#""1" == 1"#), Value::Boolean(false));
    assert_eq!(eval("nil == nil"), Value::Boolean(true));
    assert_eq!(eval(r#""a" == "a""#), Value::Boolean(true));
    assert_eq!(eval("true == 1"), Value::Boolean(false));
}

#[test]
fn run_comparisons() {
    assert_eq!(eval("1 < 2"), Value::Boolean(true));
    assert_eq!(eval("2 <= 2"), Value::Boolean(true));
    assert_eq!(eval("3 > 4"), Value::Boolean(false));
    assert_eq!(eval("4 >= 5"), Value::Boolean(false));
    assert_eq!(eval("1.5 < 2"), Value::Boolean(true));
    assert_eq!(eval(r#""a" < "b""#), Value::Boolean(true));
}

#[test]
fn run_comparison_type_error() {
    assert_eq!(
        eval_error(r#"1 < "b""#),
        "unsupported operand types for <: Integer and String"
    );
}

#[test]
fn run_arithmetic_type_error() {
    assert_eq!(
        eval_error("1 + nil"),
        "unsupported operand types for +: Integer and Nil"
    );
    assert_eq!(eval_error(r#"-"a""#), "cannot negate String");
}

#[test]
fn run_truthiness() {
    assert_eq!(eval("!nil"), Value::Boolean(true));
    assert_eq!(eval("!false"), Value::Boolean(true));
    // Zero and the empty string are truthy.
    assert_eq!(eval("!0"), Value::Boolean(false));
    assert_eq!(eval(r#"!"""#), Value::Boolean(false));
    assert_eq!(eval("if 0\n1\nelse\n2\nend"), Value::Integer(1));
}

#[test]
fn run_assignment_is_an_expression() {
    assert_eq!(eval("a = 5"), Value::Integer(5));
    assert_eq!(eval("a = b = 2\na + b"), Value::Integer(4));
}

#[test]
fn run_if_expression() {
    assert_eq!(
        eval("a = 1\nif a == 5\n  10\nelse\n  20\nend"),
        Value::Integer(20)
    );
    assert_eq!(
        eval("a = 5\nif a == 5\n  10\nelse\n  20\nend"),
        Value::Integer(10)
    );
    // A then-branch skipped without an else yields nil.
    assert_eq!(eval("if false\n1\nend"), Value::Nil);
}

#[test]
fn run_while_loop() {
    let (result, stdout) = run_source("a = 0\nwhile a < 5\n  a = a + 2\nend\na", "");
    assert_eq!(result, Ok(Value::Integer(6)));
    assert_eq!(stdout, "");
}

#[test]
fn run_while_that_never_runs_yields_nil() {
    assert_eq!(eval("while false\n1\nend"), Value::Nil);
}

#[test]
fn run_while_yields_last_body_value() {
    assert_eq!(eval("a = 0\nwhile a < 3\n  a = a + 1\nend"), Value::Integer(3));
}

#[test]
fn run_return_short_circuits() {
    assert_eq!(eval("return 1\n2"), Value::Integer(1));
    assert_eq!(eval("return"), Value::Nil);
    assert_eq!(eval("a = return 5\na"), Value::Integer(5));
}

#[test]
fn run_self_literal() {
    assert_eq!(eval("self"), Value::SelfObject);
}

#[test]
fn run_puts() {
    let (result, stdout) = run_source(r#"puts("foo")"#, "");
    assert_eq!(result, Ok(Value::Nil));
    assert_eq!(stdout, "foo\n");
}

#[test]
fn run_puts_formats_values() {
    let (_, stdout) = run_source("puts(1)\nputs(1.5)\nputs(12e4)\nputs(nil)\nputs(self)", "");
    assert_eq!(stdout, "1\n1.5\n120000.0\nnil\nmain\n");
}

#[test]
fn run_print_has_no_newline() {
    let (_, stdout) = run_source("print(\"a\")\nprint(\"b\")", "");
    assert_eq!(stdout, "ab");
}

#[test]
fn run_gets() {
    let (result, _) = run_source("gets()", "hello\nworld\n");
    assert_eq!(result, Ok(Value::String("hello".to_string())));
    // Lines arrive in order.
    let (result, stdout) = run_source("puts(gets())\nputs(gets())", "one\ntwo\n");
    assert_eq!(result, Ok(Value::Nil));
    assert_eq!(stdout, "one\ntwo\n");
    // End of input reads as nil.
    let (result, _) = run_source("gets()", "");
    assert_eq!(result, Ok(Value::Nil));
}

#[test]
fn run_len() {
    assert_eq!(eval(r#"len("foo")"#), Value::Integer(3));
    assert_eq!(eval(r#"len("")"#), Value::Integer(0));
    // Byte-counted, not character-counted.
    assert_eq!(eval("len(\"é\")"), Value::Integer(2));
    assert_eq!(eval_error("len(1)"), "len: expected a String, got Integer");
}

#[test]
fn run_arity_mismatch() {
    assert_eq!(
        eval_error(r#"len("a", "b")"#),
        "len: got 2 arguments, expected 1"
    );
    assert_eq!(eval_error("gets(1)"), "gets: got 1 arguments, expected 0");
}

#[test]
fn run_undefined_function() {
    assert_eq!(eval_error("nope()"), "undefined function: nope");
}

#[test]
fn run_noop_and_dup() {
    let chunk = raw_chunk(
        vec![
            Opcode::Noop as u8,
            Opcode::LoadValue as u8,
            0,
            Opcode::Dup as u8,
            Opcode::Add as u8,
            Opcode::Return as u8,
        ],
        vec![Value::Integer(2)],
    );
    let (result, _) = run_chunk(&chunk);
    assert_eq!(result, Ok(Value::Integer(4)));
}

#[test]
fn run_inspect_stack() {
    let chunk = raw_chunk(
        vec![
            Opcode::Nil as u8,
            Opcode::InspectStack as u8,
            Opcode::Return as u8,
        ],
        vec![],
    );
    let (result, stdout) = run_chunk(&chunk);
    assert_eq!(result, Ok(Value::Nil));
    assert_eq!(stdout, "[main, nil]\n");
}

#[test]
fn run_unknown_opcode() {
    let chunk = raw_chunk(vec![99], vec![]);
    let (result, _) = run_chunk(&chunk);
    assert_eq!(result, Err(RuntimeError::new("unknown opcode: 99")));
}

#[test]
fn run_stack_underflow() {
    let chunk = raw_chunk(vec![Opcode::Add as u8], vec![]);
    let (result, _) = run_chunk(&chunk);
    assert_eq!(result, Err(RuntimeError::new("stack underflow")));
}

#[test]
fn run_missing_return() {
    let chunk = raw_chunk(vec![Opcode::Nil as u8], vec![]);
    let (result, _) = run_chunk(&chunk);
    assert_eq!(
        result,
        Err(RuntimeError::new("bytecode ended without RETURN"))
    );
}

#[test]
fn run_backward_jump_out_of_bounds() {
    let chunk = raw_chunk(vec![Opcode::Loop as u8, 200], vec![]);
    let (result, _) = run_chunk(&chunk);
    assert_eq!(result, Err(RuntimeError::new("invalid jump target")));
}

#[test]
fn value_display() {
    assert_eq!(Value::Integer(6).to_string(), "6");
    assert_eq!(Value::Float(120000.0).to_string(), "120000.0");
    assert_eq!(Value::Float(1.5).to_string(), "1.5");
    assert_eq!(Value::Boolean(true).to_string(), "true");
    assert_eq!(Value::Nil.to_string(), "nil");
    assert_eq!(Value::String("x".to_string()).to_string(), "x");
    assert_eq!(Value::SelfObject.to_string(), "main");
}

#[test]
fn chunks_are_reusable_across_vms() {
    let parsed = parse("1 + 2");
    let chunk = codegen::compile(&parsed.program).unwrap();
    assert_eq!(run_chunk(&chunk).0, Ok(Value::Integer(3)));
    assert_eq!(run_chunk(&chunk).0, Ok(Value::Integer(3)));
}

//! End-to-end entry points over the whole pipeline.
//!
//! `compile` aggregates lexer, parser, and compiler diagnostics into one
//! list; `interpret` additionally runs the chunk against the given stdio
//! handles. Top-level chunks are named `main` with filename `(eval)`.


use std::io::{BufRead, Write};

use crate::codegen::{self, Chunk};
use crate::error::MiniRubyError;
use crate::parser;
use crate::vm::value::Value;
use crate::vm::Vm;

/// Compile source text to a bytecode chunk, or report everything wrong with
/// it in source order.
pub fn compile(source: &str) -> Result<Chunk, Vec<MiniRubyError>> {
    let parsed = parser::parse(source);
    let mut errors = parsed.errors;

    match codegen::compile(&parsed.program) {
        Ok(chunk) if errors.is_empty() => Ok(chunk),
        Ok(_) => Err(errors),
        Err(compile_errors) => {
            errors.extend(compile_errors.into_iter().map(MiniRubyError::from));
            Err(errors)
        }
    }
}

/// Compile and execute source text. The VM reads from `stdin` and writes to
/// `stdout`; the final value of the program is returned.
pub fn interpret(
    source: &str,
    stdout: &mut dyn Write,
    stdin: &mut dyn BufRead,
) -> Result<Value, Vec<MiniRubyError>> {
    let chunk = compile(source)?;
    let mut vm = Vm::new(&chunk, stdout, stdin);
    vm.run().map_err(|error| vec![error.into()])
}

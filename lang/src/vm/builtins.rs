//! Native functions callable from bytecode.
//!
//! The registry is a constant table: built once, never mutated, safe to
//! share between VM instances. `CALL` looks a function up by name, checks
//! its arity, and invokes it with the receiver at argument position 0.

use super::value::Value;
use super::{RuntimeError, Vm};

pub struct Builtin {
    pub name: &'static str,
    /// Number of arguments, not counting the receiver.
    pub arity: u8,
    pub func: fn(&mut Vm<'_>, &[Value]) -> Result<Value, RuntimeError>,
}

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "puts",
        arity: 1,
        func: puts,
    },
    Builtin {
        name: "print",
        arity: 1,
        func: print,
    },
    Builtin {
        name: "gets",
        arity: 0,
        func: gets,
    },
    Builtin {
        name: "len",
        arity: 1,
        func: len,
    },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// `puts(x)` — write `x` and a newline to stdout.
fn puts(vm: &mut Vm<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    vm.print_line(&args[1].to_string())?;
    Ok(Value::Nil)
}

/// `print(x)` — write `x` without a trailing newline.
fn print(vm: &mut Vm<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    vm.print(&args[1].to_string())?;
    Ok(Value::Nil)
}

/// `gets()` — read one line from stdin, without its trailing newline.
/// Returns `nil` once the input is exhausted.
fn gets(vm: &mut Vm<'_>, _args: &[Value]) -> Result<Value, RuntimeError> {
    match vm.read_line()? {
        Some(line) => Ok(Value::String(line)),
        None => Ok(Value::Nil),
    }
}

/// `len(s)` — the length of a string, in bytes.
fn len(_vm: &mut Vm<'_>, args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[1] {
        Value::String(s) => Ok(Value::Integer(s.len() as i64)),
        value => Err(RuntimeError::new(format!(
            "len: expected a String, got {}",
            value.type_name()
        ))),
    }
}

//! MiniRuby: an educational bytecode interpreter for a small, Ruby-flavored
//! expression language.
//!
//! The pipeline runs source text through a streaming lexer, an
//! error-recovering recursive-descent parser, a single-pass bytecode
//! compiler, and a stack VM:
//!
//! ```text
//! source -> Lexer -> [Token] -> Parser -> Program -> Compiler -> Chunk -> VM -> Value
//! ```

pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod runner;
pub mod vm;

pub use codegen::{disassemble, Chunk};
pub use error::MiniRubyError;
pub use lexer::lex;
pub use parser::{parse, ParsedProgram};
pub use runner::{compile, interpret};
pub use vm::value::Value;

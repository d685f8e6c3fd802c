//! Unified error handling for MiniRuby.
//!
//! Every pipeline stage reports through one error type that carries the
//! source span where one is known. Lexer failures travel the token stream as
//! `ERROR` tokens and are folded in by the parser; compiler and VM errors
//! convert via `From`.


use crate::codegen::compiler::CompileError;
use crate::lexer::token::Span;
use crate::vm::RuntimeError;
use std::fmt;

/// An error from any phase of compilation or execution.
#[derive(Debug, Clone, PartialEq)]
pub enum MiniRubyError {
    /// Tokenization failed (surfaced via an `ERROR` token).
    LexError { message: String, span: Span },

    /// Syntax error; the parser recovered and kept going.
    ParseError { message: String, span: Span },

    /// Code generation failed.
    CompileError { message: String, span: Span },

    /// Execution failed; fatal, the VM halts.
    RuntimeError { message: String },
}

impl MiniRubyError {
    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        MiniRubyError::LexError {
            message: message.into(),
            span,
        }
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        MiniRubyError::ParseError {
            message: message.into(),
            span,
        }
    }

    pub fn compile(message: impl Into<String>, span: Span) -> Self {
        MiniRubyError::CompileError {
            message: message.into(),
            span,
        }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        MiniRubyError::RuntimeError {
            message: message.into(),
        }
    }

    /// Short phase name, e.g. `"ParseError"`.
    pub fn kind(&self) -> &'static str {
        match self {
            MiniRubyError::LexError { .. } => "LexError",
            MiniRubyError::ParseError { .. } => "ParseError",
            MiniRubyError::CompileError { .. } => "CompileError",
            MiniRubyError::RuntimeError { .. } => "RuntimeError",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            MiniRubyError::LexError { message, .. }
            | MiniRubyError::ParseError { message, .. }
            | MiniRubyError::CompileError { message, .. }
            | MiniRubyError::RuntimeError { message } => message,
        }
    }

    /// The source range, where one is known.
    pub fn span(&self) -> Option<Span> {
        match self {
            MiniRubyError::LexError { span, .. }
            | MiniRubyError::ParseError { span, .. }
            | MiniRubyError::CompileError { span, .. } => Some(*span),
            MiniRubyError::RuntimeError { .. } => None,
        }
    }
}

impl fmt::Display for MiniRubyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span() {
            Some(span) => write!(f, "{} at {}: {}", self.kind(), span, self.message()),
            None => write!(f, "{}: {}", self.kind(), self.message()),
        }
    }
}

impl std::error::Error for MiniRubyError {}

impl From<CompileError> for MiniRubyError {
    fn from(err: CompileError) -> Self {
        MiniRubyError::compile(err.message, err.span)
    }
}

impl From<RuntimeError> for MiniRubyError {
    fn from(err: RuntimeError) -> Self {
        MiniRubyError::runtime(err.message)
    }
}

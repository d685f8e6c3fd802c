//! Single-pass bytecode compiler.
//!
//! Walks the syntax tree once, emitting instructions as it goes. Forward
//! jumps are emitted with a placeholder operand and patched once the jump
//! target is known. Errors accumulate so one run reports as much as
//! possible; a chunk with any recorded error is discarded.

use std::collections::HashMap;

use crate::lexer::token::{Span, TokenKind};
use crate::parser::ast::{Node, NodeKind};
use crate::vm::value::Value;

use super::chunk::Chunk;
use super::opcode::Opcode;

/// Upper bound on local slots, including the reserved `self` slot.
pub const MAX_LOCALS: usize = 256;

/// Slot 0 always holds `self`.
const PREDEFINED_LOCALS: usize = 1;

/// Operand emitted for forward jumps (patched later) and as the sentinel
/// index once an emit has already failed.
const PLACEHOLDER: u8 = 0xff;

#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
}

/// Compile a parsed program into a bytecode chunk, or report every problem
/// found along the way.
pub fn compile(program: &Node) -> Result<Chunk, Vec<CompileError>> {
    let mut compiler = Compiler::new("main", "(eval)", program.span);
    compiler.compile_program(program);
    compiler.finish()
}

struct Compiler {
    chunk: Chunk,
    locals: HashMap<String, u8>,
    last_slot: usize,
    errors: Vec<CompileError>,
}

impl Compiler {
    fn new(name: &str, filename: &str, span: Span) -> Self {
        Self {
            chunk: Chunk::new(name, filename, span),
            locals: HashMap::new(),
            last_slot: PREDEFINED_LOCALS - 1,
            errors: Vec::new(),
        }
    }

    fn compile_program(&mut self, program: &Node) {
        match &program.kind {
            NodeKind::Program { statements } => self.compile_statements(statements),
            _ => self.compile_node(program),
        }
        self.emit(Opcode::Return);
    }

    fn finish(mut self) -> Result<Chunk, Vec<CompileError>> {
        let extra_locals = self.last_slot + 1 - PREDEFINED_LOCALS;
        if extra_locals > 0 {
            self.chunk
                .prepend_bytes(&[Opcode::PrepLocals as u8, extra_locals as u8]);
        }

        if self.errors.is_empty() {
            Ok(self.chunk)
        } else {
            Err(self.errors)
        }
    }

    /// Compile a statement list, dropping every value but the last so the
    /// list as a whole leaves exactly one value. An empty list yields `nil`.
    fn compile_statements(&mut self, statements: &[Node]) {
        if statements.is_empty() {
            self.emit(Opcode::Nil);
            return;
        }

        for (index, statement) in statements.iter().enumerate() {
            if index > 0 {
                self.emit(Opcode::Pop);
            }
            self.compile_node(statement);
        }
    }

    fn compile_node(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Program { statements } => self.compile_statements(statements),
            NodeKind::ExpressionStatement { expression } => self.compile_node(expression),
            // The parser already reported this; keep the stack shape intact.
            NodeKind::Invalid { .. } => self.emit(Opcode::Nil),

            NodeKind::IntegerLiteral { digits } => match digits.parse::<i64>() {
                Ok(value) => self.emit_constant(Value::Integer(value), node.span),
                Err(_) => {
                    self.error(format!("integer literal out of range: {digits}"), node.span);
                    self.emit(Opcode::Nil);
                }
            },
            NodeKind::FloatLiteral { digits } => match digits.parse::<f64>() {
                Ok(value) => self.emit_constant(Value::Float(value), node.span),
                Err(_) => {
                    self.error(format!("invalid float literal: {digits}"), node.span);
                    self.emit(Opcode::Nil);
                }
            },
            NodeKind::StringLiteral { value } => {
                self.emit_constant(Value::String(value.clone()), node.span);
            }
            NodeKind::TrueLiteral => self.emit(Opcode::True),
            NodeKind::FalseLiteral => self.emit(Opcode::False),
            NodeKind::NilLiteral => self.emit(Opcode::Nil),
            NodeKind::SelfLiteral => self.emit(Opcode::SelfRef),

            NodeKind::Identifier { name } => match self.locals.get(name) {
                Some(&slot) => self.emit_with(Opcode::GetLocal, slot),
                None => self.error(format!("undefined local: {name}"), node.span),
            },

            NodeKind::Unary { operator, operand } => {
                self.compile_node(operand);
                match operator {
                    TokenKind::Minus => self.emit(Opcode::Negate),
                    TokenKind::Bang => self.emit(Opcode::Not),
                    // Unary plus leaves its operand untouched.
                    TokenKind::Plus => {}
                    other => self.error(format!("unsupported unary operator {other}"), node.span),
                }
            }

            NodeKind::Binary {
                operator,
                left,
                right,
            } => {
                self.compile_node(left);
                self.compile_node(right);
                match operator {
                    TokenKind::Plus => self.emit(Opcode::Add),
                    TokenKind::Minus => self.emit(Opcode::Subtract),
                    TokenKind::Star => self.emit(Opcode::Multiply),
                    TokenKind::Slash => self.emit(Opcode::Divide),
                    TokenKind::EqualEqual => self.emit(Opcode::Equal),
                    TokenKind::NotEqual => {
                        self.emit(Opcode::Equal);
                        self.emit(Opcode::Not);
                    }
                    TokenKind::Greater => self.emit(Opcode::Greater),
                    TokenKind::GreaterEqual => self.emit(Opcode::GreaterEqual),
                    TokenKind::Less => self.emit(Opcode::Less),
                    TokenKind::LessEqual => self.emit(Opcode::LessEqual),
                    other => self.error(format!("unsupported binary operator {other}"), node.span),
                }
            }

            NodeKind::Assignment { target, value } => {
                self.compile_node(value);
                // SET_LOCAL leaves the value on the stack; assignments are
                // expressions.
                if let NodeKind::Identifier { name } = &target.kind {
                    if let Some(slot) = self.resolve_or_allocate(name, target.span) {
                        self.emit_with(Opcode::SetLocal, slot);
                    }
                }
            }

            NodeKind::Return { value } => {
                match value {
                    Some(value) => self.compile_node(value),
                    None => self.emit(Opcode::Nil),
                }
                self.emit(Opcode::Return);
            }

            NodeKind::If {
                condition,
                then_body,
                else_body,
            } => {
                self.compile_node(condition);
                let skip_then = self.emit_jump(Opcode::JumpUnless);
                self.compile_statements(then_body);
                let skip_else = self.emit_jump(Opcode::Jump);
                self.patch_jump(skip_then, node.span);
                match else_body {
                    Some(body) => self.compile_statements(body),
                    None => self.emit(Opcode::Nil),
                }
                self.patch_jump(skip_else, node.span);
            }

            NodeKind::While { condition, body } => {
                // The loop's value before any iteration completes.
                self.emit(Opcode::Nil);
                let start = self.chunk.len();
                self.compile_node(condition);
                let exit = self.emit_jump(Opcode::JumpUnless);
                // Discard the previous iteration's value.
                self.emit(Opcode::Pop);
                self.compile_statements(body);
                self.emit_loop(start, node.span);
                self.patch_jump(exit, node.span);
            }

            NodeKind::FunctionCall { name, arguments } => {
                self.emit(Opcode::SelfRef);
                for argument in arguments {
                    self.compile_node(argument);
                }
                if arguments.len() > u8::MAX as usize {
                    self.error(format!("too many arguments to call: {name}"), node.span);
                    return;
                }
                let info = Value::CallInfo {
                    name: name.clone(),
                    arg_count: arguments.len() as u8,
                };
                let index = self.value_index(info, node.span);
                self.emit_with(Opcode::Call, index);
            }
        }
    }

    /// Allocate the next free slot for a new local, or return the existing
    /// one.
    fn resolve_or_allocate(&mut self, name: &str, span: Span) -> Option<u8> {
        if let Some(&slot) = self.locals.get(name) {
            return Some(slot);
        }
        let slot = self.last_slot + 1;
        if slot >= MAX_LOCALS {
            self.error(
                format!("exceeded the maximum number of local variables ({MAX_LOCALS}): {name}"),
                span,
            );
            return None;
        }
        self.last_slot = slot;
        self.locals.insert(name.to_string(), slot as u8);
        Some(slot as u8)
    }

    fn emit(&mut self, op: Opcode) {
        self.chunk.push_bytes(&[op as u8]);
    }

    fn emit_with(&mut self, op: Opcode, operand: u8) {
        self.chunk.push_bytes(&[op as u8, operand]);
    }

    fn emit_constant(&mut self, value: Value, span: Span) {
        let index = self.value_index(value, span);
        self.emit_with(Opcode::LoadValue, index);
    }

    fn value_index(&mut self, value: Value, span: Span) -> u8 {
        match self.chunk.add_value(value) {
            Some(index) => index,
            None => {
                self.error(
                    format!("value pool limit reached: {}", super::chunk::VALUE_POOL_LIMIT),
                    span,
                );
                PLACEHOLDER
            }
        }
    }

    /// Emit a forward jump with a placeholder operand; returns the operand's
    /// offset for patching.
    fn emit_jump(&mut self, op: Opcode) -> usize {
        self.emit_with(op, PLACEHOLDER);
        self.chunk.len() - 1
    }

    /// Point a previously emitted forward jump at the current end of the
    /// chunk.
    fn patch_jump(&mut self, operand_offset: usize, span: Span) {
        let distance = self.chunk.len() - operand_offset - 1;
        if distance > u8::MAX as usize {
            self.error(format!("too many bytes to jump over: {distance}"), span);
            return;
        }
        self.chunk.patch_byte(operand_offset, distance as u8);
    }

    /// Emit a backward jump to `start`. The distance includes the `LOOP`
    /// instruction itself plus its operand.
    fn emit_loop(&mut self, start: usize, span: Span) {
        let distance = self.chunk.len() - start + 2;
        if distance > u8::MAX as usize {
            self.error(format!("too many bytes to jump backward: {distance}"), span);
            self.emit_with(Opcode::Loop, PLACEHOLDER);
            return;
        }
        self.emit_with(Opcode::Loop, distance as u8);
    }

    fn error(&mut self, message: String, span: Span) {
        self.errors.push(CompileError { message, span });
    }
}

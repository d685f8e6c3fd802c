/// A single VM instruction. Under the hood each opcode is one byte; the
/// numbering is fixed by declaration order and is part of the bytecode
/// format.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Noop = 0,
    Pop,
    Dup,
    InspectStack,

    Add,
    Subtract,
    Multiply,
    Divide,
    Negate,

    Equal,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Not,

    /// Push a value-pool entry; operand is the pool index.
    LoadValue,
    True,
    False,
    Nil,
    SelfRef,

    Return,

    /// Forward jump; operand is an unsigned byte delta added to `ip`.
    Jump,
    /// Backward jump; operand is an unsigned byte delta subtracted from `ip`.
    Loop,
    /// Forward jump taken when the popped condition is falsy.
    JumpUnless,

    /// Invoke a native function; operand indexes a `CallInfo` pool entry.
    Call,

    /// Reserve operand-many local slots at the start of execution.
    PrepLocals,
    GetLocal,
    SetLocal,
}

impl Opcode {
    /// Decode a raw byte. Bytes outside the opcode range are a runtime
    /// error, not an unchecked transmute.
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        use Opcode::*;
        Some(match byte {
            0 => Noop,
            1 => Pop,
            2 => Dup,
            3 => InspectStack,
            4 => Add,
            5 => Subtract,
            6 => Multiply,
            7 => Divide,
            8 => Negate,
            9 => Equal,
            10 => Greater,
            11 => GreaterEqual,
            12 => Less,
            13 => LessEqual,
            14 => Not,
            15 => LoadValue,
            16 => True,
            17 => False,
            18 => Nil,
            19 => SelfRef,
            20 => Return,
            21 => Jump,
            22 => Loop,
            23 => JumpUnless,
            24 => Call,
            25 => PrepLocals,
            26 => GetLocal,
            27 => SetLocal,
            _ => return None,
        })
    }

    /// Whether the opcode is followed by a one-byte operand.
    pub fn has_operand(&self) -> bool {
        matches!(
            self,
            Opcode::LoadValue
                | Opcode::Jump
                | Opcode::Loop
                | Opcode::JumpUnless
                | Opcode::Call
                | Opcode::PrepLocals
                | Opcode::GetLocal
                | Opcode::SetLocal
        )
    }

    /// The name used by the disassembler.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Noop => "NOOP",
            Opcode::Pop => "POP",
            Opcode::Dup => "DUP",
            Opcode::InspectStack => "INSPECT_STACK",
            Opcode::Add => "ADD",
            Opcode::Subtract => "SUBTRACT",
            Opcode::Multiply => "MULTIPLY",
            Opcode::Divide => "DIVIDE",
            Opcode::Negate => "NEGATE",
            Opcode::Equal => "EQUAL",
            Opcode::Greater => "GREATER",
            Opcode::GreaterEqual => "GREATER_EQUAL",
            Opcode::Less => "LESS",
            Opcode::LessEqual => "LESS_EQUAL",
            Opcode::Not => "NOT",
            Opcode::LoadValue => "LOAD_VALUE",
            Opcode::True => "TRUE",
            Opcode::False => "FALSE",
            Opcode::Nil => "NIL",
            Opcode::SelfRef => "SELF",
            Opcode::Return => "RETURN",
            Opcode::Jump => "JUMP",
            Opcode::Loop => "LOOP",
            Opcode::JumpUnless => "JUMP_UNLESS",
            Opcode::Call => "CALL",
            Opcode::PrepLocals => "PREP_LOCALS",
            Opcode::GetLocal => "GET_LOCAL",
            Opcode::SetLocal => "SET_LOCAL",
        }
    }
}

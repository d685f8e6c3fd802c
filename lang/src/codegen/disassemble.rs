//! Human-readable rendering of compiled chunks, used by the CLI's
//! `--bytecode` flag and by tests.

use crate::vm::value::Value;

use super::chunk::Chunk;
use super::opcode::Opcode;

/// Render a chunk: a header, one line per instruction, and the value pool.
pub fn disassemble(chunk: &Chunk) -> String {
    let mut out = String::new();

    out.push_str(&format!("== {} ({}) ==\n", chunk.name, chunk.filename));

    let mut offset = 0;
    while offset < chunk.instructions.len() {
        offset = disassemble_instruction(chunk, offset, &mut out);
    }

    if !chunk.value_pool.is_empty() {
        out.push_str("values:\n");
        for (index, value) in chunk.value_pool.iter().enumerate() {
            out.push_str(&format!("  {index:3} {}\n", render_value(value)));
        }
    }

    out
}

/// Render the instruction at `offset`; returns the offset of the next one.
fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let byte = chunk.instructions[offset];

    let Some(op) = Opcode::from_byte(byte) else {
        out.push_str(&format!("{offset:04} ??? {byte}\n"));
        return offset + 1;
    };

    if !op.has_operand() {
        out.push_str(&format!("{offset:04} {}\n", op.mnemonic()));
        return offset + 1;
    }

    let Some(&operand) = chunk.instructions.get(offset + 1) else {
        // Truncated instruction; show what is there.
        out.push_str(&format!("{offset:04} {} <truncated>\n", op.mnemonic()));
        return offset + 1;
    };

    let annotation = match op {
        Opcode::LoadValue | Opcode::Call => chunk
            .value_pool
            .get(operand as usize)
            .map(|value| format!(" ({})", render_value(value)))
            .unwrap_or_else(|| " (?)".to_string()),
        Opcode::Jump | Opcode::JumpUnless => format!(" -> {:04}", offset + 2 + operand as usize),
        Opcode::Loop => format!(" -> {:04}", (offset + 2).saturating_sub(operand as usize)),
        _ => String::new(),
    };

    out.push_str(&format!(
        "{offset:04} {} {operand}{annotation}\n",
        op.mnemonic()
    ));
    offset + 2
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => other.to_string(),
    }
}

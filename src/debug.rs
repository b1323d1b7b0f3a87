use std::fmt::Write;

use crate::{chunk::Chunk, opcode::OpCode};

/// Renders a human-readable listing of a chunk: offset, source line (`|`
/// while the line repeats), mnemonic, and the pooled value for constant
/// loads.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", name);

    let mut offset = 0;
    while offset < chunk.bytes.len() {
        offset = disassemble_instruction(chunk, offset, &mut out);
    }
    out
}

fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let _ = write!(out, "{:04} ", offset);
    if offset > 0 && chunk.line_for(offset) == chunk.line_for(offset - 1) {
        let _ = write!(out, "   | ");
    } else {
        let _ = write!(out, "{:4} ", chunk.line_for(offset));
    }

    let byte = chunk.bytes[offset];
    match OpCode::try_from(byte) {
        Ok(OpCode::Constant) => constant_instruction(chunk, offset, out),
        Ok(op) => {
            let _ = writeln!(out, "{}", op.name());
            offset + 1
        }
        Err(_) => {
            let _ = writeln!(out, "Unknown opcode {}", byte);
            offset + 1
        }
    }
}

fn constant_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let Some(&index) = chunk.bytes.get(offset + 1) else {
        let _ = writeln!(out, "{:<16} <truncated>", OpCode::Constant.name());
        return offset + 1;
    };

    match chunk.constants.get(index as usize) {
        Some(value) => {
            let _ = writeln!(out, "{:<16} {:4} '{}'", OpCode::Constant.name(), index, value);
        }
        None => {
            let _ = writeln!(
                out,
                "{:<16} {:4} <bad constant>",
                OpCode::Constant.name(),
                index
            );
        }
    }
    offset + 2
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::disassemble;
    use crate::{chunk::Chunk, opcode::OpCode, value::Value};

    #[test]
    fn lists_offsets_lines_and_constants() {
        let mut chunk = Chunk::new();
        let index = chunk.write_constant(Value::Number(1.2));
        chunk.write_op(OpCode::Constant, 1);
        chunk.write_byte(index as u8, 1);
        chunk.write_op(OpCode::Negate, 1);
        chunk.write_op(OpCode::Return, 2);

        let expected = "\
== test ==
0000    1 OP_CONSTANT         0 '1.2'
0002    | OP_NEGATE
0003    2 OP_RETURN
";
        assert_eq!(expected, disassemble(&chunk, "test"));
    }
}

use crate::{opcode::OpCode, value::Value};

/// One run of consecutive instruction bytes that share a source line.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LineRun {
    pub line: usize,
    pub count: usize,
}

/// Compiled output for one compilation unit: instruction bytes, a
/// run-length-encoded line index, and the constant pool.
///
/// Invariant: the run counts in `lines` always sum to `bytes.len()`, so
/// every written offset maps back to a source line.
#[derive(PartialEq, Debug)]
pub struct Chunk {
    pub bytes: Vec<u8>,
    pub lines: Vec<LineRun>,
    pub constants: Vec<Value>,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            bytes: vec![],
            lines: vec![],
            constants: vec![],
        }
    }

    pub fn write_op(&mut self, op: OpCode, line: usize) {
        self.write_byte(op.into(), line);
    }

    pub fn write_byte(&mut self, byte: u8, line: usize) {
        self.bytes.push(byte);
        match self.lines.last_mut() {
            Some(run) if run.line == line => run.count += 1,
            _ => self.lines.push(LineRun { line, count: 1 }),
        }
    }

    /// Appends to the constant pool and returns the new index. The caller is
    /// responsible for rejecting indices that do not fit the operand byte.
    pub fn write_constant(&mut self, constant: Value) -> usize {
        self.constants.push(constant);
        self.constants.len() - 1
    }

    /// Source line of the byte at `offset`.
    ///
    /// Panics if `offset` is at or past the end of the written bytes; the
    /// line index covers exactly the bytes written, so an out-of-range query
    /// is a caller bug, not a lookup miss.
    pub fn line_for(&self, offset: usize) -> usize {
        let mut remaining = offset + 1;
        for run in &self.lines {
            if run.count >= remaining {
                return run.line;
            }
            remaining -= run.count;
        }
        panic!(
            "no line recorded for offset {} (chunk holds {} bytes)",
            offset,
            self.bytes.len()
        );
    }
}

impl Default for Chunk {
    fn default() -> Self {
        Self::new()
    }
}

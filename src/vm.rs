use std::rc::Rc;

use crate::{chunk::Chunk, error::RuntimeError, opcode::OpCode, value::Value};

/// Stack machine over the expression opcode set. One chunk in, one value
/// out; runtime type errors carry the source line of the failing
/// instruction via the chunk's line index.
pub struct VM {
    stack: Vec<Value>,
    pc: usize,
}

impl VM {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            pc: 0,
        }
    }

    pub fn interpret(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        self.stack.clear();
        self.pc = 0;
        self.run(chunk)
    }

    fn run(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        loop {
            let op_offset = self.pc;
            let byte = self.read_byte(chunk)?;
            let operation = OpCode::try_from(byte)
                .map_err(|_| RuntimeError::CorruptChunk("unknown opcode byte"))?;

            match operation {
                OpCode::Constant => {
                    let val = self.read_constant(chunk)?;
                    self.stack.push(val);
                }
                OpCode::Nil => self.stack.push(Value::Nil),
                OpCode::True => self.stack.push(Value::Bool(true)),
                OpCode::False => self.stack.push(Value::Bool(false)),
                OpCode::Equal => {
                    let b = self.pop()?;
                    let a = self.pop()?;
                    self.stack.push(Value::Bool(a == b));
                }
                OpCode::Greater => {
                    self.binary_number_op(chunk, op_offset, |a, b| Value::Bool(a > b))?
                }
                OpCode::Less => {
                    self.binary_number_op(chunk, op_offset, |a, b| Value::Bool(a < b))?
                }
                OpCode::Add => self.add(chunk, op_offset)?,
                OpCode::Subtract => {
                    self.binary_number_op(chunk, op_offset, |a, b| Value::Number(a - b))?
                }
                OpCode::Multiply => {
                    self.binary_number_op(chunk, op_offset, |a, b| Value::Number(a * b))?
                }
                OpCode::Divide => {
                    self.binary_number_op(chunk, op_offset, |a, b| Value::Number(a / b))?
                }
                OpCode::Not => {
                    let val = self.pop()?;
                    self.stack.push(Value::Bool(val.is_falsey()));
                }
                OpCode::Negate => {
                    let val = self.pop()?;
                    if let Value::Number(n) = val {
                        self.stack.push(Value::Number(-n));
                    } else {
                        return Err(RuntimeError::OperandNotNumber {
                            line: chunk.line_for(op_offset),
                        });
                    }
                }
                OpCode::Return => {
                    return self.pop();
                }
            }
        }
    }
}

// Helpers
impl VM {
    fn read_byte(&mut self, chunk: &Chunk) -> Result<u8, RuntimeError> {
        let byte = chunk
            .bytes
            .get(self.pc)
            .copied()
            .ok_or(RuntimeError::CorruptChunk("read past end of chunk"))?;
        self.pc += 1;
        Ok(byte)
    }

    fn read_constant(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        let index = self.read_byte(chunk)? as usize;
        chunk
            .constants
            .get(index)
            .cloned()
            .ok_or(RuntimeError::CorruptChunk("constant index out of range"))
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack
            .pop()
            .ok_or(RuntimeError::CorruptChunk("stack underflow"))
    }

    /// Add is the one polymorphic operator: numbers add, strings
    /// concatenate.
    fn add(&mut self, chunk: &Chunk, op_offset: usize) -> Result<(), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        match (a, b) {
            (Value::Number(num_a), Value::Number(num_b)) => {
                self.stack.push(Value::Number(num_a + num_b));
                Ok(())
            }
            (Value::String(str_a), Value::String(str_b)) => {
                self.stack
                    .push(Value::String(Rc::new(str_a.as_str().to_owned() + &str_b)));
                Ok(())
            }
            _ => Err(RuntimeError::AddTypeMismatch {
                line: chunk.line_for(op_offset),
            }),
        }
    }

    fn binary_number_op<T>(
        &mut self,
        chunk: &Chunk,
        op_offset: usize,
        apply: T,
    ) -> Result<(), RuntimeError>
    where
        T: Fn(f64, f64) -> Value,
    {
        let b = self.pop()?;
        let a = self.pop()?;
        match (a, b) {
            (Value::Number(num_a), Value::Number(num_b)) => {
                self.stack.push(apply(num_a, num_b));
                Ok(())
            }
            _ => Err(RuntimeError::OperandsNotNumbers {
                line: chunk.line_for(op_offset),
            }),
        }
    }
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

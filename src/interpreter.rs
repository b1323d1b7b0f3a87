use tracing::debug;

use crate::{chunk::Chunk, compiler::Compiler, error::InterpretError, value::Value, vm::VM};

/// Compiles a single expression into a chunk.
pub fn compile(source: &str) -> Result<Chunk, InterpretError> {
    let chunk = Compiler::new(source)
        .compile()
        .map_err(InterpretError::Compile)?;
    debug!(
        bytes = chunk.bytes.len(),
        constants = chunk.constants.len(),
        "compiled expression"
    );
    Ok(chunk)
}

/// Evaluates a compiled chunk.
pub fn run(chunk: &Chunk) -> Result<Value, InterpretError> {
    let mut vm = VM::new();
    let value = vm.interpret(chunk)?;
    debug!(%value, "evaluated expression");
    Ok(value)
}

/// Compiles a single expression and evaluates it.
pub fn interpret(source: &str) -> Result<Value, InterpretError> {
    let chunk = compile(source)?;
    run(&chunk)
}

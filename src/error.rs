use thiserror::Error;

/// A single compile diagnostic, formatted the way it is printed:
/// `[line N] Error at 'X': message`.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum CompileError {
    #[error("[line {line}] Error at end: {message}")]
    AtEnd { line: usize, message: &'static str },
    /// Anchored to a scanner error token, which has no printable span.
    #[error("[line {line}] Error: {message}")]
    AtLine { line: usize, message: &'static str },
    #[error("[line {line}] Error at '{lexeme}': {message}")]
    AtToken {
        line: usize,
        lexeme: String,
        message: &'static str,
    },
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum RuntimeError {
    #[error("[line {line}] Operand must be a number.")]
    OperandNotNumber { line: usize },
    #[error("[line {line}] Operands must be numbers.")]
    OperandsNotNumbers { line: usize },
    #[error("[line {line}] Operands must be two numbers or two strings.")]
    AddTypeMismatch { line: usize },
    /// The chunk handed to the VM is malformed; only reachable when
    /// executing bytes that did not come out of the compiler.
    #[error("corrupt chunk: {0}")]
    CorruptChunk(&'static str),
}

#[derive(Debug, Error)]
pub enum InterpretError {
    #[error("compilation failed with {} error(s)", .0.len())]
    Compile(Vec<CompileError>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

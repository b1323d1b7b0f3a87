//! A single-pass bytecode compiler and stack VM for Lox expressions.
//!
//! Source text is scanned on demand, parsed with a precedence-climbing
//! (Pratt) parser, and compiled straight into a [`chunk::Chunk`] of
//! instruction bytes with a constant pool and a run-length line index.
//! There is no syntax tree. The [`vm::VM`] then executes the chunk.

pub mod chunk;
pub mod compiler;
pub mod debug;
pub mod error;
pub mod interpreter;
pub mod opcode;
pub mod parse;
pub mod scanner;
pub mod token;
pub mod value;
pub mod vm;

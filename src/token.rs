#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    pub token_type: TokenType,
    /// Index of first lexeme character in source
    pub start: usize,
    /// Length of lexeme in bytes
    pub length: usize,
    pub line: usize,
    /// Set only on `TokenType::Error` tokens.
    pub message: Option<&'static str>,
}

impl Token {
    pub fn new(token_type: TokenType, start: usize, length: usize, line: usize) -> Self {
        Self {
            token_type,
            start,
            length,
            line,
            message: None,
        }
    }

    pub fn error(message: &'static str, start: usize, line: usize) -> Self {
        Self {
            token_type: TokenType::Error,
            start,
            length: 0,
            line,
            message: Some(message),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenType {
    LeftParen,
    RightParen,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    Identifier,
    String,
    Number,
    And,
    Or,
    True,
    False,
    Nil,
    Error,
    Eof,
}

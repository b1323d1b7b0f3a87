use crate::token::{Token, TokenType};

/// On-demand lexer: the compiler pulls one token at a time, nothing is
/// buffered beyond the indices below.
pub struct Scanner<'a> {
    source: &'a str,
    /// The start of the token currently being scanned. (byte index)
    start: usize,
    /// One past the most recently consumed character. (ie the next character (peek()))
    next: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            next: 0,
            line: 1,
        }
    }

    pub fn scan_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.next;

        let Some(c) = self.advance() else {
            return self.make_token(TokenType::Eof);
        };

        if Self::is_alpha(c) {
            return self.identifier();
        }
        if Self::is_digit(c) {
            return self.number();
        }
        match c {
            '(' => self.make_token(TokenType::LeftParen),
            ')' => self.make_token(TokenType::RightParen),
            ',' => self.make_token(TokenType::Comma),
            '.' => self.make_token(TokenType::Dot),
            '-' => self.make_token(TokenType::Minus),
            '+' => self.make_token(TokenType::Plus),
            ';' => self.make_token(TokenType::Semicolon),
            '/' => self.make_token(TokenType::Slash),
            '*' => self.make_token(TokenType::Star),
            '!' => {
                if self.expect('=') {
                    self.make_token(TokenType::BangEqual)
                } else {
                    self.make_token(TokenType::Bang)
                }
            }
            '=' => {
                if self.expect('=') {
                    self.make_token(TokenType::EqualEqual)
                } else {
                    self.make_token(TokenType::Equal)
                }
            }
            '<' => {
                if self.expect('=') {
                    self.make_token(TokenType::LessEqual)
                } else {
                    self.make_token(TokenType::Less)
                }
            }
            '>' => {
                if self.expect('=') {
                    self.make_token(TokenType::GreaterEqual)
                } else {
                    self.make_token(TokenType::Greater)
                }
            }
            '"' => self.string(),
            _ => self.make_err_token("Unexpected character."),
        }
    }
}

impl<'a> Scanner<'a> {
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\r') | Some('\t') => {
                    self.advance();
                }
                Some('\n') => {
                    self.line += 1;
                    self.advance();
                }
                Some('/') if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn string(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.end_reached() {
            return self.make_err_token("Unterminated string.");
        }

        // Closing quote.
        self.advance();
        self.make_token(TokenType::String)
    }

    fn number(&mut self) -> Token {
        while self.peek().is_some_and(Self::is_digit) {
            self.advance();
        }

        if self.peek() == Some('.') && self.peek_next().is_some_and(Self::is_digit) {
            self.advance();
            while self.peek().is_some_and(Self::is_digit) {
                self.advance();
            }
        }

        self.make_token(TokenType::Number)
    }

    fn identifier(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| Self::is_alpha(c) || Self::is_digit(c))
        {
            self.advance();
        }

        let token_type = match &self.source[self.start..self.next] {
            "and" => TokenType::And,
            "or" => TokenType::Or,
            "true" => TokenType::True,
            "false" => TokenType::False,
            "nil" => TokenType::Nil,
            _ => TokenType::Identifier,
        };
        self.make_token(token_type)
    }

    fn is_alpha(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_'
    }

    fn is_digit(c: char) -> bool {
        c.is_ascii_digit()
    }

    fn end_reached(&self) -> bool {
        self.peek().is_none()
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token::new(token_type, self.start, self.next - self.start, self.line)
    }

    fn make_err_token(&self, message: &'static str) -> Token {
        Token::error(message, self.start, self.line)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.next += c.len_utf8();
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.next..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let c = self.peek()?;
        self.source[(self.next + c.len_utf8())..].chars().next()
    }

    fn expect(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            return true;
        }
        false
    }
}

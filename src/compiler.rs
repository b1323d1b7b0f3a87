use std::rc::Rc;

use crate::{
    chunk::Chunk,
    error::CompileError,
    opcode::OpCode,
    parse::{ParseFn, ParsePrecedence, ParseRule},
    scanner::Scanner,
    token::{Token, TokenType},
    value::Value,
};

/// Single-pass expression compiler: precedence-climbing parse actions emit
/// bytecode into the chunk as they go, no syntax tree in between.
pub struct Compiler<'a> {
    scanner: Scanner<'a>,
    source: &'a str,
    previous_token: Token,
    current_token: Token,
    had_error: bool,
    panic_mode: bool,
    errors: Vec<CompileError>,
    chunk: Chunk,
}

impl<'a> Compiler<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            scanner: Scanner::new(source),
            source,
            // Placeholders, overwritten by the first advance().
            previous_token: Token::new(TokenType::Eof, 0, 0, 0),
            current_token: Token::new(TokenType::Eof, 0, 0, 0),
            had_error: false,
            panic_mode: false,
            errors: vec![],
            chunk: Chunk::new(),
        }
    }

    /// Compiles a single expression terminated by end of input.
    ///
    /// A failed compile reports every non-suppressed diagnostic to stderr,
    /// runs to the end of the pass, and returns the collected errors; the
    /// partially emitted chunk is dropped.
    pub fn compile(mut self) -> Result<Chunk, Vec<CompileError>> {
        self.advance();
        self.expression();
        self.consume(TokenType::Eof, "Expect end of expression.");
        self.emit_op(OpCode::Return);

        if self.had_error {
            return Err(self.errors);
        }
        Ok(self.chunk)
    }
}

// Parse actions
impl<'a> Compiler<'a> {
    fn expression(&mut self) {
        self.parse_precedence(ParsePrecedence::Assignment);
    }

    fn number(&mut self) {
        let lexeme = self.lexeme(self.previous_token);
        if let Ok(number) = lexeme.parse::<f64>() {
            self.emit_constant(Value::Number(number));
        } else {
            self.error_at_previous("Failed to parse number.");
        }
    }

    fn string(&mut self) {
        let token = self.previous_token;
        // Strip the surrounding quotes.
        let val = &self.source[(token.start + 1)..(token.start + token.length - 1)];
        self.emit_constant(Value::String(Rc::new(val.to_owned())));
    }

    fn literal(&mut self) {
        match self.previous_token.token_type {
            TokenType::True => self.emit_op(OpCode::True),
            TokenType::False => self.emit_op(OpCode::False),
            TokenType::Nil => self.emit_op(OpCode::Nil),
            _ => (),
        }
    }

    fn grouping(&mut self) {
        self.expression();
        self.consume(TokenType::RightParen, "Expect ')' after expression.");
    }

    fn unary(&mut self) {
        let operator = self.previous_token.token_type;
        self.parse_precedence(ParsePrecedence::Unary);

        match operator {
            TokenType::Bang => self.emit_op(OpCode::Not),
            TokenType::Minus => self.emit_op(OpCode::Negate),
            _ => self.error_at_previous("Unreachable unary operator...reached."),
        }
    }

    fn binary(&mut self) {
        let operator = self.previous_token.token_type;
        let operator_rule_prec = self.get_rule(operator).precedence;
        // One level above our own precedence keeps binary operators
        // left-associative.
        match ParsePrecedence::try_from(u8::from(operator_rule_prec) + 1) {
            Ok(new_precedence) => self.parse_precedence(new_precedence),
            Err(msg) => self.error_at_previous(msg),
        }

        // Only equal/greater/less exist natively; the other three
        // comparisons are their complement plus a not.
        match operator {
            TokenType::BangEqual => self.emit_ops(OpCode::Equal, OpCode::Not),
            TokenType::EqualEqual => self.emit_op(OpCode::Equal),
            TokenType::Greater => self.emit_op(OpCode::Greater),
            TokenType::GreaterEqual => self.emit_ops(OpCode::Less, OpCode::Not),
            TokenType::Less => self.emit_op(OpCode::Less),
            TokenType::LessEqual => self.emit_ops(OpCode::Greater, OpCode::Not),
            TokenType::Plus => self.emit_op(OpCode::Add),
            TokenType::Minus => self.emit_op(OpCode::Subtract),
            TokenType::Star => self.emit_op(OpCode::Multiply),
            TokenType::Slash => self.emit_op(OpCode::Divide),
            _ => self.error_at_previous("binary operator mismatch."),
        }
    }

    fn parse_precedence(&mut self, precedence: ParsePrecedence) {
        self.advance();
        let prefix_fn = self.get_rule(self.previous_token.token_type).prefix;
        if prefix_fn == ParseFn::None {
            self.error_at_previous("Expect expression.");
            return;
        }

        self.call_parse_fn(prefix_fn);

        while precedence <= self.get_rule(self.current_token.token_type).precedence {
            self.advance();
            let infix_fn = self.get_rule(self.previous_token.token_type).infix;
            self.call_parse_fn(infix_fn);
        }
    }

    fn call_parse_fn(&mut self, parse_fn: ParseFn) {
        match parse_fn {
            ParseFn::None => (),
            ParseFn::Number => self.number(),
            ParseFn::String => self.string(),
            ParseFn::Literal => self.literal(),
            ParseFn::Grouping => self.grouping(),
            ParseFn::Unary => self.unary(),
            ParseFn::Binary => self.binary(),
        }
    }

    fn get_rule(&self, token_type: TokenType) -> ParseRule {
        match token_type {
            TokenType::LeftParen =>     ParseRule::new(ParseFn::Grouping, ParseFn::None, ParsePrecedence::None),
            TokenType::RightParen =>    ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::Comma =>         ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::Dot =>           ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::Minus =>         ParseRule::new(ParseFn::Unary, ParseFn::Binary, ParsePrecedence::Term),
            TokenType::Plus =>          ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Term),
            TokenType::Semicolon =>     ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::Slash =>         ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Factor),
            TokenType::Star =>          ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Factor),
            TokenType::Bang =>          ParseRule::new(ParseFn::Unary, ParseFn::None, ParsePrecedence::None),
            TokenType::BangEqual =>     ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Equality),
            TokenType::Equal =>         ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::EqualEqual =>    ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Equality),
            TokenType::Greater =>       ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Comparison),
            TokenType::GreaterEqual =>  ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Comparison),
            TokenType::Less =>          ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Comparison),
            TokenType::LessEqual =>     ParseRule::new(ParseFn::None, ParseFn::Binary, ParsePrecedence::Comparison),
            TokenType::Identifier =>    ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::String =>        ParseRule::new(ParseFn::String, ParseFn::None, ParsePrecedence::None),
            TokenType::Number =>        ParseRule::new(ParseFn::Number, ParseFn::None, ParsePrecedence::None),
            TokenType::And =>           ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::Or =>            ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::True =>          ParseRule::new(ParseFn::Literal, ParseFn::None, ParsePrecedence::None),
            TokenType::False =>         ParseRule::new(ParseFn::Literal, ParseFn::None, ParsePrecedence::None),
            TokenType::Nil =>           ParseRule::new(ParseFn::Literal, ParseFn::None, ParsePrecedence::None),
            TokenType::Error =>         ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
            TokenType::Eof =>           ParseRule::new(ParseFn::None, ParseFn::None, ParsePrecedence::None),
        }
    }
}

// Bytecode emission
impl<'a> Compiler<'a> {
    fn emit_op(&mut self, code: OpCode) {
        self.emit_byte(code);
    }

    fn emit_ops(&mut self, op1: OpCode, op2: OpCode) {
        self.emit_op(op1);
        self.emit_op(op2);
    }

    fn emit_byte(&mut self, byte: impl Into<u8>) {
        let line = self.previous_token.line;
        self.chunk.write_byte(byte.into(), line);
    }

    fn emit_constant(&mut self, value: Value) {
        self.emit_op(OpCode::Constant);
        let constant_index = self.make_constant(value);
        self.emit_byte(constant_index);
    }

    fn make_constant(&mut self, value: Value) -> u8 {
        let constant_index = self.chunk.write_constant(value);
        match u8::try_from(constant_index) {
            Ok(index_u8) => index_u8,
            Err(_) => {
                // Placeholder index so the pass can keep going and surface
                // later errors.
                self.error_at_previous("Too many constants in one chunk.");
                0
            }
        }
    }
}

// Helpers
impl<'a> Compiler<'a> {
    fn advance(&mut self) {
        self.previous_token = self.current_token;
        loop {
            self.current_token = self.scanner.scan_token();
            if self.current_token.token_type != TokenType::Error {
                break;
            }
            let message = self.current_token.message.unwrap_or("Unexpected character.");
            self.error_at_current(message);
        }
    }

    fn consume(&mut self, token_type: TokenType, message: &'static str) {
        if self.current_token.token_type == token_type {
            self.advance();
            return;
        }
        self.error_at_current(message);
    }

    fn lexeme(&self, token: Token) -> &'a str {
        &self.source[token.start..(token.start + token.length)]
    }

    fn error_at_current(&mut self, message: &'static str) {
        self.error_at(self.current_token, message);
    }

    fn error_at_previous(&mut self, message: &'static str) {
        self.error_at(self.previous_token, message);
    }

    fn error_at(&mut self, token: Token, message: &'static str) {
        // Panic mode: the first error wins, the cascade is dropped.
        if self.panic_mode {
            return;
        }
        self.panic_mode = true;

        let error = match token.token_type {
            TokenType::Eof => CompileError::AtEnd {
                line: token.line,
                message,
            },
            TokenType::Error => CompileError::AtLine {
                line: token.line,
                message,
            },
            _ => CompileError::AtToken {
                line: token.line,
                lexeme: self.lexeme(token).to_owned(),
                message,
            },
        };

        eprintln!("{}", error);
        self.errors.push(error);
        self.had_error = true;
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::Compiler;
    use crate::{
        chunk::{Chunk, LineRun},
        error::CompileError,
        opcode::OpCode,
        value::Value,
    };

    fn compile(source: &str) -> Chunk {
        Compiler::new(source)
            .compile()
            .expect("expected a clean compile")
    }

    fn compile_errors(source: &str) -> Vec<CompileError> {
        Compiler::new(source)
            .compile()
            .expect_err("expected a failed compile")
    }

    #[test]
    fn arithmetic_precedence() {
        let expected = Chunk {
            bytes: vec![
                OpCode::Constant.into(),
                0,
                OpCode::Constant.into(),
                1,
                OpCode::Constant.into(),
                2,
                OpCode::Multiply.into(),
                OpCode::Add.into(),
                OpCode::Return.into(),
            ],
            lines: vec![LineRun { line: 1, count: 9 }],
            constants: vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
        };

        assert_eq!(expected, compile("1 + 2 * 3"));
    }

    #[test]
    fn grouping_overrides_precedence() {
        let expected = Chunk {
            bytes: vec![
                OpCode::Constant.into(),
                0,
                OpCode::Constant.into(),
                1,
                OpCode::Add.into(),
                OpCode::Constant.into(),
                2,
                OpCode::Multiply.into(),
                OpCode::Return.into(),
            ],
            lines: vec![LineRun { line: 1, count: 9 }],
            constants: vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
        };

        assert_eq!(expected, compile("(1 + 2) * 3"));
    }

    #[test]
    fn subtraction_is_left_associative() {
        // (1 - 2) - 3, not 1 - (2 - 3).
        let expected = Chunk {
            bytes: vec![
                OpCode::Constant.into(),
                0,
                OpCode::Constant.into(),
                1,
                OpCode::Subtract.into(),
                OpCode::Constant.into(),
                2,
                OpCode::Subtract.into(),
                OpCode::Return.into(),
            ],
            lines: vec![LineRun { line: 1, count: 9 }],
            constants: vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)],
        };

        assert_eq!(expected, compile("1 - 2 - 3"));
    }

    #[test]
    fn unary_negation() {
        let expected = Chunk {
            bytes: vec![
                OpCode::Constant.into(),
                0,
                OpCode::Negate.into(),
                OpCode::Return.into(),
            ],
            lines: vec![LineRun { line: 1, count: 4 }],
            constants: vec![Value::Number(10.4)],
        };

        assert_eq!(expected, compile("-10.4"));
    }

    #[test]
    fn comparisons_compose_with_not() {
        // No native <=, >=, or != opcodes.
        let less_equal = compile("1 <= 2");
        assert_eq!(
            vec![
                OpCode::Constant.into(),
                0,
                OpCode::Constant.into(),
                1,
                OpCode::Greater.into(),
                OpCode::Not.into(),
                OpCode::Return.into(),
            ],
            less_equal.bytes
        );

        let greater_equal = compile("1 >= 2");
        assert_eq!(
            vec![
                OpCode::Constant.into(),
                0,
                OpCode::Constant.into(),
                1,
                OpCode::Less.into(),
                OpCode::Not.into(),
                OpCode::Return.into(),
            ],
            greater_equal.bytes
        );

        let bang_equal = compile("1 != 2");
        assert_eq!(
            vec![
                OpCode::Constant.into(),
                0,
                OpCode::Constant.into(),
                1,
                OpCode::Equal.into(),
                OpCode::Not.into(),
                OpCode::Return.into(),
            ],
            bang_equal.bytes
        );
    }

    #[test]
    fn keyword_literals_do_not_touch_the_pool() {
        let expected = Chunk {
            bytes: vec![
                OpCode::Nil.into(),
                OpCode::Not.into(),
                OpCode::True.into(),
                OpCode::Equal.into(),
                OpCode::Return.into(),
            ],
            lines: vec![LineRun { line: 1, count: 5 }],
            constants: vec![],
        };

        assert_eq!(expected, compile("!nil == true"));
    }

    #[test]
    fn string_literal_strips_quotes() {
        let chunk = compile(r#""hello""#);
        assert_eq!(
            vec![Value::String(std::rc::Rc::new("hello".to_owned()))],
            chunk.constants
        );
        assert_eq!(
            vec![OpCode::Constant.into(), 0, OpCode::Return.into()],
            chunk.bytes
        );
    }

    #[test]
    fn bytes_carry_the_line_of_their_token() {
        let chunk = compile("1 +\n2");
        assert_eq!(
            vec![LineRun { line: 1, count: 2 }, LineRun { line: 2, count: 4 }],
            chunk.lines
        );
        // Round trip through the index: the second constant load and the
        // final return all sit on line 2.
        assert_eq!(1, chunk.line_for(0));
        assert_eq!(1, chunk.line_for(1));
        assert_eq!(2, chunk.line_for(2));
        assert_eq!(2, chunk.line_for(5));
    }

    #[test]
    fn error_trailing_operator() {
        let errors = compile_errors("1 +");
        assert_eq!(
            vec![CompileError::AtEnd {
                line: 1,
                message: "Expect expression.",
            }],
            errors
        );
    }

    #[test]
    fn error_trailing_operator_after_strings() {
        let errors = compile_errors(r#""a" + "b" +"#);
        assert_eq!(
            vec![CompileError::AtEnd {
                line: 1,
                message: "Expect expression.",
            }],
            errors
        );
    }

    #[test]
    fn error_cascade_is_suppressed() {
        // Missing operand and missing ')' , but only the first is reported.
        let errors = compile_errors("(1 +");
        assert_eq!(1, errors.len());
        assert_eq!(
            CompileError::AtEnd {
                line: 1,
                message: "Expect expression.",
            },
            errors[0]
        );
    }

    #[test]
    fn error_expected_end_of_expression() {
        let errors = compile_errors("1 2");
        assert_eq!(
            vec![CompileError::AtToken {
                line: 1,
                lexeme: "2".to_owned(),
                message: "Expect end of expression.",
            }],
            errors
        );
    }

    #[test]
    fn error_unexpected_character() {
        let errors = compile_errors("1 + @ 2");
        assert_eq!(
            vec![CompileError::AtLine {
                line: 1,
                message: "Unexpected character.",
            }],
            errors
        );
    }

    #[test]
    fn error_too_many_constants() {
        let source = (0..257)
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        let errors = compile_errors(&source);

        assert_eq!(1, errors.len());
        assert_eq!(
            CompileError::AtToken {
                line: 1,
                lexeme: "256".to_owned(),
                message: "Too many constants in one chunk.",
            },
            errors[0]
        );
    }

    #[test]
    fn overflowing_constant_gets_placeholder_operand() {
        let source = (0..257)
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        // The chunk is garbage by contract, but it must never hold an
        // operand its pool cannot resolve. Peek at it by driving the pass
        // without the final error check.
        let mut compiler = Compiler::new(&source);
        compiler.advance();
        compiler.expression();

        let chunk = &compiler.chunk;
        let mut offset = 0;
        while offset < chunk.bytes.len() {
            match OpCode::try_from(chunk.bytes[offset]).expect("valid opcode") {
                OpCode::Constant => {
                    let operand = chunk.bytes[offset + 1] as usize;
                    assert!(operand < chunk.constants.len());
                    offset += 2;
                }
                _ => offset += 1,
            }
        }
    }

    #[test]
    fn empty_input_expects_an_expression() {
        let errors = compile_errors("");
        assert_eq!(
            vec![CompileError::AtEnd {
                line: 1,
                message: "Expect expression.",
            }],
            errors
        );
    }
}

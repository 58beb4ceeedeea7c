//! Lexer module

pub mod tokens;

use tokens::*;

pub use tokenizer::tokenize;

/// Lexer error
#[derive(Debug, Clone, thiserror::Error)]
pub enum LexError {
    #[error("unterminated string starting at {position}")]
    UnterminatedString { position: String },
    #[error("invalid escape sequence: \\{sequence}")]
    InvalidEscape { sequence: String },
    #[error("invalid number literal: {0}")]
    InvalidNumber(String),
    #[error("unexpected character: '{ch}'")]
    UnexpectedChar { ch: char },
}

/// Tokenize source code
mod tokenizer {
    use super::*;
    use crate::util::span::{Position, Span};
    use std::iter::Peekable;
    use std::str::Chars;

    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        while let Some(token) = lexer.next_token() {
            tokens.push(token);
        }

        if let Some(err) = lexer.error {
            Err(err)
        } else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                span: Span::new(
                    Position::with_offset(lexer.line, lexer.column, lexer.offset),
                    Position::with_offset(lexer.line, lexer.column + 1, lexer.offset + 1),
                ),
            });
            Ok(tokens)
        }
    }

    struct Lexer<'a> {
        chars: Peekable<Chars<'a>>,
        offset: usize,
        line: usize,
        column: usize,
        start_offset: usize,
        start_line: usize,
        start_column: usize,
        error: Option<LexError>,
    }

    impl<'a> Lexer<'a> {
        fn new(source: &'a str) -> Self {
            Self {
                chars: source.chars().peekable(),
                offset: 0,
                line: 1,
                column: 1,
                start_offset: 0,
                start_line: 1,
                start_column: 1,
                error: None,
            }
        }

        fn position(&self) -> Position {
            Position::with_offset(self.line, self.column, self.offset)
        }

        fn start_position(&self) -> Position {
            Position::with_offset(self.start_line, self.start_column, self.start_offset)
        }

        fn span(&self) -> Span {
            Span::new(self.start_position(), self.position())
        }

        fn advance(&mut self) -> Option<char> {
            match self.chars.next() {
                Some('\n') => {
                    self.offset += 1;
                    self.line += 1;
                    self.column = 1;
                    Some('\n')
                }
                Some(c) => {
                    self.offset += c.len_utf8();
                    self.column += 1;
                    Some(c)
                }
                None => None,
            }
        }

        fn peek(&mut self) -> Option<&char> {
            self.chars.peek()
        }

        fn peek_next(&mut self) -> Option<char> {
            self.chars.clone().nth(1)
        }

        fn skip_whitespace_and_comments(&mut self) {
            loop {
                match self.peek().copied() {
                    Some(' ' | '\t' | '\r' | '\n') => {
                        self.advance();
                    }
                    Some('/') if self.peek_next() == Some('/') => {
                        while let Some(&c) = self.peek() {
                            if c == '\n' {
                                break;
                            }
                            self.advance();
                        }
                    }
                    _ => break,
                }
            }
        }

        fn make_token(&self, kind: TokenKind) -> Token {
            Token {
                kind,
                span: self.span(),
            }
        }

        fn next_token(&mut self) -> Option<Token> {
            self.skip_whitespace_and_comments();

            self.peek()?;

            self.start_offset = self.offset;
            self.start_line = self.line;
            self.start_column = self.column;

            let c = self.advance().unwrap();

            match c {
                c if is_identifier_start(c) => self.scan_identifier(c),
                c if is_digit(c) => self.scan_number(c),
                '"' => self.scan_string(),
                '+' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::PlusEq))
                    } else {
                        Some(self.make_token(TokenKind::Plus))
                    }
                }
                '-' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::MinusEq))
                    } else {
                        Some(self.make_token(TokenKind::Minus))
                    }
                }
                '*' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::StarEq))
                    } else {
                        Some(self.make_token(TokenKind::Star))
                    }
                }
                '/' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::SlashEq))
                    } else {
                        Some(self.make_token(TokenKind::Slash))
                    }
                }
                '%' => Some(self.make_token(TokenKind::Percent)),
                ',' => Some(self.make_token(TokenKind::Comma)),
                ':' => Some(self.make_token(TokenKind::Colon)),
                ';' => Some(self.make_token(TokenKind::Semicolon)),
                '(' => Some(self.make_token(TokenKind::LParen)),
                ')' => Some(self.make_token(TokenKind::RParen)),
                '[' => Some(self.make_token(TokenKind::LBracket)),
                ']' => Some(self.make_token(TokenKind::RBracket)),
                '{' => Some(self.make_token(TokenKind::LBrace)),
                '}' => Some(self.make_token(TokenKind::RBrace)),
                '.' => {
                    if self.peek() == Some(&'.') {
                        self.advance();
                        Some(self.make_token(TokenKind::DotDot))
                    } else {
                        Some(self.make_token(TokenKind::Dot))
                    }
                }
                '=' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::EqEq))
                    } else {
                        Some(self.make_token(TokenKind::Eq))
                    }
                }
                '!' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::Neq))
                    } else {
                        Some(self.make_token(TokenKind::Not))
                    }
                }
                '<' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::Le))
                    } else {
                        Some(self.make_token(TokenKind::Lt))
                    }
                }
                '>' => {
                    if self.peek() == Some(&'=') {
                        self.advance();
                        Some(self.make_token(TokenKind::Ge))
                    } else {
                        Some(self.make_token(TokenKind::Gt))
                    }
                }
                '&' => {
                    if self.peek() == Some(&'&') {
                        self.advance();
                        Some(self.make_token(TokenKind::AndAnd))
                    } else {
                        self.error = Some(LexError::UnexpectedChar { ch: '&' });
                        None
                    }
                }
                '|' => {
                    if self.peek() == Some(&'|') {
                        self.advance();
                        Some(self.make_token(TokenKind::OrOr))
                    } else {
                        self.error = Some(LexError::UnexpectedChar { ch: '|' });
                        None
                    }
                }
                other => {
                    self.error = Some(LexError::UnexpectedChar { ch: other });
                    None
                }
            }
        }

        fn scan_identifier(&mut self, first: char) -> Option<Token> {
            let mut ident = String::new();
            ident.push(first);

            while let Some(&c) = self.peek() {
                if is_identifier_char(c) {
                    ident.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            let kind = TokenKind::keyword(&ident).unwrap_or(TokenKind::Ident(ident));
            Some(self.make_token(kind))
        }

        fn scan_number(&mut self, first: char) -> Option<Token> {
            let mut text = String::new();
            text.push(first);

            while let Some(&c) = self.peek() {
                if is_digit(c) {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            // A `.` extends the literal only when a digit follows; `1234.`
            // stays an integer so the dot can begin a member access, and
            // `1..3` stays two integers around a range operator.
            let mut is_float = false;
            if self.peek() == Some(&'.') && self.peek_next().map(is_digit).unwrap_or(false) {
                is_float = true;
                text.push('.');
                self.advance();
                while let Some(&c) = self.peek() {
                    if is_digit(c) {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }

            let kind = if is_float {
                match text.parse::<f64>() {
                    Ok(v) => TokenKind::Float(v),
                    Err(_) => {
                        self.error = Some(LexError::InvalidNumber(text));
                        return None;
                    }
                }
            } else {
                match text.parse::<i64>() {
                    Ok(v) => TokenKind::Int(v),
                    Err(_) => {
                        self.error = Some(LexError::InvalidNumber(text));
                        return None;
                    }
                }
            };

            Some(self.make_token(kind))
        }

        fn scan_string(&mut self) -> Option<Token> {
            let mut value = String::new();

            loop {
                match self.advance() {
                    Some('"') => break,
                    Some('\\') => match self.advance() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        Some('r') => value.push('\r'),
                        Some('\\') => value.push('\\'),
                        Some('"') => value.push('"'),
                        Some(other) => {
                            self.error = Some(LexError::InvalidEscape {
                                sequence: other.to_string(),
                            });
                            return None;
                        }
                        None => {
                            self.error = Some(LexError::UnterminatedString {
                                position: self.start_position().to_string(),
                            });
                            return None;
                        }
                    },
                    Some(c) => value.push(c),
                    None => {
                        self.error = Some(LexError::UnterminatedString {
                            position: self.start_position().to_string(),
                        });
                        return None;
                    }
                }
            }

            Some(self.make_token(TokenKind::Str(value)))
        }
    }

    fn is_identifier_start(c: char) -> bool {
        c.is_ascii_alphabetic() || c == '_'
    }

    fn is_identifier_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_'
    }

    fn is_digit(c: char) -> bool {
        c.is_ascii_digit()
    }
}

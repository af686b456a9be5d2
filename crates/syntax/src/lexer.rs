//! Tokenizer for Oker source text.
//!
//! Single forward pass over the characters. Whitespace (newlines included)
//! only separates tokens, and `~` starts a comment running to end of line.

use crate::error::LexError;
use crate::token::{Token, TokenKind};

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn advance_while(&mut self, mut pred: impl FnMut(char) -> bool, out: &mut String) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c == '~' {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.advance();
                }
            } else if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Token::new(TokenKind::Eof, "", line, column));
                return Ok(tokens);
            };

            let token = if c == '"' {
                self.string(line, column)?
            } else if c.is_ascii_digit() {
                self.number(line, column)
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.word(line, column)
            } else {
                self.symbol(c, line, column)?
            };
            tokens.push(token);
        }
    }

    fn string(&mut self, line: usize, column: usize) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(Token::new(TokenKind::String, text, line, column)),
                Some(c) => text.push(c),
                None => return Err(LexError::UnterminatedString { line, column }),
            }
        }
    }

    fn number(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        self.advance_while(|c| c.is_ascii_digit(), &mut text);
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            self.advance_while(|c| c.is_ascii_digit(), &mut text);
        }
        Token::new(TokenKind::Number, text, line, column)
    }

    fn word(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_', &mut text);
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        Token::new(kind, text, line, column)
    }

    fn symbol(&mut self, c: char, line: usize, column: usize) -> Result<Token, LexError> {
        let followed_by_eq = self.peek_next() == Some('=');
        let (kind, len) = match c {
            '+' => (TokenKind::Plus, 1),
            '-' => (TokenKind::Minus, 1),
            '*' => (TokenKind::Star, 1),
            '/' => (TokenKind::Slash, 1),
            '%' => (TokenKind::Percent, 1),
            '(' => (TokenKind::LeftParen, 1),
            ')' => (TokenKind::RightParen, 1),
            ',' => (TokenKind::Comma, 1),
            ':' => (TokenKind::Colon, 1),
            '=' if followed_by_eq => (TokenKind::EqualEqual, 2),
            '=' => (TokenKind::Assign, 1),
            '!' if followed_by_eq => (TokenKind::BangEqual, 2),
            '<' if followed_by_eq => (TokenKind::LessEqual, 2),
            '<' => (TokenKind::Less, 1),
            '>' if followed_by_eq => (TokenKind::GreaterEqual, 2),
            '>' => (TokenKind::Greater, 1),
            _ => return Err(LexError::UnexpectedCharacter { ch: c, line, column }),
        };
        let mut text = String::with_capacity(len);
        for _ in 0..len {
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }
        Ok(Token::new(kind, text, line, column))
    }
}

/// Tokenize Oker source text.
///
/// The returned stream always ends with exactly one [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).run()?;
    tracing::debug!(tokens = tokens.len(), "tokenized source");
    Ok(tokens)
}

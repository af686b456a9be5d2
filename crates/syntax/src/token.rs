//! Token types produced by the lexer.

use std::fmt;

/// The fine-grained kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Let,
    Say,
    Makef,
    If,
    Else,
    End,
    While,
    Return,
    True,
    False,
    Nil,

    // Literals & names
    Identifier,
    Number,
    String,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqualEqual,
    BangEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Assign,

    // Punctuation
    LeftParen,
    RightParen,
    Comma,
    Colon,

    /// End of input. Always the last token of a stream.
    Eof,
}

/// Coarse token category, as shown by the token listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    NumberLiteral,
    StringLiteral,
    Operator,
    Punctuation,
    EndOfInput,
}

impl TokenCategory {
    /// Upper-case label used in listings.
    pub fn name(self) -> &'static str {
        match self {
            TokenCategory::Keyword => "KEYWORD",
            TokenCategory::Identifier => "IDENTIFIER",
            TokenCategory::NumberLiteral => "NUMBER",
            TokenCategory::StringLiteral => "STRING",
            TokenCategory::Operator => "OPERATOR",
            TokenCategory::Punctuation => "PUNCTUATION",
            TokenCategory::EndOfInput => "EOF",
        }
    }
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TokenKind {
    /// Reclassify an identifier as a keyword on exact match.
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "let" => TokenKind::Let,
            "say" => TokenKind::Say,
            "makef" => TokenKind::Makef,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "end" => TokenKind::End,
            "while" => TokenKind::While,
            "return" => TokenKind::Return,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            _ => return None,
        };
        Some(kind)
    }

    /// The coarse category this kind belongs to.
    pub fn category(self) -> TokenCategory {
        use TokenKind::*;
        match self {
            Let | Say | Makef | If | Else | End | While | Return | True | False | Nil => {
                TokenCategory::Keyword
            }
            Identifier => TokenCategory::Identifier,
            Number => TokenCategory::NumberLiteral,
            String => TokenCategory::StringLiteral,
            Plus | Minus | Star | Slash | Percent | EqualEqual | BangEqual | LessEqual
            | GreaterEqual | Less | Greater | Assign => TokenCategory::Operator,
            LeftParen | RightParen | Comma | Colon => TokenCategory::Punctuation,
            Eof => TokenCategory::EndOfInput,
        }
    }

    /// Human-readable description for error messages.
    pub fn describe(self) -> &'static str {
        use TokenKind::*;
        match self {
            Let => "'let'",
            Say => "'say'",
            Makef => "'makef'",
            If => "'if'",
            Else => "'else'",
            End => "'end'",
            While => "'while'",
            Return => "'return'",
            True => "'true'",
            False => "'false'",
            Nil => "'nil'",
            Identifier => "identifier",
            Number => "number",
            String => "string",
            Plus => "'+'",
            Minus => "'-'",
            Star => "'*'",
            Slash => "'/'",
            Percent => "'%'",
            EqualEqual => "'=='",
            BangEqual => "'!='",
            LessEqual => "'<='",
            GreaterEqual => "'>='",
            Less => "'<'",
            Greater => "'>'",
            Assign => "'='",
            LeftParen => "'('",
            RightParen => "')'",
            Comma => "','",
            Colon => "':'",
            Eof => "end of input",
        }
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token. String literals exclude the quotes; `Eof`
    /// has an empty lexeme.
    pub lexeme: String,
    /// 1-based line of the first character.
    pub line: usize,
    /// 1-based column of the first character.
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
            column,
        }
    }

    /// Description used when this token shows up where it should not.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Identifier => format!("identifier '{}'", self.lexeme),
            TokenKind::Number => format!("number {}", self.lexeme),
            TokenKind::String => format!("string \"{}\"", self.lexeme),
            other => other.describe().to_string(),
        }
    }
}

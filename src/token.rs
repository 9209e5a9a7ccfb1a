//! Main module defining the lexer: positions, tokens, and the scanning rules
//! that turn Lunfardo source text into a token stream.

use std::fmt;
use std::rc::Rc;

use crate::error::{LexError, LunfardoError};

/// A digit or letter position in the source, with filename and full source
/// text attached so errors can render an arrow-pointing snippet.
#[derive(Clone)]
pub struct Position {
    pub idx: usize,
    pub line: u32,
    pub col: u32,
    pub filename: Rc<str>,
    pub source: Rc<str>,
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line + 1, self.col + 1)
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.filename == other.filename
    }
}

impl Position {
    pub fn new(filename: Rc<str>, source: Rc<str>) -> Self {
        Self { idx: 0, line: 0, col: 0, filename, source }
    }

    /// Advance the cursor past `ch`, tracking line/column.
    pub fn advance(&mut self, ch: Option<char>) {
        self.idx += 1;
        self.col += 1;
        if ch == Some('\n') {
            self.line += 1;
            self.col = 0;
        }
    }

    pub fn copy(&self) -> Self {
        self.clone()
    }
}

/// The kind of a [`Token`]. Keyword discrimination is done by comparing the
/// token's string value against the keyword table, not by a dedicated kind
/// per keyword, matching the source language's `matches(kind, value)` idiom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Int,
    Float,
    String,
    Identifier,
    Keyword,
    Plus,
    Minus,
    Mul,
    Div,
    Pow,
    Eq,
    Ee,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    LParen,
    RParen,
    LSquare,
    RSquare,
    LCurly,
    RCurly,
    Comma,
    Colon,
    Dot,
    Arrow,
    Newline,
    Eof,
}

/// Literal payload carried by a subset of tokens.
#[derive(Debug, Clone)]
pub enum TokenValue {
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    None,
}

#[derive(Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub pos_start: Position,
    pub pos_end: Position,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            TokenValue::None => write!(f, "{:?}", self.kind),
            TokenValue::Int(v) => write!(f, "{:?}:{}", self.kind, v),
            TokenValue::Float(v) => write!(f, "{:?}:{}", self.kind, v),
            TokenValue::Str(v) => write!(f, "{:?}:{}", self.kind, v),
        }
    }
}

impl Token {
    fn new(kind: TokenKind, value: TokenValue, pos_start: Position, pos_end: Position) -> Self {
        Self { kind, value, pos_start, pos_end }
    }

    /// Mirrors the source's `Token.matches(type_, value)`: used to discriminate
    /// keywords and symbolic operators that share a [`TokenKind`].
    pub fn matches(&self, kind: TokenKind, value: &str) -> bool {
        if self.kind != kind {
            return false;
        }
        match &self.value {
            TokenValue::Str(s) => s.as_ref() == value,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Str(s) => Some(s.as_ref()),
            _ => None,
        }
    }
}

/// Reserved identifiers. An identifier matching one of these becomes a
/// `Keyword` token rather than `Identifier`.
pub const KEYWORDS: &[&str] = &[
    "poneleque", "si", "osi", "sino", "entonces", "chau", "mientras", "para", "hasta", "entre",
    "laburo", "cheto", "nuevo", "devolver", "continuar", "rajar", "y", "o", "truchar", "importar",
    "proba", "sibardea", "bardea", "mi", "arranque", "hereda",
];

const NEWLINE_CHARS: [char; 2] = [';', '\n'];

/// Stateful single-pass scanner over the source text.
pub struct Lexer {
    chars: Vec<char>,
    pos: Position,
    current_char: Option<char>,
}

impl Lexer {
    pub fn new(filename: &str, text: &str) -> Self {
        let filename: Rc<str> = Rc::from(filename);
        let source: Rc<str> = Rc::from(text);
        let chars: Vec<char> = text.chars().collect();
        let current_char = chars.first().copied();
        Self { chars, pos: Position::new(filename, source), current_char }
    }

    fn advance(&mut self) {
        self.pos.advance(self.current_char);
        self.current_char = self.chars.get(self.pos.idx).copied();
    }

    /// Scan the whole source into a token list, or the first lexical error.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Box<LunfardoError>> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.current_char {
            if ch == ' ' || ch == '\t' {
                self.advance();
            } else if ch == '#' {
                while self.current_char.is_some() && self.current_char != Some('\n') {
                    self.advance();
                }
            } else if NEWLINE_CHARS.contains(&ch) {
                let start = self.pos.copy();
                self.advance();
                tokens.push(Token::new(TokenKind::Newline, TokenValue::None, start, self.pos.copy()));
            } else if ch.is_ascii_digit() {
                tokens.push(self.make_number());
            } else if ch.is_alphabetic() || ch == '_' {
                tokens.push(self.make_identifier());
            } else if ch == '"' {
                tokens.push(self.make_string()?);
            } else if ch == '+' {
                tokens.push(self.single(TokenKind::Plus));
            } else if ch == '-' {
                tokens.push(self.make_minus_or_arrow());
            } else if ch == '*' {
                tokens.push(self.single(TokenKind::Mul));
            } else if ch == '/' {
                tokens.push(self.single(TokenKind::Div));
            } else if ch == '^' {
                tokens.push(self.single(TokenKind::Pow));
            } else if ch == '(' {
                tokens.push(self.single(TokenKind::LParen));
            } else if ch == ')' {
                tokens.push(self.single(TokenKind::RParen));
            } else if ch == '[' {
                tokens.push(self.single(TokenKind::LSquare));
            } else if ch == ']' {
                tokens.push(self.single(TokenKind::RSquare));
            } else if ch == '{' {
                tokens.push(self.single(TokenKind::LCurly));
            } else if ch == '}' {
                tokens.push(self.single(TokenKind::RCurly));
            } else if ch == ',' {
                tokens.push(self.single(TokenKind::Comma));
            } else if ch == ':' {
                tokens.push(self.single(TokenKind::Colon));
            } else if ch == '.' {
                tokens.push(self.single(TokenKind::Dot));
            } else if ch == '!' {
                tokens.push(self.make_not_equals()?);
            } else if ch == '=' {
                tokens.push(self.make_equals());
            } else if ch == '<' {
                tokens.push(self.make_less_than());
            } else if ch == '>' {
                tokens.push(self.make_greater_than());
            } else {
                let start = self.pos.copy();
                let illegal = ch;
                self.advance();
                return Err(Box::new(LunfardoError::Lex(LexError::IllegalChar(
                    format!("'{}'", illegal),
                    start,
                ))));
            }
        }

        tokens.push(Token::new(TokenKind::Eof, TokenValue::None, self.pos.copy(), self.pos.copy()));
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos.copy();
        self.advance();
        Token::new(kind, TokenValue::None, start, self.pos.copy())
    }

    fn make_number(&mut self) -> Token {
        let start = self.pos.copy();
        let mut text = String::new();
        let mut dot_count = 0;

        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '.' && dot_count == 0 {
                dot_count += 1;
                text.push('.');
                self.advance();
            } else {
                break;
            }
        }

        if dot_count == 0 {
            Token::new(TokenKind::Int, TokenValue::Int(text.parse().unwrap_or(0)), start, self.pos.copy())
        } else {
            Token::new(TokenKind::Float, TokenValue::Float(text.parse().unwrap_or(0.0)), start, self.pos.copy())
        }
    }

    fn make_identifier(&mut self) -> Token {
        let start = self.pos.copy();
        let mut text = String::new();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let kind = if KEYWORDS.contains(&text.as_str()) { TokenKind::Keyword } else { TokenKind::Identifier };
        Token::new(kind, TokenValue::Str(Rc::from(text)), start, self.pos.copy())
    }

    fn make_string(&mut self) -> Result<Token, Box<LunfardoError>> {
        let start = self.pos.copy();
        self.advance(); // consume opening quote
        let mut text = String::new();
        let mut escaped = false;

        loop {
            match self.current_char {
                None => {
                    return Err(Box::new(LunfardoError::Lex(LexError::ExpectedChar(
                        "'\"'".into(),
                        self.pos.copy(),
                    ))));
                }
                Some('"') if !escaped => {
                    self.advance();
                    break;
                }
                Some('\\') if !escaped => {
                    escaped = true;
                    self.advance();
                }
                Some(ch) => {
                    if escaped {
                        text.push(match ch {
                            'n' => '\n',
                            't' => '\t',
                            other => other,
                        });
                        escaped = false;
                    } else {
                        text.push(ch);
                    }
                    self.advance();
                }
            }
        }

        Ok(Token::new(TokenKind::String, TokenValue::Str(Rc::from(text)), start, self.pos.copy()))
    }

    fn make_minus_or_arrow(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        if self.current_char == Some('>') {
            self.advance();
            Token::new(TokenKind::Arrow, TokenValue::None, start, self.pos.copy())
        } else {
            Token::new(TokenKind::Minus, TokenValue::None, start, self.pos.copy())
        }
    }

    fn make_not_equals(&mut self) -> Result<Token, Box<LunfardoError>> {
        let start = self.pos.copy();
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Ok(Token::new(TokenKind::Ne, TokenValue::None, start, self.pos.copy()))
        } else {
            Err(Box::new(LunfardoError::Lex(LexError::ExpectedChar("'=' (después de '!')".into(), self.pos.copy()))))
        }
    }

    fn make_equals(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Token::new(TokenKind::Ee, TokenValue::None, start, self.pos.copy())
        } else {
            Token::new(TokenKind::Eq, TokenValue::None, start, self.pos.copy())
        }
    }

    fn make_less_than(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Token::new(TokenKind::Lte, TokenValue::None, start, self.pos.copy())
        } else {
            Token::new(TokenKind::Lt, TokenValue::None, start, self.pos.copy())
        }
    }

    fn make_greater_than(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        if self.current_char == Some('=') {
            self.advance();
            Token::new(TokenKind::Gte, TokenValue::None, start, self.pos.copy())
        } else {
            Token::new(TokenKind::Gt, TokenValue::None, start, self.pos.copy())
        }
    }
}

/// Entry point mirroring the source's `run`/`lex` contract.
pub fn tokenize(filename: &str, text: &str) -> Result<Vec<Token>, Box<LunfardoError>> {
    Lexer::new(filename, text).tokenize()
}

use crate::compiler::common::error::Location;
use std::fmt::Display;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Single-character tokens.
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    // One or two character tokens.
    Plus,
    Minus,
    Star,
    Slash,
    Equal,
    EqualEqual,

    // Literals.
    Ident(String),
    Number(i32),
    CharLit(char),

    // Keywords.
    If,
    Else,
    While,
    Return,

    Eof,
}
impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::LeftParen => write!(f, "'('"),
            TokenKind::RightParen => write!(f, "')'"),
            TokenKind::LeftBrace => write!(f, "'{{'"),
            TokenKind::RightBrace => write!(f, "'}}'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Equal => write!(f, "'='"),
            TokenKind::EqualEqual => write!(f, "'=='"),
            TokenKind::Ident(..) => write!(f, "identifier"),
            TokenKind::Number(..) => write!(f, "number"),
            TokenKind::CharLit(..) => write!(f, "character literal"),
            TokenKind::If => write!(f, "'if'"),
            TokenKind::Else => write!(f, "'else'"),
            TokenKind::While => write!(f, "'while'"),
            TokenKind::Return => write!(f, "'return'"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line_index: i32,
    pub column: i32,
    pub line_string: String,
    pub filename: PathBuf,
}
impl Token {
    pub fn new(
        kind: TokenKind,
        line_index: i32,
        column: i32,
        line_string: String,
        filename: PathBuf,
    ) -> Self {
        Token {
            kind,
            line_index,
            column,
            line_string,
            filename,
        }
    }
    pub fn unwrap_string(&self) -> String {
        match &self.kind {
            TokenKind::Ident(s) => s.clone(),
            _ => panic!("cant unwrap string on {} token", self.kind),
        }
    }
    /// One line of the `--tokens` dump: the token class followed by its source text.
    pub fn dump(&self) -> String {
        match &self.kind {
            TokenKind::Ident(s) => format!("identifier: {}", s),
            TokenKind::Number(n) => format!("number: {}", n),
            TokenKind::CharLit(c) => format!("character literal: {:?}", c),
            TokenKind::Eof => "end of file".to_string(),
            kind => kind.to_string(),
        }
    }
}
impl PartialEq for Token {
    fn eq(&self, other: &Token) -> bool {
        self.line_index == other.line_index
            && self.column == other.column
            && self.filename == other.filename
            && std::mem::discriminant(&self.kind) == std::mem::discriminant(&other.kind)
    }
}

impl Location for Token {
    fn line_index(&self) -> i32 {
        self.line_index
    }
    fn column(&self) -> i32 {
        self.column
    }
    fn line_string(&self) -> String {
        self.line_string.clone()
    }
    fn filename(&self) -> PathBuf {
        self.filename.clone()
    }
}

//! Converts raw source-text into an ordered token-sequence

use crate::compiler::common::{error::*, token::*};
use std::collections::HashMap;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

pub struct Scanner<'a> {
    source: Peekable<Chars<'a>>,
    raw_source: Vec<String>,
    filename: PathBuf,
    line: i32,
    column: i32,

    // Reserved keywords which cannot be an identifier
    keywords: HashMap<&'a str, TokenKind>,
}
impl<'a> Scanner<'a> {
    pub fn new(filename: &Path, source: &'a str) -> Self {
        Scanner {
            source: source.chars().peekable(),
            raw_source: source.split('\n').map(|s| s.to_string()).collect(),
            filename: filename.to_path_buf(),
            line: 1,
            column: 1,
            keywords: HashMap::from([
                ("if", TokenKind::If),
                ("else", TokenKind::Else),
                ("while", TokenKind::While),
                ("return", TokenKind::Return),
            ]),
        }
    }

    pub fn scan_token(mut self) -> Result<Vec<Token>, Vec<Error>> {
        let mut errors: Vec<Error> = Vec::new();
        let mut tokens: Vec<Token> = Vec::new();

        while let Some(c) = self.source.next() {
            match c {
                '(' => self.add_token(&mut tokens, TokenKind::LeftParen, 1),
                ')' => self.add_token(&mut tokens, TokenKind::RightParen, 1),
                '{' => self.add_token(&mut tokens, TokenKind::LeftBrace, 1),
                '}' => self.add_token(&mut tokens, TokenKind::RightBrace, 1),
                ',' => self.add_token(&mut tokens, TokenKind::Comma, 1),
                ';' => self.add_token(&mut tokens, TokenKind::Semicolon, 1),
                '+' => self.add_token(&mut tokens, TokenKind::Plus, 1),
                '-' => self.add_token(&mut tokens, TokenKind::Minus, 1),
                '*' => self.add_token(&mut tokens, TokenKind::Star, 1),
                '=' => {
                    if self.matches('=') {
                        self.add_token(&mut tokens, TokenKind::EqualEqual, 2);
                    } else {
                        self.add_token(&mut tokens, TokenKind::Equal, 1);
                    }
                }
                '/' => {
                    if self.matches('/') {
                        // line comments end the column-relevant part of the line anyway
                        while self.source.next_if(|&c| c != '\n').is_some() {}
                    } else if self.matches('*') {
                        if let Err(e) = self.block_comment() {
                            errors.push(e);
                        }
                    } else {
                        self.add_token(&mut tokens, TokenKind::Slash, 1);
                    }
                }
                '\'' => match self.char_lit() {
                    Ok((token, len)) => self.add_token(&mut tokens, token, len),
                    Err(e) => errors.push(e),
                },
                ' ' | '\t' | '\r' => self.column += 1,
                '\n' => self.newline(),
                _ if c.is_ascii_digit() => match self.number(c) {
                    Ok((token, len)) => self.add_token(&mut tokens, token, len),
                    Err(e) => errors.push(e),
                },
                _ if c.is_alphabetic() || c == '_' => {
                    let (token, len) = self.ident(c);
                    self.add_token(&mut tokens, token, len);
                }
                _ => {
                    errors.push(self.error_here(ErrorKind::UnexpectedChar(c)));
                    self.column += 1;
                }
            }
        }
        self.add_token(&mut tokens, TokenKind::Eof, 0);

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }

    fn matches(&mut self, expected: char) -> bool {
        self.source.next_if_eq(&expected).is_some()
    }
    fn newline(&mut self) {
        self.line += 1;
        self.column = 1;
    }
    // `len` is the number of source characters the token spans, so columns
    // stay exact for literals whose value prints differently than it was
    // written ('007', '\n')
    fn add_token(&mut self, tokens: &mut Vec<Token>, kind: TokenKind, len: usize) {
        let len = len as i32;
        tokens.push(Token::new(
            kind,
            self.line,
            self.column,
            self.line_string(self.line),
            self.filename.clone(),
        ));
        self.column += len;
    }
    fn line_string(&self, line: i32) -> String {
        self.raw_source
            .get((line - 1) as usize)
            .cloned()
            .unwrap_or_default()
    }
    fn error_here(&self, kind: ErrorKind) -> Error {
        Error {
            line_index: self.line,
            line_string: self.line_string(self.line),
            column: self.column,
            filename: self.filename.clone(),
            kind,
        }
    }

    // skips until the closing '*/'; running into end of input is an error
    // instead of an unbounded scan
    fn block_comment(&mut self) -> Result<(), Error> {
        let start = self.error_here(ErrorKind::UnterminatedComment);
        self.column += 2;

        while let Some(c) = self.source.next() {
            match c {
                '\n' => self.newline(),
                '*' if self.matches('/') => {
                    self.column += 2;
                    return Ok(());
                }
                _ => self.column += 1,
            }
        }
        Err(start)
    }

    fn char_lit(&mut self) -> Result<(TokenKind, usize), Error> {
        let (c, escaped) = match self.source.next() {
            Some('\\') => {
                let to_escape = self
                    .source
                    .next()
                    .ok_or_else(|| self.error_here(ErrorKind::CharLiteralQuotes))?;
                let c = escape_char(to_escape)
                    .ok_or_else(|| self.error_here(ErrorKind::InvalidEscape(to_escape)))?;
                (c, true)
            }
            Some(c) if c != '\'' && c != '\n' => (c, false),
            _ => return Err(self.error_here(ErrorKind::CharLiteralQuotes)),
        };
        if !self.matches('\'') {
            return Err(self.error_here(ErrorKind::CharLiteralQuotes));
        }

        Ok((TokenKind::CharLit(c), if escaped { 4 } else { 3 }))
    }

    fn number(&mut self, first: char) -> Result<(TokenKind, usize), Error> {
        let mut digits = String::from(first);
        while let Some(c) = self.source.next_if(|c| c.is_ascii_digit()) {
            digits.push(c);
        }

        match digits.parse::<i32>() {
            Ok(n) => Ok((TokenKind::Number(n), digits.len())),
            Err(e) => Err(self.error_here(ErrorKind::InvalidNumber(e.kind().clone()))),
        }
    }

    fn ident(&mut self, first: char) -> (TokenKind, usize) {
        let mut name = String::from(first);
        while let Some(c) = self.source.next_if(|&c| c.is_alphanumeric() || c == '_') {
            name.push(c);
        }

        let kind = match self.keywords.get(name.as_str()) {
            Some(kw) => kw.clone(),
            None => TokenKind::Ident(name.clone()),
        };
        (kind, name.len())
    }
}

fn escape_char(to_escape: char) -> Option<char> {
    match to_escape {
        '0' => Some('\0'),
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '"' => Some('\"'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_generic(input: &str) -> Vec<Token> {
        match Scanner::new(Path::new(""), input).scan_token() {
            Ok(tokens) => tokens,
            Err(_) => unreachable!("want to test successfull scan"),
        }
    }
    fn setup(input: &str) -> Vec<TokenKind> {
        setup_generic(input).into_iter().map(|t| t.kind).collect()
    }
    fn setup_err(input: &str) -> Vec<ErrorKind> {
        match Scanner::new(Path::new(""), input).scan_token() {
            Ok(_) => unreachable!("want to test errors"),
            Err(errors) => errors.into_iter().map(|e| e.kind).collect(),
        }
    }

    #[test]
    fn single_and_double_character_tokens() {
        let actual = setup("== = ; ( { ) } , == =");
        let expected = vec![
            TokenKind::EqualEqual,
            TokenKind::Equal,
            TokenKind::Semicolon,
            TokenKind::LeftParen,
            TokenKind::LeftBrace,
            TokenKind::RightParen,
            TokenKind::RightBrace,
            TokenKind::Comma,
            TokenKind::EqualEqual,
            TokenKind::Equal,
            TokenKind::Eof,
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn math_expression() {
        let actual = setup("300 - 11 * 41 / 3");
        let expected = vec![
            TokenKind::Number(300),
            TokenKind::Minus,
            TokenKind::Number(11),
            TokenKind::Star,
            TokenKind::Number(41),
            TokenKind::Slash,
            TokenKind::Number(3),
            TokenKind::Eof,
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn keywords_and_identifiers() {
        let actual = setup("while (x == 0) returned = 1;");
        let expected = vec![
            TokenKind::While,
            TokenKind::LeftParen,
            TokenKind::Ident("x".to_string()),
            TokenKind::EqualEqual,
            TokenKind::Number(0),
            TokenKind::RightParen,
            TokenKind::Ident("returned".to_string()),
            TokenKind::Equal,
            TokenKind::Number(1),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn maximal_munch_identifier() {
        // keyword only when the whole word matches
        let actual = setup("while1 _if return");
        let expected = vec![
            TokenKind::Ident("while1".to_string()),
            TokenKind::Ident("_if".to_string()),
            TokenKind::Return,
            TokenKind::Eof,
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn char_literals() {
        let actual = setup("'a' '\\n' '\\''");
        let expected = vec![
            TokenKind::CharLit('a'),
            TokenKind::CharLit('\n'),
            TokenKind::CharLit('\''),
            TokenKind::Eof,
        ];
        assert_eq!(actual, expected);
    }

    #[test]
    fn invalid_char_literals() {
        assert_eq!(setup_err("'ab'"), vec![
            ErrorKind::CharLiteralQuotes,
            // trailing b' scans as ident + another broken literal
            ErrorKind::CharLiteralQuotes,
        ]);
        // the dangling quote after the failed literal errors as well
        let actual = setup_err("'\\q'");
        assert_eq!(actual[0], ErrorKind::InvalidEscape('q'));
    }

    #[test]
    fn comments_dont_change_token_sequence() {
        let with_comments = setup(
            "int x; // trailing comment\n/* a\n   multiline one */ x = 5 /* inline */ ;",
        );
        let without = setup("int x;\nx = 5;");
        assert_eq!(with_comments, without);
    }

    #[test]
    fn unterminated_block_comment() {
        let actual = setup_err("x = 5; /* comment");
        assert_eq!(actual, vec![ErrorKind::UnterminatedComment]);
    }

    #[test]
    fn number_literal_overflow() {
        let actual = setup_err("99999999999999999999");
        assert!(matches!(actual[0], ErrorKind::InvalidNumber(..)));
    }

    #[test]
    fn detects_invalid_characters() {
        let actual = Scanner::new(Path::new(""), "int c = 0$\n\n% ^")
            .scan_token()
            .unwrap_err();
        let expected = vec![
            (1, 10, ErrorKind::UnexpectedChar('$')),
            (3, 1, ErrorKind::UnexpectedChar('%')),
            (3, 3, ErrorKind::UnexpectedChar('^')),
        ];
        let actual: Vec<_> = actual
            .into_iter()
            .map(|e| (e.line_index, e.column, e.kind))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn columns_follow_the_written_literal() {
        // '007' prints as 7 and '\n' spans four characters, columns must
        // still track what was written
        let tokens = setup_generic("007 '\\n' x");
        let positions: Vec<(TokenKind, i32)> =
            tokens.into_iter().map(|t| (t.kind, t.column)).collect();
        let expected = vec![
            (TokenKind::Number(7), 1),
            (TokenKind::CharLit('\n'), 5),
            (TokenKind::Ident("x".to_string()), 10),
            (TokenKind::Eof, 11),
        ];
        assert_eq!(positions, expected);
    }

    #[test]
    fn eof_token_carries_position() {
        let tokens = setup_generic("1 + 2");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.line_index, 1);
    }
}

//! The errors emitted throughout all of rocc

use crate::compiler::common::token::TokenKind;
use std::num::IntErrorKind;
use std::path::PathBuf;

/// The high-level error type, which is used by both lib.rs and main.rs
#[derive(Debug)]
pub enum RoccError {
    /// Error produced by the compiler (scanning/parsing/codegen)
    Comp(Vec<Error>),
    /// Error when doing system operations (reading input/writing output)
    Sys(String),
    /// Error in passing cli-arguments (passing invalid argument)
    Cli(Vec<String>),
}
impl RoccError {
    pub fn print(self, no_color: bool) {
        match self {
            RoccError::Comp(errors) => {
                for e in &errors {
                    e.print_error(no_color);
                }
                eprintln!(
                    "{} error{} generated.",
                    errors.len(),
                    if errors.len() > 1 { "s" } else { "" }
                );
            }
            RoccError::Cli(errors) => {
                for e in &errors {
                    eprintln!("rocc: <command-line>: {}", e);
                }
            }
            RoccError::Sys(error) => {
                eprintln!("rocc: {}", error);
            }
        }
    }
}
impl From<Vec<Error>> for RoccError {
    fn from(compiler_errors: Vec<Error>) -> RoccError {
        RoccError::Comp(compiler_errors)
    }
}

/// All error-types in [rocc_compiler](crate)
#[derive(Debug, PartialEq, Clone)]
pub enum ErrorKind {
    // scan errors
    UnexpectedChar(char),
    UnterminatedComment,
    CharLiteralQuotes,
    InvalidEscape(char),
    InvalidNumber(IntErrorKind),
    Eof(&'static str),

    // parsing errors
    ExpectedExpression(TokenKind),
    NotType(TokenKind),
    UndeclaredSymbol(String),
    Redeclaration(String),
    NotAssignable(String),
    DeclarationInitializer(String),
    TooManyParams(String, usize),

    // codegen errors
    TooManyArgs(String, usize),

    Regular(&'static str), // generic error message when message only used once
}

impl ErrorKind {
    /// The message being emitted for a diagnostic
    pub fn message(&self) -> String {
        match self {
            ErrorKind::UnexpectedChar(c) => format!("unexpected character: {:?}", c),
            ErrorKind::UnterminatedComment => {
                "unterminated block comment, missing closing '*/'".to_string()
            }
            ErrorKind::CharLiteralQuotes => {
                "character literal must contain single character enclosed by single quotes ('')"
                    .to_string()
            }
            ErrorKind::InvalidEscape(c) => format!("cannot escape character '{}'", c),
            ErrorKind::InvalidNumber(kind) => {
                format!(
                    "cannot parse number literal: {}",
                    match kind {
                        IntErrorKind::InvalidDigit => "invalid digit found in string",
                        IntErrorKind::PosOverflow => "number is too large to fit in 32bits",
                        _ => "",
                    }
                )
            }
            ErrorKind::Eof(s) => format!("{}, found end of file", s),

            ErrorKind::ExpectedExpression(token) => format!("expected expression, found: {}", token),
            ErrorKind::NotType(token) => format!("expected type-declaration, found {}", token),
            ErrorKind::UndeclaredSymbol(name) => format!("undeclared symbol '{}'", name),
            ErrorKind::Redeclaration(name) => {
                format!("redeclaration of '{}', previous declaration is shadowed", name)
            }
            ErrorKind::NotAssignable(expr) => {
                format!("left of '=' must be a variable, found '{}'", expr)
            }
            ErrorKind::DeclarationInitializer(name) => {
                format!("cannot initialize '{}' in its declaration", name)
            }
            ErrorKind::TooManyParams(name, n) => {
                format!(
                    "function '{}' declares {} parameters, only 6 register parameters are supported",
                    name, n
                )
            }

            ErrorKind::TooManyArgs(name, n) => {
                format!(
                    "call to '{}' passes {} arguments, only 6 register arguments are supported",
                    name, n
                )
            }

            ErrorKind::Regular(s) => s.to_string(),
        }
    }
}

/// Main error used throughout [rocc_compiler](crate)
#[derive(Debug, PartialEq, Clone)]
pub struct Error {
    pub line_index: i32,
    pub line_string: String,
    pub column: i32,
    pub filename: PathBuf,
    pub kind: ErrorKind,
}
impl Error {
    pub fn new(object: &impl Location, kind: ErrorKind) -> Self {
        Error {
            line_index: object.line_index(),
            line_string: object.line_string(),
            column: object.column(),
            filename: object.filename(),
            kind,
        }
    }

    pub fn eof(expected: &'static str) -> Self {
        Error {
            line_index: -1,
            line_string: String::from(""),
            filename: PathBuf::new(),
            column: -1,
            kind: ErrorKind::Eof(expected),
        }
    }
    /// Prints the error to `stderr` using all of its location information.<br>
    /// If `no_color` is specified then only prints without any highlighting and color codes.
    pub fn print_error(&self, no_color: bool) {
        self.print("error", Color::Red, no_color);
    }
    /// Same rendering as [print_error](Error::print_error) but marked as a
    /// non-fatal warning.
    pub fn print_warning(&self, no_color: bool) {
        self.print("warning", Color::Yellow, no_color);
    }
    fn print(&self, severity: &str, severity_color: Color, no_color: bool) {
        eprintln!(
            "{}: {}",
            color_text(severity, severity_color, true, no_color),
            color_text(&self.kind.message(), Color::White, true, no_color),
        );

        if self.line_index != -1 {
            eprintln!(
                "{}  {} in {}:{}:{}",
                color_text("|", Color::Blue, false, no_color),
                color_text("-->", Color::Blue, false, no_color),
                color_text(
                    &self.filename.display().to_string(),
                    Color::White,
                    false,
                    no_color
                ),
                self.line_index,
                self.column,
            );

            let line_length = self.line_index.to_string().len();

            eprintln!("{}", color_text("|", Color::Blue, false, no_color));
            eprintln!(
                "{} {}",
                color_text(&self.line_index.to_string(), Color::Blue, true, no_color),
                self.line_string
            );
            eprint!("{}", color_text("|", Color::Blue, false, no_color));
            for _ in 1..self.column as usize + line_length {
                eprint!(" ");
            }
            eprintln!("{}", color_text("^", Color::Red, true, no_color));
        }
    }
}
/// Trait which can be implemented by different error-tokens which are all locatable
pub trait Location {
    fn line_index(&self) -> i32;
    fn column(&self) -> i32;
    fn line_string(&self) -> String;
    fn filename(&self) -> PathBuf;
}
enum Color {
    Red,
    Yellow,
    Blue,
    White,
}
impl Color {
    fn code(&self) -> usize {
        match self {
            Color::Red => 31,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::White => 37,
        }
    }
}
fn color_text(text: &str, color: Color, bold: bool, no_color: bool) -> String {
    if no_color {
        text.to_string()
    } else {
        format!(
            "\x1b[{};{}m{}\x1b[0m",
            color.code(),
            if bold { "1" } else { "" },
            text
        )
    }
}

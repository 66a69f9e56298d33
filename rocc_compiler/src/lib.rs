//! Library for compiling a small subset of C to x86-64 assembly in AT&T-syntax

pub mod compiler;

use compiler::{codegen::Codegen, parser::Parser, scanner::Scanner};

pub use compiler::common::error::{Error, ErrorKind, RoccError};
pub use compiler::common::token::Token;

use std::path::Path;

/// Scans the input into its token-stream, used by `--tokens`
pub fn tokenize(filename: &Path, source: &str) -> Result<Vec<Token>, Vec<Error>> {
    Scanner::new(filename, source).scan_token()
}

pub fn compile(
    filename: &Path,
    source: &str,
    dump_ast: bool,
    no_color: bool,
) -> Result<String, Vec<Error>> {
    // Scan input
    let tokens = tokenize(filename, source)?;

    // Parse statements and build the scope-tree along the way
    let (funcs, warnings) = Parser::new(tokens).parse()?;

    for warning in &warnings {
        warning.print_warning(no_color);
    }

    if dump_ast {
        funcs.iter().for_each(|f| eprintln!("{}", f));
    }

    // Turn AST into assembly
    Codegen::new().generate(&funcs).map_err(|e| vec![e])
}

pub mod codegen;
pub mod common;
pub mod parser;
pub mod scanner;

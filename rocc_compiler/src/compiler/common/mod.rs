pub mod ast;
pub mod environment;
pub mod error;
pub mod token;

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::QueryErr;
pub use lexer::{Lexeme, Lexer, Token};
pub use parser::{Command, Parser};

pub type Result<T> = std::result::Result<T, QueryErr>;

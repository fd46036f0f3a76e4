pub mod cursor;
pub mod error;
pub mod token;

mod scanner;

pub use error::{LexError, SourceError, MAX_SOURCE_LEN};
pub use scanner::Scanner;
pub use token::{Token, TokenDisplay, TokenKind};

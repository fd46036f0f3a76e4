/// A malformed lexeme. The display text becomes the `Error` token's lexeme.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("multiple points in number")]
    MultiplePoints,
    #[error("numbers cannot start with 0")]
    LeadingZero,
    #[error("unexpected end of file while parsing string literal")]
    UnterminatedString,
    #[error("expected '=' after '!' but found {}", found_text(.0))]
    ExpectedEqualAfterBang(Option<char>),
    #[error("unexpected token '{}'", escaped(.0))]
    UnexpectedCharacter(char),
}

impl LexError {
    /// Help text for errors with an obvious fix.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            LexError::ExpectedEqualAfterBang(_) => {
                Some("use 'not' for negation; '!' only appears in '!='")
            }
            LexError::LeadingZero => Some("drop the leading zeros"),
            LexError::UnterminatedString => Some("add a closing '\"'"),
            LexError::MultiplePoints | LexError::UnexpectedCharacter(_) => None,
        }
    }
}

fn escaped(c: &char) -> String {
    c.escape_debug().to_string()
}

fn found_text(found: &Option<char>) -> String {
    match found {
        Some(c) => format!("'{}'", escaped(c)),
        None => "end of input".to_string(),
    }
}

/// Input that cannot be scanned at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("source is not valid UTF-8 (first invalid byte at offset {offset})")]
    InvalidUtf8 { offset: usize },
    #[error("source is {len} bytes; at most {max} are supported", max = MAX_SOURCE_LEN)]
    TooLarge { len: usize },
}

/// Largest buffer a scanner accepts. Positions store offsets as `u32`.
pub const MAX_SOURCE_LEN: usize = u32::MAX as usize;

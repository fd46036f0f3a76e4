use std::borrow::Cow;
use std::fmt;

use monty_common::config::DEFAULT_DISPLAY_WIDTH;
use monty_common::Span;
use serde::{Serialize, Serializer};

/// A single token produced by the scanner.
///
/// Ordinary tokens borrow their lexeme from the source buffer, so the buffer
/// must outlive them. `Error` tokens carry their diagnostic message instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: Cow<'src, str>,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn new(kind: TokenKind, lexeme: &'src str, span: Span) -> Self {
        Self {
            kind,
            lexeme: Cow::Borrowed(lexeme),
            span,
        }
    }

    pub fn error(message: String, span: Span) -> Self {
        Self {
            kind: TokenKind::Error,
            lexeme: Cow::Owned(message),
            span,
        }
    }

    pub fn end_of_input(span: Span) -> Self {
        Self {
            kind: TokenKind::EndOfInput,
            lexeme: Cow::Borrowed(""),
            span,
        }
    }

    /// 1-based line of the token's first character.
    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    /// 1-based column of the token's first character.
    pub fn column(&self) -> u32 {
        self.span.start.column
    }

    pub fn is_error(&self) -> bool {
        self.kind == TokenKind::Error
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }

    /// Detach the token from the source buffer.
    pub fn into_owned(self) -> Token<'static> {
        Token {
            kind: self.kind,
            lexeme: Cow::Owned(self.lexeme.into_owned()),
            span: self.span,
        }
    }

    /// Debug rendering with the value cut to `width` characters.
    pub fn display(&self, width: usize) -> TokenDisplay<'_, 'src> {
        TokenDisplay { token: self, width }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display(DEFAULT_DISPLAY_WIDTH).fmt(f)
    }
}

/// Formats a token as
/// `Token(type='<NAME>', value='<lexeme>', line=<N>, column=<N>)`.
pub struct TokenDisplay<'t, 'src> {
    token: &'t Token<'src>,
    width: usize,
}

impl fmt::Display for TokenDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(type='{}', value='", self.token.kind)?;
        for ch in self.token.lexeme.chars().take(self.width) {
            match ch {
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                c => write!(f, "{}", c)?,
            }
        }
        write!(
            f,
            "', line={}, column={})",
            self.token.line(),
            self.token.column()
        )
    }
}

/// All token kinds in the Monty language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Meta ===
    EndOfInput,
    Error,
    Comment,

    // === Single-character tokens ===
    Dot,          // .
    Comma,        // ,
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %

    // === One- or two-character tokens ===
    Equal,        // =
    EqualEqual,   // ==
    BangEqual,    // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    Colon,        // :
    ColonEqual,   // :=

    // === Literals ===
    TypeIdentifier,
    Identifier,
    String,
    Number,

    // === Keywords ===
    And,
    Def,
    Else,
    End,
    Extend,
    False,
    For,
    If,
    Match,
    Not,
    Or,
    Protocol,
    Record,
    True,
    While,
}

/// Keyword spellings, sorted so lookups can binary search.
const KEYWORDS: [(&str, TokenKind); 15] = [
    ("and", TokenKind::And),
    ("def", TokenKind::Def),
    ("else", TokenKind::Else),
    ("end", TokenKind::End),
    ("extend", TokenKind::Extend),
    ("false", TokenKind::False),
    ("for", TokenKind::For),
    ("if", TokenKind::If),
    ("match", TokenKind::Match),
    ("not", TokenKind::Not),
    ("or", TokenKind::Or),
    ("protocol", TokenKind::Protocol),
    ("record", TokenKind::Record),
    ("true", TokenKind::True),
    ("while", TokenKind::While),
];

impl TokenKind {
    /// Match an identifier exactly against the keyword table.
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        KEYWORDS
            .binary_search_by(|(keyword, _)| (*keyword).cmp(s))
            .ok()
            .map(|index| KEYWORDS[index].1)
    }

    /// Canonical name used in every text rendering of the kind.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::EndOfInput => "EOF",
            TokenKind::Error => "ERROR",
            TokenKind::Comment => "COMMENT",
            TokenKind::Dot => "DOT",
            TokenKind::Comma => "COMMA",
            TokenKind::LeftParen => "LPAREN",
            TokenKind::RightParen => "RPAREN",
            TokenKind::LeftBracket => "LBRACKET",
            TokenKind::RightBracket => "RBRACKET",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "STAR",
            TokenKind::Slash => "SLASH",
            TokenKind::Percent => "PERCENT",
            TokenKind::Equal => "EQUAL",
            TokenKind::EqualEqual => "EQUAL_EQUAL",
            TokenKind::BangEqual => "BANG_EQUAL",
            TokenKind::Less => "LESS",
            TokenKind::LessEqual => "LESS_EQUAL",
            TokenKind::Greater => "GREATER",
            TokenKind::GreaterEqual => "GREATER_EQUAL",
            TokenKind::Colon => "COLON",
            TokenKind::ColonEqual => "COLON_EQUAL",
            TokenKind::TypeIdentifier => "TYPE_IDENTIFIER",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::And => "AND",
            TokenKind::Def => "DEF",
            TokenKind::Else => "ELSE",
            TokenKind::End => "END",
            TokenKind::Extend => "EXTEND",
            TokenKind::False => "FALSE",
            TokenKind::For => "FOR",
            TokenKind::If => "IF",
            TokenKind::Match => "MATCH",
            TokenKind::Not => "NOT",
            TokenKind::Or => "OR",
            TokenKind::Protocol => "PROTOCOL",
            TokenKind::Record => "RECORD",
            TokenKind::True => "TRUE",
            TokenKind::While => "WHILE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TokenKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

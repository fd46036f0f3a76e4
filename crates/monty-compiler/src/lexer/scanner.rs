use monty_common::{Diagnostic, DiagnosticBag, Position, Span};
use tracing::{debug, trace};

use super::cursor::Cursor;
use super::error::{LexError, SourceError, MAX_SOURCE_LEN};
use super::token::{Token, TokenKind};

/// Hand-written scanner for the Monty language.
///
/// Produces one token per [`Scanner::next_token`] call. Lexical errors are
/// returned as `Error` tokens and scanning resumes right after the offending
/// material; once the input is exhausted every call yields `EndOfInput`.
pub struct Scanner<'src> {
    cursor: Cursor<'src>,
    last_error: Option<LexError>,
    /// Set once the iterator has handed out `EndOfInput`.
    finished: bool,
}

impl<'src> Scanner<'src> {
    /// Scanner over `source`, which must be at most [`MAX_SOURCE_LEN`] bytes.
    pub fn new(source: &'src str) -> Self {
        trace!(target: "monty::lexer", bytes = source.len(), "creating scanner");
        Self {
            cursor: Cursor::new(source),
            last_error: None,
            finished: false,
        }
    }

    /// Build a scanner over raw bytes, rejecting input that is not UTF-8
    /// or too long to address.
    pub fn from_utf8(bytes: &'src [u8]) -> Result<Self, SourceError> {
        check_len(bytes.len())?;
        let source = std::str::from_utf8(bytes).map_err(|e| SourceError::InvalidUtf8 {
            offset: e.valid_up_to(),
        })?;
        Ok(Self::new(source))
    }

    /// The buffer being scanned.
    pub fn source(&self) -> &'src str {
        self.cursor.source()
    }

    /// Position of the next character the scanner will read.
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// The error behind the most recent `Error` token, if the last token
    /// produced was one.
    pub fn last_error(&self) -> Option<&LexError> {
        self.last_error.as_ref()
    }

    /// Scan the entire source, returning all tokens (through `EndOfInput`)
    /// and a diagnostic for every `Error` token.
    pub fn tokenize(mut self) -> (Vec<Token<'src>>, DiagnosticBag) {
        let mut tokens = Vec::new();
        let mut diagnostics = DiagnosticBag::new();
        loop {
            let token = self.next_token();
            if let Some(error) = &self.last_error {
                let diag = Diagnostic::new(error.to_string(), token.span);
                diagnostics.report(match error.suggestion() {
                    Some(help) => diag.with_suggestion(help),
                    None => diag,
                });
            }
            let done = token.is_eof();
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, diagnostics)
    }

    /// Iterate over every token except comments.
    pub fn significant(self) -> impl Iterator<Item = Token<'src>> {
        self.filter(|token| token.kind != TokenKind::Comment)
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Token<'src> {
        self.last_error = None;
        self.skip_whitespace();

        let start = self.cursor.position();
        let Some(ch) = self.cursor.advance() else {
            return Token::end_of_input(Span::point(start));
        };

        match ch {
            // === Single-character tokens ===
            '.' => self.make_token(TokenKind::Dot, start),
            ',' => self.make_token(TokenKind::Comma, start),
            '(' => self.make_token(TokenKind::LeftParen, start),
            ')' => self.make_token(TokenKind::RightParen, start),
            '[' => self.make_token(TokenKind::LeftBracket, start),
            ']' => self.make_token(TokenKind::RightBracket, start),
            '+' => self.make_token(TokenKind::Plus, start),
            '-' => self.make_token(TokenKind::Minus, start),
            '*' => self.make_token(TokenKind::Star, start),
            '/' => self.make_token(TokenKind::Slash, start),
            '%' => self.make_token(TokenKind::Percent, start),

            // === One- or two-character tokens ===
            '=' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::EqualEqual, start)
                } else {
                    self.make_token(TokenKind::Equal, start)
                }
            }
            '!' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::BangEqual, start)
                } else {
                    // The offending character is consumed so the scan moves on.
                    let found = self.cursor.advance();
                    self.error(LexError::ExpectedEqualAfterBang(found), start)
                }
            }
            '<' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::LessEqual, start)
                } else {
                    self.make_token(TokenKind::Less, start)
                }
            }
            '>' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::GreaterEqual, start)
                } else {
                    self.make_token(TokenKind::Greater, start)
                }
            }
            ':' => {
                if self.cursor.eat('=') {
                    self.make_token(TokenKind::ColonEqual, start)
                } else {
                    self.make_token(TokenKind::Colon, start)
                }
            }

            '"' => self.scan_string(start),
            '#' => self.scan_comment(start),

            c if c.is_ascii_digit() => self.scan_number(start),
            c if c == '_' || c.is_ascii_lowercase() => self.scan_identifier(start),
            c if c.is_ascii_uppercase() => self.scan_type_identifier(start),

            c => self.error(LexError::UnexpectedCharacter(c), start),
        }
    }

    fn skip_whitespace(&mut self) {
        self.cursor
            .eat_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
    }

    // ---------------------------------------------------------------
    // Literals
    // ---------------------------------------------------------------

    /// Scan a string literal after its opening `"` has been consumed.
    ///
    /// A `"` preceded by `\` does not close the string. Nothing else is
    /// treated as an escape, and the lexeme keeps both quotes.
    fn scan_string(&mut self, start: Position) -> Token<'src> {
        let mut previous = '"';
        loop {
            match self.cursor.advance() {
                Some('"') if previous != '\\' => {
                    return self.make_token(TokenKind::String, start);
                }
                Some(c) => previous = c,
                None => return self.error(LexError::UnterminatedString, start),
            }
        }
    }

    /// Scan a run of digits and points after the first digit.
    fn scan_number(&mut self, start: Position) -> Token<'src> {
        self.cursor.eat_while(|c| c.is_ascii_digit() || c == '.');
        let lexeme = self.cursor.slice_from(start.offset);

        if lexeme.starts_with('0') && lexeme.len() > 1 {
            self.error(LexError::LeadingZero, start)
        } else if lexeme.matches('.').count() > 1 {
            self.error(LexError::MultiplePoints, start)
        } else {
            self.make_token(TokenKind::Number, start)
        }
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self, start: Position) -> Token<'src> {
        self.cursor.eat_while(is_ident_continue);
        let lexeme = self.cursor.slice_from(start.offset);
        let kind = TokenKind::keyword_from_str(lexeme).unwrap_or(TokenKind::Identifier);
        Token::new(kind, lexeme, self.cursor.span_from(start))
    }

    /// Scan a capitalized name. Keywords never start uppercase.
    fn scan_type_identifier(&mut self, start: Position) -> Token<'src> {
        self.cursor.eat_while(is_ident_continue);
        self.make_token(TokenKind::TypeIdentifier, start)
    }

    /// Scan a `#` comment up to, but not including, the end of the line.
    fn scan_comment(&mut self, start: Position) -> Token<'src> {
        self.cursor.eat_while(|c| c != '\n');
        self.make_token(TokenKind::Comment, start)
    }

    // ---------------------------------------------------------------
    // Helpers
    // ---------------------------------------------------------------

    /// Create a token using the slice from `start` to current position.
    fn make_token(&self, kind: TokenKind, start: Position) -> Token<'src> {
        let lexeme = self.cursor.slice_from(start.offset);
        Token::new(kind, lexeme, self.cursor.span_from(start))
    }

    /// Create an `Error` token covering `start` to current position.
    fn error(&mut self, error: LexError, start: Position) -> Token<'src> {
        debug!(
            target: "monty::lexer",
            line = start.line,
            column = start.column,
            "{}",
            error
        );
        let token = Token::error(error.to_string(), self.cursor.span_from(start));
        self.last_error = Some(error);
        token
    }
}

impl<'src> Iterator for Scanner<'src> {
    type Item = Token<'src>;

    /// Yields every token up to and including the first `EndOfInput`.
    fn next(&mut self) -> Option<Token<'src>> {
        if self.finished {
            return None;
        }
        let token = self.next_token();
        self.finished = token.is_eof();
        Some(token)
    }
}

fn check_len(len: usize) -> Result<(), SourceError> {
    if len > MAX_SOURCE_LEN {
        return Err(SourceError::TooLarge { len });
    }
    Ok(())
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token<'_>> {
        let (tokens, diags) = Scanner::new(source).tokenize();
        assert!(
            !diags.has_errors(),
            "unexpected errors: {:?}",
            diags.diagnostics()
        );
        tokens
    }

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    fn first_error(source: &str) -> Token<'_> {
        Scanner::new(source)
            .find(|t| t.is_error())
            .expect("expected an error token")
    }

    #[test]
    fn empty_source() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::EndOfInput);
        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 1));
    }

    #[test]
    fn end_of_input_is_idempotent() {
        let mut scanner = Scanner::new("x\n");
        assert_eq!(scanner.next_token().kind, TokenKind::Identifier);
        let eof = scanner.next_token();
        assert_eq!(eof.kind, TokenKind::EndOfInput);
        assert_eq!((eof.line(), eof.column()), (2, 1));
        for _ in 0..3 {
            assert_eq!(scanner.next_token(), eof);
        }
    }

    #[test]
    fn iterator_stops_after_end_of_input() {
        let mut scanner = Scanner::new("a");
        assert_eq!(scanner.next().map(|t| t.kind), Some(TokenKind::Identifier));
        assert_eq!(scanner.next().map(|t| t.kind), Some(TokenKind::EndOfInput));
        assert_eq!(scanner.next(), None);
        assert_eq!(scanner.next(), None);
    }

    #[test]
    fn simple_definition() {
        let kinds = lex_kinds("def area(r) := 3.14 * r * r end");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Def,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::Identifier,
                TokenKind::RightParen,
                TokenKind::ColonEqual,
                TokenKind::Number,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::Star,
                TokenKind::Identifier,
                TokenKind::End,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn operators() {
        let kinds = lex_kinds("+ - * / % == != < > <= >= = : :=");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::Percent,
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Equal,
                TokenKind::Colon,
                TokenKind::ColonEqual,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn operators_without_spaces() {
        let kinds = lex_kinds("a<=b==c");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Identifier,
                TokenKind::EqualEqual,
                TokenKind::Identifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn keywords() {
        let kinds = lex_kinds("and or not true false");
        assert_eq!(
            kinds,
            vec![
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::True,
                TokenKind::False,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn keyword_prefix_is_identifier() {
        let tokens = lex("forever endless iff");
        for token in &tokens[..3] {
            assert_eq!(token.kind, TokenKind::Identifier, "{:?}", token.lexeme);
        }
    }

    #[test]
    fn capitalized_keyword_is_type_identifier() {
        let kinds = lex_kinds("If Record");
        assert_eq!(
            kinds,
            vec![
                TokenKind::TypeIdentifier,
                TokenKind::TypeIdentifier,
                TokenKind::EndOfInput,
            ]
        );
    }

    #[test]
    fn string_keeps_quotes() {
        let tokens = lex(r#""hello world""#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, "\"hello world\"");
    }

    #[test]
    fn escaped_quote_does_not_close_string() {
        let tokens = lex(r#""say \"hi\"" x"#);
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].lexeme, r#""say \"hi\"""#);
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn unterminated_string() {
        let error = first_error("x \"never closed");
        assert_eq!(
            error.lexeme,
            "unexpected end of file while parsing string literal"
        );
        assert_eq!((error.line(), error.column()), (1, 3));
    }

    #[test]
    fn multiline_string_tracks_lines() {
        let tokens = lex("\"a\nbc\" d");
        assert_eq!((tokens[0].line(), tokens[0].column()), (1, 1));
        assert_eq!(tokens[1].lexeme, "d");
        assert_eq!((tokens[1].line(), tokens[1].column()), (2, 5));
    }

    #[test]
    fn comment_is_a_token() {
        let tokens = lex("x # trailing\ny");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].lexeme, "# trailing");
        assert_eq!((tokens[2].line(), tokens[2].column()), (2, 1));
    }

    #[test]
    fn comment_at_end_of_input() {
        let kinds = lex_kinds("#");
        assert_eq!(kinds, vec![TokenKind::Comment, TokenKind::EndOfInput]);
    }

    #[test]
    fn significant_skips_comments() {
        let kinds: Vec<_> = Scanner::new("# header\na # note\n")
            .significant()
            .map(|t| t.kind)
            .collect();
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::EndOfInput]);
    }

    #[test]
    fn numbers() {
        let tokens = lex("0 7 1234 12.05 3.");
        let lexemes: Vec<&str> = tokens[..5].iter().map(|t| &*t.lexeme).collect();
        assert_eq!(lexemes, vec!["0", "7", "1234", "12.05", "3."]);
        assert!(tokens[..5].iter().all(|t| t.kind == TokenKind::Number));
    }

    #[test]
    fn number_errors() {
        assert_eq!(first_error("1..3").lexeme, "multiple points in number");
        assert_eq!(first_error("0123").lexeme, "numbers cannot start with 0");
        assert_eq!(first_error("0.5").lexeme, "numbers cannot start with 0");
        assert_eq!(first_error("00.1.2").lexeme, "numbers cannot start with 0");
    }

    #[test]
    fn bang_without_equal_consumes_next_character() {
        let mut scanner = Scanner::new("!2 x");
        let error = scanner.next_token();
        assert_eq!(error.lexeme, "expected '=' after '!' but found '2'");
        assert_eq!(error.span.range(), 0..2);
        assert_eq!(
            scanner.last_error(),
            Some(&LexError::ExpectedEqualAfterBang(Some('2')))
        );
        let next = scanner.next_token();
        assert_eq!(next.kind, TokenKind::Identifier);
        assert_eq!(scanner.last_error(), None);
    }

    #[test]
    fn bang_at_end_of_input() {
        let mut scanner = Scanner::new("!");
        let error = scanner.next_token();
        assert_eq!(error.lexeme, "expected '=' after '!' but found end of input");
        assert_eq!(scanner.next_token().kind, TokenKind::EndOfInput);
    }

    #[test]
    fn bang_before_newline_keeps_line_count() {
        let tokens: Vec<_> = Scanner::new("!\nx").collect();
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!((tokens[1].line(), tokens[1].column()), (2, 1));
    }

    #[test]
    fn unexpected_character_recovers() {
        let tokens: Vec<_> = Scanner::new("a $ b").collect();
        assert_eq!(tokens[1].kind, TokenKind::Error);
        assert_eq!(tokens[1].lexeme, "unexpected token '$'");
        assert_eq!((tokens[1].line(), tokens[1].column()), (1, 3));
        assert_eq!(tokens[2].lexeme, "b");
        assert_eq!(tokens[2].column(), 5);
    }

    #[test]
    fn non_ascii_character_is_one_error() {
        let tokens: Vec<_> = Scanner::new("é x").collect();
        assert_eq!(tokens[0].lexeme, "unexpected token 'é'");
        assert_eq!(tokens[1].column(), 3);
    }

    #[test]
    fn tokenize_reports_every_error() {
        let (tokens, diags) = Scanner::new("0123 ok $ \"open").tokenize();
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndOfInput));
        assert_eq!(diags.len(), 3);
        let first = &diags.diagnostics()[0];
        assert_eq!(first.message, "numbers cannot start with 0");
        assert_eq!(first.span.range(), 0..4);
    }

    #[test]
    fn tokenize_attaches_help_from_the_error_cause() {
        let (_, diags) = Scanner::new("!x 1.2.3 \"open").tokenize();
        let helps: Vec<Option<&str>> = diags
            .diagnostics()
            .iter()
            .map(|d| d.suggestion.as_deref())
            .collect();
        assert_eq!(
            helps,
            vec![
                LexError::ExpectedEqualAfterBang(Some('x')).suggestion(),
                None,
                LexError::UnterminatedString.suggestion(),
            ]
        );
        assert!(helps[0].is_some());
    }

    #[test]
    fn oversized_buffers_are_rejected() {
        assert_eq!(check_len(0), Ok(()));
        assert_eq!(check_len(MAX_SOURCE_LEN), Ok(()));
        if let Some(len) = MAX_SOURCE_LEN.checked_add(1) {
            assert_eq!(check_len(len), Err(SourceError::TooLarge { len }));
        }
    }

    #[test]
    fn from_utf8_rejects_invalid_bytes() {
        let bytes = [b'a', b' ', 0xff, b'b'];
        match Scanner::from_utf8(&bytes) {
            Err(SourceError::InvalidUtf8 { offset }) => assert_eq!(offset, 2),
            other => panic!("expected invalid UTF-8 to be rejected, got {:?}", other.err()),
        }
        assert!(Scanner::from_utf8(b"record").is_ok());
    }
}

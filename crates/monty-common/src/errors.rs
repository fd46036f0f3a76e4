use crate::span::Span;

/// A lexical error located in the source, with optional help text.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error: {}\n  --> {}", self.message, self.span)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n   = help: {}", suggestion)?;
        }
        Ok(())
    }
}

/// Errors collected over one scan, in source order.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    fn span(line: u32, column: u32, offset: u32) -> Span {
        Span::new(
            Position::new(line, column, offset),
            Position::new(line, column + 2, offset + 2),
        )
    }

    #[test]
    fn display_includes_location_and_help() {
        let diag = Diagnostic::new("unexpected token '$'", span(5, 1, 20));
        assert_eq!(diag.to_string(), "error: unexpected token '$'\n  --> 5:1");

        let diag = diag.with_suggestion("remove it");
        assert_eq!(
            diag.to_string(),
            "error: unexpected token '$'\n  --> 5:1\n   = help: remove it"
        );
    }

    #[test]
    fn bag_keeps_source_order() {
        let mut bag = DiagnosticBag::new();
        assert!(!bag.has_errors());
        assert!(bag.is_empty());
        bag.report(Diagnostic::new("multiple points in number", span(1, 1, 0)));
        bag.report(Diagnostic::new("numbers cannot start with 0", span(2, 4, 9)));
        assert!(bag.has_errors());
        assert_eq!(bag.len(), 2);
        let messages: Vec<String> = bag.into_diagnostics().into_iter().map(|d| d.message).collect();
        assert_eq!(
            messages,
            vec!["multiple points in number", "numbers cannot start with 0"]
        );
    }
}

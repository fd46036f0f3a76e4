use std::io::Write;

use ariadne::{Color, Label, Report, ReportKind, Source};
use monty_common::Diagnostic;

/// Render a lexical error against its source.
pub fn write_diagnostic<W: Write>(
    diag: &Diagnostic,
    source: &str,
    file_name: &str,
    out: &mut W,
) -> std::io::Result<()> {
    // ariadne counts characters, spans count bytes.
    let range = diag.span.range();
    let start = char_index(source, range.start);
    let end = char_index(source, range.end).max(start + 1);

    let mut report = Report::build(ReportKind::Error, file_name, start)
        .with_message(&diag.message)
        .with_label(
            Label::new((file_name, start..end))
                .with_message(&diag.message)
                .with_color(Color::Red),
        );

    if let Some(ref suggestion) = diag.suggestion {
        report = report.with_help(suggestion);
    }

    report
        .finish()
        .write((file_name, Source::from(source)), out)
}

fn char_index(source: &str, byte_offset: usize) -> usize {
    source
        .get(..byte_offset)
        .map_or_else(|| source.chars().count(), |prefix| prefix.chars().count())
}

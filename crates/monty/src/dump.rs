use std::io::Write;

use monty_common::OutputFormat;
use monty_compiler::lexer::{Scanner, TokenKind};

use crate::CliError;

/// Settings for a token dump, after config and flags are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    pub format: OutputFormat,
    pub width: usize,
    pub skip_comments: bool,
}

/// What a dump wrote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DumpSummary {
    pub tokens: usize,
    pub errors: usize,
}

/// Write one line per token, through `EndOfInput`, to `out`.
pub fn dump_tokens<W: Write>(
    scanner: Scanner<'_>,
    options: &DumpOptions,
    out: &mut W,
) -> Result<DumpSummary, CliError> {
    let mut summary = DumpSummary::default();

    for token in scanner {
        if options.skip_comments && token.kind == TokenKind::Comment {
            continue;
        }
        match options.format {
            OutputFormat::Debug => writeln!(out, "{}", token.display(options.width))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut *out, &token)?;
                writeln!(out)?;
            }
        }
        summary.tokens += 1;
        if token.is_error() {
            summary.errors += 1;
        }
    }

    Ok(summary)
}

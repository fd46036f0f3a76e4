mod dump;
mod logging;
mod report;

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use tracing::debug;

use monty_common::config::{self, ConfigError};
use monty_common::OutputFormat;
use monty_compiler::lexer::{Scanner, SourceError};

use dump::DumpOptions;

/// Monty language driver.
#[derive(Parser)]
#[command(
    name = "monty",
    version,
    about,
    long_about = "Monty language driver.\n\nOnly the lexical front end is available: source can be scanned and\nchecked, but not yet executed.\n\nExamples:\n  monty shapes.mt --dump-tokens            Print one line per token\n  monty shapes.mt --check                  Report lexical errors\n  monty -c 'x := 1' --dump-tokens          Scan an inline program\n  cat shapes.mt | monty - --format json    Tokens from stdin as JSON"
)]
struct Cli {
    /// Source file, or `-` for stdin.
    filename: Option<PathBuf>,

    /// Arguments for the program.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Program passed in as a string.
    #[arg(short = 'c', value_name = "SOURCE")]
    command: Option<String>,

    /// Print the token stream to stdout.
    #[arg(long = "dump-tokens")]
    dump_tokens: bool,

    /// Print the syntax tree to stdout.
    #[arg(long = "dump-ast")]
    dump_ast: bool,

    /// Report lexical errors without running.
    #[arg(long)]
    check: bool,

    /// Token dump format (default from Monty.toml, else debug).
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Characters of each token value shown in debug dumps.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    width: Option<u64>,

    /// Leave comment tokens out of the dump.
    #[arg(long = "skip-comments")]
    skip_comments: bool,

    /// Log filter level.
    #[arg(
        long = "log-level",
        value_name = "LEVEL",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Debug,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Debug => OutputFormat::Debug,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Errors that end the driver with exit status 1.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("could not read '{path}': {source}")]
    Read { path: String, source: io::Error },
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("failed to serialize token: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Source(#[from] SourceError),
    #[error("interpreter not implemented")]
    NotImplemented,
}

/// Where the program text comes from.
enum Input {
    File(PathBuf),
    Stdin,
    Inline(String),
}

impl Input {
    fn from_cli(cli: &Cli) -> Self {
        match (&cli.command, &cli.filename) {
            (Some(source), _) => Input::Inline(source.clone()),
            (None, Some(path)) if path.as_os_str() != "-" => Input::File(path.clone()),
            (None, _) => Input::Stdin,
        }
    }

    /// Name shown in reports.
    fn display_name(&self) -> String {
        match self {
            Input::File(path) => path
                .file_name()
                .unwrap_or(path.as_os_str())
                .to_string_lossy()
                .to_string(),
            Input::Stdin => "[stdin]".to_string(),
            Input::Inline(_) => "[string]".to_string(),
        }
    }

    /// Directory the Monty.toml search starts from.
    fn config_dir(&self) -> Result<PathBuf, CliError> {
        if let Input::File(path) = self {
            let parent = fs::canonicalize(path)
                .ok()
                .and_then(|abs| abs.parent().map(Path::to_path_buf));
            if let Some(dir) = parent {
                return Ok(dir);
            }
        }
        Ok(env::current_dir()?)
    }

    fn read(&self) -> Result<Vec<u8>, CliError> {
        match self {
            Input::File(path) => fs::read(path).map_err(|source| CliError::Read {
                path: path.display().to_string(),
                source,
            }),
            Input::Stdin => {
                let mut bytes = Vec::new();
                io::stdin()
                    .read_to_end(&mut bytes)
                    .map_err(|source| CliError::Read {
                        path: "-".to_string(),
                        source,
                    })?;
                Ok(bytes)
            }
            Input::Inline(source) => Ok(source.clone().into_bytes()),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<i32, CliError> {
    let input = Input::from_cli(cli);

    // === Configuration ===
    let config = config::find_and_load_config(&input.config_dir()?)?;
    let level = cli.log_level.as_deref().unwrap_or(config.log.level.as_str());
    logging::init(level);
    debug!(
        target: "monty::cli",
        config = ?config.source,
        args = ?cli.args,
        "starting"
    );

    let options = DumpOptions {
        format: cli.format.map(Into::into).unwrap_or(config.output.format),
        width: cli
            .width
            .map_or(config.output.display_width, |w| w as usize),
        skip_comments: cli.skip_comments || config.output.skip_comments,
    };

    // === Source ===
    let bytes = input.read()?;
    let source = Scanner::from_utf8(&bytes)?.source();

    let stdout = io::stdout();
    let stderr = io::stderr();
    execute(
        cli,
        source,
        &input.display_name(),
        &options,
        &mut stdout.lock(),
        &mut stderr.lock(),
    )
}

/// Carry out the requested actions on `source` and return the exit status.
fn execute<O: Write, E: Write>(
    cli: &Cli,
    source: &str,
    file_name: &str,
    options: &DumpOptions,
    out: &mut O,
    err: &mut E,
) -> Result<i32, CliError> {
    let mut status = 0;

    if cli.dump_tokens {
        let summary = dump::dump_tokens(Scanner::new(source), options, out)?;
        out.flush()?;
        debug!(
            target: "monty::cli",
            tokens = summary.tokens,
            errors = summary.errors,
            "dumped tokens"
        );
    }

    if cli.check {
        let (_, diagnostics) = Scanner::new(source).tokenize();
        for diag in diagnostics.diagnostics() {
            report::write_diagnostic(diag, source, file_name, err)?;
        }
        if diagnostics.has_errors() {
            writeln!(err, "{}: {} lexical error(s)", file_name, diagnostics.len())?;
            status = 1;
        } else if !cli.dump_tokens {
            writeln!(out, "No errors found.")?;
        }
    }

    if cli.dump_ast || !(cli.dump_tokens || cli.check) {
        return Err(CliError::NotImplemented);
    }

    Ok(status)
}

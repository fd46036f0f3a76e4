pub mod config;
pub mod errors;
pub mod span;

pub use config::{ConfigError, MontyConfig, OutputFormat};
pub use errors::{Diagnostic, DiagnosticBag};
pub use span::{Position, Span};

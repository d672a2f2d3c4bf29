//! Error types for the live-preview engine.

use miette::Diagnostic;

/// A decoration set could not be built for this cycle.
///
/// Usually means spans were computed against an older snapshot than the
/// length they are being validated against. The engine logs these and falls
/// back to an empty set; they never reach the host.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum DecorationError {
    /// A decoration reaches past the end of the document.
    #[error("decoration {start}..{end} is outside the document (length {len})")]
    #[diagnostic(
        code(quire::decorations::out_of_bounds),
        help("spans were probably scanned from a stale snapshot")
    )]
    OutOfBounds { start: usize, end: usize, len: usize },

    /// A decoration ends before it starts.
    #[error("decoration {start}..{end} ends before it starts")]
    #[diagnostic(code(quire::decorations::inverted))]
    InvertedRange { start: usize, end: usize },
}

/// Invalid preview configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// The class prefix would produce unusable CSS class names.
    #[error("invalid class prefix {prefix:?}")]
    #[diagnostic(
        code(quire::config::class_prefix),
        help("use ASCII letters, digits, `-` or `_`, starting with a letter")
    )]
    InvalidClassPrefix { prefix: String },
}

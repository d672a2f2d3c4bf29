//! Error types for math rendering.

use miette::Diagnostic;

/// Reasons a formula failed to render.
///
/// These never cross the [`MathRenderer`](crate::MathRenderer) boundary; the
/// adapter folds them into `None`. They surface through [`try_render`] and
/// the message of [`MathResult::Error`](crate::MathResult::Error).
///
/// [`try_render`]: crate::try_render
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum MathError {
    /// The LaTeX source could not be parsed.
    #[error("latex parse error: {0}")]
    #[diagnostic(
        code(quire::math::parse),
        help("check for unbalanced braces or unknown commands")
    )]
    Parse(String),

    /// Parsing succeeded but MathML output failed.
    #[error("mathml output failed: {0}")]
    #[diagnostic(code(quire::math::output))]
    Output(String),

    /// The underlying parser panicked.
    #[error("renderer panicked while rendering formula")]
    #[diagnostic(code(quire::math::panic))]
    Panicked,
}

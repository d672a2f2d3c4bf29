//! Quire renderer
//!
//! Math rendering for the live-preview editor. The editor core only sees the
//! [`MathRenderer`] trait; [`LatexRenderer`] is the default implementation,
//! turning LaTeX into MathML with pulldown-latex.

pub mod error;
pub mod math;

pub use error::MathError;
pub use math::{
    FnRenderer, LatexRenderer, MathRenderer, MathResult, RenderMemo, render_math, try_render,
};

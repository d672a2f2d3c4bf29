//! LaTeX math rendering via pulldown-latex → MathML

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::Arc;

use pulldown_cmark_escape::escape_html;
use pulldown_latex::{
    Parser, Storage, config::DisplayMode, config::RenderConfig, mathml::push_mathml,
};
use smol_str::SmolStr;

use crate::error::MathError;

/// Result of attempting to render LaTeX math
pub enum MathResult {
    /// Successfully rendered MathML
    Success(String),
    /// Rendering failed - contains fallback HTML with source and error message
    Error { html: String, message: String },
}

/// Render LaTeX math to MathML, producing fallback HTML on failure.
///
/// # Arguments
/// * `latex` - The LaTeX source string (without delimiters like $ or $$)
/// * `display_mode` - If true, render as display math (block); if false, inline
pub fn render_math(latex: &str, display_mode: bool) -> MathResult {
    match try_render(latex, display_mode) {
        Ok(mathml) => MathResult::Success(mathml),
        Err(e) => {
            let message = e.to_string();
            MathResult::Error {
                html: format_error_html(latex, &message, display_mode),
                message,
            }
        }
    }
}

/// Render LaTeX math to MathML, reporting why it failed.
pub fn try_render(latex: &str, display_mode: bool) -> Result<String, MathError> {
    let storage = Storage::new();
    let parser = Parser::new(latex, &storage);
    let config = RenderConfig {
        display_mode: if display_mode {
            DisplayMode::Block
        } else {
            DisplayMode::Inline
        },
        ..Default::default()
    };

    // Collect events first so parse errors are reported before any output.
    let events: Vec<_> = parser.collect();
    let errors: Vec<String> = events
        .iter()
        .filter_map(|e| e.as_ref().err().map(|err| err.to_string()))
        .collect();

    if !errors.is_empty() {
        return Err(MathError::Parse(errors.join("; ")));
    }

    let mut mathml = String::new();
    push_mathml(&mut mathml, events.into_iter(), config)
        .map_err(|e| MathError::Output(e.to_string()))?;
    Ok(mathml)
}

fn format_error_html(latex: &str, error: &str, display_mode: bool) -> String {
    let mode_class = if display_mode {
        "math-display"
    } else {
        "math-inline"
    };
    let mut escaped_latex = String::new();
    let mut escaped_error = String::new();
    // These won't fail writing to String
    let _ = escape_html(&mut escaped_latex, latex);
    let _ = escape_html(&mut escaped_error, error);
    format!(
        r#"<span class="math math-error {mode_class}" title="{escaped_error}"><code>{escaped_latex}</code></span>"#
    )
}

/// Turns a formula into markup.
///
/// Implementations must not panic or report errors outward: a formula that
/// cannot be rendered yields `None`.
pub trait MathRenderer {
    /// Render `formula` as block (`display_mode = true`) or inline math.
    fn render(&self, formula: &str, display_mode: bool) -> Option<String>;
}

/// [`MathRenderer`] backed by pulldown-latex.
///
/// Holds no state; construct it once and keep it alongside the editor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatexRenderer;

impl LatexRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MathRenderer for LatexRenderer {
    fn render(&self, formula: &str, display_mode: bool) -> Option<String> {
        let result = catch_unwind(AssertUnwindSafe(|| try_render(formula, display_mode)))
            .unwrap_or(Err(MathError::Panicked));

        match result {
            Ok(mathml) => Some(mathml),
            Err(e) => {
                tracing::debug!(
                    target: "quire::math",
                    formula,
                    display_mode,
                    error = %e,
                    "formula did not render"
                );
                None
            }
        }
    }
}

/// Adapts a closure into a [`MathRenderer`].
pub struct FnRenderer<F>(pub F);

impl<F> MathRenderer for FnRenderer<F>
where
    F: Fn(&str, bool) -> Option<String>,
{
    fn render(&self, formula: &str, display_mode: bool) -> Option<String> {
        (self.0)(formula, display_mode)
    }
}

impl<R: MathRenderer + ?Sized> MathRenderer for &R {
    fn render(&self, formula: &str, display_mode: bool) -> Option<String> {
        (**self).render(formula, display_mode)
    }
}

impl<R: MathRenderer + ?Sized> MathRenderer for Box<R> {
    fn render(&self, formula: &str, display_mode: bool) -> Option<String> {
        (**self).render(formula, display_mode)
    }
}

impl<R: MathRenderer + ?Sized> MathRenderer for Rc<R> {
    fn render(&self, formula: &str, display_mode: bool) -> Option<String> {
        (**self).render(formula, display_mode)
    }
}

impl<R: MathRenderer + ?Sized> MathRenderer for Arc<R> {
    fn render(&self, formula: &str, display_mode: bool) -> Option<String> {
        (**self).render(formula, display_mode)
    }
}

/// Per-cycle render memo keyed by `(formula, display_mode)`.
///
/// A formula written twice in one document is rendered once. Failures are
/// memoized too. Drop the memo at the end of the cycle.
pub struct RenderMemo<'r, R: ?Sized> {
    renderer: &'r R,
    cache: HashMap<(SmolStr, bool), Option<String>>,
    enabled: bool,
    renders: usize,
}

impl<'r, R: MathRenderer + ?Sized> RenderMemo<'r, R> {
    pub fn new(renderer: &'r R) -> Self {
        Self {
            renderer,
            cache: HashMap::new(),
            enabled: true,
            renders: 0,
        }
    }

    /// A memo that forwards every call to the renderer.
    pub fn passthrough(renderer: &'r R) -> Self {
        Self {
            enabled: false,
            ..Self::new(renderer)
        }
    }

    pub fn render(&mut self, formula: &str, display_mode: bool) -> Option<String> {
        if !self.enabled {
            self.renders += 1;
            return self.renderer.render(formula, display_mode);
        }

        let key = (SmolStr::new(formula), display_mode);
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        self.renders += 1;
        let rendered = self.renderer.render(formula, display_mode);
        self.cache.insert(key, rendered.clone());
        rendered
    }

    /// Number of calls that reached the underlying renderer.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

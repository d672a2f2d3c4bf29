//! Selection-dependent visibility of syntax spans.
//!
//! A span whose range the selection touches shows its raw source for
//! editing. Every other span is collapsed: math is hidden behind a rendered
//! widget, other constructs keep their source and get styled.

use serde::Serialize;

use crate::syntax::SyntaxSpan;
use crate::types::Selection;

/// How a span is shown for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Selection touches the span; raw source is shown.
    Editing,
    /// Selection is elsewhere.
    Collapsed,
}

impl Visibility {
    pub fn is_editing(self) -> bool {
        self == Visibility::Editing
    }
}

/// A span paired with its visibility for one update cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedSpan<'a> {
    pub span: &'a SyntaxSpan,
    pub visibility: Visibility,
}

impl ClassifiedSpan<'_> {
    pub fn is_editing(&self) -> bool {
        self.visibility.is_editing()
    }
}

/// Classify every span against the selection, preserving input order.
///
/// Both span boundaries count as touching, so a caret directly after a
/// closing delimiter keeps that span in editing mode. Pure: the same spans
/// and selection always give the same result.
pub fn classify(spans: &[SyntaxSpan], selection: Selection) -> Vec<ClassifiedSpan<'_>> {
    spans
        .iter()
        .map(|span| ClassifiedSpan {
            span,
            visibility: if span.touched_by(&selection) {
                Visibility::Editing
            } else {
                Visibility::Collapsed
            },
        })
        .collect()
}

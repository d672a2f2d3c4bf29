//! Rendered math widgets and the click bridge back to the source.

use std::ops::Range;

use pulldown_cmark_escape::escape_html;
use serde::Serialize;

use crate::config::ClassNames;
use crate::document::EditorDocument;
use crate::types::Selection;

/// Rendered formula shown in place of collapsed math source.
///
/// Positioned at the end of its source span. Two widgets are equal when they
/// show the same markup for the same source, which lets a host reuse the
/// existing DOM node across cycles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MathWidget {
    /// Char offset the widget is attached at (the source span's end).
    pub at: usize,
    /// Rendered markup produced by the math renderer.
    pub html: String,
    /// Block math is centered on its own line.
    pub block_level: bool,
    pub source_start: usize,
    pub source_end: usize,
}

impl MathWidget {
    pub fn new(html: String, source: Range<usize>, block_level: bool) -> Self {
        Self {
            at: source.end,
            html,
            block_level,
            source_start: source.start,
            source_end: source.end,
        }
    }

    pub fn source_range(&self) -> Range<usize> {
        self.source_start..self.source_end
    }

    /// Caret position that puts the source back into editing mode.
    ///
    /// One char past the opening delimiter, clamped to the document.
    pub fn caret_target(&self, doc_len: usize) -> usize {
        (self.source_start + 1).min(doc_len)
    }

    /// Wrapper element for the host to mount.
    ///
    /// Block widgets are a `div`, inline widgets a `span`. The source range
    /// rides along as data attributes so a click handler can find it again.
    pub fn to_html(&self, classes: &ClassNames) -> String {
        let (tag, class) = if self.block_level {
            ("div", &classes.math_widget_block)
        } else {
            ("span", &classes.math_widget_inline)
        };
        let mut escaped_class = String::new();
        // Writing to a String can't fail
        let _ = escape_html(&mut escaped_class, class);
        format!(
            r#"<{tag} class="{escaped_class}" data-source-start="{}" data-source-end="{}" contenteditable="false">{}</{tag}>"#,
            self.source_start, self.source_end, self.html
        )
    }

    /// Handle a primary-button press on this widget.
    ///
    /// Moves the caret just inside the source and hands focus back to the
    /// buffer. The next update cycle sees the caret inside the span and
    /// shows the raw source.
    pub fn activate<D: EditorDocument + ?Sized>(&self, doc: &mut D) -> ClickResponse {
        let caret = self.caret_target(doc.len_chars());
        let selection = Selection::collapsed(caret);
        doc.set_selection(selection);
        doc.request_focus();

        tracing::debug!(
            target: "quire::decorations",
            source_start = self.source_start,
            source_end = self.source_end,
            caret,
            "math widget activated"
        );

        ClickResponse {
            prevent_default: true,
            selection,
            focus: true,
        }
    }
}

impl PartialEq for MathWidget {
    fn eq(&self, other: &Self) -> bool {
        self.html == other.html
            && self.source_start == other.source_start
            && self.source_end == other.source_end
    }
}

impl Eq for MathWidget {}

/// What the host should do after a widget press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickResponse {
    /// Suppress the native press behavior so it can't move the caret again.
    pub prevent_default: bool,
    /// Selection that was dispatched.
    pub selection: Selection,
    /// Focus was handed back to the buffer.
    pub focus: bool,
}

//! The live-preview engine.
//!
//! `LivePreview` owns the math renderer and the style configuration and runs
//! one scan → classify → compile cycle per document or selection change.
//! Every cycle is a full rebuild from `(text, selection)`.

use quire_renderer::{LatexRenderer, MathRenderer};

use crate::actions::{FormatAction, ToggleCommand, Transaction};
use crate::config::PreviewConfig;
use crate::decorations::{DecorationSet, compile};
use crate::document::EditorDocument;
use crate::execute::{execute_format, execute_toggle};
use crate::syntax::{SyntaxSpan, scan};
use crate::types::Selection;
use crate::visibility::classify;
use crate::widget::ClickResponse;

/// Live-preview engine for a single buffer.
#[derive(Debug, Clone)]
pub struct LivePreview<R = LatexRenderer> {
    renderer: R,
    config: PreviewConfig,
}

impl Default for LivePreview<LatexRenderer> {
    fn default() -> Self {
        Self::new()
    }
}

impl LivePreview<LatexRenderer> {
    /// Engine with the built-in LaTeX renderer and default classes.
    pub fn new() -> Self {
        Self::with_renderer(LatexRenderer::new())
    }
}

impl<R: MathRenderer> LivePreview<R> {
    pub fn with_renderer(renderer: R) -> Self {
        Self {
            renderer,
            config: PreviewConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PreviewConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Rebuild decorations for `text` with the given selection.
    ///
    /// The selection is clamped to the text first. Never fails: if the
    /// decorations can't be built the cycle yields an empty set.
    pub fn update(&self, text: &str, selection: Selection) -> DecorationSet {
        let len = text.chars().count();
        let spans = scan(text);
        self.decorate(len, &spans, selection)
    }

    /// Classify and compile already-scanned spans.
    ///
    /// Useful when the host scans once and re-decorates on selection-only
    /// changes. `doc_len` must be the char length of the text that was
    /// scanned; spans from another snapshot yield an empty set.
    pub fn decorate(
        &self,
        doc_len: usize,
        spans: &[SyntaxSpan],
        selection: Selection,
    ) -> DecorationSet {
        let selection = selection.clamp(doc_len);
        let classified = classify(spans, selection);

        match compile(doc_len, &classified, &self.renderer, &self.config) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(
                    target: "quire::decorations",
                    error = %e,
                    doc_len,
                    spans = spans.len(),
                    "decorations dropped for this cycle"
                );
                DecorationSet::empty()
            }
        }
    }

    /// Rebuild decorations from a document's current text and selection.
    pub fn update_document<D: EditorDocument + ?Sized>(&self, doc: &D) -> DecorationSet {
        self.update(&doc.content_string(), doc.selection())
    }

    /// Route a press on the widget whose source starts at `source_start`.
    ///
    /// Returns `None` when `decorations` holds no such widget, in which case
    /// the host should let the event through.
    pub fn click_widget<D: EditorDocument + ?Sized>(
        &self,
        decorations: &DecorationSet,
        doc: &mut D,
        source_start: usize,
    ) -> Option<ClickResponse> {
        decorations
            .widget_for_source(source_start)
            .map(|widget| widget.activate(doc))
    }

    pub fn toggle<D: EditorDocument + ?Sized>(
        &self,
        doc: &mut D,
        command: &ToggleCommand,
    ) -> Transaction {
        execute_toggle(doc, command)
    }

    pub fn format<D: EditorDocument + ?Sized>(
        &self,
        doc: &mut D,
        action: FormatAction,
    ) -> Transaction {
        execute_format(doc, action)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use quire_renderer::FnRenderer;

    use super::*;
    use crate::decorations::Decoration;
    use crate::document::PlainEditor;

    const SPEED: &str = r"Speed is $v=\frac{d}{t}$ always.";

    #[test]
    fn test_latex_inline_collapses_to_widget() {
        let preview = LivePreview::new();
        let set = preview.update(SPEED, Selection::collapsed(0));

        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0], Decoration::mark(9, 24, "md-math-hidden"));
        let widget = set.widget_for_source(9).unwrap();
        assert!(widget.html.contains("<math"));
        assert!(!widget.block_level);
    }

    #[test]
    fn test_caret_inside_switches_to_editing() {
        let preview = LivePreview::new();
        let set = preview.update(SPEED, Selection::collapsed(12));
        assert_eq!(set.as_slice(), &[Decoration::mark(9, 24, "md-math-editing")]);
    }

    #[test]
    fn test_selection_past_end_is_clamped() {
        let preview = LivePreview::new();
        let len = SPEED.chars().count();

        let set = preview.update(SPEED, Selection::collapsed(len + 10));
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0], Decoration::mark(9, 24, "md-math-hidden"));
        assert!(set.widget_for_source(9).is_some());

        let set = preview.update(SPEED, Selection::new(len + 50, len + 5));
        assert_eq!(set.widgets().count(), 1);
    }

    #[test]
    fn test_malformed_formula_has_no_widget() {
        let preview = LivePreview::new();
        let set = preview.update(r"bad $\frac{$ formula", Selection::collapsed(0));
        assert_eq!(set.as_slice(), &[Decoration::mark(4, 12, "md-math-hidden")]);
    }

    #[test]
    fn test_stale_spans_degrade_to_empty() {
        let preview = LivePreview::new();
        let spans = scan("**a long bold run**");
        let set = preview.decorate(5, &spans, Selection::collapsed(0));
        assert!(set.is_empty());
    }

    #[test]
    fn test_click_round_trip() {
        let calls = Cell::new(0);
        let preview = LivePreview::with_renderer(FnRenderer(|_: &str, display: bool| {
            calls.set(calls.get() + 1);
            Some(format!("<m block=\"{display}\"/>"))
        }));
        let mut doc = PlainEditor::from_text(r"Intro. $$ \int_0^1 x dx $$ outro");

        let set = preview.update_document(&doc);
        assert_eq!(calls.get(), 1);
        let widget = set.widgets().next().unwrap();
        assert!(widget.block_level);
        assert_eq!(widget.source_range(), 7..26);

        let response = preview.click_widget(&set, &mut doc, 7).unwrap();
        assert_eq!(response.selection, Selection::collapsed(8));
        assert!(doc.is_focused());

        let set = preview.update_document(&doc);
        assert_eq!(set.widgets().count(), 0);
        assert_eq!(set.as_slice(), &[Decoration::mark(7, 26, "md-math-editing")]);

        assert!(preview.click_widget(&set, &mut doc, 7).is_none());
    }

    #[test]
    fn test_custom_prefix() {
        let config = PreviewConfig::from_prefix(Some("cm")).unwrap();
        let preview = LivePreview::new().with_config(config);
        let set = preview.update("**x**", Selection::collapsed(0));
        assert_eq!(set.as_slice(), &[Decoration::mark(0, 5, "cm-bold")]);
    }

    #[test]
    fn test_format_then_update() {
        let preview = LivePreview::new();
        let mut doc = PlainEditor::from_text("area");
        doc.set_selection(Selection::new(0, 4));
        preview.format(&mut doc, FormatAction::InlineMath);
        assert_eq!(doc.content_string(), "$area$");

        // Selection now covers the formula body, so it stays in editing mode
        let set = preview.update_document(&doc);
        assert_eq!(set.as_slice(), &[Decoration::mark(0, 6, "md-math-editing")]);
    }
}

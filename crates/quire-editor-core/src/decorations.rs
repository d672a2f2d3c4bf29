//! Decoration compilation.
//!
//! Turns classified spans into the overlay the host applies over the buffer:
//! style marks over ranges and rendered math widgets at points. The buffer
//! itself is never touched.

use quire_renderer::{MathRenderer, RenderMemo};
use serde::Serialize;
use smol_str::SmolStr;

use crate::config::PreviewConfig;
use crate::error::DecorationError;
use crate::syntax::SpanKind;
use crate::visibility::ClassifiedSpan;
use crate::widget::MathWidget;

/// One overlay element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Decoration {
    /// Style class over `[start, end)`.
    Mark {
        start: usize,
        end: usize,
        class: SmolStr,
    },
    /// Rendered node at a single offset.
    Widget(MathWidget),
}

impl Decoration {
    pub fn mark(start: usize, end: usize, class: impl Into<SmolStr>) -> Self {
        Decoration::Mark {
            start,
            end,
            class: class.into(),
        }
    }

    /// Offset the decoration starts at.
    pub fn position(&self) -> usize {
        match self {
            Decoration::Mark { start, .. } => *start,
            Decoration::Widget(w) => w.at,
        }
    }

    /// Offset the decoration ends at. Widgets are zero-width.
    pub fn end(&self) -> usize {
        match self {
            Decoration::Mark { end, .. } => *end,
            Decoration::Widget(w) => w.at,
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self, Decoration::Widget(_))
    }

    pub fn as_widget(&self) -> Option<&MathWidget> {
        match self {
            Decoration::Widget(w) => Some(w),
            Decoration::Mark { .. } => None,
        }
    }

    fn sort_key(&self) -> (usize, bool, usize) {
        (self.position(), self.is_widget(), self.end())
    }

    fn validate(&self, doc_len: usize) -> Result<(), DecorationError> {
        let (start, end) = match self {
            Decoration::Mark { start, end, .. } => (*start, *end),
            Decoration::Widget(w) => (w.source_start, w.source_end),
        };
        if start > end {
            return Err(DecorationError::InvertedRange { start, end });
        }
        if end > doc_len || self.position() > doc_len {
            return Err(DecorationError::OutOfBounds {
                start,
                end,
                len: doc_len,
            });
        }
        Ok(())
    }
}

/// Sorted, validated decorations for one update cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecorationSet(Vec<Decoration>);

impl DecorationSet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sort decorations and check each lies within `[0, doc_len]`.
    ///
    /// Sorted by start; at equal starts marks come before widgets, then
    /// shorter before longer.
    pub fn build(
        doc_len: usize,
        mut decorations: Vec<Decoration>,
    ) -> Result<Self, DecorationError> {
        for decoration in &decorations {
            decoration.validate(doc_len)?;
        }
        decorations.sort_by_key(Decoration::sort_key);
        Ok(Self(decorations))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decoration> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Decoration] {
        &self.0
    }

    pub fn marks(&self) -> impl Iterator<Item = (usize, usize, &SmolStr)> {
        self.0.iter().filter_map(|d| match d {
            Decoration::Mark { start, end, class } => Some((*start, *end, class)),
            Decoration::Widget(_) => None,
        })
    }

    pub fn widgets(&self) -> impl Iterator<Item = &MathWidget> {
        self.0.iter().filter_map(Decoration::as_widget)
    }

    /// Find the widget whose source span starts at `source_start`.
    pub fn widget_for_source(&self, source_start: usize) -> Option<&MathWidget> {
        self.widgets().find(|w| w.source_start == source_start)
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Compile classified spans into a decoration set.
///
/// Math spans in editing mode get the editing mark. Collapsed math gets the
/// hiding mark plus a widget at the span end, unless the renderer declined
/// the formula. Every other kind always gets its style mark; headings also
/// get a per-level class.
pub fn compile<R: MathRenderer + ?Sized>(
    doc_len: usize,
    spans: &[ClassifiedSpan<'_>],
    renderer: &R,
    config: &PreviewConfig,
) -> Result<DecorationSet, DecorationError> {
    let classes = &config.classes;
    let mut memo = if config.memoize_math {
        RenderMemo::new(renderer)
    } else {
        RenderMemo::passthrough(renderer)
    };
    let mut decorations = Vec::with_capacity(spans.len() + 4);

    for classified in spans {
        let span = classified.span;
        let range = span.range.clone();

        if !span.is_math() {
            let class = match span.heading_level() {
                Some(level) => classes.heading_class(level),
                None => classes.for_kind(span.kind).clone(),
            };
            decorations.push(Decoration::mark(range.start, range.end, class));
            continue;
        }

        if classified.is_editing() {
            decorations.push(Decoration::mark(
                range.start,
                range.end,
                classes.math_editing.clone(),
            ));
            continue;
        }

        decorations.push(Decoration::mark(
            range.start,
            range.end,
            classes.math_hidden.clone(),
        ));

        let block_level = span.kind == SpanKind::MathBlock;
        match memo.render(span.inner_text.trim(), block_level) {
            Some(html) => {
                decorations.push(Decoration::Widget(MathWidget::new(html, range, block_level)))
            }
            None => {
                tracing::debug!(
                    target: "quire::decorations",
                    start = range.start,
                    end = range.end,
                    "math left hidden without a widget"
                );
            }
        }
    }

    tracing::trace!(
        target: "quire::decorations",
        decorations = decorations.len(),
        renders = memo.renders(),
        "compiled decorations"
    );

    DecorationSet::build(doc_len, decorations)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use quire_renderer::FnRenderer;

    use super::*;
    use crate::syntax::{SyntaxSpan, scan};
    use crate::types::Selection;
    use crate::visibility::classify;

    fn fake_renderer() -> FnRenderer<impl Fn(&str, bool) -> Option<String>> {
        FnRenderer(|formula: &str, display: bool| {
            Some(format!("<m d=\"{display}\">{formula}</m>"))
        })
    }

    fn decorate(text: &str, selection: Selection) -> DecorationSet {
        let spans = scan(text);
        let classified = classify(&spans, selection);
        compile(
            text.chars().count(),
            &classified,
            &fake_renderer(),
            &PreviewConfig::default(),
        )
        .unwrap()
    }

    const SPEED: &str = r"Speed is $v=\frac{d}{t}$ always.";

    #[test]
    fn test_collapsed_inline_math() {
        let set = decorate(SPEED, Selection::collapsed(0));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.as_slice()[0],
            Decoration::mark(9, 24, "md-math-hidden")
        );
        let widget = set.widgets().next().unwrap();
        assert_eq!(widget.at, 24);
        assert_eq!(widget.source_range(), 9..24);
        assert!(!widget.block_level);
        assert_eq!(widget.html, r#"<m d="false">v=\frac{d}{t}</m>"#);
    }

    #[test]
    fn test_editing_inline_math() {
        let set = decorate(SPEED, Selection::collapsed(12));
        assert_eq!(
            set.as_slice(),
            &[Decoration::mark(9, 24, "md-math-editing")]
        );
        assert_eq!(set.widgets().count(), 0);
    }

    #[test]
    fn test_block_math_renders_once_in_display_mode() {
        let calls = RefCell::new(Vec::new());
        let renderer = FnRenderer(|formula: &str, display: bool| {
            calls.borrow_mut().push((formula.to_string(), display));
            Some("<math display=\"block\"/>".to_string())
        });
        let text = r"Intro. $$ \int_0^1 x dx $$ outro";
        let spans = scan(text);
        let classified = classify(&spans, Selection::collapsed(0));
        let set = compile(
            text.chars().count(),
            &classified,
            &renderer,
            &PreviewConfig::default(),
        )
        .unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![(r"\int_0^1 x dx".to_string(), true)]
        );
        let widget = set.widgets().next().unwrap();
        assert!(widget.block_level);
        assert_eq!(widget.source_range(), 7..26);
    }

    #[test]
    fn test_render_failure_hides_without_widget() {
        let text = "bad $\\frac{$ formula";
        let spans = scan(text);
        let classified = classify(&spans, Selection::collapsed(0));
        let set = compile(
            text.chars().count(),
            &classified,
            &FnRenderer(|_: &str, _: bool| None),
            &PreviewConfig::default(),
        )
        .unwrap();
        assert_eq!(set.as_slice(), &[Decoration::mark(4, 12, "md-math-hidden")]);
    }

    #[test]
    fn test_non_math_always_marked() {
        let text = "# Title\n**bold** and `code`";
        for caret in [0, 10, 26] {
            let set = decorate(text, Selection::collapsed(caret));
            let marks: Vec<_> = set.marks().map(|(s, e, c)| (s, e, c.to_string())).collect();
            assert_eq!(
                marks,
                vec![
                    (0, 7, "md-heading md-heading-1".to_string()),
                    (8, 16, "md-bold".to_string()),
                    (21, 27, "md-inline-code".to_string()),
                ]
            );
        }
    }

    #[test]
    fn test_repeated_formula_memoized() {
        let calls = RefCell::new(0);
        let renderer = FnRenderer(|_: &str, _: bool| {
            *calls.borrow_mut() += 1;
            Some("<m/>".to_string())
        });
        let text = "$x$ and $x$ and $y$";
        let spans = scan(text);
        let classified = classify(&spans, Selection::collapsed(19));
        let set = compile(19, &classified, &renderer, &PreviewConfig::default()).unwrap();
        // $y$ is being edited, both $x$ share one render
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(set.widgets().count(), 2);

        *calls.borrow_mut() = 0;
        let config = PreviewConfig {
            memoize_math: false,
            ..PreviewConfig::default()
        };
        compile(19, &classified, &renderer, &config).unwrap();
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_widget_sorts_after_mark_at_same_offset() {
        // $a$ is 0..3; bold starts right where its widget sits
        let set = decorate("$a$**b**", Selection::collapsed(8));
        let order: Vec<(usize, bool)> = set.iter().map(|d| (d.position(), d.is_widget())).collect();
        assert_eq!(order, vec![(0, false), (3, false), (3, true)]);
    }

    #[test]
    fn test_stale_spans_rejected() {
        let spans = scan("**bold**");
        let classified = classify(&spans, Selection::collapsed(0));
        let err = compile(4, &classified, &fake_renderer(), &PreviewConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            DecorationError::OutOfBounds {
                start: 0,
                end: 8,
                len: 4
            }
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let span = SyntaxSpan {
            kind: SpanKind::Bold,
            range: 5..2,
            inner: 5..2,
            inner_text: "".into(),
            source_text: "".into(),
        };
        let classified = classify(std::slice::from_ref(&span), Selection::collapsed(0));
        let err = compile(10, &classified, &fake_renderer(), &PreviewConfig::default())
            .unwrap_err();
        assert_eq!(err, DecorationError::InvertedRange { start: 5, end: 2 });
    }

    #[test]
    fn test_serialized_shape() {
        let set = decorate("$x$", Selection::collapsed(0));
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "mark", "start": 0, "end": 3, "class": "md-math-hidden"},
                {
                    "type": "widget",
                    "at": 3,
                    "html": "<m d=\"false\">x</m>",
                    "blockLevel": false,
                    "sourceStart": 0,
                    "sourceEnd": 3
                }
            ])
        );
    }

    #[test]
    fn test_mixed_document_snapshot() {
        let text = "## Notes\nSee [[Euler|identity]] and $x^2$, *really*.";
        let set = decorate(text, Selection::collapsed(0));
        insta::assert_yaml_snapshot!(set, @r#"
        - type: mark
          start: 0
          end: 8
          class: md-heading md-heading-2
        - type: mark
          start: 13
          end: 31
          class: md-wiki-link
        - type: mark
          start: 36
          end: 41
          class: md-math-hidden
        - type: widget
          at: 41
          html: "<m d=\"false\">x^2</m>"
          blockLevel: false
          sourceStart: 36
          sourceEnd: 41
        - type: mark
          start: 43
          end: 51
          class: md-italic
        "#);
    }
}

//! Core editor document trait and implementations.
//!
//! Defines the `EditorDocument` trait for abstracting the host edit surface:
//! a text buffer, one selection, and input focus. Formatting commands and
//! the widget click bridge are written against this trait so they work with
//! whatever storage the host uses.

use std::ops::Range;

use smol_str::SmolStr;

use crate::actions::Transaction;
use crate::text::{EditorRope, TextBuffer};
use crate::types::Selection;

/// Core trait for editor documents.
///
/// Defines the interface for any editor implementation. Different hosts
/// can implement this trait with different storage strategies:
/// - `PlainEditor<T>`: Simple field-based storage
/// - Host adapters forwarding to a native editing widget
pub trait EditorDocument {
    /// The buffer type used for text storage.
    type Buffer: TextBuffer;

    // === Required: Buffer access ===

    /// Get a reference to the underlying buffer.
    fn buffer(&self) -> &Self::Buffer;

    /// Get a mutable reference to the underlying buffer.
    fn buffer_mut(&mut self) -> &mut Self::Buffer;

    // === Required: Selection/focus state ===

    /// Get the current selection. A caret is a collapsed selection.
    fn selection(&self) -> Selection;

    /// Set the selection.
    fn set_selection(&mut self, selection: Selection);

    /// Return input focus to the editable buffer.
    fn request_focus(&mut self);

    // === Provided: Convenience accessors ===

    /// Get the cursor (selection head) offset.
    fn cursor_offset(&self) -> usize {
        self.selection().head
    }

    /// Collapse the selection to a caret at `offset`, clamped to the document.
    fn set_cursor_offset(&mut self, offset: usize) {
        let offset = offset.min(self.len_chars());
        self.set_selection(Selection::collapsed(offset));
    }

    /// Get the full content as a String.
    fn content_string(&self) -> String {
        self.buffer().to_string()
    }

    /// Get length in characters.
    fn len_chars(&self) -> usize {
        self.buffer().len_chars()
    }

    /// Check if document is empty.
    fn is_empty(&self) -> bool {
        self.buffer().len_chars() == 0
    }

    /// Get a slice of the content.
    fn slice(&self, range: Range<usize>) -> Option<SmolStr> {
        self.buffer().slice(range)
    }

    /// Get character at offset.
    fn char_at(&self, offset: usize) -> Option<char> {
        self.buffer().char_at(offset)
    }

    /// Get selected text, if the selection is not a caret.
    fn selected_text(&self) -> Option<SmolStr> {
        let sel = self.selection().clamp(self.len_chars());
        if sel.is_collapsed() {
            return None;
        }
        self.buffer().slice(sel.to_range())
    }

    // === Provided: Text operations ===

    /// Apply a transaction: one replacement, then one selection update.
    ///
    /// The change range and the resulting selection are clamped to the
    /// document, so a transaction planned against a stale snapshot never
    /// indexes out of bounds.
    fn apply(&mut self, transaction: &Transaction) {
        let len = self.len_chars();
        let to = transaction.change.to.min(len);
        let from = transaction.change.from.min(to);

        self.buffer_mut().replace(from..to, &transaction.change.insert);

        let selection = transaction.selection.clamp(self.len_chars());
        self.set_selection(selection);
    }
}

/// Simple field-based document.
///
/// Stands in for the host edit surface: holds the buffer, one selection, and
/// a flag recording whether focus was last handed back to the buffer.
#[derive(Clone, Debug, Default)]
pub struct PlainEditor<T = EditorRope> {
    buffer: T,
    selection: Selection,
    focused: bool,
}

impl<T: TextBuffer> PlainEditor<T> {
    /// Create a document with the caret at offset 0.
    pub fn new(buffer: T) -> Self {
        Self {
            buffer,
            selection: Selection::default(),
            focused: false,
        }
    }

    /// Builder-style selection setter.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        let len = self.buffer.len_chars();
        self.selection = selection.clamp(len);
        self
    }

    /// Whether focus has been returned to the buffer since the last `blur`.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Drop focus, as when the user clicks a toolbar button or a widget.
    pub fn blur(&mut self) {
        self.focused = false;
    }
}

impl PlainEditor<EditorRope> {
    /// Create a rope-backed document from a string.
    pub fn from_text(text: &str) -> Self {
        Self::new(EditorRope::from_str(text))
    }
}

impl<T: TextBuffer> EditorDocument for PlainEditor<T> {
    type Buffer = T;

    fn buffer(&self) -> &T {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut T {
        &mut self.buffer
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    fn request_focus(&mut self) {
        self.focused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Change;

    #[test]
    fn test_apply_replaces_and_selects() {
        let mut doc = PlainEditor::from_text("hello world");
        doc.apply(&Transaction {
            change: Change::new(6, 11, "rust"),
            selection: Selection::new(6, 10),
        });
        assert_eq!(doc.content_string(), "hello rust");
        assert_eq!(doc.selection(), Selection::new(6, 10));
        assert_eq!(doc.selected_text().as_deref(), Some("rust"));
    }

    #[test]
    fn test_apply_clamps_stale_transaction() {
        let mut doc = PlainEditor::from_text("abc");
        doc.apply(&Transaction {
            change: Change::new(2, 50, "Z"),
            selection: Selection::new(0, 99),
        });
        assert_eq!(doc.content_string(), "abZ");
        assert_eq!(doc.selection(), Selection::new(0, 3));
    }

    #[test]
    fn test_cursor_offset_clamps() {
        let mut doc = PlainEditor::from_text("abc");
        doc.set_cursor_offset(10);
        assert_eq!(doc.cursor_offset(), 3);
        assert!(doc.selected_text().is_none());
    }

    #[test]
    fn test_focus_flag() {
        let mut doc = PlainEditor::from_text("abc");
        assert!(!doc.is_focused());
        doc.request_focus();
        assert!(doc.is_focused());
        doc.blur();
        assert!(!doc.is_focused());
    }
}

//! Command execution for editor documents.
//!
//! Applies planned formatting transactions to any type implementing
//! `EditorDocument`: one replacement, one selection update, then focus goes
//! back to the buffer.

use crate::actions::{FormatAction, ToggleCommand, Transaction, plan_format, plan_toggle};
use crate::document::EditorDocument;

/// Run a toggle command against the document's current selection.
///
/// Returns the transaction that was applied.
pub fn execute_toggle<D: EditorDocument + ?Sized>(
    doc: &mut D,
    command: &ToggleCommand,
) -> Transaction {
    let transaction = plan_toggle(doc.buffer(), doc.selection(), command);
    commit(doc, transaction)
}

/// Run a toolbar formatting action against the document's current selection.
pub fn execute_format<D: EditorDocument + ?Sized>(
    doc: &mut D,
    action: FormatAction,
) -> Transaction {
    let transaction = plan_format(doc.buffer(), doc.selection(), action);
    commit(doc, transaction)
}

fn commit<D: EditorDocument + ?Sized>(doc: &mut D, transaction: Transaction) -> Transaction {
    doc.apply(&transaction);
    doc.request_focus();
    transaction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PlainEditor;
    use crate::types::Selection;

    #[test]
    fn test_toggle_bold() {
        let mut editor = PlainEditor::from_text("hello").with_selection(Selection::new(0, 5));
        execute_toggle(&mut editor, &ToggleCommand::bold());
        assert_eq!(editor.content_string(), "**hello**");
        assert_eq!(editor.selected_text().as_deref(), Some("hello"));
        assert!(editor.is_focused());

        editor.blur();
        execute_toggle(&mut editor, &ToggleCommand::bold());
        assert_eq!(editor.content_string(), "hello");
        assert_eq!(editor.selection(), Selection::new(0, 5));
        assert!(editor.is_focused());
    }

    #[test]
    fn test_toggle_bold_at_document_edge() {
        let mut editor = PlainEditor::from_text("**x**").with_selection(Selection::new(1, 4));
        execute_toggle(&mut editor, &ToggleCommand::bold());
        assert_eq!(editor.content_string(), "*x*");
        assert_eq!(editor.selection(), Selection::new(0, 3));
        assert_eq!(editor.selected_text().as_deref(), Some("*x*"));
    }

    #[test]
    fn test_format_heading_keeps_caret_on_text() {
        let mut editor =
            PlainEditor::from_text("intro\ntitle").with_selection(Selection::collapsed(8));
        execute_format(&mut editor, FormatAction::Heading(3));
        assert_eq!(editor.content_string(), "intro\n### title");
        assert_eq!(editor.cursor_offset(), 12);
        assert_eq!(editor.char_at(12), Some('t'));
    }

    #[test]
    fn test_format_table_on_caret() {
        let mut editor = PlainEditor::from_text("");
        execute_format(&mut editor, FormatAction::Table);
        assert_eq!(
            editor.content_string(),
            "| Column 1 | Column 2 |\n| --- | --- |\n|  |  |"
        );
        assert_eq!(editor.selected_text().as_deref(), Some("Column 1"));
    }

    #[test]
    fn test_format_block_math_placeholder() {
        let mut editor = PlainEditor::from_text("see ").with_selection(Selection::collapsed(4));
        execute_format(&mut editor, FormatAction::BlockMath);
        assert_eq!(editor.content_string(), "see $$\nx\n$$");
        assert_eq!(editor.selection(), Selection::new(7, 8));
    }
}

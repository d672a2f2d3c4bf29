//! Text navigation helpers.
//!
//! These functions work with the `TextBuffer` trait so commands can plan
//! edits without knowing how the host stores text.

use crate::text::TextBuffer;

/// Find start of line containing offset.
pub fn find_line_start<T: TextBuffer + ?Sized>(buffer: &T, offset: usize) -> usize {
    let mut pos = offset.min(buffer.len_chars());
    while pos > 0 {
        if let Some('\n') = buffer.char_at(pos - 1) {
            return pos;
        }
        pos -= 1;
    }
    0
}

//! Formatting commands and the edits they produce.
//!
//! A `ToggleCommand` wraps the selection in a prefix/suffix pair, or strips
//! the pair when it is already there. Planning is pure: `plan_toggle` reads
//! the buffer and returns a `Transaction` describing one replacement and the
//! selection that follows it. Applying it is left to `execute`.

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

use crate::text::TextBuffer;
use crate::text_helpers::find_line_start;
use crate::types::Selection;

/// A single text replacement, in char offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl Change {
    pub fn new(from: usize, to: usize, insert: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: insert.into(),
        }
    }
}

/// One atomic edit: a replacement plus the selection after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub change: Change,
    pub selection: Selection,
}

/// Wrap/unwrap formatting command.
///
/// Stateless; every invocation reads the current selection afresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleCommand {
    pub prefix: SmolStr,
    pub suffix: SmolStr,
    /// Inserted and selected when the selection is empty.
    pub placeholder: SmolStr,
    /// When false the command always wraps and never strips markers.
    pub toggle_enabled: bool,
}

impl ToggleCommand {
    pub fn new(
        prefix: impl Into<SmolStr>,
        suffix: impl Into<SmolStr>,
        placeholder: impl Into<SmolStr>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            placeholder: placeholder.into(),
            toggle_enabled: true,
        }
    }

    /// A context-free insertion that never toggles off.
    pub fn insert_only(
        prefix: impl Into<SmolStr>,
        suffix: impl Into<SmolStr>,
        placeholder: impl Into<SmolStr>,
    ) -> Self {
        Self {
            toggle_enabled: false,
            ..Self::new(prefix, suffix, placeholder)
        }
    }

    pub fn bold() -> Self {
        Self::new("**", "**", "bold text")
    }

    pub fn italic() -> Self {
        Self::new("*", "*", "italic text")
    }

    pub fn strikethrough() -> Self {
        Self::new("~~", "~~", "strikethrough")
    }

    pub fn inline_code() -> Self {
        Self::new("`", "`", "code")
    }

    pub fn link() -> Self {
        Self::new("[", "](url)", "link text")
    }

    pub fn image() -> Self {
        Self::new("![", "](url)", "alt text")
    }

    pub fn inline_math() -> Self {
        Self::new("$", "$", "x")
    }

    pub fn block_math() -> Self {
        Self::new("$$\n", "\n$$", "x")
    }

    pub fn code_block() -> Self {
        Self::insert_only("```\n", "\n```", "code")
    }

    /// Rule on its own line; the caret lands after it.
    pub fn horizontal_rule() -> Self {
        Self::insert_only("\n---\n", "", "")
    }

    /// Two-column table skeleton with the first header selected.
    pub fn table() -> Self {
        Self::insert_only(
            "| ",
            " | Column 2 |\n| --- | --- |\n|  |  |",
            "Column 1",
        )
    }
}

/// Plan a toggle against `buffer` and `selection`.
///
/// Three outcomes, tried in order:
/// - the selection includes the markers: replace it with the interior
/// - the region just around the selection, clamped to the document,
///   starts with the prefix and ends with the suffix: remove them
/// - otherwise wrap the selection (or the placeholder) in the markers
///
/// The resulting selection always spans the formatted text without its
/// markers, so typing right away replaces it.
pub fn plan_toggle<T: TextBuffer + ?Sized>(
    buffer: &T,
    selection: Selection,
    command: &ToggleCommand,
) -> Transaction {
    let sel = selection.clamp(buffer.len_chars());
    let (from, to) = (sel.start(), sel.end());
    let selected = buffer.slice(from..to).unwrap_or_default();
    let selected_len = to - from;

    let prefix = command.prefix.as_str();
    let suffix = command.suffix.as_str();
    let prefix_len = prefix.chars().count();
    let suffix_len = suffix.chars().count();

    if command.toggle_enabled && !selected.is_empty() {
        if selected_len >= prefix_len + suffix_len
            && selected.starts_with(prefix)
            && selected.ends_with(suffix)
        {
            let interior_len = selected_len - prefix_len - suffix_len;
            let interior: String = selected
                .chars()
                .skip(prefix_len)
                .take(interior_len)
                .collect();
            tracing::debug!(target: "quire::format", from, to, prefix, "unwrap selection");
            return Transaction {
                change: Change::new(from, to, interior),
                selection: Selection::new(from, from + interior_len),
            };
        }

        // Region around the selection, clamped to the document
        let start = from.saturating_sub(prefix_len);
        let end = (to + suffix_len).min(buffer.len_chars());
        let around = buffer.slice(start..end).unwrap_or_default();
        if around.starts_with(prefix) && around.ends_with(suffix) {
            tracing::debug!(
                target: "quire::format",
                from = start,
                to = end,
                prefix,
                "unwrap around selection"
            );
            return Transaction {
                change: Change::new(start, end, selected.as_str()),
                selection: Selection::new(start, start + selected_len),
            };
        }
    }

    let body = if selected.is_empty() {
        &command.placeholder
    } else {
        &selected
    };
    let body_len = body.chars().count();
    let body_start = from + prefix_len;
    tracing::debug!(target: "quire::format", from, to, prefix, "wrap selection");

    Transaction {
        change: Change::new(from, to, format!("{prefix}{body}{suffix}")),
        selection: Selection::new(body_start, body_start + body_len),
    }
}

/// Plan inserting `prefix` at the start of the line holding the selection.
///
/// The selection moves with the text it covered.
pub fn plan_line_prefix<T: TextBuffer + ?Sized>(
    buffer: &T,
    selection: Selection,
    prefix: &str,
) -> Transaction {
    let sel = selection.clamp(buffer.len_chars());
    let line_start = find_line_start(buffer, sel.start());
    let shift = prefix.chars().count() as isize;
    tracing::debug!(target: "quire::format", line_start, prefix, "prefix line");

    Transaction {
        change: Change::new(line_start, line_start, prefix),
        selection: sel.shifted(shift),
    }
}

/// Toolbar-level formatting actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormatAction {
    Bold,
    Italic,
    Strikethrough,
    Code,
    Link,
    Image,
    InlineMath,
    BlockMath,
    CodeBlock,
    HorizontalRule,
    Table,
    Heading(u8), // 1-6
    BulletList,
    NumberedList,
    Quote,
    TaskList,
}

/// How a [`FormatAction`] edits the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Toggle(ToggleCommand),
    /// Insert at the start of the current line.
    LinePrefix(SmolStr),
}

impl FormatAction {
    pub fn command(self) -> FormatCommand {
        match self {
            FormatAction::Bold => FormatCommand::Toggle(ToggleCommand::bold()),
            FormatAction::Italic => FormatCommand::Toggle(ToggleCommand::italic()),
            FormatAction::Strikethrough => FormatCommand::Toggle(ToggleCommand::strikethrough()),
            FormatAction::Code => FormatCommand::Toggle(ToggleCommand::inline_code()),
            FormatAction::Link => FormatCommand::Toggle(ToggleCommand::link()),
            FormatAction::Image => FormatCommand::Toggle(ToggleCommand::image()),
            FormatAction::InlineMath => FormatCommand::Toggle(ToggleCommand::inline_math()),
            FormatAction::BlockMath => FormatCommand::Toggle(ToggleCommand::block_math()),
            FormatAction::CodeBlock => FormatCommand::Toggle(ToggleCommand::code_block()),
            FormatAction::HorizontalRule => {
                FormatCommand::Toggle(ToggleCommand::horizontal_rule())
            }
            FormatAction::Table => FormatCommand::Toggle(ToggleCommand::table()),
            FormatAction::Heading(level) => {
                let level = level.clamp(1, 6) as usize;
                FormatCommand::LinePrefix(format_smolstr!("{} ", "#".repeat(level)))
            }
            FormatAction::BulletList => FormatCommand::LinePrefix("- ".into()),
            FormatAction::NumberedList => FormatCommand::LinePrefix("1. ".into()),
            FormatAction::Quote => FormatCommand::LinePrefix("> ".into()),
            FormatAction::TaskList => FormatCommand::LinePrefix("- [ ] ".into()),
        }
    }
}

/// Plan any [`FormatAction`].
pub fn plan_format<T: TextBuffer + ?Sized>(
    buffer: &T,
    selection: Selection,
    action: FormatAction,
) -> Transaction {
    match action.command() {
        FormatCommand::Toggle(command) => plan_toggle(buffer, selection, &command),
        FormatCommand::LinePrefix(prefix) => plan_line_prefix(buffer, selection, &prefix),
    }
}

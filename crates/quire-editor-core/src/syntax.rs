//! Markup span scanning for live preview.
//!
//! Finds every markup span the preview cares about (math, emphasis, code,
//! links, headings) in a document snapshot. Each kind is an independent pass
//! over the whole text. Spans of one kind never overlap each other; spans of
//! different kinds may, and that is left for the decoration layer to absorb.
//!
//! All offsets are char offsets into the scanned text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use smol_str::SmolStr;

use crate::types::Selection;

static MATH_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\$\$(.+?)\$\$").unwrap());
static MATH_INLINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$([^$\n]+)\$").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static STRIKE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~([^~\n]+)~~").unwrap());
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());
static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+)\]\]").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]\n]+)\]\(([^()\n]+)\)").unwrap());
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[^\S\r\n]+([^\r\n]+)").unwrap());

/// Kind of markup a span represents.
///
/// Declaration order is the tie-break order when two spans start at the
/// same offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    /// `$$ … $$`, may cross lines
    MathBlock,
    /// `$ … $`
    MathInline,
    /// `**text**`
    Bold,
    /// `*text*`
    Italic,
    /// `~~text~~`
    Strikethrough,
    /// `` `text` ``
    InlineCode,
    /// `[[page]]` or `[[page|alias]]`
    WikiLink,
    /// `[text](url)`
    Link,
    /// `# text` through `###### text`
    Heading,
}

impl SpanKind {
    pub const ALL: [SpanKind; 9] = [
        SpanKind::MathBlock,
        SpanKind::MathInline,
        SpanKind::Bold,
        SpanKind::Italic,
        SpanKind::Strikethrough,
        SpanKind::InlineCode,
        SpanKind::WikiLink,
        SpanKind::Link,
        SpanKind::Heading,
    ];

    /// Math spans collapse into rendered widgets; everything else only gets styled.
    pub fn is_math(self) -> bool {
        matches!(self, SpanKind::MathBlock | SpanKind::MathInline)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpanKind::MathBlock => "math-block",
            SpanKind::MathInline => "math-inline",
            SpanKind::Bold => "bold",
            SpanKind::Italic => "italic",
            SpanKind::Strikethrough => "strikethrough",
            SpanKind::InlineCode => "inline-code",
            SpanKind::WikiLink => "wiki-link",
            SpanKind::Link => "link",
            SpanKind::Heading => "heading",
        }
    }
}

impl std::fmt::Display for SpanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One markup span found by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxSpan {
    pub kind: SpanKind,
    /// Full span including delimiters, `[start, end)`.
    pub range: Range<usize>,
    /// The captured content between the delimiters.
    pub inner: Range<usize>,
    /// Text of `inner`.
    pub inner_text: SmolStr,
    /// Text of `range`.
    pub source_text: SmolStr,
}

impl SyntaxSpan {
    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn is_math(&self) -> bool {
        self.kind.is_math()
    }

    /// Check if the selection is within the visibility range for this span.
    ///
    /// Both boundaries count, so a caret right after the closing delimiter
    /// still shows the source being typed.
    pub fn touched_by(&self, selection: &Selection) -> bool {
        selection.touches(&self.range)
    }

    /// Number of leading `#` for headings.
    pub fn heading_level(&self) -> Option<u8> {
        if self.kind != SpanKind::Heading {
            return None;
        }
        let hashes = self.source_text.chars().take_while(|&c| c == '#').count();
        u8::try_from(hashes).ok()
    }

    /// Destination of a `[text](url)` link.
    pub fn link_url(&self) -> Option<&str> {
        if self.kind != SpanKind::Link {
            return None;
        }
        let (_, rest) = self.source_text.rsplit_once("](")?;
        rest.strip_suffix(')')
    }

    /// Page a wiki-link points to (text before `|`).
    pub fn wiki_target(&self) -> Option<&str> {
        if self.kind != SpanKind::WikiLink {
            return None;
        }
        let target = match self.inner_text.split_once('|') {
            Some((target, _)) => target,
            None => self.inner_text.as_str(),
        };
        Some(target.trim())
    }

    /// Display alias of a wiki-link (text after `|`), if any.
    pub fn wiki_alias(&self) -> Option<&str> {
        if self.kind != SpanKind::WikiLink {
            return None;
        }
        self.inner_text
            .split_once('|')
            .map(|(_, alias)| alias.trim())
    }
}

/// Byte to char offset conversion for one text snapshot.
struct CharIndex {
    /// Byte offset of every char, or None when the text is ASCII.
    starts: Option<Vec<usize>>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self { starts: None };
        }
        Self {
            starts: Some(text.char_indices().map(|(b, _)| b).collect()),
        }
    }

    fn char_offset(&self, byte: usize) -> usize {
        match &self.starts {
            None => byte,
            Some(starts) => starts.partition_point(|&b| b < byte),
        }
    }

    fn char_range(&self, bytes: Range<usize>) -> Range<usize> {
        self.char_offset(bytes.start)..self.char_offset(bytes.end)
    }
}

/// Byte ranges of one match: the whole span and its captured content.
struct RawMatch {
    full: Range<usize>,
    inner: Range<usize>,
}

/// Scan `text` for every markup span, sorted by start offset.
///
/// Deterministic: the same text always yields the same spans.
pub fn scan(text: &str) -> Vec<SyntaxSpan> {
    let index = CharIndex::new(text);
    let mut spans = Vec::new();

    for kind in SpanKind::ALL {
        let matches = match kind {
            SpanKind::MathBlock => find_all(&MATH_BLOCK_RE, text, 1, |_, _| true),
            SpanKind::MathInline => scan_inline_math(text),
            SpanKind::Bold => find_all(&BOLD_RE, text, 1, |_, _| true),
            SpanKind::Italic => find_all(&ITALIC_RE, text, 1, |t, full| {
                !star_before(t, full.start) && !star_after(t, full.end)
            }),
            SpanKind::Strikethrough => find_all(&STRIKE_RE, text, 1, |_, _| true),
            SpanKind::InlineCode => find_all(&CODE_RE, text, 1, |_, _| true),
            SpanKind::WikiLink => find_all(&WIKILINK_RE, text, 1, |_, _| true),
            SpanKind::Link => find_all(&LINK_RE, text, 1, |_, _| true),
            SpanKind::Heading => find_all(&HEADING_RE, text, 2, |_, _| true),
        };

        spans.extend(matches.into_iter().map(|m| SyntaxSpan {
            kind,
            range: index.char_range(m.full.clone()),
            inner: index.char_range(m.inner.clone()),
            inner_text: SmolStr::new(&text[m.inner]),
            source_text: SmolStr::new(&text[m.full]),
        }));
    }

    spans.sort_by(|a, b| {
        (a.range.start, a.kind, a.range.end).cmp(&(b.range.start, b.kind, b.range.end))
    });

    tracing::trace!(target: "quire::scan", spans = spans.len(), "scanned document");
    spans
}

/// Collect non-overlapping matches of `re`, keeping only those `accept` allows.
///
/// A rejected candidate does not consume its text: the search resumes one
/// char after the candidate's first char, so a later delimiter can still
/// open a match.
fn find_all<F>(re: &Regex, text: &str, group: usize, accept: F) -> Vec<RawMatch>
where
    F: Fn(&str, &Range<usize>) -> bool,
{
    let mut out = Vec::new();
    let mut pos = 0;

    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let Some(raw) = raw_match(&caps, group) else {
            break;
        };

        if accept(text, &raw.full) {
            pos = raw.full.end;
            out.push(raw);
        } else {
            pos = next_char_boundary(text, raw.full.start);
        }
    }

    out
}

fn raw_match(caps: &Captures<'_>, group: usize) -> Option<RawMatch> {
    let full = caps.get(0)?;
    let inner = caps.get(group)?;
    Some(RawMatch {
        full: full.range(),
        inner: inner.range(),
    })
}

fn next_char_boundary(text: &str, byte: usize) -> usize {
    text[byte..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| byte + c.len_utf8())
}

/// Inline math, excluding anything that sits inside a `$$` block.
///
/// A candidate is inside a block when an odd number of `$$` pairs appear
/// before it.
fn scan_inline_math(text: &str) -> Vec<RawMatch> {
    let fences: Vec<usize> = text.match_indices("$$").map(|(i, _)| i).collect();

    find_all(&MATH_INLINE_RE, text, 1, |t, full| {
        if dollar_before(t, full.start) || dollar_after(t, full.end) {
            return false;
        }
        let fences_before = fences.partition_point(|&i| i < full.start);
        fences_before % 2 == 0
    })
}

fn byte_before(text: &str, byte: usize) -> Option<u8> {
    byte.checked_sub(1).and_then(|i| text.as_bytes().get(i).copied())
}

fn byte_at(text: &str, byte: usize) -> Option<u8> {
    text.as_bytes().get(byte).copied()
}

fn star_before(text: &str, byte: usize) -> bool {
    byte_before(text, byte) == Some(b'*')
}

fn star_after(text: &str, byte: usize) -> bool {
    byte_at(text, byte) == Some(b'*')
}

fn dollar_before(text: &str, byte: usize) -> bool {
    byte_before(text, byte) == Some(b'$')
}

fn dollar_after(text: &str, byte: usize) -> bool {
    byte_at(text, byte) == Some(b'$')
}

//! quire-editor-core: live-preview markdown editing without framework dependencies.
//!
//! This crate provides:
//! - `TextBuffer` trait for text storage abstraction
//! - `EditorRope` - ropey-backed implementation
//! - `EditorDocument` trait and `PlainEditor` for the host edit surface
//! - Span scanning, visibility, and decoration compilation
//! - Rendered math widgets and the click bridge back into the source
//! - Toggle-format commands, all generic over TextBuffer
//!
//! The per-keystroke entry point is [`LivePreview::update`].

pub mod actions;
pub mod config;
pub mod decorations;
pub mod document;
pub mod error;
pub mod execute;
pub mod preview;
pub mod syntax;
pub mod text;
pub mod text_helpers;
pub mod types;
pub mod visibility;
pub mod widget;

pub use actions::{
    Change, FormatAction, FormatCommand, ToggleCommand, Transaction, plan_format,
    plan_line_prefix, plan_toggle,
};
pub use config::{ClassNames, PreviewConfig};
pub use decorations::{Decoration, DecorationSet, compile};
pub use document::{EditorDocument, PlainEditor};
pub use error::{ConfigError, DecorationError};
pub use execute::{execute_format, execute_toggle};
pub use preview::LivePreview;
pub use quire_renderer::{FnRenderer, LatexRenderer, MathRenderer};
pub use smol_str::SmolStr;
pub use syntax::{SpanKind, SyntaxSpan, scan};
pub use text::{EditorRope, TextBuffer};
pub use types::Selection;
pub use visibility::{ClassifiedSpan, Visibility, classify};
pub use widget::{ClickResponse, MathWidget};

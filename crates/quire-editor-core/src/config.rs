//! Preview configuration: style class names and render options.

use serde::{Deserialize, Serialize};
use smol_str::{SmolStr, format_smolstr};

use crate::error::ConfigError;
use crate::syntax::SpanKind;

/// CSS class names the preview attaches to marks and widgets.
///
/// The host's stylesheet decides what each class looks like. The only class
/// with a required effect is `math_hidden`, which must render its text with
/// zero size while leaving it in the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassNames {
    /// Math source while the selection is inside it.
    pub math_editing: SmolStr,
    /// Math source while collapsed behind a widget.
    pub math_hidden: SmolStr,
    /// Wrapper for inline math widgets.
    pub math_widget_inline: SmolStr,
    /// Wrapper for block math widgets (centered).
    pub math_widget_block: SmolStr,
    pub bold: SmolStr,
    pub italic: SmolStr,
    pub strikethrough: SmolStr,
    pub inline_code: SmolStr,
    pub wiki_link: SmolStr,
    pub link: SmolStr,
    /// Base heading class; marks also get `{heading}-{level}`.
    pub heading: SmolStr,
}

impl ClassNames {
    /// Class names of the form `{prefix}-{kind}`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            math_editing: format_smolstr!("{prefix}-math-editing"),
            math_hidden: format_smolstr!("{prefix}-math-hidden"),
            math_widget_inline: format_smolstr!("{prefix}-math-inline"),
            math_widget_block: format_smolstr!("{prefix}-math-block"),
            bold: format_smolstr!("{prefix}-bold"),
            italic: format_smolstr!("{prefix}-italic"),
            strikethrough: format_smolstr!("{prefix}-strikethrough"),
            inline_code: format_smolstr!("{prefix}-inline-code"),
            wiki_link: format_smolstr!("{prefix}-wiki-link"),
            link: format_smolstr!("{prefix}-link"),
            heading: format_smolstr!("{prefix}-heading"),
        }
    }

    /// Mark class for a non-math span kind.
    ///
    /// Math kinds have two classes depending on visibility, so they return
    /// the editing class here.
    pub fn for_kind(&self, kind: SpanKind) -> &SmolStr {
        match kind {
            SpanKind::MathBlock | SpanKind::MathInline => &self.math_editing,
            SpanKind::Bold => &self.bold,
            SpanKind::Italic => &self.italic,
            SpanKind::Strikethrough => &self.strikethrough,
            SpanKind::InlineCode => &self.inline_code,
            SpanKind::WikiLink => &self.wiki_link,
            SpanKind::Link => &self.link,
            SpanKind::Heading => &self.heading,
        }
    }

    /// `"{heading} {heading}-{level}"`, composed so both rules apply.
    pub fn heading_class(&self, level: u8) -> SmolStr {
        format_smolstr!("{0} {0}-{1}", self.heading, level)
    }
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::with_prefix(PreviewConfig::DEFAULT_PREFIX)
    }
}

/// Configuration for [`LivePreview`](crate::LivePreview).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub classes: ClassNames,
    /// Render each distinct `(formula, display)` pair once per cycle.
    pub memoize_math: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            classes: ClassNames::default(),
            memoize_math: true,
        }
    }
}

impl PreviewConfig {
    /// Class prefix used when none is configured.
    pub const DEFAULT_PREFIX: &'static str = "md";

    /// Environment variable overriding the class prefix.
    pub const PREFIX_ENV: &'static str = "QUIRE_CLASS_PREFIX";

    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `QUIRE_CLASS_PREFIX`: Prefix for every class name (default: `md`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_prefix(std::env::var(Self::PREFIX_ENV).ok().as_deref())
    }

    /// Build a config whose class names all start with `prefix`.
    ///
    /// `None` or an empty string selects the default prefix.
    pub fn from_prefix(prefix: Option<&str>) -> Result<Self, ConfigError> {
        let prefix = match prefix.map(str::trim) {
            None | Some("") => Self::DEFAULT_PREFIX,
            Some(p) => p,
        };
        validate_prefix(prefix)?;
        Ok(Self {
            classes: ClassNames::with_prefix(prefix),
            ..Self::default()
        })
    }
}

fn validate_prefix(prefix: &str) -> Result<(), ConfigError> {
    let mut chars = prefix.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if starts_with_letter && rest_ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidClassPrefix {
            prefix: prefix.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classes() {
        let config = PreviewConfig::default();
        assert!(config.memoize_math);
        assert_eq!(config.classes.math_hidden, "md-math-hidden");
        assert_eq!(config.classes.for_kind(SpanKind::WikiLink), "md-wiki-link");
        assert_eq!(config.classes.heading_class(2), "md-heading md-heading-2");
    }

    #[test]
    fn test_from_prefix() {
        let config = PreviewConfig::from_prefix(Some("cm")).unwrap();
        assert_eq!(config.classes.bold, "cm-bold");
        assert_eq!(config.classes.math_widget_block, "cm-math-block");

        let config = PreviewConfig::from_prefix(Some("  ")).unwrap();
        assert_eq!(config.classes.bold, "md-bold");

        let config = PreviewConfig::from_prefix(None).unwrap();
        assert_eq!(config, PreviewConfig::default());
    }

    #[test]
    fn test_rejects_bad_prefix() {
        let err = PreviewConfig::from_prefix(Some("x\" onclick=\"")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidClassPrefix { .. }));
        assert!(PreviewConfig::from_prefix(Some("9lives")).is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: PreviewConfig =
            serde_json::from_str(r#"{"memoize_math": false, "classes": {"bold": "strong"}}"#)
                .unwrap();
        assert!(!config.memoize_math);
        assert_eq!(config.classes.bold, "strong");
        // Unlisted fields keep their defaults
        assert_eq!(config.classes.italic, "md-italic");
    }
}

//! Parsing strategies and the import entry points
//!
//! Two strategies share one output contract:
//! - [`StrictScanner`]: index scanning over uppercase exporter markup
//! - [`TolerantTree`]: tree walk over an html5ever DOM, for mangled or
//!   lowercase input
//!
//! [`StrategyPolicy`] decides which one runs. The default tries the strict
//! scanner and falls back to the tree walk when it finds nothing at all.

use serde::{Deserialize, Serialize};

use crate::error::InterchangeError;
use crate::model::ParsedImport;
use crate::resolver::FolderStyle;
use crate::strict::StrictScanner;
use crate::tolerant::TolerantTree;
use crate::Result;

/// Maximum folder nesting followed before a folder's contents are dropped.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Hard ceiling on `max_depth`. Both strategies recurse once per level, so a
/// configured value above this is clamped to keep the stack bounded.
pub const MAX_DEPTH_CEILING: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Strict,
    Tolerant,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Strict => "strict",
            StrategyKind::Tolerant => "tolerant",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyPolicy {
    Strict,
    Tolerant,
    /// Strict first, tolerant when strict yields no folders and no bookmarks
    #[default]
    #[serde(alias = "auto")]
    StrictThenTolerant,
}

impl std::str::FromStr for StrategyPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" => Ok(StrategyPolicy::Strict),
            "tolerant" => Ok(StrategyPolicy::Tolerant),
            "auto" | "strict_then_tolerant" => Ok(StrategyPolicy::StrictThenTolerant),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub strategy: StrategyPolicy,
    pub max_depth: usize,
    pub folder_style: FolderStyle,
}

impl ImportOptions {
    /// `max_depth`, clamped to [`MAX_DEPTH_CEILING`].
    pub fn depth_limit(&self) -> usize {
        self.max_depth.min(MAX_DEPTH_CEILING)
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            folder_style: FolderStyle::default(),
        }
    }
}

/// One way of turning bookmark markup into folders and bookmarks. Must never
/// panic and must terminate on any input.
pub trait ParseStrategy {
    fn kind(&self) -> StrategyKind;

    fn parse(&self, html: &str, options: &ImportOptions) -> ParsedImport;
}

impl StrategyPolicy {
    pub fn run(self, html: &str, options: &ImportOptions) -> ParsedImport {
        match self {
            StrategyPolicy::Strict => StrictScanner.parse(html, options),
            StrategyPolicy::Tolerant => TolerantTree.parse(html, options),
            StrategyPolicy::StrictThenTolerant => {
                let strict = StrictScanner.parse(html, options);
                if !strict.is_empty() {
                    return strict;
                }
                tracing::debug!("Strict scan found nothing, retrying with tolerant tree walk");
                TolerantTree.parse(html, options)
            }
        }
    }
}

/// Parse a bookmark file. Malformed markup yields partial or empty output.
pub fn import_html(html: &str, options: &ImportOptions) -> ParsedImport {
    let parsed = options.strategy.run(html, options);
    tracing::info!(
        folders = parsed.folders.len(),
        bookmarks = parsed.bookmarks.len(),
        strategy = %parsed.strategy,
        "Parsed bookmark file"
    );
    parsed
}

/// Parse raw file bytes. Fails only when the bytes are not UTF-8 text.
pub fn import_bytes(bytes: &[u8], options: &ImportOptions) -> Result<ParsedImport> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let html = std::str::from_utf8(bytes).map_err(InterchangeError::NotText)?;
    Ok(import_html(html, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_to_tolerant_on_lowercase_input() {
        let html = r#"<dl><p><dt><a href="https://a.com">A</a></dl>"#;
        let parsed = import_html(html, &ImportOptions::default());
        assert_eq!(parsed.strategy, StrategyKind::Tolerant);
        assert_eq!(parsed.bookmarks.len(), 1);
    }

    #[test]
    fn test_strict_result_is_kept_when_non_empty() {
        let html = r#"<DL><p><DT><A HREF="https://a.com">A</A></DL><p>"#;
        let parsed = import_html(html, &ImportOptions::default());
        assert_eq!(parsed.strategy, StrategyKind::Strict);
    }

    #[test]
    fn test_forced_strict_ignores_lowercase() {
        let options = ImportOptions {
            strategy: StrategyPolicy::Strict,
            ..ImportOptions::default()
        };
        let parsed = import_html(r#"<dt><a href="https://a.com">A</a>"#, &options);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_import_bytes_rejects_non_text() {
        let err = import_bytes(&[0xff, 0xfe, 0x00], &ImportOptions::default()).unwrap_err();
        assert!(matches!(err, InterchangeError::NotText(_)));
    }

    #[test]
    fn test_import_bytes_strips_bom() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(br#"<DT><A HREF="https://a.com">A</A>"#);
        let parsed = import_bytes(&bytes, &ImportOptions::default()).unwrap();
        assert_eq!(parsed.bookmarks.len(), 1);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("auto".parse::<StrategyPolicy>(), Ok(StrategyPolicy::StrictThenTolerant));
        assert_eq!("Tolerant".parse::<StrategyPolicy>(), Ok(StrategyPolicy::Tolerant));
        assert!("dom".parse::<StrategyPolicy>().is_err());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ImportOptions = serde_json::from_str(r#"{"strategy":"auto"}"#).unwrap();
        assert_eq!(options.strategy, StrategyPolicy::StrictThenTolerant);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(options.folder_style, FolderStyle::default());
    }

    #[test]
    fn test_depth_limit_is_clamped() {
        let mut options = ImportOptions::default();
        assert_eq!(options.depth_limit(), DEFAULT_MAX_DEPTH);

        options.max_depth = usize::MAX;
        assert_eq!(options.depth_limit(), MAX_DEPTH_CEILING);
    }
}

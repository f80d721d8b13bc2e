//! AnchorMarks Bookmark Interchange
//!
//! Reads and writes the Netscape Bookmark File format that every browser
//! exports. The format has no grammar; exporters nest folder bodies in
//! different places and leave tags unclosed. Parsing is therefore total:
//! malformed input gives partial or empty output, never an error.
//!
//! - Import: [`import_html`] / [`import_bytes`] → [`ParsedImport`]
//! - Export: [`export_html`]

mod error;
mod export;
mod extract;
mod model;
mod resolver;
mod scanner;
mod strategy;
mod strict;
mod tags;
mod tolerant;

pub use error::InterchangeError;
pub use export::{export_html, EmptyFolderPolicy, ExportLayout, ExportOptions};
pub use extract::{attr_value, bookmark_from_parts, extract_anchor, is_skipped_url, SKIPPED_SCHEMES};
pub use model::{FolderId, ParsedBookmark, ParsedFolder, ParsedImport};
pub use resolver::{FolderResolver, FolderStyle, ImportBuilder};
pub use scanner::{find_matching_close, find_open_tag, Cursor, DlIndex};
pub use strategy::{
    import_bytes, import_html, ImportOptions, ParseStrategy, StrategyKind, StrategyPolicy,
    DEFAULT_MAX_DEPTH, MAX_DEPTH_CEILING,
};
pub use strict::StrictScanner;
pub use tags::{normalize_tags, TagSet};
pub use tolerant::{DlSearchOrder, DlSearchRule, TolerantTree};

pub type Result<T> = std::result::Result<T, InterchangeError>;

//! Folder resolution and per-run import state

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::{FolderId, ParsedBookmark, ParsedFolder, ParsedImport};
use crate::strategy::StrategyKind;

/// Presentation defaults stamped on every folder an import creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderStyle {
    pub color: String,
    pub icon: String,
}

impl Default for FolderStyle {
    fn default() -> Self {
        Self {
            color: "#6366f1".to_string(),
            icon: "folder".to_string(),
        }
    }
}

/// Create-or-get mapping from `(name, parent)` to a folder id, local to one
/// import run.
#[derive(Debug, Default)]
pub struct FolderResolver {
    index: HashMap<(String, Option<FolderId>), FolderId>,
    folders: Vec<ParsedFolder>,
    style: FolderStyle,
}

impl FolderResolver {
    pub fn new(style: FolderStyle) -> Self {
        Self {
            index: HashMap::new(),
            folders: Vec::new(),
            style,
        }
    }

    /// Return the folder named `name` under `parent`, creating it on first use.
    pub fn resolve(&mut self, name: &str, parent: Option<FolderId>) -> FolderId {
        let name = name.trim();
        let key = (name.to_string(), parent);
        if let Some(id) = self.index.get(&key) {
            return *id;
        }

        let id = FolderId(self.folders.len() as u64 + 1);
        self.folders.push(ParsedFolder {
            id,
            name: key.0.clone(),
            parent_id: parent,
            color: self.style.color.clone(),
            icon: self.style.icon.clone(),
        });
        self.index.insert(key, id);
        id
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    pub fn into_folders(self) -> Vec<ParsedFolder> {
        self.folders
    }
}

/// State threaded through one parse: the resolver plus bookmarks so far.
#[derive(Debug)]
pub struct ImportBuilder {
    resolver: FolderResolver,
    bookmarks: Vec<ParsedBookmark>,
}

impl ImportBuilder {
    pub fn new(style: FolderStyle) -> Self {
        Self {
            resolver: FolderResolver::new(style),
            bookmarks: Vec::new(),
        }
    }

    pub fn folder(&mut self, name: &str, parent: Option<FolderId>) -> FolderId {
        self.resolver.resolve(name, parent)
    }

    pub fn push(&mut self, bookmark: Option<ParsedBookmark>) {
        if let Some(bookmark) = bookmark {
            self.bookmarks.push(bookmark);
        }
    }

    pub fn finish(self, strategy: StrategyKind) -> ParsedImport {
        ParsedImport {
            folders: self.resolver.into_folders(),
            bookmarks: self.bookmarks,
            strategy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_is_idempotent() {
        let mut resolver = FolderResolver::default();
        let work = resolver.resolve("Work", None);
        assert_eq!(resolver.resolve("Work", None), work);
        assert_eq!(resolver.resolve("  Work ", None), work);
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_same_name_under_different_parents() {
        let mut resolver = FolderResolver::new(FolderStyle::default());
        let archive = resolver.resolve("Archive", None);
        let top_work = resolver.resolve("Work", None);
        let archived_work = resolver.resolve("Work", Some(archive));
        assert_ne!(top_work, archived_work);

        let folders = resolver.into_folders();
        assert_eq!(folders.len(), 3);
        assert_eq!(folders[2].parent_id, Some(archive));
        assert_eq!(folders[2].color, "#6366f1");
        assert_eq!(folders[2].icon, "folder");
    }

    #[test]
    fn test_ids_count_up_from_one() {
        let mut resolver = FolderResolver::default();
        assert_eq!(resolver.resolve("a", None), FolderId(1));
        assert_eq!(resolver.resolve("b", None), FolderId(2));
    }
}

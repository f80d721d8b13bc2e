//! Parse result types

use serde::{Deserialize, Serialize};

use crate::strategy::StrategyKind;

/// Folder identity. Run-local ids count up from 1 in discovery order; the
/// storage layer reuses the type for durable ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(pub u64);

impl std::fmt::Display for FolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFolder {
    pub id: FolderId,
    pub name: String,
    pub parent_id: Option<FolderId>,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedBookmark {
    pub title: String,
    pub url: String,
    pub folder_id: Option<FolderId>,
    /// Canonical tag string (`"a, b"`), `None` when the anchor had no tags
    pub tags: Option<String>,
    #[serde(default)]
    pub color_hint: Option<String>,
}

/// Everything one import run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedImport {
    pub folders: Vec<ParsedFolder>,
    pub bookmarks: Vec<ParsedBookmark>,
    pub strategy: StrategyKind,
}

impl ParsedImport {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.bookmarks.is_empty()
    }

    pub fn folder(&self, id: FolderId) -> Option<&ParsedFolder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// Folder names from the root down to `id`, inclusive.
    pub fn folder_path(&self, id: FolderId) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self.folder(id);
        while let Some(folder) = current {
            path.push(folder.name.as_str());
            // Hand-built values may carry a parent cycle.
            if path.len() > self.folders.len() {
                break;
            }
            current = folder.parent_id.and_then(|p| self.folder(p));
        }
        path.reverse();
        path
    }

    pub fn bookmarks_in(&self, folder: Option<FolderId>) -> impl Iterator<Item = &ParsedBookmark> {
        self.bookmarks.iter().filter(move |b| b.folder_id == folder)
    }

    pub fn find_folder_by_path(&self, path: &[&str]) -> Option<&ParsedFolder> {
        let mut parent = None;
        let mut found = None;
        for name in path {
            let folder = self
                .folders
                .iter()
                .find(|f| f.parent_id == parent && f.name == *name)?;
            parent = Some(folder.id);
            found = Some(folder);
        }
        found
    }
}

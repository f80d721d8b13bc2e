//! Netscape bookmark file export

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::model::{FolderId, ParsedBookmark, ParsedFolder};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportLayout {
    /// Every bookmark under the single root list
    #[default]
    Flat,
    /// `<H3>` headings and nested lists following `parent_id`
    Nested,
}

/// Which folders a nested export writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyFolderPolicy {
    #[default]
    Keep,
    /// Drop folders with no bookmark anywhere below them
    SkipEmpty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub title: String,
    pub layout: ExportLayout,
    pub empty_folders: EmptyFolderPolicy,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            title: "AnchorMarks".to_string(),
            layout: ExportLayout::Flat,
            empty_folders: EmptyFolderPolicy::Keep,
        }
    }
}

const INDENT: usize = 4;

pub fn export_html(
    bookmarks: &[ParsedBookmark],
    folders: &[ParsedFolder],
    options: &ExportOptions,
) -> String {
    let title = escape_text(&options.title);

    let mut out = String::new();
    out.push_str("<!DOCTYPE NETSCAPE-Bookmark-file-1>\n");
    out.push_str("<META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n");
    out.push_str(&format!("<TITLE>{title}</TITLE>\n"));
    out.push_str(&format!("<H1>{title}</H1>\n"));
    out.push_str("<DL><p>\n");

    match options.layout {
        ExportLayout::Flat => {
            for bookmark in bookmarks {
                write_bookmark(&mut out, bookmark, INDENT);
            }
        }
        ExportLayout::Nested => {
            let tree = FolderTree::new(bookmarks, folders);
            let mut written = HashSet::new();
            tree.render(None, &mut out, INDENT, options.empty_folders, &mut written);
        }
    }

    out.push_str("</DL><p>\n");
    out
}

fn pad(out: &mut String, n: usize) {
    for _ in 0..n {
        out.push(' ');
    }
}

fn write_bookmark(out: &mut String, bookmark: &ParsedBookmark, indent: usize) {
    pad(out, indent);
    out.push_str("<DT><A HREF=\"");
    out.push_str(&escape_attr(&bookmark.url));
    out.push('"');
    if let Some(tags) = bookmark.tags.as_deref().filter(|t| !t.trim().is_empty()) {
        out.push_str(" TAGS=\"");
        out.push_str(&escape_attr(tags));
        out.push('"');
    }
    out.push('>');
    out.push_str(&escape_text(&bookmark.title));
    out.push_str("</A>\n");
}

/// Only the quote is rewritten, so imported values come back unchanged.
fn escape_attr(s: &str) -> String {
    s.replace('"', "&quot;")
}

fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Folder hierarchy indexed by parent. Folders or bookmarks pointing at an
/// unknown folder are attached to the root.
struct FolderTree<'a> {
    children: HashMap<Option<FolderId>, Vec<&'a ParsedFolder>>,
    bookmarks: HashMap<Option<FolderId>, Vec<&'a ParsedBookmark>>,
}

impl<'a> FolderTree<'a> {
    fn new(bookmarks: &'a [ParsedBookmark], folders: &'a [ParsedFolder]) -> Self {
        let known: HashSet<FolderId> = folders.iter().map(|f| f.id).collect();
        let attach = |id: Option<FolderId>| id.filter(|id| known.contains(id));

        let mut children: HashMap<_, Vec<_>> = HashMap::new();
        for folder in folders {
            let parent = attach(folder.parent_id).filter(|p| *p != folder.id);
            children.entry(parent).or_default().push(folder);
        }

        let mut by_folder: HashMap<_, Vec<_>> = HashMap::new();
        for bookmark in bookmarks {
            by_folder.entry(attach(bookmark.folder_id)).or_default().push(bookmark);
        }

        Self {
            children,
            bookmarks: by_folder,
        }
    }

    fn subfolders(&self, parent: Option<FolderId>) -> &[&'a ParsedFolder] {
        self.children.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    fn bookmarks_in(&self, parent: Option<FolderId>) -> &[&'a ParsedBookmark] {
        self.bookmarks.get(&parent).map(Vec::as_slice).unwrap_or(&[])
    }

    fn holds_bookmarks(&self, id: FolderId, seen: &mut HashSet<FolderId>) -> bool {
        if !seen.insert(id) {
            return false;
        }
        !self.bookmarks_in(Some(id)).is_empty()
            || self
                .subfolders(Some(id))
                .iter()
                .any(|child| self.holds_bookmarks(child.id, seen))
    }

    fn render(
        &self,
        parent: Option<FolderId>,
        out: &mut String,
        indent: usize,
        policy: EmptyFolderPolicy,
        written: &mut HashSet<FolderId>,
    ) {
        for folder in self.subfolders(parent) {
            if policy == EmptyFolderPolicy::SkipEmpty
                && !self.holds_bookmarks(folder.id, &mut HashSet::new())
            {
                continue;
            }
            // Parent cycles in hand-built input
            if !written.insert(folder.id) {
                continue;
            }

            pad(out, indent);
            out.push_str("<DT><H3>");
            out.push_str(&escape_text(&folder.name));
            out.push_str("</H3>\n");

            pad(out, indent);
            out.push_str("<DL><p>\n");
            self.render(Some(folder.id), out, indent + INDENT, policy, written);
            pad(out, indent);
            out.push_str("</DL><p>\n");
        }

        for bookmark in self.bookmarks_in(parent) {
            write_bookmark(out, bookmark, indent);
        }
    }
}

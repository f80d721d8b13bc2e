//! Recursive descent over exporter markup
//!
//! Walks a block item by item. Each `<DT>` either opens a folder (`<H3>`,
//! whose `<DL>` body is located by depth matching and parsed recursively) or
//! holds a bookmark (`<A>`). Any other item is stepped over. Every branch
//! moves the cursor forward, so the walk ends on any input.

use crate::extract::extract_anchor;
use crate::model::{FolderId, ParsedImport};
use crate::resolver::ImportBuilder;
use crate::scanner::{find_open_tag, Cursor, DlIndex};
use crate::strategy::{ImportOptions, ParseStrategy, StrategyKind};

/// The primary strategy: index scanning, no DOM.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictScanner;

impl ParseStrategy for StrictScanner {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Strict
    }

    fn parse(&self, html: &str, options: &ImportOptions) -> ParsedImport {
        let mut walker = BlockWalker {
            builder: ImportBuilder::new(options.folder_style.clone()),
            lists: DlIndex::build(html),
            max_depth: options.depth_limit(),
        };
        walker.block(Cursor::new(html), None, 0);
        walker.builder.finish(self.kind())
    }
}

struct BlockWalker {
    builder: ImportBuilder,
    lists: DlIndex,
    max_depth: usize,
}

impl BlockWalker {
    fn block(&mut self, mut cursor: Cursor<'_>, parent: Option<FolderId>, depth: usize) {
        while let Some(dt) = cursor.find("<DT>") {
            cursor.advance_to(dt + "<DT>".len());

            let rest = cursor.rest();
            let lead = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_whitespace()).len();
            let tag_start = cursor.pos() + lead;

            let next = if cursor.opens_at(tag_start, "H3") {
                self.folder(cursor, tag_start, parent, depth)
            } else if cursor.opens_at(tag_start, "A") {
                self.anchor(cursor, tag_start, parent)
            } else {
                continue;
            };

            match next {
                Some(pos) => cursor.advance_to(pos),
                // Unclosed heading or anchor: nothing reliable is left in this block
                None => return,
            }
        }
    }

    /// Handle `<H3>name</H3>` plus its optional `<DL>` body. Returns the
    /// position to resume scanning from.
    fn folder(
        &mut self,
        cursor: Cursor<'_>,
        tag_start: usize,
        parent: Option<FolderId>,
        depth: usize,
    ) -> Option<usize> {
        let text = cursor.text();
        let name_start = cursor.tag_end(tag_start)?;
        let name_end = cursor.sub(name_start, cursor.end()).find("</H3>")?;
        let after_heading = name_end + "</H3>".len();

        let name = text.get(name_start..name_end).unwrap_or("");
        let folder = self.builder.folder(name, parent);

        // The body must open before the next item, otherwise a later
        // sibling's list would be claimed by an empty folder.
        let item_limit = cursor
            .sub(after_heading, cursor.end())
            .find("<DT>")
            .unwrap_or(cursor.end());
        let Some(open) = find_open_tag(text, "DL", after_heading, item_limit) else {
            return Some(after_heading);
        };

        let body_start = cursor.tag_end(open).unwrap_or(cursor.end());
        let close = self.lists.matching_close(open, cursor.end());
        let body_end = close.unwrap_or(cursor.end());

        if depth < self.max_depth {
            self.block(cursor.sub(body_start, body_end), Some(folder), depth + 1);
        } else {
            tracing::debug!(folder = %name.trim(), depth, "Folder nesting limit reached, skipping contents");
        }

        Some(close.map_or(cursor.end(), |c| c + "</DL>".len()))
    }

    /// Handle `<A ...>title</A>`.
    fn anchor(&mut self, cursor: Cursor<'_>, tag_start: usize, parent: Option<FolderId>) -> Option<usize> {
        let text = cursor.text();
        let open_end = cursor.tag_end(tag_start)?;
        let close = cursor.sub(open_end, cursor.end()).find("</A>")?;

        let attrs = text.get(tag_start + "<A".len()..open_end - 1).unwrap_or("");
        let inner = text.get(open_end..close).unwrap_or("");
        self.builder.push(extract_anchor(attrs, inner, parent));

        Some(close + "</A>".len())
    }
}

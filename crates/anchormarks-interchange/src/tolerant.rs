//! Tree walk over a tolerant html5ever DOM
//!
//! Used for input the strict scanner cannot read: lowercase tags, unclosed
//! items, browser specific nesting. html5ever decides where elements end up,
//! so a folder's content list is searched for around its heading using
//! [`DlSearchOrder`].

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use crate::extract::bookmark_from_parts;
use crate::model::{FolderId, ParsedImport};
use crate::resolver::ImportBuilder;
use crate::strategy::{ImportOptions, ParseStrategy, StrategyKind};

/// One placement rule for a folder's content `<dl>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlSearchRule {
    /// `<dt><h3/><dl/></dt>`
    NextSiblingOfHeading,
    /// `<dt><h3/></dt><dd><dl/></dd>`
    DdAfterItem,
    /// `<dt><h3/>...<dl/></dt>`
    AnySiblingOfHeading,
    /// `<dt><h3/></dt><dl/>`
    NextSiblingOfItem,
}

impl DlSearchRule {
    fn apply<'a>(self, heading: ElementRef<'a>, item: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            DlSearchRule::NextSiblingOfHeading => next_element(heading).filter(|e| is_named(e, "dl")),
            DlSearchRule::DdAfterItem => next_element(item)
                .filter(|e| is_named(e, "dd"))
                .and_then(|dd| child_elements(dd).find(|e| is_named(e, "dl"))),
            DlSearchRule::AnySiblingOfHeading => heading
                .parent()
                .into_iter()
                .flat_map(|parent| parent.children())
                .filter(|node| node.id() != heading.id())
                .filter_map(ElementRef::wrap)
                .find(|e| is_named(e, "dl")),
            DlSearchRule::NextSiblingOfItem => next_element(item).filter(|e| is_named(e, "dl")),
        }
    }
}

/// Fixed precedence for locating a folder body. Exporters disagree on
/// placement and none of them is written down anywhere, so the order is
/// explicit and the first rule that matches wins.
pub struct DlSearchOrder;

impl DlSearchOrder {
    pub const RULES: [DlSearchRule; 4] = [
        DlSearchRule::NextSiblingOfHeading,
        DlSearchRule::DdAfterItem,
        DlSearchRule::AnySiblingOfHeading,
        DlSearchRule::NextSiblingOfItem,
    ];

    /// Find the content list for `heading` (an `h3`) inside `item` (its `dt`).
    pub fn locate<'a>(
        heading: ElementRef<'a>,
        item: ElementRef<'a>,
    ) -> Option<(DlSearchRule, ElementRef<'a>)> {
        Self::RULES
            .iter()
            .find_map(|rule| rule.apply(heading, item).map(|dl| (*rule, dl)))
    }
}

fn is_named(el: &ElementRef<'_>, name: &str) -> bool {
    el.value().name() == name
}

fn next_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

fn child_elements(el: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap)
}

fn first_child_named<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    child_elements(el).find(|e| is_named(e, name))
}

// html5ever decodes entities while tokenizing. Re-encode the characters
// exporters escape so both strategies hand the extractor the same text.
fn escape_text(decoded: &str) -> String {
    decoded
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(decoded: &str) -> String {
    decoded.replace('&', "&amp;").replace('"', "&quot;")
}

/// Fallback strategy: permissive DOM, heuristic body search.
#[derive(Debug, Clone, Copy, Default)]
pub struct TolerantTree;

impl ParseStrategy for TolerantTree {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Tolerant
    }

    fn parse(&self, html: &str, options: &ImportOptions) -> ParsedImport {
        let doc = Html::parse_document(html);
        let mut walker = TreeWalker {
            builder: ImportBuilder::new(options.folder_style.clone()),
            max_depth: options.depth_limit(),
            claimed: HashSet::new(),
        };

        let root = root_container(&doc);
        if is_named(&root, "dl") {
            walker.list(root, None, 0);
        } else {
            walker.container(root, None, 0);
        }

        walker.builder.finish(self.kind())
    }
}

/// The first `<dl>` in the document, or `<body>` for list-less fragments.
fn root_container(doc: &Html) -> ElementRef<'_> {
    for selector in ["dl", "body"] {
        let sel = match Selector::parse(selector) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if let Some(el) = doc.select(&sel).next() {
            return el;
        }
    }
    doc.root_element()
}

struct TreeWalker {
    builder: ImportBuilder,
    max_depth: usize,
    /// Lists already walked, so no list is read twice
    claimed: HashSet<NodeId>,
}

impl TreeWalker {
    fn list(&mut self, dl: ElementRef<'_>, parent: Option<FolderId>, depth: usize) {
        if self.claimed.insert(dl.id()) {
            self.container(dl, parent, depth);
        }
    }

    fn container(&mut self, container: ElementRef<'_>, parent: Option<FolderId>, depth: usize) {
        if depth > self.max_depth {
            tracing::debug!(depth, "Element nesting limit reached, skipping subtree");
            return;
        }

        for child in child_elements(container) {
            match child.value().name() {
                "dt" => self.item(child, parent, depth),
                // A list nobody claimed keeps the current parent
                "dl" => self.list(child, parent, depth + 1),
                // Wrappers such as <p> and <dd> are transparent
                _ => self.container(child, parent, depth + 1),
            }
        }
    }

    fn item(&mut self, dt: ElementRef<'_>, parent: Option<FolderId>, depth: usize) {
        if let Some(heading) = first_child_named(dt, "h3") {
            let name = escape_text(&heading.text().collect::<String>());
            let folder = self.builder.folder(&name, parent);

            let Some((rule, body)) = DlSearchOrder::locate(heading, dt) else {
                return;
            };
            if self.claimed.contains(&body.id()) {
                return;
            }
            tracing::trace!(folder = %name.trim(), ?rule, "Located folder body");

            if depth < self.max_depth {
                self.list(body, Some(folder), depth + 1);
            } else {
                tracing::debug!(folder = %name.trim(), depth, "Folder nesting limit reached, skipping contents");
            }
        } else if let Some(anchor) = first_child_named(dt, "a") {
            let title = escape_text(&anchor.text().collect::<String>());
            let el = anchor.value();
            let href = el.attr("href").map(escape_attr);
            let tags = el.attr("tags").map(escape_attr);
            self.builder.push(bookmark_from_parts(
                href.as_deref(),
                &title,
                tags.as_deref(),
                parent,
            ));
        } else {
            self.container(dt, parent, depth + 1);
        }
    }
}

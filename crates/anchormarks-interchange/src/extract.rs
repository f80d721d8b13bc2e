//! Bookmark extraction from a single anchor
//!
//! Both parsing strategies funnel anchors through [`bookmark_from_parts`], so
//! scheme filtering and tag normalization are defined once.

use crate::model::{FolderId, ParsedBookmark};
use crate::tags::normalize_tags;

/// URL prefixes that never become bookmarks (bookmarklets, Firefox queries).
pub const SKIPPED_SCHEMES: &[&str] = &["javascript:", "place:"];

pub fn is_skipped_url(url: &str) -> bool {
    SKIPPED_SCHEMES.iter().any(|scheme| url.starts_with(scheme))
}

/// Shared rule set: `None` when there is no `href` or its scheme is skipped.
pub fn bookmark_from_parts(
    href: Option<&str>,
    title: &str,
    tags: Option<&str>,
    folder: Option<FolderId>,
) -> Option<ParsedBookmark> {
    let url = href?;
    if is_skipped_url(url) {
        tracing::trace!(url, "Skipping non-navigable anchor");
        return None;
    }

    Some(ParsedBookmark {
        title: title.to_string(),
        url: url.to_string(),
        folder_id: folder,
        tags: normalize_tags(tags),
        color_hint: None,
    })
}

/// Extract from the raw attribute text of an `<A ...>` tag and its inner text.
pub fn extract_anchor(attrs: &str, inner: &str, folder: Option<FolderId>) -> Option<ParsedBookmark> {
    let href = attr_value(attrs, "href");
    let tags = attr_value(attrs, "tags");
    bookmark_from_parts(href, inner, tags, folder)
}

/// Case-insensitive lookup of `name=value` inside raw tag text. The value may
/// be double quoted, single quoted or bare. Entities are left as written.
///
/// Attributes are read in order, so text inside another attribute's quoted
/// value is never taken for a name.
pub fn attr_value<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let bytes = attrs.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        i = skip_ws(bytes, i);
        let name_start = i;
        while bytes
            .get(i)
            .is_some_and(|&b| !b.is_ascii_whitespace() && b != b'=' && b != b'>')
        {
            i += 1;
        }
        if i == name_start {
            // Stray `=` or `>`
            i += 1;
            continue;
        }
        let key = attrs.get(name_start..i)?;

        let after_key = skip_ws(bytes, i);
        if bytes.get(after_key) != Some(&b'=') {
            i = after_key;
            continue;
        }

        let (value, next) = read_value(attrs, skip_ws(bytes, after_key + 1));
        if key.eq_ignore_ascii_case(name) {
            return value;
        }
        i = next;
    }

    None
}

/// Value starting at `i`, and the index just past it.
fn read_value(attrs: &str, i: usize) -> (Option<&str>, usize) {
    let bytes = attrs.as_bytes();
    match bytes.get(i) {
        Some(&quote @ (b'"' | b'\'')) => {
            let value_start = i + 1;
            match attrs.get(value_start..).and_then(|rest| rest.find(quote as char)) {
                Some(j) => (attrs.get(value_start..value_start + j), value_start + j + 1),
                None => (attrs.get(value_start..), attrs.len()),
            }
        }
        Some(_) => {
            let value_end = attrs
                .get(i..)
                .and_then(|rest| rest.find(|c: char| c.is_ascii_whitespace() || c == '>'))
                .map_or(attrs.len(), |j| i + j);
            (attrs.get(i..value_end), value_end)
        }
        None => (None, attrs.len()),
    }
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(u8::is_ascii_whitespace) {
        i += 1;
    }
    i
}

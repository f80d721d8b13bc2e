//! Tag scanning over raw bookmark markup
//!
//! No DOM is built. A [`Cursor`] marks a half-open window `[pos, end)` of the
//! source text and every search stays inside it. Tag names are matched
//! case-sensitively against the uppercase form browsers export.

/// A position inside a bounded window of the source text.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            end: text.len(),
        }
    }

    /// A cursor over `[start, end)`, clamped to the text.
    pub fn bounded(text: &'a str, start: usize, end: usize) -> Self {
        let end = end.min(text.len());
        Self {
            text,
            pos: start.min(end),
            end,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_done(&self) -> bool {
        self.pos >= self.end
    }

    /// Move to `pos`. Never moves backwards and never past `end`.
    pub fn advance_to(&mut self, pos: usize) {
        self.pos = pos.clamp(self.pos, self.end);
    }

    /// The unread part of the window.
    pub fn rest(&self) -> &'a str {
        self.text.get(self.pos..self.end).unwrap_or("")
    }

    /// Same window, starting at `pos` and ending at `end`.
    pub fn sub(&self, pos: usize, end: usize) -> Cursor<'a> {
        Cursor::bounded(self.text, pos, end.min(self.end))
    }

    /// Next occurrence of `needle` starting inside the window.
    pub fn find(&self, needle: &str) -> Option<usize> {
        find_within(self.text, needle, self.pos, self.end)
    }

    /// Next opening tag `<NAME` followed by `>` or whitespace.
    pub fn find_open(&self, name: &str) -> Option<usize> {
        find_open_tag(self.text, name, self.pos, self.end)
    }

    /// Whether an opening `<NAME` tag starts exactly at `at`.
    pub fn opens_at(&self, at: usize, name: &str) -> bool {
        let Some(rest) = self.text.get(at..self.end) else {
            return false;
        };
        rest.strip_prefix('<')
            .and_then(|r| r.strip_prefix(name))
            .is_some_and(|r| is_tag_boundary(r.as_bytes().first()))
    }

    /// Index just past the `>` closing the tag that starts at `tag_start`.
    pub fn tag_end(&self, tag_start: usize) -> Option<usize> {
        find_within(self.text, ">", tag_start, self.end).map(|i| i + 1)
    }
}

fn find_within(text: &str, needle: &str, from: usize, end: usize) -> Option<usize> {
    let from = ceil_char_boundary(text, from);
    let end = floor_char_boundary(text, end);
    if from >= end {
        return None;
    }
    text.get(from..end)?.find(needle).map(|i| from + i)
}

// Needles are ASCII, so a match never straddles a character boundary.
fn floor_char_boundary(text: &str, mut i: usize) -> usize {
    i = i.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(text: &str, mut i: usize) -> usize {
    while i < text.len() && !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

fn is_tag_boundary(byte: Option<&u8>) -> bool {
    matches!(byte, Some(b'>') | Some(b' ' | b'\t' | b'\n' | b'\r' | b'\x0c'))
}

/// Find `<NAME` where the following byte is `>` or whitespace.
pub fn find_open_tag(text: &str, name: &str, from: usize, end: usize) -> Option<usize> {
    let needle = format!("<{name}");
    let mut from = from;
    while let Some(idx) = find_within(text, &needle, from, end) {
        if is_tag_boundary(text.as_bytes().get(idx + needle.len())) {
            return Some(idx);
        }
        from = idx + needle.len();
    }
    None
}

/// Given the index just after an opening `<DL>` tag, return the index of its
/// matching `</DL>`, skipping nested lists. `None` means the list is never
/// closed before `end`.
pub fn find_matching_close(text: &str, after_open: usize, end: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut next_open = find_open_tag(text, "DL", after_open, end);
    let mut next_close = find_within(text, "</DL>", after_open, end)?;

    loop {
        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                next_open = find_open_tag(text, "DL", open + "<DL".len(), end);
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_close);
                }
                next_close = find_within(text, "</DL>", next_close + "</DL>".len(), end)?;
            }
        }
    }
}

/// Every `<DL` / `</DL>` pair of a document, matched in one pass.
///
/// Answers the same question as [`find_matching_close`] for any window, but
/// without rescanning the nested lists at each level of a recursive walk.
#[derive(Debug, Clone, Default)]
pub struct DlIndex {
    /// `(open tag start, matching close start)`, sorted by open position
    pairs: Vec<(usize, usize)>,
}

impl DlIndex {
    pub fn build(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut open = Vec::new();
        let mut pairs = Vec::new();
        let mut pos = 0usize;

        while let Some(lt) = text.get(pos..).and_then(|rest| rest.find('<')) {
            let at = pos + lt;
            let rest = &bytes[at..];
            if rest.starts_with(b"</DL>") {
                if let Some(start) = open.pop() {
                    pairs.push((start, at));
                }
                pos = at + "</DL>".len();
            } else if rest.starts_with(b"<DL") && is_tag_boundary(rest.get(3)) {
                open.push(at);
                pos = at + "<DL".len();
            } else {
                pos = at + 1;
            }
        }

        pairs.sort_unstable();
        Self { pairs }
    }

    /// The `</DL>` matching the `<DL` that starts at `open`, if it closes
    /// before `end`.
    pub fn matching_close(&self, open: usize, end: usize) -> Option<usize> {
        let idx = self.pairs.binary_search_by_key(&open, |&(start, _)| start).ok()?;
        let close = self.pairs[idx].1;
        (close + "</DL>".len() <= end).then_some(close)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_respects_window() {
        let text = "<DT>one<DT>two";
        let cursor = Cursor::bounded(text, 1, 11);
        assert_eq!(cursor.find("<DT>"), Some(7));

        // The match has to end inside the window
        let narrow = Cursor::bounded(text, 1, 10);
        assert_eq!(narrow.find("<DT>"), None);
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let cursor = Cursor::new("<dt><DT>");
        assert_eq!(cursor.find("<DT>"), Some(4));
    }

    #[test]
    fn test_open_tag_requires_boundary() {
        let text = "<DLX><DL ><DL>";
        assert_eq!(find_open_tag(text, "DL", 0, text.len()), Some(5));
        assert_eq!(find_open_tag(text, "DL", 6, text.len()), Some(10));
        assert_eq!(find_open_tag("<DL", "DL", 0, 3), None);
    }

    #[test]
    fn test_matching_close_skips_nested_lists() {
        let text = "<DL><DT><DL><DT><DL></DL></DL></DL>tail";
        let after = 4;
        let close = find_matching_close(text, after, text.len()).unwrap();
        assert_eq!(&text[close..], "</DL>tail");
    }

    #[test]
    fn test_matching_close_unterminated() {
        let text = "<DL><DT><DL></DL>";
        assert_eq!(find_matching_close(text, 4, text.len()), None);
    }

    #[test]
    fn test_find_stops_at_window_end() {
        let text = "<DT>é<DT>";
        assert_eq!(Cursor::bounded(text, 1, text.len()).find("<DT>"), Some(6));
        // An end inside a multi-byte character is rounded down
        assert_eq!(Cursor::bounded(text, 1, 5).find("<DT>"), None);
    }

    #[test]
    fn test_index_agrees_with_matching_close() {
        let text = "<DL><DT><DL><DT><DL></DL><DLX></DL></DL>tail<DL></DL><DL>";
        let index = DlIndex::build(text);
        assert_eq!(index.len(), 4);

        let mut from = 0;
        while let Some(open) = find_open_tag(text, "DL", from, text.len()) {
            let after = open + "<DL>".len();
            for end in [text.len(), 30, 20] {
                assert_eq!(
                    index.matching_close(open, end),
                    find_matching_close(text, after, end),
                    "open {open}, end {end}"
                );
            }
            from = after;
        }
    }

    #[test]
    fn test_index_ignores_stray_closes() {
        let text = "</DL><DL></DL></DL>";
        let index = DlIndex::build(text);
        assert_eq!(index.matching_close(5, text.len()), Some(9));
        assert_eq!(index.matching_close(0, text.len()), None);
    }

    #[test]
    fn test_advance_never_goes_backwards() {
        let mut cursor = Cursor::bounded("abcdef", 2, 5);
        cursor.advance_to(1);
        assert_eq!(cursor.pos(), 2);
        cursor.advance_to(99);
        assert_eq!(cursor.pos(), 5);
        assert!(cursor.is_done());
        assert_eq!(cursor.rest(), "");
    }
}

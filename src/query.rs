//! `q` / `page` query parameters and a non-navigating history mirror.
//!
//! The browser surface keeps the active search and page in the location's
//! query string so a reload restores them. The app only ever replaces the
//! current entry; `push` exists for hosts that want back/forward steps.

use std::fmt::Write as _;

/// Search keyword parameter.
pub const PARAM_QUERY: &str = "q";

/// Page number parameter.
pub const PARAM_PAGE: &str = "page";

/// Parameters mirrored into the location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    /// Active keyword.
    pub q: Option<String>,
    /// Active page (1-based).
    pub page: Option<usize>,
    /// Unrelated parameters, preserved in order.
    pub extra: Vec<(String, String)>,
}

impl SearchParams {
    /// Params for a keyword on a page.
    pub fn new(q: impl Into<String>, page: usize) -> Self {
        let q = q.into();
        Self {
            q: (!q.is_empty()).then_some(q),
            page: Some(page),
            extra: Vec::new(),
        }
    }

    /// Parse a query string, with or without the leading `?`.
    ///
    /// Pages that are not positive integers are dropped. Later duplicates
    /// of `q` or `page` win.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            let value = decode_component(value);
            match key.as_str() {
                PARAM_QUERY => params.q = (!value.is_empty()).then_some(value),
                PARAM_PAGE => params.page = value.parse::<usize>().ok().filter(|p| *p >= 1),
                _ => params.extra.push((key, value)),
            }
        }
        params
    }

    /// Serialise to a query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        if let Some(q) = self.q.as_deref() {
            pairs.push(format!("{PARAM_QUERY}={}", encode_component(q)));
        }
        if let Some(page) = self.page {
            pairs.push(format!("{PARAM_PAGE}={page}"));
        }
        pairs.extend(
            self.extra
                .iter()
                .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v))),
        );
        pairs.join("&")
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

/// Form-style percent-encoding: spaces become `+`.
pub fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b' ' => out.push('+'),
            b if is_unreserved(b) => out.push(char::from(b)),
            b => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
    out
}

/// Inverse of [`encode_component`]. Malformed escapes are kept literally.
pub fn decode_component(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// In-memory history of query states.
#[derive(Debug, Clone)]
pub struct HistoryMirror {
    entries: Vec<SearchParams>,
    cursor: usize,
}

impl Default for HistoryMirror {
    fn default() -> Self {
        Self::new(SearchParams::default())
    }
}

impl HistoryMirror {
    /// History holding one entry.
    pub fn new(initial: SearchParams) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    /// History seeded from a location query string.
    pub fn from_location(query: &str) -> Self {
        Self::new(SearchParams::parse(query))
    }

    /// The active entry.
    pub fn current(&self) -> &SearchParams {
        &self.entries[self.cursor]
    }

    /// Location query of the active entry, `?`-prefixed or empty.
    pub fn location(&self) -> String {
        let query = self.current().to_query_string();
        if query.is_empty() {
            query
        } else {
            format!("?{query}")
        }
    }

    /// Overwrite the active entry without adding history.
    pub fn replace(&mut self, params: SearchParams) {
        tracing::trace!(query = %params.to_query_string(), "history replace");
        self.entries[self.cursor] = params;
    }

    /// Add an entry after the active one, discarding forward history.
    pub fn push(&mut self, params: SearchParams) {
        tracing::trace!(query = %params.to_query_string(), "history push");
        self.entries.truncate(self.cursor + 1);
        self.entries.push(params);
        self.cursor += 1;
    }

    /// Step back. Returns the restored entry, if any.
    pub fn back(&mut self) -> Option<&SearchParams> {
        self.cursor = self.cursor.checked_sub(1)?;
        Some(self.current())
    }

    /// Step forward. Returns the restored entry, if any.
    pub fn forward(&mut self) -> Option<&SearchParams> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_query_and_page() {
        let params = SearchParams::parse("?q=rust+book&page=3&theme=dark");
        assert_eq!(params.q.as_deref(), Some("rust book"));
        assert_eq!(params.page, Some(3));
        assert_eq!(params.extra, vec![("theme".to_string(), "dark".to_string())]);
    }

    #[test]
    fn invalid_pages_are_dropped() {
        assert_eq!(SearchParams::parse("page=0").page, None);
        assert_eq!(SearchParams::parse("page=-2").page, None);
        assert_eq!(SearchParams::parse("page=abc").page, None);
        assert_eq!(SearchParams::parse("q=").q, None);
    }

    #[test]
    fn encodes_non_ascii_and_reserved() {
        let params = SearchParams::new("书签 & more", 2);
        assert_eq!(
            params.to_query_string(),
            "q=%E4%B9%A6%E7%AD%BE+%26+more&page=2"
        );
    }

    #[test]
    fn malformed_escapes_survive() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
        assert_eq!(decode_component("%-1"), "%-1");
        assert_eq!(decode_component("%+1"), "% 1");
    }

    #[test]
    fn replace_does_not_grow_history() {
        let mut history = HistoryMirror::default();
        history.replace(SearchParams::new("a", 1));
        history.replace(SearchParams::new("a", 2));
        assert_eq!(history.len(), 1);
        assert_eq!(history.location(), "?q=a&page=2");
    }

    #[test]
    fn push_back_forward() {
        let mut history = HistoryMirror::from_location("?q=a");
        history.push(SearchParams::new("b", 1));
        history.push(SearchParams::new("c", 1));

        assert_eq!(history.back().and_then(|p| p.q.clone()).as_deref(), Some("b"));
        history.push(SearchParams::new("d", 1));
        assert!(history.forward().is_none());
        assert_eq!(history.back().and_then(|p| p.q.clone()).as_deref(), Some("b"));
        assert_eq!(history.back().and_then(|p| p.q.clone()).as_deref(), Some("a"));
        assert!(history.back().is_none());
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(s in "\\PC*") {
            prop_assert_eq!(decode_component(&encode_component(&s)), s);
        }
    }
}

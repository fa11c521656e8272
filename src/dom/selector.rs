//! Compound selectors: `tag#id.class[attr=value]`.
//!
//! Combinators are not supported; every selector matches a single element.

use super::DomError;

/// Parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Selector {
    /// Selector matching any element carrying `class`.
    pub fn class(class: &str) -> Self {
        Selector {
            tag: None,
            id: None,
            classes: vec![class.to_string()],
            attributes: Vec::new(),
        }
    }

    /// Parse a compound selector.
    ///
    /// # Errors
    ///
    /// `InvalidSelector` for empty input, combinators, or unterminated brackets.
    pub fn parse(input: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(input.to_string());
        let source = input.trim();
        if source.is_empty() || source.contains(char::is_whitespace) {
            return Err(invalid());
        }

        let mut selector = Selector {
            tag: None,
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
        };

        let mut rest = source;
        let tag_len = rest
            .find(|c: char| matches!(c, '#' | '.' | '['))
            .unwrap_or(rest.len());
        if tag_len > 0 {
            let tag = &rest[..tag_len];
            if tag != "*" && !is_ident(tag) {
                return Err(invalid());
            }
            if tag != "*" {
                selector.tag = Some(tag.to_ascii_lowercase());
            }
            rest = &rest[tag_len..];
        }

        while let Some(marker) = rest.chars().next() {
            rest = &rest[marker.len_utf8()..];
            match marker {
                '#' | '.' => {
                    let len = rest
                        .find(|c: char| matches!(c, '#' | '.' | '['))
                        .unwrap_or(rest.len());
                    if len == 0 || !is_ident(&rest[..len]) {
                        return Err(invalid());
                    }
                    let name = rest[..len].to_string();
                    if marker == '#' {
                        selector.id = Some(name);
                    } else {
                        selector.classes.push(name);
                    }
                    rest = &rest[len..];
                }
                '[' => {
                    let end = rest.find(']').ok_or_else(invalid)?;
                    let body = &rest[..end];
                    let attribute = match body.split_once('=') {
                        Some((name, value)) => (
                            name.to_string(),
                            Some(value.trim_matches(|c: char| c == '"' || c == '\'').to_string()),
                        ),
                        None => (body.to_string(), None),
                    };
                    if attribute.0.is_empty() {
                        return Err(invalid());
                    }
                    selector.attributes.push(attribute);
                    rest = &rest[end + 1..];
                }
                _ => return Err(invalid()),
            }
        }

        Ok(selector)
    }

    /// Match against an element's tag, classes and attribute lookup.
    pub fn matches<F>(&self, tag: &str, classes: &[String], attribute: F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.tag.as_deref().is_some_and(|t| t != tag) {
            return false;
        }
        if let Some(id) = &self.id {
            if attribute("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| classes.iter().any(|have| have == c)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| match expected {
            Some(value) => attribute(name).as_deref() == Some(value.as_str()),
            None => attribute(name).is_some(),
        })
    }
}

fn is_ident(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn parses_compound_selector() {
        let selector = Selector::parse("button.pagination-btn[data-page=3]").unwrap();
        let classes = vec!["pagination-btn".to_string()];
        assert!(selector.matches("button", &classes, attrs(&[("data-page", "3")])));
        assert!(!selector.matches("button", &classes, attrs(&[("data-page", "4")])));
        assert!(!selector.matches("span", &classes, attrs(&[("data-page", "3")])));
    }

    #[test]
    fn id_selector_matches_id_attribute() {
        let selector = Selector::parse("#sidebar").unwrap();
        assert!(selector.matches("aside", &[], attrs(&[("id", "sidebar")])));
        assert!(!selector.matches("aside", &[], attrs(&[])));
    }

    #[test]
    fn presence_attribute_selector() {
        let selector = Selector::parse("[hidden]").unwrap();
        assert!(selector.matches("nav", &[], attrs(&[("hidden", "")])));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        for bad in ["", "nav button", ".", "[x", "a>b"] {
            assert!(Selector::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}

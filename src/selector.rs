//! Compound selectors for locating sentence containers.
//!
//! Hosts describe candidate containers with CSS-like strings. Only compound
//! selectors are supported: an optional tag name followed by any number of
//! `.class` and `#id` parts, e.g. `.full-sentence`, `div.sentence`,
//! `#qa`, `span.jp.sentence`. Combinators (descendant, child, ...) are not.

use crate::dom::Element;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector syntax in '{0}' (expected tag, .class and #id parts)")]
    Unsupported(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    id: Option<String>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }
        let caps = regex!(r"^([A-Za-z][A-Za-z0-9-]*)?((?:[.#][A-Za-z0-9_-]+)*)$")
            .captures(input)
            .ok_or_else(|| SelectorError::Unsupported(input.to_string()))?;

        let tag = caps.get(1).map(|m| m.as_str().to_ascii_lowercase());
        let mut classes = Vec::new();
        let mut id = None;
        let parts = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        for part in regex!(r"[.#][A-Za-z0-9_-]+").find_iter(parts) {
            let (sigil, name) = part.as_str().split_at(1);
            if sigil == "#" {
                // `#a#b` can never match a single element.
                if id.as_deref().is_some_and(|prev| prev != name) {
                    return Err(SelectorError::Unsupported(input.to_string()));
                }
                id = Some(name.to_string());
            } else {
                classes.push(name.to_string());
            }
        }

        Ok(Selector { tag, classes, id })
    }

    pub fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if el.tag != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id() != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| el.has_class(c))
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

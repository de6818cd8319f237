//! Change detection: content fingerprints and visible-text search

use std::fmt;

use scraper::Html;
use sha2::{Digest, Sha224};

use crate::error::PagewatchError;

/// Elements whose text never renders as page content
const HIDDEN_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// SHA-224 digest of a page body
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 28]);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

/// Compute the fingerprint of raw content bytes
pub fn fingerprint(content: &[u8]) -> Fingerprint {
    let digest = Sha224::digest(content);
    let mut bytes = [0u8; 28];
    bytes.copy_from_slice(&digest);
    Fingerprint(bytes)
}

/// Report whether `text` appears in the visible text of an HTML document
///
/// Text nodes are joined in document order and whitespace runs collapse to a
/// single space on both sides, so a phrase split across inline elements
/// (`<b>In</b> Stock`) still matches. Matching is case-sensitive.
pub fn find_text(content: &[u8], text: &str) -> crate::Result<bool> {
    let html = std::str::from_utf8(content).map_err(|e| {
        PagewatchError::Detect(format!("Page content is not valid UTF-8: {}", e))
    })?;

    let needle = collapse_whitespace(text);
    if needle.is_empty() {
        return Err(PagewatchError::Detect(
            "Search text is empty after whitespace normalization".to_string(),
        ));
    }

    let visible = visible_text(&Html::parse_document(html));
    Ok(visible.contains(&needle))
}

fn visible_text(document: &Html) -> String {
    let mut raw = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
        });
        if !hidden {
            raw.push_str(text);
            raw.push(' ');
        }
    }
    collapse_whitespace(&raw)
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

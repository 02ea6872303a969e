//! DOM Operations Adapter
//!
//! Thin helpers over the `dom_query` crate used by the snapshot page: parsing,
//! attribute access, rendered-text approximation and visibility checks.

// Re-export core types for external use
pub use dom_query::{Document, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

use crate::patterns::WHITESPACE_NORMALIZE;

// === Attribute Operations ===

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Check if attribute exists
#[inline]
#[must_use]
pub fn has_attribute(sel: &Selection, name: &str) -> bool {
    sel.has_attr(name)
}

// === Text Content ===

/// Get all text content of node and descendants
///
/// Returns `StrTendril` for zero-copy passing.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Text content with whitespace runs collapsed and ends trimmed.
///
/// Approximates what a browser reports as an element's rendered text.
#[must_use]
pub fn normalized_text(sel: &Selection) -> String {
    let text = text_content(sel);
    WHITESPACE_NORMALIZE.replace_all(&text, " ").trim().to_string()
}

// === Visibility ===

/// Whether the element or one of its ancestors hides it.
///
/// Recognizes the `hidden` attribute, `aria-hidden="true"` and inline
/// `display: none` / `visibility: hidden` styles.
#[must_use]
pub fn is_visible(sel: &Selection) -> bool {
    let Some(mut node) = sel.nodes().first().copied() else {
        return false;
    };
    loop {
        if node.is_element() && hides(&Selection::from(node)) {
            return false;
        }
        match node.parent() {
            Some(parent) => node = parent,
            None => return true,
        }
    }
}

fn hides(sel: &Selection) -> bool {
    if has_attribute(sel, "hidden") {
        return true;
    }
    if get_attribute(sel, "aria-hidden").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
        return true;
    }
    get_attribute(sel, "style").is_some_and(|style| {
        let style: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        let style = style.to_ascii_lowercase();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_attributes() {
        let doc = parse(r#"<div id="main" class="container">content</div>"#);
        let div = doc.select("div");

        assert_eq!(get_attribute(&div, "id"), Some("main".to_string()));
        assert!(has_attribute(&div, "class"));
        assert_eq!(get_attribute(&div, "title"), None);
    }

    #[test]
    fn test_normalized_text_collapses_whitespace() {
        let doc = parse("<p>  Great \n\t giveaway <b>!</b>  </p>");
        assert_eq!(normalized_text(&doc.select("p")), "Great giveaway !");
    }

    #[test]
    fn test_visibility() {
        let doc = parse(
            r#"<div>
                <button id="shown">Load more</button>
                <div hidden><button id="in-hidden">Load more</button></div>
                <button id="aria" aria-hidden="TRUE">Load more</button>
                <button id="styled" style="display: none">Load more</button>
                <button id="invisible" style="Visibility : hidden">Load more</button>
            </div>"#,
        );

        assert!(is_visible(&doc.select("#shown")));
        assert!(!is_visible(&doc.select("#in-hidden")));
        assert!(!is_visible(&doc.select("#aria")));
        assert!(!is_visible(&doc.select("#styled")));
        assert!(!is_visible(&doc.select("#invisible")));
    }

    #[test]
    fn test_operations_on_empty_selection() {
        let doc = parse("<div></div>");
        let missing = doc.select("p");

        assert_eq!(get_attribute(&missing, "id"), None);
        assert_eq!(normalized_text(&missing), "");
        assert!(!is_visible(&missing));
    }
}

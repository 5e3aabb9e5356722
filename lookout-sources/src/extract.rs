//! Small HTML extraction helpers shared by the scrape-mode sources.

use scraper::{ElementRef, Selector};

use crate::error::SourceError;

/// Parse a CSS selector, mapping failures to [`SourceError::Parse`].
pub(crate) fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Parse(format!("invalid selector {css:?}: {e:?}")))
}

/// Concatenated text content of an element, trimmed.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first descendant matching `sel`, if any.
pub(crate) fn first_text(element: ElementRef<'_>, sel: &Selector) -> Option<String> {
    element.select(sel).next().map(text_of)
}

/// Trimmed text of every descendant matching `sel`, in document order.
pub(crate) fn all_texts(element: ElementRef<'_>, sel: &Selector) -> Vec<String> {
    element.select(sel).map(text_of).collect()
}

/// First direct child element with the given tag name.
pub(crate) fn direct_child<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == tag)
}

/// Replace every run of two or more whitespace characters with one space.
/// A lone whitespace character is left as it is.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_whitespace() && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

/// Return `value` unless it is empty, in which case return `fallback`.
pub(crate) fn or_fallback(value: Option<String>, fallback: &str) -> String {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => fallback.to_string(),
    }
}

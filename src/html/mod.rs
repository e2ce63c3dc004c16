//! Best-effort HTML parsing and CSS-selector extraction.
//!
//! Wraps `scraper` (html5ever underneath), so malformed markup never fails to
//! parse; it is repaired the way browsers repair it.

pub mod selectors;

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document or fragment.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML page.
    pub fn parse(body: &str) -> Self {
        Self { html: Html::parse_document(body) }
    }

    /// Parses a partial page such as an infinite-scroll fragment.
    pub fn parse_fragment(body: &str) -> Self {
        Self { html: Html::parse_fragment(body) }
    }

    /// All elements matching `selector`, in document order.
    pub fn select<'a>(&'a self, selector: &'a Selector) -> Vec<ElementRef<'a>> {
        self.html.select(selector).collect()
    }

    pub fn select_first<'a>(&'a self, selector: &'a Selector) -> Option<ElementRef<'a>> {
        self.html.select(selector).next()
    }
}

/// First descendant of `node` matching `selector`.
pub fn select_within<'a>(node: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    node.select(selector).next()
}

/// Whether `node` has at least one descendant matching `selector`.
pub fn has_child(node: ElementRef<'_>, selector: &Selector) -> bool {
    node.select(selector).next().is_some()
}

/// Number of descendants of `node` matching `selector`.
pub fn count_within(node: ElementRef<'_>, selector: &Selector) -> usize {
    node.select(selector).count()
}

/// Visible text of `node` with whitespace runs collapsed and ends trimmed.
pub fn text(node: ElementRef<'_>) -> String {
    node.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Trimmed value of attribute `name`, if present.
pub fn attr(node: ElementRef<'_>, name: &str) -> Option<String> {
    node.value().attr(name).map(|v| v.trim().to_string())
}

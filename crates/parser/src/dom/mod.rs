// ABOUTME: Read-only DOM query capability the extractors are written against.
// ABOUTME: Cached selector compilation, first-match lookup, normalized text and attribute reads.

//! Document navigation utilities.
//!
//! A thin, read-only query layer over [`scraper::Html`]. Extractors depend
//! only on this surface - selector lookup, trimmed text, attribute access,
//! ordered children and forward siblings - never on parser internals, so the
//! concrete HTML library stays an implementation detail of this module.
//!
//! Key behaviors:
//! - CSS selectors are compiled once and cached process-wide.
//! - Text reads normalize non-breaking spaces and collapse whitespace.
//! - Attribute reads are trimmed; empty values count as missing.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::text::{normalize_whitespace, unnbsp};

/// Thread-safe cache of compiled CSS selectors.
///
/// Selector parsing is expensive relative to the actual matching; most
/// accesses are cache hits behind the shared lock.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` for invalid selector strings; invalid selectors are cached
/// too so they are rejected exactly once.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    {
        let cache = SELECTOR_CACHE.read().unwrap();
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    let mut cache = SELECTOR_CACHE.write().unwrap();
    if let Some(cached) = cache.get(css) {
        return cached.clone();
    }
    cache.insert(css.to_string(), compiled.clone());
    compiled
}

/// First element matching `css` anywhere in the document.
pub fn first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let sel = get_or_compile(css)?;
    doc.select(&sel).next()
}

/// All elements matching `css` anywhere in the document.
pub fn all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(sel) => doc.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// First element matching `css` within `scope`.
pub fn first_in<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = get_or_compile(css)?;
    scope.select(&sel).next()
}

/// All elements matching `css` within `scope`.
pub fn all_in<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(sel) => scope.select(&sel).collect(),
        None => Vec::new(),
    }
}

/// Inner text of an element, nbsp-normalized and whitespace-collapsed.
pub fn text_of(el: ElementRef<'_>) -> String {
    let joined = el.text().collect::<Vec<_>>().join(" ");
    normalize_whitespace(&unnbsp(&joined))
}

/// Trimmed attribute value; empty attributes count as missing.
pub fn attr_of(el: ElementRef<'_>, name: &str) -> Option<String> {
    let value = el.value().attr(name)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Ordered element children of `el`, skipping text and comment nodes.
pub fn element_children(el: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    el.children().filter_map(ElementRef::wrap).collect()
}

/// True when the element has at least one element child.
///
/// Distinguishes a plain text cell from one that nests markup (the
/// alternating-lesson encoding on the timetable).
pub fn has_element_children(el: ElementRef<'_>) -> bool {
    el.children().any(|n| ElementRef::wrap(n).is_some())
}

/// Text content of the sibling nodes following `el`, in document order.
///
/// Element siblings contribute their inner text; bare text nodes contribute
/// themselves. Each entry is nbsp-normalized and whitespace-collapsed; empty
/// entries are dropped.
pub fn following_sibling_texts(el: ElementRef<'_>) -> Vec<String> {
    let mut out = Vec::new();
    for node in el.next_siblings() {
        let raw = if let Some(sibling) = ElementRef::wrap(node) {
            sibling.text().collect::<Vec<_>>().join(" ")
        } else if let Some(text) = node.value().as_text() {
            text.to_string()
        } else {
            continue;
        };
        let cleaned = normalize_whitespace(&unnbsp(&raw));
        if !cleaned.is_empty() {
            out.push(cleaned);
        }
    }
    out
}

/// The element two levels above `el`, when both ancestors are elements.
pub fn grandparent(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent()
        .and_then(|p| p.parent())
        .and_then(ElementRef::wrap)
}

//! Locating labeled sections in loosely structured HTML.
//!
//! nuLiga pages carry no ids on the parts we need; the only stable anchors
//! are headings with known text. A [`SectionLocator`] finds those headings,
//! and the helpers here walk the document forward from them.

use scraper::{ElementRef, Html};

use crate::constants::SCHEDULE_MARKER;
use crate::text::{element_text, normalize};

pub const SCHEDULE_HEADINGS: &[&str] = &["h2", "h3"];
pub const ADDRESS_HEADINGS: &[&str] = &["h1", "h2", "h3", "h4"];
pub const ADDRESS_BLOCKS: &[&str] = &["p", "div", "address"];

/// Matches headings of the given tags whose text contains a marker phrase.
#[derive(Debug, Clone, Copy)]
pub struct SectionLocator<'a> {
    pub marker: &'a str,
    pub heading_tags: &'a [&'a str],
}

impl<'a> SectionLocator<'a> {
    pub const fn new(marker: &'a str, heading_tags: &'a [&'a str]) -> Self {
        Self {
            marker,
            heading_tags,
        }
    }

    pub fn is_match(&self, element: ElementRef<'_>) -> bool {
        let name = element.value().name();
        self.heading_tags.iter().any(|tag| tag.eq_ignore_ascii_case(name))
            && element.text().collect::<String>().contains(self.marker)
    }

    /// All matching headings in document order.
    pub fn headings<'d>(&self, document: &'d Html) -> Vec<ElementRef<'d>> {
        elements_in_order(document)
            .filter(|el| self.is_match(*el))
            .collect()
    }

    /// The first element named `tag` after each matching heading.
    pub fn next_elements<'d>(&self, document: &'d Html, tag: &str) -> Vec<SectionMatch<'d>> {
        let mut found: Vec<SectionMatch<'d>> = Vec::new();
        for heading in self.headings(document) {
            let next = following_elements(document, heading).find(|el| el.value().name() == tag);
            if let Some(element) = next {
                // Two headings can point at the same table
                if !found.iter().any(|f| f.element.id() == element.id()) {
                    found.push(SectionMatch { heading, element });
                }
            }
        }
        found
    }
}

/// An element found below a marker heading.
#[derive(Debug, Clone, Copy)]
pub struct SectionMatch<'d> {
    pub heading: ElementRef<'d>,
    pub element: ElementRef<'d>,
}

/// Every element of the document in document (pre-)order.
pub fn elements_in_order(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
}

/// Elements that come after `anchor` in document order, its own descendants included.
pub fn following_elements<'d>(
    document: &'d Html,
    anchor: ElementRef<'d>,
) -> impl Iterator<Item = ElementRef<'d>> {
    let anchor_id = anchor.id();
    elements_in_order(document)
        .skip_while(move |el| el.id() != anchor_id)
        .skip(1)
}

/// `h1`..`h6` to 1..6.
pub fn heading_level(name: &str) -> Option<u8> {
    let bytes = name.as_bytes();
    match bytes {
        [b'h' | b'H', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// Normalized text of up to `max` block elements after `heading`.
///
/// Stops at the next heading of the same or a higher level. Empty blocks are ignored.
pub fn collect_blocks_after(
    document: &Html,
    heading: ElementRef<'_>,
    block_tags: &[&str],
    max: usize,
) -> Vec<String> {
    let level = heading_level(heading.value().name()).unwrap_or(6);
    let mut lines = Vec::new();
    if max == 0 {
        return lines;
    }

    for el in following_elements(document, heading) {
        let name = el.value().name();
        if heading_level(name).is_some_and(|l| l <= level) {
            break;
        }
        if block_tags.contains(&name) {
            let text = element_text(el);
            if !text.is_empty() {
                lines.push(text);
                if lines.len() >= max {
                    break;
                }
            }
        }
    }
    lines
}

/// Tables following each "Spieltermine" heading (Vorrunde, Rückrunde).
pub fn find_schedule_tables(document: &Html) -> Vec<SectionMatch<'_>> {
    SectionLocator::new(SCHEDULE_MARKER, SCHEDULE_HEADINGS).next_elements(document, "table")
}

/// Normalized heading text, e.g. "Spieltermine (Rückrunde)".
pub fn heading_text(heading: ElementRef<'_>) -> String {
    normalize(&heading.text().collect::<String>())
}

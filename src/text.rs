use scraper::ElementRef;

/// Replaces non-breaking spaces, collapses whitespace runs into one space and trims.
pub fn normalize(s: &str) -> String {
    s.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of an element with each text node trimmed and joined by single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    let joined = element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    normalize(&joined)
}

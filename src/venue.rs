//! Resolves a hall short code (e.g. "TU") into a postal address by following
//! the hall link to its nuLiga detail page.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::constants::{FRAGMENT_SEPARATOR, HALL_ADDRESS_MARKER, MAX_ADDRESS_LINES};
use crate::http_client::PageFetcher;
use crate::section::{collect_blocks_after, SectionLocator, ADDRESS_BLOCKS, ADDRESS_HEADINGS};
use crate::text::element_text;

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FallbackReason {
    NoLink,
    InvalidUrl,
    FetchFailed,
    MarkerNotFound,
    EmptyAddress,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FallbackReason::NoLink => "no hall link",
            FallbackReason::InvalidUrl => "hall link is not a valid URL",
            FallbackReason::FetchFailed => "hall page could not be fetched",
            FallbackReason::MarkerNotFound => "hall page has no address heading",
            FallbackReason::EmptyAddress => "address heading has no text below it",
        };
        f.write_str(s)
    }
}

/// Outcome of resolving a venue cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VenueResolution {
    Resolved { address: String },
    Fallback { text: String, reason: FallbackReason },
}

impl VenueResolution {
    /// The string that goes into the Location column.
    pub fn location(&self) -> &str {
        match self {
            VenueResolution::Resolved { address } => address,
            VenueResolution::Fallback { text, .. } => text,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            VenueResolution::Resolved { .. } => None,
            VenueResolution::Fallback { reason, .. } => Some(*reason),
        }
    }
}

pub type AddressLookup = std::result::Result<Vec<String>, FallbackReason>;

/// Follows hall links, caching each hall page's address for the run.
pub struct VenueEnricher<'f> {
    fetcher: &'f dyn PageFetcher,
    cache: RefCell<HashMap<String, AddressLookup>>,
}

impl<'f> VenueEnricher<'f> {
    pub fn new(fetcher: &'f dyn PageFetcher) -> Self {
        Self {
            fetcher,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn resolve(&self, cell: ElementRef<'_>, page_url: &str) -> VenueResolution {
        let fallback = element_text(cell);
        let fall_back = |reason: FallbackReason| {
            debug!(venue = %fallback, %reason, "Using venue cell text as location");
            VenueResolution::Fallback {
                text: fallback.clone(),
                reason,
            }
        };

        let Some(link) = cell.select(&LINK_SELECTOR).next() else {
            return fall_back(FallbackReason::NoLink);
        };
        let Some(href) = link.value().attr("href").filter(|h| !h.trim().is_empty()) else {
            return fall_back(FallbackReason::NoLink);
        };
        let hall_url = match resolve_link(page_url, href) {
            Ok(url) => url,
            Err(reason) => return fall_back(reason),
        };

        let lines = match self.lookup(&hall_url) {
            Ok(lines) => lines,
            Err(reason) => return fall_back(reason),
        };

        let code = element_text(link);
        let address = lines.join(FRAGMENT_SEPARATOR);
        let address = if !code.is_empty() && !address.contains(&code) {
            format!("{code} – {address}")
        } else {
            address
        };
        VenueResolution::Resolved { address }
    }

    fn lookup(&self, hall_url: &str) -> AddressLookup {
        if let Some(cached) = self.cache.borrow().get(hall_url) {
            return cached.clone();
        }
        let result = self.fetch_address(hall_url);
        self.cache
            .borrow_mut()
            .insert(hall_url.to_string(), result.clone());
        result
    }

    fn fetch_address(&self, hall_url: &str) -> AddressLookup {
        let html = self.fetcher.fetch(hall_url).map_err(|e| {
            warn!(url = %hall_url, error = %e, "Failed to fetch hall page");
            FallbackReason::FetchFailed
        })?;
        let lines = extract_address_lines(&html)?;
        debug!(url = %hall_url, lines = lines.len(), "Resolved hall address");
        Ok(lines)
    }
}

fn resolve_link(page_url: &str, href: &str) -> std::result::Result<String, FallbackReason> {
    let base = Url::parse(page_url).map_err(|_| FallbackReason::InvalidUrl)?;
    let joined = base.join(href.trim()).map_err(|_| FallbackReason::InvalidUrl)?;
    Ok(joined.to_string())
}

/// Up to three text blocks below the first "Hallenadresse" heading of a hall page.
pub fn extract_address_lines(html: &str) -> AddressLookup {
    let document = Html::parse_document(html);
    let locator = SectionLocator::new(HALL_ADDRESS_MARKER, ADDRESS_HEADINGS);
    let heading = locator
        .headings(&document)
        .into_iter()
        .next()
        .ok_or(FallbackReason::MarkerNotFound)?;
    let lines = collect_blocks_after(&document, heading, ADDRESS_BLOCKS, MAX_ADDRESS_LINES);
    if lines.is_empty() {
        return Err(FallbackReason::EmptyAddress);
    }
    Ok(lines)
}

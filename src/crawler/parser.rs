use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

use crate::crawler::models::{Listing, NO_PRICE, NO_TITLE};
use crate::error::ExtractionFault;

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static ITEM: LazyLock<Selector> = LazyLock::new(|| selector("li.s-item"));
static PRICE: LazyLock<Selector> = LazyLock::new(|| selector("span.s-item__price"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.s-item__link"));

// Tried in order; the first non-empty text wins.
static TITLE_CHAIN: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        selector("h3.s-item__title"),
        selector("div.s-item__title"),
        selector("span.s-item__title"),
    ]
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex must compile"));

/// Turns a search results page into listings, in document order.
///
/// A listing without a usable detail link is logged and skipped; the rest
/// of the page is still extracted.
pub fn extract_listings(html: &str, base: &Url) -> Vec<Listing> {
    let document = Html::parse_document(html);
    let mut listings = Vec::new();

    for (idx, item) in document.select(&ITEM).enumerate() {
        match extract_listing(item, idx + 1, base) {
            Ok(listing) => listings.push(listing),
            Err(fault) => warn!(error = %fault, "Skipping listing"),
        }
    }

    debug!(count = listings.len(), "Extracted listings");
    listings
}

fn extract_listing(
    item: ElementRef<'_>,
    position: usize,
    base: &Url,
) -> Result<Listing, ExtractionFault> {
    let detail_link = resolve_link(item, position, base)?;

    let title = TITLE_CHAIN
        .iter()
        .find_map(|sel| first_text(item, sel))
        .unwrap_or_else(|| NO_TITLE.to_string());

    let price = first_text(item, &PRICE).unwrap_or_else(|| NO_PRICE.to_string());

    Ok(Listing {
        title,
        price,
        detail_link,
    })
}

fn first_text(item: ElementRef<'_>, sel: &Selector) -> Option<String> {
    let el = item.select(sel).next()?;
    let raw = el.text().collect::<String>();
    let text = WHITESPACE.replace_all(raw.trim(), " ").into_owned();

    (!text.is_empty()).then_some(text)
}

fn resolve_link(
    item: ElementRef<'_>,
    position: usize,
    base: &Url,
) -> Result<String, ExtractionFault> {
    let href = item
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(ExtractionFault::MissingLink { position })?;

    let url = base.join(href).map_err(|_| ExtractionFault::InvalidLink {
        position,
        href: href.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url.into()),
        _ => Err(ExtractionFault::InvalidLink {
            position,
            href: href.to_string(),
        }),
    }
}

use tracing::info;
use url::Url;

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::models::{Listing, SearchFilters};
use crate::error::FetchError;

pub mod fetcher;
pub mod models;
pub mod parser;
pub mod query;

/// Runs one search: build the query, fetch the first results page, extract
/// listings from it.
pub async fn search(
    fetcher: &dyn PageFetcher,
    endpoint: &Url,
    filters: &SearchFilters,
) -> Result<Vec<Listing>, FetchError> {
    let query = query::build_query(endpoint, filters);
    let html = fetcher.fetch(&query).await?;
    let listings = parser::extract_listings(&html, endpoint);

    info!(
        keyword = %filters.keyword,
        count = listings.len(),
        "Search finished"
    );

    Ok(listings)
}

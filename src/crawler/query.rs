use url::Url;

use crate::crawler::models::{SearchFilters, SearchQuery};

/// Builds the search request for `filters` against `endpoint`.
///
/// The marketplace has no condition facet, so the condition text is folded
/// into the keyword term instead of becoming its own parameter.
pub fn build_query(endpoint: &Url, filters: &SearchFilters) -> SearchQuery {
    let keyword = match filters.condition.as_deref() {
        Some(condition) => format!("{} {}", filters.keyword, condition),
        None => filters.keyword.clone(),
    };

    let mut params = vec![("_nkw".to_string(), keyword)];

    if let Some(min) = &filters.min_price {
        params.push(("_udlo".to_string(), min.clone()));
    }
    if let Some(max) = &filters.max_price {
        params.push(("_udhi".to_string(), max.clone()));
    }
    if let Some(listing_type) = filters.listing_type {
        let (name, value) = listing_type.query_flag();
        params.push((name.to_string(), value.to_string()));
    }

    SearchQuery {
        endpoint: endpoint.clone(),
        params,
    }
}

use crate::crawler::models::Listing;
use crate::error::LookupMiss;

/// Ordinal → detail link for the latest search of one conversation.
#[derive(Debug, Default)]
pub struct ResultIndex {
    links: Vec<String>,
}

impl ResultIndex {
    /// Replaces the whole mapping; ordinals start at 1.
    pub fn record(&mut self, listings: &[Listing]) -> usize {
        let links: Vec<String> = listings.iter().map(|l| l.detail_link.clone()).collect();
        self.links = links;
        self.links.len()
    }

    pub fn resolve(&self, key: &str) -> Result<&str, LookupMiss> {
        parse_ordinal(key)
            .and_then(|n| self.links.get(n - 1))
            .map(String::as_str)
            .ok_or_else(|| LookupMiss { key: key.to_string() })
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

// Canonical decimal only: "1", "12". Rejects "0", "01", "+1", "".
fn parse_ordinal(key: &str) -> Option<usize> {
    let key = key.trim();
    if key.is_empty() || key.starts_with('0') || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(n: u32) -> Listing {
        Listing {
            title: format!("Item {n}"),
            price: "1 EUR".into(),
            detail_link: format!("https://www.ebay.de/itm/{n}"),
        }
    }

    #[test]
    fn resolves_first_listing_at_one() {
        let mut index = ResultIndex::default();
        index.record(&[listing(1), listing(2)]);

        assert_eq!(index.resolve("1"), Ok("https://www.ebay.de/itm/1"));
        assert_eq!(index.resolve("2"), Ok("https://www.ebay.de/itm/2"));
    }

    #[test]
    fn out_of_range_and_malformed_keys_miss() {
        let mut index = ResultIndex::default();
        index.record(&[listing(1)]);

        for key in ["0", "999", "-1", "abc", "", "01", "+1", "1.0", "99999999999999999999999"] {
            assert_eq!(
                index.resolve(key),
                Err(LookupMiss { key: key.to_string() }),
                "key {key:?}"
            );
        }
    }

    #[test]
    fn second_record_supersedes_first() {
        let mut index = ResultIndex::default();
        index.record(&[listing(1), listing(2), listing(3)]);
        index.record(&[listing(7)]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.resolve("1"), Ok("https://www.ebay.de/itm/7"));
        assert!(index.resolve("2").is_err());
        assert!(index.resolve("3").is_err());
    }

    #[test]
    fn empty_index_misses_everything() {
        let index = ResultIndex::default();

        assert!(index.is_empty());
        assert!(index.resolve("1").is_err());
    }
}

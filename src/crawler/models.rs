use url::Url;

pub const NO_TITLE: &str = "No title";
pub const NO_PRICE: &str = "No price";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingType {
    Auction,
    BuyItNow,
}

impl ListingType {
    /// Unknown tokens yield `None` and are ignored by the caller.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "auction" => Some(Self::Auction),
            "buy_it_now" | "buyitnow" | "bin" => Some(Self::BuyItNow),
            _ => None,
        }
    }

    pub fn query_flag(self) -> (&'static str, &'static str) {
        match self {
            Self::Auction => ("LH_Auction", "1"),
            Self::BuyItNow => ("LH_BIN", "1"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub keyword: String,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub condition: Option<String>,
    pub listing_type: Option<ListingType>,
}

/// A marketplace request: endpoint plus query parameters in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub endpoint: Url,
    pub params: Vec<(String, String)>,
}

impl SearchQuery {
    #[cfg(test)]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn to_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub title: String,
    pub price: String,
    pub detail_link: String,
}

use std::env;

use crate::storage::sessions::DEFAULT_MAX_SESSIONS;

const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_SEARCH_URL: &str = "https://www.ebay.de/sch/i.html";
const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

pub struct Config {
    pub telegram_token: String,
    pub telegram_api_url: String,
    pub search_url: String,
    pub fetch_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub user_agent: String,
    pub max_sessions: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let telegram_token = env::var("TELEGRAM_API")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_API is not set"))?;

        if telegram_token.trim().is_empty() {
            anyhow::bail!("TELEGRAM_API is empty");
        }

        Ok(Self {
            telegram_token,
            telegram_api_url: env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.into()),
            search_url: env::var("EBAY_SEARCH_URL").unwrap_or_else(|_| DEFAULT_SEARCH_URL.into()),
            fetch_timeout_secs: parse_or("FETCH_TIMEOUT_SECS", 15)?,
            poll_timeout_secs: parse_or("POLL_TIMEOUT_SECS", 30)?,
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.into()),
            max_sessions: parse_or("MAX_SESSIONS", DEFAULT_MAX_SESSIONS)?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(v) => Ok(v.trim().parse()?),
        Err(_) => Ok(default),
    }
}

use tracing::{debug, info, warn};
use url::Url;

use crate::bot::commands::{parse_command, Command};
use crate::bot::digest::{format_digest, Digest};
use crate::crawler::{self, fetcher::PageFetcher, models::SearchFilters};
use crate::error::UsageError;
use crate::storage::sessions::{ChatId, SessionStore};

pub const GREETING: &str =
    "Hi! I am your eBay search bot. Send /help to see what I can do.";

pub const HELP: &str = "Available commands:\n\n\
/start - Start the bot\n\
/help - Show this help message\n\
/search <keyword> [min:<price>] [max:<price>] [condition:<condition>] [type:auction|buyitnow] - Search eBay offers\n\
/detail <number> - Show the link of an offer from the last search\n\n\
Examples:\n\
/search laptop min:100 max:500 condition:neu type:buyitnow\n\
/detail 1";

pub const NO_OFFERS: &str = "No offers found.";
pub const UNAVAILABLE: &str = "eBay is temporarily unavailable. Please try again later.";
pub const INVALID_NUMBER: &str = "Invalid number. Please try again.";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Send /help for a list of commands.";

/// Handles chat commands for every conversation.
pub struct SearchBot {
    fetcher: Box<dyn PageFetcher>,
    endpoint: Url,
    sessions: SessionStore,
    username: Option<String>,
}

impl SearchBot {
    pub fn new(fetcher: Box<dyn PageFetcher>, endpoint: Url, sessions: SessionStore) -> Self {
        Self {
            fetcher,
            endpoint,
            sessions,
            username: None,
        }
    }

    /// Commands suffixed with `@<username>` are only answered when the
    /// suffix names this bot.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Returns the messages to send back, in order. Empty when the text is
    /// not addressed to the bot.
    pub async fn handle(&self, chat_id: ChatId, text: &str) -> Vec<String> {
        let command = match parse_command(text, self.username.as_deref()) {
            Ok(Some(command)) => command,
            Ok(None) => return Vec::new(),
            Err(e) => {
                info!(chat_id, error = %e, "Rejected command");
                return vec![usage_message(&e).to_string()];
            }
        };

        match command {
            Command::Start => vec![GREETING.to_string()],
            Command::Help => vec![HELP.to_string()],
            Command::Search(filters) => self.search(chat_id, &filters).await,
            Command::Detail(key) => vec![self.detail(chat_id, &key).await],
            Command::Unknown(name) => {
                debug!(chat_id, command = %name, "Unknown command");
                vec![UNKNOWN_COMMAND.to_string()]
            }
        }
    }

    async fn search(&self, chat_id: ChatId, filters: &SearchFilters) -> Vec<String> {
        let session = self.sessions.session(chat_id);
        let mut results = session.results.lock().await;

        info!(chat_id, keyword = %filters.keyword, "Searching");

        let listings =
            match crawler::search(self.fetcher.as_ref(), &self.endpoint, filters).await {
                Ok(v) => v,
                Err(e) => {
                    warn!(chat_id, error = %e, "Search fetch failed");
                    return vec![UNAVAILABLE.to_string()];
                }
            };

        let recorded = results.record(&listings);
        info!(
            chat_id,
            recorded,
            sessions = self.sessions.len(),
            "Results recorded"
        );

        match format_digest(&listings) {
            Digest::NoOffers => vec![NO_OFFERS.to_string()],
            Digest::Chunks(chunks) => chunks,
        }
    }

    async fn detail(&self, chat_id: ChatId, key: &str) -> String {
        let session = self.sessions.session(chat_id);
        let results = session.results.lock().await;

        match results.resolve(key) {
            Ok(link) => format!("Here is the link: {link}"),
            Err(miss) => {
                info!(
                    chat_id,
                    error = %miss,
                    recorded = results.len(),
                    searched = !results.is_empty(),
                    "Detail lookup missed"
                );
                INVALID_NUMBER.to_string()
            }
        }
    }
}

fn usage_message(err: &UsageError) -> &'static str {
    match err {
        UsageError::MissingKeyword => "Please enter a search keyword. Example: /search laptop",
        UsageError::MissingOrdinal => "Please enter a valid number. Example: /detail 1",
        UsageError::InvalidPrice { .. } => {
            "Prices must be positive numbers. Example: /search laptop min:100 max:500"
        }
    }
}

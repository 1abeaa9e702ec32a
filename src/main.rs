mod bot;
mod config;
mod crawler;
mod error;
mod storage;
mod telegram;

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use bot::service::SearchBot;
use config::Config;
use crawler::fetcher::{self, HttpFetcher};
use storage::sessions::SessionStore;
use telegram::TelegramClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ebay_search_bot=debug,html5ever=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env()?;

    let endpoint = Url::parse(&cfg.search_url)
        .with_context(|| format!("invalid EBAY_SEARCH_URL {:?}", cfg.search_url))?;

    let telegram = TelegramClient::new(
        &cfg.telegram_api_url,
        &cfg.telegram_token,
        cfg.poll_timeout_secs,
    )?;
    let me = telegram
        .get_me()
        .await
        .context("telegram token was rejected")?;

    let http = fetcher::build_client(&cfg.user_agent, Duration::from_secs(cfg.fetch_timeout_secs))?;
    let mut bot = SearchBot::new(
        Box::new(HttpFetcher::new(http)),
        endpoint,
        SessionStore::with_capacity(cfg.max_sessions),
    );
    if let Some(username) = &me.username {
        bot = bot.with_username(username.as_str());
    }

    tracing::info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or("-"),
        search_url = %cfg.search_url,
        max_sessions = cfg.max_sessions,
        "Bot started"
    );

    telegram::run(telegram, Arc::new(bot)).await
}

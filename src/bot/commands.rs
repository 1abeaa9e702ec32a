use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::crawler::models::{ListingType, SearchFilters};
use crate::error::UsageError;

static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+([.,]\d{1,2})?$").expect("static regex must compile"));

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Search(SearchFilters),
    Detail(String),
    Unknown(String),
}

/// Parses a chat message. `Ok(None)` means the message is not a command
/// addressed to this bot.
///
/// Only messages whose first word starts with `/` are commands. A
/// `@botname` suffix is accepted when it names `own_username`; commands
/// for any other bot are ignored.
pub fn parse_command(
    text: &str,
    own_username: Option<&str>,
) -> Result<Option<Command>, UsageError> {
    let mut words = text.split_whitespace();
    let Some(head) = words.next().and_then(|w| w.strip_prefix('/')) else {
        return Ok(None);
    };

    let name = match head.split_once('@') {
        Some((name, addressee)) => {
            let ours = own_username.is_some_and(|u| u.eq_ignore_ascii_case(addressee));
            if !ours {
                debug!(addressee, "Ignoring command for another bot");
                return Ok(None);
            }
            name
        }
        None => head,
    };
    let args: Vec<&str> = words.collect();

    let command = match name.to_ascii_lowercase().as_str() {
        "start" => Command::Start,
        "help" => Command::Help,
        "search" | "ebay" => Command::Search(parse_search(&args)?),
        "detail" => {
            let ordinal = args.first().ok_or(UsageError::MissingOrdinal)?;
            Command::Detail(ordinal.to_string())
        }
        _ => Command::Unknown(name.to_string()),
    };

    Ok(Some(command))
}

fn parse_search(args: &[&str]) -> Result<SearchFilters, UsageError> {
    let mut filters = SearchFilters::default();
    let mut keyword = Vec::new();

    for arg in args {
        if let Some(v) = arg.strip_prefix("min:") {
            filters.min_price = Some(price("min", v)?);
        } else if let Some(v) = arg.strip_prefix("max:") {
            filters.max_price = Some(price("max", v)?);
        } else if let Some(v) = arg.strip_prefix("condition:") {
            filters.condition = Some(v.to_string()).filter(|c| !c.is_empty());
        } else if let Some(v) = arg.strip_prefix("type:") {
            filters.listing_type = ListingType::from_token(v);
            if filters.listing_type.is_none() {
                debug!(token = v, "Ignoring unknown listing type");
            }
        } else {
            keyword.push(*arg);
        }
    }

    let keyword = keyword.join(" ");
    let keyword = keyword.trim_matches('"').trim();
    if keyword.is_empty() {
        return Err(UsageError::MissingKeyword);
    }

    filters.keyword = keyword.to_string();
    Ok(filters)
}

fn price(name: &'static str, value: &str) -> Result<String, UsageError> {
    let positive = value.bytes().any(|b| (b'1'..=b'9').contains(&b));

    if PRICE.is_match(value) && positive {
        Ok(value.to_string())
    } else {
        Err(UsageError::InvalidPrice {
            name,
            value: value.to_string(),
        })
    }
}

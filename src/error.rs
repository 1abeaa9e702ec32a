//! Error taxonomy for the search pipeline.
//!
//! None of these are fatal: each one is turned into a chat reply by the
//! bot service and the command returns normally.

use thiserror::Error;

/// Malformed or missing command arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("missing search keyword")]
    MissingKeyword,

    #[error("missing listing number")]
    MissingOrdinal,

    #[error("invalid price filter {name}:{value}")]
    InvalidPrice { name: &'static str, value: String },
}

/// The marketplace could not be reached or answered with a failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out: {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// A single listing whose detail link could not be resolved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionFault {
    #[error("listing #{position} has no detail link")]
    MissingLink { position: usize },

    #[error("listing #{position} has an unusable detail link {href:?}")]
    InvalidLink { position: usize, href: String },
}

/// A `detail` key that does not address a recorded listing.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no listing recorded under {key:?}")]
pub struct LookupMiss {
    pub key: String,
}

use std::fmt;

use shared::protocol::{MARKETS_PATH, NEWS_PATH, SUBSCRIBE_PATH};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    News,
    Markets,
    Subscribe,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Self::News => NEWS_PATH,
            Self::Markets => MARKETS_PATH,
            Self::Subscribe => SUBSCRIBE_PATH,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Failure of a single request against the finance service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: Endpoint, message: String },
    #[error("{endpoint} responded with status {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: Endpoint,
        status: u16,
        detail: Option<String>,
    },
    #[error("failed to decode {endpoint} response: {message}")]
    Decode { endpoint: Endpoint, message: String },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) if !detail.is_empty() => format!(": {detail}"),
        _ => String::new(),
    }
}

impl RequestError {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => *endpoint,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The initial news/markets fetch did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load page data: {0}")]
pub struct FetchError(#[from] pub RequestError);

impl FetchError {
    pub fn cause(&self) -> &RequestError {
        &self.0
    }
}

/// The subscription write was rejected or could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscription failed: {0}")]
pub struct SubscribeError(#[from] pub RequestError);

impl SubscribeError {
    pub fn cause(&self) -> &RequestError {
        &self.0
    }
}

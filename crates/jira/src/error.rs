//! Error type shared by the Jira and admin clients.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to Jira or the Atlassian admin API.
#[derive(Error, Debug)]
pub enum JiraError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl JiraError {
    /// HTTP status code of the failed response, if there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Serialization(_) | Self::Config(_) => None,
        }
    }

    /// Raw response body for API errors, empty otherwise.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Api { body, .. } => body,
            _ => "",
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        self.status() == Some(StatusCode::BAD_REQUEST.as_u16())
    }
}

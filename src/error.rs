//! Unified error type for carosello.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while building, rendering, exporting or generating slides.
#[derive(Debug, Error)]
pub enum SlideError {
    /// The text-generation provider answered with a non-success status.
    #[error("Upstream error ({status}): {body}")]
    Upstream {
        /// HTTP status code (0 when replayed from a cassette).
        status: u16,
        /// Raw response body, kept verbatim for diagnostics.
        body: String,
    },

    /// The request to the provider never completed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A slide could not be encoded.
    #[error("Image encoding error: {0}")]
    ImageEncoding(String),

    /// The zip archive could not be written.
    #[error("Archive error: {0}")]
    Archive(String),

    /// The share target failed for a reason other than user cancellation.
    #[error("Export error: {0}")]
    Export(String),

    /// The provider reply could not be understood at all.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// No API key configured for the provider.
    #[error("{env_var} not configured")]
    MissingApiKey {
        /// The environment variable name.
        env_var: String,
    },
}

impl SlideError {
    /// Whether the failure happened between us and the provider.
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::Network(_))
    }

    /// Diagnostic detail for upstream failures: the raw body or the transport error.
    #[must_use]
    pub fn upstream_detail(&self) -> Option<String> {
        match self {
            Self::Upstream { body, .. } => Some(body.clone()),
            Self::Network(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

/// A provider failure as stored in a cassette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordedError {
    /// Non-success reply, with the raw body.
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// Transport failure, as its message.
    Network(String),
    /// Unreadable success reply.
    Malformed(String),
    /// Anything else, as its display text.
    Other(String),
}

impl From<&SlideError> for RecordedError {
    fn from(err: &SlideError) -> Self {
        match err {
            SlideError::Upstream { status, body } => {
                Self::Upstream { status: *status, body: body.clone() }
            }
            SlideError::Network(e) => Self::Network(e.to_string()),
            SlideError::MalformedResponse(detail) => Self::Malformed(detail.clone()),
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<RecordedError> for SlideError {
    /// A replayed transport failure has no status and stays upstream, with the
    /// recorded message as its detail.
    fn from(recorded: RecordedError) -> Self {
        match recorded {
            RecordedError::Upstream { status, body } => Self::Upstream { status, body },
            RecordedError::Network(message) => Self::Upstream { status: 0, body: message },
            RecordedError::Malformed(detail) => Self::MalformedResponse(detail),
            RecordedError::Other(message) => Self::Config(message),
        }
    }
}

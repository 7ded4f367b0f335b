//! Collaborator-level error type.

use thiserror::Error;

/// Errors returned by a provisioning collaborator.
///
/// The type is `Clone + PartialEq` so test doubles can replay a configured
/// failure and callers can compare the error they got back.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    /// The configuration lacks a field this call needs.
    #[error("{service}: missing required field '{field}'")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },

    /// The remote service answered with a non-success status.
    #[error("{service} responded with status {status}: {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The request never produced a response (connect error, timeout, ...).
    #[error("{service} request failed: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    /// The response body could not be interpreted.
    #[error("{service} returned an unexpected body: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    /// Client-side setup problem (bad base URL, invalid header value).
    #[error("{service} client misconfigured: {message}")]
    Config {
        service: &'static str,
        message: String,
    },
}

impl ProviderError {
    /// Name of the service that produced the error.
    pub fn service(&self) -> &'static str {
        match self {
            Self::MissingField { service, .. }
            | Self::Rejected { service, .. }
            | Self::Transport { service, .. }
            | Self::Decode { service, .. }
            | Self::Config { service, .. } => service,
        }
    }

    /// True when the remote side reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}

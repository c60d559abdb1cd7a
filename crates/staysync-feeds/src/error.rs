//! Error types for feed fetching and parsing.

use std::fmt;

use staysync_core::BookingSource;
use thiserror::Error;

/// The category of a feed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedErrorCode {
    /// Connection failed, DNS resolution, TLS, etc.
    Network,
    /// The fetch did not complete within its deadline.
    Timeout,
    /// The feed URL returned 404 or 410.
    NotFound,
    /// The channel refused access (401/403), usually a revoked export link.
    AccessDenied,
    /// Too many requests.
    RateLimited,
    /// The channel returned a 5xx status.
    ServerError,
    /// Any other unexpected HTTP response.
    InvalidResponse,
    /// The payload is not a well-formed calendar document.
    Parse,
    /// Invalid feed configuration.
    Configuration,
    /// Unexpected internal state.
    Internal,
}

impl FeedErrorCode {
    /// Returns true if a later re-sync may succeed without intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimited | Self::ServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network_error",
            Self::Timeout => "timeout",
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::Parse => "parse_error",
            Self::Configuration => "configuration_error",
            Self::Internal => "internal_error",
        }
    }
}

impl fmt::Display for FeedErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error raised while fetching or parsing one channel's feed.
#[derive(Debug, Error)]
pub struct FeedError {
    code: FeedErrorCode,
    message: String,
    source_tag: Option<BookingSource>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl FeedError {
    pub fn new(code: FeedErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source_tag: None,
            cause: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Timeout, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::NotFound, message)
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::AccessDenied, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::RateLimited, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::ServerError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::InvalidResponse, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Parse, message)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Configuration, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FeedErrorCode::Internal, message)
    }

    /// Tags the error with the channel it came from.
    pub fn with_source_tag(mut self, source: BookingSource) -> Self {
        self.source_tag = Some(source);
        self
    }

    /// Attaches the underlying cause.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn code(&self) -> FeedErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_tag(&self) -> Option<BookingSource> {
        self.source_tag
    }

    /// True for malformed payloads, false for transport failures.
    pub fn is_parse(&self) -> bool {
        self.code == FeedErrorCode::Parse
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = self.source_tag {
            write!(f, "[{}] ", source)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for feed operations.
pub type FeedResult<T> = Result<T, FeedError>;

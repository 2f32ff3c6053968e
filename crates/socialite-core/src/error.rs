// Error type shared by every socialite driver.
//
// `Provider` is the one failure drivers raise themselves: the remote side
// rejected the request or answered with something we cannot read. Everything
// else is a collaborator failure (transport, configuration) passed through.

/// Errors produced while talking to a social login provider.
#[derive(Debug, thiserror::Error)]
pub enum SocialiteError {
    /// The provider reported an error code or returned unparseable data.
    #[error("{0}")]
    Provider(String),

    /// No authorization code was supplied before the token exchange.
    #[error("authorization code is missing; set it from the provider callback first")]
    MissingCode,

    /// Token refresh was requested before a refresh token was obtained.
    #[error("no refresh token available")]
    MissingRefreshToken,

    /// Transport-level failure reported by the HTTP client.
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SocialiteError {
    /// Shorthand for a provider error with the given message.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Whether this error came from the provider rather than a collaborator.
    pub fn is_provider(&self) -> bool {
        matches!(self, Self::Provider(_) | Self::MissingCode)
    }
}

/// Unified result type for socialite operations.
pub type Result<T> = std::result::Result<T, SocialiteError>;

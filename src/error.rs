//! Error types surfaced by the source.
//!
//! Configuration and authentication errors are shown to the user as-is, so
//! their messages are part of the behaviour.

/// Maximum number of characters of a response body kept in an error.
pub const BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Server URL is not set. Configure it in the source settings.")]
    MissingServerUrl,
    #[error("API key is not set. Configure it in the source settings.")]
    MissingApiKey,
}

/// Failure of a single call against the media server.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            body: body.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid API key. Check the key in the source settings.")]
    InvalidApiKey,
    #[error("The API key does not have permission to access this server.")]
    InsufficientScope,
    #[error("Server endpoint not found. Check the server URL.")]
    NotFound,
    #[error("Server error (HTTP {status}). Try again later.")]
    ServerError { status: u16 },
    #[error("Unexpected response (HTTP {status}): {excerpt}")]
    Unexpected { status: u16, excerpt: String },
    #[error("Could not reach the server: {0}")]
    Transport(String),
    #[error("Could not read the server response: {0}")]
    InvalidResponse(String),
    #[error("The server returned no users for this API key.")]
    NoUsers,
}

impl AuthError {
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            401 => AuthError::InvalidApiKey,
            403 => AuthError::InsufficientScope,
            404 => AuthError::NotFound,
            500..=599 => AuthError::ServerError { status },
            _ => AuthError::Unexpected {
                status,
                excerpt: body_excerpt(body),
            },
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body } => AuthError::from_status(status, &body),
            ApiError::Transport(e) => AuthError::Transport(e.to_string()),
            ApiError::Decode(e) => AuthError::InvalidResponse(e.to_string()),
        }
    }
}

/// Error returned by the host-facing operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("settings storage failed: {0}")]
    Storage(#[from] anyhow::Error),
}

pub fn body_excerpt(body: &str) -> String {
    body.trim().chars().take(BODY_EXCERPT_CHARS).collect()
}

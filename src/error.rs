use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Coarse classification of a failed request, derived from the HTTP status
/// (or its absence) rather than the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The server answered 404 for the addressed path.
    NotFound,
    /// The server answered with a 5xx status.
    ServerError,
    /// The request never produced a response (connect or timeout failure).
    Unreachable,
    /// Any other failed status.
    Other,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransportKind::NotFound => "not found",
            TransportKind::ServerError => "server error",
            TransportKind::Unreachable => "unreachable",
            TransportKind::Other => "request failed",
        };
        write!(f, "{s}")
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from local file access (uploads, config files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// The server responded, but the body did not match the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request failed at the HTTP level.
    #[error("Transport error ({kind}): {message}")]
    Transport {
        kind: TransportKind,
        message: String,
    },

    /// Input rejected locally before any request was issued.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Shorthand for a transport error with the given classification.
    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        AppError::Transport {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return AppError::MalformedResponse(err.to_string());
        }
        let kind = if err.is_connect() || err.is_timeout() {
            TransportKind::Unreachable
        } else {
            match err.status() {
                Some(s) if s.as_u16() == 404 => TransportKind::NotFound,
                Some(s) if s.is_server_error() => TransportKind::ServerError,
                _ => TransportKind::Other,
            }
        };
        AppError::Transport {
            kind,
            message: err.to_string(),
        }
    }
}

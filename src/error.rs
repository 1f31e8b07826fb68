use thiserror::Error;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum QrisError {
    #[error("invalid date format: {0:?} (expected YYYYMMDD or YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("missing cookie header; provide --cookie, MANDIRI_COOKIE, or an env file entry")]
    MissingCookie,

    #[error("failed to parse any cookies from the supplied cookie string")]
    UnparsableCookie,

    #[error("missing required header values: {}", .0.join(", "))]
    MissingSecrets(Vec<&'static str>),

    #[error("invalid value for the {0} header")]
    InvalidHeaderValue(&'static str),

    #[error("the refresh endpoint requires the session-item header value")]
    MissingSessionItem,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected http status: {0}")]
    Status(reqwest::StatusCode),

    #[error("unexpected refresh response (non-json): {0:?}")]
    RefreshBody(String),

    #[error("refresh response did not include a result token; cannot update secret-token")]
    MissingRefreshToken,

    #[error("transaction response was not valid json")]
    InvalidResponse,

    #[error("failed to read env file {}: {}", .path.display(), .source)]
    EnvFile { path: PathBuf, source: io::Error },

    #[error("failed to write output to {}: {}", .path.display(), .source)]
    Output { path: PathBuf, source: io::Error },

    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

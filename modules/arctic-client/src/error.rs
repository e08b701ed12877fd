use thiserror::Error;

pub type Result<T> = std::result::Result<T, ArcticError>;

/// Every way a search request can fail, classified by origin.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArcticError {
    #[error("Could not connect to Arctic Shift: {0}")]
    Transport(String),

    #[error("Request timed out. Try again or reduce time window.")]
    Timeout,

    #[error("Subreddit not found. Check spelling.")]
    NotFound,

    #[error("Access forbidden.")]
    Forbidden,

    #[error("Bad request. Check subreddit name.{}", detail_suffix(.detail))]
    BadRequest { detail: Option<String> },

    #[error("Rate limited{}. Try again later.", retry_suffix(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("Arctic Shift service temporarily unavailable. Try again later.")]
    Unavailable { status: u16 },

    #[error("Request timed out. Try reducing the time window.")]
    GatewayTimeout,

    #[error("Arctic Shift returned HTTP {status}.")]
    UnexpectedStatus { status: u16 },

    #[error("Unexpected response format: {0}")]
    Format(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(" ({d})"),
        _ => String::new(),
    }
}

fn retry_suffix(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

impl ArcticError {
    /// HTTP status that produced this error, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ArcticError::NotFound => Some(404),
            ArcticError::Forbidden => Some(403),
            ArcticError::BadRequest { .. } => Some(400),
            ArcticError::RateLimited { .. } => Some(429),
            ArcticError::Unavailable { status } | ArcticError::UnexpectedStatus { status } => {
                Some(*status)
            }
            ArcticError::GatewayTimeout => Some(504),
            ArcticError::Transport(_) | ArcticError::Timeout | ArcticError::Format(_) => None,
        }
    }

    /// Upstream is shedding load. Further requests in the same scan would fail too.
    pub fn is_overload(&self) -> bool {
        matches!(
            self,
            ArcticError::RateLimited { .. }
                | ArcticError::Unavailable { .. }
                | ArcticError::GatewayTimeout
        )
    }

    /// Upstream rejected the query itself; a wider window will not change the answer.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            ArcticError::NotFound | ArcticError::Forbidden | ArcticError::BadRequest { .. }
        )
    }

    /// Suggested wait before retrying, when upstream supplied one.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            ArcticError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ArcticError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ArcticError::Timeout
        } else if err.is_decode() {
            ArcticError::Format(err.to_string())
        } else {
            ArcticError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ArcticError {
    fn from(err: serde_json::Error) -> Self {
        ArcticError::Format(err.to_string())
    }
}

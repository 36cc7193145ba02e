use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbInfraError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The server is not (yet) accepting connections. The only retryable kind.
    #[error("Database unavailable: {detail}")]
    Unavailable { detail: String },

    #[error("Database error: {detail}")]
    Db { detail: String },

    #[error("Readiness wait cancelled after {elapsed_ms}ms ({attempts} attempts)")]
    Cancelled { elapsed_ms: u128, attempts: u32 },

    #[error(
        "Database still unavailable after {elapsed_ms}ms ({attempts} attempts): {last_error}"
    )]
    DeadlineExceeded {
        elapsed_ms: u128,
        attempts: u32,
        last_error: String,
    },
}

impl DbInfraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable {
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            detail: detail.into(),
        }
    }

    /// True for operational failures that mean "not ready yet".
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use tracing::{debug, trace};

use crate::config::db::ConnSpec;
use crate::error::DbInfraError;

/// One connection attempt against the dependency being waited on.
///
/// Implementations return [`DbInfraError::Unavailable`] for "not ready yet"
/// and any other variant for failures that retrying cannot fix.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn probe(&self) -> Result<(), DbInfraError>;

    /// Where the probe connects to, for log lines. Never includes secrets.
    fn target(&self) -> String;
}

/// Probes Postgres by opening a single connection and closing it right away.
pub struct PgProbe {
    options: PgConnectOptions,
    target: String,
}

impl PgProbe {
    pub fn new(spec: &ConnSpec) -> Self {
        let mut options = PgConnectOptions::new_without_pgpass()
            .host(&spec.host)
            .port(spec.port)
            .username(&spec.user)
            .database(&spec.db_name)
            .application_name("wait-for-db");
        if let Some(password) = &spec.password {
            options = options.password(password);
        }

        Self {
            options,
            target: spec.sanitized_url(),
        }
    }
}

#[async_trait]
impl ReadinessProbe for PgProbe {
    async fn probe(&self) -> Result<(), DbInfraError> {
        let conn = PgConnection::connect_with(&self.options)
            .await
            .map_err(classify_connect_error)?;
        trace!(target_url = %self.target, "probe connection established");

        if let Err(e) = conn.close().await {
            debug!(error = %e, "closing probe connection returned error (ignored)");
        }
        Ok(())
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

/// SQLSTATEs a server sends while it cannot take connections yet.
pub fn is_unavailable_sqlstate(code: &str) -> bool {
    code.starts_with("08") || matches!(code, "57P01" | "57P02" | "57P03" | "53300")
}

/// Sort driver errors into "not reachable yet" and everything else.
pub fn classify_connect_error(err: sqlx::Error) -> DbInfraError {
    match &err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut => DbInfraError::unavailable(err.to_string()),
        sqlx::Error::Database(db_err)
            if matches!(db_err.code().as_deref(), Some(code) if is_unavailable_sqlstate(code)) =>
        {
            DbInfraError::unavailable(err.to_string())
        }
        _ => DbInfraError::db(err.to_string()),
    }
}

use std::ffi::OsString;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use db_infra::db::ConnSpec;
use db_infra::{DbInfraError, ReadinessPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "wait-for-db")]
#[command(version)]
#[command(about = "Wait until Postgres accepts connections, then exec a command")]
#[command(
    long_about = "Wait until Postgres accepts connections, then exec a command.\n\n\
Connection settings come from POSTGRES_HOST, POSTGRES_PORT, POSTGRES_DB, \
POSTGRES_USER and POSTGRES_PASSWORD. The command replaces this process and \
receives its arguments unchanged."
)]
pub struct Cli {
    /// Database host, overrides POSTGRES_HOST
    #[arg(long)]
    pub host: Option<String>,

    /// Database port, overrides POSTGRES_PORT
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Database name, overrides POSTGRES_DB
    #[arg(long)]
    pub dbname: Option<String>,

    /// Database user, overrides POSTGRES_USER
    #[arg(long)]
    pub user: Option<String>,

    /// Fixed delay between connection attempts
    #[arg(
        long,
        env = "DB_WAIT_INTERVAL_MS",
        default_value_t = 1000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval_ms: u64,

    /// Log the underlying error once the wait has lasted longer than this
    #[arg(long, env = "DB_WAIT_WARN_AFTER_SECS", default_value_t = 30)]
    pub warn_after_secs: u64,

    /// Upper bound for a single connection attempt
    #[arg(
        long,
        env = "DB_WAIT_CONNECT_TIMEOUT_MS",
        default_value_t = 5000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub connect_timeout_ms: u64,

    /// Give up and exit non-zero after this long (default: wait forever)
    #[arg(long, env = "DB_WAIT_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Log output format
    #[arg(long, value_enum, env = "DB_WAIT_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Command to exec once the database is reachable
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<OsString>,
}

impl Cli {
    /// Connection settings from the environment with command-line overrides applied.
    pub fn conn_spec(&self) -> Result<ConnSpec, DbInfraError> {
        Ok(self.apply_overrides(ConnSpec::from_env()?))
    }

    pub fn apply_overrides(&self, mut spec: ConnSpec) -> ConnSpec {
        if let Some(host) = &self.host {
            spec.host = host.clone();
        }
        if let Some(port) = self.port {
            spec.port = port;
        }
        if let Some(dbname) = &self.dbname {
            spec.db_name = dbname.clone();
        }
        if let Some(user) = &self.user {
            spec.user = user.clone();
        }
        spec
    }

    pub fn policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            retry_interval: Duration::from_millis(self.interval_ms),
            unrecoverable_after: Duration::from_secs(self.warn_after_secs),
            attempt_timeout: Duration::from_millis(self.connect_timeout_ms),
            deadline: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

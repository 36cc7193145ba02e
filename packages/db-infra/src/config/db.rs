use std::env;
use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::DbInfraError;

/// Characters that must be escaped inside the userinfo and path of a URL.
const URL_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b']');

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "managehub_db";
pub const DEFAULT_USER: &str = "postgres";

/// Connection parameters for the Postgres service the application depends on.
///
/// The variable names and defaults match the ones the Django settings read,
/// so the gate and the application always agree on where the database lives.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnSpec {
    pub host: String,
    pub port: u16,
    pub db_name: String,
    pub user: String,
    pub password: Option<String>,
}

impl ConnSpec {
    /// Build from `POSTGRES_HOST`, `POSTGRES_PORT`, `POSTGRES_DB`,
    /// `POSTGRES_USER` and `POSTGRES_PASSWORD`.
    pub fn from_env() -> Result<Self, DbInfraError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbInfraError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = non_empty(lookup("POSTGRES_HOST")).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match non_empty(lookup("POSTGRES_PORT")) {
            Some(raw) => parse_port(&raw)?,
            None => DEFAULT_PORT,
        };
        let db_name =
            non_empty(lookup("POSTGRES_DB")).unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        let user = non_empty(lookup("POSTGRES_USER")).unwrap_or_else(|| DEFAULT_USER.to_string());
        let password = lookup("POSTGRES_PASSWORD");

        Ok(Self {
            host,
            port,
            db_name,
            user,
            password,
        })
    }

    /// Connection URL with the password masked, safe for log lines.
    pub fn sanitized_url(&self) -> String {
        let user = utf8_percent_encode(&self.user, URL_COMPONENT);
        let db_name = utf8_percent_encode(&self.db_name, URL_COMPONENT);
        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };

        match self.password {
            Some(_) => format!("postgresql://{user}:***@{host}:{}/{db_name}", self.port),
            None => format!("postgresql://{user}@{host}:{}/{db_name}", self.port),
        }
    }
}

// Keeps the password out of `{:?}` output.
impl fmt::Debug for ConnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnSpec")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_name", &self.db_name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

pub fn parse_port(raw: &str) -> Result<u16, DbInfraError> {
    match raw.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(DbInfraError::config(format!(
            "POSTGRES_PORT must be a port number between 1 and 65535, got: '{raw}'"
        ))),
        Ok(port) => Ok(port),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

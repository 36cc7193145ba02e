//! Database readiness infrastructure: connection settings, the Postgres
//! probe, and the wait loop used by the `wait-for-db` gate.

pub mod config;
pub mod error;
pub mod infra;

pub use config::db;
pub use error::DbInfraError;
pub use infra::db::{
    classify_connect_error, wait_until_ready, PgProbe, Readiness, ReadinessPolicy, ReadinessProbe,
};

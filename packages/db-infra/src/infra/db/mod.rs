pub mod probe;
pub mod readiness;

pub use probe::{classify_connect_error, is_unavailable_sqlstate, PgProbe, ReadinessProbe};
pub use readiness::{wait_until_ready, Readiness, ReadinessPolicy};

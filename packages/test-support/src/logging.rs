//! Test logging for the workspace's test binaries.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

/// Workspace crates report progress at `info`; everything else stays quiet.
pub const DEFAULT_TEST_FILTER: &str = "warn,db_infra=info,wait_for_db=info,sqlx=warn";

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Filter directives from `TEST_LOG`, then `RUST_LOG`, then
/// [`DEFAULT_TEST_FILTER`].
pub fn filter_directives() -> String {
    std::env::var("TEST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_TEST_FILTER.to_string())
}

/// Install the global test subscriber once. Safe to call from every test
/// binary's constructor; never panics if a subscriber already exists.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        fmt()
            .with_env_filter(EnvFilter::new(filter_directives()))
            .with_test_writer()
            .without_time()
            .with_target(false)
            .try_init()
            .ok();
    });
}

//! `wait-for-db`: block container startup until Postgres accepts connections,
//! then exec the real entrypoint.

pub mod cli;
pub mod handoff;
pub mod signals;
pub mod telemetry;

use db_infra::{wait_until_ready, DbInfraError, PgProbe, Readiness};
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::cli::Cli;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_CANCELLED: i32 = 130;

/// Written to stderr exactly once, right before the hand-off. Not subject to
/// `RUST_LOG`.
pub const AVAILABLE_NOTICE: &str = "Postgres is available";

/// Exit status for a wait that did not end in readiness.
pub fn exit_code_for(err: &DbInfraError) -> i32 {
    match err {
        DbInfraError::Config { .. } => EXIT_USAGE,
        DbInfraError::Cancelled { .. } => EXIT_CANCELLED,
        DbInfraError::Unavailable { .. }
        | DbInfraError::Db { .. }
        | DbInfraError::DeadlineExceeded { .. } => EXIT_FAILURE,
    }
}

/// A signal that lands after the last attempt succeeded still wins over the
/// hand-off.
pub fn settle_wait(
    result: Result<Readiness, DbInfraError>,
    cancelled: bool,
) -> Result<Readiness, DbInfraError> {
    match result {
        Ok(readiness) if cancelled => Err(DbInfraError::Cancelled {
            elapsed_ms: readiness.elapsed.as_millis(),
            attempts: readiness.attempts,
        }),
        other => other,
    }
}

/// Wait for the database, then hand off to the command. Returns the exit
/// status to use if the process was not replaced.
pub fn run(cli: Cli) -> i32 {
    let spec = match cli.conn_spec() {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("❌ {e}");
            return exit_code_for(&e);
        }
    };
    let policy = cli.policy();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ failed to start async runtime: {e}");
            return EXIT_FAILURE;
        }
    };

    let waited = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let listener = signals::spawn_shutdown_listener(cancel.clone());
        let probe = PgProbe::new(&spec);

        let result = wait_until_ready(&probe, &policy, &cancel).await;
        // Let the listener observe a signal that is already pending.
        tokio::task::yield_now().await;
        listener.abort();
        settle_wait(result, cancel.is_cancelled())
    });
    // The runtime must be gone before exec. A signal arriving between here
    // and exec is still delivered to tokio's handler and lost.
    drop(runtime);

    if let Err(e) = waited {
        eprintln!("Database wait failed: {e}");
        return exit_code_for(&e);
    }
    eprintln!("{AVAILABLE_NOTICE}");

    match handoff::hand_off(&cli.command) {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "handoff=failed");
            e.exit_code()
        }
    }
}

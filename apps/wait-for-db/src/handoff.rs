//! Replacing the gate with the wrapped command.

use std::ffi::{OsStr, OsString};
use std::io;
use std::process::Command;

use thiserror::Error;

/// Shell convention for "command not found".
pub const EXIT_NOT_FOUND: i32 = 127;
/// Shell convention for "found but not executable".
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("failed to exec '{program}': {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl HandoffError {
    pub fn exit_code(&self) -> i32 {
        match self {
            HandoffError::Exec { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                EXIT_NOT_FOUND
            }
            HandoffError::Exec { .. } => EXIT_NOT_EXECUTABLE,
        }
    }
}

/// `argv[0]` is looked up on `PATH`; the rest are passed through untouched.
/// Standard streams are inherited.
pub fn build_command(argv: &[OsString]) -> Option<Command> {
    let (program, args) = argv.split_first()?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Some(cmd)
}

/// Hand the process over to `argv`.
///
/// On unix this only returns if `exec` failed. An empty `argv` has nothing to
/// run and yields exit code 0.
pub fn hand_off(argv: &[OsString]) -> Result<i32, HandoffError> {
    let Some(mut cmd) = build_command(argv) else {
        return Ok(0);
    };
    run(&mut cmd, &argv[0])
}

#[cfg(unix)]
fn run(cmd: &mut Command, program: &OsStr) -> Result<i32, HandoffError> {
    use std::os::unix::process::CommandExt;

    let source = cmd.exec();
    Err(HandoffError::Exec {
        program: program.to_string_lossy().into_owned(),
        source,
    })
}

// No exec on this platform: run the child to completion and forward its status.
#[cfg(not(unix))]
fn run(cmd: &mut Command, program: &OsStr) -> Result<i32, HandoffError> {
    let status = cmd.status().map_err(|source| HandoffError::Exec {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;
    Ok(status.code().unwrap_or(1))
}

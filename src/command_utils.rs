use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;

use crate::error::CloneAsError;

fn describe<S: AsRef<OsStr>>(cmd: &str, args: &[S]) -> String {
    let mut line = cmd.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Execute a command with debug logging, optionally inside `cwd`.
pub fn execute_command<S: AsRef<OsStr>>(
    cmd: &str,
    args: &[S],
    cwd: Option<&Path>,
) -> Result<Output, CloneAsError> {
    let line = describe(cmd, args);
    match cwd {
        Some(dir) => debug!("Executing command: {} (in {})", line, dir.display()),
        None => debug!("Executing command: {}", line),
    }

    let mut command = Command::new(cmd);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command.output().map_err(|source| CloneAsError::CommandSpawn {
        command: line.clone(),
        source,
    })?;

    if output.status.success() {
        debug!("Command succeeded: {}", line);
    } else {
        debug!(
            "Command failed: {} (exit code: {:?})",
            line,
            output.status.code()
        );
    }
    if !output.stdout.is_empty() {
        debug!("stdout: {}", String::from_utf8_lossy(&output.stdout).trim());
    }
    if !output.stderr.is_empty() {
        debug!("stderr: {}", String::from_utf8_lossy(&output.stderr).trim());
    }

    Ok(output)
}

/// Like [`execute_command`], but a non-zero exit status becomes
/// [`CloneAsError::ExternalCommandFailed`].
pub fn run_checked<S: AsRef<OsStr>>(
    cmd: &str,
    args: &[S],
    cwd: Option<&Path>,
) -> Result<Output, CloneAsError> {
    let output = execute_command(cmd, args, cwd)?;

    if !output.status.success() {
        return Err(CloneAsError::ExternalCommandFailed {
            command: describe(cmd, args),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output)
}

//! Piped execution: run a subtree with its output captured, then feed the
//! captured bytes to an external shell command's stdin.
//!
//! The child inherits the terminal for stdout and stderr, so pagers and
//! filters behave normally. The feeding happens on a worker thread while the
//! foreground waits for the child to exit; Ctrl-C during that wait goes to
//! the child (the console ignores SIGINT at the process level), so an
//! interrupted pager ends the pipe cleanly instead of killing the console.

use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use log::debug;

use crate::context::Context;
use crate::error::CommandError;
use crate::tree::Node;

/// Context binding name for the raw shell command line.
pub const SHELL_CMD: &str = "shell-cmd";

/// Execute `inner` with output captured and pipe the capture into `cmd_line`
/// run under the system shell.
pub(crate) fn run<V>(
    inner: &Node<V>,
    ctx: &mut Context<V>,
    cmd_line: &str,
) -> Result<(), CommandError> {
    // Resolve the executable before running anything, so a typo'd command
    // reports cleanly instead of surfacing as a broken pipe mid-write.
    let exe = cmd_line.split_whitespace().next().unwrap_or(cmd_line);
    if resolve_on_path(exe).is_none() {
        return Err(CommandError::ShellCommandNotFound(exe.to_string()));
    }

    let saved = ctx.begin_capture();
    let result = inner.execute(ctx, None);
    let captured = ctx.end_capture(saved);
    result?;

    let (shell, flag) = shell_command();
    debug!("piping {} bytes into {} {} {:?}", captured.len(), shell, flag, cmd_line);
    let mut child = Command::new(shell)
        .arg(flag)
        .arg(cmd_line)
        .stdin(Stdio::piped())
        .spawn()?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| CommandError::Failed("no stdin handle on shell child".to_string()))?;

    let writer = thread::spawn(move || -> std::io::Result<()> {
        stdin.write_all(&captured)?;
        stdin.flush()
    });

    // The child owns the terminal until it exits. A nonzero exit status is
    // the command's business, not an error here.
    let status = child.wait()?;
    debug!("shell child exited with {}", status);

    match writer.join() {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(CommandError::Failed(format!(
            "Writing to shell command '{}' failed: {}",
            exe, err
        ))),
        Err(_) => Err(CommandError::Failed(
            "shell pipe writer thread panicked".to_string(),
        )),
    }
}

/// Locate `exe` the way the shell will: as given when it contains a path
/// separator, otherwise by scanning PATH.
fn resolve_on_path(exe: &str) -> Option<PathBuf> {
    let candidate = Path::new(exe);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(exe))
        .find(|full| is_executable(full))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(unix)]
fn shell_command() -> (&'static str, &'static str) {
    ("sh", "-c")
}

#[cfg(not(unix))]
fn shell_command() -> (&'static str, &'static str) {
    ("cmd", "/C")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_common_shell_utilities() {
        assert!(resolve_on_path("sh").is_some());
        assert!(resolve_on_path("definitely-not-a-real-command-p9q").is_none());
    }

    #[test]
    fn explicit_path_bypasses_path_scan() {
        assert!(resolve_on_path("/bin/sh").is_some());
        assert!(resolve_on_path("/bin/definitely-not-real").is_none());
    }
}

//! Git command runner abstraction
//!
//! Every git invocation made by the gateway goes through [`CommandRunner`], so
//! the execution strategy can be swapped (e.g. a recording runner in tests)
//! without touching the operations built on top of it.

use std::borrow::Cow;
use std::path::Path;
use std::process::Command;

use shell_escape::escape;
use tracing::{debug, trace};

use crate::error::{FlowError, Result};

/// Captured, trimmed output of a successful git invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes git subcommands in a working directory.
pub trait CommandRunner {
    /// Run `git <args>` in `cwd`.
    ///
    /// A nonzero exit status is reported as [`FlowError::GitCommandFailed`]
    /// carrying the captured stderr.
    fn run(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput>;

    /// Run a command and return true if it exited successfully.
    ///
    /// Swallows both spawn failures and nonzero exits. Use this for checks
    /// like `rev-parse --verify`.
    fn succeeds(&self, args: &[&str], cwd: &Path) -> bool {
        self.run(args, cwd).is_ok()
    }
}

/// Runs the `git` executable found on `PATH`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemGit;

impl CommandRunner for SystemGit {
    fn run(&self, args: &[&str], cwd: &Path) -> Result<CommandOutput> {
        let command = render_command(args);
        debug!(%command, cwd = %cwd.display(), "running git");

        let output = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .output()
            .map_err(|source| FlowError::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            debug!(%command, code = ?output.status.code(), %stderr, "git failed");
            return Err(FlowError::GitCommandFailed {
                command,
                stderr,
                code: output.status.code(),
            });
        }

        trace!(%command, %stdout, "git succeeded");
        Ok(CommandOutput { stdout, stderr })
    }
}

/// Render a git invocation as a shell-safe command line for logs and errors.
pub fn render_command(args: &[&str]) -> String {
    let mut line = String::from("git");
    for arg in args {
        line.push(' ');
        line.push_str(&escape(Cow::Borrowed(*arg)));
    }
    line
}

/// Check that a git executable is reachable.
pub fn check_git_available() -> Result<()> {
    which::which("git").map_err(|e| FlowError::Spawn {
        command: "git".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
    })?;
    Ok(())
}

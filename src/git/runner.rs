use std::{
    ffi::{OsStr, OsString},
    fmt::{Debug, Display, Formatter},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use log::trace;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("Could not run `{command}` in {}: {source}", .dir.display())]
    Spawn {
        command: String,
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("`{command}` in {} failed ({status}): {stderr}", .dir.display())]
    Exit {
        command: String,
        dir: PathBuf,
        status: String,
        stderr: String,
    },
}

/// One git invocation. Every registered secret is masked whenever the
/// command is displayed or debug-printed, and in the stderr of a failed run.
#[derive(Clone, PartialEq, Eq)]
pub struct GitCommand {
    args: Vec<OsString>,
    secrets: Vec<String>,
}

impl GitCommand {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        GitCommand {
            args: args.into_iter().map(|a| a.as_ref().to_owned()).collect(),
            secrets: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Registers a value to mask. A credential embedded in a URL should be
    /// registered both raw and in its percent-encoded form.
    pub fn secret(mut self, secret: Option<&str>) -> Self {
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            if !self.secrets.iter().any(|known| known == secret) {
                self.secrets.push(secret.to_owned());
                // Longest first, so a secret containing another is masked whole.
                self.secrets.sort_by_key(|known| std::cmp::Reverse(known.len()));
            }
        }
        self
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    fn mask(&self, text: &str) -> String {
        self.secrets
            .iter()
            .fold(text.to_owned(), |text, secret| text.replace(secret.as_str(), "***"))
    }
}

impl Display for GitCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut line = String::from("git");
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        f.write_str(&self.mask(&line))
    }
}

impl Debug for GitCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCommand")
            .field("command", &self.to_string())
            .field("secrets", &self.secrets.len())
            .finish()
    }
}

/// Runs a single external git command to completion.
pub trait GitRunner {
    fn run(&self, dir: &Path, command: &GitCommand) -> Result<(), GitError>;
}

impl<R: GitRunner + ?Sized> GitRunner for &R {
    fn run(&self, dir: &Path, command: &GitCommand) -> Result<(), GitError> {
        (**self).run(dir, command)
    }
}

/// [`GitRunner`] backed by the system `git` binary.
#[derive(Debug, Clone)]
pub struct GitCli {
    git_path: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        GitCli {
            git_path: PathBuf::from("git"),
        }
    }

    /// Never prompt for credentials and never block on stdin.
    fn command(&self, dir: &Path) -> Command {
        let mut cmd = Command::new(&self.git_path);
        cmd.current_dir(dir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());
        cmd
    }
}

impl GitRunner for GitCli {
    fn run(&self, dir: &Path, command: &GitCommand) -> Result<(), GitError> {
        trace!("Running `{}` in {}", command, dir.display());

        let output = self
            .command(dir)
            .args(command.args())
            .output()
            .map_err(|source| GitError::Spawn {
                command: command.to_string(),
                dir: dir.to_path_buf(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(GitError::Exit {
                command: command.to_string(),
                dir: dir.to_path_buf(),
                status: output.status.to_string(),
                stderr: command.mask(stderr.trim()),
            })
        }
    }
}

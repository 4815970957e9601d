use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use log::{debug, trace};
use thiserror::Error;

use super::{checkout, is_working_copy, GitCommand, GitError, GitRunner};

/// Steps of the synchronization protocol whose failure aborts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Reset,
    Clean,
    Fetch,
    Checkout,
}

impl Display for SyncStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStep::Reset => f.write_str("reset"),
            SyncStep::Clean => f.write_str("clean"),
            SyncStep::Fetch => f.write_str("fetch"),
            SyncStep::Checkout => f.write_str("checkout"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{} is not a git working copy", .path.display())]
    NotAWorkingCopy { path: PathBuf },
    #[error("Synchronizing {} failed at the {step} step: {source}", .path.display())]
    Step {
        step: SyncStep,
        path: PathBuf,
        source: GitError,
    },
}

/// Outcome of a step whose failure is tolerated.
#[must_use]
#[derive(Debug)]
pub enum BestEffort {
    Applied,
    Skipped(GitError),
}

/// Brings the working copy at `path` to a clean state exactly at `revision`.
///
/// The revision is never classified. The branch workflow (rebase onto the
/// upstream) is always attempted and allowed to fail, which covers tags,
/// commit hashes, detached heads and branches without an upstream. The
/// forced checkout always runs last.
pub fn synchronize<R>(runner: &R, path: &Path, revision: &str) -> Result<(), SyncError>
where
    R: GitRunner + ?Sized,
{
    if !is_working_copy(path) {
        return Err(SyncError::NotAWorkingCopy {
            path: path.to_path_buf(),
        });
    }

    debug!("Synchronizing {} to {}", path.display(), revision);

    run_step(runner, path, SyncStep::Reset, &["reset", "--hard", "--quiet"])?;
    run_step(
        runner,
        path,
        SyncStep::Clean,
        &["clean", "-d", "--force", "--quiet"],
    )?;
    run_step(runner, path, SyncStep::Fetch, &["fetch", "--prune", "--quiet"])?;

    // Not fatal: fails whenever HEAD is detached or has no upstream.
    match advance_branch(runner, path) {
        BestEffort::Applied => trace!("Advanced current branch of {}", path.display()),
        BestEffort::Skipped(error) => debug!(
            "Not advancing current branch of {}: {}",
            path.display(),
            error
        ),
    }

    runner
        .run(path, &checkout(revision))
        .map_err(|source| SyncError::Step {
            step: SyncStep::Checkout,
            path: path.to_path_buf(),
            source,
        })
}

/// Rebases the current branch onto its upstream counterpart. A failed rebase
/// is aborted so the next forced checkout starts from a plain state.
pub fn advance_branch<R>(runner: &R, path: &Path) -> BestEffort
where
    R: GitRunner + ?Sized,
{
    match runner.run(
        path,
        &GitCommand::new(["rebase", "--quiet", "@{upstream}"]),
    ) {
        Ok(()) => BestEffort::Applied,
        Err(error) => {
            if let Err(abort) = runner.run(path, &GitCommand::new(["rebase", "--abort"])) {
                trace!("Nothing to abort in {}: {}", path.display(), abort);
            }
            BestEffort::Skipped(error)
        }
    }
}

fn run_step<R>(runner: &R, path: &Path, step: SyncStep, args: &[&str]) -> Result<(), SyncError>
where
    R: GitRunner + ?Sized,
{
    runner
        .run(path, &GitCommand::new(args))
        .map_err(|source| SyncError::Step {
            step,
            path: path.to_path_buf(),
            source,
        })
}

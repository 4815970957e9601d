//! Git plumbing used by the acquisition engine.
//!
//! Every mutating operation shells out to the `git` binary through a
//! [`GitRunner`], which keeps shallow clones and forced checkouts identical to
//! what a user would run by hand. libgit2 is only used to probe whether a
//! directory holds a working copy.

mod clone;
mod remote;
mod runner;
mod sync;

use std::{ffi::OsStr, path::Path};

use git2::{Repository, RepositoryOpenFlags};
use log::trace;

pub use clone::{clone_repo, CloneError, CloneStep};
pub use remote::{Remote, RemoteError, DEFAULT_REMOTE};
pub use runner::{GitCli, GitCommand, GitError, GitRunner};
pub use sync::{advance_branch, synchronize, BestEffort, SyncError, SyncStep};

/// True if `path` itself is the root of a non-bare git working copy.
/// Parent directories are not searched.
pub fn is_working_copy(path: &Path) -> bool {
    match Repository::open_ext(
        path,
        RepositoryOpenFlags::NO_SEARCH,
        std::iter::empty::<&OsStr>(),
    ) {
        Ok(repo) => !repo.is_bare(),
        Err(error) => {
            trace!("No working copy at {}: {}", path.display(), error);
            false
        }
    }
}

/// Forced, non-interactive positioning at `revision`.
fn checkout(revision: &str) -> GitCommand {
    GitCommand::new(["checkout", "--force", "--quiet"]).arg(revision)
}

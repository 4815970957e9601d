use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
};

use log::debug;
use thiserror::Error;

use crate::model::Request;

use super::{checkout, GitCommand, GitError, GitRunner, Remote, RemoteError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneStep {
    Clone,
    Checkout,
}

impl Display for CloneStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CloneStep::Clone => f.write_str("clone"),
            CloneStep::Checkout => f.write_str("checkout"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CloneError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("Invalid clone destination {}", .path.display())]
    BadDestination { path: PathBuf },
    #[error("Could not create {}: {source}", .path.display())]
    IO {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Cloning into {} failed at the {step} step: {source}", .path.display())]
    Step {
        step: CloneStep,
        path: PathBuf,
        source: GitError,
    },
}

/// Retrieves the requested repository into `destination` and positions it at
/// the requested revision. `destination` must not hold a working copy yet;
/// it and its parents are created as needed.
pub fn clone_repo<R>(
    runner: &R,
    remote: &Remote,
    request: &Request,
    destination: &Path,
) -> Result<(), CloneError>
where
    R: GitRunner + ?Sized,
{
    let url = remote.repository_url(
        request.account(),
        request.repository(),
        request.credential(),
    )?;

    let (parent, name) = match (destination.parent(), destination.file_name()) {
        (Some(parent), Some(name)) => (parent, name),
        _ => {
            return Err(CloneError::BadDestination {
                path: destination.to_path_buf(),
            })
        }
    };
    std::fs::create_dir_all(parent).map_err(|source| CloneError::IO {
        path: parent.to_path_buf(),
        source,
    })?;

    debug!("Cloning {} into {}", request, destination.display());

    let mut clone = GitCommand::new(["clone", "--quiet"]);
    if let Some(depth) = request.depth() {
        clone = clone.arg("--depth").arg(depth.to_string());
    }
    // The url carries the credential percent-encoded, so mask both forms.
    let clone = clone
        .arg(url.as_str())
        .arg(name)
        .secret(request.credential())
        .secret(Some(url.username()));

    runner
        .run(parent, &clone)
        .map_err(|source| CloneError::Step {
            step: CloneStep::Clone,
            path: destination.to_path_buf(),
            source,
        })?;

    runner
        .run(destination, &checkout(request.revision()))
        .map_err(|source| CloneError::Step {
            step: CloneStep::Checkout,
            path: destination.to_path_buf(),
            source,
        })
}

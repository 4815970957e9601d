//! Cache-aware acquisition of working copies.
//!
//! Layout under the cache root:
//!
//! ```text
//! <root>/<account>/<repository>   cache slot, reused across calls
//! <root>/<account>/<unique-id>    one-off clone, owned by the caller
//! ```
//!
//! Nothing here serializes access to a cache slot. Callers running several
//! acquisitions for the same repository at once must do that themselves.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    git::{
        clone_repo, is_working_copy, synchronize, CloneError, GitCli, GitRunner, Remote,
        SyncError,
    },
    model::{CacheMode, Request},
};

#[derive(Error, Debug)]
#[error("Could not allocate a unique clone directory name: {0}")]
pub struct AllocatorError(pub String);

/// Source of fresh directory names for uncached clones.
pub trait IdAllocator {
    fn allocate(&self) -> Result<String, AllocatorError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn allocate(&self) -> Result<String, AllocatorError> {
        Ok(Uuid::new_v4().to_string())
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache location {location} is not a directory")]
    BadLocation { location: String },
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AcquireError {
    #[error(transparent)]
    Allocator(#[from] AllocatorError),
    #[error(
        "Cache {} already holds a working copy, reuse it with require_existing or use_if_available",
        .path.display()
    )]
    CacheExists { path: PathBuf },
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Clone(#[from] CloneError),
}

/// Produces working copies under a cache root, honoring the request's
/// [`CacheMode`].
pub struct CloneFactory<R = GitCli, A = UuidAllocator> {
    workdir: PathBuf,
    remote: Remote,
    runner: R,
    allocator: A,
}

impl CloneFactory {
    pub fn with_defaults(workdir: PathBuf, remote: Remote) -> Result<Self, CacheError> {
        Self::new(workdir, remote, GitCli::new(), UuidAllocator)
    }
}

impl<R, A> CloneFactory<R, A>
where
    R: GitRunner,
    A: IdAllocator,
{
    /// Creates the cache root if it does not exist yet.
    pub fn new(
        workdir: PathBuf,
        remote: Remote,
        runner: R,
        allocator: A,
    ) -> Result<Self, CacheError> {
        if workdir.exists() {
            if !workdir.is_dir() {
                return Err(CacheError::BadLocation {
                    location: workdir.to_string_lossy().to_string(),
                });
            }
        } else {
            std::fs::create_dir_all(&workdir)?;
        }

        Ok(CloneFactory {
            workdir,
            remote,
            runner,
            allocator,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn cache_path(&self, request: &Request) -> PathBuf {
        self.workdir
            .join(request.account())
            .join(request.repository())
    }

    /// Returns the path of a working copy positioned at the requested
    /// revision.
    pub fn acquire(&self, request: &Request) -> Result<PathBuf, AcquireError> {
        debug!(
            "Acquiring {} with cache mode {}",
            request,
            request.cache_mode()
        );

        let path = match request.cache_mode() {
            CacheMode::None => self.clone_no_cache(request),
            CacheMode::CreateIfMissing => self.create_cache(request),
            CacheMode::RequireExisting => self.require_cache(request),
            CacheMode::UseIfAvailable => self.use_cache_if_available(request),
        }?;

        info!("Working copy for {} is ready at {}", request, path.display());
        Ok(path)
    }

    fn clone_no_cache(&self, request: &Request) -> Result<PathBuf, AcquireError> {
        let id = self.allocator.allocate()?;
        let path = self.workdir.join(request.account()).join(id);

        clone_repo(&self.runner, &self.remote, request, &path)?;

        Ok(path)
    }

    fn create_cache(&self, request: &Request) -> Result<PathBuf, AcquireError> {
        let path = self.cache_path(request);
        if is_working_copy(&path) {
            return Err(AcquireError::CacheExists { path });
        }

        clone_repo(&self.runner, &self.remote, request, &path)?;

        Ok(path)
    }

    fn require_cache(&self, request: &Request) -> Result<PathBuf, AcquireError> {
        let path = self.cache_path(request);

        synchronize(&self.runner, &path, request.revision())?;

        Ok(path)
    }

    fn use_cache_if_available(&self, request: &Request) -> Result<PathBuf, AcquireError> {
        let path = self.cache_path(request);

        match synchronize(&self.runner, &path, request.revision()) {
            Ok(()) => Ok(path),
            Err(error) => {
                warn!(
                    "Cache miss for {}, cloning without cache: {}",
                    request, error
                );
                self.clone_no_cache(request)
            }
        }
    }
}

use std::{error::Error, path::Path, path::PathBuf};

use crate::{
    cache::CloneFactory,
    cli::command_handlers::do_clone,
    model::{Request, RequestOptions},
};

mod builder;

pub use builder::KaminoBuilder;

pub struct Kamino {
    factory: CloneFactory,
}

impl Kamino {
    pub fn builder() -> KaminoBuilder {
        KaminoBuilder::default()
    }

    /// Validates the options and provisions a working copy, returning its path
    pub fn provision(&self, options: RequestOptions) -> Result<PathBuf, Box<dyn Error>> {
        do_clone(&self.factory, options)
    }

    /// Provisions a working copy for an already validated request
    pub fn acquire(&self, request: &Request) -> Result<PathBuf, Box<dyn Error>> {
        Ok(self.factory.acquire(request)?)
    }

    pub fn cache_directory(&self) -> &Path {
        self.factory.workdir()
    }

    /// Stable cache slot for the request's repository, whether populated or not
    pub fn cache_path(&self, request: &Request) -> PathBuf {
        self.factory.cache_path(request)
    }
}

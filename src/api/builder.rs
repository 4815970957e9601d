use std::{env, error::Error, path::PathBuf};

use home::home_dir;

use crate::{cache::CloneFactory, git::Remote, Kamino};

#[derive(Default)]
pub struct KaminoBuilder {
    // Relative cache directories are resolved against `root`
    root: Option<PathBuf>,
    cache_directory_path: Option<PathBuf>,
    remote: Option<String>,
}

impl KaminoBuilder {
    /// Directory relative cache locations are resolved against.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Location of the working copy cache.
    ///
    /// Defaults to `$HOME/.kamino/cache`.
    pub fn cache_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_directory_path = Some(path.into());
        self
    }

    /// Base url repositories are cloned from.
    ///
    /// Defaults to `https://github.com`.
    pub fn remote(mut self, url: impl Into<String>) -> Self {
        self.remote = Some(url.into());
        self
    }

    pub fn try_build(self) -> Result<Kamino, Box<dyn Error>> {
        let Self {
            root,
            cache_directory_path,
            remote,
        } = self;
        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let cache_directory = match cache_directory_path {
            Some(path) => root.join(path),
            None => default_cache_directory()?,
        };

        let remote = match remote {
            Some(url) => Remote::parse(&url)?,
            None => Remote::github(),
        };

        let factory = CloneFactory::with_defaults(cache_directory, remote)?;

        Ok(Kamino { factory })
    }
}

fn default_cache_directory() -> Result<PathBuf, Box<dyn Error>> {
    let mut cache_directory =
        home_dir().ok_or("Could not find home dir. Please define $HOME env variable.")?;
    cache_directory.push(".kamino/cache");
    Ok(cache_directory)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_relative_cache_directory_against_root() {
        let root = tempfile::tempdir().unwrap();

        let kamino = KaminoBuilder::default()
            .root(root.path())
            .cache_directory("cache")
            .try_build()
            .unwrap();

        assert_eq!(kamino.cache_directory(), root.path().join("cache"));
        assert!(root.path().join("cache").is_dir());
    }

    #[test]
    fn keeps_absolute_cache_directory() {
        let root = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();

        let kamino = KaminoBuilder::default()
            .root(root.path())
            .cache_directory(cache.path())
            .try_build()
            .unwrap();

        assert_eq!(kamino.cache_directory(), cache.path());
    }

    #[test]
    fn rejects_invalid_remote() {
        let root = tempfile::tempdir().unwrap();

        let result = KaminoBuilder::default()
            .root(root.path())
            .cache_directory("cache")
            .remote("not a url")
            .try_build();

        assert!(result.is_err());
    }
}

use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use kamino::{
    cache::{AcquireError, CloneFactory},
    git::{synchronize, GitCli, Remote},
    model::RequestOptions,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn git_in(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .current_dir(dir)
        .args([
            "-c",
            "user.name=Kamino Test",
            "-c",
            "user.email=kamino@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("run git");
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8_lossy(&out.stdout).trim().to_string()
}

fn head(path: &Path) -> String {
    let repo = git2::Repository::open(path).expect("open working copy");
    let commit = repo.head().unwrap().peel_to_commit().unwrap();
    commit.id().to_string()
}

/// A bare `acme/widgets` repository with two commits on `main`, served over
/// `file://`, plus a scratch clone used to push more commits.
struct Upstream {
    tmp: TempDir,
    work: PathBuf,
    first: String,
    second: String,
}

impl Upstream {
    fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let bare = tmp.path().join("remotes/acme/widgets");
        let work = tmp.path().join("work");
        fs::create_dir_all(&bare).unwrap();
        fs::create_dir_all(&work).unwrap();

        git_in(&bare, &["init", "--bare", "--quiet"]);
        git_in(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        git_in(&work, &["init", "--quiet"]);
        git_in(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        git_in(&work, &["remote", "add", "origin", bare.to_str().unwrap()]);

        let mut upstream = Upstream {
            tmp,
            work,
            first: String::new(),
            second: String::new(),
        };
        upstream.first = upstream.commit("first");
        upstream.second = upstream.commit("second");
        git_in(&upstream.work, &["tag", "v1", &upstream.first]);
        upstream.push("main");
        git_in(&upstream.work, &["push", "--quiet", "origin", "--tags"]);
        upstream
    }

    fn commit(&self, content: &str) -> String {
        fs::write(self.work.join("README"), content).unwrap();
        git_in(&self.work, &["add", "README"]);
        git_in(&self.work, &["commit", "--quiet", "-m", content]);
        git_in(&self.work, &["rev-parse", "HEAD"])
    }

    fn push(&self, branch: &str) {
        git_in(&self.work, &["push", "--quiet", "origin", branch]);
    }

    fn cache_root(&self) -> PathBuf {
        self.tmp.path().join("cache")
    }

    fn factory(&self) -> CloneFactory {
        let remote = format!("file://{}", self.tmp.path().join("remotes").display());
        CloneFactory::with_defaults(self.cache_root(), Remote::parse(&remote).unwrap()).unwrap()
    }
}

fn request(cache: &str, revision: &str) -> kamino::model::Request {
    RequestOptions::new("acme", "widgets", revision)
        .cache(cache)
        .validate()
        .unwrap()
}

#[test]
fn no_cache_clones_into_fresh_directories() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let request = request("none", &upstream.first);

    let first = factory.acquire(&request).unwrap();
    let second = factory.acquire(&request).unwrap();

    assert_ne!(first, second);
    assert_ne!(first, factory.cache_path(&request));
    assert!(first.starts_with(upstream.cache_root().join("acme")));
    assert_eq!(head(&first), upstream.first);
    assert_eq!(head(&second), upstream.first);
    assert!(!factory.cache_path(&request).exists());
}

#[test]
fn depth_limited_clone_reaches_branch_head() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let request = RequestOptions::new("acme", "widgets", "main")
        .depth("1")
        .validate()
        .unwrap();

    let path = factory.acquire(&request).unwrap();

    assert_eq!(head(&path), upstream.second);
}

#[test]
fn create_populates_cache_path() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let request = request("create", &upstream.first);

    let path = factory.acquire(&request).unwrap();

    assert_eq!(path, upstream.cache_root().join("acme/widgets"));
    assert_eq!(head(&path), upstream.first);
}

#[test]
fn create_resolves_tags() {
    let upstream = Upstream::new();
    let factory = upstream.factory();

    let path = factory.acquire(&request("create", "v1")).unwrap();

    assert_eq!(head(&path), upstream.first);
}

#[test]
fn create_fails_for_unknown_revision() {
    let upstream = Upstream::new();
    let factory = upstream.factory();

    let error = factory
        .acquire(&request("create", "no-such-branch"))
        .unwrap_err();

    assert!(matches!(error, AcquireError::Clone(_)));
}

#[test]
fn create_rejects_existing_cache() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    factory.acquire(&request("create", &upstream.first)).unwrap();

    let error = factory
        .acquire(&request("create", &upstream.second))
        .unwrap_err();

    assert!(matches!(error, AcquireError::CacheExists { .. }));
}

#[test]
fn force_fails_on_empty_cache_root() {
    let upstream = Upstream::new();
    let factory = upstream.factory();

    let result = factory.acquire(&request("force", &upstream.first));

    assert!(result.is_err());
    assert!(!upstream.cache_root().join("acme").exists());
}

#[test]
fn force_moves_existing_cache_to_requested_revision() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    factory
        .acquire(&request("create", &upstream.second))
        .unwrap();

    let path = factory.acquire(&request("force", &upstream.first)).unwrap();

    assert_eq!(path, factory.cache_path(&request("force", &upstream.first)));
    assert_eq!(head(&path), upstream.first);
}

#[test]
fn if_available_reuses_existing_cache() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    factory.acquire(&request("create", &upstream.first)).unwrap();

    let request = request("if_available", &upstream.second);
    let path = factory.acquire(&request).unwrap();

    assert_eq!(path, factory.cache_path(&request));
    assert_eq!(head(&path), upstream.second);
}

#[test]
fn if_available_clones_fresh_without_cache() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let request = request("if_available", &upstream.second);

    let path = factory.acquire(&request).unwrap();

    assert_ne!(path, factory.cache_path(&request));
    assert_eq!(head(&path), upstream.second);
    assert!(!factory.cache_path(&request).exists());
}

#[test]
fn if_available_falls_back_on_broken_cache() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let request = request("if_available", &upstream.first);
    fs::create_dir_all(factory.cache_path(&request)).unwrap();
    fs::write(factory.cache_path(&request).join("junk"), "not a repo").unwrap();

    let path = factory.acquire(&request).unwrap();

    assert_ne!(path, factory.cache_path(&request));
    assert_eq!(head(&path), upstream.first);
}

#[test]
fn cached_branch_follows_upstream() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let cache = factory.acquire(&request("create", "main")).unwrap();
    assert_eq!(head(&cache), upstream.second);
    git_in(&cache, &["config", "user.name", "Kamino Test"]);
    git_in(&cache, &["config", "user.email", "kamino@example.com"]);

    let third = upstream.commit("third");
    upstream.push("main");

    let path = factory.acquire(&request("force", "main")).unwrap();

    assert_eq!(head(&path), third);
}

#[test]
fn cached_copy_checks_out_new_upstream_branch() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    factory.acquire(&request("create", "main")).unwrap();

    git_in(&upstream.work, &["checkout", "--quiet", "-b", "feature"]);
    let feature = upstream.commit("feature work");
    upstream.push("feature");

    let path = factory.acquire(&request("force", "feature")).unwrap();

    assert_eq!(head(&path), feature);
}

#[test]
fn synchronize_discards_local_changes() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let cache = factory
        .acquire(&request("create", &upstream.first))
        .unwrap();
    fs::write(cache.join("README"), "local edit").unwrap();
    fs::write(cache.join("untracked.txt"), "scratch").unwrap();
    fs::create_dir_all(cache.join("build/out")).unwrap();
    fs::write(cache.join("build/out/artifact"), "bin").unwrap();

    synchronize(&GitCli::new(), &cache, &upstream.second).unwrap();

    assert_eq!(head(&cache), upstream.second);
    assert_eq!(fs::read_to_string(cache.join("README")).unwrap(), "second");
    assert!(!cache.join("untracked.txt").exists());
    assert!(!cache.join("build").exists());
}

#[test]
fn synchronize_is_idempotent() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let cache = factory
        .acquire(&request("create", &upstream.second))
        .unwrap();
    let runner = GitCli::new();

    synchronize(&runner, &cache, &upstream.first).unwrap();
    assert_eq!(head(&cache), upstream.first);

    synchronize(&runner, &cache, &upstream.first).unwrap();
    assert_eq!(head(&cache), upstream.first);
}

#[test]
fn synchronize_succeeds_on_branch_without_upstream() {
    let upstream = Upstream::new();
    let factory = upstream.factory();
    let cache = factory.acquire(&request("create", "main")).unwrap();
    git_in(&cache, &["checkout", "--quiet", "-b", "local-only"]);

    synchronize(&GitCli::new(), &cache, &upstream.first).unwrap();

    assert_eq!(head(&cache), upstream.first);
}

#[test]
fn synchronize_rejects_plain_directory() {
    let tmp = tempfile::tempdir().unwrap();

    let result = synchronize(&GitCli::new(), tmp.path(), "main");

    assert!(result.is_err());
}

use std::{
    fmt::{Display, Formatter},
    num::NonZeroU32,
    str::FromStr,
};

use crate::model::ValidationError;

/// How the acquisition engine treats the per-repository cache slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CacheMode {
    /// Always clone into a fresh, uniquely named directory.
    #[default]
    None,
    /// Clone into the cache slot. Meant for first-time population only.
    CreateIfMissing,
    /// Synchronize the cache slot, failing if it is missing or broken.
    RequireExisting,
    /// Synchronize the cache slot, falling back to a fresh clone on any failure.
    UseIfAvailable,
}

impl FromStr for CacheMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "" | "none" | "no" => Ok(CacheMode::None),
            "create_if_missing" | "create" => Ok(CacheMode::CreateIfMissing),
            "require_existing" | "force" => Ok(CacheMode::RequireExisting),
            "use_if_available" | "if_available" => Ok(CacheMode::UseIfAvailable),
            _ => Err(ValidationError::InvalidCacheMode(value.to_owned())),
        }
    }
}

impl Display for CacheMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheMode::None => f.write_str("none"),
            CacheMode::CreateIfMissing => f.write_str("create_if_missing"),
            CacheMode::RequireExisting => f.write_str("require_existing"),
            CacheMode::UseIfAvailable => f.write_str("use_if_available"),
        }
    }
}

/// Raw, unvalidated acquisition options as they arrive from a caller.
///
/// Every field is optional here; [`RequestOptions::validate`] decides what is
/// required and produces an immutable [`Request`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub account: Option<String>,
    pub repo: Option<String>,
    pub revision: Option<String>,
    pub depth: Option<String>,
    pub token: Option<String>,
    pub cache: Option<String>,
}

impl RequestOptions {
    pub fn new(
        account: impl Into<String>,
        repo: impl Into<String>,
        revision: impl Into<String>,
    ) -> Self {
        RequestOptions {
            account: Some(account.into()),
            repo: Some(repo.into()),
            revision: Some(revision.into()),
            ..Default::default()
        }
    }

    pub fn depth(mut self, depth: impl Into<String>) -> Self {
        self.depth = Some(depth.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn cache(mut self, cache: impl Into<String>) -> Self {
        self.cache = Some(cache.into());
        self
    }

    pub fn validate(self) -> Result<Request, ValidationError> {
        let account = required("account", self.account)?;
        validate_name("account", &account)?;

        let repository = required("repo", self.repo)?;
        validate_name("repo", &repository)?;

        let revision = required("ref", self.revision)?;
        validate_revision(&revision)?;

        let depth = match self.depth.as_deref() {
            None | Some("") => None,
            Some(depth) => Some(parse_depth(depth)?),
        };

        let credential = self.token.filter(|token| !token.is_empty());

        let cache_mode = match self.cache.as_deref() {
            None => CacheMode::default(),
            Some(cache) => cache.parse()?,
        };

        Ok(Request {
            account,
            repository,
            revision,
            depth,
            credential,
            cache_mode,
        })
    }
}

/// A validated acquisition request. Only obtainable through
/// [`RequestOptions::validate`], so its invariants always hold.
#[derive(Clone, PartialEq, Eq)]
pub struct Request {
    account: String,
    repository: String,
    revision: String,
    depth: Option<NonZeroU32>,
    credential: Option<String>,
    cache_mode: CacheMode,
}

impl Request {
    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Branch name, tag or commit hash the working copy must end up at.
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// History limit for fresh clones; `None` fetches the full history.
    pub fn depth(&self) -> Option<NonZeroU32> {
        self.depth
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }
}

// Keeps the credential out of logs.
impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("account", &self.account)
            .field("repository", &self.repository)
            .field("revision", &self.revision)
            .field("depth", &self.depth)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .field("cache_mode", &self.cache_mode)
            .finish()
    }
}

impl Display for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.account, self.repository, self.revision)
    }
}

fn required(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Account and repository names become path components and URL segments.
fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let reason = if value == "." || value.contains("..") {
        Some("cannot contain '..' or be '.'")
    } else if value.contains('/') || value.contains('\\') {
        Some("cannot contain path separators")
    } else if value.starts_with('-') {
        Some("cannot start with '-'")
    } else if value.chars().any(char::is_control) {
        Some("cannot contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidName {
            field,
            value: value.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// The revision is handed to git as a positional argument.
fn validate_revision(value: &str) -> Result<(), ValidationError> {
    let reason = if value.starts_with('-') {
        Some("cannot start with '-'")
    } else if value.chars().any(char::is_control) {
        Some("cannot contain control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ValidationError::InvalidName {
            field: "ref",
            value: value.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Plain base-10 digits only; `str::parse` alone would also take a `+` sign.
fn parse_depth(value: &str) -> Result<NonZeroU32, ValidationError> {
    value
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| value.parse::<NonZeroU32>().ok())
        .flatten()
        .ok_or_else(|| ValidationError::InvalidDepth(value.to_owned()))
}

use thiserror::Error;
use url::Url;

pub const DEFAULT_REMOTE: &str = "https://github.com";

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Invalid remote url {url}: {source}")]
    Parse {
        url: String,
        source: url::ParseError,
    },
    #[error("Remote url {0} cannot hold repository path segments")]
    InvalidBase(String),
    #[error("Remote url {0} does not support embedded credentials")]
    CredentialNotSupported(String),
}

/// The single remote host repositories are retrieved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    base: Url,
}

impl Default for Remote {
    fn default() -> Self {
        Remote::github()
    }
}

impl Remote {
    pub fn github() -> Self {
        Remote {
            base: Url::parse(DEFAULT_REMOTE).expect("default remote url is valid"),
        }
    }

    pub fn parse(base: &str) -> Result<Self, RemoteError> {
        let url = Url::parse(base).map_err(|source| RemoteError::Parse {
            url: base.to_owned(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(RemoteError::InvalidBase(base.to_owned()));
        }
        Ok(Remote { base: url })
    }

    /// `<scheme>://[credential@]<host>/<account>/<repository>`
    pub fn repository_url(
        &self,
        account: &str,
        repository: &str,
        credential: Option<&str>,
    ) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidBase(self.base.to_string()))?
            .pop_if_empty()
            .push(account)
            .push(repository);

        if let Some(credential) = credential.filter(|c| !c.is_empty()) {
            url.set_username(credential)
                .map_err(|_| RemoteError::CredentialNotSupported(self.base.to_string()))?;
        }

        Ok(url)
    }
}

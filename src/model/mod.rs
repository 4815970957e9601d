use thiserror::Error;

pub mod request;

pub use request::{CacheMode, Request, RequestOptions};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0} must be provided")]
    MissingField(&'static str),
    #[error("{field} `{value}` is invalid: {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("{0:?} is not a valid clone depth")]
    InvalidDepth(String),
    #[error("{0:?} is not a valid cache option")]
    InvalidCacheMode(String),
}

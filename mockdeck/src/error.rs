use crate::mappings_file;
use hyper::http;
use std::{io, sync};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported HTTP method: {0}. Expected one of GET, POST, PUT, PATCH, DELETE")]
    InvalidHttpMethod(String),

    #[error("The status code is invalid: {0}")]
    InvalidStatusCode(String),

    #[error("{0}")]
    InvalidHeaders(String),

    #[error("Invalid header name")]
    InvalidHeaderName,

    #[error("Invalid header value")]
    InvalidHeaderValue,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Cannot change the mock server while it is running")]
    ServerRunning,

    #[error("There is no mapping at index {0}")]
    MappingNotFound(usize),

    #[error("{0}")]
    MappingsFile(#[from] mappings_file::error::Error),

    #[error("IoError: {0}")]
    IoError(#[from] io::Error),

    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),

    #[error("Http Error: {0}")]
    HttpError(#[from] http::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("The lock was poisoned")]
    PoisonedLock,

    #[error("Invalid body")]
    InvalidBody,
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}

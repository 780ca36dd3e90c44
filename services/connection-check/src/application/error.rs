use common::err_context::ErrorContext;
use std::fmt;

use crate::api::Error as ApiError;

#[derive(Debug)]
pub enum Error {
    Backend {
        context: String,
        source: ApiError,
    },
    /// The builder was not given a way to reach the backend.
    Incomplete { context: String },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Backend { context, source } => {
                write!(fmt, "Backend Error: {context} | {source}")
            }
            Error::Incomplete { context } => {
                write!(fmt, "Incomplete Application: {context}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<String, ApiError>> for Error {
    fn from(err: ErrorContext<String, ApiError>) -> Self {
        Error::Backend {
            context: err.0,
            source: err.1,
        }
    }
}

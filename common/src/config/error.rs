use config::ConfigError;
use std::fmt;

use crate::err_context::ErrorContext;

#[derive(Debug)]
pub enum Error {
    /// The layers could not be read or merged.
    Merge {
        context: String,
        source: ConfigError,
    },
    /// A command line `key=value` assignment is not valid TOML.
    Override {
        assignment: String,
        source: ConfigError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Merge { context, source } => {
                write!(fmt, "Configuration Error: {context} | {source}")
            }
            Error::Override { assignment, source } => {
                write!(fmt, "Invalid Setting Override: '{assignment}' | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<&'static str, ConfigError>> for Error {
    fn from(ctx: ErrorContext<&'static str, ConfigError>) -> Error {
        Error::Merge {
            context: ctx.0.to_string(),
            source: ctx.1,
        }
    }
}

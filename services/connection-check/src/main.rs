use clap::Parser;
use std::fmt;

use common::err_context::{ErrorContext, ErrorContextExt};
use common::settings::Settings;
use common::tracing::{init_tracing, Error as TracingError};
use connection_check::application::opts::{Command, Error as OptsError, Opts};
use connection_check::application::{ApplicationBuilder, Error as ApplicationError};

#[derive(Debug)]
pub enum Error {
    Options {
        context: String,
        source: OptsError,
    },
    Tracing {
        context: String,
        source: TracingError,
    },
    Application {
        context: String,
        source: ApplicationError,
    },
    Serialization {
        context: String,
        source: serde_json::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Options { context, source } => {
                write!(fmt, "Options Error: {context} | {source}")
            }
            Error::Tracing { context, source } => {
                write!(fmt, "Tracing Error: {context} | {source}")
            }
            Error::Application { context, source } => {
                write!(fmt, "Could not build application: {context} | {source}")
            }
            Error::Serialization { context, source } => {
                write!(fmt, "Serialization Error: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorContext<&'static str, OptsError>> for Error {
    fn from(err: ErrorContext<&'static str, OptsError>) -> Self {
        Error::Options {
            context: err.0.to_string(),
            source: err.1,
        }
    }
}

impl From<ErrorContext<&'static str, TracingError>> for Error {
    fn from(err: ErrorContext<&'static str, TracingError>) -> Self {
        Error::Tracing {
            context: err.0.to_string(),
            source: err.1,
        }
    }
}

impl From<ErrorContext<&'static str, ApplicationError>> for Error {
    fn from(err: ErrorContext<&'static str, ApplicationError>) -> Self {
        Error::Application {
            context: err.0.to_string(),
            source: err.1,
        }
    }
}

impl From<ErrorContext<&'static str, serde_json::Error>> for Error {
    fn from(err: ErrorContext<&'static str, serde_json::Error>) -> Self {
        Error::Serialization {
            context: err.0.to_string(),
            source: err.1,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let opts = Opts::parse();

    let cmd = opts.cmd.clone();

    let settings: Settings = opts.try_into().context("Compiling Application Settings")?;

    match cmd {
        Command::Config => {
            let json = serde_json::to_string_pretty(&settings)
                .context("Could not serialize settings")?;
            println!("{json}");
        }
        Command::Run => {
            init_tracing(settings.tracing.clone()).context("Initializing tracing")?;
            let app = ApplicationBuilder::new(settings)
                .context("could not build application")?
                .build()
                .context("could not build application")?;
            let rendered = app.run().await;
            println!("{}", rendered.initial);
            println!("{}", rendered.settled);
        }
    }
    Ok(())
}

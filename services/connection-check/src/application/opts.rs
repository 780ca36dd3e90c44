use std::{fmt, path::PathBuf};

use common::config;
use common::settings;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prefix of the environment variables overriding settings, eg
/// `CONNECTION_CHECK__BACKEND__API_URL`.
pub const ENV_PREFIX: &str = "CONNECTION_CHECK";

#[derive(Debug)]
pub enum Error {
    Merging {
        context: String,
        source: config::Error,
    },
    Deserializing {
        context: String,
        source: ::config::ConfigError,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Merging { context, source } => {
                write!(fmt, "Could not merge settings: {context} | {source}")
            }
            Error::Deserializing { context, source } => {
                write!(fmt, "Could not read settings: {context} | {source}")
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, clap::Parser)]
#[clap(
    name = "connection-check",
    about = "Checks the connection to the ticket sales backend",
    version = VERSION,
    )]
pub struct Opts {
    /// Defines the config directory
    #[arg(value_parser = clap::value_parser!(PathBuf), short = 'c', long = "config-dir", default_value = "config")]
    pub config_dir: PathBuf,

    /// Defines the run mode in {testing, dev, prod, ...}
    ///
    /// If no run mode is provided, a default behavior will be used.
    #[arg(short = 'm', long = "run-mode")]
    pub run_mode: Option<String>,

    /// Override settings values using key=value
    #[arg(short = 's', long = "setting")]
    pub settings: Vec<String>,

    #[clap(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Renders the connection check against the configured backend
    Run,
    /// Prints the configuration
    Config,
}

impl TryInto<settings::Settings> for Opts {
    type Error = Error;

    fn try_into(self) -> Result<settings::Settings, Self::Error> {
        config::merge_configuration(
            self.config_dir.as_ref(),
            &["service", "backend", "tracing"],
            self.run_mode.as_deref(),
            Some(ENV_PREFIX),
            &self.settings,
        )
        .map_err(|err| Error::Merging {
            context: "Connection Check Settings: Could not merge configuration".to_string(),
            source: err,
        })?
        .try_deserialize()
        .map_err(|err| Error::Deserializing {
            context: "Connection Check Settings: Could not deserialize configuration".to_string(),
            source: err,
        })
    }
}

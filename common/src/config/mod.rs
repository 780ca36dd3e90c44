mod error;
pub use self::error::Error;

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File, FileFormat};
use std::{env, path::Path};
use tracing::trace;

use crate::err_context::ErrorContextExt;

/// Environment variable selecting the profile, it takes precedence over the
/// profile given as argument.
pub static PROFILE_ENV_VAR: &str = "CONNECTION_CHECK_PROFILE";

/// Merges the settings of each section found under `root_dir`.
///
/// A section is a directory holding `default` (required), `<profile>` and
/// `local` (optional) files, merged in that order. Environment variables
/// named `<prefix>__<SECTION>__<KEY>` come next, and the `key=value`
/// overrides last.
pub fn merge_configuration(
    root_dir: &Path,
    sections: &[&str],
    profile: Option<&str>,
    prefix: Option<&str>,
    overrides: &[String],
) -> Result<Config, Error> {
    let profile = active_profile(profile);

    let mut builder = sections.iter().fold(Config::builder(), |builder, section| {
        add_section(builder, &root_dir.join(section), profile.as_deref())
    });

    if let Some(prefix) = prefix {
        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("__")
                .separator("__"),
        );
    }

    for assignment in overrides {
        builder = builder.add_source(override_source(assignment)?);
    }

    builder
        .build()
        .context("Could not merge configuration")
        .map_err(Error::from)
}

/// The profile from the environment, if any, otherwise the given one.
fn active_profile(profile: Option<&str>) -> Option<String> {
    env::var(PROFILE_ENV_VAR)
        .ok()
        .or_else(|| profile.map(String::from))
}

fn add_section(
    builder: ConfigBuilder<DefaultState>,
    section_dir: &Path,
    profile: Option<&str>,
) -> ConfigBuilder<DefaultState> {
    let layers = std::iter::once(("default", true))
        .chain(profile.map(|profile| (profile, false)))
        .chain(std::iter::once(("local", false)));

    layers.fold(builder, |builder, (layer, required)| {
        let path = section_dir.join(layer);
        trace!(required, "Reading configuration layer {}", path.display());
        builder.add_source(File::from(path).required(required))
    })
}

/// A single `key=value` assignment, read as TOML.
fn override_source(assignment: &str) -> Result<Config, Error> {
    Config::builder()
        .add_source(File::from_str(assignment, FileFormat::Toml))
        .build()
        .map_err(|err| Error::Override {
            assignment: assignment.to_string(),
            source: err,
        })
}

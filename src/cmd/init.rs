//! `shadowtap init` — generate a starter configuration file.
//!
//! Serializes a sample [`Config`] in the chosen format. Refuses to
//! overwrite an existing file.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::config::model::Config;
use crate::error::ShadowtapError;

pub fn execute(args: &InitArgs) -> Result<(), ShadowtapError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("config.{}", args.format.extension())));

    if output.exists() {
        return Err(ShadowtapError::FileExists { path: output });
    }

    let content = serialize_config(&starter_config(), &args.format)?;
    std::fs::write(&output, content)?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub fn starter_config() -> Config {
    Config::new(":8080", "localhost:9000").with_forwards(["localhost:9001", "localhost:9002"])
}

/// Serialize a `Config` to a formatted string in the given format.
pub fn serialize_config(config: &Config, format: &ConfigFormat) -> Result<String, ShadowtapError> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ShadowtapError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(feature = "yaml")]
        ConfigFormat::Yaml => serde_yml::to_string(config)
            .map_err(|e| ShadowtapError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "yaml"))]
        ConfigFormat::Yaml => Err(ShadowtapError::UnsupportedFormat("yaml".into())),

        #[cfg(feature = "toml")]
        ConfigFormat::Toml => toml::to_string_pretty(config)
            .map_err(|e| ShadowtapError::Io(std::io::Error::other(e.to_string()))),

        #[cfg(not(feature = "toml"))]
        ConfigFormat::Toml => Err(ShadowtapError::UnsupportedFormat("toml".into())),
    }
}

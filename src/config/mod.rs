//! Configuration loading and validation.
//!
//! The config is read exactly once at startup. [`load`] reads a file,
//! picks a decoder from its extension via [`parse_config_str`], and runs
//! [`validation::validate`] before handing back a ready [`Config`].

pub mod model;
pub mod validation;

use std::path::Path;

use crate::error::ShadowtapError;
use model::Config;

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, ShadowtapError> {
    match ext {
        "json" => serde_json::from_str(content).map_err(|e| ShadowtapError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| ShadowtapError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| ShadowtapError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(ShadowtapError::UnsupportedFormat(other.to_string())),
    }
}

/// Read, parse and validate the config file at `path`.
pub async fn load(path: &Path) -> Result<Config, ShadowtapError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ShadowtapError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            ShadowtapError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validation::validate(&config) {
        return Err(ShadowtapError::ConfigValidation { errors });
    }

    Ok(config)
}

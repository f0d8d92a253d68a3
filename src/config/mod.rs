//! Channel configuration loading and validation.
//!
//! Configuration is loaded exactly once at process start from a single
//! file (YAML by default, JSON and TOML behind feature flags) and is
//! immutable for the life of the process. The raw file bytes are
//! fingerprinted with SHA-256; the hash is reported by `/health` so
//! operators can tell which config revision a running instance carries.

pub mod model;
pub mod validation;

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::HeraldError;
use model::Config;
use validation::validate;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigVersion {
    Hash(String),
}

/// Compute a lowercase hex-encoded SHA-256 digest.
#[must_use]
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, HeraldError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| HeraldError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| HeraldError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| HeraldError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(HeraldError::UnsupportedFormat(other.to_string())),
    }
}

/// Read, parse, validate, and normalize a channel config file.
///
/// Tags are lower-cased here so the selector can compare them directly
/// against lower-cased requested tags. Any failure is fatal to startup.
pub async fn load_file(path: &Path) -> Result<(Config, ConfigVersion), HeraldError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            HeraldError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            HeraldError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let mut config = parse_config_str(ext, &content, &path.display().to_string())?;

    if let Err(errors) = validate(&config) {
        return Err(HeraldError::ConfigValidation { errors });
    }

    config.normalize_tags();

    let hash = sha256_hex(content.as_bytes());
    Ok((config, ConfigVersion::Hash(hash)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_is_stable() {
        assert_eq!(
            sha256_hex(b"herald"),
            sha256_hex(b"herald"),
        );
        assert_ne!(sha256_hex(b"herald"), sha256_hex(b"herald2"));
        assert_eq!(sha256_hex(b"").len(), 64);
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn yaml_channel_map_parses() {
        let yaml = "ops:\n  url: discord://token@id\n  is_default: true\n";
        let config = parse_config_str("yaml", yaml, "test.yaml").unwrap();
        assert!(config.channels["ops"].is_default);
    }

    #[test]
    fn unsupported_format_returns_error() {
        let result = parse_config_str("xml", "{}", "test.xml");
        assert!(matches!(result, Err(HeraldError::UnsupportedFormat(_))));
    }
}

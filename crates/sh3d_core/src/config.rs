//! Import settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Centimeters (home units) to scene units.
pub const DEFAULT_SCALE: f32 = 0.01;

/// Name of the document inside a home archive.
pub const DEFAULT_DOCUMENT_NAME: &str = "Home.xml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scale must be a positive number, got {0}")]
    InvalidScale(f32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings for one import run.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```json
/// { "scale": 0.01, "extraction_dir": "/tmp/home" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Multiplier from home units to scene units
    pub scale: f32,

    /// Document to parse inside the archive
    pub document_name: String,

    /// Where to unpack the archive; `<archive dir>/xml` when unset
    pub extraction_dir: Option<PathBuf>,

    /// Import the structure mesh (walls, floors, rooms)
    pub import_structure: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            extraction_dir: None,
            import_structure: true,
        }
    }
}

impl ImportConfig {
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.scale.is_finite() && self.scale > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidScale(self.scale))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ImportConfig::default();
        assert_eq!(config.scale, 0.01);
        assert_eq!(config.document_name, "Home.xml");
        assert!(config.extraction_dir.is_none());
        assert!(config.import_structure);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ImportConfig::from_json_str(r#"{ "scale": 0.1, "import_structure": false }"#).unwrap();
        assert_eq!(config.scale, 0.1);
        assert!(!config.import_structure);
        assert_eq!(config.document_name, "Home.xml");
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(matches!(
            ImportConfig::from_json_str(r#"{ "scale": 0 }"#),
            Err(ConfigError::InvalidScale(_))
        ));
        assert!(matches!(
            ImportConfig::from_json_str(r#"{ "scale": "big" }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        let err = ImportConfig::from_json_file(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

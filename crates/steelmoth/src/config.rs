//! Builder configuration.
//!
//! [`BuilderConfig`] is loaded from TOML. Every field has a default, so an
//! empty file (or no file at all) yields the stock builder.
//!
//! ```
//! use steelmoth::BuilderConfig;
//!
//! let config = BuilderConfig::from_toml_str(r#"root_id = "main""#).unwrap();
//! assert_eq!(config.root_id, "main");
//! assert_eq!(config.window_title, "Steel Moth");
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Settings for a builder session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Title of the builder window.
    pub window_title: String,
    /// Id of the top-level element seeded at startup.
    pub root_id: String,
    /// Whether inserted text-bearing elements show their id as text.
    pub label_text_from_id: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            window_title: "Steel Moth".to_string(),
            root_id: "root".to_string(),
            label_text_from_id: true,
        }
    }
}

impl BuilderConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(target: crate::logging::targets::WORKBENCH, path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load a configuration file, or the defaults if it does not exist.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the configuration to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|e| ConfigError::io(path, e))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.root_id.is_empty() {
            return Err(ConfigError::invalid_value(
                "root_id",
                "the empty id is reserved for the document root",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BuilderConfig::default();
        assert_eq!(config.window_title, "Steel Moth");
        assert_eq!(config.root_id, "root");
        assert!(config.label_text_from_id);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(BuilderConfig::from_toml_str("").unwrap(), BuilderConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = BuilderConfig::from_toml_str(
            r#"
            window_title = "Designer"
            label_text_from_id = false
            "#,
        )
        .unwrap();
        assert_eq!(config.window_title, "Designer");
        assert_eq!(config.root_id, "root");
        assert!(!config.label_text_from_id);
    }

    #[test]
    fn test_empty_root_id_rejected() {
        let err = BuilderConfig::from_toml_str(r#"root_id = """#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "root_id"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = BuilderConfig::from_toml_str("root_id = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = BuilderConfig {
            window_title: "Other".into(),
            ..Default::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(BuilderConfig::from_toml_str(&text).unwrap(), config);
    }
}

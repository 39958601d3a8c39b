//! Generator configuration.
//!
//! Defaults are overridden by an optional YAML file, then by the
//! `LESSON_DECK_TEMPLATES_DIR` and `LESSON_DECK_OUTPUT_DIR` environment
//! variables.
//!
//! ```yaml
//! templates_dir: /srv/lessons/templates
//! output_dir: /var/tmp/decks
//! blank_sentinel: blank
//! ```

use crate::common::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const TEMPLATES_DIR_ENV: &str = "LESSON_DECK_TEMPLATES_DIR";
pub const OUTPUT_DIR_ENV: &str = "LESSON_DECK_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Directory scanned for `.pptx` style templates
    pub templates_dir: PathBuf,
    /// Directory generated decks are written to
    pub output_dir: PathBuf,
    /// `templatePath` value that selects the built-in blank canvas
    pub blank_sentinel: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            output_dir: std::env::temp_dir(),
            blank_sentinel: "blank".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    /// Load from `path` (if given) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::NotFound(path.to_path_buf()));
                }
                Self::from_yaml(&std::fs::read_to_string(path)?)?
            },
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var_os(key));
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<OsString>) {
        if let Some(dir) = lookup(TEMPLATES_DIR_ENV).filter(|v| !v.is_empty()) {
            self.templates_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV).filter(|v| !v.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
    }

    /// Whether `template` selects the blank canvas.
    pub fn is_blank(&self, template: &str) -> bool {
        template.is_empty() || template == self.blank_sentinel
    }

    /// Path of a style template. Relative names that do not exist as given
    /// are looked up in the templates directory.
    pub fn resolve_template(&self, template: &str) -> PathBuf {
        let path = PathBuf::from(template);
        if path.is_relative() && !path.exists() {
            let in_catalog = self.templates_dir.join(&path);
            if in_catalog.exists() {
                return in_catalog;
            }
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
        assert_eq!(config.output_dir, std::env::temp_dir());
        assert!(config.is_blank("blank"));
        assert!(config.is_blank(""));
        assert!(!config.is_blank("ocean.pptx"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = GeneratorConfig::from_yaml("templates_dir: /srv/templates\n").unwrap();
        assert_eq!(config.templates_dir, PathBuf::from("/srv/templates"));
        assert_eq!(config.blank_sentinel, "blank");
        assert_eq!(config.output_dir, std::env::temp_dir());
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        let err = GeneratorConfig::from_yaml("templates_dir: [unclosed").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let mut config = GeneratorConfig::default();
        config.apply_overrides(|key| match key {
            OUTPUT_DIR_ENV => Some(OsString::from("/var/tmp/decks")),
            TEMPLATES_DIR_ENV => Some(OsString::new()),
            _ => None,
        });
        assert_eq!(config.output_dir, PathBuf::from("/var/tmp/decks"));
        assert_eq!(config.templates_dir, PathBuf::from("templates"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GeneratorConfig::load(Some(Path::new("/nonexistent/deck.yaml"))).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_resolve_template_in_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("ocean.pptx"), b"").unwrap();
        let config = GeneratorConfig {
            templates_dir: dir.path().to_path_buf(),
            ..GeneratorConfig::default()
        };
        assert_eq!(config.resolve_template("ocean.pptx"), dir.path().join("ocean.pptx"));
        assert_eq!(config.resolve_template("missing.pptx"), PathBuf::from("missing.pptx"));
    }
}

//! Configuration types for the Math Club lesson tool.
//!
//! This module provides the `mathclub.json` configuration (curriculum
//! selection, difficulty rules, snapshot locations, upload limits) and the
//! startup environment check for the content-generation API key.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LessonError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "mathclub.json";

/// Environment variable holding the content-generation API key.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Default snapshot path written on save.
fn default_snapshot_path() -> String {
    "saved_lesson.json".to_string()
}

/// Default directory for images written alongside the snapshot.
fn default_image_dir() -> String {
    "lesson_images".to_string()
}

/// Default upload limit (10 MiB).
const fn default_max_image_size() -> usize {
    10 * 1024 * 1024
}

/// Main configuration for the lesson tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Which lesson generator to use.
    #[serde(default)]
    pub curriculum: Curriculum,

    /// Require difficulty to be one of `Basic`, `Intermediate`, `Advanced`.
    #[serde(default)]
    pub restrict_difficulty: bool,

    /// Path of the JSON snapshot written on save.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// Directory receiving uploaded images when a snapshot is written.
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Largest accepted image upload, in bytes.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            curriculum: Curriculum::default(),
            restrict_difficulty: false,
            snapshot_path: default_snapshot_path(),
            image_dir: default_image_dir(),
            max_image_size: default_max_image_size(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `mathclub.json` in the current directory. If not found,
    /// returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            LessonError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `mathclub.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::ConfigParseError` if the file contains invalid
    /// JSON or invalid enum values, and `LessonError::ConfigValidationError`
    /// if the values fail [`Config::validate`].
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(LessonError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| LessonError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// - `snapshot_path` and `image_dir` must not be blank
    /// - `max_image_size` must be greater than 0
    pub fn validate(&self) -> Result<()> {
        if self.snapshot_path.trim().is_empty() {
            return Err(LessonError::config_validation(
                "snapshotPath must not be empty",
                "Provide a snapshot file path in your mathclub.json (e.g. 'saved_lesson.json')",
            ));
        }

        if self.image_dir.trim().is_empty() {
            return Err(LessonError::config_validation(
                "imageDir must not be empty",
                "Provide an image directory in your mathclub.json (e.g. 'lesson_images')",
            ));
        }

        if self.max_image_size == 0 {
            return Err(LessonError::config_validation(
                "maxImageSize must be greater than 0",
                "Set maxImageSize to a positive number of bytes in your mathclub.json",
            ));
        }

        Ok(())
    }
}

/// Which generator produces lesson stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Curriculum {
    /// Two-stage template interpolated with the topic (default).
    #[default]
    Template,
    /// Fixed curriculum table that ignores topic and difficulty.
    Fixed,
}

impl Curriculum {
    /// Parses a string into a `Curriculum`, case-insensitively.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "template" => Some(Self::Template),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    /// Returns the lowercase name used in config files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Fixed => "fixed",
        }
    }
}

impl std::fmt::Display for Curriculum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Curriculum {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid curriculum '{s}': expected one of 'template', 'fixed'"
            ))
        })
    }
}

impl Serialize for Curriculum {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Startup environment
// ============================================================================

/// Non-fatal problems detected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationWarning {
    /// `OPENAI_API_KEY` is unset or blank.
    MissingApiKey,
}

impl std::fmt::Display for ConfigurationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey => write!(
                f,
                "{API_KEY_VAR} is not set. Lessons are generated from built-in templates."
            ),
        }
    }
}

/// Values read once from the process environment at startup.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// The content-generation API key, if present and non-blank.
    pub api_key: Option<String>,
}

impl Environment {
    /// Reads the environment of the current process.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_api_key(std::env::var(API_KEY_VAR).ok())
    }

    /// Builds an environment from an explicit key value. Blank keys count as missing.
    #[must_use]
    pub fn from_api_key(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    /// Returns the warnings to surface once at startup.
    #[must_use]
    pub fn warnings(&self) -> Vec<ConfigurationWarning> {
        if self.api_key.is_none() {
            vec![ConfigurationWarning::MissingApiKey]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.curriculum, Curriculum::Template);
        assert!(!config.restrict_difficulty);
        assert_eq!(config.snapshot_path, "saved_lesson.json");
        assert_eq!(config.image_dir, "lesson_images");
        assert_eq!(config.max_image_size, 10 * 1024 * 1024);
    }

    #[test]
    fn test_curriculum_serialization() {
        assert_eq!(
            serde_json::to_string(&Curriculum::Template).unwrap(),
            "\"template\""
        );
        assert_eq!(
            serde_json::to_string(&Curriculum::Fixed).unwrap(),
            "\"fixed\""
        );
    }

    #[test]
    fn test_curriculum_case_insensitive() {
        let config: Config = serde_json::from_str(r#"{"curriculum": "FIXED"}"#).unwrap();
        assert_eq!(config.curriculum, Curriculum::Fixed);

        let config: Config = serde_json::from_str(r#"{"curriculum": "Template"}"#).unwrap();
        assert_eq!(config.curriculum, Curriculum::Template);
    }

    #[test]
    fn test_invalid_curriculum_error() {
        let result: std::result::Result<Config, _> =
            serde_json::from_str(r#"{"curriculum": "llm"}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid curriculum"));
        assert!(err.contains("llm"));
    }

    #[test]
    fn test_config_deserialization_with_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.snapshot_path, "saved_lesson.json");
        assert_eq!(config.curriculum, Curriculum::Template);
    }

    #[test]
    fn test_config_deserialization_with_overrides() {
        let json = r#"{
            "curriculum": "fixed",
            "restrictDifficulty": true,
            "snapshotPath": "out/lesson.json",
            "imageDir": "out/images",
            "maxImageSize": 2048
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.curriculum, Curriculum::Fixed);
        assert!(config.restrict_difficulty);
        assert_eq!(config.snapshot_path, "out/lesson.json");
        assert_eq!(config.image_dir, "out/images");
        assert_eq!(config.max_image_size, 2048);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let json = r#"{"snapshotPath": "a.json", "theme": "dark"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.snapshot_path, "a.json");
    }

    #[test]
    fn test_load_from_file_nonexistent_returns_default() {
        let path = PathBuf::from("/nonexistent/path/mathclub.json");
        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.snapshot_path, "saved_lesson.json");
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let config_path = std::env::temp_dir().join("test_mathclub_invalid.json");
        std::fs::write(&config_path, b"{ not valid json }").unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(
            matches!(&err, LessonError::ConfigParseError { path, message } if *path == config_path && !message.is_empty()),
            "Expected ConfigParseError with correct path, got: {err:?}"
        );

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_load_from_dir_finds_mathclub_json() {
        let temp_dir = std::env::temp_dir().join("test_mathclub_dir");
        std::fs::create_dir_all(&temp_dir).unwrap();
        let config_path = temp_dir.join("mathclub.json");
        std::fs::write(&config_path, r#"{"curriculum": "fixed"}"#).unwrap();

        let config = Config::load_from_dir(&temp_dir).unwrap();
        assert_eq!(config.curriculum, Curriculum::Fixed);

        std::fs::remove_file(&config_path).ok();
        std::fs::remove_dir(&temp_dir).ok();
    }

    #[test]
    fn test_config_validation_blank_snapshot_path() {
        let config = Config {
            snapshot_path: "   ".to_string(),
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(
            matches!(&err, LessonError::ConfigValidationError { message, .. } if message.contains("snapshotPath")),
            "Expected ConfigValidationError about snapshotPath, got: {err:?}"
        );
    }

    #[test]
    fn test_config_validation_blank_image_dir() {
        let config = Config {
            image_dir: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_max_image_size() {
        let config = Config {
            max_image_size: 0,
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(
            matches!(&err, LessonError::ConfigValidationError { message, suggestion }
                if message.contains("maxImageSize") && suggestion.contains("maxImageSize")),
            "Expected ConfigValidationError about maxImageSize, got: {err:?}"
        );
    }

    #[test]
    fn test_load_from_file_validates_after_parsing() {
        let config_path = std::env::temp_dir().join("test_mathclub_validation.json");
        std::fs::write(&config_path, r#"{"maxImageSize": 0}"#).unwrap();

        let err = Config::load_from_file(&config_path).unwrap_err();
        assert!(
            matches!(&err, LessonError::ConfigValidationError { .. }),
            "Expected ConfigValidationError, got: {err:?}"
        );

        std::fs::remove_file(&config_path).ok();
    }

    #[test]
    fn test_environment_missing_key_warns() {
        let env = Environment::from_api_key(None);
        assert_eq!(env.warnings(), vec![ConfigurationWarning::MissingApiKey]);

        let env = Environment::from_api_key(Some("   ".to_string()));
        assert!(env.api_key.is_none());
        assert_eq!(env.warnings().len(), 1);
    }

    #[test]
    fn test_environment_with_key_has_no_warnings() {
        let env = Environment::from_api_key(Some("sk-test".to_string()));
        assert_eq!(env.api_key.as_deref(), Some("sk-test"));
        assert!(env.warnings().is_empty());
    }

    #[test]
    fn test_missing_key_warning_mentions_variable() {
        let msg = ConfigurationWarning::MissingApiKey.to_string();
        assert!(msg.contains("OPENAI_API_KEY"));
    }
}

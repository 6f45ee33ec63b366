use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_DATE_FORMAT: &str = "%y%m%d";
pub const DEFAULT_TAG_USAGE_FILE: &str = "tag_usage.json";

/// Widest index padding accepted; `usize::MAX` has 20 digits
pub const MAX_INDEX_PADDING: usize = 20;

/// Parameters of the naming template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameConfig {
    /// strftime pattern for the date token
    pub date_format: String,
    /// Minimum digit width of the sequence index
    pub index_padding: usize,
    /// Token separator
    pub separator: String,
    /// First sequence number of a batch
    pub start_index: usize,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            index_padding: 3,
            separator: "_".to_string(),
            start_index: 1,
        }
    }
}

impl RenameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_INDEX_PADDING).contains(&self.index_padding) {
            return Err(ConfigError::InvalidPadding(self.index_padding));
        }

        if self.separator.is_empty() || self.separator.contains(['/', '\\']) {
            return Err(ConfigError::InvalidSeparator(self.separator.clone()));
        }

        let has_bad_item =
            StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error));
        if self.date_format.is_empty() || has_bad_item {
            return Err(ConfigError::InvalidDateFormat(self.date_format.clone()));
        }

        Ok(())
    }
}

/// Application configuration file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rename: RenameConfig,
    /// Extensions (with leading dot) picked up when scanning directories
    pub accepted_extensions: Vec<String>,
    /// Tag catalog override
    pub tags_file: Option<PathBuf>,
    /// Tag usage counts, relative paths resolve against the config directory
    pub tag_usage_file: PathBuf,
    /// Language used for tag descriptions
    pub language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rename: RenameConfig::default(),
            accepted_extensions: [
                ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".mp4", ".avi", ".mov", ".mkv", ".heic",
            ]
            .iter()
            .map(|e| e.to_string())
            .collect(),
            tags_file: None,
            tag_usage_file: PathBuf::from(DEFAULT_TAG_USAGE_FILE),
            language: "en".to_string(),
        }
    }
}

impl AppConfig {
    /// Case-insensitive extension check
    pub fn is_accepted(&self, path: &Path) -> bool {
        let ext = match path.extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy().to_lowercase()),
            None => return false,
        };

        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.to_lowercase() == ext)
    }

    pub fn tag_usage_path(&self, config_dir: &Path) -> PathBuf {
        if self.tag_usage_file.is_absolute() {
            self.tag_usage_file.clone()
        } else {
            config_dir.join(&self.tag_usage_file)
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Index padding must be between 1 and 20, got {0}")]
    InvalidPadding(usize),

    #[error("Invalid separator: {0:?}")]
    InvalidSeparator(String),

    #[error("Invalid date format: {0:?}")]
    InvalidDateFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_config_defaults() {
        let config = RenameConfig::default();
        assert_eq!(config.date_format, "%y%m%d");
        assert_eq!(config.index_padding, 3);
        assert_eq!(config.separator, "_");
        assert_eq!(config.start_index, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_padding_rejected() {
        let config = RenameConfig {
            index_padding: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPadding(0))));
    }

    #[test]
    fn test_oversized_padding_rejected() {
        let widest = RenameConfig {
            index_padding: MAX_INDEX_PADDING,
            ..Default::default()
        };
        assert!(widest.validate().is_ok());

        let config = RenameConfig {
            index_padding: 70000,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPadding(70000))));
    }

    #[test]
    fn test_separator_rules() {
        for bad in ["", "/", "a\\b"] {
            let config = RenameConfig {
                separator: bad.to_string(),
                ..Default::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::InvalidSeparator(_))));
        }

        let config = RenameConfig {
            separator: "-".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_date_format_rejected() {
        let config = RenameConfig {
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDateFormat(_))));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"rename": {"index_padding": 4}, "language": "de"}"#).unwrap();

        assert_eq!(config.rename.index_padding, 4);
        assert_eq!(config.rename.separator, "_");
        assert_eq!(config.language, "de");
        assert!(config.accepted_extensions.contains(&".jpg".to_string()));
    }

    #[test]
    fn test_is_accepted_ignores_case() {
        let config = AppConfig::default();
        assert!(config.is_accepted(Path::new("/photos/IMG_1.JPG")));
        assert!(config.is_accepted(Path::new("clip.mov")));
        assert!(!config.is_accepted(Path::new("notes.txt")));
        assert!(!config.is_accepted(Path::new("README")));
    }

    #[test]
    fn test_tag_usage_path() {
        let config = AppConfig::default();
        assert_eq!(
            config.tag_usage_path(Path::new("/cfg")),
            PathBuf::from("/cfg/tag_usage.json")
        );

        let config = AppConfig {
            tag_usage_file: PathBuf::from("/elsewhere/usage.json"),
            ..Default::default()
        };
        assert_eq!(
            config.tag_usage_path(Path::new("/cfg")),
            PathBuf::from("/elsewhere/usage.json")
        );
    }
}

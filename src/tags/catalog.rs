use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;

use super::TagError;

/// Overrides the tag catalog file
pub const ENV_TAGS_FILE: &str = "TAG_RENAMER_TAGS_FILE";

/// Catalog file looked up in the config directory
pub const TAGS_FILE_NAME: &str = "tags.json";

const BUNDLED_TAGS_JSON: &str = include_str!("default_tags.json");

static BUNDLED_TAGS: Lazy<BTreeMap<String, TagDescription>> =
    Lazy::new(|| match serde_json::from_str(BUNDLED_TAGS_JSON) {
        Ok(tags) => normalize_codes(tags),
        Err(e) => {
            error!("Bundled tag catalog is invalid: {}", e);
            BTreeMap::new()
        }
    });

/// A tag's description, either shared by all languages or per language
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagDescription {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl TagDescription {
    /// The description in `language`, else the first available one
    pub fn for_language(&self, language: &str) -> &str {
        match self {
            TagDescription::Plain(text) => text,
            TagDescription::Localized(map) => map
                .get(language)
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

/// Where a catalog was loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSource {
    File(PathBuf),
    Bundled,
}

/// Known tag codes, upper case, with their descriptions
#[derive(Debug, Clone)]
pub struct TagCatalog {
    tags: BTreeMap<String, TagDescription>,
    source: TagSource,
}

impl TagCatalog {
    pub fn bundled() -> Self {
        Self {
            tags: BUNDLED_TAGS.clone(),
            source: TagSource::Bundled,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, TagError> {
        let file = File::open(path).map_err(|source| TagError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let tags: BTreeMap<String, TagDescription> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| TagError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        info!(count = tags.len(), "Loaded tags from {:?}", path);

        Ok(Self {
            tags: normalize_codes(tags),
            source: TagSource::File(path.to_path_buf()),
        })
    }

    /// Load the catalog with precedence: `explicit`, `TAG_RENAMER_TAGS_FILE`,
    /// the config `tags_file`, `tags.json` in the config directory, then
    /// the bundled catalog.
    ///
    /// Only an unreadable `explicit` file is an error; every other source
    /// falls through to the next one.
    pub fn load(
        explicit: Option<&Path>,
        config: &AppConfig,
        config_dir: Option<&Path>,
    ) -> Result<Self, TagError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let from_env = env::var(ENV_TAGS_FILE)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let from_config = config.tags_file.clone();
        let default = config_dir.map(|dir| dir.join(TAGS_FILE_NAME));

        for candidate in [from_env, from_config].into_iter().flatten() {
            let path = resolve(&candidate, config_dir);
            match Self::from_file(&path) {
                Ok(catalog) => return Ok(catalog),
                Err(e) => warn!("{}, trying next source", e),
            }
        }

        if let Some(path) = default.filter(|p| p.is_file()) {
            match Self::from_file(&path) {
                Ok(catalog) => return Ok(catalog),
                Err(e) => warn!("{}, using bundled tags", e),
            }
        }

        debug!("Using bundled tag catalog");
        Ok(Self::bundled())
    }

    pub fn source(&self) -> &TagSource {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Case-insensitive membership
    pub fn contains(&self, code: &str) -> bool {
        self.tags.contains_key(&code.to_uppercase())
    }

    /// Codes in sorted order
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    pub fn description(&self, code: &str, language: &str) -> Option<&str> {
        self.tags
            .get(&code.to_uppercase())
            .map(|d| d.for_language(language))
    }
}

fn normalize_codes(tags: BTreeMap<String, TagDescription>) -> BTreeMap<String, TagDescription> {
    tags.into_iter()
        .map(|(code, desc)| (code.to_uppercase(), desc))
        .collect()
}

fn resolve(path: &Path, config_dir: Option<&Path>) -> PathBuf {
    match config_dir {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn test_bundled_catalog() {
        let catalog = TagCatalog::bundled();

        assert_eq!(catalog.source(), &TagSource::Bundled);
        assert!(catalog.contains("AU_DO"));
        assert!(catalog.contains("found"));
        assert_eq!(catalog.description("FOUND", "de"), Some("Fundamente"));
        assert_eq!(catalog.description("FOUND", "en"), Some("Foundations"));
    }

    #[test]
    fn test_plain_and_localized_descriptions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tags.json");
        fs::write(&path, r#"{"ab": "Plain", "CD": {"de": "Nur Deutsch"}}"#).unwrap();

        let catalog = TagCatalog::from_file(&path).unwrap();

        assert_eq!(catalog.codes().collect::<Vec<_>>(), vec!["AB", "CD"]);
        assert_eq!(catalog.description("ab", "de"), Some("Plain"));
        assert_eq!(catalog.description("CD", "en"), Some("Nur Deutsch"));
        assert_eq!(catalog.description("XX", "en"), None);
    }

    #[test]
    fn test_explicit_file_wins_and_must_be_valid() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("mine.json");
        fs::write(&path, r#"{"ONLY": "one"}"#).unwrap();

        let catalog = TagCatalog::load(Some(&path), &AppConfig::default(), None).unwrap();
        assert_eq!(catalog.len(), 1);

        let missing = TagCatalog::load(
            Some(&dir.path().join("nope.json")),
            &AppConfig::default(),
            None,
        );
        assert!(matches!(missing, Err(TagError::Read { .. })));
    }

    #[test]
    fn test_env_overrides_config_dir() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();
        let dir = tempdir().unwrap();
        let env_file = dir.path().join("env.json");
        fs::write(&env_file, r#"{"ENV": "from env"}"#).unwrap();
        fs::write(dir.path().join(TAGS_FILE_NAME), r#"{"DIR": "from dir"}"#).unwrap();

        env::set_var(ENV_TAGS_FILE, &env_file);
        let catalog = TagCatalog::load(None, &AppConfig::default(), Some(dir.path())).unwrap();
        env::remove_var(ENV_TAGS_FILE);

        assert!(catalog.contains("ENV"));
        assert!(!catalog.contains("DIR"));
    }

    #[test]
    fn test_broken_sources_fall_back() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();
        env::remove_var(ENV_TAGS_FILE);
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        fs::write(dir.path().join(TAGS_FILE_NAME), r#"{"DIR": "from dir"}"#).unwrap();
        let config = AppConfig {
            tags_file: Some(PathBuf::from("broken.json")),
            ..Default::default()
        };

        let catalog = TagCatalog::load(None, &config, Some(dir.path())).unwrap();

        assert_eq!(catalog.source(), &TagSource::File(dir.path().join(TAGS_FILE_NAME)));
    }

    #[test]
    fn test_no_sources_uses_bundled() {
        let _lock = ENV_TEST_MUTEX.lock().unwrap();
        env::remove_var(ENV_TAGS_FILE);
        let dir = tempdir().unwrap();

        let catalog = TagCatalog::load(None, &AppConfig::default(), Some(dir.path())).unwrap();

        assert_eq!(catalog.source(), &TagSource::Bundled);
        assert!(!catalog.is_empty());
    }
}

mod types;

pub use types::*;

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Overrides the configuration directory
pub const ENV_CONFIG_DIR: &str = "TAG_RENAMER_CONFIG_DIR";

pub const CONFIG_FILE_NAME: &str = "config.json";

/// Directory holding `config.json`, `tags.json` and the tag usage file.
///
/// `TAG_RENAMER_CONFIG_DIR` wins over the platform config directory.
pub fn config_dir() -> Option<PathBuf> {
    match env::var(ENV_CONFIG_DIR) {
        Ok(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|dir| dir.join("tag-renamer")),
    }
}

/// Load the application configuration.
///
/// An explicit path must exist. Without one, `config.json` in [`config_dir`]
/// is used when present and the defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_dir().map(|dir| dir.join(CONFIG_FILE_NAME)) {
            Some(path) if path.is_file() => path,
            _ => {
                debug!("No config file found, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };

    let file = File::open(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let config: AppConfig =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

    config.rename.validate()?;

    info!("Loaded config from {:?}", path);
    Ok(config)
}

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::TagError;

/// Persisted count of how often each tag was applied
#[derive(Debug, Clone)]
pub struct TagUsage {
    path: PathBuf,
    counts: BTreeMap<String, u64>,
}

impl TagUsage {
    /// Read counts from `path`; a missing or corrupt file yields empty counts
    pub fn load(path: &Path) -> Self {
        let counts = match File::open(path) {
            Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
                Ok(counts) => counts,
                Err(e) => {
                    warn!("Ignoring invalid tag usage file {:?}: {}", path, e);
                    BTreeMap::new()
                }
            },
            Err(_) => {
                debug!("No tag usage file at {:?}", path);
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            counts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn count(&self, tag: &str) -> u64 {
        self.counts.get(&tag.to_uppercase()).copied().unwrap_or(0)
    }

    pub fn increment<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            *self.counts.entry(tag.as_ref().to_uppercase()).or_insert(0) += 1;
        }
    }

    pub fn reset(&mut self) {
        info!("Resetting tag usage counts");
        self.counts.clear();
    }

    /// Tags by descending count, ties by code
    pub fn ranked(&self) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> =
            self.counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    pub fn save(&self) -> Result<(), TagError> {
        let write_err = |source| TagError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        {
            let file = File::create(&temp_path).map_err(write_err)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &self.counts).map_err(|source| {
                TagError::Serialize {
                    path: self.path.clone(),
                    source,
                }
            })?;
            writer.flush().map_err(write_err)?;
        }
        fs::rename(&temp_path, &self.path).map_err(write_err)?;

        debug!("Tag usage written to {:?}", self.path);
        Ok(())
    }
}

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::TrailRecord;
use crate::error::CacheError;

/// The scraped trail list on disk, as one JSON array.
#[derive(Debug, Clone)]
pub struct TrailCache {
    path: PathBuf,
}

impl TrailCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every trail in stored order.
    ///
    /// A missing file is reported as [`CacheError::Miss`] so callers can
    /// decide between scraping and serving an empty list.
    pub fn load(&self) -> Result<Vec<TrailRecord>, CacheError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CacheError::Miss(self.path.clone()));
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let trails: Vec<TrailRecord> =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| CacheError::Format {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(count = trails.len(), path = %self.path.display(), "loaded trail cache");
        Ok(trails)
    }

    /// Replace the cache with `trails`.
    ///
    /// Written to a temporary file next to the target and renamed into place,
    /// so readers see either the old list or the new one.
    pub fn store(&self, trails: &[TrailRecord]) -> Result<(), CacheError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        let tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(&mut writer, trails).map_err(|source| {
                CacheError::Format {
                    path: self.path.clone(),
                    source,
                }
            })?;
            writer.write_all(b"\n").map_err(|e| self.io_error(e))?;
            writer.flush().map_err(|e| self.io_error(e))?;
        }
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::info!(count = trails.len(), path = %self.path.display(), "wrote trail cache");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Location;
    use tempfile::tempdir;

    fn sample() -> Vec<TrailRecord> {
        vec![
            TrailRecord::new("McAfee Knob", Location::resolved(37.392, -80.036))
                .with_description(["The most photographed spot on the AT.", "8.8 miles"])
                .with_map_embed(Some(
                    "http://www.trimbleoutdoors.com/Maps/EmbeddedMap.aspx?tripId=123456".into(),
                )),
            TrailRecord::new("Mill Mountain", Location::unresolved("Mill Mountain Park")),
        ]
    }

    #[test]
    fn test_store_then_load() {
        let dir = tempdir().unwrap();
        let cache = TrailCache::new(dir.path().join("hikes/data/all_hikes.json"));

        cache.store(&sample()).unwrap();
        assert_eq!(cache.load().unwrap(), sample());
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let cache = TrailCache::new(dir.path().join("absent.json"));

        let err = cache.load().unwrap_err();
        assert!(err.is_miss());
    }

    #[test]
    fn test_store_replaces_previous_list() {
        let dir = tempdir().unwrap();
        let cache = TrailCache::new(dir.path().join("all_hikes.json"));

        cache.store(&sample()).unwrap();
        cache.store(&sample()[1..]).unwrap();

        assert_eq!(cache.load().unwrap(), sample()[1..].to_vec());
        // No temp files left behind next to the cache.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_file_format() {
        let dir = tempdir().unwrap();
        let cache = TrailCache::new(dir.path().join("all_hikes.json"));
        cache.store(&sample()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(cache.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["location"], serde_json::json!([37.392, -80.036]));
        assert_eq!(raw[1]["location"], "Mill Mountain Park");
        assert!(raw[1]["map_embed"].is_null());
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("all_hikes.json");
        fs::write(&path, "{not json").unwrap();

        let err = TrailCache::new(&path).load().unwrap_err();
        assert!(matches!(err, CacheError::Format { .. }));
    }
}

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use tracing::debug;

use super::{load, Dataset, LoadError, LoadOptions};

/// What makes two loads of the same file interchangeable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceIdentity {
    pub fn of(path: &Path) -> Result<Self, LoadError> {
        let canonical = fs::canonicalize(path).map_err(|e| LoadError::from_io(path, e))?;
        let meta = fs::metadata(&canonical).map_err(|e| LoadError::from_io(path, e))?;
        Ok(Self {
            path: canonical,
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Canonical key for `path`, resolved through the parent directory when the
/// file itself no longer exists.
fn cache_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

#[derive(Debug)]
struct Entry {
    identity: SourceIdentity,
    options: LoadOptions,
    dataset: Arc<Dataset>,
}

/// Memoizes parsed datasets by source identity.
///
/// An entry is evicted as soon as the file's identity (or the load options)
/// differ from the cached ones, so a failed or vanished reload leaves
/// nothing behind. Failed loads are never cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Entry>,
    hits: u64,
    loads: u64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &mut self,
        path: &Path,
        options: &LoadOptions,
    ) -> Result<Arc<Dataset>, LoadError> {
        let identity = match SourceIdentity::of(path) {
            Ok(identity) => identity,
            Err(err) => {
                self.invalidate(path);
                return Err(err);
            }
        };
        if let Some(entry) = self.entries.get(&identity.path) {
            if entry.identity == identity && entry.options == *options {
                self.hits += 1;
                debug!(path = %identity.path.display(), "dataset cache hit");
                return Ok(Arc::clone(&entry.dataset));
            }
        }
        // A stale entry must not outlive a failed reload.
        if self.entries.remove(&identity.path).is_some() {
            debug!(path = %identity.path.display(), "dataset cache entry evicted");
        }

        let dataset = Arc::new(load(path, options)?);
        self.loads += 1;
        self.entries.insert(
            identity.path.clone(),
            Entry {
                identity,
                options: *options,
                dataset: Arc::clone(&dataset),
            },
        );
        Ok(dataset)
    }

    /// Drops the entry for `path`; returns whether one existed.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(&cache_key(path)).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn loads(&self) -> u64 {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_loads_share_the_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charities.csv");
        std::fs::write(&path, "Name\nWaterAid\n").unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        let second = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 1);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn changed_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charities.csv");
        std::fs::write(&path, "Name\nWaterAid\n").unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        std::fs::write(&path, "Name\nWaterAid\nOxfam\n").unwrap();
        let second = cache.get_or_load(&path, &LoadOptions::default()).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn different_options_are_not_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charities.csv");
        std::fs::write(&path, "Name;Country\nWaterAid;UK\n").unwrap();

        let mut cache = DatasetCache::new();
        let comma = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        let semicolon = LoadOptions {
            delimiter: b';',
            ..LoadOptions::default()
        };
        let split = cache.get_or_load(&path, &semicolon).unwrap();
        assert!(comma.columns().is_empty());
        assert_eq!(split.records()[0].country.as_deref(), Some("UK"));
    }

    #[test]
    fn invalidate_forces_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charities.csv");
        std::fs::write(&path, "Name\nWaterAid\n").unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        let second = cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.loads(), 2);
    }

    #[test]
    fn missing_files_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new();
        let err = cache
            .get_or_load(&dir.path().join("absent.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn failed_reload_evicts_the_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charities.csv");
        std::fs::write(&path, "Name,Country\nWaterAid,UK\n").unwrap();

        let mut cache = DatasetCache::new();
        cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        std::fs::write(&path, "Name,Country\nWaterAid,UK\nOxfam\n").unwrap();
        let err = cache.get_or_load(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn vanished_file_evicts_the_stale_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charities.csv");
        std::fs::write(&path, "Name\nWaterAid\n").unwrap();

        let mut cache = DatasetCache::new();
        cache.get_or_load(&path, &LoadOptions::default()).unwrap();
        assert_eq!(cache.len(), 1);
        std::fs::remove_file(&path).unwrap();
        let err = cache.get_or_load(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(cache.is_empty());
    }
}

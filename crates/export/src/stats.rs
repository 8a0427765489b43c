use crate::error::{ExportError, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generation counters persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub total_generated: u64,
    #[serde(default)]
    pub by_template: BTreeMap<String, u64>,
    /// Unix time in milliseconds of the last recorded generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_generated_at_ms: Option<u64>,
}

/// JSON file holding [`GenerationStats`]. Writers take an exclusive lock on
/// a sibling `.lock` file so concurrent processes do not lose counts.
#[derive(Debug, Clone)]
pub struct StatsStore {
    path: PathBuf,
}

struct StatsLock {
    file: File,
}

impl Drop for StatsLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl StatsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file reads as empty stats; an unreadable one is an error.
    pub fn load(&self) -> Result<GenerationStats> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(GenerationStats::default())
            }
            Err(err) => return Err(ExportError::io(&self.path, err)),
        };
        serde_json::from_str(&raw).map_err(|source| ExportError::StatsCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Count one generation attributed to `source` (a template name, or
    /// another label for raw builds) and return the updated totals.
    pub fn record(&self, source: &str) -> Result<GenerationStats> {
        self.record_at(source, unix_millis())
    }

    fn record_at(&self, source: &str, now_ms: u64) -> Result<GenerationStats> {
        let _lock = self.acquire_lock()?;
        let mut stats = self.load()?;
        stats.total_generated += 1;
        *stats.by_template.entry(source.to_string()).or_insert(0) += 1;
        stats.last_generated_at_ms = Some(now_ms);
        self.save(&stats)?;
        log::debug!(
            "Recorded generation for '{source}' ({} total)",
            stats.total_generated
        );
        Ok(stats)
    }

    fn acquire_lock(&self) -> Result<StatsLock> {
        let lock_path = sibling(&self.path, "lock");
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| ExportError::io(parent, err))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|err| ExportError::io(&lock_path, err))?;
        file.lock_exclusive()
            .map_err(|err| ExportError::io(&lock_path, err))?;
        Ok(StatsLock { file })
    }

    fn save(&self, stats: &GenerationStats) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(stats).map_err(|source| ExportError::StatsCorrupt {
            path: self.path.clone(),
            source,
        })?;
        write_atomic(&self.path, &bytes)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("stats.json");
    path.with_file_name(format!("{name}.{suffix}"))
}

/// Directory `path` will be written into, created if missing.
pub(crate) fn ensure_parent(path: &Path) -> Result<PathBuf> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|err| ExportError::io(&parent, err))?;
    Ok(parent)
}

/// Write through a uniquely named temp file in the same directory, then
/// rename it over `path`. Concurrent writers to the same `path` each get
/// their own temp file, so the last rename wins with a complete file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = ensure_parent(path)?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("shortcut");
    let mut tmp = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|err| ExportError::io(&parent, err))?;
    tmp.write_all(bytes)
        .map_err(|err| ExportError::io(tmp.path(), err))?;
    tmp.as_file()
        .sync_all()
        .map_err(|err| ExportError::io(tmp.path(), err))?;
    tmp.persist(path)
        .map_err(|err| ExportError::io(path, err.error))?;
    Ok(())
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("nested/stats.json"));
        assert_eq!(store.load().unwrap(), GenerationStats::default());
    }

    #[test]
    fn record_accumulates_per_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = StatsStore::new(dir.path().join("stats.json"));
        store.record_at("text-pipeline", 10).unwrap();
        store.record_at("api-request", 20).unwrap();
        let stats = store.record_at("text-pipeline", 30).unwrap();

        assert_eq!(stats.total_generated, 3);
        assert_eq!(stats.by_template.get("text-pipeline"), Some(&2));
        assert_eq!(stats.by_template.get("api-request"), Some(&1));
        assert_eq!(stats.last_generated_at_ms, Some(30));
        assert_eq!(store.load().unwrap(), stats);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = StatsStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(ExportError::StatsCorrupt { .. })
        ));
        assert!(store.record("text-pipeline").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}

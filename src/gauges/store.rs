use crate::error::SyncError;
use crate::gauges::paths::CachePaths;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// One cached resource: its canonical path and cumulative view count.
/// The record's `path` field is authoritative; the filename slug is only
/// an address for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewRecord {
    pub path: String,
    pub views: u64,
}

/// Durable per-resource view counts, one JSON file per resource inside the
/// cache directory. The extension-less `config` entry is reserved for the
/// sync state and never treated as a record.
#[derive(Debug, Clone)]
pub struct ViewStore {
    dir: PathBuf,
}

fn sanitize_slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            prev_dash = false;
        } else if !prev_dash {
            out.push('-');
            prev_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

fn path_digest(path: &str) -> String {
    let digest = Sha256::digest(path.as_bytes());
    digest[..4].iter().map(|b| format!("{b:02x}")).collect()
}

impl ViewStore {
    pub fn new(paths: &CachePaths) -> Self {
        Self {
            dir: paths.store_dir().to_path_buf(),
        }
    }

    // The slug is readable but lossy, so a digest of the exact path keeps
    // near-identical paths (case variants, trailing punctuation) on distinct
    // record files.
    fn record_file(&self, path: &str) -> PathBuf {
        let slug = sanitize_slug(path);
        let digest = path_digest(path);
        let name = if slug.is_empty() {
            format!("root-{digest}.json")
        } else {
            format!("{slug}-{digest}.json")
        };
        self.dir.join(name)
    }

    fn read_record(&self, file: &PathBuf) -> Result<ViewRecord, SyncError> {
        let raw = fs::read_to_string(file).map_err(|err| SyncError::io("read", file, err))?;
        serde_json::from_str(&raw).map_err(|err| SyncError::CacheCorrupt {
            path: file.clone(),
            reason: err.to_string(),
        })
    }

    fn write_record(&self, record: &ViewRecord) -> Result<(), SyncError> {
        fs::create_dir_all(&self.dir).map_err(|err| SyncError::io("create", &self.dir, err))?;
        let file = self.record_file(&record.path);
        let data = serde_json::to_string_pretty(record).map_err(|err| SyncError::CacheCorrupt {
            path: file.clone(),
            reason: err.to_string(),
        })?;
        fs::write(&file, format!("{data}\n")).map_err(|err| SyncError::io("write", &file, err))
    }

    /// Cached count for `path`, or 0 with a zero-valued record created on
    /// miss. A miss is not an error; it establishes the baseline.
    pub fn get(&self, path: &str) -> Result<u64, SyncError> {
        let file = self.record_file(path);
        if file.exists() {
            return Ok(self.read_record(&file)?.views);
        }
        self.write_record(&ViewRecord {
            path: path.to_string(),
            views: 0,
        })?;
        Ok(0)
    }

    /// Overwrite the cached count for each path. Each entry persists as one
    /// durable unit; a crash mid-loop may leave some paths updated and
    /// others not.
    pub fn put_all(&self, totals: &BTreeMap<String, u64>) -> Result<(), SyncError> {
        for (path, views) in totals {
            self.write_record(&ViewRecord {
                path: path.clone(),
                views: *views,
            })?;
        }
        Ok(())
    }

    /// Every cached record except the reserved sync-state entry, keyed by the
    /// record's own path.
    pub fn load_all(&self) -> Result<BTreeMap<String, u64>, SyncError> {
        let mut out = BTreeMap::new();
        if !self.dir.exists() {
            return Ok(out);
        }
        let entries =
            fs::read_dir(&self.dir).map_err(|err| SyncError::io("read", &self.dir, err))?;
        for entry in entries {
            let entry = entry.map_err(|err| SyncError::io("read", &self.dir, err))?;
            let file = entry.path();
            if !file.is_file() || file.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let record = self.read_record(&file)?;
            out.insert(record.path, record.views);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gauges::paths::CachePaths;
    use tempfile::tempdir;

    fn store_in(dir: &std::path::Path) -> ViewStore {
        ViewStore::new(&CachePaths::new(dir.join("cache")))
    }

    #[test]
    fn get_on_miss_creates_zero_record() {
        let tmp = tempdir().expect("tempdir");
        let store = store_in(tmp.path());

        assert_eq!(store.get("/blog/foo").expect("get"), 0);
        let all = store.load_all().expect("load_all");
        assert_eq!(all.get("/blog/foo"), Some(&0));
    }

    #[test]
    fn put_all_then_get_returns_written_counts() {
        let tmp = tempdir().expect("tempdir");
        let store = store_in(tmp.path());

        let mut totals = BTreeMap::new();
        totals.insert("/blog/foo".to_string(), 12u64);
        totals.insert("/blog/bar".to_string(), 3u64);
        store.put_all(&totals).expect("put_all");

        assert_eq!(store.get("/blog/foo").expect("get"), 12);
        assert_eq!(store.get("/blog/bar").expect("get"), 3);
        assert_eq!(store.load_all().expect("load_all"), totals);
    }

    #[test]
    fn load_all_skips_reserved_config_entry() {
        let tmp = tempdir().expect("tempdir");
        let paths = CachePaths::new(tmp.path().join("cache"));
        let store = ViewStore::new(&paths);
        store.get("/blog/foo").expect("seed");
        fs::write(&paths.config_file, "{\"token\":\"t\"}\n").expect("write config");

        let all = store.load_all().expect("load_all");
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("/blog/foo"));
    }

    #[test]
    fn near_identical_paths_keep_distinct_records() {
        let tmp = tempdir().expect("tempdir");
        let store = store_in(tmp.path());

        let mut totals = BTreeMap::new();
        totals.insert("/blog/foo".to_string(), 100u64);
        store.put_all(&totals).expect("first put_all");

        let mut totals = BTreeMap::new();
        totals.insert("/blog/foo.".to_string(), 1u64);
        store.put_all(&totals).expect("second put_all");

        let all = store.load_all().expect("load_all");
        assert_eq!(all.get("/blog/foo"), Some(&100));
        assert_eq!(all.get("/blog/foo."), Some(&1));
        assert_eq!(store.get("/blog/foo").expect("get"), 100);
        assert_eq!(store.get("/blog/foo.").expect("get"), 1);
    }

    #[test]
    fn path_keys_are_case_sensitive() {
        let tmp = tempdir().expect("tempdir");
        let store = store_in(tmp.path());

        let mut totals = BTreeMap::new();
        totals.insert("/Blog/Foo".to_string(), 7u64);
        totals.insert("/blog/foo".to_string(), 2u64);
        store.put_all(&totals).expect("put_all");

        assert_eq!(store.get("/Blog/Foo").expect("get"), 7);
        assert_eq!(store.get("/blog/foo").expect("get"), 2);
        assert_eq!(store.load_all().expect("load_all").len(), 2);
    }

    #[test]
    fn record_key_is_the_stored_path_not_the_slug() {
        let tmp = tempdir().expect("tempdir");
        let store = store_in(tmp.path());
        store.get("/blog/2013/some-post").expect("seed");

        let all = store.load_all().expect("load_all");
        assert!(all.contains_key("/blog/2013/some-post"));
    }
}

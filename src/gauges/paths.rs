use std::env;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "config";
pub const LOCK_FILE_NAME: &str = ".lock";
pub const DEFAULT_CACHE_DIR: &str = ".page_views";

/// File layout inside one cache directory. The directory is always passed in
/// explicitly; nothing here consults the process working directory on its own.
#[derive(Debug, Clone)]
pub struct CachePaths {
    pub cache_dir: PathBuf,
    pub config_file: PathBuf,
    pub lock_file: PathBuf,
}

impl CachePaths {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        let cache_dir = cache_dir.into();
        let config_file = cache_dir.join(CONFIG_FILE_NAME);
        let lock_file = cache_dir.join(LOCK_FILE_NAME);
        Self {
            cache_dir,
            config_file,
            lock_file,
        }
    }

    pub fn store_dir(&self) -> &Path {
        &self.cache_dir
    }
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

/// Resolve the cache directory for the CLI: explicit flag first, then
/// `POPSYNC_CACHE_DIR`, then `.page_views` in the current directory.
pub fn resolve_cache_paths(flag: Option<PathBuf>) -> CachePaths {
    let dir = match flag {
        Some(dir) => dir,
        None => env_or_default_path("POPSYNC_CACHE_DIR", PathBuf::from(DEFAULT_CACHE_DIR)),
    };
    CachePaths::new(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_default() {
        let paths = resolve_cache_paths(Some(PathBuf::from("/tmp/views")));
        assert_eq!(paths.cache_dir, PathBuf::from("/tmp/views"));
        assert_eq!(paths.config_file, PathBuf::from("/tmp/views/config"));
        assert_eq!(paths.lock_file, PathBuf::from("/tmp/views/.lock"));
    }
}

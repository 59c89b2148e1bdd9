//! File-backed credential store.
//!
//! The file holds a single JSON object keyed by the storage keys:
//!
//! ```text
//! {"imena_access_token": "...", "imena_refresh_token": "..."}
//! ```
//!
//! Every read goes to disk so separate CLI invocations see each other's
//! writes.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;

use super::{CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

type Entries = BTreeMap<String, String>;

pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Entries {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %self.path.display(), "credential file unreadable, treating as empty: {}", e);
                Entries::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to read credential file: {}", e);
                Entries::new()
            }
        }
    }

    fn save(&self, entries: &Entries) -> anyhow::Result<()> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e).context("failed to remove credential file"),
            };
        }

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).context("failed to create credential directory")?;

        // Unique temp name per writer; the file is owner-only before any token lands in it.
        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = tempfile::NamedTempFile::new_in(parent).context("failed to create temp credential file")?;
        restrict_to_owner(tmp.as_file())?;
        tmp.write_all(json.as_bytes()).context("failed to write credential file")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .context("failed to replace credential file")?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut Entries)) {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        let mut entries = self.load();
        f(&mut entries);
        if let Err(e) = self.save(&entries) {
            tracing::warn!(path = %self.path.display(), "credential write dropped: {:#}", e);
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        self.load().remove(key).filter(|v| !v.is_empty())
    }
}

#[cfg(unix)]
fn restrict_to_owner(file: &std::fs::File) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
        .context("failed to restrict credential file permissions")
}

#[cfg(not(unix))]
fn restrict_to_owner(_file: &std::fs::File) -> anyhow::Result<()> {
    Ok(())
}

impl CredentialStore for FileStore {
    fn set(&self, access: &str, refresh: &str) {
        self.update(|entries| {
            entries.insert(ACCESS_TOKEN_KEY.to_string(), access.to_string());
            entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.to_string());
        });
    }

    fn clear(&self) {
        self.update(|entries| {
            entries.remove(ACCESS_TOKEN_KEY);
            entries.remove(REFRESH_TOKEN_KEY);
        });
    }

    fn access(&self) -> Option<String> {
        self.get(ACCESS_TOKEN_KEY)
    }

    fn refresh(&self) -> Option<String> {
        self.get(REFRESH_TOKEN_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("credentials.json");

        let store = FileStore::new(&path);
        assert!(store.access().is_none());

        store.set("acc-1", "ref-1");
        assert!(path.exists());

        // A second handle on the same file sees the write.
        let other = FileStore::new(&path);
        assert_eq!(other.access().as_deref(), Some("acc-1"));
        assert_eq!(other.refresh().as_deref(), Some("ref-1"));

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[ACCESS_TOKEN_KEY], "acc-1");
        assert_eq!(raw[REFRESH_TOKEN_KEY], "ref-1");
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileStore::new(&path);

        store.set("a", "r");
        store.clear();
        assert!(!path.exists());
        assert!(!store.has_credentials());

        // Clearing again is harmless.
        store.clear();
    }

    #[test]
    fn test_corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::new(&path);
        assert!(store.access().is_none());
        assert!(store.refresh().is_none());

        // A write recovers the file.
        store.set("a", "r");
        assert_eq!(store.access().as_deref(), Some("a"));
    }

    #[cfg(unix)]
    #[test]
    fn test_credentials_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        FileStore::new(&path).set("acc", "ref");

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "credentials file mode = {:o}", mode & 0o777);
    }

    #[test]
    fn test_writes_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let a = FileStore::new(&path);
        let b = FileStore::new(&path);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..20 {
                    a.set(&format!("a{}", i), "ra");
                }
            });
            scope.spawn(|| {
                for i in 0..20 {
                    b.set(&format!("b{}", i), "rb");
                }
            });
        });

        // Two independent handles racing never lose the file or strand a temp.
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let last = a.access().unwrap();
        assert!(last == "a19" || last == "b19");
    }

    #[test]
    fn test_unwritable_location_degrades_silently() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let store = FileStore::new(blocker.join("credentials.json"));
        store.set("a", "r");
        assert!(store.access().is_none());
    }
}

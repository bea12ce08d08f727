//! Persisted credential storage
//!
//! The bearer token and the cached user profile live in a small key-value
//! store. The file-backed store keeps them in ~/.config/suhbat/credentials.json
//! with restricted permissions (0o600).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Key holding the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";

/// Key holding the cached user profile (JSON)
pub const USER_INFO_KEY: &str = "user_info";

/// Key-value store for credentials
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// In-process store, used for tests and one-off sessions
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a bearer token
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        store
            .entries
            .lock()
            .insert(ACCESS_TOKEN_KEY.to_string(), token.into());
        store
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// JSON file store
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default location: <config dir>/suhbat/credentials.json
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("suhbat")
            .join("credentials.json")
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn load(&self) -> HashMap<String, String> {
        if !self.path.exists() {
            return HashMap::new();
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable credentials file {:?}: {}", self.path, e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }

    fn save(&self, entries: &HashMap<String, String>) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
                #[cfg(unix)]
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;

        // Owner read/write only
        #[cfg(unix)]
        fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;

        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock();
        self.load().remove(key)
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.load();
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let _guard = self.lock.lock();
        let mut entries = self.load();
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FileCredentialStore {
        let dir = std::env::temp_dir().join(format!("suhbat-test-{}", uuid::Uuid::new_v4()));
        FileCredentialStore::new(dir.join("credentials.json"))
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryCredentialStore::with_token("abc");
        assert_eq!(store.get(ACCESS_TOKEN_KEY).as_deref(), Some("abc"));
        store.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let store = temp_store();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);

        store.set(ACCESS_TOKEN_KEY, "tok-1").unwrap();
        store.set(USER_INFO_KEY, r#"{"name":"a","email":"a@b.c"}"#).unwrap();

        let reopened = FileCredentialStore::new(store.path().clone());
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY).as_deref(), Some("tok-1"));
        assert!(reopened.get(USER_INFO_KEY).is_some());

        reopened.remove(ACCESS_TOKEN_KEY).unwrap();
        assert_eq!(store.get(ACCESS_TOKEN_KEY), None);
        assert!(store.get(USER_INFO_KEY).is_some());

        let _ = fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_permissions() {
        let store = temp_store();
        store.set(ACCESS_TOKEN_KEY, "secret").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let _ = fs::remove_dir_all(store.path().parent().unwrap());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let store = temp_store();
        store.remove("nope").unwrap();
        assert!(!store.path().exists());
    }
}

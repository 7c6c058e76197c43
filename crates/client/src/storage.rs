//! Persistent session storage (synchronous key/value).
//!
//! The stores treat storage as an opaque mirror: reads happen once at
//! startup, writes happen on login/logout. Write failures are logged and never
//! fail the session operation that caused them.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Key holding the raw bearer token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the JSON-encoded user profile.
pub const USER_KEY: &str = "user";

/// Synchronous key/value storage that survives restarts.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<S> SessionStorage for Arc<S>
where
    S: SessionStorage + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory storage for tests/dev (and WASM hosts without a backing store).
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed entries, e.g. to simulate a previous run.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            inner: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.to_string(), value.to_string());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.remove(key);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::{FileSessionStorage, default_storage_path};

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};
    use std::sync::RwLock;

    use anyhow::Context;

    use super::SessionStorage;

    /// JSON-file storage: one object of string entries, rewritten on every
    /// change.
    #[derive(Debug)]
    pub struct FileSessionStorage {
        path: PathBuf,
        entries: RwLock<BTreeMap<String, String>>,
    }

    impl FileSessionStorage {
        /// Open (or lazily create) the storage file.
        ///
        /// A missing file is an empty store. An unreadable or corrupt file is
        /// an error so a broken session is not silently discarded.
        pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
            let path = path.into();
            let entries = if path.exists() {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read session storage at {:?}", path))?;
                if raw.trim().is_empty() {
                    BTreeMap::new()
                } else {
                    serde_json::from_str(&raw)
                        .with_context(|| format!("corrupt session storage at {:?}", path))?
                }
            } else {
                BTreeMap::new()
            };

            Ok(Self {
                path,
                entries: RwLock::new(entries),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn flush(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create storage directory at {:?}", parent))?;
            }
            let payload =
                serde_json::to_string_pretty(entries).context("failed to serialize session storage")?;

            // Write-then-rename so a crash never leaves a half-written file.
            let tmp = self.path.with_extension("json.tmp");
            std::fs::write(&tmp, payload)
                .with_context(|| format!("failed to write session storage at {:?}", tmp))?;
            std::fs::rename(&tmp, &self.path)
                .with_context(|| format!("failed to replace session storage at {:?}", self.path))?;
            Ok(())
        }

        fn mutate(&self, op: &str, f: impl FnOnce(&mut BTreeMap<String, String>)) {
            let mut entries = match self.entries.write() {
                Ok(e) => e,
                Err(_) => {
                    tracing::error!("session storage lock poisoned during {op}");
                    return;
                }
            };
            f(&mut entries);
            if let Err(err) = self.flush(&entries) {
                tracing::error!("failed to persist session storage during {op}: {err:?}");
            }
        }
    }

    impl SessionStorage for FileSessionStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.read().ok()?.get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.mutate("set", |entries| {
                entries.insert(key.to_string(), value.to_string());
            });
        }

        fn remove(&self, key: &str) {
            self.mutate("remove", |entries| {
                entries.remove(key);
            });
        }
    }

    /// Resolve the default storage file:
    /// `{app_data_dir}/staffdesk/session.json`.
    pub fn default_storage_path() -> anyhow::Result<PathBuf> {
        let base = dirs::data_dir()
            .or_else(|| {
                dirs::home_dir().map(|mut h| {
                    h.push(".local");
                    h.push("share");
                    h
                })
            })
            .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

        let mut path = base;
        path.push("staffdesk");
        path.push("session.json");
        Ok(path)
    }
}

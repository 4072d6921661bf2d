//! `CredentialStore`: filesystem-backed, hot-reloadable secret map
//! (spec §3, §6.5).
//!
//! The swap primitive is the teacher's `Adaptive<T>`
//! (`examples/flyingrobots-ninelives/src/adaptive.rs`) reused verbatim;
//! the filesystem watcher is new, grounded on the `notify`-crate
//! config-reload idiom present across the retrieval pack.

use crate::adaptive::Adaptive;
use crate::error::CredentialStoreError;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

/// Debounce window for collapsing a burst of filesystem events into one
/// reload (spec §6.5: hot-reload must observe new content within a bound;
/// this crate's bound is 500ms, well inside the 5s ceiling tests assert).
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct CredentialStore {
    values: Adaptive<HashMap<String, String>>,
}

impl CredentialStore {
    pub fn new(initial: HashMap<String, String>) -> Self {
        Self { values: Adaptive::new(initial) }
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.values.get().get(name).cloned()
    }

    pub fn require(&self, name: &str) -> Result<String, CredentialStoreError> {
        self.get(name).ok_or_else(|| CredentialStoreError::NotFound(name.to_string()))
    }

    pub fn replace_all(&self, new_values: HashMap<String, String>) {
        self.values.set(new_values);
    }

    /// Watches `dir` as a directory with one file per credential (file
    /// name is the credential name, file contents the raw secret value)
    /// and spawns a background watcher that reloads the whole snapshot
    /// whenever an entry is created, written, or renamed. An empty
    /// directory is valid; it simply leaves every credential reference
    /// unresolvable. Returns the store and a `RecommendedWatcher` the
    /// caller must keep alive for the duration it wants hot-reload active
    /// (dropping it stops the watch).
    pub fn watch_dir(dir: impl AsRef<Path>) -> Result<(Self, RecommendedWatcher), CredentialStoreError> {
        let dir = dir.as_ref().to_path_buf();
        let store = Self::new(load_credential_dir(&dir)?);
        let watcher = spawn_watcher(dir, store.clone())?;
        Ok((store, watcher))
    }
}

fn load_credential_dir(dir: &Path) -> Result<HashMap<String, String>, CredentialStoreError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|source| CredentialStoreError::Io { path: dir.display().to_string(), source })?;

    let mut values = HashMap::new();
    for entry in entries {
        let entry = entry.map_err(|source| CredentialStoreError::Io { path: dir.display().to_string(), source })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let contents = std::fs::read_to_string(&path)
            .map_err(|source| CredentialStoreError::Io { path: path.display().to_string(), source })?;
        values.insert(name.to_string(), contents.trim_end_matches(['\n', '\r']).to_string());
    }
    Ok(values)
}

fn spawn_watcher(
    dir: PathBuf,
    store: CredentialStore,
) -> Result<RecommendedWatcher, CredentialStoreError> {
    let (tx, rx) = channel::<notify::Result<Event>>();
    let mut watcher = notify::recommended_watcher(tx)
        .map_err(|e| CredentialStoreError::Io { path: dir.display().to_string(), source: io_error(e) })?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| CredentialStoreError::Io { path: dir.display().to_string(), source: io_error(e) })?;

    let watch_dir = dir.clone();
    std::thread::spawn(move || {
        for event in rx {
            match event {
                Ok(event)
                    if matches!(
                        event.kind,
                        notify::EventKind::Modify(_) | notify::EventKind::Create(_) | notify::EventKind::Remove(_)
                    ) =>
                {
                    std::thread::sleep(RELOAD_DEBOUNCE);
                    match load_credential_dir(&watch_dir) {
                        Ok(values) => store.replace_all(values),
                        Err(e) => tracing::warn!(error = %e, "credential reload failed"),
                    }
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "credential directory watch error"),
            }
        }
    });

    Ok(watcher)
}

fn io_error(e: notify::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

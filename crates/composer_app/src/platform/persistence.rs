use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use composer_engine::{PersistError, SessionStore, StateDir};
use composer_logging::{composer_debug, composer_error, composer_info, composer_warn};
use serde::{Deserialize, Serialize};

const STATE_FILENAME: &str = ".composer_session.ron";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedSession {
    saved_utc: Option<String>,
    values: BTreeMap<String, String>,
}

/// [`SessionStore`] that survives restarts: every change is written to
/// `.composer_session.ron` in the state directory.
pub(crate) struct FileSessionStore {
    dir: StateDir,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Fails only when the state directory cannot be created.
    pub fn open(state_dir: &Path) -> Result<Self, PersistError> {
        let dir = StateDir::open(state_dir)?;
        let values = load_values(&dir);
        Ok(Self {
            dir,
            values: Mutex::new(values),
        })
    }

    fn save(&self, values: &BTreeMap<String, String>) {
        let state = PersistedSession {
            saved_utc: Some(Utc::now().to_rfc3339()),
            values: values.clone(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = match ron::ser::to_string_pretty(&state, pretty) {
            Ok(text) => text,
            Err(err) => {
                composer_error!("Failed to serialize session state: {}", err);
                return;
            }
        };
        if let Err(err) = self.dir.replace(STATE_FILENAME, &content) {
            composer_error!(
                "Failed to write session state to {:?}: {}",
                self.dir.path(),
                err
            );
        }
    }

    fn modify(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut values);
        self.save(&values);
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        composer_debug!("Session key {} set", key);
        self.modify(|values| {
            values.insert(key.to_string(), value.to_string());
        });
    }

    fn remove(&self, key: &str) {
        self.modify(|values| {
            values.remove(key);
        });
    }
}

fn load_values(dir: &StateDir) -> BTreeMap<String, String> {
    let path = dir.path().join(STATE_FILENAME);
    let content = match dir.read(STATE_FILENAME) {
        Ok(Some(text)) => text,
        Ok(None) => return BTreeMap::new(),
        Err(err) => {
            composer_warn!("Failed to read session state from {:?}: {}", path, err);
            return BTreeMap::new();
        }
    };

    match ron::from_str::<PersistedSession>(&content) {
        Ok(state) => {
            composer_info!(
                "Loaded session state from {:?} (saved {})",
                path,
                state.saved_utc.as_deref().unwrap_or("at an unknown time")
            );
            state.values
        }
        Err(err) => {
            composer_warn!("Failed to parse session state from {:?}: {}", path, err);
            BTreeMap::new()
        }
    }
}

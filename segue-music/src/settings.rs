//! Settings store with change notifications
//!
//! A thin stand-in for the host application's settings system: typed
//! lookups by section/key, a TOML loader, and a subscription list the
//! playback controller uses to track `musicEnabled`/`musicVolume` changes.
//! Lookups are total: absent keys fall back to the seeded defaults, so a
//! settings read can never fail.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::warn;

/// Settings section holding the audio options.
pub const SOUND_SECTION: &str = "SOUND";
/// Music master volume, 0.0 - 1.0.
pub const MUSIC_VOLUME_KEY: &str = "musicVolume";
/// Whether music playback is enabled (non-zero = enabled).
pub const MUSIC_ENABLED_KEY: &str = "musicEnabled";

const DEFAULT_MUSIC_VOLUME: f32 = 0.5;

/// Read access to settings values.
///
/// Implementations must be total: return a sensible default for absent
/// keys rather than failing.
pub trait SettingsStore: Send + Sync {
    fn get_float(&self, section: &str, key: &str) -> f32;
    fn get_int(&self, section: &str, key: &str) -> i32;
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Value {
    Float(f32),
    Int(i32),
}

type Listener = Box<dyn Fn() + Send + Sync>;

/// Mutex-guarded settings map with change notifications.
///
/// Writers notify all subscribers synchronously on the writing thread;
/// listeners must therefore stay cheap and must not block.
pub struct Settings {
    values: Mutex<HashMap<(String, String), Value>>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
}

impl Settings {
    /// Settings seeded with the music defaults (volume 0.5, enabled).
    pub fn new() -> Settings {
        let mut values = HashMap::new();
        values.insert(
            (SOUND_SECTION.to_owned(), MUSIC_VOLUME_KEY.to_owned()),
            Value::Float(DEFAULT_MUSIC_VOLUME),
        );
        values.insert(
            (SOUND_SECTION.to_owned(), MUSIC_ENABLED_KEY.to_owned()),
            Value::Int(1),
        );
        Settings {
            values: Mutex::new(values),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
        }
    }

    /// Parse settings from TOML text of the form:
    ///
    /// ```toml
    /// [SOUND]
    /// musicVolume = 0.8
    /// musicEnabled = 1
    /// ```
    ///
    /// Values merge over the defaults; booleans are accepted for integer
    /// options.
    pub fn from_toml_str(text: &str) -> Result<Settings, toml::de::Error> {
        let table: toml::Table = toml::from_str(text)?;
        let settings = Settings::new();
        {
            let mut values = settings.lock_values();
            for (section, entries) in table {
                let toml::Value::Table(entries) = entries else {
                    continue;
                };
                for (key, value) in entries {
                    let value = match value {
                        toml::Value::Float(f) => Value::Float(f as f32),
                        toml::Value::Integer(i) => Value::Int(i as i32),
                        toml::Value::Boolean(b) => Value::Int(b as i32),
                        _ => continue,
                    };
                    values.insert((section.clone(), key), value);
                }
            }
        }
        Ok(settings)
    }

    /// Load settings from a TOML file, falling back to defaults if the file
    /// is missing or unreadable.
    pub fn load(path: &Path) -> Settings {
        match std::fs::read_to_string(path) {
            Ok(text) => match Settings::from_toml_str(&text) {
                Ok(settings) => settings,
                Err(err) => {
                    warn!("invalid settings file {}: {err}; using defaults", path.display());
                    Settings::new()
                }
            },
            Err(_) => Settings::new(),
        }
    }

    pub fn set_float(&self, section: &str, key: &str, value: f32) {
        self.lock_values()
            .insert((section.to_owned(), key.to_owned()), Value::Float(value));
        self.notify();
    }

    pub fn set_int(&self, section: &str, key: &str, value: i32) {
        self.lock_values()
            .insert((section.to_owned(), key.to_owned()), Value::Int(value));
        self.notify();
    }

    /// Register a change listener; delivery stops when the returned guard
    /// is dropped.
    pub fn subscribe(self: Arc<Self>, listener: Listener) -> Subscription {
        let id = self.next_listener.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push((id, listener));
        Subscription {
            settings: Arc::downgrade(&self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.lock_listeners()
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify(&self) {
        for (_, listener) in self.lock_listeners().iter() {
            listener();
        }
    }

    fn get(&self, section: &str, key: &str) -> Option<Value> {
        self.lock_values()
            .get(&(section.to_owned(), key.to_owned()))
            .copied()
    }

    fn lock_values(&self) -> MutexGuard<'_, HashMap<(String, String), Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

impl SettingsStore for Settings {
    fn get_float(&self, section: &str, key: &str) -> f32 {
        match self.get(section, key) {
            Some(Value::Float(f)) => f,
            Some(Value::Int(i)) => i as f32,
            None => 0.0,
        }
    }

    fn get_int(&self, section: &str, key: &str) -> i32 {
        match self.get(section, key) {
            Some(Value::Int(i)) => i,
            Some(Value::Float(f)) => f as i32,
            None => 0,
        }
    }
}

/// RAII guard for a settings subscription; unsubscribes on drop.
pub struct Subscription {
    settings: Weak<Settings>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(settings) = self.settings.upgrade() {
            settings.unsubscribe(self.id);
        }
    }
}

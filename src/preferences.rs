//! # Preference Persistence
//!
//! The widget remembers its size, position and label toggles between runs in
//! a small key-value store. The store is injected into the input glue through
//! the [`PreferenceStore`] trait; the render core never touches it.
//!
//! ## Keys
//! | Key | Type | Default |
//! |---|---|---|
//! | `size` | int | 400 |
//! | `x`, `y` | int | -1 (center on screen) |
//! | `day_of_month` | bool | false |
//! | `day_of_week` | bool | false |
//! | `always_on_top` | bool | true |
//!
//! ## Implementations
//! - [`MemoryPreferences`]: in-process map, used by tests and `--stdout` mode
//! - [`TomlPreferences`]: flat TOML file, rewritten synchronously on every change

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const KEY_SIZE: &str = "size";
pub const KEY_X: &str = "x";
pub const KEY_Y: &str = "y";
pub const KEY_DAY_OF_WEEK: &str = "day_of_week";
pub const KEY_DAY_OF_MONTH: &str = "day_of_month";
pub const KEY_ALWAYS_ON_TOP: &str = "always_on_top";

/// Widget size used on first start and after a reset.
pub const DEFAULT_SIZE: i32 = 400;
/// Smallest size reachable through the keyboard.
pub const MIN_SIZE: i32 = 100;
/// Largest size reachable through the keyboard.
pub const MAX_SIZE: i32 = 2048;
/// Position sentinel meaning "center on screen".
pub const UNSET_POSITION: i32 = -1;

/// Errors raised while persisting preferences.
#[derive(Error, Debug)]
pub enum PreferenceError {
    /// Preference file could not be read or written
    #[error("preference file IO: {0}")]
    Io(#[from] io::Error),

    /// Preference file exists but is not valid TOML
    #[error("preference file parse: {0}")]
    Parse(#[from] toml::de::Error),

    /// Preferences could not be encoded as TOML
    #[error("preference encode: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Key-value persistence used by the input glue.
///
/// Reads never fail: a missing or mistyped key yields the supplied default.
/// Writes are performed synchronously at the point of change.
pub trait PreferenceStore {
    fn get_int(&self, key: &str, default: i32) -> i32;
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn put_int(&mut self, key: &str, value: i32) -> Result<(), PreferenceError>;
    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), PreferenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PreferenceError>;
}

/// A stored preference value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
}

type PrefMap = BTreeMap<String, PrefValue>;

fn lookup_int(map: &PrefMap, key: &str, default: i32) -> i32 {
    match map.get(key) {
        Some(PrefValue::Int(value)) => i32::try_from(*value).unwrap_or(default),
        _ => default,
    }
}

fn lookup_bool(map: &PrefMap, key: &str, default: bool) -> bool {
    match map.get(key) {
        Some(PrefValue::Bool(value)) => *value,
        _ => default,
    }
}

/// Preferences held in memory only.
#[derive(Clone, Debug, Default)]
pub struct MemoryPreferences {
    values: PrefMap,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        lookup_int(&self.values, key, default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        lookup_bool(&self.values, key, default)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), PreferenceError> {
        self.values
            .insert(key.to_string(), PrefValue::Int(i64::from(value)));
        Ok(())
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), PrefValue::Bool(value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        self.values.remove(key);
        Ok(())
    }
}

/// Preferences persisted to a flat TOML file.
///
/// The whole file is rewritten after every change, so the on-disk state is
/// always current and no flush is needed at exit.
#[derive(Debug)]
pub struct TomlPreferences {
    path: PathBuf,
    values: PrefMap,
}

impl TomlPreferences {
    /// Open the store at `path`.
    ///
    /// A missing file starts an empty store. An unreadable or malformed file
    /// is logged and also treated as empty, so defaults apply.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match Self::read(&path) {
            Ok(values) => {
                debug!(path = %path.display(), entries = values.len(), "loaded preferences");
                values
            }
            Err(PreferenceError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no preference file, using defaults");
                PrefMap::new()
            }
            Err(e) => {
                warn!(path = %path.display(), "ignoring preference file: {}", e);
                PrefMap::new()
            }
        };
        Self { path, values }
    }

    /// Default preference file location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("analog-watch")
            .join("preferences.toml")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<PrefMap, PreferenceError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    fn write(&self) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = toml::to_string(&self.values)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl PreferenceStore for TomlPreferences {
    fn get_int(&self, key: &str, default: i32) -> i32 {
        lookup_int(&self.values, key, default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        lookup_bool(&self.values, key, default)
    }

    fn put_int(&mut self, key: &str, value: i32) -> Result<(), PreferenceError> {
        self.values
            .insert(key.to_string(), PrefValue::Int(i64::from(value)));
        self.write()
    }

    fn put_bool(&mut self, key: &str, value: bool) -> Result<(), PreferenceError> {
        self.values.insert(key.to_string(), PrefValue::Bool(value));
        self.write()
    }

    fn remove(&mut self, key: &str) -> Result<(), PreferenceError> {
        if self.values.remove(key).is_some() {
            self.write()?;
        }
        Ok(())
    }
}

/// Label toggles owned by the host and passed into rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DisplayPreferences {
    pub show_day_of_month: bool,
    pub show_day_of_week: bool,
}

impl DisplayPreferences {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self {
            show_day_of_month: store.get_bool(KEY_DAY_OF_MONTH, false),
            show_day_of_week: store.get_bool(KEY_DAY_OF_WEEK, false),
        }
    }
}

/// Window placement read once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Widget size, clamped to [`MIN_SIZE`]..=[`MAX_SIZE`]
    pub size: i32,
    /// Saved top-left position, `None` to center on screen
    pub position: Option<(i32, i32)>,
    /// Boot-time read; there is no in-app toggle
    pub always_on_top: bool,
}

impl WindowGeometry {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let size = store
            .get_int(KEY_SIZE, DEFAULT_SIZE)
            .clamp(MIN_SIZE, MAX_SIZE);
        let x = store.get_int(KEY_X, UNSET_POSITION);
        let y = store.get_int(KEY_Y, UNSET_POSITION);
        let position = if x == UNSET_POSITION || y == UNSET_POSITION {
            None
        } else {
            Some((x, y))
        };
        Self {
            size,
            position,
            always_on_top: store.get_bool(KEY_ALWAYS_ON_TOP, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_on_empty_store() {
        let store = MemoryPreferences::new();
        let geometry = WindowGeometry::load(&store);
        assert_eq!(geometry.size, DEFAULT_SIZE);
        assert_eq!(geometry.position, None);
        assert!(geometry.always_on_top);

        assert_eq!(DisplayPreferences::load(&store), DisplayPreferences::default());
    }

    #[test]
    fn test_mistyped_values_fall_back_to_default() {
        let mut store = MemoryPreferences::new();
        store.put_bool(KEY_SIZE, true).unwrap();
        store.put_int(KEY_DAY_OF_MONTH, 1).unwrap();

        assert_eq!(store.get_int(KEY_SIZE, 400), 400);
        assert!(!store.get_bool(KEY_DAY_OF_MONTH, false));
    }

    #[test]
    fn test_geometry_clamps_stored_size() {
        let mut store = MemoryPreferences::new();
        store.put_int(KEY_SIZE, 5000).unwrap();
        assert_eq!(WindowGeometry::load(&store).size, MAX_SIZE);

        store.put_int(KEY_SIZE, 10).unwrap();
        assert_eq!(WindowGeometry::load(&store).size, MIN_SIZE);
    }

    #[test]
    fn test_geometry_needs_both_coordinates() {
        let mut store = MemoryPreferences::new();
        store.put_int(KEY_X, 120).unwrap();
        assert_eq!(WindowGeometry::load(&store).position, None);

        store.put_int(KEY_Y, 80).unwrap();
        assert_eq!(WindowGeometry::load(&store).position, Some((120, 80)));
    }

    #[test]
    fn test_toml_store_persists_every_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("preferences.toml");

        let mut store = TomlPreferences::open(&path);
        store.put_int(KEY_SIZE, 520).unwrap();
        store.put_bool(KEY_DAY_OF_WEEK, true).unwrap();
        store.put_int(KEY_X, 10).unwrap();
        store.remove(KEY_X).unwrap();

        let reopened = TomlPreferences::open(&path);
        assert_eq!(reopened.get_int(KEY_SIZE, 400), 520);
        assert!(reopened.get_bool(KEY_DAY_OF_WEEK, false));
        assert_eq!(reopened.get_int(KEY_X, UNSET_POSITION), UNSET_POSITION);
    }

    #[test]
    fn test_toml_store_ignores_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let store = TomlPreferences::open(&path);
        assert_eq!(store.get_int(KEY_SIZE, DEFAULT_SIZE), DEFAULT_SIZE);
    }

    #[test]
    fn test_toml_store_reads_hand_edited_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "always_on_top = false\nsize = 300\n").unwrap();

        let store = TomlPreferences::open(&path);
        let geometry = WindowGeometry::load(&store);
        assert!(!geometry.always_on_top);
        assert_eq!(geometry.size, 300);
    }
}

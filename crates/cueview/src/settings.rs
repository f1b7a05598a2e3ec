//! Application settings and window state persistence.
//!
//! This module provides the [`SettingsStore`] seam the window controllers
//! persist through, and [`Settings`], a hierarchical key-value store that
//! implements it with JSON or TOML files.
//!
//! # Path-Based Access
//!
//! Keys are paths using "/" (or ".") as separators. Window state lives under
//! one group per slot:
//!
//! ```ignore
//! use cueview::settings::Settings;
//!
//! let settings = Settings::new();
//! settings.set("App_2/Title", "Comp A");
//! settings.set("App_2/Size", vec![1280, 1024]);
//!
//! let title: String = settings.get_or("App_2/Title", "App_2".to_string());
//! ```
//!
//! # Persistence
//!
//! ```ignore
//! let settings = Settings::open("settings.json", SettingsFormat::Json)?;
//! // Every change is now written back atomically.
//! settings.set("Version", "1.4.0");
//! ```
//!
//! Auto-save failures are logged and otherwise ignored: window state that
//! cannot be written degrades to defaults on the next launch.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cueview_core::logging::targets;
use directories::ProjectDirs;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by explicit settings load/save calls.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read.
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file could not be written.
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file does not contain valid data for its format.
    #[error("invalid settings data in {path}: {message}")]
    InvalidData { path: PathBuf, message: String },

    /// A value could not be converted to or from its serialized form.
    #[error("failed to serialize setting: {0}")]
    Serialize(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// A stored settings value: scalar, array or nested group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum SettingsValue {
    /// A null/empty value.
    #[default]
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Integer(i64),
    /// A float.
    Float(f64),
    /// A string value.
    String(String),
    /// An array of values.
    Array(Vec<SettingsValue>),
    /// A nested group.
    Object(HashMap<String, SettingsValue>),
}

impl SettingsValue {
    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingsValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The integer, if this is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingsValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// The string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingsValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    pub fn as_array(&self) -> Option<&Vec<SettingsValue>> {
        match self {
            SettingsValue::Array(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for SettingsValue {
    fn from(v: bool) -> Self {
        SettingsValue::Bool(v)
    }
}

impl From<i32> for SettingsValue {
    fn from(v: i32) -> Self {
        SettingsValue::Integer(v as i64)
    }
}

impl From<u32> for SettingsValue {
    fn from(v: u32) -> Self {
        SettingsValue::Integer(v as i64)
    }
}

impl From<i64> for SettingsValue {
    fn from(v: i64) -> Self {
        SettingsValue::Integer(v)
    }
}

impl From<String> for SettingsValue {
    fn from(v: String) -> Self {
        SettingsValue::String(v)
    }
}

impl From<&str> for SettingsValue {
    fn from(v: &str) -> Self {
        SettingsValue::String(v.to_string())
    }
}

impl<T: Into<SettingsValue>> From<Vec<T>> for SettingsValue {
    fn from(v: Vec<T>) -> Self {
        SettingsValue::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Trait for types that can be extracted from a [`SettingsValue`].
pub trait FromSettingsValue: Sized {
    /// Attempts to convert a `SettingsValue` to this type.
    fn from_settings_value(value: &SettingsValue) -> Option<Self>;
}

impl FromSettingsValue for bool {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromSettingsValue for i32 {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_integer().and_then(|v| i32::try_from(v).ok())
    }
}

impl FromSettingsValue for u32 {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_integer().and_then(|v| u32::try_from(v).ok())
    }
}

impl FromSettingsValue for i64 {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_integer()
    }
}

impl FromSettingsValue for String {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl<T: FromSettingsValue> FromSettingsValue for Vec<T> {
    fn from_settings_value(value: &SettingsValue) -> Option<Self> {
        value
            .as_array()
            .and_then(|arr| arr.iter().map(T::from_settings_value).collect())
    }
}

/// The key/value persistence seam used by window controllers.
///
/// Implementations must be cheap and synchronous. Reads of missing or
/// mistyped keys fall back to the caller's default.
pub trait SettingsStore: Send + Sync {
    /// Returns the raw value stored at `key`, if any.
    fn value(&self, key: &str) -> Option<SettingsValue>;

    /// Stores `value` at `key`.
    fn set_value(&self, key: &str, value: SettingsValue);

    /// A human-readable identity of the backing store, for diagnostics.
    fn identity(&self) -> String;

    /// Hold back persistence until the matching [`end_batch`](Self::end_batch).
    ///
    /// Batches nest; only the outermost one writes.
    fn begin_batch(&self) {}

    /// Persist everything changed since the outermost `begin_batch`.
    fn end_batch(&self) {}
}

impl dyn SettingsStore {
    /// Gets the value at `key` converted to `T`, or `default`.
    pub fn get_or<T: FromSettingsValue>(&self, key: &str, default: T) -> T {
        self.value(key)
            .and_then(|value| T::from_settings_value(&value))
            .unwrap_or(default)
    }

    /// Stores any value convertible to a [`SettingsValue`].
    pub fn set<V: Into<SettingsValue>>(&self, key: &str, value: V) {
        self.set_value(key, value.into());
    }

    /// Run `f` as one batch: its changes are persisted once, at the end.
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> R {
        self.begin_batch();
        let result = f();
        self.end_batch();
        result
    }
}

/// A shared handle to a settings store.
pub type SharedSettings = Arc<dyn SettingsStore>;

/// On-disk settings formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    /// JSON format.
    Json,
    /// TOML format.
    Toml,
}

impl SettingsFormat {
    /// Guess the format from a file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Json,
        }
    }
}

#[derive(Debug, Clone)]
struct AutoSaveConfig {
    path: PathBuf,
    format: SettingsFormat,
}

#[derive(Debug, Default)]
struct Batch {
    depth: usize,
    dirty: bool,
}

/// A hierarchical key-value settings store.
///
/// Nested groups are kept as [`SettingsValue::Object`]s, so `App_2/Title`
/// lives in the `App_2` group and both file formats show one table per slot.
#[derive(Debug, Default)]
pub struct Settings {
    data: RwLock<HashMap<String, SettingsValue>>,
    auto_save: RwLock<Option<AutoSaveConfig>>,
    batch: Mutex<Batch>,
}

impl Settings {
    /// Creates a new empty, in-memory settings store.
    pub fn new() -> Self {
        Self::default()
    }

    fn from_data(data: HashMap<String, SettingsValue>) -> Self {
        Self {
            data: RwLock::new(data),
            ..Self::default()
        }
    }

    /// Opens the settings file at `path` with auto-save enabled.
    ///
    /// A missing file yields empty settings; the file is created on the
    /// first change.
    pub fn open(path: impl AsRef<Path>, format: SettingsFormat) -> SettingsResult<Self> {
        let path = path.as_ref();
        let settings = if path.exists() {
            match format {
                SettingsFormat::Json => Self::load_json(path)?,
                SettingsFormat::Toml => Self::load_toml(path)?,
            }
        } else {
            Self::new()
        };
        settings.set_auto_save(path, format);
        Ok(settings)
    }

    /// The platform settings file for an application, e.g.
    /// `~/.config/<app>/settings.json` on Linux.
    pub fn default_path(app_name: &str) -> Option<PathBuf> {
        ProjectDirs::from("", "", app_name).map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Write the whole store to `path` after every change or batch.
    pub fn set_auto_save(&self, path: impl AsRef<Path>, format: SettingsFormat) {
        *self.auto_save.write() = Some(AutoSaveConfig {
            path: path.as_ref().to_path_buf(),
            format,
        });
    }

    /// Sets a value at the specified path, creating intermediate groups.
    pub fn set<V: Into<SettingsValue>>(&self, path: &str, value: V) {
        let parts = Self::parse_path(path);
        if parts.is_empty() {
            return;
        }

        {
            let mut data = self.data.write();
            Self::set_nested(&mut data, &parts, value.into());
        }

        {
            let mut batch = self.batch.lock();
            if batch.depth > 0 {
                batch.dirty = true;
                return;
            }
        }
        self.try_auto_save();
    }

    /// Gets a value at the specified path converted to `T`.
    pub fn get<T: FromSettingsValue>(&self, path: &str) -> Option<T> {
        let data = self.data.read();
        let parts = Self::parse_path(path);
        Self::get_nested(&data, &parts).and_then(T::from_settings_value)
    }

    /// The value at `path` converted to `T`, or `default`.
    pub fn get_or<T: FromSettingsValue>(&self, path: &str, default: T) -> T {
        self.get(path).unwrap_or(default)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Read a JSON settings file.
    pub fn load_json(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = Self::read(path)?;
        let data = serde_json::from_str(&content).map_err(|e| SettingsError::InvalidData {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_data(data))
    }

    /// Read a TOML settings file.
    pub fn load_toml(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let content = Self::read(path)?;
        let data = toml::from_str(&content).map_err(|e| SettingsError::InvalidData {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self::from_data(data))
    }

    /// Saves settings to a JSON file, atomically.
    pub fn save_json(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        let json = serde_json::to_string_pretty(&*self.data.read())
            .map_err(|e| SettingsError::Serialize(e.to_string()))?;
        Self::atomic_write(path.as_ref(), json.as_bytes())
    }

    /// Saves settings to a TOML file, atomically.
    ///
    /// TOML has no null, so a store holding [`SettingsValue::Null`] fails
    /// with [`SettingsError::Serialize`].
    pub fn save_toml(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        let toml = toml::to_string_pretty(&*self.data.read())
            .map_err(|e| SettingsError::Serialize(e.to_string()))?;
        Self::atomic_write(path.as_ref(), toml.as_bytes())
    }

    /// Writes settings to the auto-save file, if one is configured.
    pub fn sync(&self) -> SettingsResult<()> {
        let config = self.auto_save.read().clone();
        match config {
            Some(config) => match config.format {
                SettingsFormat::Json => self.save_json(&config.path),
                SettingsFormat::Toml => self.save_toml(&config.path),
            },
            None => Ok(()),
        }
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    fn read(path: &Path) -> SettingsResult<String> {
        std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes through a temporary file in the target directory, then renames.
    fn atomic_write(path: &Path, bytes: &[u8]) -> SettingsResult<()> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.write_all(bytes).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    fn parse_path(path: &str) -> Vec<&str> {
        path.split(['.', '/']).filter(|s| !s.is_empty()).collect()
    }

    fn get_nested<'a>(
        data: &'a HashMap<String, SettingsValue>,
        parts: &[&str],
    ) -> Option<&'a SettingsValue> {
        let (first, rest) = parts.split_first()?;
        let value = data.get(*first)?;
        if rest.is_empty() {
            return Some(value);
        }
        match value {
            SettingsValue::Object(group) => Self::get_nested(group, rest),
            _ => None,
        }
    }

    fn set_nested(data: &mut HashMap<String, SettingsValue>, parts: &[&str], value: SettingsValue) {
        let Some((first, rest)) = parts.split_first() else {
            return;
        };

        if rest.is_empty() {
            data.insert(first.to_string(), value);
            return;
        }

        let entry = data
            .entry(first.to_string())
            .or_insert_with(|| SettingsValue::Object(HashMap::new()));
        if !matches!(entry, SettingsValue::Object(_)) {
            // Replace a scalar with a group
            *entry = SettingsValue::Object(HashMap::new());
        }
        if let SettingsValue::Object(group) = entry {
            Self::set_nested(group, rest, value);
        }
    }

    fn try_auto_save(&self) {
        if let Err(e) = self.sync() {
            tracing::error!(target: targets::SETTINGS, "failed to auto-save settings: {}", e);
        }
    }
}

impl SettingsStore for Settings {
    fn value(&self, key: &str) -> Option<SettingsValue> {
        let data = self.data.read();
        Self::get_nested(&data, &Self::parse_path(key)).cloned()
    }

    fn set_value(&self, key: &str, value: SettingsValue) {
        self.set(key, value);
    }

    fn identity(&self) -> String {
        match &*self.auto_save.read() {
            Some(config) => config.path.display().to_string(),
            None => "<memory>".to_string(),
        }
    }

    fn begin_batch(&self) {
        self.batch.lock().depth += 1;
    }

    fn end_batch(&self) {
        let flush = {
            let mut batch = self.batch.lock();
            batch.depth = batch.depth.saturating_sub(1);
            batch.depth == 0 && std::mem::take(&mut batch.dirty)
        };
        if flush {
            tracing::trace!(target: targets::SETTINGS, "flushing settings batch");
            self.try_auto_save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_get_set() {
        let settings = Settings::new();

        settings.set("name", "test");
        settings.set("count", 42);
        settings.set("enabled", true);

        assert_eq!(settings.get::<String>("name"), Some("test".to_string()));
        assert_eq!(settings.get::<i32>("count"), Some(42));
        assert_eq!(settings.get::<bool>("enabled"), Some(true));
    }

    #[test]
    fn test_slot_groups() {
        let settings = Settings::new();

        settings.set("App/Title", "Comp A");
        settings.set("App/Open", true);
        settings.set("App_2/Title", "Lighting");

        assert_eq!(settings.get::<String>("App/Title"), Some("Comp A".to_string()));
        assert_eq!(settings.get::<bool>("App/Open"), Some(true));
        assert_eq!(settings.get::<String>("App_2.Title"), Some("Lighting".to_string()));
    }

    #[test]
    fn test_get_or_default_on_missing_or_mistyped() {
        let settings = Settings::new();
        settings.set("App/Title", 7);

        assert_eq!(settings.get_or("App/Title", "App".to_string()), "App");
        assert_eq!(settings.get_or("App/Missing", 5), 5);
    }

    #[test]
    fn test_store_trait_helpers() {
        let store: SharedSettings = Arc::new(Settings::new());

        store.set("App/Size", vec![1280, 1024]);
        store.set("RevertLayout", true);

        assert_eq!(store.get_or("App/Size", Vec::<u32>::new()), vec![1280, 1024]);
        assert!(store.get_or("RevertLayout", false));
        assert_eq!(store.identity(), "<memory>");
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let settings = Settings::new();
        settings.set("App/Title", "Comp A");
        settings.set("App/Position", vec![10, 20]);
        settings.save_json(&path).unwrap();

        let loaded = Settings::load_json(&path).unwrap();
        assert_eq!(loaded.get::<String>("App/Title"), Some("Comp A".to_string()));
        assert_eq!(loaded.get::<Vec<i32>>("App/Position"), Some(vec![10, 20]));
    }

    #[test]
    fn test_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let settings = Settings::new();
        settings.set("Version", "1.0.0");
        settings.set("App_3/Open", false);
        settings.set("App_3/Size", vec![800, 600]);
        settings.save_toml(&path).unwrap();

        let loaded = Settings::load_toml(&path).unwrap();
        assert_eq!(loaded.get::<String>("Version"), Some("1.0.0".to_string()));
        assert_eq!(loaded.get::<bool>("App_3/Open"), Some(false));
        assert_eq!(loaded.get::<Vec<u32>>("App_3/Size"), Some(vec![800, 600]));
    }

    #[test]
    fn test_open_with_auto_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings::open(&path, SettingsFormat::Json).unwrap();
        assert_eq!(settings.identity(), path.display().to_string());
        settings.set("App/Title", "Comp B");

        let reopened = Settings::open(&path, SettingsFormat::Json).unwrap();
        assert_eq!(reopened.get::<String>("App/Title"), Some("Comp B".to_string()));
    }

    #[test]
    fn test_batch_defers_auto_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store: SharedSettings = Arc::new(Settings::open(&path, SettingsFormat::Json).unwrap());

        store.batch(|| {
            store.set("App/Title", "Comp A");
            store.batch(|| store.set("App/Open", true));
            // The inner batch must not flush the outer one.
            assert!(!path.exists());
        });

        let reopened = Settings::open(&path, SettingsFormat::Json).unwrap();
        assert_eq!(reopened.get::<String>("App/Title"), Some("Comp A".to_string()));
        assert_eq!(reopened.get::<bool>("App/Open"), Some(true));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_json(&path).err().unwrap();
        assert!(matches!(err, SettingsError::InvalidData { .. }));
    }
}

//! User settings and their synchronous persistence port.

use crate::geometry::PressureOptions;
use crate::object::{Color, ObjectStyle};
use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Persisted user preferences.
///
/// Every field has a serde default so a partial blob from an older version
/// merges over the defaults, and unknown keys from a newer version are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tool: Tool,
    pub color: Color,
    pub width: f64,
    pub pressure: PressureOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool: Tool::Brush,
            color: Color::black(),
            width: 4.0,
            pressure: PressureOptions::default(),
        }
    }
}

impl Settings {
    /// Decode a stored blob, falling back to defaults on any failure.
    pub fn from_json(blob: &str) -> Self {
        serde_json::from_str(blob).unwrap_or_else(|e| {
            log::warn!("discarding malformed settings: {e}");
            Self::default()
        })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            log::warn!("failed to serialize settings: {e}");
            "{}".to_string()
        })
    }

    /// The style a new object should be created with under these settings.
    /// Pressure options only attach to freehand tools.
    pub fn style_for(&self, tool: Tool) -> ObjectStyle {
        ObjectStyle {
            color: self.color,
            width: self.width,
            filled: false,
            erase: false,
            pressure: tool.is_freehand().then_some(self.pressure),
        }
    }
}

/// Synchronous settings persistence.
///
/// Saves are best-effort: an implementation that hits a quota or IO failure
/// logs and returns, so the in-memory settings always stay applied.
pub trait SettingsStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings);
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    blob: RwLock<Option<String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Settings {
        let blob = match self.blob.read() {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("settings store lock poisoned: {e}");
                return Settings::default();
            }
        };
        match blob.as_deref() {
            Some(blob) => Settings::from_json(blob),
            None => Settings::default(),
        }
    }

    fn save(&self, settings: &Settings) {
        match self.blob.write() {
            Ok(mut blob) => *blob = Some(settings.to_json()),
            Err(e) => log::warn!("settings store lock poisoned, save dropped: {e}"),
        }
    }
}

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Thresholds the gesture classifier uses to turn raw pointer events into
/// clicks, double-clicks and drags. Times are seconds, distances pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub click_max_duration: f64,
    pub click_max_distance: f32,
    pub double_click_window: f64,
    pub double_click_max_distance: f32,
    pub drag_threshold: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            click_max_duration: 0.5,
            click_max_distance: 4.0,
            double_click_window: 0.5,
            double_click_max_distance: 4.0,
            drag_threshold: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Prefix applied to document, texture and file paths.
    pub resource_root: String,
    pub gestures: GestureConfig,
}

impl BridgeConfig {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("failed to parse bridge config")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read bridge config {}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn to_json(&self) -> String {
        // plain data, serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn resolve(&self, path: &str) -> String {
        format!("{}{}", self.resource_root, path)
    }
}

use std::fs;
use std::path::Path;

use egui::{Color32, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::CanvasResult;

/// What happens to an in-progress stroke when the pointer is cancelled or leaves the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CancelPolicy {
    /// Keep what was painted and commit it like a pointer-up
    #[default]
    Commit,
    /// Throw the stroke away and revert to the current history entry
    Discard,
}

/// Tunables for a canvas session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // older config files keep working when fields are added
pub struct CanvasConfig {
    pub history_capacity: usize,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    pub min_tool_size: f32,
    pub max_tool_size: f32,
    pub default_brush_size: f32,
    pub default_eraser_size: f32,
    pub default_color: Color32,
    pub default_font_size: f32,
    pub default_font_family: String,
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Opaque document background, also used by the eraser
    pub background: Color32,
    /// Fraction of the container an inserted image may occupy
    pub insert_margin: f32,
    pub export_file_name: String,
    pub cancel_policy: CancelPolicy,
    /// Logical (pre device-pixel-ratio) size of the canvas element
    pub container_size: Vec2,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            history_capacity: 50,
            zoom_min: 0.5,
            zoom_max: 3.0,
            zoom_step: 0.1,
            min_tool_size: 1.0,
            max_tool_size: 200.0,
            default_brush_size: 8.0,
            default_eraser_size: 20.0,
            default_color: Color32::from_rgb(0xff, 0x66, 0xb2),
            default_font_size: 24.0,
            default_font_family: "Arial".to_owned(),
            min_font_size: 8.0,
            max_font_size: 200.0,
            background: Color32::WHITE,
            insert_margin: 0.8,
            export_file_name: "beyond-the-brush-lite.png".to_owned(),
            cancel_policy: CancelPolicy::Commit,
            container_size: Vec2::new(800.0, 600.0),
        }
    }
}

impl CanvasConfig {
    /// Parse a config from JSON, normalising out-of-range values
    pub fn from_json_str(json: &str) -> CanvasResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    pub fn load(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        log::info!("Loaded canvas config from {}", path.display());
        Self::from_json_str(&json)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Repair values that would break the session's invariants
    pub fn normalized(mut self) -> Self {
        if self.history_capacity == 0 {
            log::warn!("history_capacity of 0 is not usable, falling back to 1");
            self.history_capacity = 1;
        }
        if self.zoom_min > self.zoom_max {
            std::mem::swap(&mut self.zoom_min, &mut self.zoom_max);
        }
        if self.zoom_min <= 0.0 {
            self.zoom_min = 0.1;
        }
        if self.zoom_step <= 0.0 {
            self.zoom_step = 0.1;
        }
        if self.min_tool_size > self.max_tool_size {
            std::mem::swap(&mut self.min_tool_size, &mut self.max_tool_size);
        }
        if self.min_font_size > self.max_font_size {
            std::mem::swap(&mut self.min_font_size, &mut self.max_font_size);
        }
        self.insert_margin = self.insert_margin.clamp(0.05, 1.0);
        self.container_size = self.container_size.max(Vec2::splat(1.0));
        self
    }
}

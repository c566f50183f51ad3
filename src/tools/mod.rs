use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::config::CanvasConfig;

/// What a pointer press on the canvas does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    Draw,
    Text,
    Translate,
    Select,
}

impl ToolMode {
    pub const ALL: [ToolMode; 4] = [Self::Draw, Self::Text, Self::Translate, Self::Select];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Draw => "Draw",
            Self::Text => "Text",
            Self::Translate => "Translate",
            Self::Select => "Select",
        }
    }
}

/// User-facing tool configuration.
///
/// Brush and eraser sizes are in surface pixels and are never adjusted for
/// zoom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub mode: ToolMode,
    /// Only meaningful in [`ToolMode::Draw`]
    pub is_eraser: bool,
    pub color: Color32,
    pub brush_size: f32,
    pub eraser_size: f32,
    pub font_size: f32,
    pub font_family: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

impl ToolSettings {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            mode: ToolMode::Draw,
            is_eraser: false,
            color: config.default_color,
            brush_size: config.default_brush_size,
            eraser_size: config.default_eraser_size,
            font_size: config.default_font_size,
            font_family: config.default_font_family.clone(),
        }
    }

    /// Pull every numeric field back into the configured ranges
    pub fn clamped(mut self, config: &CanvasConfig) -> Self {
        self.set_brush_size(self.brush_size, config);
        self.set_eraser_size(self.eraser_size, config);
        self.set_font_size(self.font_size, config);
        self
    }

    pub fn set_brush_size(&mut self, size: f32, config: &CanvasConfig) {
        self.brush_size = clamp_or_min(size, config.min_tool_size, config.max_tool_size);
    }

    pub fn set_eraser_size(&mut self, size: f32, config: &CanvasConfig) {
        self.eraser_size = clamp_or_min(size, config.min_tool_size, config.max_tool_size);
    }

    pub fn set_font_size(&mut self, size: f32, config: &CanvasConfig) {
        self.font_size = clamp_or_min(size, config.min_font_size, config.max_font_size);
    }

    /// Picking a colour switches back to the brush
    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
        self.is_eraser = false;
    }

    /// Width of the active drawing tool, in surface pixels
    pub fn active_width(&self) -> f32 {
        if self.is_eraser {
            self.eraser_size
        } else {
            self.brush_size
        }
    }

    /// Short label for the toolbar
    pub fn mode_label(&self) -> &'static str {
        match self.mode {
            ToolMode::Select => "Select",
            ToolMode::Translate => "Translate",
            ToolMode::Text => "Text",
            ToolMode::Draw if self.is_eraser => "Eraser",
            ToolMode::Draw => "Brush",
        }
    }
}

fn clamp_or_min(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

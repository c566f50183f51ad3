use egui::{Pos2, Rect, Vec2};

use crate::config::CanvasConfig;

/// A translate-drag in progress, in client (screen) space
#[derive(Debug, Clone, Copy, PartialEq)]
struct PanDrag {
    start_client: Pos2,
    start_pan: Vec2,
}

/// Zoom and pan of the canvas on screen.
///
/// Purely presentational: nothing here ever touches the raster or the
/// surface-space size of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformController {
    zoom: f32,
    pan: Vec2,
    zoom_min: f32,
    zoom_max: f32,
    zoom_step: f32,
    drag: Option<PanDrag>,
}

impl Default for TransformController {
    fn default() -> Self {
        Self::new(&CanvasConfig::default())
    }
}

fn round_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

impl TransformController {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            zoom: 1.0_f32.clamp(config.zoom_min, config.zoom_max),
            pan: Vec2::ZERO,
            zoom_min: config.zoom_min,
            zoom_max: config.zoom_max,
            zoom_step: config.zoom_step,
            drag: None,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom for display, e.g. `150` for 1.5x
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    pub fn pan(&self) -> Vec2 {
        self.pan
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_nan() {
            return;
        }
        self.zoom = round_hundredths(zoom.clamp(self.zoom_min, self.zoom_max));
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - self.zoom_step);
    }

    pub fn is_panning(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin_pan(&mut self, client: Pos2) {
        self.drag = Some(PanDrag {
            start_client: client,
            start_pan: self.pan,
        });
    }

    /// Move the active drag to `client`. Ignored when no drag is active.
    pub fn update_pan(&mut self, client: Pos2) {
        if let Some(drag) = self.drag {
            self.pan = drag.start_pan + (client - drag.start_client);
        }
    }

    pub fn end_pan(&mut self) {
        self.drag = None;
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zero the pan offset, leaving zoom alone
    pub fn reset_transform(&mut self) {
        self.drag = None;
        self.pan = Vec2::ZERO;
    }

    /// Back to 100% and no pan
    pub fn reset(&mut self) {
        self.reset_transform();
        self.zoom = 1.0_f32.clamp(self.zoom_min, self.zoom_max);
    }

    /// Where the canvas is drawn on screen: scaled about the container centre,
    /// then shifted by the pan offset
    pub fn display_rect(&self, container: Rect) -> Rect {
        Rect::from_center_size(container.center() + self.pan, container.size() * self.zoom)
    }
}

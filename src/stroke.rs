use egui::{Color32, Pos2};

use crate::surface::Surface;
use crate::tools::ToolSettings;

/// How a stroke is painted, fixed for the whole stroke at pointer-down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Surface pixels, independent of zoom
    pub width: f32,
    pub color: Color32,
    /// Paint the background colour instead of `color`
    pub erase: bool,
}

impl StrokeStyle {
    pub fn from_settings(settings: &ToolSettings) -> Self {
        Self {
            width: settings.active_width(),
            color: settings.color,
            erase: settings.is_eraser,
        }
    }
}

/// Where the stroke engine is in its `Idle -> Drawing -> Idle` cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing {
        last_point: Pos2,
        style: StrokeStyle,
        segments: usize,
    },
}

/// Summary of a stroke that just ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishedStroke {
    pub style: StrokeStyle,
    /// Segments painted after the initial dot
    pub segments: usize,
}

/// Turns pointer samples into painted segments.
///
/// Every sample paints immediately; there is no batching.
#[derive(Debug, Clone, Default)]
pub struct StrokeEngine {
    state: StrokeState,
}

impl StrokeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, StrokeState::Drawing { .. })
    }

    pub fn current_state_name(&self) -> &'static str {
        match self.state {
            StrokeState::Idle => "Idle",
            StrokeState::Drawing { .. } => "Drawing",
        }
    }

    /// Start a stroke at `point`, leaving a round dot where the pointer went down.
    ///
    /// A stroke already in progress is replaced; callers finish it first.
    pub fn begin(&mut self, point: Pos2, style: StrokeStyle, surface: &mut Surface) {
        surface.paint_stroke_segment(point, point, style.width, style.color, style.erase);
        self.state = StrokeState::Drawing {
            last_point: point,
            style,
            segments: 0,
        };
    }

    /// Paint from the last point to `point`. Returns false when idle.
    pub fn extend(&mut self, point: Pos2, surface: &mut Surface) -> bool {
        let StrokeState::Drawing {
            last_point,
            style,
            segments,
        } = &mut self.state
        else {
            return false;
        };
        surface.paint_stroke_segment(*last_point, point, style.width, style.color, style.erase);
        *last_point = point;
        *segments += 1;
        true
    }

    /// Close the path. `None` if no stroke was active.
    pub fn finish(&mut self) -> Option<FinishedStroke> {
        match std::mem::take(&mut self.state) {
            StrokeState::Idle => None,
            StrokeState::Drawing { style, segments, .. } => Some(FinishedStroke { style, segments }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(width: f32) -> StrokeStyle {
        StrokeStyle {
            width,
            color: Color32::BLACK,
            erase: false,
        }
    }

    #[test]
    fn cycles_through_states() {
        let mut surface = Surface::new(100, 100, Color32::WHITE).unwrap();
        let mut engine = StrokeEngine::new();
        assert_eq!(engine.current_state_name(), "Idle");
        assert!(!engine.extend(Pos2::new(5.0, 5.0), &mut surface));

        engine.begin(Pos2::new(10.0, 10.0), style(4.0), &mut surface);
        assert!(engine.is_drawing());
        assert!(engine.extend(Pos2::new(50.0, 10.0), &mut surface));
        assert!(engine.extend(Pos2::new(50.0, 50.0), &mut surface));

        let finished = engine.finish().unwrap();
        assert_eq!(finished.segments, 2);
        assert_eq!(engine.current_state_name(), "Idle");
        assert!(engine.finish().is_none());

        assert_eq!(surface.pixel(30, 10), Some(Color32::BLACK));
        assert_eq!(surface.pixel(50, 30), Some(Color32::BLACK));
        assert_eq!(surface.pixel(30, 30), Some(Color32::WHITE));
    }

    #[test]
    fn press_without_motion_leaves_a_dot() {
        let mut surface = Surface::new(20, 20, Color32::WHITE).unwrap();
        let mut engine = StrokeEngine::new();
        engine.begin(Pos2::new(10.0, 10.0), style(6.0), &mut surface);
        assert_eq!(engine.finish().unwrap().segments, 0);
        assert_eq!(surface.pixel(10, 10), Some(Color32::BLACK));
    }

    #[test]
    fn style_follows_active_tool() {
        let mut settings = ToolSettings::default();
        assert_eq!(StrokeStyle::from_settings(&settings).width, 8.0);
        settings.is_eraser = true;
        let eraser = StrokeStyle::from_settings(&settings);
        assert!(eraser.erase);
        assert_eq!(eraser.width, 20.0);
    }
}

use egui::{Color32, Pos2, Rect, Vec2};

use super::ObjectId;
use crate::surface::{Placement, Surface};
use crate::text::{self as glyphs, FontRegistry};

/// An editable single-line text box, drawn above the raster
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    id: ObjectId,
    position: Pos2,
    content: String,
    font_size: f32,
    font_family: String,
    color: Color32,
}

impl TextBox {
    pub(crate) fn new(position: Pos2, font_size: f32, font_family: String, color: Color32) -> Self {
        Self {
            id: ObjectId::new(),
            position,
            content: String::new(),
            font_size,
            font_family,
            color,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub(crate) fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    pub(crate) fn rescale(&mut self, placement: &Placement) {
        self.position = placement.apply(self.position);
        self.font_size = placement.apply_len(self.font_size);
    }

    /// Bounds of the rendered run; an empty box still gets a caret-sized rect
    pub fn rect(&self, fonts: &FontRegistry) -> Rect {
        let font = fonts.resolve(&self.font_family);
        let size = glyphs::measure(font, self.font_size, &self.content);
        Rect::from_min_size(self.position, Vec2::new(size.x.max(1.0), size.y))
    }

    pub(crate) fn draw(&self, surface: &mut Surface, fonts: &FontRegistry) {
        if self.content.is_empty() {
            return;
        }
        surface.fill_text(
            fonts,
            &self.content,
            self.position,
            self.font_size,
            &self.font_family,
            self.color,
        );
    }
}

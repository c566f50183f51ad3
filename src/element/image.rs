use std::sync::Arc;

use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;

use super::ObjectId;
use crate::error::{CanvasError, CanvasResult};
use crate::surface::{self, Placement, Surface};

/// An image inserted from a file, kept apart from the raster so it can be
/// moved and redrawn after the buffer changes size
#[derive(Clone)]
pub struct InsertedImage {
    id: ObjectId,
    /// The encoded file as the user supplied it
    source: Arc<[u8]>,
    /// Decoded pixels, shared between history entries
    pixels: Arc<RgbaImage>,
    position: Pos2,
    size: Vec2,
}

// Custom Debug implementation so pixel buffers don't flood the logs
impl std::fmt::Debug for InsertedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertedImage")
            .field("id", &self.id)
            .field("source_len", &self.source.len())
            .field("pixels", &self.pixels.dimensions())
            .field("position", &self.position)
            .field("size", &self.size)
            .finish()
    }
}

impl PartialEq for InsertedImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.position == other.position
            && self.size == other.size
            && Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl InsertedImage {
    /// Decode `source` and fit it into `container` (surface pixels).
    ///
    /// The image is scaled by `min(cw/iw, ch/ih) * margin` and centred.
    pub(crate) fn decode_and_fit(source: Arc<[u8]>, container: Vec2, margin: f32) -> CanvasResult<Self> {
        let pixels = surface::decode_raster(&source)?;
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(CanvasError::InvalidDimensions {
                width: pixels.width(),
                height: pixels.height(),
            });
        }
        let natural = Vec2::new(pixels.width() as f32, pixels.height() as f32);
        let ratio = (container.x / natural.x).min(container.y / natural.y) * margin;
        let size = natural * ratio;
        let position = Pos2::new((container.x - size.x) / 2.0, (container.y - size.y) / 2.0);
        log::info!(
            "🖼️ Inserted image {}x{} -> {:.0}x{:.0} at ({:.0}, {:.0})",
            natural.x,
            natural.y,
            size.x,
            size.y,
            position.x,
            position.y
        );
        Ok(Self {
            id: ObjectId::new(),
            source,
            pixels: Arc::new(pixels),
            position,
            size,
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn natural_size(&self) -> [u32; 2] {
        [self.pixels.width(), self.pixels.height()]
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size)
    }

    pub(crate) fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    pub(crate) fn rescale(&mut self, placement: &Placement) {
        self.position = placement.apply(self.position);
        self.size *= placement.scale;
    }

    pub(crate) fn draw(&self, surface: &mut Surface) {
        surface.blit_image(&self.pixels, self.rect());
    }
}

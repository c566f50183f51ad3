use std::io::Cursor;

use egui::{Color32, Pos2, Rect, Vec2};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, ImageReader, Rgba, RgbaImage};

use crate::error::{CanvasError, CanvasResult};
use crate::geometry::hit_testing::distance_to_segment;
use crate::text::{self as glyphs, FontRegistry};

/// How content from an old buffer lands in a new one.
///
/// Produced by [`Surface::resize`] and by restoring a snapshot of a different
/// size, so objects can follow the raster they sit on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub offset: Vec2,
}

impl Placement {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    /// Letterbox `from` into `to`: uniform scale, centred, never cropped
    pub fn letterbox(from: [u32; 2], to: [u32; 2]) -> (Self, [u32; 2]) {
        if from == to {
            return (Self::IDENTITY, to);
        }
        let scale = (to[0] as f32 / from[0] as f32).min(to[1] as f32 / from[1] as f32);
        let scaled = [
            ((from[0] as f32 * scale).round() as u32).clamp(1, to[0]),
            ((from[1] as f32 * scale).round() as u32).clamp(1, to[1]),
        ];
        let offset = Vec2::new(
            ((to[0] - scaled[0]) / 2) as f32,
            ((to[1] - scaled[1]) / 2) as f32,
        );
        (Self { scale, offset }, scaled)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn apply(&self, pos: Pos2) -> Pos2 {
        Pos2::new(pos.x * self.scale, pos.y * self.scale) + self.offset
    }

    pub fn apply_len(&self, len: f32) -> f32 {
        len * self.scale
    }
}

/// Decode an encoded raster (PNG or any format `image` recognises)
pub fn decode_raster(bytes: &[u8]) -> CanvasResult<RgbaImage> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()?;
    Ok(decoded.to_rgba8())
}

/// Encode pixels as PNG
pub fn encode_png(image: &RgbaImage) -> CanvasResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|err| CanvasError::Encode(err.to_string()))?;
    Ok(bytes)
}

fn to_rgba(color: Color32) -> Rgba<u8> {
    Rgba(color.to_srgba_unmultiplied())
}

/// Source-over blend of an unmultiplied colour with extra coverage
fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let alpha = (src[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    if alpha >= 1.0 {
        *dst = src;
        return;
    }
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    for channel in 0..3 {
        let value = (src[channel] as f32 * alpha
            + dst[channel] as f32 * dst_alpha * (1.0 - alpha))
            / out_alpha;
        dst[channel] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round() as u8;
}

/// The backing pixel buffer of the canvas
#[derive(Clone, PartialEq)]
pub struct Surface {
    image: RgbaImage,
    background: Color32,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .field("background", &self.background)
            .finish()
    }
}

impl Surface {
    /// A buffer filled with the opaque background colour
    pub fn new(width: u32, height: u32, background: Color32) -> CanvasResult<Self> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, to_rgba(background)),
            background,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn size(&self) -> [u32; 2] {
        [self.image.width(), self.image.height()]
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        (x < self.width() && y < self.height()).then(|| {
            let [r, g, b, a] = self.image.get_pixel(x, y).0;
            Color32::from_rgba_unmultiplied(r, g, b, a)
        })
    }

    pub fn clear(&mut self) {
        let background = to_rgba(self.background);
        for pixel in self.image.pixels_mut() {
            *pixel = background;
        }
    }

    fn blend_at(&mut self, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        blend(self.image.get_pixel_mut(x as u32, y as u32), color, coverage);
    }

    /// Paint one round-capped segment. Consecutive segments share their end
    /// caps, which gives round joins.
    ///
    /// With `erase` the background colour is painted instead of `color`.
    pub fn paint_stroke_segment(
        &mut self,
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
        erase: bool,
    ) {
        let color = to_rgba(if erase { self.background } else { color });
        let radius = (width / 2.0).max(0.5);

        let bounds = Rect::from_two_pos(from, to).expand(radius + 1.0);
        let x0 = bounds.min.x.floor().max(0.0) as i32;
        let y0 = bounds.min.y.floor().max(0.0) as i32;
        let x1 = bounds.max.x.ceil().min(self.width() as f32) as i32;
        let y1 = bounds.max.y.ceil().min(self.height() as f32) as i32;

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let distance = distance_to_segment(center, from, to);
                let coverage = radius + 0.5 - distance;
                if coverage > 0.0 {
                    self.blend_at(x, y, color, coverage);
                }
            }
        }
    }

    /// Fill an axis-aligned rectangle, snapped to whole pixels
    pub fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let color = to_rgba(color);
        let x0 = rect.min.x.round().max(0.0) as i32;
        let y0 = rect.min.y.round().max(0.0) as i32;
        let x1 = rect.max.x.round().min(self.width() as f32) as i32;
        let y1 = rect.max.y.round().min(self.height() as f32) as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_at(x, y, color, 1.0);
            }
        }
    }

    /// Rasterize a single-line text run with its top-left at `position`
    pub fn fill_text(
        &mut self,
        fonts: &FontRegistry,
        text: &str,
        position: Pos2,
        font_size: f32,
        font_family: &str,
        color: Color32,
    ) {
        let font = fonts.resolve(font_family);
        let color = to_rgba(color);
        glyphs::rasterize(font, font_size, text, position, |x, y, coverage| {
            self.blend_at(x, y, color, coverage);
        });
    }

    /// Draw `source` scaled into `rect`
    pub fn blit_image(&mut self, source: &RgbaImage, rect: Rect) {
        let width = rect.width().round() as u32;
        let height = rect.height().round() as u32;
        if width == 0 || height == 0 || source.width() == 0 || source.height() == 0 {
            return;
        }

        let resized;
        let pixels = if source.dimensions() == (width, height) {
            source
        } else {
            resized = imageops::resize(source, width, height, FilterType::Triangle);
            &resized
        };

        let origin_x = rect.min.x.round() as i32;
        let origin_y = rect.min.y.round() as i32;
        for (x, y, pixel) in pixels.enumerate_pixels() {
            self.blend_at(origin_x + x as i32, origin_y + y as i32, *pixel, 1.0);
        }
    }

    /// Dashed outline, used for transient selection feedback
    pub fn stroke_dashed_rect(&mut self, rect: Rect, color: Color32, width: f32, dash: f32, gap: f32) {
        let period = (dash + gap).max(1.0);
        let half = width / 2.0;
        let edges = [
            (rect.left_top(), rect.right_top()),
            (rect.right_top(), rect.right_bottom()),
            (rect.right_bottom(), rect.left_bottom()),
            (rect.left_bottom(), rect.left_top()),
        ];
        for (start, end) in edges {
            let length = (end - start).length();
            if length <= 0.0 {
                continue;
            }
            let direction = (end - start) / length;
            let mut travelled = 0.0;
            while travelled < length {
                let dash_end = (travelled + dash).min(length);
                let a = start + direction * travelled;
                let b = start + direction * dash_end;
                self.fill_rect(Rect::from_two_pos(a, b).expand(half), color);
                travelled += period;
            }
        }
    }

    /// Reallocate to a new size, letterboxing the old content into it
    pub fn resize(&mut self, width: u32, height: u32) -> CanvasResult<Placement> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        let old = std::mem::replace(
            &mut self.image,
            RgbaImage::from_pixel(width, height, to_rgba(self.background)),
        );
        let placement = self.place(&old);
        log::debug!(
            "Surface resized {}x{} -> {}x{} (scale {:.3})",
            old.width(),
            old.height(),
            width,
            height,
            placement.scale
        );
        Ok(placement)
    }

    /// Replace the raster with `content`, letterboxing when sizes differ
    pub fn replace_raster(&mut self, content: RgbaImage) -> Placement {
        if content.dimensions() == self.image.dimensions() {
            self.image = content;
            return Placement::IDENTITY;
        }
        self.clear();
        self.place(&content)
    }

    fn place(&mut self, content: &RgbaImage) -> Placement {
        let (placement, scaled_size) = Placement::letterbox(
            [content.width(), content.height()],
            self.size(),
        );
        let x = placement.offset.x as i64;
        let y = placement.offset.y as i64;
        if [content.width(), content.height()] == scaled_size {
            imageops::replace(&mut self.image, content, x, y);
        } else {
            let scaled = imageops::resize(content, scaled_size[0], scaled_size[1], FilterType::Triangle);
            imageops::replace(&mut self.image, &scaled, x, y);
        }
        placement
    }

    /// Current raster as PNG bytes
    pub fn export_encoded(&self) -> CanvasResult<Vec<u8>> {
        encode_png(&self.image)
    }

    /// Replace the raster with decoded bytes.
    ///
    /// On a decode failure the current content is left untouched.
    pub fn load_encoded(&mut self, bytes: &[u8]) -> CanvasResult<Placement> {
        let decoded = decode_raster(bytes)?;
        Ok(self.replace_raster(decoded))
    }

    /// Copy of the raster resampled to an exact size
    pub fn scaled_to(&self, width: u32, height: u32) -> RgbaImage {
        if (width, height) == self.image.dimensions() {
            self.image.clone()
        } else {
            imageops::resize(&self.image, width.max(1), height.max(1), FilterType::Triangle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn white(width: u32, height: u32) -> Surface {
        Surface::new(width, height, Color32::WHITE).unwrap()
    }

    #[test]
    fn starts_with_opaque_background() {
        let surface = white(4, 3);
        assert_eq!(surface.size(), [4, 3]);
        assert_eq!(surface.pixel(3, 2), Some(Color32::WHITE));
        assert_eq!(surface.pixel(4, 0), None);
        assert!(Surface::new(0, 10, Color32::WHITE).is_err());
    }

    #[test]
    fn stroke_covers_its_width_only() {
        let mut surface = white(100, 40);
        surface.paint_stroke_segment(Pos2::new(10.0, 20.0), Pos2::new(90.0, 20.0), 8.0, Color32::BLACK, false);
        assert_eq!(surface.pixel(50, 20), Some(Color32::BLACK));
        assert_eq!(surface.pixel(50, 17), Some(Color32::BLACK));
        assert_eq!(surface.pixel(50, 30), Some(Color32::WHITE));
        // Round cap extends past the end point by the radius
        assert_eq!(surface.pixel(92, 20), Some(Color32::BLACK));
        assert_eq!(surface.pixel(97, 20), Some(Color32::WHITE));
    }

    #[test]
    fn eraser_repaints_background() {
        let mut surface = white(50, 50);
        surface.fill_rect(Rect::from_min_size(Pos2::ZERO, Vec2::splat(50.0)), Color32::RED);
        surface.paint_stroke_segment(Pos2::new(5.0, 25.0), Pos2::new(45.0, 25.0), 10.0, Color32::RED, true);
        assert_eq!(surface.pixel(25, 25), Some(Color32::WHITE));
        assert_eq!(surface.pixel(25, 5), Some(Color32::RED));
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let mut surface = white(20, 20);
        surface.paint_stroke_segment(Pos2::new(2.0, 2.0), Pos2::new(18.0, 15.0), 3.0, Color32::BLUE, false);
        let bytes = surface.export_encoded().unwrap();
        let mut restored = white(20, 20);
        let placement = restored.load_encoded(&bytes).unwrap();
        assert!(placement.is_identity());
        assert_eq!(restored, surface);
    }

    #[test]
    fn corrupt_bytes_leave_content_alone() {
        let mut surface = white(8, 8);
        surface.fill_rect(Rect::from_min_size(Pos2::ZERO, Vec2::splat(4.0)), Color32::GREEN);
        let before = surface.clone();
        assert!(surface.load_encoded(b"definitely not a png").is_err());
        assert_eq!(surface, before);
    }

    #[test]
    fn letterbox_keeps_aspect_ratio() {
        let (placement, size) = Placement::letterbox([800, 600], [400, 600]);
        assert_eq!(placement.scale, 0.5);
        assert_eq!(size, [400, 300]);
        assert_eq!(placement.offset, Vec2::new(0.0, 150.0));
        assert_eq!(placement.apply(Pos2::new(800.0, 600.0)), Pos2::new(400.0, 450.0));
    }

    #[test]
    fn blit_scales_into_rect() {
        let source = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let mut surface = white(20, 20);
        surface.blit_image(&source, Rect::from_min_size(Pos2::new(5.0, 5.0), Vec2::splat(10.0)));
        let centre = surface.pixel(10, 10).unwrap();
        assert!(centre.b() > 250 && centre.r() < 5);
        assert_eq!(surface.pixel(4, 4), Some(Color32::WHITE));
        assert_eq!(surface.pixel(15, 15), Some(Color32::WHITE));
    }

    #[test]
    fn dashed_rect_leaves_gaps() {
        let mut surface = white(40, 40);
        surface.stroke_dashed_rect(
            Rect::from_min_size(Pos2::new(5.0, 5.0), Vec2::splat(30.0)),
            Color32::GREEN,
            2.0,
            5.0,
            5.0,
        );
        assert_eq!(surface.pixel(7, 5), Some(Color32::GREEN));
        assert_eq!(surface.pixel(12, 5), Some(Color32::WHITE));
        assert_eq!(surface.pixel(20, 20), Some(Color32::WHITE));
    }
}

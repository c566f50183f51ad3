use std::collections::HashMap;

use ab_glyph::{point, Font, FontArc, GlyphId, ScaleFont};
use egui::{Pos2, Vec2};

use crate::error::{CanvasError, CanvasResult};

/// Family names that resolve to the bundled proportional face
const PROPORTIONAL_ALIASES: &[&str] = &["Arial", "Helvetica", "sans-serif", "Ubuntu"];
/// Family names that resolve to the bundled monospace face
const MONOSPACE_ALIASES: &[&str] = &["monospace", "Courier New", "Hack"];

/// Fonts available to text boxes, looked up by family name.
///
/// Unknown families fall back to the proportional face so a text box never
/// fails to render because the shell offered a family we don't ship.
#[derive(Clone)]
pub struct FontRegistry {
    fonts: HashMap<String, FontArc>,
    fallback: FontArc,
}

impl std::fmt::Debug for FontRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut families: Vec<_> = self.fonts.keys().collect();
        families.sort();
        f.debug_struct("FontRegistry")
            .field("families", &families)
            .finish()
    }
}

impl FontRegistry {
    /// Registry seeded with the fonts egui embeds by default
    pub fn with_default_fonts() -> CanvasResult<Self> {
        let definitions = egui::FontDefinitions::default();
        let load = |family: egui::FontFamily| -> CanvasResult<FontArc> {
            let name = definitions
                .families
                .get(&family)
                .and_then(|names| names.first())
                .ok_or_else(|| CanvasError::FontUnavailable(format!("{family:?}")))?;
            let data = definitions
                .font_data
                .get(name)
                .ok_or_else(|| CanvasError::FontUnavailable(name.clone()))?;
            FontArc::try_from_vec(data.font.to_vec())
                .map_err(|_| CanvasError::FontUnavailable(name.clone()))
        };

        let proportional = load(egui::FontFamily::Proportional)?;
        let monospace = load(egui::FontFamily::Monospace)?;

        let mut fonts = HashMap::new();
        for alias in PROPORTIONAL_ALIASES {
            fonts.insert(alias.to_lowercase(), proportional.clone());
        }
        for alias in MONOSPACE_ALIASES {
            fonts.insert(alias.to_lowercase(), monospace.clone());
        }

        Ok(Self {
            fonts,
            fallback: proportional,
        })
    }

    /// Register (or replace) a family from raw TTF/OTF bytes
    pub fn register(&mut self, family: &str, bytes: Vec<u8>) -> CanvasResult<()> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|_| CanvasError::FontUnavailable(family.to_owned()))?;
        log::info!("Registered font family {family}");
        self.fonts.insert(family.to_lowercase(), font);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.fonts.contains_key(&family.to_lowercase())
    }

    pub fn resolve(&self, family: &str) -> &FontArc {
        self.fonts
            .get(&family.to_lowercase())
            .unwrap_or(&self.fallback)
    }
}

fn positioned_glyphs(font: &FontArc, font_size: f32, text: &str) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(font_size);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor_x = 0.0;
    let mut previous: Option<GlyphId> = None;
    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        glyphs.push((glyph_id, cursor_x));
        cursor_x += scaled.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
    (glyphs, cursor_x)
}

/// Size of a single-line run, top of the em box to the bottom of descenders
pub fn measure(font: &FontArc, font_size: f32, text: &str) -> Vec2 {
    let (_, width) = positioned_glyphs(font, font_size, text);
    Vec2::new(width, font.as_scaled(font_size).height())
}

/// Rasterize a run with its top-left at `origin`, reporting coverage per pixel
pub fn rasterize(
    font: &FontArc,
    font_size: f32,
    text: &str,
    origin: Pos2,
    mut plot: impl FnMut(i32, i32, f32),
) {
    let scaled = font.as_scaled(font_size);
    let baseline = origin.y + scaled.ascent();
    let (glyphs, _) = positioned_glyphs(font, font_size, text);

    for (glyph_id, offset_x) in glyphs {
        let glyph = glyph_id.with_scale_and_position(font_size, point(origin.x + offset_x, baseline));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                plot(
                    bounds.min.x as i32 + gx as i32,
                    bounds.min.y as i32 + gy as i32,
                    coverage,
                );
            });
        }
    }
}

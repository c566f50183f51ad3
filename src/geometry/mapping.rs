use egui::{Pos2, Rect, Vec2};

use crate::error::{CanvasError, CanvasResult};

/// Backing buffer dimensions for a container of the given logical size.
///
/// Always at least one pixel in each direction.
pub fn buffer_size_for(container: Vec2, device_pixel_ratio: f32) -> [u32; 2] {
    let dpr = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };
    [
        ((container.x * dpr).round() as u32).max(1),
        ((container.y * dpr).round() as u32).max(1),
    ]
}

/// Converts client (screen) positions into surface-space positions.
///
/// `bounds` is the on-screen rectangle the surface is *rendered* into, so it
/// already includes zoom and pan. Nothing here divides by zoom again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    bounds: Rect,
    buffer_size: [u32; 2],
}

impl CoordinateMapper {
    pub fn new(bounds: Rect, buffer_size: [u32; 2]) -> Self {
        Self { bounds, buffer_size }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn buffer_size(&self) -> [u32; 2] {
        self.buffer_size
    }

    /// Map a client position to surface space
    pub fn to_surface(&self, client: Pos2) -> CanvasResult<Pos2> {
        if !client.x.is_finite() || !client.y.is_finite() {
            return Err(CanvasError::MissingCoordinates);
        }
        let size = self.bounds.size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return Err(CanvasError::InvalidDimensions {
                width: size.x.max(0.0) as u32,
                height: size.y.max(0.0) as u32,
            });
        }
        let nx = (client.x - self.bounds.min.x) / size.x;
        let ny = (client.y - self.bounds.min.y) / size.y;
        Ok(Pos2::new(
            nx * self.buffer_size[0] as f32,
            ny * self.buffer_size[1] as f32,
        ))
    }

    /// Inverse of [`Self::to_surface`], used to place editors over the canvas
    pub fn to_client(&self, surface: Pos2) -> Pos2 {
        let size = self.bounds.size();
        Pos2::new(
            self.bounds.min.x + surface.x / self.buffer_size[0].max(1) as f32 * size.x,
            self.bounds.min.y + surface.y / self.buffer_size[1].max(1) as f32 * size.y,
        )
    }

    /// How many client points one surface pixel covers horizontally
    pub fn client_per_surface(&self) -> f32 {
        self.bounds.width() / self.buffer_size[0].max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_size_scales_by_device_pixel_ratio() {
        assert_eq!(buffer_size_for(Vec2::new(800.0, 600.0), 1.0), [800, 600]);
        assert_eq!(buffer_size_for(Vec2::new(800.0, 600.0), 2.0), [1600, 1200]);
        assert_eq!(buffer_size_for(Vec2::new(800.0, 600.0), f32::NAN), [800, 600]);
    }

    #[test]
    fn maps_corners_and_centre() {
        let bounds = Rect::from_min_size(Pos2::new(100.0, 50.0), Vec2::new(400.0, 300.0));
        let mapper = CoordinateMapper::new(bounds, [800, 600]);
        assert_eq!(mapper.to_surface(Pos2::new(100.0, 50.0)).unwrap(), Pos2::ZERO);
        assert_eq!(
            mapper.to_surface(Pos2::new(300.0, 200.0)).unwrap(),
            Pos2::new(400.0, 300.0)
        );
        assert_eq!(
            mapper.to_surface(Pos2::new(500.0, 350.0)).unwrap(),
            Pos2::new(800.0, 600.0)
        );
    }

    #[test]
    fn zoomed_bounds_are_not_divided_twice() {
        // A 3x zoom is visible only through the larger rendered rect.
        let bounds = Rect::from_min_size(Pos2::ZERO, Vec2::new(2400.0, 1800.0));
        let mapper = CoordinateMapper::new(bounds, [800, 600]);
        assert_eq!(
            mapper.to_surface(Pos2::new(1200.0, 900.0)).unwrap(),
            Pos2::new(400.0, 300.0)
        );
    }

    #[test]
    fn round_trips_through_client_space() {
        let bounds = Rect::from_min_size(Pos2::new(10.0, 20.0), Vec2::new(400.0, 300.0));
        let mapper = CoordinateMapper::new(bounds, [1600, 1200]);
        let surface = mapper.to_surface(Pos2::new(110.0, 95.0)).unwrap();
        assert_eq!(surface, Pos2::new(400.0, 300.0));
        assert_eq!(mapper.to_client(surface), Pos2::new(110.0, 95.0));
    }

    #[test]
    fn non_finite_coordinates_fail_fast() {
        let mapper = CoordinateMapper::new(Rect::from_min_size(Pos2::ZERO, Vec2::splat(10.0)), [10, 10]);
        assert!(matches!(
            mapper.to_surface(Pos2::new(f32::NAN, 1.0)),
            Err(CanvasError::MissingCoordinates)
        ));
    }
}

use egui::{Pos2, Rect};

/// Extra slack around objects when picking them with a pointer
pub const PICK_PADDING: f32 = 2.0;

/// Distance from a point to a line segment.
///
/// Degenerates to point distance when the segment has zero length.
pub fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let line = end - start;
    let to_point = point - start;

    let len_sq = line.length_sq();
    if len_sq == 0.0 {
        return to_point.length();
    }

    let t = (to_point.dot(line) / len_sq).clamp(0.0, 1.0);
    let projection = start + line * t;
    (point - projection).length()
}

/// Inclusive containment test with padding, matching how the canvas picks objects
pub fn rect_contains(rect: Rect, pos: Pos2, padding: f32) -> bool {
    rect.expand(padding).contains(pos)
}

/// Build a rectangle from two drag corners in any order
pub fn rect_from_corners(a: Pos2, b: Pos2) -> Rect {
    Rect::from_two_pos(a, b)
}

/// Pick the topmost rect containing `pos`. Later entries are on top.
pub fn topmost<T: Copy>(items: impl DoubleEndedIterator<Item = (T, Rect)>, pos: Pos2) -> Option<T> {
    items
        .rev()
        .find(|(_, rect)| rect_contains(*rect, pos, PICK_PADDING))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    #[test]
    fn segment_distance() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Pos2::new(-4.0, 3.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Pos2::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn corners_in_any_order() {
        let rect = rect_from_corners(Pos2::new(10.0, 10.0), Pos2::new(0.0, 5.0));
        assert_eq!(rect.min, Pos2::new(0.0, 5.0));
        assert_eq!(rect.size(), Vec2::new(10.0, 5.0));
    }

    #[test]
    fn topmost_prefers_later_items() {
        let under = Rect::from_min_size(Pos2::ZERO, Vec2::splat(100.0));
        let over = Rect::from_min_size(Pos2::new(50.0, 50.0), Vec2::splat(100.0));
        let items = vec![(1, under), (2, over)];
        assert_eq!(topmost(items.iter().copied(), Pos2::new(60.0, 60.0)), Some(2));
        assert_eq!(topmost(items.iter().copied(), Pos2::new(10.0, 10.0)), Some(1));
        assert_eq!(topmost(items.iter().copied(), Pos2::new(500.0, 10.0)), None);
    }
}

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box. `pos` is the bottom-left corner (Y points up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y
    }

    pub fn top(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn min_extent(&self) -> f32 {
        self.size.x.min(self.size.y)
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.bottom() < other.top()
            && other.bottom() < self.top()
    }

    pub fn translated(&self, delta: Vec2) -> Rect {
        Rect {
            pos: self.pos + delta,
            size: self.size,
        }
    }

    /// Smallest box containing both boxes.
    pub fn merge(&self, other: &Rect) -> Rect {
        let min = self.pos.min(other.pos);
        let max = Vec2::new(self.right().max(other.right()), self.top().max(other.top()));
        Rect::from_pos_size(min, max - min)
    }

    /// Grow the box by `amount` on every side.
    pub fn expanded(&self, amount: f32) -> Rect {
        Rect {
            pos: self.pos - Vec2::splat(amount),
            size: self.size + Vec2::splat(amount * 2.0),
        }
    }

    /// Move the box so it lies inside `bounds` wherever its size allows.
    pub fn clamped_within(&self, bounds: &Rect) -> Rect {
        let max_x = (bounds.right() - self.size.x).max(bounds.left());
        let max_y = (bounds.top() - self.size.y).max(bounds.bottom());
        Rect {
            pos: Vec2::new(
                self.pos.x.clamp(bounds.left(), max_x),
                self.pos.y.clamp(bounds.bottom(), max_y),
            ),
            size: self.size,
        }
    }
}

/// Open-interval overlap of two ranges on one axis. Ranges sharing only an
/// endpoint do not overlap, so corner contacts never count as side contacts.
pub(crate) fn ranges_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> bool {
    a_min < b_max && b_min < a_max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_is_not_overlap() {
        let floor = Rect::new(0.0, 0.0, 32.0, 32.0);
        let resting = Rect::new(0.0, 32.0, 16.0, 16.0);
        assert!(!floor.overlaps(&resting));
        assert!(floor.overlaps(&resting.translated(Vec2::new(0.0, -0.1))));
    }

    #[test]
    fn merge_covers_both_boxes() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, -5.0, 5.0, 5.0);
        let m = a.merge(&b);
        assert_eq!(m, Rect::new(0.0, -5.0, 25.0, 15.0));
    }

    #[test]
    fn clamp_keeps_box_inside_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = Rect::new(95.0, -10.0, 10.0, 10.0).clamped_within(&bounds);
        assert_eq!(r.pos, Vec2::new(90.0, 0.0));
    }

    #[test]
    fn shared_endpoint_is_not_range_overlap() {
        assert!(!ranges_overlap(0.0, 1.0, 1.0, 2.0));
        assert!(ranges_overlap(0.0, 1.0, 0.5, 2.0));
    }
}

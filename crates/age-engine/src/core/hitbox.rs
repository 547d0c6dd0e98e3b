use glam::IVec2;

use crate::api::types::Position;

/// Axis-aligned box relative to an owning entity's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hitbox {
    /// Offset from the owner's position.
    pub offset: IVec2,
    /// Width (x) and height (y).
    pub size: IVec2,
}

impl Hitbox {
    pub fn new(offset_x: i32, offset_y: i32, width: i32, height: i32) -> Self {
        Self {
            offset: IVec2::new(offset_x, offset_y),
            size: IVec2::new(width, height),
        }
    }

    /// A box anchored at the owner's position.
    pub fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    /// A box with no area never touches anything.
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.offset = IVec2::new(x, y);
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.size = IVec2::new(width, height);
    }

    /// Top-left corner in world space when owned by an entity at `pos`.
    pub fn min(&self, pos: Position) -> IVec2 {
        pos + self.offset
    }

    /// Exclusive bottom-right corner in world space.
    pub fn max(&self, pos: Position) -> IVec2 {
        pos + self.offset + self.size
    }

    /// Half-open overlap test of both boxes translated by their owners' positions.
    pub fn intersects(&self, other: &Hitbox, self_pos: Position, other_pos: Position) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (a_min, a_max) = (self.min(self_pos), self.max(self_pos));
        let (b_min, b_max) = (other.min(other_pos), other.max(other_pos));
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_boxes_intersect() {
        let a = Hitbox::from_size(3, 2);
        let b = Hitbox::from_size(2, 2);
        assert!(a.intersects(&b, IVec2::new(0, 0), IVec2::new(2, 1)));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Hitbox::from_size(3, 2);
        let b = Hitbox::from_size(2, 2);
        assert!(!a.intersects(&b, IVec2::new(0, 0), IVec2::new(3, 0)));
        assert!(!a.intersects(&b, IVec2::new(0, 0), IVec2::new(0, 2)));
    }

    #[test]
    fn offsets_are_applied() {
        let a = Hitbox::new(5, 0, 1, 1);
        let b = Hitbox::from_size(1, 1);
        assert!(a.intersects(&b, IVec2::ZERO, IVec2::new(5, 0)));
        assert!(!a.intersects(&b, IVec2::ZERO, IVec2::ZERO));
    }

    #[test]
    fn zero_sized_box_never_intersects() {
        let empty = Hitbox::from_size(0, 4);
        let full = Hitbox::from_size(10, 10);
        assert!(!empty.intersects(&full, IVec2::new(1, 1), IVec2::ZERO));
        assert!(!full.intersects(&empty, IVec2::ZERO, IVec2::new(1, 1)));
    }
}

//! Axis-aligned box collision
//!
//! Entities collide as integer boxes centered on their float position. The
//! box corner is truncated toward zero, so a sub-unit move can leave the box
//! where it was.

use glam::Vec2;

/// An integer axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Box of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self {
            x: (center.x - size.x / 2.0) as i32,
            y: (center.y - size.y / 2.0) as i32,
            w: size.x as i32,
            h: size.y as i32,
        }
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    /// Whether the box has no area
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Strict overlap test: boxes that only share an edge do not overlap,
    /// and empty boxes overlap nothing.
    pub fn overlaps(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

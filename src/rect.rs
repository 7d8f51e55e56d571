//! Rectangles.

use cgmath::{Point2, Vector2, Zero};

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Returns a zero-sized rectangle at the origin.
    pub fn zero() -> Rect {
        Rect {
            origin: Point2::new(0., 0.),
            size: Vector2::zero(),
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::zero()
    }
}

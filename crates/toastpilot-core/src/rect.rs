use serde::{Deserialize, Serialize};

/// Coordinate at or below which Windows parks iconic (minimized) windows.
pub const MINIMIZED_SENTINEL: i32 = -32000;

/// A screen rectangle in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from its four edges, Win32 `RECT` style.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Horizontal center of the rectangle.
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    /// Vertical center of the rectangle.
    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    /// Whether the point lies inside, left/top inclusive and right/bottom exclusive.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether this is the off-screen placement Windows reports for
    /// minimized windows instead of their real position.
    pub fn is_minimized_sentinel(&self) -> bool {
        self.x <= MINIMIZED_SENTINEL || self.y <= MINIMIZED_SENTINEL
    }
}

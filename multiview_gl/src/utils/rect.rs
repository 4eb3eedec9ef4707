/// Integer rectangle in window/image coordinates (origin bottom-left, like GL).
///
/// Used for viewports, scissor boxes and copy/blit regions. Width and height
/// may be zero; a rectangle with a non-positive extent covers no pixels.

use glam::IVec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole `width` x `height` image
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Same extent, origin moved by `offset`
    ///
    /// The origin saturates at the `i32` range, which only happens far
    /// outside any image.
    pub fn translated(&self, offset: IVec2) -> Self {
        Self::new(
            self.x.saturating_add(offset.x),
            self.y.saturating_add(offset.y),
            self.width,
            self.height,
        )
    }

    /// Exclusive right and top edges, widened so they cannot overflow
    fn end(&self) -> (i64, i64) {
        (
            i64::from(self.x) + i64::from(self.width),
            i64::from(self.y) + i64::from(self.height),
        )
    }

    /// Overlap of two rectangles, `None` when they do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let (self_x1, self_y1) = self.end();
        let (other_x1, other_y1) = other.end();
        let x1 = self_x1.min(other_x1);
        let y1 = self_y1.min(other_y1);
        if x1 <= i64::from(x0) || y1 <= i64::from(y0) {
            return None;
        }
        // Both extents are bounded by one of the input widths/heights
        Some(Rect::new(x0, y0, (x1 - i64::from(x0)) as i32, (y1 - i64::from(y0)) as i32))
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (x1, y1) = self.end();
        x >= self.x && y >= self.y && i64::from(x) < x1 && i64::from(y) < y1
    }

    /// Iterate the covered pixel coordinates row by row
    ///
    /// Coordinates past `i32::MAX` are skipped.
    pub fn pixels(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (w, h) = (self.width.max(0), self.height.max(0));
        (0..h).flat_map(move |dy| {
            (0..w).filter_map(move |dx| Some((self.x.checked_add(dx)?, self.y.checked_add(dy)?)))
        })
    }
}

#[cfg(test)]
#[path = "rect_tests.rs"]
mod tests;

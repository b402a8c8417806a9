//! Screen-space rectangles and the split math windows use to lay out panes.

use crate::error::{MuxError, Result};

/// An axis-aligned region in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    #[must_use]
    pub const fn area(&self) -> u32 {
        u32::from(self.width) * u32::from(self.height)
    }

    /// Split left/right, reserving one column for the border between them.
    pub fn split_horizontal(&self, ratio: f32) -> Result<(Rect, Rect)> {
        if self.width < 3 {
            return Err(MuxError::InvalidGeometry(format!(
                "rect width {} too small to split horizontally",
                self.width
            )));
        }
        let usable = self.width - 1;
        let left_width = ((f32::from(usable) * ratio).round() as u16).clamp(1, usable - 1);
        let right_width = usable - left_width;
        let left = Rect::new(self.x, self.y, left_width, self.height);
        let right = Rect::new(self.x + left_width + 1, self.y, right_width, self.height);
        Ok((left, right))
    }

    /// Split top/bottom, reserving one row for the border between them.
    pub fn split_vertical(&self, ratio: f32) -> Result<(Rect, Rect)> {
        if self.height < 3 {
            return Err(MuxError::InvalidGeometry(format!(
                "rect height {} too small to split vertically",
                self.height
            )));
        }
        let usable = self.height - 1;
        let top_height = ((f32::from(usable) * ratio).round() as u16).clamp(1, usable - 1);
        let bottom_height = usable - top_height;
        let top = Rect::new(self.x, self.y, self.width, top_height);
        let bottom = Rect::new(self.x, self.y + top_height + 1, self.width, bottom_height);
        Ok((top, bottom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_horizontal_halves_minus_border() {
        let r = Rect::new(0, 0, 80, 24);
        let (left, right) = r.split_horizontal(0.5).unwrap();
        assert_eq!(left, Rect::new(0, 0, 40, 24));
        assert_eq!(right, Rect::new(41, 0, 39, 24));
        // Area covers the whole rect minus the one-cell border column.
        assert_eq!(left.area() + right.area() + u32::from(r.height), r.area());
    }

    #[test]
    fn split_too_narrow_fails() {
        let r = Rect::new(0, 0, 2, 24);
        assert!(r.split_horizontal(0.5).is_err());
    }

    #[test]
    fn split_vertical_halves_minus_border() {
        let r = Rect::new(0, 0, 80, 25);
        let (top, bottom) = r.split_vertical(0.5).unwrap();
        assert_eq!(top.height + bottom.height + 1, r.height);
        assert_eq!(top.width, r.width);
    }
}

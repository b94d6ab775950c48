//! Page geometry and annotation placement
//!
//! All values are PDF points (1/72 inch). The coordinate system has its
//! origin at the bottom-left of the page.

/// A position on the page, relative to the page box origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// The visible area of a page, taken from its MediaBox
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBox {
    /// Lower-left x of the box
    pub x: f32,
    /// Lower-left y of the box
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageBox {
    /// Build from a `[llx lly urx ury]` rectangle, normalizing flipped corners
    pub fn from_rect(rect: [f32; 4]) -> Self {
        let [x1, y1, x2, y2] = rect;
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    /// US Letter size (8.5" × 11"), used when a page declares no MediaBox
    pub fn letter() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 612.0,
            height: 792.0,
        }
    }

    /// Translate a box-relative point into absolute page space
    pub fn to_page_space(&self, point: Point) -> Point {
        Point {
            x: self.x + point.x,
            y: self.y + point.y,
        }
    }
}

/// Anchor of the diagonal watermark: a fifth across, a third up
pub fn watermark_anchor(page: &PageBox) -> Point {
    Point {
        x: page.width / 5.0,
        y: page.height / 3.0,
    }
}

/// Start of a line of `text_width` points centered on the page at `baseline`
pub fn centered(page: &PageBox, text_width: f32, baseline: f32) -> Point {
    Point {
        x: (page.width - text_width) / 2.0,
        y: baseline,
    }
}

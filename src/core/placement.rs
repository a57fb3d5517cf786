/// Floating preview geometry.

use serde::{Deserialize, Serialize};

/// A card's on-screen bounding box, in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Where the preview box goes. `bottom` is measured up from the viewport
/// bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewPlacement {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
    pub min_height: f64,
}

/// Place a preview over `anchor`: same width, left edge kept `margin` away
/// from both viewport sides, bottom-aligned with the anchor but never
/// closer than `margin` to the viewport bottom.
pub fn compute_placement(anchor: &Rect, viewport: &Viewport, margin: f64, padding: f64) -> PreviewPlacement {
    let width = anchor.width;
    // On a viewport narrower than the card the left margin wins.
    let max_left = (viewport.width - width - margin).max(margin);
    let left = anchor.left.max(margin).min(max_left);
    let bottom = (viewport.height - anchor.bottom()).max(margin);
    let min_height = (anchor.height + padding).ceil();

    PreviewPlacement {
        left,
        bottom,
        width,
        min_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARGIN: f64 = 12.0;
    const PADDING: f64 = 64.0;

    #[test]
    fn anchor_inside_viewport() {
        let anchor = Rect::new(100.0, 500.0, 200.0, 120.0);
        let p = compute_placement(&anchor, &Viewport::new(1280.0, 800.0), MARGIN, PADDING);
        assert_eq!(p.left, 100.0);
        assert_eq!(p.bottom, 180.0);
        assert_eq!(p.width, 200.0);
        assert_eq!(p.min_height, 184.0);
    }

    #[test]
    fn clamps_left_edge() {
        let viewport = Viewport::new(800.0, 600.0);
        let off_left = Rect::new(-40.0, 400.0, 200.0, 100.0);
        assert_eq!(compute_placement(&off_left, &viewport, MARGIN, PADDING).left, 12.0);

        let off_right = Rect::new(700.0, 400.0, 200.0, 100.0);
        assert_eq!(compute_placement(&off_right, &viewport, MARGIN, PADDING).left, 588.0);
    }

    #[test]
    fn narrow_viewport_keeps_left_margin() {
        let anchor = Rect::new(50.0, 100.0, 300.0, 100.0);
        let p = compute_placement(&anchor, &Viewport::new(200.0, 600.0), MARGIN, PADDING);
        assert_eq!(p.left, 12.0);
    }

    #[test]
    fn bottom_is_floored() {
        let anchor = Rect::new(10.0, 550.0, 100.0, 100.0);
        let p = compute_placement(&anchor, &Viewport::new(800.0, 600.0), MARGIN, PADDING);
        assert_eq!(p.bottom, 12.0);
    }

    #[test]
    fn min_height_rounds_up() {
        let anchor = Rect::new(10.0, 10.0, 100.0, 80.4);
        let p = compute_placement(&anchor, &Viewport::new(800.0, 600.0), MARGIN, PADDING);
        assert_eq!(p.min_height, 145.0);
    }
}

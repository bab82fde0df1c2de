//! Watermark placement
//!
//! Text is drawn from its baseline origin and rotated around that origin, so
//! to center a run on an anchor the origin is pulled back by the rotated
//! half-extent of the run. The vertical half-extent is approximated as a
//! third of the font size.

use pdf_core::PageSize;

/// A position in page space (points, origin bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Horizontal distance between tiled anchors
pub fn tile_gap_x(text_width: f64, font_size: f64) -> f64 {
    text_width + 2.0 * font_size
}

/// Vertical distance between tiled anchors
pub fn tile_gap_y(font_size: f64) -> f64 {
    6.0 * font_size
}

/// Baseline origin that visually centers a run on `anchor`
///
/// `rotation_deg` is counter-clockwise from horizontal.
pub fn centered_origin(anchor: Point, text_width: f64, font_size: f64, rotation_deg: f64) -> Point {
    let (sin, cos) = rotation_deg.to_radians().sin_cos();
    let half_width = text_width / 2.0;
    let half_height = font_size / 3.0;

    Point {
        x: anchor.x - (half_width * cos - half_height * sin),
        y: anchor.y - (half_width * sin + half_height * cos),
    }
}

pub fn center_anchor(page: PageSize) -> Point {
    Point::new(page.width / 2.0, page.height / 2.0)
}

/// Anchor grid covering the page and one page-size margin on every side
///
/// The margin keeps the corners covered once the tiles are rotated.
pub fn tile_anchors(page: PageSize, text_width: f64, font_size: f64) -> Vec<Point> {
    let gap_x = tile_gap_x(text_width, font_size);
    let gap_y = tile_gap_y(font_size);
    if !(gap_x > 0.0 && gap_y > 0.0) {
        return Vec::new();
    }

    let xs = steps(-page.width, 2.0 * page.width, gap_x);
    let ys = steps(-page.height, 2.0 * page.height, gap_y);

    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| Point::new(x, y)))
        .collect()
}

/// `start, start + step, ...` while below `end`
fn steps(start: f64, end: f64, step: f64) -> Vec<f64> {
    let count = ((end - start) / step).ceil().max(0.0) as usize;
    (0..count).map(|i| start + i as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn assert_close(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
            "{actual:?} != {expected:?}"
        );
    }

    #[test]
    fn test_unrotated_origin() {
        let origin = centered_origin(Point::new(300.0, 400.0), 120.0, 30.0, 0.0);
        assert_close(origin, Point::new(240.0, 390.0));
    }

    #[test]
    fn test_quarter_turn_origin() {
        // Rotated 90 degrees the run extends upwards from its origin
        let origin = centered_origin(Point::new(300.0, 400.0), 120.0, 30.0, 90.0);
        assert_close(origin, Point::new(310.0, 340.0));
    }

    #[test]
    fn test_rotation_keeps_distance_to_anchor() {
        let anchor = Point::new(0.0, 0.0);
        let (w, size) = (200.0, 50.0);
        let expected = ((w / 2.0f64).powi(2) + (size / 3.0f64).powi(2)).sqrt();

        for rotation in [-90.0, -45.0, 0.0, 30.0, 90.0] {
            let origin = centered_origin(anchor, w, size, rotation);
            let distance = origin.x.hypot(origin.y);
            assert!((distance - expected).abs() < 1e-9, "rotation {rotation}");
        }
    }

    #[test]
    fn test_tiles_cover_three_page_widths() {
        let page = PageSize::new(595.0, 842.0);
        let (w, size) = (372.2, 50.0);
        let anchors = tile_anchors(page, w, size);

        let columns = (3.0 * page.width / tile_gap_x(w, size)).ceil() as usize;
        let rows = (3.0 * page.height / tile_gap_y(size)).ceil() as usize;
        assert_eq!(anchors.len(), columns * rows);

        assert_eq!(anchors[0], Point::new(-595.0, -842.0));
        assert!(anchors.iter().all(|p| p.x < 2.0 * page.width && p.y < 2.0 * page.height));
        assert!(anchors.iter().any(|p| p.x + tile_gap_x(w, size) >= 2.0 * page.width));
    }

    #[test]
    fn test_center_anchor() {
        assert_eq!(center_anchor(PageSize::new(100.0, 50.0)), Point::new(50.0, 25.0));
    }
}

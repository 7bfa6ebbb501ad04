//! Grid snapping and alignment guides.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideOrientation {
    /// A vertical line at a fixed canvas x.
    Vertical,
    /// A horizontal line at a fixed canvas y.
    Horizontal,
}

/// A guide line spanning the visible canvas, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub orientation: GuideOrientation,
    pub position: f64,
}

impl Guide {
    pub fn vertical(x: f64) -> Self {
        Self { orientation: GuideOrientation::Vertical, position: x }
    }

    pub fn horizontal(y: f64) -> Self {
        Self { orientation: GuideOrientation::Horizontal, position: y }
    }
}

/// Snap a point to the nearest grid intersection. A non-positive size leaves it as is.
pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    if grid_size <= 0.0 {
        return point;
    }
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

/// Left, center and right x of a rectangle.
fn x_targets(r: Rect) -> [f64; 3] {
    [r.x0, r.center().x, r.x1]
}

/// Top, center and bottom y of a rectangle.
fn y_targets(r: Rect) -> [f64; 3] {
    [r.y0, r.center().y, r.y1]
}

/// Alignment guides between a moving rectangle and a set of fixed ones.
///
/// Emits one vertical guide per distinct x where an edge or center of `moving`
/// is within `threshold` of an edge or center of any `others`, and likewise for
/// horizontal guides. Guides sit on the fixed rectangle's coordinate.
pub fn alignment_guides(moving: Rect, others: &[Rect], threshold: f64) -> Vec<Guide> {
    let mut guides: Vec<Guide> = Vec::new();
    let mut push = |guide: Guide| {
        let dup = guides.iter().any(|g| {
            g.orientation == guide.orientation && (g.position - guide.position).abs() < f64::EPSILON
        });
        if !dup {
            guides.push(guide);
        }
    };

    for other in others {
        for mx in x_targets(moving) {
            for ox in x_targets(*other) {
                if (mx - ox).abs() <= threshold {
                    push(Guide::vertical(ox));
                }
            }
        }
        for my in y_targets(moving) {
            for oy in y_targets(*other) {
                if (my - oy).abs() <= threshold {
                    push(Guide::horizontal(oy));
                }
            }
        }
    }
    guides
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        let point = snap_to_grid(Point::new(23.0, 37.0), 20.0);
        assert!((point.x - 20.0).abs() < f64::EPSILON);
        assert!((point.y - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_to_grid_exact() {
        let point = snap_to_grid(Point::new(40.0, 60.0), 20.0);
        assert!((point.x - 40.0).abs() < f64::EPSILON);
        assert!((point.y - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_snap_to_grid_degenerate_size() {
        assert_eq!(snap_to_grid(Point::new(3.0, 4.0), 0.0), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_alignment_left_edges() {
        let moving = Rect::new(102.0, 300.0, 152.0, 350.0);
        let other = Rect::new(100.0, 0.0, 200.0, 50.0);
        let guides = alignment_guides(moving, &[other], 5.0);
        assert!(guides.contains(&Guide::vertical(100.0)));
        assert!(guides.iter().all(|g| g.orientation == GuideOrientation::Vertical));
    }

    #[test]
    fn test_alignment_centers_horizontal() {
        let moving = Rect::new(500.0, 10.0, 520.0, 30.0);
        let other = Rect::new(0.0, 0.0, 40.0, 40.0);
        let guides = alignment_guides(moving, &[other], 1.0);
        assert_eq!(guides, vec![Guide::horizontal(20.0)]);
    }

    #[test]
    fn test_alignment_none_when_far() {
        let moving = Rect::new(0.0, 0.0, 10.0, 10.0);
        let other = Rect::new(100.0, 100.0, 130.0, 130.0);
        assert!(alignment_guides(moving, &[other], 5.0).is_empty());
    }

    #[test]
    fn test_alignment_deduplicates() {
        let moving = Rect::new(0.0, 500.0, 10.0, 510.0);
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(0.0, 100.0, 80.0, 150.0);
        let guides = alignment_guides(moving, &[a, b], 0.5);
        assert_eq!(guides, vec![Guide::vertical(0.0)]);
    }
}

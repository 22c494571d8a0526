//! Alignment snapping against neighbouring widgets
//!
//! While a widget is dragged its edges and center are compared with the edges
//! and centers of every widget outside its own stack. The closest match within
//! the snap threshold wins per axis and becomes the guide line for that axis.

use crate::geometry::Rect;

/// Result of aligning a dragged rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct DragAlignment {
    pub snapped_x: f64,
    pub snapped_y: f64,
    /// X coordinates of vertical guide lines
    pub vertical_guides: Vec<f64>,
    /// Y coordinates of horizontal guide lines
    pub horizontal_guides: Vec<f64>,
}

/// Result of aligning a resized rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeAlignment {
    pub snapped_w: f64,
    pub snapped_h: f64,
    pub vertical_guides: Vec<f64>,
    pub horizontal_guides: Vec<f64>,
}

impl DragAlignment {
    pub fn has_guides(&self) -> bool {
        !self.vertical_guides.is_empty() || !self.horizontal_guides.is_empty()
    }
}

impl ResizeAlignment {
    pub fn has_guides(&self) -> bool {
        !self.vertical_guides.is_empty() || !self.horizontal_guides.is_empty()
    }
}

/// Best match found so far on one axis
#[derive(Debug)]
struct AxisSnap {
    threshold: f64,
    best_delta: f64,
    /// Correction to add to the active coordinate
    shift: f64,
    guides: Vec<f64>,
}

impl AxisSnap {
    fn new(threshold: f64) -> Self {
        Self {
            threshold,
            best_delta: f64::INFINITY,
            shift: 0.0,
            guides: Vec::new(),
        }
    }

    /// Offer a candidate pair. Ties with the current best add a guide line
    /// when `keep_ties` is set.
    fn offer(&mut self, active_pt: f64, other_pt: f64, keep_ties: bool) {
        let delta = (active_pt - other_pt).abs();
        if delta > self.threshold {
            return;
        }
        if delta < self.best_delta {
            self.best_delta = delta;
            self.shift = other_pt - active_pt;
            self.guides.clear();
            self.guides.push(other_pt);
        } else if keep_ties && delta == self.best_delta && !self.guides.contains(&other_pt) {
            self.guides.push(other_pt);
        }
    }

    fn matched(&self) -> bool {
        self.best_delta <= self.threshold
    }
}

/// Snap a dragged rectangle to its neighbours.
///
/// Only axes that found a match within `threshold` are adjusted.
pub fn compute_drag_alignment(active: &Rect, others: &[Rect], threshold: f64) -> DragAlignment {
    let mut x_axis = AxisSnap::new(threshold);
    let mut y_axis = AxisSnap::new(threshold);

    for other in others {
        let x_candidates = [
            (active.left(), other.left()),
            (active.left(), other.right()),
            (active.right(), other.left()),
            (active.right(), other.right()),
            (active.center_x(), other.center_x()),
        ];
        for (active_pt, other_pt) in x_candidates {
            x_axis.offer(active_pt, other_pt, true);
        }

        let y_candidates = [
            (active.top(), other.top()),
            (active.top(), other.bottom()),
            (active.bottom(), other.top()),
            (active.bottom(), other.bottom()),
            (active.center_y(), other.center_y()),
        ];
        for (active_pt, other_pt) in y_candidates {
            y_axis.offer(active_pt, other_pt, true);
        }
    }

    DragAlignment {
        snapped_x: if x_axis.matched() {
            active.x + x_axis.shift
        } else {
            active.x
        },
        snapped_y: if y_axis.matched() {
            active.y + y_axis.shift
        } else {
            active.y
        },
        vertical_guides: x_axis.guides,
        horizontal_guides: y_axis.guides,
    }
}

/// Snap the growing right and bottom edges of a resized rectangle.
///
/// The snapped size never drops below `min_size`.
pub fn compute_resize_alignment(
    rect: &Rect,
    others: &[Rect],
    threshold: f64,
    min_size: (f64, f64),
) -> ResizeAlignment {
    let mut width_axis = AxisSnap::new(threshold);
    let mut height_axis = AxisSnap::new(threshold);

    for other in others {
        for other_pt in [other.left(), other.right(), other.center_x()] {
            width_axis.offer(rect.right(), other_pt, false);
        }
        for other_pt in [other.top(), other.bottom(), other.center_y()] {
            height_axis.offer(rect.bottom(), other_pt, false);
        }
    }

    let (min_w, min_h) = min_size;
    ResizeAlignment {
        snapped_w: if width_axis.matched() {
            (rect.w + width_axis.shift).max(min_w)
        } else {
            rect.w
        },
        snapped_h: if height_axis.matched() {
            (rect.h + height_axis.shift).max(min_h)
        } else {
            rect.h
        },
        vertical_guides: width_axis.guides,
        horizontal_guides: height_axis.guides,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f64 = 10.0;

    #[test]
    fn test_no_neighbours_leaves_position() {
        let active = Rect::new(13.0, 27.0, 300.0, 200.0);
        let result = compute_drag_alignment(&active, &[], THRESHOLD);
        assert_eq!((result.snapped_x, result.snapped_y), (13.0, 27.0));
        assert!(!result.has_guides());
    }

    #[test]
    fn test_right_edge_snaps_to_left_edge() {
        // right edge at 495, neighbour's left edge at 500
        let active = Rect::new(195.0, 600.0, 300.0, 200.0);
        let other = Rect::new(500.0, 0.0, 300.0, 200.0);
        let result = compute_drag_alignment(&active, &[other], THRESHOLD);
        assert_eq!(result.vertical_guides, vec![500.0]);
        assert_eq!(result.snapped_x + active.w, 500.0);
        assert_eq!(result.snapped_y, 600.0);
        assert!(result.horizontal_guides.is_empty());
    }

    #[test]
    fn test_closest_candidate_wins() {
        let active = Rect::new(8.0, 500.0, 300.0, 200.0);
        let near = Rect::new(10.0, 0.0, 200.0, 200.0);
        let nearer = Rect::new(9.0, 900.0, 250.0, 200.0);
        let result = compute_drag_alignment(&active, &[near, nearer], THRESHOLD);
        assert_eq!(result.snapped_x, 9.0);
        assert_eq!(result.vertical_guides, vec![9.0]);
    }

    #[test]
    fn test_ties_at_same_line_do_not_duplicate() {
        let active = Rect::new(5.0, 500.0, 300.0, 200.0);
        let a = Rect::new(0.0, 0.0, 200.0, 200.0);
        let b = Rect::new(0.0, 900.0, 200.0, 200.0);
        let result = compute_drag_alignment(&active, &[a, b], THRESHOLD);
        assert_eq!(result.vertical_guides, vec![0.0]);
    }

    #[test]
    fn test_equal_delta_different_lines_both_guided() {
        // left edge 5px from 0 and 5px from 10
        let active = Rect::new(5.0, 500.0, 300.0, 200.0);
        let a = Rect::new(0.0, 0.0, 200.0, 200.0);
        let b = Rect::new(10.0, 900.0, 200.0, 200.0);
        let result = compute_drag_alignment(&active, &[a, b], THRESHOLD);
        assert_eq!(result.vertical_guides, vec![0.0, 10.0]);
        assert_eq!(result.snapped_x, 0.0);
    }

    #[test]
    fn test_already_aligned_is_idempotent() {
        let active = Rect::new(400.0, 20.0, 300.0, 200.0);
        let other = Rect::new(0.0, 20.0, 300.0, 200.0);
        let first = compute_drag_alignment(&active, &[other], THRESHOLD);
        assert_eq!(first.snapped_y, 20.0);
        let again = compute_drag_alignment(
            &active.with_origin(first.snapped_x, first.snapped_y),
            &[other],
            THRESHOLD,
        );
        assert_eq!(again, first);
    }

    #[test]
    fn test_centers_align() {
        let active = Rect::new(0.0, 1000.0, 200.0, 100.0);
        let other = Rect::new(53.0, 0.0, 100.0, 100.0);
        // active center 100, other center 103
        let result = compute_drag_alignment(&active, &[other], THRESHOLD);
        assert_eq!(result.snapped_x, 3.0);
        assert_eq!(result.vertical_guides, vec![103.0]);
    }

    #[test]
    fn test_resize_snaps_right_and_bottom() {
        let rect = Rect::new(0.0, 0.0, 396.0, 293.0);
        let other = Rect::new(400.0, 300.0, 300.0, 200.0);
        let result = compute_resize_alignment(&rect, &[other], THRESHOLD, (280.0, 180.0));
        assert_eq!(result.snapped_w, 400.0);
        assert_eq!(result.snapped_h, 300.0);
        assert_eq!(result.vertical_guides, vec![400.0]);
        assert_eq!(result.horizontal_guides, vec![300.0]);
    }

    #[test]
    fn test_resize_respects_minimum() {
        let rect = Rect::new(0.0, 0.0, 285.0, 185.0);
        let other = Rect::new(278.0, 178.0, 300.0, 200.0);
        let result = compute_resize_alignment(&rect, &[other], THRESHOLD, (280.0, 180.0));
        assert_eq!(result.snapped_w, 280.0);
        assert_eq!(result.snapped_h, 180.0);
    }

    #[test]
    fn test_resize_without_match_keeps_size() {
        let rect = Rect::new(0.0, 0.0, 320.0, 220.0);
        let result = compute_resize_alignment(&rect, &[], THRESHOLD, (280.0, 180.0));
        assert_eq!((result.snapped_w, result.snapped_h), (320.0, 220.0));
        assert!(!result.has_guides());
    }
}

//! Transient alignment guide overlay

use std::time::Duration;

/// Guide lines shown while a drag or resize snaps to a neighbour.
///
/// Clearing hides the overlay at once and drops the coordinates after a
/// short fade, so the lines do not vanish mid-animation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuideOverlay {
    pub vertical: Vec<f64>,
    pub horizontal: Vec<f64>,
    pub visible: bool,
    fade_remaining: Option<Duration>,
}

impl GuideOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the guide lines; visible only when there is at least one line
    pub fn show(&mut self, vertical: Vec<f64>, horizontal: Vec<f64>) {
        self.visible = !vertical.is_empty() || !horizontal.is_empty();
        self.vertical = vertical;
        self.horizontal = horizontal;
        self.fade_remaining = None;
    }

    /// Hide now and forget the lines once `fade` has elapsed
    pub fn clear(&mut self, fade: Duration) {
        self.visible = false;
        if self.vertical.is_empty() && self.horizontal.is_empty() {
            self.fade_remaining = None;
        } else if fade.is_zero() {
            self.drop_lines();
        } else {
            self.fade_remaining = Some(fade);
        }
    }

    /// Advance the fade timer
    pub fn advance(&mut self, elapsed: Duration) {
        let Some(remaining) = self.fade_remaining else {
            return;
        };
        match remaining.checked_sub(elapsed) {
            Some(left) if !left.is_zero() => self.fade_remaining = Some(left),
            _ => self.drop_lines(),
        }
    }

    pub fn is_fading(&self) -> bool {
        self.fade_remaining.is_some()
    }

    fn drop_lines(&mut self) {
        self.vertical.clear();
        self.horizontal.clear();
        self.fade_remaining = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_and_fade() {
        let mut guides = GuideOverlay::new();
        guides.show(vec![500.0], vec![]);
        assert!(guides.visible);

        guides.clear(Duration::from_millis(150));
        assert!(!guides.visible);
        assert!(guides.is_fading());
        assert_eq!(guides.vertical, vec![500.0]);

        guides.advance(Duration::from_millis(100));
        assert_eq!(guides.vertical, vec![500.0]);
        guides.advance(Duration::from_millis(50));
        assert!(guides.vertical.is_empty());
        assert!(!guides.is_fading());
    }

    #[test]
    fn test_show_without_lines_is_hidden() {
        let mut guides = GuideOverlay::new();
        guides.show(vec![], vec![]);
        assert!(!guides.visible);
    }

    #[test]
    fn test_show_cancels_pending_fade() {
        let mut guides = GuideOverlay::new();
        guides.show(vec![1.0], vec![2.0]);
        guides.clear(Duration::from_millis(150));
        guides.show(vec![3.0], vec![]);
        guides.advance(Duration::from_secs(1));
        assert_eq!(guides.vertical, vec![3.0]);
        assert!(guides.visible);
    }
}

//! Edge-triggered auto-scroll during drags
//!
//! Drag-move events only decide whether scrolling should run and in which
//! direction. The scrolling itself happens once per animation frame, so the
//! viewport keeps moving while the pointer rests in an edge zone.

use tracing::trace;

use super::config::CanvasConfig;

/// Vertical scroll direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

/// Something that can be scrolled vertically
pub trait ScrollTarget {
    /// Scroll by `dy` pixels; returns the distance actually scrolled
    fn scroll_by(&mut self, dy: f64) -> f64;

    /// Ensure the scrollable content is at least `height` tall
    fn grow_to(&mut self, height: f64);

    /// Pixels from the content top to the viewport top
    fn scroll_top(&self) -> f64;

    /// Visible height
    fn visible_height(&self) -> f64;
}

/// The scrollable container hosting the canvas surface
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_top: f64,
    /// Height of the scrollable surface
    pub surface_height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_top: 0.0,
            surface_height: height,
        }
    }

    fn max_scroll(&self) -> f64 {
        (self.surface_height - self.height).max(0.0)
    }

    /// Keep the scroll offset inside the surface
    pub fn clamp_scroll(&mut self) {
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
    }
}

impl ScrollTarget for Viewport {
    fn scroll_by(&mut self, dy: f64) -> f64 {
        let before = self.scroll_top;
        self.scroll_top = (self.scroll_top + dy).clamp(0.0, self.max_scroll());
        self.scroll_top - before
    }

    fn grow_to(&mut self, height: f64) {
        if height > self.surface_height {
            self.surface_height = height;
        }
    }

    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn visible_height(&self) -> f64 {
        self.height
    }
}

/// Auto-scroll state machine
#[derive(Debug, Clone)]
pub struct AutoScroll {
    edge: f64,
    speed: f64,
    growth: f64,
    direction: Option<ScrollDirection>,
}

impl AutoScroll {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            edge: config.scroll_edge,
            speed: config.scroll_speed,
            growth: config.scroll_growth,
            direction: None,
        }
    }

    /// Feed the pointer's viewport y; starts, redirects or stops the loop
    pub fn update(&mut self, pointer_y: f64, viewport_height: f64) -> Option<ScrollDirection> {
        let next = if viewport_height <= 0.0 {
            None
        } else if pointer_y < self.edge {
            Some(ScrollDirection::Up)
        } else if pointer_y > viewport_height - self.edge {
            Some(ScrollDirection::Down)
        } else {
            None
        };
        if next != self.direction {
            trace!(?next, pointer_y, "auto-scroll direction");
        }
        self.direction = next;
        next
    }

    pub fn stop(&mut self) {
        self.direction = None;
    }

    pub fn is_running(&self) -> bool {
        self.direction.is_some()
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    /// Run one animation step.
    ///
    /// Returns the distance scrolled, or `None` when the loop is stopped and
    /// no further frame is needed.
    pub fn on_frame(&mut self, target: &mut impl ScrollTarget) -> Option<f64> {
        let direction = self.direction?;
        let dy = match direction {
            ScrollDirection::Up => -self.speed,
            ScrollDirection::Down => {
                target.grow_to(target.scroll_top() + target.visible_height() + self.growth);
                self.speed
            }
        };
        Some(target.scroll_by(dy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auto() -> AutoScroll {
        AutoScroll::new(&CanvasConfig::default())
    }

    #[test]
    fn test_edge_zones() {
        let mut scroll = auto();
        assert_eq!(scroll.update(50.0, 800.0), Some(ScrollDirection::Up));
        assert_eq!(scroll.update(400.0, 800.0), None);
        assert_eq!(scroll.update(760.0, 800.0), Some(ScrollDirection::Down));
        assert!(scroll.is_running());
        scroll.stop();
        assert!(!scroll.is_running());
    }

    #[test]
    fn test_unknown_viewport_never_scrolls() {
        let mut scroll = auto();
        assert_eq!(scroll.update(10.0, 0.0), None);
    }

    #[test]
    fn test_frames_keep_scrolling_until_stopped() {
        let mut scroll = auto();
        let mut viewport = Viewport::new(1200.0, 800.0);
        scroll.update(790.0, viewport.height);

        for _ in 0..3 {
            assert_eq!(scroll.on_frame(&mut viewport), Some(22.0));
        }
        assert_eq!(viewport.scroll_top, 66.0);
        assert!(viewport.surface_height >= 66.0 + 800.0);

        scroll.update(400.0, viewport.height);
        assert_eq!(scroll.on_frame(&mut viewport), None);
        assert_eq!(viewport.scroll_top, 66.0);
    }

    #[test]
    fn test_scroll_up_stops_at_top() {
        let mut scroll = auto();
        let mut viewport = Viewport::new(1200.0, 800.0);
        viewport.surface_height = 2000.0;
        viewport.scroll_top = 30.0;
        scroll.update(5.0, viewport.height);
        assert_eq!(scroll.on_frame(&mut viewport), Some(-22.0));
        assert_eq!(scroll.on_frame(&mut viewport), Some(-8.0));
        assert_eq!(scroll.on_frame(&mut viewport), Some(0.0));
        assert_eq!(viewport.scroll_top, 0.0);
    }
}

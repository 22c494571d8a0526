//! The interactive canvas engine
//!
//! Grouping and alignment are pure functions over rectangles. Everything
//! stateful (sessions, stack selection, guides, auto-scroll) hangs off
//! [`Canvas`].

pub mod alignment;
pub mod autoscroll;
pub mod config;
pub mod controller;
pub mod frame;
pub mod grouping;
pub mod guides;
pub mod session;
pub mod stack;

pub use alignment::{compute_drag_alignment, compute_resize_alignment, DragAlignment, ResizeAlignment};
pub use autoscroll::{AutoScroll, ScrollDirection, ScrollTarget, Viewport};
pub use config::{CanvasConfig, ConfigError};
pub use controller::Canvas;
pub use frame::{CanvasBounds, Frame, GuideLines, StackView, Surface};
pub use grouping::{compute_stacks, stack_of, Stack};
pub use guides::GuideOverlay;
pub use session::{PointerEvent, Session};
pub use stack::{anchor_of, effective_lock, CycleDirection, GhostLayer, StackState};

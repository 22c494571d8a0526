//! Replaying scripts against a canvas
//!
//! Commands run in order. A command naming an unknown widget, or one the
//! canvas refuses (locked stack, edit mode off, nothing to drop), is skipped
//! with a warning; replay never stops early.

use std::fmt;
use std::time::Duration;

use ariadne::{Color, Label, Report, ReportKind, Source};
use tracing::{debug, warn};

use crate::canvas::{Canvas, PointerEvent};
use crate::geometry::{Point, Rect};
use crate::model::{GroupId, WidgetId};
use crate::store::LayoutStore;

use super::ast::{Command, LockTarget, Script, Span, Spanned};

/// Time advanced by one `frame` step
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Why a command was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCategory {
    UnknownWidget,
    Rejected,
}

impl fmt::Display for WarningCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningCategory::UnknownWidget => write!(f, "unknown widget"),
            WarningCategory::Rejected => write!(f, "rejected"),
        }
    }
}

/// A skipped command
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayWarning {
    pub category: WarningCategory,
    pub message: String,
    pub span: Span,
}

impl ReplayWarning {
    /// Format the warning with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Warning, filename, self.span.start)
            .with_message(format!("{}: {}", self.category, self.message))
            .with_label(
                Label::new((filename, self.span.clone()))
                    .with_message(&self.message)
                    .with_color(Color::Yellow),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("{}: {}", self.category, self.message),
        }
    }
}

/// Outcome of a replay
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayReport {
    /// Commands that ran
    pub executed: usize,
    pub warnings: Vec<ReplayWarning>,
}

impl ReplayReport {
    /// Commands skipped because they named an unknown widget
    pub fn unknown(&self) -> usize {
        self.count(WarningCategory::UnknownWidget)
    }

    /// Commands the canvas refused
    pub fn rejected(&self) -> usize {
        self.count(WarningCategory::Rejected)
    }

    fn count(&self, category: WarningCategory) -> usize {
        self.warnings
            .iter()
            .filter(|warning| warning.category == category)
            .count()
    }
}

/// Run every command of `script` against `canvas`
pub fn replay<S: LayoutStore>(canvas: &mut Canvas<S>, script: &Script) -> ReplayReport {
    let mut replayer = Replayer {
        canvas,
        pointer: Point::default(),
        report: ReplayReport::default(),
    };
    for command in &script.commands {
        replayer.run(command);
    }
    debug!(
        executed = replayer.report.executed,
        skipped = replayer.report.warnings.len(),
        "script replayed"
    );
    replayer.report
}

struct Replayer<'c, S: LayoutStore> {
    canvas: &'c mut Canvas<S>,
    /// Last viewport pointer position
    pointer: Point,
    report: ReplayReport,
}

impl<'c, S: LayoutStore> Replayer<'c, S> {
    fn run(&mut self, command: &Spanned<Command>) {
        if let Some(id) = command.node.widget() {
            if self.canvas.store().instance(&id.node).is_none() {
                self.warn(
                    WarningCategory::UnknownWidget,
                    format!("no widget named '{}'", id.node),
                    &id.span,
                );
                return;
            }
        }

        match self.execute(&command.node) {
            Ok(()) => self.report.executed += 1,
            Err(message) => self.warn(WarningCategory::Rejected, message, &command.span),
        }
    }

    fn warn(&mut self, category: WarningCategory, message: String, span: &Span) {
        warn!(%category, span = ?span, "{}", message);
        self.report.warnings.push(ReplayWarning {
            category,
            message,
            span: span.clone(),
        });
    }

    fn execute(&mut self, command: &Command) -> Result<(), String> {
        match command {
            Command::Edit(on) => {
                self.canvas.set_edit_mode(*on);
                Ok(())
            }
            Command::Viewport { width, height } => {
                self.canvas.set_viewport_size(*width, *height);
                Ok(())
            }
            Command::Frame(count) => {
                for _ in 0..*count {
                    self.canvas.animation_frame(FRAME_INTERVAL);
                }
                Ok(())
            }
            Command::Grab { id, at } => {
                self.pointer = *at;
                self.pointer_event(
                    PointerEvent::DragStart {
                        id: id.node.clone(),
                        pointer: *at,
                    },
                    || format!("cannot drag '{}'", id.node),
                )
            }
            Command::Move(to) => {
                self.pointer = *to;
                self.pointer_event(PointerEvent::DragMove { pointer: *to }, || {
                    "no drag in progress".to_string()
                })
            }
            Command::Drop => {
                let pointer = self.pointer;
                self.pointer_event(PointerEvent::DragEnd { pointer }, || {
                    "no drag in progress".to_string()
                })
            }
            Command::Cancel => self.pointer_event(PointerEvent::Cancel, || {
                "nothing to cancel".to_string()
            }),
            Command::Drag { id, to } => self.drag(&id.node, *to),
            Command::Resize { id, width, height } => self.resize(&id.node, *width, *height),
            Command::Cycle { id, direction } => {
                let group = self.group_of(&id.node)?;
                self.canvas
                    .cycle_stack(&group, *direction)
                    .map(|_| ())
                    .ok_or_else(|| format!("stack of '{}' has a single member", id.node))
            }
            Command::Select(id) => {
                let group = self.group_of(&id.node)?;
                accepted(
                    self.canvas.set_active_in_group(&group, &id.node),
                    || format!("cannot select '{}'", id.node),
                )
            }
            Command::Expand(id) => {
                let group = self.group_of(&id.node)?;
                accepted(self.canvas.expand_stack(&group), || {
                    format!("stack of '{}' has a single member", id.node)
                })
            }
            Command::Close => {
                self.canvas.close_expanded();
                Ok(())
            }
            Command::Unlink(id) => {
                let group = self.group_of(&id.node)?;
                accepted(self.canvas.unlink_from_stack(&group, &id.node), || {
                    format!("'{}' is not part of a stack", id.node)
                })
            }
            Command::Relink(id) => accepted(self.canvas.relink_to_stacks(&id.node), || {
                format!("cannot relink '{}'", id.node)
            }),
            Command::Lock(target) => self.set_lock(target, true),
            Command::Unlock(target) => self.set_lock(target, false),
            Command::Order { id, op } => accepted(self.canvas.reorder(&id.node, *op), || {
                format!("cannot reorder '{}'", id.node)
            }),
            Command::Collapse(id) => self
                .canvas
                .toggle_collapse(&id.node)
                .map(|_| ())
                .ok_or_else(|| format!("'{}' is not placed", id.node)),
        }
    }

    fn pointer_event(&mut self, event: PointerEvent, refused: impl FnOnce() -> String) -> Result<(), String> {
        accepted(self.canvas.handle(event), refused)
    }

    fn group_of(&self, id: &WidgetId) -> Result<GroupId, String> {
        self.canvas
            .stack_of(id)
            .map(|stack| stack.group_id)
            .ok_or_else(|| format!("'{}' is not placed", id))
    }

    /// Where the card of `id`'s stack is drawn
    fn displayed(&self, id: &WidgetId) -> Result<Rect, String> {
        self.canvas
            .frame()
            .stack_containing(id)
            .map(|view| view.rect)
            .ok_or_else(|| format!("'{}' is not placed", id))
    }

    fn to_viewport(&self, x: f64, y: f64) -> Point {
        Point::new(x, y - self.canvas.viewport().scroll_top)
    }

    /// Grab the card at its top-left corner and release it at `to`
    fn drag(&mut self, id: &WidgetId, to: Point) -> Result<(), String> {
        let rect = self.displayed(id)?;
        let start = self.to_viewport(rect.x, rect.y);
        let end = self.to_viewport(to.x, to.y);

        self.pointer_event(
            PointerEvent::DragStart {
                id: id.clone(),
                pointer: start,
            },
            || format!("cannot drag '{}'", id),
        )?;
        self.canvas.handle(PointerEvent::DragMove { pointer: end });
        self.canvas.handle(PointerEvent::DragEnd { pointer: end });
        self.pointer = end;
        Ok(())
    }

    /// Grab the bottom-right handle and pull it to the requested size
    fn resize(&mut self, id: &WidgetId, width: f64, height: f64) -> Result<(), String> {
        let rect = self.displayed(id)?;
        let start = self.to_viewport(rect.right(), rect.bottom());
        let end = self.to_viewport(rect.x + width, rect.y + height);

        self.pointer_event(
            PointerEvent::ResizeStart {
                id: id.clone(),
                pointer: start,
            },
            || format!("cannot resize '{}'", id),
        )?;
        self.canvas.handle(PointerEvent::ResizeMove {
            width,
            height,
            pointer: end,
        });
        self.canvas.handle(PointerEvent::ResizeEnd {
            width,
            height,
            pointer: end,
        });
        self.pointer = end;
        Ok(())
    }

    /// Bring a lock to the requested state; already-correct locks are left alone
    fn set_lock(&mut self, target: &LockTarget, locked: bool) -> Result<(), String> {
        match target {
            LockTarget::Widget(id) => {
                let current = self
                    .canvas
                    .store()
                    .instance(&id.node)
                    .map(|inst| inst.is_locked)
                    .unwrap_or(false);
                if current != locked {
                    self.canvas.toggle_instance_lock(&id.node);
                }
            }
            LockTarget::Stack(id) => {
                let group = self.group_of(&id.node)?;
                if self.canvas.store().is_group_locked(&group) != locked {
                    self.canvas.toggle_group_lock(&group);
                }
            }
        }
        Ok(())
    }
}

fn accepted(ok: bool, refused: impl FnOnce() -> String) -> Result<(), String> {
    if ok {
        Ok(())
    } else {
        Err(refused())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasConfig;
    use crate::model::{Snapshot, WidgetInstance};
    use crate::script::parse;
    use crate::store::MemoryStore;

    fn canvas() -> Canvas<MemoryStore> {
        let snapshot = Snapshot::new()
            .with_instance(WidgetInstance::new("clock", "clock", Rect::new(20.0, 20.0, 360.0, 260.0)))
            .with_instance(WidgetInstance::new("todo", "todo", Rect::new(25.0, 24.0, 360.0, 260.0)))
            .with_instance(WidgetInstance::new("mail", "mail", Rect::new(400.0, 20.0, 360.0, 260.0)));
        Canvas::new(MemoryStore::new(snapshot), CanvasConfig::default())
    }

    fn run(canvas: &mut Canvas<MemoryStore>, source: &str) -> ReplayReport {
        replay(canvas, &parse(source).expect("Should parse"))
    }

    fn origin(canvas: &Canvas<MemoryStore>, id: &str) -> Option<(f64, f64)> {
        canvas
            .store()
            .layout_of(&WidgetId::new(id))
            .map(|r| (r.x, r.y))
    }

    #[test]
    fn test_unknown_widgets_are_skipped() {
        let mut canvas = canvas();
        let report = run(&mut canvas, "edit on\nfront nope\nfront mail");
        assert_eq!(report.executed, 2);
        assert_eq!(report.unknown(), 1);
        assert_eq!(report.warnings[0].span, 14..18);
    }

    #[test]
    fn test_drag_refused_outside_edit_mode() {
        let mut canvas = canvas();
        let report = run(&mut canvas, "drag mail to 800, 20");
        assert_eq!(report.rejected(), 1);
        assert_eq!(origin(&canvas, "mail"), Some((400.0, 20.0)));
    }

    #[test]
    fn test_drag_moves_whole_stack() {
        let mut canvas = canvas();
        let report = run(&mut canvas, "edit on\ndrag clock to 120, 320");
        assert_eq!(report.warnings, vec![]);
        assert_eq!(origin(&canvas, "clock"), Some((120.0, 320.0)));
        assert_eq!(origin(&canvas, "todo"), Some((125.0, 324.0)));
        assert_eq!(origin(&canvas, "mail"), Some((400.0, 20.0)));
    }

    #[test]
    fn test_grab_move_drop() {
        let mut canvas = canvas();
        let report = run(&mut canvas, "edit on\ngrab mail at 410, 30\nmove 613, 236\ndrop\ndrop");
        assert_eq!(report.rejected(), 1);
        assert_eq!(origin(&canvas, "mail"), Some((600.0, 230.0)));
    }

    #[test]
    fn test_lock_blocks_drag_and_unlock_restores() {
        let mut canvas = canvas();
        let report = run(
            &mut canvas,
            "edit on\nlock stack todo\ndrag clock to 200, 200\nunlock stack todo\nlock stack todo\nunlock stack clock\ndrag clock to 200, 200",
        );
        assert_eq!(report.rejected(), 1);
        assert_eq!(origin(&canvas, "clock"), Some((200.0, 200.0)));
    }

    #[test]
    fn test_cycle_and_unlink() {
        let mut canvas = canvas();
        let report = run(&mut canvas, "cycle clock\nunlink todo\ncycle clock");
        assert_eq!(report.executed, 2);
        assert_eq!(report.rejected(), 1);
        assert_eq!(origin(&canvas, "todo"), Some((640.0, 20.0)));
    }
}

//! Syntax tree of interaction scripts

use crate::canvas::CycleDirection;
use crate::geometry::Point;
use crate::model::WidgetId;
use crate::store::ZOrder;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A parsed script: commands in execution order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub commands: Vec<Spanned<Command>>,
}

/// Which lock a `lock`/`unlock` command addresses
#[derive(Debug, Clone, PartialEq)]
pub enum LockTarget {
    /// The widget's own lock
    Widget(Spanned<WidgetId>),
    /// The lock of the stack containing the widget
    Stack(Spanned<WidgetId>),
}

impl LockTarget {
    pub fn widget(&self) -> &Spanned<WidgetId> {
        match self {
            LockTarget::Widget(id) | LockTarget::Stack(id) => id,
        }
    }
}

/// One script command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `edit on` / `edit off`
    Edit(bool),
    /// `viewport w, h`
    Viewport { width: f64, height: f64 },
    /// `frame n`: advance `n` animation frames
    Frame(u32),
    /// `grab id at x, y`: start a drag with the pointer at a viewport point
    Grab { id: Spanned<WidgetId>, at: Point },
    /// `move x, y`
    Move(Point),
    /// `drop`: finish the drag at the last pointer position
    Drop,
    /// `cancel`
    Cancel,
    /// `drag id to x, y`: a whole drag landing the card's top-left at a surface point
    Drag { id: Spanned<WidgetId>, to: Point },
    /// `resize id to w, h`
    Resize {
        id: Spanned<WidgetId>,
        width: f64,
        height: f64,
    },
    /// `cycle id next|prev`
    Cycle {
        id: Spanned<WidgetId>,
        direction: CycleDirection,
    },
    /// `select id`: make a widget the active member of its stack
    Select(Spanned<WidgetId>),
    /// `expand id`: open the browse view of the widget's stack
    Expand(Spanned<WidgetId>),
    /// `close`: close the browse view
    Close,
    Unlink(Spanned<WidgetId>),
    Relink(Spanned<WidgetId>),
    Lock(LockTarget),
    Unlock(LockTarget),
    /// `front|back|forward|backward id`
    Order { id: Spanned<WidgetId>, op: ZOrder },
    /// `collapse id`: toggle collapse
    Collapse(Spanned<WidgetId>),
}

impl Command {
    /// Widget the command refers to, if any
    pub fn widget(&self) -> Option<&Spanned<WidgetId>> {
        match self {
            Command::Grab { id, .. }
            | Command::Drag { id, .. }
            | Command::Resize { id, .. }
            | Command::Cycle { id, .. }
            | Command::Order { id, .. }
            | Command::Select(id)
            | Command::Expand(id)
            | Command::Unlink(id)
            | Command::Relink(id)
            | Command::Collapse(id) => Some(id),
            Command::Lock(target) | Command::Unlock(target) => Some(target.widget()),
            Command::Edit(_)
            | Command::Viewport { .. }
            | Command::Frame(_)
            | Command::Move(_)
            | Command::Drop
            | Command::Cancel
            | Command::Close => None,
        }
    }
}

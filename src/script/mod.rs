//! Interaction scripts: recorded pointer gestures and stack operations that
//! can be replayed against a [`Canvas`](crate::canvas::Canvas)

pub mod ast;
mod grammar;
pub mod lexer;
mod replay;

pub use ast::*;
pub use grammar::parse;
pub use replay::{replay, ReplayReport, ReplayWarning, WarningCategory, FRAME_INTERVAL};

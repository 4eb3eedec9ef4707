//! Small shared helpers

mod rect;

pub use rect::Rect;

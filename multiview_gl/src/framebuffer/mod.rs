/// Framebuffer module - attachment points, multiview state and completeness

pub mod attachment;
pub mod multiview;
pub mod framebuffer;
pub mod completeness;

pub use attachment::*;
pub use multiview::*;
pub use framebuffer::*;
pub use completeness::*;

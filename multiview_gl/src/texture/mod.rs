/// Texture module - software texel storage backing framebuffer attachments

pub mod format;
pub mod texture;

pub use format::*;
pub use texture::*;

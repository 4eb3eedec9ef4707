/// Ambient context state: bindings, viewport / scissor, clear values

use bitflags::bitflags;
use glam::Vec4;
use crate::framebuffer::FramebufferKey;
use crate::texture::{TextureKey, TextureTarget};
use crate::utils::Rect;

/// Framebuffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTarget {
    /// Draw and read at once (binding); draw binding (queries)
    Framebuffer,
    Draw,
    Read,
}

/// Capabilities toggled with `enable` / `disable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ScissorTest,
}

bitflags! {
    /// Buffers affected by `clear` and `blit_framebuffer`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferMask: u32 {
        const COLOR = 0x0000_4000;
        const DEPTH = 0x0000_0100;
        const STENCIL = 0x0000_0400;
    }
}

/// Sampling filter for `blit_framebuffer`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlitFilter {
    Nearest,
    Linear,
}

/// Texture bound to each texture target
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureBindings {
    texture_2d: Option<TextureKey>,
    texture_2d_array: Option<TextureKey>,
    texture_3d: Option<TextureKey>,
}

impl TextureBindings {
    pub fn get(&self, target: TextureTarget) -> Option<TextureKey> {
        match target {
            TextureTarget::Texture2D => self.texture_2d,
            TextureTarget::Texture2DArray => self.texture_2d_array,
            TextureTarget::Texture3D => self.texture_3d,
        }
    }

    pub fn set(&mut self, target: TextureTarget, texture: Option<TextureKey>) {
        match target {
            TextureTarget::Texture2D => self.texture_2d = texture,
            TextureTarget::Texture2DArray => self.texture_2d_array = texture,
            TextureTarget::Texture3D => self.texture_3d = texture,
        }
    }

    /// Unbind `texture` from every target (texture deletion)
    pub fn unbind(&mut self, texture: TextureKey) {
        for slot in [&mut self.texture_2d, &mut self.texture_2d_array, &mut self.texture_3d] {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }
}

/// Rasterization and clear state
#[derive(Debug, Clone)]
pub struct RenderState {
    pub viewport: Rect,
    pub scissor: Rect,
    pub scissor_test: bool,
    pub clear_color: Vec4,
    pub clear_depth: f32,
    pub clear_stencil: u8,
}

impl RenderState {
    /// Initial state for a window of the given size
    pub fn new(window_width: u32, window_height: u32) -> Self {
        let window = Rect::from_size(window_width, window_height);
        Self {
            viewport: window,
            scissor: window,
            scissor_test: false,
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
            clear_stencil: 0,
        }
    }

    /// Clear color quantized to RGBA8
    pub fn clear_color_rgba8(&self) -> [u8; 4] {
        let c = (self.clear_color.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
    }
}

/// Attachment points and the image bound to each of them

use std::ops::Range;
use crate::texture::TextureKey;
use super::multiview::MultiviewState;

/// Slot of a framebuffer an image can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttachmentPoint {
    Color(u32),
    Depth,
    Stencil,
    /// Writes both the depth and the stencil point
    DepthStencil,
}

impl AttachmentPoint {
    pub fn is_color(&self) -> bool {
        matches!(self, AttachmentPoint::Color(_))
    }
}

/// Image bound to one attachment point
#[derive(Debug, Clone, PartialEq)]
pub struct FramebufferAttachment {
    pub texture: TextureKey,
    pub level: u32,
    /// Layer for single-layer attachments of array / 3D textures
    pub layer: u32,
    pub multiview: MultiviewState,
}

impl FramebufferAttachment {
    /// Plain attachment, multiview state reset to default
    pub fn plain(texture: TextureKey, level: u32) -> Self {
        Self::layer(texture, level, 0)
    }

    /// Single layer of an array / 3D texture
    pub fn layer(texture: TextureKey, level: u32, layer: u32) -> Self {
        Self {
            texture,
            level,
            layer,
            multiview: MultiviewState::None,
        }
    }

    pub fn multiview(texture: TextureKey, level: u32, multiview: MultiviewState) -> Self {
        Self {
            texture,
            level,
            layer: 0,
            multiview,
        }
    }

    /// Image layers written through this attachment
    pub fn layers(&self) -> Range<u32> {
        match self.multiview {
            MultiviewState::Layered { base_view_index, num_views } => {
                base_view_index..base_view_index + num_views
            }
            _ => self.layer..self.layer + 1,
        }
    }
}

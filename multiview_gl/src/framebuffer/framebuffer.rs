/// Framebuffer object
///
/// A framebuffer owns the attachment table of one framebuffer object: which
/// image sits at each attachment point and the multiview state it was
/// attached with. Binding an image through any entry point replaces the whole
/// entry, so the multiview state is always reset or set together with the
/// image and dropped together with it.

use rustc_hash::FxHashMap;
use slotmap::new_key_type;
use crate::texture::TextureKey;
use super::attachment::{AttachmentPoint, FramebufferAttachment};

new_key_type! {
    /// Handle of a framebuffer object owned by a `Context`
    pub struct FramebufferKey;
}

#[derive(Debug, Clone, Default)]
pub struct Framebuffer {
    attachments: FxHashMap<AttachmentPoint, FramebufferAttachment>,
    is_default: bool,
}

impl Framebuffer {
    /// Create a framebuffer object with no attachments
    pub fn new() -> Self {
        Self::default()
    }

    /// Window-system framebuffer backed by context-owned images
    pub(crate) fn window_surface(color: TextureKey, depth_stencil: TextureKey) -> Self {
        let mut framebuffer = Self {
            attachments: FxHashMap::default(),
            is_default: true,
        };
        framebuffer.attach(AttachmentPoint::Color(0), FramebufferAttachment::plain(color, 0));
        framebuffer.attach(AttachmentPoint::DepthStencil, FramebufferAttachment::plain(depth_stencil, 0));
        framebuffer
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Bind an image (with its multiview state) to an attachment point
    pub fn attach(&mut self, point: AttachmentPoint, attachment: FramebufferAttachment) {
        match point {
            AttachmentPoint::DepthStencil => {
                self.attachments.insert(AttachmentPoint::Depth, attachment.clone());
                self.attachments.insert(AttachmentPoint::Stencil, attachment);
            }
            _ => {
                self.attachments.insert(point, attachment);
            }
        }
    }

    /// Clear an attachment point and its multiview state
    pub fn detach(&mut self, point: AttachmentPoint) {
        match point {
            AttachmentPoint::DepthStencil => {
                self.attachments.remove(&AttachmentPoint::Depth);
                self.attachments.remove(&AttachmentPoint::Stencil);
            }
            _ => {
                self.attachments.remove(&point);
            }
        }
    }

    /// Drop every attachment referencing `texture` (texture deletion)
    pub fn detach_texture(&mut self, texture: TextureKey) {
        self.attachments.retain(|_, attachment| attachment.texture != texture);
    }

    /// Attachment at `point`
    ///
    /// For `DepthStencil` the depth and stencil points must hold the same
    /// attachment, otherwise there is no single answer and `None` is returned.
    pub fn attachment(&self, point: AttachmentPoint) -> Option<&FramebufferAttachment> {
        match point {
            AttachmentPoint::DepthStencil => {
                let depth = self.attachments.get(&AttachmentPoint::Depth)?;
                let stencil = self.attachments.get(&AttachmentPoint::Stencil)?;
                (depth == stencil).then_some(depth)
            }
            _ => self.attachments.get(&point),
        }
    }

    /// All bound attachments, ordered by attachment point
    pub fn attachments(&self) -> Vec<(AttachmentPoint, &FramebufferAttachment)> {
        let mut attachments: Vec<_> = self.attachments.iter().map(|(p, a)| (*p, a)).collect();
        attachments.sort_by_key(|(point, _)| *point);
        attachments
    }

    /// Bound color attachments, ordered by index
    pub fn color_attachments(&self) -> Vec<(u32, &FramebufferAttachment)> {
        self.attachments()
            .into_iter()
            .filter_map(|(point, attachment)| match point {
                AttachmentPoint::Color(index) => Some((index, attachment)),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// A framebuffer is multiview iff any attachment has a multiview layout
    pub fn is_multiview(&self) -> bool {
        self.attachments.values().any(|attachment| attachment.multiview.is_multiview())
    }

    /// Attachment that defines the views of a multiview framebuffer
    ///
    /// The multiview attachment at the lowest attachment point (colors before depth).
    pub fn view_source(&self) -> Option<&FramebufferAttachment> {
        self.attachments()
            .into_iter()
            .map(|(_, attachment)| attachment)
            .find(|attachment| attachment.multiview.is_multiview())
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;

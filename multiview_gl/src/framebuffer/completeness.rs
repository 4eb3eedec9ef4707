/// Framebuffer completeness
///
/// Multiview consistency is checked first: as soon as one attachment has a
/// multiview layout, every bound attachment has to describe the same views
/// (layout, view count, side-by-side offsets, layered base index). An
/// attachment bound through the plain entry point counts as a single
/// non-multiview view, so it never matches a multiview sibling. After that
/// the standard per-attachment rules apply.

use slotmap::SlotMap;
use crate::texture::{Texture, TextureKey};
use super::attachment::{AttachmentPoint, FramebufferAttachment};
use super::framebuffer::Framebuffer;

/// Result of `check_framebuffer_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferStatus {
    Complete,
    IncompleteAttachment,
    IncompleteMissingAttachment,
    /// Attachments disagree on their multiview views
    IncompleteViewTargets,
    /// Depth and stencil attached to different images
    Unsupported,
}

impl FramebufferStatus {
    pub fn is_complete(&self) -> bool {
        *self == FramebufferStatus::Complete
    }
}

/// Compute the completeness status of `framebuffer`
pub fn check_status(
    framebuffer: &Framebuffer,
    textures: &SlotMap<TextureKey, Texture>,
) -> FramebufferStatus {
    if framebuffer.is_default() {
        return FramebufferStatus::Complete;
    }

    if framebuffer.is_multiview() && !views_agree(framebuffer) {
        return FramebufferStatus::IncompleteViewTargets;
    }

    standard_status(framebuffer, textures)
}

/// Every bound attachment describes the same views
fn views_agree(framebuffer: &Framebuffer) -> bool {
    let attachments = framebuffer.attachments();
    let Some((_, first)) = attachments.first() else {
        return true;
    };
    attachments
        .iter()
        .all(|(_, attachment)| attachment.multiview.same_views_as(&first.multiview))
}

fn standard_status(
    framebuffer: &Framebuffer,
    textures: &SlotMap<TextureKey, Texture>,
) -> FramebufferStatus {
    let attachments = framebuffer.attachments();
    if attachments.is_empty() {
        return FramebufferStatus::IncompleteMissingAttachment;
    }

    for (point, attachment) in &attachments {
        if !attachment_complete(*point, attachment, textures) {
            return FramebufferStatus::IncompleteAttachment;
        }
    }

    let depth = framebuffer.attachment(AttachmentPoint::Depth);
    let stencil = framebuffer.attachment(AttachmentPoint::Stencil);
    if let (Some(depth), Some(stencil)) = (depth, stencil) {
        if depth != stencil {
            return FramebufferStatus::Unsupported;
        }
    }

    FramebufferStatus::Complete
}

/// Attachment completeness: defined level, non-zero extent, layers inside
/// the image and a format renderable at this point
fn attachment_complete(
    point: AttachmentPoint,
    attachment: &FramebufferAttachment,
    textures: &SlotMap<TextureKey, Texture>,
) -> bool {
    let Some(image) = textures
        .get(attachment.texture)
        .and_then(|texture| texture.image(attachment.level))
    else {
        return false;
    };

    if image.width == 0 || image.height == 0 {
        return false;
    }
    if attachment.layers().end > image.layer_count() {
        return false;
    }

    match point {
        AttachmentPoint::Color(_) => image.format.is_color_renderable(),
        AttachmentPoint::Depth => image.format.is_depth_renderable(),
        AttachmentPoint::Stencil => image.format.is_stencil_renderable(),
        AttachmentPoint::DepthStencil => {
            image.format.is_depth_renderable() && image.format.is_stencil_renderable()
        }
    }
}

#[cfg(test)]
#[path = "completeness_tests.rs"]
mod tests;

/// Validation gates shared by the context entry points
///
/// Every gate returns the error to record; callers run them before touching
/// any state so a failed call leaves the context unchanged.

use crate::error::Result;
use crate::extension::Extension;
use crate::framebuffer::{AttachmentPoint, Framebuffer, FramebufferKey, FramebufferStatus};
use crate::texture::{TextureKey, TextureTarget};
use crate::{mvgl_bail, mvgl_err};
use super::context::Context;
use super::query::AttachmentParameter;
use super::state::FramebufferTarget;

const SOURCE: &str = "mvgl::Validation";

impl Context {
    /// Entry points of an inactive extension do not exist
    pub(super) fn require_extension(&self, extension: Extension, entry_point: &str) -> Result<()> {
        if !self.extensions.is_enabled(extension) {
            mvgl_bail!(SOURCE, InvalidOperation,
                "{} requires {}, which is not enabled", entry_point, extension.name());
        }
        Ok(())
    }

    /// Query tokens of an inactive extension are unknown enums
    pub(super) fn require_token(&self, pname: AttachmentParameter) -> Result<()> {
        if let Some(extension) = pname.required_extension() {
            if !self.extensions.is_enabled(extension) {
                mvgl_bail!(SOURCE, InvalidEnum,
                    "{:?} is not a valid token without {}", pname, extension.name());
            }
        }
        Ok(())
    }

    /// Framebuffer object receiving attachments through `target`
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the default framebuffer is bound there.
    pub(super) fn attachable_framebuffer(&self, target: FramebufferTarget) -> Result<FramebufferKey> {
        self.framebuffer_binding(target).ok_or_else(|| mvgl_err!(SOURCE, InvalidOperation,
            "Cannot modify attachments of the default framebuffer"))
    }

    /// Attachment point inside the implementation limits
    pub(super) fn validate_attachment_point(&self, point: AttachmentPoint) -> Result<()> {
        if let AttachmentPoint::Color(index) = point {
            if index >= self.config.max_color_attachments {
                mvgl_bail!(SOURCE, InvalidOperation,
                    "Color attachment {} exceeds MAX_COLOR_ATTACHMENTS ({})",
                    index, self.config.max_color_attachments);
            }
        }
        Ok(())
    }

    /// Mip level allowed for textures bound to `target`
    pub(super) fn validate_level(&self, target: TextureTarget, level: i32) -> Result<u32> {
        let max_levels = match target {
            TextureTarget::Texture3D => self.config.max_3d_texture_levels(),
            _ => self.config.max_texture_levels(),
        };
        if level < 0 || level as u32 >= max_levels {
            mvgl_bail!(SOURCE, InvalidValue,
                "Mip level {} out of range for {:?} (0..{})", level, target, max_levels);
        }
        Ok(level as u32)
    }

    /// Existing texture whose target is one of `allowed`
    pub(super) fn attachable_texture(
        &self,
        texture: TextureKey,
        allowed: &[TextureTarget],
    ) -> Result<TextureTarget> {
        let Some(object) = self.textures.get(texture) else {
            mvgl_bail!(SOURCE, InvalidOperation, "Texture does not exist");
        };
        match object.target() {
            Some(target) if allowed.contains(&target) => Ok(target),
            Some(target) => Err(mvgl_err!(SOURCE, InvalidOperation,
                "Texture of type {:?} cannot be attached here (expected one of {:?})",
                target, allowed)),
            None => Err(mvgl_err!(SOURCE, InvalidOperation,
                "Texture has never been bound and has no type")),
        }
    }

    /// Read framebuffer usable as a pixel source (read-back, copy, blit)
    pub(super) fn validate_read_framebuffer(&self, operation: &str) -> Result<&Framebuffer> {
        let framebuffer = self.bound_framebuffer(FramebufferTarget::Read);
        self.validate_pixel_framebuffer(framebuffer, "read", operation)?;
        Ok(framebuffer)
    }

    /// Draw framebuffer usable as a blit destination
    pub(super) fn validate_draw_framebuffer(&self, operation: &str) -> Result<&Framebuffer> {
        let framebuffer = self.bound_framebuffer(FramebufferTarget::Draw);
        self.validate_pixel_framebuffer(framebuffer, "draw", operation)?;
        Ok(framebuffer)
    }

    /// Draw framebuffer must be complete (multiview allowed)
    pub(super) fn validate_complete_draw_framebuffer(&self, operation: &str) -> Result<&Framebuffer> {
        let framebuffer = self.bound_framebuffer(FramebufferTarget::Draw);
        let status = self.status_of(framebuffer);
        if status != FramebufferStatus::Complete {
            mvgl_bail!(SOURCE, InvalidFramebufferOperation,
                "{}: draw framebuffer is incomplete ({:?})", operation, status);
        }
        Ok(framebuffer)
    }

    fn validate_pixel_framebuffer(
        &self,
        framebuffer: &Framebuffer,
        role: &str,
        operation: &str,
    ) -> Result<()> {
        let status = self.status_of(framebuffer);
        if status != FramebufferStatus::Complete {
            mvgl_bail!(SOURCE, InvalidFramebufferOperation,
                "{}: {} framebuffer is incomplete ({:?})", operation, role, status);
        }
        if framebuffer.is_multiview() {
            mvgl_bail!(SOURCE, InvalidFramebufferOperation,
                "{}: {} framebuffer has multiview attachments", operation, role);
        }
        Ok(())
    }
}

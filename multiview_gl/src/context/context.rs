/// Context - owns textures, framebuffers, bindings and the sticky error state
///
/// Every entry point validates its arguments before mutating anything. A
/// failing call returns the error and records its code as the context error
/// (the first recorded code wins until `get_error` reads and resets it).
/// Commands are processed synchronously; `&mut self` serializes them.

use slotmap::SlotMap;
use glam::Vec4;
use crate::error::{ErrorCode, Result};
use crate::extension::{Extension, ExtensionSet};
use crate::framebuffer::{
    check_status, AttachmentPoint, Framebuffer, FramebufferAttachment, FramebufferKey,
    FramebufferStatus, MultiviewState,
};
use crate::texture::{InternalFormat, Texture, TextureImage, TextureKey, TextureTarget};
use crate::utils::Rect;
use crate::{mvgl_bail, mvgl_debug, mvgl_err, mvgl_info, mvgl_trace};
use super::config::ContextConfig;
use super::query::{AttachmentParameter, ObjectType, ParameterValue};
use super::state::{Capability, FramebufferTarget, RenderState, TextureBindings};

const SOURCE: &str = "mvgl::Context";

pub struct Context {
    pub(super) config: ContextConfig,
    pub(super) extensions: ExtensionSet,
    pub(super) textures: SlotMap<TextureKey, Texture>,
    pub(super) framebuffers: SlotMap<FramebufferKey, Framebuffer>,
    pub(super) default_framebuffer: Framebuffer,
    pub(super) draw_framebuffer: Option<FramebufferKey>,
    pub(super) read_framebuffer: Option<FramebufferKey>,
    pub(super) texture_bindings: TextureBindings,
    pub(super) state: RenderState,
    error: ErrorCode,
}

impl Context {
    /// Create a context with its window-system framebuffer
    ///
    /// # Errors
    ///
    /// `InitializationFailed` if the window does not fit `max_texture_size`.
    pub fn new(config: ContextConfig) -> Result<Self> {
        let (width, height) = (config.window_width, config.window_height);
        if width == 0 || height == 0
            || width > config.max_texture_size || height > config.max_texture_size
        {
            mvgl_bail!(SOURCE, InitializationFailed,
                "Window size {}x{} outside 1..={}", width, height, config.max_texture_size);
        }

        let mut textures: SlotMap<TextureKey, Texture> = SlotMap::with_key();
        let mut surface = |format: InternalFormat| -> Result<TextureKey> {
            let mut texture = Texture::new();
            texture.bind_target(TextureTarget::Texture2D)?;
            texture.set_image(0, TextureImage::new(format, width, height, 1)?);
            Ok(textures.insert(texture))
        };
        let color = surface(InternalFormat::Rgba8)?;
        let depth_stencil = surface(InternalFormat::Depth24Stencil8)?;

        let extensions = ExtensionSet::new(&config.supported_extensions, config.webgl_compatibility);
        mvgl_info!(SOURCE, "Context created ({}x{}, extensions: {:?})",
            width, height, extensions.enabled_names());

        Ok(Self {
            state: RenderState::new(width, height),
            extensions,
            textures,
            framebuffers: SlotMap::with_key(),
            default_framebuffer: Framebuffer::window_surface(color, depth_stencil),
            draw_framebuffer: None,
            read_framebuffer: None,
            texture_bindings: TextureBindings::default(),
            config,
            error: ErrorCode::NoError,
        })
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    // ===== ERROR STATE =====

    /// Return the recorded error code and reset it to `NoError`
    pub fn get_error(&mut self) -> ErrorCode {
        std::mem::replace(&mut self.error, ErrorCode::NoError)
    }

    /// Run an entry point body and record its failure, if any
    pub(super) fn run<T>(&mut self, body: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = body(self);
        if let Err(error) = &result {
            if self.error == ErrorCode::NoError {
                self.error = error.code();
            }
        }
        result
    }

    // ===== EXTENSIONS =====

    pub fn extension_enabled(&self, name: &str) -> bool {
        Extension::from_name(name).is_some_and(|ext| self.extensions.is_enabled(ext))
    }

    pub fn extension_requestable(&self, name: &str) -> bool {
        self.extensions.is_requestable(name)
    }

    /// Activate a requestable extension
    pub fn request_extension(&mut self, name: &str) -> Result<()> {
        self.run(|ctx| {
            let ext = ctx.extensions.request(name)?;
            mvgl_debug!(SOURCE, "Extension {} enabled", ext.name());
            Ok(())
        })
    }

    pub fn enabled_extensions(&self) -> Vec<&'static str> {
        self.extensions.enabled_names()
    }

    // ===== TEXTURES =====

    pub fn create_texture(&mut self) -> TextureKey {
        self.textures.insert(Texture::new())
    }

    /// Delete a texture, detaching it from every framebuffer and binding
    pub fn delete_texture(&mut self, texture: TextureKey) {
        if self.textures.remove(texture).is_none() {
            return;
        }
        self.texture_bindings.unbind(texture);
        for (_, framebuffer) in self.framebuffers.iter_mut() {
            framebuffer.detach_texture(texture);
        }
        mvgl_trace!(SOURCE, "Texture {:?} deleted", texture);
    }

    pub fn texture(&self, texture: TextureKey) -> Option<&Texture> {
        self.textures.get(texture)
    }

    /// Bind a texture (or unbind with `None`); fixes the texture's target on first bind
    pub fn bind_texture(&mut self, target: TextureTarget, texture: Option<TextureKey>) -> Result<()> {
        self.run(|ctx| {
            if let Some(key) = texture {
                let Some(object) = ctx.textures.get_mut(key) else {
                    mvgl_bail!(SOURCE, InvalidOperation, "bind_texture: texture does not exist");
                };
                object.bind_target(target)?;
            }
            ctx.texture_bindings.set(target, texture);
            Ok(())
        })
    }

    pub fn texture_binding(&self, target: TextureTarget) -> Option<TextureKey> {
        self.texture_bindings.get(target)
    }

    /// Define a level of the 2D texture bound to `target`
    pub fn tex_image_2d(
        &mut self,
        target: TextureTarget,
        level: i32,
        format: InternalFormat,
        width: i32,
        height: i32,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.run(|ctx| {
            if target != TextureTarget::Texture2D {
                mvgl_bail!(SOURCE, InvalidEnum, "tex_image_2d: invalid target {:?}", target);
            }
            ctx.define_texture_image(target, level, format, [width, height, 1], data)
        })
    }

    /// Define a level of the 2D-array or 3D texture bound to `target`
    pub fn tex_image_3d(
        &mut self,
        target: TextureTarget,
        level: i32,
        format: InternalFormat,
        width: i32,
        height: i32,
        depth: i32,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.run(|ctx| {
            if !target.is_3d() {
                mvgl_bail!(SOURCE, InvalidEnum, "tex_image_3d: invalid target {:?}", target);
            }
            if target == TextureTarget::Texture3D && !format.is_color_renderable() {
                mvgl_bail!(SOURCE, InvalidOperation,
                    "tex_image_3d: {:?} is not allowed for 3D textures", format);
            }
            ctx.define_texture_image(target, level, format, [width, height, depth], data)
        })
    }

    fn define_texture_image(
        &mut self,
        target: TextureTarget,
        level: i32,
        format: InternalFormat,
        size: [i32; 3],
        data: Option<&[u8]>,
    ) -> Result<()> {
        let level = self.validate_level(target, level)?;
        let [width, height, depth] = size;
        if width < 0 || height < 0 || depth < 0 {
            mvgl_bail!(SOURCE, InvalidValue, "Negative texture size {:?}", size);
        }
        let (max_size, max_depth) = match target {
            TextureTarget::Texture2D => (self.config.max_texture_size, 1),
            TextureTarget::Texture2DArray => {
                (self.config.max_texture_size, self.config.max_array_texture_layers)
            }
            TextureTarget::Texture3D => {
                (self.config.max_3d_texture_size, self.config.max_3d_texture_size)
            }
        };
        let max_extent = max_size >> level;
        if width as u32 > max_extent || height as u32 > max_extent || depth as u32 > max_depth {
            mvgl_bail!(SOURCE, InvalidValue,
                "Texture size {}x{}x{} exceeds limits at level {}", width, height, depth, level);
        }
        let Some(key) = self.texture_bindings.get(target) else {
            mvgl_bail!(SOURCE, InvalidOperation, "No texture bound to {:?}", target);
        };

        let (width, height, depth) = (width as u32, height as u32, depth as u32);
        let image = match data {
            Some(bytes) => TextureImage::with_data(format, width, height, depth, bytes)?,
            None => TextureImage::new(format, width, height, depth)?,
        };
        self.textures[key].set_image(level, image);
        mvgl_trace!(SOURCE, "Defined level {} of {:?}: {:?} {}x{}x{}",
            level, target, format, width, height, depth);
        Ok(())
    }

    // ===== FRAMEBUFFER OBJECTS =====

    pub fn create_framebuffer(&mut self) -> FramebufferKey {
        self.framebuffers.insert(Framebuffer::new())
    }

    /// Delete a framebuffer; bindings to it revert to the default framebuffer
    pub fn delete_framebuffer(&mut self, framebuffer: FramebufferKey) {
        if self.framebuffers.remove(framebuffer).is_none() {
            return;
        }
        if self.draw_framebuffer == Some(framebuffer) {
            self.draw_framebuffer = None;
        }
        if self.read_framebuffer == Some(framebuffer) {
            self.read_framebuffer = None;
        }
    }

    pub fn framebuffer(&self, framebuffer: FramebufferKey) -> Option<&Framebuffer> {
        self.framebuffers.get(framebuffer)
    }

    /// Bind a framebuffer object, or the default framebuffer with `None`
    pub fn bind_framebuffer(
        &mut self,
        target: FramebufferTarget,
        framebuffer: Option<FramebufferKey>,
    ) -> Result<()> {
        self.run(|ctx| {
            if let Some(key) = framebuffer {
                if !ctx.framebuffers.contains_key(key) {
                    mvgl_bail!(SOURCE, InvalidOperation, "bind_framebuffer: framebuffer does not exist");
                }
            }
            match target {
                FramebufferTarget::Framebuffer => {
                    ctx.draw_framebuffer = framebuffer;
                    ctx.read_framebuffer = framebuffer;
                }
                FramebufferTarget::Draw => ctx.draw_framebuffer = framebuffer,
                FramebufferTarget::Read => ctx.read_framebuffer = framebuffer,
            }
            Ok(())
        })
    }

    /// Framebuffer object bound to `target`; `None` is the default framebuffer
    pub fn framebuffer_binding(&self, target: FramebufferTarget) -> Option<FramebufferKey> {
        match target {
            FramebufferTarget::Framebuffer | FramebufferTarget::Draw => self.draw_framebuffer,
            FramebufferTarget::Read => self.read_framebuffer,
        }
    }

    pub(super) fn bound_framebuffer(&self, target: FramebufferTarget) -> &Framebuffer {
        self.framebuffer_binding(target)
            .and_then(|key| self.framebuffers.get(key))
            .unwrap_or(&self.default_framebuffer)
    }

    // ===== ATTACHMENTS =====

    /// Attach level `level` of a 2D texture, resetting the multiview state
    ///
    /// `None` detaches the attachment point.
    pub fn framebuffer_texture_2d(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        texture_target: TextureTarget,
        texture: Option<TextureKey>,
        level: i32,
    ) -> Result<()> {
        self.run(|ctx| {
            if texture_target != TextureTarget::Texture2D {
                mvgl_bail!(SOURCE, InvalidEnum,
                    "framebuffer_texture_2d: invalid texture target {:?}", texture_target);
            }
            let key = ctx.attachable_framebuffer(target)?;
            ctx.validate_attachment_point(point)?;

            let Some(texture) = texture else {
                ctx.framebuffers[key].detach(point);
                mvgl_debug!(SOURCE, "Detached {:?}", point);
                return Ok(());
            };
            ctx.attachable_texture(texture, &[TextureTarget::Texture2D])?;
            let level = ctx.validate_level(texture_target, level)?;

            ctx.framebuffers[key].attach(point, FramebufferAttachment::plain(texture, level));
            mvgl_debug!(SOURCE, "Attached 2D texture to {:?} (level {})", point, level);
            Ok(())
        })
    }

    /// Attach one layer of a 2D-array or 3D texture
    pub fn framebuffer_texture_layer(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        texture: Option<TextureKey>,
        level: i32,
        layer: i32,
    ) -> Result<()> {
        self.run(|ctx| {
            let key = ctx.attachable_framebuffer(target)?;
            ctx.validate_attachment_point(point)?;

            let Some(texture) = texture else {
                ctx.framebuffers[key].detach(point);
                mvgl_debug!(SOURCE, "Detached {:?}", point);
                return Ok(());
            };
            let texture_target = ctx.attachable_texture(
                texture,
                &[TextureTarget::Texture2DArray, TextureTarget::Texture3D],
            )?;
            let level = ctx.validate_level(texture_target, level)?;
            let max_layers = match texture_target {
                TextureTarget::Texture3D => ctx.config.max_3d_texture_size,
                _ => ctx.config.max_array_texture_layers,
            };
            if layer < 0 || layer as u32 >= max_layers {
                mvgl_bail!(SOURCE, InvalidValue,
                    "framebuffer_texture_layer: layer {} outside 0..{}", layer, max_layers);
            }

            ctx.framebuffers[key]
                .attach(point, FramebufferAttachment::layer(texture, level, layer as u32));
            mvgl_debug!(SOURCE, "Attached layer {} to {:?} (level {})", layer, point, level);
            Ok(())
        })
    }

    /// Attach a 2D texture whose views sit side by side at `viewport_offsets`
    ///
    /// `viewport_offsets` holds `num_views` (x, y) pairs. `num_views == 0` or
    /// `None` detaches the attachment point.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if `GL_ANGLE_multiview` is not enabled (checked first)
    /// - `InvalidValue` for a negative view count or offset component
    /// - `InvalidOperation` for the default framebuffer or a non-2D texture
    pub fn framebuffer_texture_multiview_side_by_side(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        texture: Option<TextureKey>,
        level: i32,
        num_views: i32,
        viewport_offsets: &[i32],
    ) -> Result<()> {
        self.run(|ctx| {
            ctx.require_extension(Extension::Multiview, "framebuffer_texture_multiview_side_by_side")?;
            let state = MultiviewState::side_by_side(num_views, viewport_offsets, ctx.config.max_views)?;
            let key = ctx.attachable_framebuffer(target)?;
            ctx.validate_attachment_point(point)?;

            let (Some(texture), Some(state)) = (texture, state) else {
                ctx.framebuffers[key].detach(point);
                mvgl_debug!(SOURCE, "Detached {:?}", point);
                return Ok(());
            };
            ctx.attachable_texture(texture, &[TextureTarget::Texture2D])?;
            let level = ctx.validate_level(TextureTarget::Texture2D, level)?;

            mvgl_debug!(SOURCE, "Attached side-by-side texture to {:?}: {} views at {:?}",
                point, state.num_views(), state.viewport_offsets());
            ctx.framebuffers[key].attach(point, FramebufferAttachment::multiview(texture, level, state));
            Ok(())
        })
    }

    /// Attach `num_views` consecutive layers of a 2D-array texture starting at
    /// `base_view_index`
    ///
    /// `num_views == 0` or `None` detaches the attachment point.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` if `GL_ANGLE_multiview` is not enabled (checked first)
    /// - `InvalidValue` for a negative base index / view count, or when
    ///   `base_view_index + num_views` exceeds the layer count
    /// - `InvalidOperation` for the default framebuffer or a non-array texture
    pub fn framebuffer_texture_multiview_layered(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        texture: Option<TextureKey>,
        level: i32,
        base_view_index: i32,
        num_views: i32,
    ) -> Result<()> {
        self.run(|ctx| {
            ctx.require_extension(Extension::Multiview, "framebuffer_texture_multiview_layered")?;
            let state = MultiviewState::layered(base_view_index, num_views, ctx.config.max_views)?;
            let key = ctx.attachable_framebuffer(target)?;
            ctx.validate_attachment_point(point)?;

            let (Some(texture), Some(state)) = (texture, state) else {
                ctx.framebuffers[key].detach(point);
                mvgl_debug!(SOURCE, "Detached {:?}", point);
                return Ok(());
            };
            ctx.attachable_texture(texture, &[TextureTarget::Texture2DArray])?;
            let level = ctx.validate_level(TextureTarget::Texture2DArray, level)?;

            let end = state.base_view_index() as u64 + state.num_views() as u64;
            if end > ctx.config.max_array_texture_layers as u64 {
                mvgl_bail!(SOURCE, InvalidValue,
                    "base_view_index + num_views ({}) exceeds MAX_ARRAY_TEXTURE_LAYERS ({})",
                    end, ctx.config.max_array_texture_layers);
            }
            if let Some(image) = ctx.textures[texture].image(level) {
                if end > image.layer_count() as u64 {
                    mvgl_bail!(SOURCE, InvalidValue,
                        "base_view_index + num_views ({}) exceeds the texture's {} layers",
                        end, image.layer_count());
                }
            }

            mvgl_debug!(SOURCE, "Attached layered texture to {:?}: layers {}..{}",
                point, state.base_view_index(), end);
            ctx.framebuffers[key].attach(point, FramebufferAttachment::multiview(texture, level, state));
            Ok(())
        })
    }

    // ===== QUERIES =====

    /// Query a parameter of the attachment at `point`
    ///
    /// # Errors
    ///
    /// - `InvalidEnum` for a multiview token while `GL_ANGLE_multiview` is
    ///   disabled, before any other check
    /// - `InvalidOperation` for an attachment point outside the limits, a
    ///   texture parameter of an empty attachment, or a texture parameter of
    ///   the default framebuffer
    pub fn get_framebuffer_attachment_parameter(
        &mut self,
        target: FramebufferTarget,
        point: AttachmentPoint,
        pname: AttachmentParameter,
    ) -> Result<ParameterValue> {
        self.run(|ctx| {
            ctx.require_token(pname)?;
            ctx.validate_attachment_point(point)?;
            let framebuffer = ctx.bound_framebuffer(target);

            if framebuffer.is_default() {
                if !matches!(point, AttachmentPoint::Color(0)) && point.is_color() {
                    mvgl_bail!(SOURCE, InvalidOperation,
                        "The default framebuffer has no {:?} attachment", point);
                }
                return match pname {
                    AttachmentParameter::ObjectType => {
                        Ok(ParameterValue::ObjectType(ObjectType::FramebufferDefault))
                    }
                    AttachmentParameter::ObjectName => Ok(ParameterValue::Texture(None)),
                    _ => Err(mvgl_err!(SOURCE, InvalidOperation,
                        "{:?} cannot be queried on the default framebuffer", pname)),
                };
            }

            let attachment = match point {
                AttachmentPoint::DepthStencil => {
                    let depth = framebuffer.attachment(AttachmentPoint::Depth);
                    let stencil = framebuffer.attachment(AttachmentPoint::Stencil);
                    if depth != stencil {
                        mvgl_bail!(SOURCE, InvalidOperation,
                            "Depth and stencil attachments differ, DepthStencil is ambiguous");
                    }
                    depth
                }
                _ => framebuffer.attachment(point),
            };

            let Some(attachment) = attachment else {
                return match pname {
                    AttachmentParameter::ObjectType => Ok(ParameterValue::ObjectType(ObjectType::None)),
                    AttachmentParameter::ObjectName => Ok(ParameterValue::Texture(None)),
                    _ => Err(mvgl_err!(SOURCE, InvalidOperation,
                        "{:?} queried on empty attachment {:?}", pname, point)),
                };
            };

            let multiview = &attachment.multiview;
            Ok(match pname {
                AttachmentParameter::ObjectType => ParameterValue::ObjectType(ObjectType::Texture),
                AttachmentParameter::ObjectName => ParameterValue::Texture(Some(attachment.texture)),
                AttachmentParameter::TextureLevel => ParameterValue::Int(attachment.level as i32),
                AttachmentParameter::TextureLayer => ParameterValue::Int(attachment.layer as i32),
                AttachmentParameter::NumViews => ParameterValue::Int(multiview.num_views() as i32),
                AttachmentParameter::BaseViewIndex => {
                    ParameterValue::Int(multiview.base_view_index() as i32)
                }
                AttachmentParameter::MultiviewLayout => ParameterValue::Layout(multiview.layout()),
                AttachmentParameter::ViewportOffsets => {
                    ParameterValue::Ints(multiview.flattened_viewport_offsets())
                }
            })
        })
    }

    /// Completeness status of the framebuffer bound to `target`
    pub fn check_framebuffer_status(&self, target: FramebufferTarget) -> FramebufferStatus {
        self.status_of(self.bound_framebuffer(target))
    }

    pub(super) fn status_of(&self, framebuffer: &Framebuffer) -> FramebufferStatus {
        check_status(framebuffer, &self.textures)
    }

    // ===== RENDER STATE =====

    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.run(|ctx| {
            if width < 0 || height < 0 {
                mvgl_bail!(SOURCE, InvalidValue, "Negative viewport size {}x{}", width, height);
            }
            ctx.state.viewport = Rect::new(x, y, width, height);
            Ok(())
        })
    }

    pub fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.run(|ctx| {
            if width < 0 || height < 0 {
                mvgl_bail!(SOURCE, InvalidValue, "Negative scissor size {}x{}", width, height);
            }
            ctx.state.scissor = Rect::new(x, y, width, height);
            Ok(())
        })
    }

    pub fn enable(&mut self, capability: Capability) {
        match capability {
            Capability::ScissorTest => self.state.scissor_test = true,
        }
    }

    pub fn disable(&mut self, capability: Capability) {
        match capability {
            Capability::ScissorTest => self.state.scissor_test = false,
        }
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::ScissorTest => self.state.scissor_test,
        }
    }

    pub fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.state.clear_color = Vec4::new(red, green, blue, alpha);
    }

    pub fn clear_depth(&mut self, depth: f32) {
        self.state.clear_depth = depth.clamp(0.0, 1.0);
    }

    pub fn clear_stencil(&mut self, stencil: i32) {
        self.state.clear_stencil = (stencil & 0xff) as u8;
    }

    pub fn render_state(&self) -> &RenderState {
        &self.state
    }

    /// Per-view viewports of the draw framebuffer
    ///
    /// Side-by-side views get the viewport translated by their offset; every
    /// other layout renders each view through the plain viewport.
    pub fn multiview_viewports(&self) -> Vec<Rect> {
        let viewport = self.state.viewport;
        let Some(source) = self.bound_framebuffer(FramebufferTarget::Draw).view_source() else {
            return vec![viewport];
        };
        match source.multiview {
            MultiviewState::SideBySide { ref viewport_offsets } => viewport_offsets
                .iter()
                .map(|offset| viewport.translated(*offset))
                .collect(),
            _ => vec![viewport; source.multiview.num_views() as usize],
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

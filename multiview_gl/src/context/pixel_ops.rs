/// Pixel paths: clear, read-back, copy-to-texture and blit
///
/// These are the only operations that change texel contents besides uploads.
/// Read-back, copies and blits refuse multiview framebuffers; clear is the
/// multiview-aware one (side-by-side views are scissored at their offsets,
/// layered views clear every layer in the view range).

use glam::Vec2;
use crate::error::{Error, Result};
use crate::framebuffer::{AttachmentPoint, Framebuffer, FramebufferAttachment, MultiviewState};
use crate::texture::{InternalFormat, TextureImage, TextureKey, TextureTarget};
use crate::utils::Rect;
use crate::{mvgl_bail, mvgl_err, mvgl_trace, mvgl_warn};
use super::context::Context;
use super::state::{BlitFilter, BufferMask, FramebufferTarget};

const SOURCE: &str = "mvgl::PixelOps";

/// Value written by a clear
#[derive(Debug, Clone, Copy)]
enum ClearValue {
    Color([u8; 4]),
    Depth(f32),
    Stencil(u8),
}

/// One region of one image layer to clear
#[derive(Debug, Clone, Copy)]
struct ClearWrite {
    texture: TextureKey,
    level: u32,
    layer: u32,
    region: Rect,
    value: ClearValue,
}

/// Destination image of a blit
#[derive(Debug, Clone, Copy)]
struct BlitTarget {
    texture: TextureKey,
    level: u32,
    layer: u32,
    bounds: Rect,
}

/// Maps destination pixel centers back into the source rectangle
///
/// Rectangles are `[x0, y0, x1, y1]`; reversed corners mirror the image.
#[derive(Debug, Clone, Copy)]
struct BlitMapping {
    src: [i32; 4],
    dst: [i32; 4],
}

impl BlitMapping {
    /// Destination rectangle clipped to `bounds`, `None` if nothing is left
    fn dst_region(&self, bounds: &Rect) -> Option<Rect> {
        let [x0, y0, x1, y1] = self.dst;
        let (x, width) = clip_span(x0, x1, bounds.x, bounds.width)?;
        let (y, height) = clip_span(y0, y1, bounds.y, bounds.height)?;
        Some(Rect::new(x, y, width, height))
    }

    fn source_coord(&self, x: i32, y: i32) -> Vec2 {
        let [sx0, sy0, sx1, sy1] = self.src.map(f64::from);
        let [dx0, dy0, dx1, dy1] = self.dst.map(f64::from);
        let tx = (f64::from(x) + 0.5 - dx0) / (dx1 - dx0);
        let ty = (f64::from(y) + 0.5 - dy0) / (dy1 - dy0);
        Vec2::new((sx0 + tx * (sx1 - sx0)) as f32, (sy0 + ty * (sy1 - sy0)) as f32)
    }
}

/// Span between corners `a` and `b` clipped to `start..start + len`,
/// as `(origin, extent)`
fn clip_span(a: i32, b: i32, start: i32, len: i32) -> Option<(i32, i32)> {
    let low = i64::from(a.min(b)).max(i64::from(start));
    let high = i64::from(a.max(b)).min(i64::from(start) + i64::from(len));
    (low < high).then(|| (low as i32, (high - low) as i32))
}

impl Context {
    // ===== CLEAR =====

    /// Clear the buffers in `mask` of the draw framebuffer
    ///
    /// Side-by-side views clear the scissor box translated by each view's
    /// offset, whether or not the scissor test is enabled. Every other layout
    /// clears the scissor box when the test is enabled and the whole image
    /// otherwise, on every layer the attachment covers.
    ///
    /// # Errors
    ///
    /// `InvalidFramebufferOperation` if the draw framebuffer is incomplete.
    pub fn clear(&mut self, mask: BufferMask) -> Result<()> {
        self.run(|ctx| {
            let framebuffer = ctx.validate_complete_draw_framebuffer("clear")?;
            let writes = ctx.clear_writes(framebuffer, mask);
            mvgl_trace!(SOURCE, "clear {:?}: {} region(s)", mask, writes.len());

            for write in writes {
                let Some(image) = ctx.textures
                    .get_mut(write.texture)
                    .and_then(|texture| texture.image_mut(write.level))
                else {
                    continue;
                };
                match write.value {
                    ClearValue::Color(color) => image.fill_color(write.region, write.layer, color),
                    ClearValue::Depth(depth) => image.fill_depth(write.region, write.layer, depth),
                    ClearValue::Stencil(stencil) => {
                        image.fill_stencil(write.region, write.layer, stencil)
                    }
                }
            }
            Ok(())
        })
    }

    fn clear_writes(&self, framebuffer: &Framebuffer, mask: BufferMask) -> Vec<ClearWrite> {
        let mut writes = Vec::new();
        for (point, attachment) in framebuffer.attachments() {
            let value = match point {
                AttachmentPoint::Color(_) if mask.contains(BufferMask::COLOR) => {
                    ClearValue::Color(self.state.clear_color_rgba8())
                }
                AttachmentPoint::Depth if mask.contains(BufferMask::DEPTH) => {
                    ClearValue::Depth(self.state.clear_depth)
                }
                AttachmentPoint::Stencil if mask.contains(BufferMask::STENCIL) => {
                    ClearValue::Stencil(self.state.clear_stencil)
                }
                _ => continue,
            };
            let Some(image) = self.attachment_image(attachment) else {
                continue;
            };

            let mut write = |layer: u32, region: Rect| writes.push(ClearWrite {
                texture: attachment.texture,
                level: attachment.level,
                layer,
                region,
                value,
            });
            match &attachment.multiview {
                MultiviewState::SideBySide { viewport_offsets } => {
                    for offset in viewport_offsets {
                        write(attachment.layer, self.state.scissor.translated(*offset));
                    }
                }
                _ => {
                    let region = if self.state.scissor_test {
                        self.state.scissor
                    } else {
                        image.bounds()
                    };
                    for layer in attachment.layers() {
                        write(layer, region);
                    }
                }
            }
        }
        writes
    }

    // ===== READ-BACK =====

    /// Read an RGBA8 rectangle from the read framebuffer's first color buffer
    ///
    /// Rows are returned bottom-up, 4 bytes per pixel. Pixels outside the
    /// image read as zero.
    ///
    /// # Errors
    ///
    /// - `InvalidValue` for a negative size
    /// - `InvalidFramebufferOperation` if the read framebuffer is incomplete or multiview
    /// - `InvalidOperation` if it has no color buffer
    pub fn read_pixels(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<Vec<u8>> {
        self.run(|ctx| {
            if width < 0 || height < 0 {
                mvgl_bail!(SOURCE, InvalidValue, "read_pixels: negative size {}x{}", width, height);
            }
            let framebuffer = ctx.validate_read_framebuffer("read_pixels")?;
            let (image, layer) = ctx.read_color_image(framebuffer, "read_pixels")?;
            let pixels = read_region(image, layer, Rect::new(x, y, width, height))?;
            Ok(bytemuck::cast_slice(&pixels).to_vec())
        })
    }

    // ===== COPY TO TEXTURE =====

    /// Define level `level` of the bound 2D texture from the read framebuffer
    ///
    /// # Errors
    ///
    /// - `InvalidEnum` for a non-2D target
    /// - `InvalidValue` for a bad level or size
    /// - `InvalidFramebufferOperation` if the read framebuffer is incomplete or multiview
    /// - `InvalidOperation` if no texture is bound or `format` is not a color format
    #[allow(clippy::too_many_arguments)]
    pub fn copy_tex_image_2d(
        &mut self,
        target: TextureTarget,
        level: i32,
        format: InternalFormat,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        self.run(|ctx| {
            if target != TextureTarget::Texture2D {
                mvgl_bail!(SOURCE, InvalidEnum, "copy_tex_image_2d: invalid target {:?}", target);
            }
            let level = ctx.validate_level(target, level)?;
            let max_extent = ctx.config.max_texture_size >> level;
            if width < 0 || height < 0 || width as u32 > max_extent || height as u32 > max_extent {
                mvgl_bail!(SOURCE, InvalidValue,
                    "copy_tex_image_2d: size {}x{} outside 0..={}", width, height, max_extent);
            }

            let framebuffer = ctx.validate_read_framebuffer("copy_tex_image_2d")?;
            let (source, layer) = ctx.read_color_image(framebuffer, "copy_tex_image_2d")?;
            if !format.is_color_renderable() {
                mvgl_bail!(SOURCE, InvalidOperation,
                    "copy_tex_image_2d: cannot copy a color buffer into {:?}", format);
            }
            let pixels = read_region(source, layer, Rect::new(x, y, width, height))?;

            let Some(key) = ctx.texture_bindings.get(target) else {
                mvgl_bail!(SOURCE, InvalidOperation, "copy_tex_image_2d: no texture bound");
            };
            let image = TextureImage::with_data(
                format, width as u32, height as u32, 1, bytemuck::cast_slice(&pixels))?;
            ctx.textures[key].set_image(level, image);
            mvgl_trace!(SOURCE, "copy_tex_image_2d: level {} defined as {}x{}", level, width, height);
            Ok(())
        })
    }

    /// Copy a read framebuffer rectangle into an existing 2D texture level
    #[allow(clippy::too_many_arguments)]
    pub fn copy_tex_sub_image_2d(
        &mut self,
        target: TextureTarget,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        self.run(|ctx| {
            if target != TextureTarget::Texture2D {
                mvgl_bail!(SOURCE, InvalidEnum, "copy_tex_sub_image_2d: invalid target {:?}", target);
            }
            ctx.copy_sub_image(
                "copy_tex_sub_image_2d", target, level, [xoffset, yoffset, 0],
                Rect::new(x, y, width, height),
            )
        })
    }

    /// Copy a read framebuffer rectangle into one layer of a 2D-array or 3D texture level
    #[allow(clippy::too_many_arguments)]
    pub fn copy_tex_sub_image_3d(
        &mut self,
        target: TextureTarget,
        level: i32,
        xoffset: i32,
        yoffset: i32,
        zoffset: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        self.run(|ctx| {
            if !target.is_3d() {
                mvgl_bail!(SOURCE, InvalidEnum, "copy_tex_sub_image_3d: invalid target {:?}", target);
            }
            ctx.copy_sub_image(
                "copy_tex_sub_image_3d", target, level, [xoffset, yoffset, zoffset],
                Rect::new(x, y, width, height),
            )
        })
    }

    fn copy_sub_image(
        &mut self,
        operation: &str,
        target: TextureTarget,
        level: i32,
        offset: [i32; 3],
        source_rect: Rect,
    ) -> Result<()> {
        let level = self.validate_level(target, level)?;
        let [xoffset, yoffset, zoffset] = offset;
        if source_rect.width < 0 || source_rect.height < 0 {
            mvgl_bail!(SOURCE, InvalidValue, "{}: negative size {}x{}",
                operation, source_rect.width, source_rect.height);
        }

        let framebuffer = self.validate_read_framebuffer(operation)?;
        let (source, layer) = self.read_color_image(framebuffer, operation)?;

        let Some(key) = self.texture_bindings.get(target) else {
            mvgl_bail!(SOURCE, InvalidOperation, "{}: no texture bound to {:?}", operation, target);
        };
        let Some(destination) = self.textures[key].image(level) else {
            mvgl_bail!(SOURCE, InvalidOperation, "{}: level {} is not defined", operation, level);
        };
        if !destination.format.is_color_renderable() {
            mvgl_bail!(SOURCE, InvalidOperation,
                "{}: cannot copy a color buffer into {:?}", operation, destination.format);
        }
        let region = Rect::new(xoffset, yoffset, source_rect.width, source_rect.height);
        let fits = xoffset >= 0 && yoffset >= 0 && zoffset >= 0
            && i64::from(xoffset) + i64::from(region.width) <= i64::from(destination.width)
            && i64::from(yoffset) + i64::from(region.height) <= i64::from(destination.height)
            && (zoffset as u32) < destination.depth;
        if !fits {
            mvgl_bail!(SOURCE, InvalidValue,
                "{}: region {:?} (layer {}) outside the {}x{}x{} image",
                operation, region, zoffset, destination.width, destination.height, destination.depth);
        }

        let pixels = read_region(source, layer, source_rect)?;
        let Some(destination) = self.textures[key].image_mut(level) else {
            mvgl_bail!(SOURCE, InvalidOperation, "{}: level {} is not defined", operation, level);
        };
        for ((x, y), color) in region.pixels().zip(pixels) {
            destination.set_color(x, y, zoffset as u32, color);
        }
        mvgl_trace!(SOURCE, "{}: copied {:?} into level {} layer {}", operation, region, level, zoffset);
        Ok(())
    }

    // ===== BLIT =====

    /// Copy a rectangle from the read framebuffer to the draw framebuffer,
    /// scaling (and mirroring, for reversed corners) as needed
    ///
    /// Color goes from the first read color buffer to every draw color
    /// buffer. Destination pixels whose source falls outside the source image
    /// are left unchanged; the scissor test clips the destination.
    ///
    /// # Errors
    ///
    /// - `InvalidOperation` for `Linear` with depth or stencil, identical read
    ///   and draw framebuffers, or mismatched depth/stencil formats
    /// - `InvalidFramebufferOperation` if either framebuffer is incomplete or multiview
    pub fn blit_framebuffer(
        &mut self,
        src: [i32; 4],
        dst: [i32; 4],
        mask: BufferMask,
        filter: BlitFilter,
    ) -> Result<()> {
        self.run(|ctx| {
            if filter == BlitFilter::Linear && mask.intersects(BufferMask::DEPTH | BufferMask::STENCIL) {
                mvgl_bail!(SOURCE, InvalidOperation,
                    "blit_framebuffer: linear filtering only applies to color");
            }
            let read = ctx.validate_read_framebuffer("blit_framebuffer")?;
            let draw = ctx.validate_draw_framebuffer("blit_framebuffer")?;
            if ctx.framebuffer_binding(FramebufferTarget::Read)
                == ctx.framebuffer_binding(FramebufferTarget::Draw)
            {
                mvgl_bail!(SOURCE, InvalidOperation,
                    "blit_framebuffer: read and draw framebuffers are the same");
            }

            let mapping = BlitMapping { src, dst };
            let mut jobs: Vec<(BufferMask, TextureImage, u32, Vec<BlitTarget>)> = Vec::new();

            if mask.contains(BufferMask::COLOR) {
                if let Some(source) = read.attachment(AttachmentPoint::Color(0)) {
                    let targets = draw.color_attachments()
                        .into_iter()
                        .filter_map(|(_, attachment)| ctx.blit_target(attachment))
                        .collect();
                    if let Some(image) = ctx.attachment_image(source) {
                        jobs.push((BufferMask::COLOR, image.clone(), source.layer, targets));
                    }
                }
            }
            for (flag, point) in [
                (BufferMask::DEPTH, AttachmentPoint::Depth),
                (BufferMask::STENCIL, AttachmentPoint::Stencil),
            ] {
                if !mask.contains(flag) {
                    continue;
                }
                let (Some(source), Some(destination)) = (read.attachment(point), draw.attachment(point))
                else {
                    continue;
                };
                let (Some(source_image), Some(target)) =
                    (ctx.attachment_image(source), ctx.blit_target(destination))
                else {
                    continue;
                };
                let destination_format = ctx.attachment_image(destination).map(|image| image.format);
                if destination_format != Some(source_image.format) {
                    mvgl_bail!(SOURCE, InvalidOperation,
                        "blit_framebuffer: {:?} formats differ ({:?} vs {:?})",
                        point, source_image.format, destination_format);
                }
                jobs.push((flag, source_image.clone(), source.layer, vec![target]));
            }

            let scissor = ctx.state.scissor_test.then_some(ctx.state.scissor);
            for (flag, source, source_layer, targets) in jobs {
                for target in targets {
                    let clipped = mapping.dst_region(&target.bounds)
                        .and_then(|region| match scissor {
                            Some(scissor) => region.intersect(&scissor),
                            None => Some(region),
                        });
                    let Some(region) = clipped else {
                        continue;
                    };
                    let Some(destination) = ctx.textures
                        .get_mut(target.texture)
                        .and_then(|texture| texture.image_mut(target.level))
                    else {
                        continue;
                    };
                    blit_region(&source, source_layer, destination, target.layer, region, &mapping, flag, filter);
                }
            }
            mvgl_trace!(SOURCE, "blit_framebuffer {:?} -> {:?} ({:?}, {:?})", src, dst, mask, filter);
            Ok(())
        })
    }

    // ===== HELPERS =====

    fn attachment_image(&self, attachment: &FramebufferAttachment) -> Option<&TextureImage> {
        self.textures.get(attachment.texture)?.image(attachment.level)
    }

    fn blit_target(&self, attachment: &FramebufferAttachment) -> Option<BlitTarget> {
        let image = self.attachment_image(attachment)?;
        Some(BlitTarget {
            texture: attachment.texture,
            level: attachment.level,
            layer: attachment.layer,
            bounds: image.bounds(),
        })
    }

    /// Image and layer behind the read framebuffer's first color buffer
    fn read_color_image<'a>(
        &'a self,
        framebuffer: &'a Framebuffer,
        operation: &str,
    ) -> Result<(&'a TextureImage, u32)> {
        let attachment = framebuffer
            .attachment(AttachmentPoint::Color(0))
            .ok_or_else(|| mvgl_err!(SOURCE, InvalidOperation,
                "{}: read framebuffer has no color buffer", operation))?;
        let image = self.attachment_image(attachment).ok_or_else(|| mvgl_err!(SOURCE,
            InvalidOperation, "{}: read color buffer has no image", operation))?;
        Ok((image, attachment.layer))
    }
}

/// Colors of `rect` in row-major order, zero outside the image
///
/// # Errors
///
/// `OutOfMemory` if the result cannot be allocated.
fn read_region(image: &TextureImage, layer: u32, rect: Rect) -> Result<Vec<[u8; 4]>> {
    let (width, height) = (rect.width.max(0), rect.height.max(0));
    let count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(Error::OutOfMemory)?;
    let mut pixels = Vec::new();
    if pixels.try_reserve_exact(count).is_err() {
        mvgl_warn!(SOURCE, "Cannot allocate a {}x{} pixel region", width, height);
        return Err(Error::OutOfMemory);
    }
    for dy in 0..height {
        for dx in 0..width {
            let color = match (rect.x.checked_add(dx), rect.y.checked_add(dy)) {
                (Some(x), Some(y)) => image.color(x, y, layer),
                _ => None,
            };
            pixels.push(color.unwrap_or([0; 4]));
        }
    }
    Ok(pixels)
}

#[allow(clippy::too_many_arguments)]
fn blit_region(
    source: &TextureImage,
    source_layer: u32,
    destination: &mut TextureImage,
    destination_layer: u32,
    region: Rect,
    mapping: &BlitMapping,
    buffer: BufferMask,
    filter: BlitFilter,
) {
    for (x, y) in region.pixels() {
        let coord = mapping.source_coord(x, y);
        let (sx, sy) = (coord.x.floor() as i32, coord.y.floor() as i32);
        if !source.bounds().contains(sx, sy) {
            continue;
        }
        if buffer == BufferMask::COLOR {
            let color = match filter {
                BlitFilter::Nearest => source.color(sx, sy, source_layer),
                BlitFilter::Linear => Some(sample_bilinear(source, source_layer, coord)),
            };
            if let Some(color) = color {
                destination.set_color(x, y, destination_layer, color);
            }
        } else if buffer == BufferMask::DEPTH {
            if let Some(depth) = source.depth_value(sx, sy, source_layer) {
                destination.set_depth_value(x, y, destination_layer, depth);
            }
        } else if let Some(stencil) = source.stencil_value(sx, sy, source_layer) {
            destination.set_stencil_value(x, y, destination_layer, stencil);
        }
    }
}

/// Bilinear color lookup at `coord`, clamped to the image edges
fn sample_bilinear(image: &TextureImage, layer: u32, coord: Vec2) -> [u8; 4] {
    let position = coord - Vec2::splat(0.5);
    let (x0, y0) = (position.x.floor() as i32, position.y.floor() as i32);
    let (fx, fy) = (position.x - x0 as f32, position.y - y0 as f32);
    let max_x = image.width as i32 - 1;
    let max_y = image.height as i32 - 1;
    let texel = |x: i32, y: i32| -> [f32; 4] {
        let color = image
            .color(x.clamp(0, max_x), y.clamp(0, max_y), layer)
            .unwrap_or([0; 4]);
        color.map(f32::from)
    };

    let (c00, c10) = (texel(x0, y0), texel(x0 + 1, y0));
    let (c01, c11) = (texel(x0, y0 + 1), texel(x0 + 1, y0 + 1));
    let mut result = [0u8; 4];
    for channel in 0..4 {
        let bottom = c00[channel] + (c10[channel] - c00[channel]) * fx;
        let top = c01[channel] + (c11[channel] - c01[channel]) * fx;
        result[channel] = (bottom + (top - bottom) * fy).round().clamp(0.0, 255.0) as u8;
    }
    result
}

#[cfg(test)]
#[path = "pixel_ops_tests.rs"]
mod tests;

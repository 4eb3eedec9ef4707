/// Texture objects and their per-level images
///
/// A texture's target is fixed the first time it is bound. Each mip level
/// holds an optional `TextureImage` with software texel storage; the image's
/// `depth` is the array-layer count for 2D-array textures and the slice count
/// for 3D textures.

use slotmap::new_key_type;
use crate::error::{Error, Result};
use crate::{mvgl_bail, mvgl_err, mvgl_warn};
use crate::utils::Rect;
use super::format::{InternalFormat, TextureTarget};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Handle of a texture object owned by a `Context`
    pub struct TextureKey;
}

// ===== TEXELS =====

/// Texel storage, laid out layer by layer, rows bottom-up
#[derive(Debug, Clone, PartialEq)]
pub enum Texels {
    Color(Vec<[u8; 4]>),
    Depth(Vec<f32>),
    DepthStencil { depth: Vec<f32>, stencil: Vec<u8> },
}

impl Texels {
    fn zeroed(format: InternalFormat, count: usize) -> Result<Self> {
        Ok(match format {
            InternalFormat::Rgba8 => Texels::Color(filled_vec([0; 4], count)?),
            InternalFormat::Depth24Stencil8 => Texels::DepthStencil {
                depth: filled_vec(0.0, count)?,
                stencil: filled_vec(0, count)?,
            },
            InternalFormat::DepthComponent16
            | InternalFormat::DepthComponent24
            | InternalFormat::DepthComponent32F => Texels::Depth(filled_vec(0.0, count)?),
        })
    }
}

/// `count` copies of `value`, `OutOfMemory` if the allocation fails
fn filled_vec<T: Clone>(value: T, count: usize) -> Result<Vec<T>> {
    let mut texels = Vec::new();
    if texels.try_reserve_exact(count).is_err() {
        mvgl_warn!("mvgl::Texture", "Texel allocation of {} elements failed", count);
        return Err(Error::OutOfMemory);
    }
    texels.resize(count, value);
    Ok(texels)
}

// ===== TEXTURE IMAGE =====

/// One mip level of a texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub format: InternalFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    texels: Texels,
}

impl TextureImage {
    /// Allocate a zero-filled image
    ///
    /// # Errors
    ///
    /// `OutOfMemory` if the texel count overflows or the storage cannot be
    /// allocated.
    pub fn new(format: InternalFormat, width: u32, height: u32, depth: u32) -> Result<Self> {
        let count = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(depth as usize))
            .ok_or(Error::OutOfMemory)?;
        Ok(Self {
            format,
            width,
            height,
            depth,
            texels: Texels::zeroed(format, count)?,
        })
    }

    /// Allocate an image and fill it from upload bytes
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `data` is shorter than the image.
    pub fn with_data(
        format: InternalFormat,
        width: u32,
        height: u32,
        depth: u32,
        data: &[u8],
    ) -> Result<Self> {
        let mut image = Self::new(format, width, height, depth)?;
        let needed = image.texel_count() * format.upload_bytes_per_texel();
        if data.len() < needed {
            mvgl_bail!("mvgl::Texture", InvalidOperation,
                "Upload data too small: {} bytes provided, {} required", data.len(), needed);
        }
        let texel_bytes = data[..needed].chunks_exact(4);
        match &mut image.texels {
            Texels::Color(pixels) => {
                for (texel, bytes) in pixels.iter_mut().zip(texel_bytes) {
                    texel.copy_from_slice(bytes);
                }
            }
            Texels::Depth(depth) | Texels::DepthStencil { depth, .. } => {
                for (texel, bytes) in depth.iter_mut().zip(texel_bytes) {
                    *texel = bytemuck::pod_read_unaligned::<f32>(bytes).clamp(0.0, 1.0);
                }
            }
        }
        Ok(image)
    }

    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Number of array layers (or 3D slices)
    pub fn layer_count(&self) -> u32 {
        self.depth
    }

    /// Full extent of one layer
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    pub fn texels(&self) -> &Texels {
        &self.texels
    }

    fn index(&self, x: i32, y: i32, layer: u32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height || layer >= self.depth {
            return None;
        }
        Some((layer as usize * self.height as usize + y as usize) * self.width as usize + x as usize)
    }

    // ===== TEXEL ACCESS =====

    pub fn color(&self, x: i32, y: i32, layer: u32) -> Option<[u8; 4]> {
        let index = self.index(x, y, layer)?;
        match &self.texels {
            Texels::Color(pixels) => Some(pixels[index]),
            _ => None,
        }
    }

    pub fn set_color(&mut self, x: i32, y: i32, layer: u32, color: [u8; 4]) {
        if let Some(index) = self.index(x, y, layer) {
            if let Texels::Color(pixels) = &mut self.texels {
                pixels[index] = color;
            }
        }
    }

    pub fn depth_value(&self, x: i32, y: i32, layer: u32) -> Option<f32> {
        let index = self.index(x, y, layer)?;
        match &self.texels {
            Texels::Depth(depth) | Texels::DepthStencil { depth, .. } => Some(depth[index]),
            Texels::Color(_) => None,
        }
    }

    pub fn set_depth_value(&mut self, x: i32, y: i32, layer: u32, value: f32) {
        if let Some(index) = self.index(x, y, layer) {
            if let Texels::Depth(depth) | Texels::DepthStencil { depth, .. } = &mut self.texels {
                depth[index] = value;
            }
        }
    }

    pub fn stencil_value(&self, x: i32, y: i32, layer: u32) -> Option<u8> {
        let index = self.index(x, y, layer)?;
        match &self.texels {
            Texels::DepthStencil { stencil, .. } => Some(stencil[index]),
            _ => None,
        }
    }

    pub fn set_stencil_value(&mut self, x: i32, y: i32, layer: u32, value: u8) {
        if let Some(index) = self.index(x, y, layer) {
            if let Texels::DepthStencil { stencil, .. } = &mut self.texels {
                stencil[index] = value;
            }
        }
    }

    // ===== REGION FILLS =====

    /// Fill the part of `rect` inside the image with `color`
    pub fn fill_color(&mut self, rect: Rect, layer: u32, color: [u8; 4]) {
        if let Some(region) = rect.intersect(&self.bounds()) {
            for (x, y) in region.pixels() {
                self.set_color(x, y, layer, color);
            }
        }
    }

    pub fn fill_depth(&mut self, rect: Rect, layer: u32, value: f32) {
        if let Some(region) = rect.intersect(&self.bounds()) {
            for (x, y) in region.pixels() {
                self.set_depth_value(x, y, layer, value);
            }
        }
    }

    pub fn fill_stencil(&mut self, rect: Rect, layer: u32, value: u8) {
        if let Some(region) = rect.intersect(&self.bounds()) {
            for (x, y) in region.pixels() {
                self.set_stencil_value(x, y, layer, value);
            }
        }
    }
}

// ===== TEXTURE =====

/// Texture object
#[derive(Debug, Clone, Default)]
pub struct Texture {
    target: Option<TextureTarget>,
    levels: Vec<Option<TextureImage>>,
}

impl Texture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target fixed at first bind, `None` while never bound
    pub fn target(&self) -> Option<TextureTarget> {
        self.target
    }

    /// Fix the target on first bind
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when rebinding to a different target.
    pub fn bind_target(&mut self, target: TextureTarget) -> Result<()> {
        match self.target {
            None => {
                self.target = Some(target);
                Ok(())
            }
            Some(current) if current == target => Ok(()),
            Some(current) => Err(mvgl_err!("mvgl::Texture", InvalidOperation,
                "Texture already bound as {:?}, cannot bind as {:?}", current, target)),
        }
    }

    /// Define (or redefine) one mip level
    pub fn set_image(&mut self, level: u32, image: TextureImage) {
        let level = level as usize;
        if self.levels.len() <= level {
            self.levels.resize(level + 1, None);
        }
        self.levels[level] = Some(image);
    }

    pub fn image(&self, level: u32) -> Option<&TextureImage> {
        self.levels.get(level as usize).and_then(|image| image.as_ref())
    }

    pub fn image_mut(&mut self, level: u32) -> Option<&mut TextureImage> {
        self.levels.get_mut(level as usize).and_then(|image| image.as_mut())
    }

    /// Array-layer count of a level, 0 when the level is undefined
    pub fn layer_count(&self, level: u32) -> u32 {
        self.image(level).map_or(0, |image| image.layer_count())
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;

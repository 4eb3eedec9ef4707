/// Internal formats and texture targets

/// Sized internal format of a texture image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InternalFormat {
    Rgba8,
    DepthComponent16,
    DepthComponent24,
    DepthComponent32F,
    Depth24Stencil8,
}

impl InternalFormat {
    /// Can be attached to a color attachment point
    pub fn is_color_renderable(&self) -> bool {
        matches!(self, InternalFormat::Rgba8)
    }

    /// Can be attached to the depth attachment point
    pub fn is_depth_renderable(&self) -> bool {
        matches!(
            self,
            InternalFormat::DepthComponent16
                | InternalFormat::DepthComponent24
                | InternalFormat::DepthComponent32F
                | InternalFormat::Depth24Stencil8
        )
    }

    /// Can be attached to the stencil attachment point
    pub fn is_stencil_renderable(&self) -> bool {
        matches!(self, InternalFormat::Depth24Stencil8)
    }

    /// Bytes per texel in upload data
    ///
    /// Color formats upload RGBA8; depth formats upload one `f32` depth value
    /// per texel (stencil starts at zero).
    pub fn upload_bytes_per_texel(&self) -> usize {
        4
    }
}

/// Texture binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
    Texture2DArray,
    Texture3D,
}

impl TextureTarget {
    /// Targets whose images have a depth / layer dimension
    pub fn is_3d(&self) -> bool {
        matches!(self, TextureTarget::Texture2DArray | TextureTarget::Texture3D)
    }
}

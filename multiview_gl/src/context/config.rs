/// Context configuration: window surface, extension policy and limits

use crate::extension::Extension;

/// Configuration used to create a `Context`
///
/// # Example
///
/// ```
/// use multiview_gl::mvgl::ContextConfig;
///
/// let config = ContextConfig {
///     webgl_compatibility: true,
///     ..ContextConfig::default()
/// };
/// assert_eq!(config.max_views, 4);
/// ```
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Width of the window-system framebuffer
    pub window_width: u32,
    /// Height of the window-system framebuffer
    pub window_height: u32,
    /// Extensions start disabled and must be requested
    pub webgl_compatibility: bool,
    /// Extensions this context can expose
    pub supported_extensions: Vec<Extension>,
    pub max_color_attachments: u32,
    /// MAX_VIEWS_ANGLE
    pub max_views: u32,
    pub max_array_texture_layers: u32,
    pub max_texture_size: u32,
    pub max_3d_texture_size: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window_width: 128,
            window_height: 128,
            webgl_compatibility: false,
            supported_extensions: Extension::ALL.to_vec(),
            max_color_attachments: 8,
            max_views: 4,
            max_array_texture_layers: 256,
            max_texture_size: 4096,
            max_3d_texture_size: 256,
        }
    }
}

impl ContextConfig {
    /// Number of mip levels allowed for 2D / 2D-array textures
    pub fn max_texture_levels(&self) -> u32 {
        32 - self.max_texture_size.max(1).leading_zeros()
    }

    /// Number of mip levels allowed for 3D textures
    pub fn max_3d_texture_levels(&self) -> u32 {
        32 - self.max_3d_texture_size.max(1).leading_zeros()
    }
}

/// Framebuffer attachment query tokens and values

use crate::extension::Extension;
use crate::framebuffer::ViewLayout;
use crate::texture::TextureKey;

/// Token accepted by `get_framebuffer_attachment_parameter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentParameter {
    ObjectType,
    ObjectName,
    TextureLevel,
    TextureLayer,
    /// `FRAMEBUFFER_ATTACHMENT_TEXTURE_NUM_VIEWS_ANGLE`
    NumViews,
    /// `FRAMEBUFFER_ATTACHMENT_TEXTURE_BASE_VIEW_INDEX_ANGLE`
    BaseViewIndex,
    /// `FRAMEBUFFER_ATTACHMENT_TEXTURE_MULTIVIEW_LAYOUT_ANGLE`
    MultiviewLayout,
    /// `FRAMEBUFFER_ATTACHMENT_TEXTURE_VIEWPORT_OFFSETS_ANGLE`
    ViewportOffsets,
}

impl AttachmentParameter {
    /// Extension that introduces this token, if any
    pub fn required_extension(&self) -> Option<Extension> {
        match self {
            AttachmentParameter::NumViews
            | AttachmentParameter::BaseViewIndex
            | AttachmentParameter::MultiviewLayout
            | AttachmentParameter::ViewportOffsets => Some(Extension::Multiview),
            _ => None,
        }
    }
}

/// Kind of object bound to an attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    None,
    Texture,
    /// Window-system image of the default framebuffer
    FramebufferDefault,
}

/// Value returned by an attachment query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    Int(i32),
    ObjectType(ObjectType),
    Layout(ViewLayout),
    Ints(Vec<i32>),
    /// Texture name, `None` for an empty attachment or a window-system image
    Texture(Option<TextureKey>),
}

impl ParameterValue {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ParameterValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_ints(&self) -> Option<&[i32]> {
        match self {
            ParameterValue::Ints(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<TextureKey> {
        match self {
            ParameterValue::Texture(texture) => *texture,
            _ => None,
        }
    }

    pub fn as_layout(&self) -> Option<ViewLayout> {
        match self {
            ParameterValue::Layout(layout) => Some(*layout),
            _ => None,
        }
    }
}

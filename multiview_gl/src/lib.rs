/*!
# Multiview GL

A software GL-style context implementing the `GL_ANGLE_multiview` framebuffer
extension: multiview attachment state, its validation rules and the
completeness and pixel-path consequences.

## Architecture

- **Driver**: process-wide registry of named contexts and the global logger
- **Context**: command processor owning textures, framebuffers, bindings and
  the sticky error state
- **Framebuffer**: attachment points, per-attachment multiview state and
  completeness
- **Texture**: texture objects with software texel storage
- **Extension**: capability tokens gating entry points and query tokens

There is no rasterizer; pixels change only through uploads, clears, copies
and blits.
*/

// Internal modules
mod error;
mod driver;
pub mod log;
pub mod extension;
pub mod utils;
pub mod texture;
pub mod framebuffer;
pub mod context;

// Main mvgl namespace module
pub mod mvgl {
    // Error types
    pub use crate::error::{Error, ErrorCode, Result};

    // Driver singleton
    pub use crate::driver::Driver;

    // Context and its state types
    pub use crate::context::{
        AttachmentParameter, BlitFilter, BufferMask, Capability, Context, ContextConfig,
        FramebufferTarget, ObjectType, ParameterValue, RenderState,
    };

    // Extension gate
    pub use crate::extension::{Extension, ExtensionSet};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Framebuffer sub-module
    pub mod framebuffer {
        pub use crate::framebuffer::*;
    }

    // Texture sub-module
    pub mod texture {
        pub use crate::texture::*;
    }

    pub use crate::utils::Rect;
}

// Re-export math library at crate root
pub use glam;

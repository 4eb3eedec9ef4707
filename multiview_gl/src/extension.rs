/// Extension gate
///
/// Extensions are capability tokens. An entry point or query token belonging
/// to an extension is invisible until that extension is active, and the gate
/// is checked before any other argument validation.

use rustc_hash::FxHashSet;
use crate::error::Result;
use crate::mvgl_bail;

/// Extensions known to the context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// `GL_ANGLE_multiview`: side-by-side and layered multiview attachments
    Multiview,
}

impl Extension {
    /// Every extension this crate implements
    pub const ALL: [Extension; 1] = [Extension::Multiview];

    /// Extension string as exposed to applications
    pub fn name(&self) -> &'static str {
        match self {
            Extension::Multiview => "GL_ANGLE_multiview",
        }
    }

    /// Look up an extension by its extension string
    pub fn from_name(name: &str) -> Option<Extension> {
        Self::ALL.iter().copied().find(|ext| ext.name() == name)
    }
}

/// Supported and active extensions of one context
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    supported: FxHashSet<Extension>,
    enabled: FxHashSet<Extension>,
}

impl ExtensionSet {
    /// Create an extension set
    ///
    /// With `request_required` (WebGL compatibility) supported extensions start
    /// disabled and have to be requested; otherwise they start enabled.
    pub fn new(supported: &[Extension], request_required: bool) -> Self {
        let supported: FxHashSet<Extension> = supported.iter().copied().collect();
        let enabled = if request_required {
            FxHashSet::default()
        } else {
            supported.clone()
        };
        Self { supported, enabled }
    }

    pub fn is_enabled(&self, extension: Extension) -> bool {
        self.enabled.contains(&extension)
    }

    /// Whether `name` can still be turned on with `request`
    pub fn is_requestable(&self, name: &str) -> bool {
        match Extension::from_name(name) {
            Some(ext) => self.supported.contains(&ext) && !self.enabled.contains(&ext),
            None => false,
        }
    }

    /// Activate a supported extension by name
    ///
    /// Requesting an already active extension is a no-op.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if the name is unknown or not supported by this context.
    pub fn request(&mut self, name: &str) -> Result<Extension> {
        let Some(ext) = Extension::from_name(name) else {
            mvgl_bail!("mvgl::Extensions", InvalidOperation,
                "Extension '{}' is not requestable", name);
        };
        if !self.supported.contains(&ext) {
            mvgl_bail!("mvgl::Extensions", InvalidOperation,
                "Extension '{}' is not supported by this context", name);
        }
        self.enabled.insert(ext);
        Ok(ext)
    }

    /// Names of the active extensions, sorted
    pub fn enabled_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.enabled.iter().map(|ext| ext.name()).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;

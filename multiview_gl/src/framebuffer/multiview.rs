/// Multiview state of a framebuffer attachment
///
/// The state is a tagged variant keyed by layout, so the invariants of each
/// layout hold by construction:
/// - `None`: one view, base view index 0, no offsets
/// - `SideBySide`: at least one view, one (x, y) offset per view, base view index 0
/// - `Layered`: `num_views` consecutive layers starting at `base_view_index`

use glam::IVec2;
use crate::error::Result;
use crate::mvgl_bail;

/// How an attachment's image is split into views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewLayout {
    None,
    SideBySide,
    Layered,
}

/// Per-attachment multiview metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MultiviewState {
    /// Plain attachment (default state)
    #[default]
    None,

    /// Views are disjoint regions of one 2D image, placed by per-view offsets
    SideBySide { viewport_offsets: Vec<IVec2> },

    /// Views are consecutive array layers
    Layered { base_view_index: u32, num_views: u32 },
}

impl MultiviewState {
    /// Validate side-by-side arguments
    ///
    /// Returns `Ok(None)` when `num_views` is 0, which detaches the attachment.
    /// Only the first `2 * num_views` offset components are read.
    ///
    /// # Errors
    ///
    /// `InvalidValue` for a negative or too large view count, too few offset
    /// components, or a negative offset component.
    pub fn side_by_side(num_views: i32, offsets: &[i32], max_views: u32) -> Result<Option<Self>> {
        if num_views < 0 {
            mvgl_bail!("mvgl::Multiview", InvalidValue,
                "Number of views must be non-negative, got {}", num_views);
        }
        if num_views as u32 > max_views {
            mvgl_bail!("mvgl::Multiview", InvalidValue,
                "Number of views {} exceeds MAX_VIEWS ({})", num_views, max_views);
        }
        let components = num_views as usize * 2;
        if offsets.len() < components {
            mvgl_bail!("mvgl::Multiview", InvalidValue,
                "{} views need {} viewport offset components, got {}",
                num_views, components, offsets.len());
        }
        if let Some(negative) = offsets[..components].iter().find(|&&c| c < 0) {
            mvgl_bail!("mvgl::Multiview", InvalidValue,
                "Viewport offsets must be non-negative, got {}", negative);
        }
        if num_views == 0 {
            return Ok(None);
        }

        let viewport_offsets = offsets[..components]
            .chunks_exact(2)
            .map(|pair| IVec2::new(pair[0], pair[1]))
            .collect();
        Ok(Some(MultiviewState::SideBySide { viewport_offsets }))
    }

    /// Validate layered arguments
    ///
    /// Returns `Ok(None)` when `num_views` is 0, which detaches the attachment.
    /// Layer bounds against the image are checked by the caller.
    ///
    /// # Errors
    ///
    /// `InvalidValue` for a negative base view index or a negative / too
    /// large view count.
    pub fn layered(base_view_index: i32, num_views: i32, max_views: u32) -> Result<Option<Self>> {
        if base_view_index < 0 {
            mvgl_bail!("mvgl::Multiview", InvalidValue,
                "Base view index must be non-negative, got {}", base_view_index);
        }
        if num_views < 0 {
            mvgl_bail!("mvgl::Multiview", InvalidValue,
                "Number of views must be non-negative, got {}", num_views);
        }
        if num_views as u32 > max_views {
            mvgl_bail!("mvgl::Multiview", InvalidValue,
                "Number of views {} exceeds MAX_VIEWS ({})", num_views, max_views);
        }
        if num_views == 0 {
            return Ok(None);
        }
        Ok(Some(MultiviewState::Layered {
            base_view_index: base_view_index as u32,
            num_views: num_views as u32,
        }))
    }

    pub fn layout(&self) -> ViewLayout {
        match self {
            MultiviewState::None => ViewLayout::None,
            MultiviewState::SideBySide { .. } => ViewLayout::SideBySide,
            MultiviewState::Layered { .. } => ViewLayout::Layered,
        }
    }

    pub fn is_multiview(&self) -> bool {
        self.layout() != ViewLayout::None
    }

    pub fn num_views(&self) -> u32 {
        match self {
            MultiviewState::None => 1,
            MultiviewState::SideBySide { viewport_offsets } => viewport_offsets.len() as u32,
            MultiviewState::Layered { num_views, .. } => *num_views,
        }
    }

    pub fn base_view_index(&self) -> u32 {
        match self {
            MultiviewState::Layered { base_view_index, .. } => *base_view_index,
            _ => 0,
        }
    }

    /// Per-view offsets; empty unless side-by-side
    pub fn viewport_offsets(&self) -> &[IVec2] {
        match self {
            MultiviewState::SideBySide { viewport_offsets } => viewport_offsets,
            _ => &[],
        }
    }

    /// Offsets as reported by the VIEWPORT_OFFSETS query: `2 * num_views`
    /// components, zeros for layouts without offsets
    pub fn flattened_viewport_offsets(&self) -> Vec<i32> {
        match self {
            MultiviewState::SideBySide { viewport_offsets } => {
                viewport_offsets.iter().flat_map(|o| [o.x, o.y]).collect()
            }
            _ => vec![0; self.num_views() as usize * 2],
        }
    }

    /// Whether two attachments describe the same set of views
    ///
    /// Layout and view count must match; side-by-side additionally compares
    /// the exact offsets and layered the base view index.
    pub fn same_views_as(&self, other: &MultiviewState) -> bool {
        match (self, other) {
            (MultiviewState::None, MultiviewState::None) => true,
            (
                MultiviewState::SideBySide { viewport_offsets: a },
                MultiviewState::SideBySide { viewport_offsets: b },
            ) => a == b,
            (
                MultiviewState::Layered { base_view_index: base_a, num_views: num_a },
                MultiviewState::Layered { base_view_index: base_b, num_views: num_b },
            ) => base_a == base_b && num_a == num_b,
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "multiview_tests.rs"]
mod tests;

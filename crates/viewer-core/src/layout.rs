//! Vertical layout of scaled pages.
//!
//! Pages are scaled with a visual transform, which leaves each page's slot in
//! the flow at its unscaled size:
//!
//! ```text
//!          + ┌─────┐
//!          | │┌───┐│
//!   Page 1 | ││ 1 ││
//!          | ├┴───┴┤ +
//!          + ├┬───┬┤ |
//!            ││ 2 ││ | Page 2
//!            │└───┘│ |
//!            └─────┘ +
//! ```
//!
//! Every page therefore gets a top margin that pushes it below the scaled
//! extent of its predecessor, and a trailing spacer reserves the room the
//! last page and the widest page need.

use crate::page::PageStore;
use crate::zoom::ZoomLevel;

/// Vertical spacing between pages, in pixels.
pub const CONTENT_PAGE_SPACING: f32 = 15.0;

/// Container padding plus shadow, added to the horizontal spacer width.
pub const CONTENT_RIGHT_MARGIN: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0, height: 800.0 }
    }
}

/// Empty element after the last page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spacer {
    /// Explicit width when the widest page overflows horizontally.
    pub width: Option<f32>,
    pub margin_top: f32,
}

/// Scale every placed page from `start` onwards and restack it.
///
/// The running margin starts at the base spacing for page 1, or at the cached
/// `next_margin` of the preceding page, and stops at the first page that has
/// not been placed.
pub fn rescale(
    pages: &mut PageStore,
    spacer: &mut Spacer,
    zoom: ZoomLevel,
    viewport: Viewport,
    start: u32,
) {
    let factor = zoom.factor();
    let start = start.max(1);

    let mut margin_top = CONTENT_PAGE_SPACING;
    if start > 1 {
        if let Some(previous) = pages.get(start - 1).and_then(|page| page.next_margin) {
            margin_top = previous;
        }
    }

    for page in pages.iter_mut().skip(start as usize - 1) {
        if !page.is_placed() {
            break;
        }

        page.margin_top = margin_top;
        margin_top = (page.height * factor - page.height) + CONTENT_PAGE_SPACING * factor;
        page.next_margin = Some(margin_top);
    }

    let widest = pages
        .iter()
        .filter_map(|page| page.rendered())
        .map(|rendered| rendered.width)
        .fold(0.0_f32, f32::max);

    spacer.margin_top = margin_top;
    spacer.width =
        (widest * factor > viewport.width).then(|| widest * factor + CONTENT_RIGHT_MARGIN);
}

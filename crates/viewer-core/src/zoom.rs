//! Zoom levels the viewer can be set to.
//!
//! The viewer only ever moves one step along [`ZOOM_LEVELS`]; the index-based
//! [`ZoomLevel`] makes any other value unrepresentable.

/// Supported zoom factors in ascending order.
pub const ZOOM_LEVELS: [f32; 10] = [0.33, 0.5, 0.75, 0.9, 1.0, 1.1, 1.25, 1.5, 2.0, 5.0];

const DEFAULT_INDEX: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoomLevel(usize);

impl Default for ZoomLevel {
    fn default() -> Self {
        Self(DEFAULT_INDEX)
    }
}

impl ZoomLevel {
    pub fn smallest() -> Self {
        Self(0)
    }

    pub fn largest() -> Self {
        Self(ZOOM_LEVELS.len() - 1)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        (index < ZOOM_LEVELS.len()).then_some(Self(index))
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn factor(self) -> f32 {
        ZOOM_LEVELS[self.0]
    }

    pub fn is_smallest(self) -> bool {
        self.0 == 0
    }

    pub fn is_largest(self) -> bool {
        self.0 + 1 >= ZOOM_LEVELS.len()
    }

    pub fn step_in(self) -> Option<Self> {
        Self::from_index(self.0 + 1)
    }

    pub fn step_out(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

/// Zoom level at which a page of `page_width` fits a viewport of
/// `viewport_width`.
///
/// A page that already fits keeps `current`. Otherwise the largest level at
/// which the scaled page is narrower than the viewport is chosen, falling back
/// to the smallest level when none is.
pub fn best_fit_zoom(page_width: f32, viewport_width: f32, current: ZoomLevel) -> ZoomLevel {
    if page_width <= viewport_width {
        return current;
    }

    (0..ZOOM_LEVELS.len())
        .rev()
        .map(ZoomLevel)
        .find(|level| page_width * level.factor() < viewport_width)
        .unwrap_or_else(ZoomLevel::smallest)
}

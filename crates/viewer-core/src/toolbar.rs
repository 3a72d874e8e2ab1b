#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenIcon {
    Expand,
    Compress,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullscreenState {
    pub supported: bool,
    pub active: bool,
}

impl FullscreenState {
    pub fn icon(&self) -> FullscreenIcon {
        if self.active {
            FullscreenIcon::Compress
        } else {
            FullscreenIcon::Expand
        }
    }
}

/// Values and enabled flags of the viewer toolbar controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarState {
    pub page_number: u32,
    pub page_count: u32,
    pub zoom_in_enabled: bool,
    pub zoom_out_enabled: bool,
    /// Always enabled: on page 1 it scrolls back to the top of the document.
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub fullscreen_visible: bool,
    pub fullscreen_icon: FullscreenIcon,
    pub preloading: bool,
}

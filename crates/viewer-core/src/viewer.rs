//! Document viewer state machine.
//!
//! [`DocumentViewer`] owns every piece of mutable viewer state and never
//! performs I/O itself. Requests for the outside world are queued as
//! [`Command`]s; the driver executes them and reports back through
//! [`DocumentViewer::stylesheet_loaded`], [`DocumentViewer::page_fetched`],
//! [`DocumentViewer::signature_refreshed`] and
//! [`DocumentViewer::fullscreen_changed`]. Notifications for the presentation
//! layer are collected as [`ViewerEvent`]s.

use crate::error::{FetchError, ViewerError};
use crate::layout::{rescale, Spacer, Viewport, CONTENT_PAGE_SPACING};
use crate::page::{Page, PageStore};
use crate::retry::RetryPolicy;
use crate::throttle::{ScrollThrottle, SCROLL_THROTTLE};
use crate::toolbar::{FullscreenState, ToolbarState};
use crate::zoom::ZoomLevel;
use doc_model::{ContentMetadata, PreviewResource};
use log::debug;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LoadStylesheet { path: String },
    FetchPage { page: u32, path: String },
    RefreshSignature { path: String },
    RequestFullscreen,
    ExitFullscreen,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    PageLoaded { page: u32 },
    PageFailed { page: u32, error: FetchError },
    RetryScheduled { page: u32, attempt: u32 },
    ZoomChanged { zoom: ZoomLevel },
    ScrolledTo { scroll_top: f32 },
    PreloadingChanged { active: bool },
    SequenceFinished { target: u32, result: Result<(), FetchError> },
    FullscreenChanged { active: bool },
    ToolbarChanged,
}

#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub viewport: Viewport,
    /// Height of the loading indicator that holds a page's place.
    pub placeholder_height: f32,
    pub scroll_throttle: Duration,
    pub retry: RetryPolicy,
    pub fullscreen_supported: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            placeholder_height: 800.0,
            scroll_throttle: SCROLL_THROTTLE,
            retry: RetryPolicy::default(),
            fullscreen_supported: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoadStage {
    Fetching,
    RefreshingSignature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LoadAttempt {
    pub(crate) page: u32,
    pub(crate) attempt: u32,
    pub(crate) stage: LoadStage,
}

/// What the viewer is busy with. A single slot holds the one outstanding
/// page load, whether it was started on its own or by a preload sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Activity {
    Idle,
    LoadingOne(LoadAttempt),
    Sequence { target: u32, load: Option<LoadAttempt> },
}

impl Activity {
    pub(crate) fn in_flight(&self) -> Option<LoadAttempt> {
        match self {
            Self::Idle => None,
            Self::LoadingOne(load) => Some(*load),
            Self::Sequence { load, .. } => *load,
        }
    }

    pub(crate) fn in_flight_mut(&mut self) -> Option<&mut LoadAttempt> {
        match self {
            Self::Idle => None,
            Self::LoadingOne(load) => Some(load),
            Self::Sequence { load, .. } => load.as_mut(),
        }
    }

    pub(crate) fn clear_load(&mut self) {
        match self {
            Self::Idle => {}
            Self::LoadingOne(_) => *self = Self::Idle,
            Self::Sequence { load, .. } => *load = None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StylesheetState {
    NotRequested,
    Loading,
    Ready,
}

#[derive(Debug)]
pub struct DocumentViewer {
    pub(crate) metadata: ContentMetadata,
    pub(crate) pages: PageStore,
    pub(crate) spacer: Spacer,
    pub(crate) viewport: Viewport,
    pub(crate) zoom: ZoomLevel,
    pub(crate) page_number: u32,
    pub(crate) scroll_top: f32,
    pub(crate) activity: Activity,
    pub(crate) stylesheet: StylesheetState,
    pub(crate) fullscreen: FullscreenState,
    pub(crate) throttle: ScrollThrottle,
    pub(crate) retry: RetryPolicy,
    pub(crate) placeholder_height: f32,
    pub(crate) commands: VecDeque<Command>,
    pub(crate) events: Vec<ViewerEvent>,
}

impl DocumentViewer {
    pub fn new(metadata: ContentMetadata, options: ViewerOptions) -> Result<Self, ViewerError> {
        let page_count = metadata.page_count();
        if page_count == 0 {
            return Err(ViewerError::EmptyDocument);
        }

        Ok(Self {
            metadata,
            pages: PageStore::new(page_count),
            spacer: Spacer::default(),
            viewport: options.viewport,
            zoom: ZoomLevel::default(),
            page_number: 1,
            scroll_top: 0.0,
            activity: Activity::Idle,
            stylesheet: StylesheetState::NotRequested,
            fullscreen: FullscreenState { supported: options.fullscreen_supported, active: false },
            throttle: ScrollThrottle::new(options.scroll_throttle),
            retry: options.retry,
            placeholder_height: options.placeholder_height,
            commands: VecDeque::new(),
            events: Vec::new(),
        })
    }

    /// Request the document stylesheet. Page 1 is requested once it is in.
    pub fn start(&mut self) {
        if self.stylesheet != StylesheetState::NotRequested {
            return;
        }

        self.stylesheet = StylesheetState::Loading;
        let path = self.metadata.preview_path(PreviewResource::Stylesheet);
        debug!("requesting stylesheet for {}", self.metadata.id);
        self.commands.push_back(Command::LoadStylesheet { path });
        self.events.push(ViewerEvent::ToolbarChanged);
    }

    pub fn stylesheet_loaded(&mut self) -> Result<(), ViewerError> {
        if self.stylesheet != StylesheetState::Loading {
            return Err(ViewerError::UnexpectedStylesheet);
        }
        self.stylesheet = StylesheetState::Ready;

        match self.activity {
            Activity::Sequence { load: None, .. } => self.advance_sequence(),
            Activity::Idle => {
                let first_unplaced = self.pages.get(1).is_some_and(|page| !page.is_placed());
                if first_unplaced {
                    self.begin_load(1, 1);
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn next_command(&mut self) -> Option<Command> {
        self.commands.pop_front()
    }

    pub fn has_pending_commands(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn metadata(&self) -> &ContentMetadata {
        &self.metadata
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn page(&self, number: u32) -> Option<&Page> {
        self.pages.get(number)
    }

    pub fn page_count(&self) -> u32 {
        self.pages.page_count()
    }

    pub fn zoom(&self) -> ZoomLevel {
        self.zoom
    }

    /// Page currently shown at the top of the viewport.
    pub fn current_page(&self) -> u32 {
        self.page_number
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn scroll_height(&self) -> f32 {
        self.pages.flow_height() + self.spacer.margin_top
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn spacer(&self) -> Spacer {
        self.spacer
    }

    pub fn fullscreen(&self) -> FullscreenState {
        self.fullscreen
    }

    pub fn is_stylesheet_ready(&self) -> bool {
        self.stylesheet == StylesheetState::Ready
    }

    pub fn is_loading_page(&self) -> bool {
        self.activity.in_flight().is_some()
    }

    pub fn is_preloading(&self) -> bool {
        matches!(self.activity, Activity::Sequence { .. })
    }

    /// Page whose request is on the wire, if any.
    pub fn in_flight_page(&self) -> Option<u32> {
        self.activity
            .in_flight()
            .filter(|load| load.stage == LoadStage::Fetching)
            .map(|load| load.page)
    }

    pub fn toolbar(&self) -> ToolbarState {
        ToolbarState {
            page_number: self.page_number,
            page_count: self.page_count(),
            zoom_in_enabled: !self.zoom.is_largest(),
            zoom_out_enabled: !self.zoom.is_smallest(),
            prev_enabled: true,
            next_enabled: self.page_number < self.page_count(),
            fullscreen_visible: self.fullscreen.supported,
            fullscreen_icon: self.fullscreen.icon(),
            preloading: self.is_preloading(),
        }
    }

    // Viewport

    /// Scroll event from the content container.
    pub fn on_scroll(&mut self, scroll_top: f32, now: Instant) {
        self.scroll_top = scroll_top;
        self.clamp_scroll();

        if self.throttle.event(now) {
            self.handle_scroll();
        }
    }

    /// Run a scroll handler call that the throttle held back, if it is due.
    pub fn tick(&mut self, now: Instant) {
        if self.throttle.poll(now) {
            self.handle_scroll();
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport { width, height };
        rescale(&mut self.pages, &mut self.spacer, self.zoom, self.viewport, 1);
        self.clamp_scroll();
        self.handle_scroll();
    }

    /// Page number typed into the toolbar. Anything that is not a page of
    /// this document is ignored.
    pub fn submit_page_input(&mut self, input: &str) -> bool {
        let digits: String = input.trim().chars().take_while(char::is_ascii_digit).collect();
        match digits.parse::<u32>() {
            Ok(page) => self.goto_page(page),
            Err(_) => false,
        }
    }

    pub fn goto_page(&mut self, page: u32) -> bool {
        if !self.pages.contains(page) {
            return false;
        }

        self.page_number = page;
        self.load_up_to(page);
        true
    }

    pub fn scroll_to_page(&mut self, page: u32) -> bool {
        let Some(target) = self.pages.get(page) else {
            return false;
        };

        if target.is_loaded() {
            self.scroll_to_loaded(page);
        } else {
            self.load_up_to(page);
        }
        true
    }

    pub fn prev_page(&mut self) {
        if self.page_number > 1 {
            self.page_number -= 1;
        }
        self.scroll_to_page(self.page_number);
    }

    pub fn next_page(&mut self) {
        if self.page_number < self.page_count() {
            self.page_number += 1;
            self.scroll_to_page(self.page_number);
        }
    }

    pub(crate) fn scroll_to_loaded(&mut self, page: u32) {
        // Half the scaled gap, so the previous page ends above the origin.
        let gap = CONTENT_PAGE_SPACING * self.zoom.factor();
        let target = self.pages.visual_top(page) - gap / 2.0;
        self.scroll_top = target;
        self.clamp_scroll();
        self.events.push(ViewerEvent::ScrolledTo { scroll_top: self.scroll_top });
        self.events.push(ViewerEvent::ToolbarChanged);
        self.handle_scroll();
    }

    fn handle_scroll(&mut self) {
        if let Some(visible) = self.detect_visible_page() {
            if visible != self.page_number {
                self.page_number = visible;
                self.events.push(ViewerEvent::ToolbarChanged);
            }
        }

        self.load_for_infinite_scroll();
    }

    /// First placed page whose bottom edge is below the viewport origin.
    pub fn detect_visible_page(&self) -> Option<u32> {
        let factor = self.zoom.factor();
        let mut flow_top = 0.0;
        for page in self.pages.iter().filter(|page| page.is_placed()) {
            let bottom = flow_top + page.margin_top() + page.height() * factor;
            if bottom - self.scroll_top > 0.0 {
                return Some(page.number());
            }
            flow_top += page.margin_top() + page.height();
        }
        None
    }

    /// Request the next page when less than a screenful of content remains
    /// below the viewport and nothing else is loading. Stops at a page whose
    /// last load failed.
    pub(crate) fn load_for_infinite_scroll(&mut self) {
        if !self.is_stylesheet_ready() || self.activity != Activity::Idle {
            return;
        }
        let Some(next) = self.pages.next_unplaced() else {
            return;
        };
        // Only an explicit request loads a failed page again.
        if self.pages.get(next).is_some_and(Page::has_failed) {
            return;
        }

        let remaining = self.scroll_height() - self.viewport.height - self.scroll_top;
        if remaining < self.viewport.height {
            debug!("{remaining}px left below the viewport, loading page {next}");
            self.begin_load(next, 1);
        }
    }

    pub(crate) fn clamp_scroll(&mut self) {
        let max = (self.scroll_height() - self.viewport.height).max(0.0);
        self.scroll_top = self.scroll_top.clamp(0.0, max);
    }

    // Zoom

    pub fn zoom_in(&mut self) -> bool {
        let Some(level) = self.zoom.step_in() else {
            return false;
        };
        self.change_zoom(level);
        self.handle_scroll();
        true
    }

    pub fn zoom_out(&mut self) -> bool {
        let Some(level) = self.zoom.step_out() else {
            return false;
        };
        self.change_zoom(level);
        self.handle_scroll();
        true
    }

    /// Rescale every page while keeping the content under the viewport origin
    /// in place.
    fn change_zoom(&mut self, level: ZoomLevel) {
        let old_factor = self.zoom.factor();
        let anchor_page = self.page_number;
        let anchor = self
            .pages
            .get(anchor_page)
            .filter(|page| page.is_placed())
            .map(|_| self.pages.visual_top(anchor_page) - self.scroll_top);

        self.zoom = level;
        rescale(&mut self.pages, &mut self.spacer, level, self.viewport, 1);

        if let Some(old_position) = anchor {
            let new_position = self.pages.visual_top(anchor_page) - self.scroll_top;
            self.scroll_top += new_position - old_position * (level.factor() / old_factor);
            self.clamp_scroll();
        }

        debug!("zoom changed from {old_factor} to {}", level.factor());
        self.events.push(ViewerEvent::ZoomChanged { zoom: level });
        self.events.push(ViewerEvent::ToolbarChanged);
    }

    // Fullscreen

    pub fn toggle_fullscreen(&mut self) {
        if !self.fullscreen.supported {
            return;
        }

        if self.fullscreen.active {
            self.commands.push_back(Command::ExitFullscreen);
        } else {
            self.commands.push_back(Command::RequestFullscreen);
            self.load_for_infinite_scroll();
        }
    }

    pub fn fullscreen_changed(&mut self, active: bool) {
        self.fullscreen.active = active;
        self.events.push(ViewerEvent::FullscreenChanged { active });
        self.events.push(ViewerEvent::ToolbarChanged);
    }
}

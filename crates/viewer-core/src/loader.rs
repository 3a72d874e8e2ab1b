//! Fetching and rendering of individual pages.

use crate::error::{FetchError, ViewerError};
use crate::layout::{rescale, CONTENT_PAGE_SPACING};
use crate::page::RenderedPage;
use crate::viewer::{Activity, Command, DocumentViewer, LoadAttempt, LoadStage, ViewerEvent};
use crate::zoom::best_fit_zoom;
use doc_model::{ContentMetadata, PreviewResource};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadRequest {
    /// The page is loaded, or its request is already outstanding.
    AlreadyPlaced,
    Started,
    /// Another page is loading; try again once it has finished.
    Busy,
}

impl DocumentViewer {
    pub fn load_page(&mut self, number: u32) -> Result<LoadRequest, ViewerError> {
        let page = self.pages.get(number).ok_or(ViewerError::PageOutOfRange {
            page: number,
            page_count: self.pages.page_count(),
        })?;

        if page.is_placed() {
            return Ok(LoadRequest::AlreadyPlaced);
        }
        if !self.is_stylesheet_ready() || self.activity.in_flight().is_some() {
            return Ok(LoadRequest::Busy);
        }

        self.begin_load(number, 1);
        Ok(LoadRequest::Started)
    }

    /// Put a placeholder in the page's slot and request its content.
    pub(crate) fn begin_load(&mut self, number: u32, attempt: u32) {
        let Some(page) = self.pages.get_mut(number) else {
            return;
        };
        page.place_placeholder(self.placeholder_height, CONTENT_PAGE_SPACING);

        let load = LoadAttempt { page: number, attempt, stage: LoadStage::Fetching };
        match self.activity {
            Activity::Idle => self.activity = Activity::LoadingOne(load),
            Activity::LoadingOne(current) => {
                debug_assert_eq!(current.page, number, "only a retry may replace a running load");
                self.activity = Activity::LoadingOne(load);
            }
            Activity::Sequence { target, load: current } => {
                debug_assert!(
                    current.map_or(true, |current| current.page == number),
                    "only a retry may replace a running load"
                );
                self.activity = Activity::Sequence { target, load: Some(load) };
            }
        }

        let path = self.metadata.preview_path(PreviewResource::Page(number));
        debug!("requesting page {number} (attempt {attempt})");
        self.commands.push_back(Command::FetchPage { page: number, path });
    }

    /// Outcome of a [`Command::FetchPage`].
    pub fn page_fetched(
        &mut self,
        number: u32,
        result: Result<RenderedPage, FetchError>,
    ) -> Result<(), ViewerError> {
        let load = match self.activity.in_flight() {
            Some(load) if load.page == number && load.stage == LoadStage::Fetching => load,
            _ => return Err(ViewerError::UnexpectedPage { page: number }),
        };

        match result {
            Ok(rendered) => self.complete_load(number, rendered),
            Err(error) if self.retry.should_retry(load.attempt, &error) => {
                warn!("page {number} was denied ({error}), refreshing the signature");
                if let Some(page) = self.pages.get_mut(number) {
                    page.discard();
                }
                if let Some(load) = self.activity.in_flight_mut() {
                    load.stage = LoadStage::RefreshingSignature;
                }

                self.events
                    .push(ViewerEvent::RetryScheduled { page: number, attempt: load.attempt + 1 });
                self.commands
                    .push_back(Command::RefreshSignature { path: self.metadata.content_path() });
            }
            Err(error) => self.fail_load(number, error),
        }
        Ok(())
    }

    /// Outcome of a [`Command::RefreshSignature`].
    pub fn signature_refreshed(
        &mut self,
        result: Result<ContentMetadata, FetchError>,
    ) -> Result<(), ViewerError> {
        let load = match self.activity.in_flight() {
            Some(load) if load.stage == LoadStage::RefreshingSignature => load,
            _ => return Err(ViewerError::UnexpectedSignature),
        };

        match result {
            Ok(metadata) => {
                if metadata.page_count() != self.pages.page_count() {
                    warn!(
                        "refreshed metadata reports {} pages, keeping {}",
                        metadata.page_count(),
                        self.pages.page_count()
                    );
                }
                self.metadata = metadata;
                self.begin_load(load.page, load.attempt + 1);
            }
            Err(error) => self.fail_load(load.page, error),
        }
        Ok(())
    }

    fn complete_load(&mut self, number: u32, rendered: RenderedPage) {
        let width = rendered.width;
        if let Some(page) = self.pages.get_mut(number) {
            page.set_rendered(rendered);
        }

        // Placeholder dimensions are meaningless, so the fit is only known now.
        if number == 1 {
            let fitted = best_fit_zoom(width, self.viewport.width, self.zoom);
            if fitted != self.zoom {
                debug!("first page is {width}px wide, zooming to {}", fitted.factor());
                self.zoom = fitted;
                self.events.push(ViewerEvent::ZoomChanged { zoom: fitted });
                self.events.push(ViewerEvent::ToolbarChanged);
            }
        }

        rescale(&mut self.pages, &mut self.spacer, self.zoom, self.viewport, number);
        self.clamp_scroll();

        let in_sequence = matches!(self.activity, Activity::Sequence { .. });
        self.activity.clear_load();
        debug!("page {number} loaded");
        self.events.push(ViewerEvent::PageLoaded { page: number });

        if in_sequence {
            self.advance_sequence();
        } else {
            self.load_for_infinite_scroll();
        }
    }

    fn fail_load(&mut self, number: u32, error: FetchError) {
        warn!("page {number} failed to load: {error}");
        if let Some(page) = self.pages.get_mut(number) {
            page.mark_failed();
        }

        let target = match self.activity {
            Activity::Sequence { target, .. } => Some(target),
            _ => None,
        };
        self.activity.clear_load();
        self.events.push(ViewerEvent::PageFailed { page: number, error: error.clone() });

        if let Some(target) = target {
            self.finish_sequence(target, Err(error));
        }
    }
}

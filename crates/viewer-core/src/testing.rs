//! In-memory collaborator used by the unit tests.

use crate::error::FetchError;
use crate::layout::Viewport;
use crate::page::RenderedPage;
use crate::viewer::{Command, DocumentViewer, ViewerOptions};
use doc_model::{ContentMetadata, PreviewInfo, Signature};
use std::collections::{HashMap, VecDeque};

pub(crate) fn metadata(page_count: u32) -> ContentMetadata {
    ContentMetadata {
        id: "c:test:doc".to_owned(),
        latest_revision_id: "rev:test:1".to_owned(),
        previews: PreviewInfo { page_count, css_scope_class: None },
        signature: Signature::new().with("signature", "initial"),
    }
}

/// 1280x800 viewport with a 100px loading placeholder.
pub(crate) fn options() -> ViewerOptions {
    ViewerOptions {
        viewport: Viewport { width: 1280.0, height: 800.0 },
        placeholder_height: 100.0,
        ..ViewerOptions::default()
    }
}

/// Answers viewer commands immediately. Every page is 600x1000 unless
/// configured otherwise.
pub(crate) struct FakeBackend {
    width: f32,
    height: f32,
    page_failures: HashMap<u32, VecDeque<FetchError>>,
    refresh_failure: Option<FetchError>,
    pub(crate) stylesheets: u32,
    pub(crate) page_requests: Vec<u32>,
    pub(crate) refreshes: u32,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            width: 600.0,
            height: 1000.0,
            page_failures: HashMap::new(),
            refresh_failure: None,
            stylesheets: 0,
            page_requests: Vec::new(),
            refreshes: 0,
        }
    }

    pub(crate) fn with_page_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Queue a failure for the next request of `page`.
    pub(crate) fn fail_page(mut self, page: u32, error: FetchError) -> Self {
        self.page_failures.entry(page).or_default().push_back(error);
        self
    }

    pub(crate) fn fail_refresh(mut self, error: FetchError) -> Self {
        self.refresh_failure = Some(error);
        self
    }

    pub(crate) fn requests_for(&self, page: u32) -> usize {
        self.page_requests.iter().filter(|requested| **requested == page).count()
    }

    pub(crate) fn run(&mut self, viewer: &mut DocumentViewer) {
        while self.step(viewer) {}
    }

    pub(crate) fn step(&mut self, viewer: &mut DocumentViewer) -> bool {
        let Some(command) = viewer.next_command() else {
            return false;
        };

        match command {
            Command::LoadStylesheet { .. } => {
                self.stylesheets += 1;
                viewer.stylesheet_loaded().expect("stylesheet was requested");
            }
            Command::FetchPage { page, .. } => {
                assert_eq!(viewer.in_flight_page(), Some(page), "page request out of turn");
                self.page_requests.push(page);

                let result = match self.page_failures.get_mut(&page).and_then(VecDeque::pop_front) {
                    Some(error) => Err(error),
                    None => Ok(RenderedPage::new(
                        format!("<svg data-page=\"{page}\"/>"),
                        self.width,
                        self.height,
                    )),
                };
                viewer.page_fetched(page, result).expect("page was requested");
            }
            Command::RefreshSignature { .. } => {
                self.refreshes += 1;
                let result = match self.refresh_failure.take() {
                    Some(error) => Err(error),
                    None => {
                        let mut fresh = viewer.metadata().clone();
                        fresh.signature =
                            Signature::new().with("signature", format!("fresh-{}", self.refreshes));
                        Ok(fresh)
                    }
                };
                viewer.signature_refreshed(result).expect("refresh was requested");
            }
            Command::RequestFullscreen => viewer.fullscreen_changed(true),
            Command::ExitFullscreen => viewer.fullscreen_changed(false),
        }
        true
    }
}

use crate::{measure_svg, ClientError, PreviewBackend};
use doc_model::content_path;
use log::{debug, info, warn};
use serde::Serialize;
use viewer_core::{Command, DocumentViewer, FetchError, RenderedPage, ViewerEvent, ViewerOptions};

/// Requests issued by a [`Driver`] so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RequestStats {
    pub stylesheets: u32,
    pub pages: u32,
    pub refreshes: u32,
    pub failures: u32,
}

/// Runs a [`DocumentViewer`] against a backend, synchronously.
///
/// Fullscreen has no meaning without a window, so fullscreen requests are
/// acknowledged as soon as they are made.
pub struct Driver<B> {
    backend: B,
    viewer: DocumentViewer,
    stats: RequestStats,
}

impl<B: PreviewBackend> Driver<B> {
    /// Fetch the metadata of `content_id` and start a viewer for it.
    pub fn open(
        mut backend: B,
        content_id: &str,
        options: ViewerOptions,
    ) -> Result<Self, ClientError> {
        let metadata =
            backend.fetch_metadata(&content_path(content_id)).map_err(ClientError::Metadata)?;
        info!(
            "opened {} revision {} with {} page(s)",
            metadata.id,
            metadata.latest_revision_id,
            metadata.page_count()
        );

        let mut viewer = DocumentViewer::new(metadata, options)?;
        viewer.start();
        Ok(Self::with_viewer(backend, viewer))
    }

    pub fn with_viewer(backend: B, viewer: DocumentViewer) -> Self {
        Self { backend, viewer, stats: RequestStats::default() }
    }

    pub fn viewer(&self) -> &DocumentViewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut DocumentViewer {
        &mut self.viewer
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn stats(&self) -> RequestStats {
        self.stats
    }

    /// Execute queued commands until the viewer has nothing left to ask for.
    ///
    /// Returns the events emitted along the way.
    pub fn run_until_idle(&mut self) -> Result<Vec<ViewerEvent>, ClientError> {
        let mut events = Vec::new();
        while let Some(command) = self.viewer.next_command() {
            self.execute(command)?;
            events.extend(self.viewer.drain_events());
        }
        events.extend(self.viewer.drain_events());
        Ok(events)
    }

    fn execute(&mut self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::LoadStylesheet { path } => {
                self.stats.stylesheets += 1;
                if let Err(error) = self.backend.fetch_stylesheet(&path) {
                    // Pages still render without it, just unstyled.
                    self.stats.failures += 1;
                    warn!("stylesheet unavailable: {error}");
                }
                self.viewer.stylesheet_loaded()?;
            }
            Command::FetchPage { page, path } => {
                self.stats.pages += 1;
                debug!("fetching page {page}");
                let result = self.backend.fetch_page(&path).and_then(|markup| measure(&markup));
                if result.is_err() {
                    self.stats.failures += 1;
                }
                self.viewer.page_fetched(page, result)?;
            }
            Command::RefreshSignature { path } => {
                self.stats.refreshes += 1;
                let result = self.backend.fetch_metadata(&path);
                if result.is_err() {
                    self.stats.failures += 1;
                }
                self.viewer.signature_refreshed(result)?;
            }
            Command::RequestFullscreen => self.viewer.fullscreen_changed(true),
            Command::ExitFullscreen => self.viewer.fullscreen_changed(false),
        }
        Ok(())
    }
}

/// Markup that cannot be measured is reported like a failed request.
fn measure(markup: &str) -> Result<RenderedPage, FetchError> {
    measure_svg(markup).map_err(|e| FetchError::new(0, e.to_string()))
}

//! Headless state machine of the document preview pager.
//!
//! Pages of a converted document are fetched one at a time, stacked in a
//! scrollable column and scaled to one of a fixed set of zoom levels. The
//! crate owns the bookkeeping only: measuring markup, issuing requests and
//! drawing are left to whoever drives a [`DocumentViewer`].
//!
//! # Example
//!
//! ```
//! use doc_model::{ContentMetadata, PreviewInfo, Signature};
//! use viewer_core::{Command, DocumentViewer, RenderedPage, ViewerOptions};
//!
//! let metadata = ContentMetadata {
//!     id: "c:tenant:doc".to_owned(),
//!     latest_revision_id: "rev:tenant:1".to_owned(),
//!     previews: PreviewInfo { page_count: 1, css_scope_class: None },
//!     signature: Signature::new(),
//! };
//!
//! let mut viewer = DocumentViewer::new(metadata, ViewerOptions::default()).unwrap();
//! viewer.start();
//!
//! while let Some(command) = viewer.next_command() {
//!     match command {
//!         Command::LoadStylesheet { .. } => viewer.stylesheet_loaded().unwrap(),
//!         Command::FetchPage { page, .. } => {
//!             let rendered = RenderedPage::new("<svg/>", 600.0, 800.0);
//!             viewer.page_fetched(page, Ok(rendered)).unwrap();
//!         }
//!         _ => {}
//!     }
//! }
//!
//! assert!(viewer.page(1).unwrap().is_loaded());
//! ```

mod error;
mod layout;
mod loader;
mod page;
mod retry;
mod sequencer;
mod throttle;
mod toolbar;
mod viewer;
mod zoom;

#[cfg(test)]
mod testing;

pub use error::{FetchError, ViewerError, STATUS_UNAUTHORIZED};
pub use layout::{rescale, Spacer, Viewport, CONTENT_PAGE_SPACING, CONTENT_RIGHT_MARGIN};
pub use loader::LoadRequest;
pub use page::{Page, PageHandle, PageState, PageStore, RenderedPage};
pub use retry::RetryPolicy;
pub use throttle::{ScrollThrottle, SCROLL_THROTTLE};
pub use toolbar::{FullscreenIcon, FullscreenState, ToolbarState};
pub use viewer::{Command, DocumentViewer, ViewerEvent, ViewerOptions};
pub use zoom::{best_fit_zoom, ZoomLevel, ZOOM_LEVELS};

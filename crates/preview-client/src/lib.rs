//! Fetching side of the document preview pager.
//!
//! A [`Driver`] executes the commands a [`viewer_core::DocumentViewer`]
//! queues against a [`PreviewBackend`]: the content REST API over HTTP, or a
//! directory holding a downloaded preview.

mod dir;
mod driver;
mod http;
mod measure;

use doc_model::ContentMetadata;
use std::path::PathBuf;
use viewer_core::FetchError;

pub use dir::{DirBackend, METADATA_FILE};
pub use driver::{Driver, RequestStats};
pub use http::HttpBackend;
pub use measure::{measure_svg, MeasureError};

/// Source of content metadata and preview resources.
///
/// Paths are absolute request paths as produced by [`ContentMetadata`],
/// including the signature query string.
pub trait PreviewBackend {
    fn fetch_metadata(&mut self, path: &str) -> Result<ContentMetadata, FetchError>;

    fn fetch_stylesheet(&mut self, path: &str) -> Result<String, FetchError>;

    /// Markup of a single page.
    fn fetch_page(&mut self, path: &str) -> Result<String, FetchError>;
}

impl<B: PreviewBackend + ?Sized> PreviewBackend for Box<B> {
    fn fetch_metadata(&mut self, path: &str) -> Result<ContentMetadata, FetchError> {
        (**self).fetch_metadata(path)
    }

    fn fetch_stylesheet(&mut self, path: &str) -> Result<String, FetchError> {
        (**self).fetch_stylesheet(path)
    }

    fn fetch_page(&mut self, path: &str) -> Result<String, FetchError> {
        (**self).fetch_page(path)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("preview directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),
    #[error("failed to load content metadata: {0}")]
    Metadata(FetchError),
    #[error(transparent)]
    Viewer(#[from] viewer_core::ViewerError),
}

use crate::{ClientError, PreviewBackend};
use doc_model::ContentMetadata;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use viewer_core::FetchError;

pub const METADATA_FILE: &str = "metadata.json";

/// Backend serving a previously downloaded preview from a directory.
///
/// The directory holds `metadata.json` plus the preview resources under their
/// own names (`combined.css`, `page.<n>.svg`). Signatures are ignored.
#[derive(Debug, Clone)]
pub struct DirBackend {
    root: PathBuf,
}

impl DirBackend {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ClientError::MissingDirectory(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that answers a request path.
    pub fn file_for(&self, path: &str) -> PathBuf {
        let path = path.split('?').next().unwrap_or_default();
        match path.rsplit_once("/previews/") {
            Some((_, resource)) => self.root.join(resource),
            None => self.root.join(METADATA_FILE),
        }
    }

    fn read(&self, path: &str) -> Result<String, FetchError> {
        let file = self.file_for(path);
        debug!("reading {}", file.display());

        fs::read_to_string(&file).map_err(|e| match e.kind() {
            ErrorKind::NotFound => FetchError::new(404, format!("{} not found", file.display())),
            ErrorKind::PermissionDenied => FetchError::new(403, e.to_string()),
            _ => FetchError::new(0, e.to_string()),
        })
    }
}

impl PreviewBackend for DirBackend {
    fn fetch_metadata(&mut self, path: &str) -> Result<ContentMetadata, FetchError> {
        let body = self.read(path)?;
        ContentMetadata::from_json(&body).map_err(|e| FetchError::new(0, e.to_string()))
    }

    fn fetch_stylesheet(&mut self, path: &str) -> Result<String, FetchError> {
        self.read(path)
    }

    fn fetch_page(&mut self, path: &str) -> Result<String, FetchError> {
        self.read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_paths_map_to_files() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let backend = DirBackend::new(temp.path()).expect("directory exists");

        assert_eq!(
            backend.file_for("/api/content/c:x/revisions/r:x/previews/page.3.svg?signature=s"),
            temp.path().join("page.3.svg")
        );
        assert_eq!(
            backend.file_for("/api/content/c:x/revisions/r:x/previews/combined.css"),
            temp.path().join("combined.css")
        );
        assert_eq!(backend.file_for("/api/content/c:x"), temp.path().join(METADATA_FILE));
    }

    #[test]
    fn missing_resource_is_not_found() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut backend = DirBackend::new(temp.path()).expect("directory exists");

        let err = backend.fetch_page("/previews/page.1.svg").expect_err("file is absent");
        assert_eq!(err.code, 404);
    }

    #[test]
    fn missing_directory_is_rejected() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let err = DirBackend::new(temp.path().join("nope")).expect_err("directory is absent");
        assert!(matches!(err, ClientError::MissingDirectory(_)));
    }
}

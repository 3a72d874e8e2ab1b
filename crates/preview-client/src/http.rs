use crate::{ClientError, PreviewBackend};
use doc_model::ContentMetadata;
use log::debug;
use std::time::Duration;
use url::Url;
use viewer_core::FetchError;

const USER_AGENT: &str = concat!("docpreview/", env!("CARGO_PKG_VERSION"));

/// Backend talking to the content REST API over HTTP.
#[derive(Debug)]
pub struct HttpBackend {
    base: Url,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(base: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base)?;
        let agent = ureq::AgentBuilder::new().timeout(timeout).user_agent(USER_AGENT).build();

        Ok(Self { base, agent })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base.join(path).map_err(|e| FetchError::new(0, format!("invalid path {path}: {e}")))
    }

    fn get_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.resolve(path)?;
        debug!("GET {url}");

        let response = self.agent.get(url.as_str()).call().map_err(fetch_error)?;
        response.into_string().map_err(|e| FetchError::new(0, e.to_string()))
    }
}

impl PreviewBackend for HttpBackend {
    fn fetch_metadata(&mut self, path: &str) -> Result<ContentMetadata, FetchError> {
        let body = self.get_text(path)?;
        ContentMetadata::from_json(&body).map_err(|e| FetchError::new(0, e.to_string()))
    }

    fn fetch_stylesheet(&mut self, path: &str) -> Result<String, FetchError> {
        self.get_text(path)
    }

    fn fetch_page(&mut self, path: &str) -> Result<String, FetchError> {
        self.get_text(path)
    }
}

/// Non-2xx responses keep their status; anything without a response is `0`.
fn fetch_error(error: ureq::Error) -> FetchError {
    match error {
        ureq::Error::Status(code, response) => {
            let message = response.into_string().unwrap_or_default();
            FetchError::new(code, message)
        }
        ureq::Error::Transport(transport) => FetchError::new(0, transport.to_string()),
    }
}

/// Status reported when a signed preview request has expired.
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Failure of a request issued on behalf of the viewer.
///
/// `code` is the HTTP status of the response, or `0` when no response was
/// received at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request failed with status {code}: {message}")]
pub struct FetchError {
    pub code: u16,
    pub message: String,
}

impl FetchError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn is_authorization_expired(&self) -> bool {
        self.code == STATUS_UNAUTHORIZED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewerError {
    #[error("document has no pages")]
    EmptyDocument,
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("no request is outstanding for page {page}")]
    UnexpectedPage { page: u32 },
    #[error("no signature refresh is outstanding")]
    UnexpectedSignature,
    #[error("stylesheet was not requested")]
    UnexpectedStylesheet,
}

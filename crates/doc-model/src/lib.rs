//! Data model of a previewable document as the content API describes it.
//!
//! The metadata object carries the page count and the signature that
//! authorises requests for the generated preview resources. Signatures expire,
//! so the whole object is re-fetched from [`ContentMetadata::content_path`]
//! whenever a preview request is denied.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::form_urlencoded;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid content metadata: {0}")]
    Json(#[from] serde_json::Error),
    #[error("content {id} has no preview pages")]
    NoPages { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    pub id: String,
    pub latest_revision_id: String,
    pub previews: PreviewInfo,
    #[serde(default)]
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewInfo {
    pub page_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_scope_class: Option<String>,
}

/// Query-string parameters that sign a preview request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(BTreeMap<String, serde_json::Value>);

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn to_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.0 {
            match value {
                serde_json::Value::Null => {
                    query.append_pair(key, "");
                }
                serde_json::Value::String(text) => {
                    query.append_pair(key, text);
                }
                other => {
                    query.append_pair(key, &other.to_string());
                }
            }
        }
        query.finish()
    }
}

/// Metadata endpoint of a content item. Also hands out fresh signatures.
pub fn content_path(content_id: &str) -> String {
    format!("/api/content/{content_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewResource {
    Stylesheet,
    Page(u32),
}

impl fmt::Display for PreviewResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stylesheet => f.write_str("combined.css"),
            Self::Page(number) => write!(f, "page.{number}.svg"),
        }
    }
}

impl ContentMetadata {
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let metadata: Self = serde_json::from_str(json)?;
        metadata.validate()?;
        Ok(metadata)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.previews.page_count == 0 {
            return Err(ModelError::NoPages { id: self.id.clone() });
        }
        Ok(())
    }

    pub fn page_count(&self) -> u32 {
        self.previews.page_count
    }

    /// Path of the metadata endpoint, used to obtain a fresh signature.
    pub fn content_path(&self) -> String {
        content_path(&self.id)
    }

    /// Signed path of one of the generated preview resources.
    pub fn preview_path(&self, resource: PreviewResource) -> String {
        let mut path = format!(
            "/api/content/{}/revisions/{}/previews/{}",
            self.id, self.latest_revision_id, resource
        );

        if !self.signature.is_empty() {
            path.push('?');
            path.push_str(&self.signature.to_query());
        }

        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentMetadata {
        ContentMetadata {
            id: "c:cam:abc".to_owned(),
            latest_revision_id: "rev:cam:1".to_owned(),
            previews: PreviewInfo { page_count: 3, css_scope_class: Some("pdf2htmlEX".to_owned()) },
            signature: Signature::new().with("signature", "a b/c").with("expires", 1_700_000_000),
        }
    }

    #[test]
    fn page_path_carries_signature_query() {
        let path = sample().preview_path(PreviewResource::Page(2));
        assert_eq!(
            path,
            "/api/content/c:cam:abc/revisions/rev:cam:1/previews/page.2.svg?expires=1700000000&signature=a+b%2Fc"
        );
    }

    #[test]
    fn stylesheet_path_uses_combined_css() {
        let metadata = ContentMetadata { signature: Signature::new(), ..sample() };
        assert_eq!(
            metadata.preview_path(PreviewResource::Stylesheet),
            "/api/content/c:cam:abc/revisions/rev:cam:1/previews/combined.css"
        );
    }

    #[test]
    fn parses_backend_field_names() {
        let json = r#"{
            "id": "c:cam:doc",
            "latestRevisionId": "rev:cam:7",
            "previews": { "pageCount": 12, "cssScopeClass": "scope" },
            "signature": { "signature": "xyz", "expires": 42 }
        }"#;

        let metadata = ContentMetadata::from_json(json).expect("metadata should parse");
        assert_eq!(metadata.page_count(), 12);
        assert_eq!(metadata.previews.css_scope_class.as_deref(), Some("scope"));
        assert_eq!(metadata.signature.get("expires"), Some(&serde_json::json!(42)));
        assert_eq!(metadata.content_path(), "/api/content/c:cam:doc");
    }

    #[test]
    fn rejects_document_without_pages() {
        let json = r#"{"id":"c:x","latestRevisionId":"r","previews":{"pageCount":0}}"#;
        let err = ContentMetadata::from_json(json).expect_err("empty document must be rejected");
        assert!(matches!(err, ModelError::NoPages { .. }));
    }
}

//! Request model shared by every endpoint
//!
//! An `ApiRequest` describes one Graph API call without touching the network:
//! verb, version, path segments, query, auth scheme and body shape.

use std::path::PathBuf;

use reqwest::Method;
use serde_json::Value;

/// How the access token is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`
    #[default]
    Bearer,
    /// `Authorization: OAuth <token>` (resumable upload endpoints)
    OAuth,
}

impl AuthScheme {
    /// Render the `Authorization` header value for a token
    pub fn header_value(&self, token: &str) -> String {
        match self {
            Self::Bearer => format!("Bearer {}", token),
            Self::OAuth => format!("OAuth {}", token),
        }
    }
}

/// One part of a multipart form body
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    /// File read from disk when the request is sent
    File {
        name: String,
        path: PathBuf,
        mime_type: Option<String>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>, mime_type: Option<String>) -> Self {
        Self::File {
            name: name.into(),
            path: path.into(),
            mime_type,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Request body shapes used by the Cloud API
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Multipart(Vec<FormPart>),
    /// Raw file contents sent as the whole body
    File { path: PathBuf, content_type: String },
}

/// What the caller expects back on success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    #[default]
    Json,
    /// Binary body plus its content type
    Media,
}

/// A fully described, not yet sent, Graph API request
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// API version override; the client default applies when `None`
    pub version: Option<String>,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub auth: AuthScheme,
    pub body: Body,
    pub response: ResponseKind,
    /// Fully qualified URL that bypasses base/version/segments
    pub absolute_url: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            version: None,
            segments: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            auth: AuthScheme::Bearer,
            body: Body::Empty,
            response: ResponseKind::Json,
            absolute_url: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Set the API version (ignored when `None`)
    pub fn version(mut self, version: Option<String>) -> Self {
        if version.is_some() {
            self.version = version;
        }
        self
    }

    /// Append one path segment (percent-encoded on send)
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query pair only when a value is present
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Body::Multipart(parts);
        self
    }

    pub fn file_body(mut self, path: impl Into<PathBuf>, content_type: impl Into<String>) -> Self {
        self.body = Body::File {
            path: path.into(),
            content_type: content_type.into(),
        };
        self
    }

    pub fn oauth(mut self) -> Self {
        self.auth = AuthScheme::OAuth;
        self
    }

    pub fn expect_media(mut self) -> Self {
        self.response = ResponseKind::Media;
        self
    }

    pub fn absolute(mut self, url: impl Into<String>) -> Self {
        self.absolute_url = Some(url.into());
        self
    }

    /// Path relative to the version root, e.g. `123/messages`
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Look up a query value by key
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// JSON body, if this request carries one
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_header_values() {
        assert_eq!(AuthScheme::Bearer.header_value("abc"), "Bearer abc");
        assert_eq!(AuthScheme::OAuth.header_value("abc"), "OAuth abc");
        assert_eq!(AuthScheme::default(), AuthScheme::Bearer);
    }

    #[test]
    fn test_builder_defaults() {
        let req = ApiRequest::get();
        assert_eq!(req.method, Method::GET);
        assert!(req.version.is_none());
        assert!(req.segments.is_empty());
        assert_eq!(req.body, Body::Empty);
        assert_eq!(req.response, ResponseKind::Json);
        assert_eq!(req.auth, AuthScheme::Bearer);
    }

    #[test]
    fn test_builder_chain() {
        let req = ApiRequest::post()
            .version(Some("v19.0".to_string()))
            .segment("100")
            .segment("messages")
            .query("fields", "id")
            .json(json!({"to": "1555"}));

        assert_eq!(req.method, Method::POST);
        assert_eq!(req.version.as_deref(), Some("v19.0"));
        assert_eq!(req.path(), "100/messages");
        assert_eq!(req.query_value("fields"), Some("id"));
        assert_eq!(req.json_body().unwrap()["to"], "1555");
    }

    #[test]
    fn test_version_none_keeps_default() {
        let req = ApiRequest::get().version(None);
        assert!(req.version.is_none());
    }

    #[test]
    fn test_query_opt() {
        let req = ApiRequest::get()
            .query_opt("a", Some("1"))
            .query_opt::<String>("b", None);
        assert_eq!(req.query, vec![("a".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_oauth_and_media() {
        let req = ApiRequest::get().oauth().expect_media();
        assert_eq!(req.auth, AuthScheme::OAuth);
        assert_eq!(req.response, ResponseKind::Media);
    }

    #[test]
    fn test_form_part_names() {
        let text = FormPart::text("messaging_product", "whatsapp");
        let file = FormPart::file("file", "/tmp/a.png", None);
        assert_eq!(text.name(), "messaging_product");
        assert_eq!(file.name(), "file");
    }
}

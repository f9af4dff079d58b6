//! Graph API HTTP client
//!
//! One `GraphClient` is built at startup from `ClientConfig` and shared by
//! reference across every tool call. It owns the access token and a pooled
//! `reqwest::Client`; it never retries and never caches.

pub mod request;
pub mod response;

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CloudError, Result};

pub use request::{ApiRequest, AuthScheme, Body, FormPart, ResponseKind};
pub use response::ApiResponse;

/// Default Graph API host
pub const DEFAULT_BASE_URL: &str = "https://graph.facebook.com";

/// Version used when a call does not pass one
pub const DEFAULT_API_VERSION: &str = "v13.0";

/// Hosts serving media downloads besides the API itself
pub const MEDIA_HOSTS: &[&str] = &["lookaside.fbsbx.com"];

/// Environment variable holding the access token
pub const DEFAULT_TOKEN_ENV: &str = "WHATSAPP_BUSINESS_PLATFORM_API_KEY";

/// Connection settings for the Cloud API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
    /// Name of the env var read when `access_token` is unset
    pub token_env: String,
    pub access_token: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token_env: DEFAULT_TOKEN_ENV.to_string(),
            access_token: None,
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at another host (mock servers, proxies)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Resolve the token: explicit value first, then the named env var
    pub fn resolve_token(&self) -> Result<String> {
        if let Some(token) = self.access_token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(token.clone());
        }
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CloudError::MissingToken {
                env_var: self.token_env.clone(),
            })
    }
}

/// Authenticated client for the Graph API
pub struct GraphClient {
    http: Client,
    token: String,
    base_url: Url,
    api_version: String,
}

impl GraphClient {
    /// Create a client, resolving the token from config or environment
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let token = config.resolve_token()?;
        Self::with_token(token, config)
    }

    /// Create a client with an explicit token
    pub fn with_token(token: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(CloudError::MissingToken {
                env_var: config.token_env.clone(),
            });
        }

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| CloudError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CloudError::InvalidUrl(config.base_url.clone()));
        }

        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            token,
            base_url,
            api_version: config.api_version.clone(),
        })
    }

    /// Version applied to requests that do not set one
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the full URL for a request without sending it
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        if let Some(absolute) = &request.absolute_url {
            let url = Url::parse(absolute).map_err(|e| CloudError::InvalidUrl(format!("{}: {}", absolute, e)))?;
            return self.check_trusted(url);
        }

        let version = request.version.as_deref().unwrap_or(&self.api_version);
        if version.trim().is_empty() {
            return Err(CloudError::InvalidArguments("version must not be empty".to_string()));
        }
        if let Some(pos) = request.segments.iter().position(|s| s.trim().is_empty()) {
            return Err(CloudError::InvalidArguments(format!(
                "path segment {} of {} is empty",
                pos + 1,
                request.path()
            )));
        }

        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| CloudError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            path.push(version);
            path.extend(request.segments.iter());
        }

        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// The token is only ever sent to the configured origin or to Meta's media hosts over https
    fn check_trusted(&self, url: Url) -> Result<Url> {
        if url.origin() == self.base_url.origin() {
            return Ok(url);
        }
        let media_host = url.host_str().is_some_and(|h| MEDIA_HOSTS.contains(&h));
        if url.scheme() == "https" && media_host && url.port().is_none() {
            return Ok(url);
        }
        Err(CloudError::InvalidArguments(format!(
            "refusing to send credentials to untrusted URL {}",
            url.origin().ascii_serialization()
        )))
    }

    /// Send one request and return the parsed response
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request)?;
        log::debug!("{} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .header(AUTHORIZATION, request.auth.header_value(&self.token));

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(parts) => builder.multipart(build_form(parts).await?),
            Body::File { path, content_type } => {
                let bytes = tokio::fs::read(&path).await?;
                builder.header(CONTENT_TYPE, content_type).body(bytes)
            }
        };

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CloudError::from_response(status.as_u16(), &text));
        }

        match request.response {
            ResponseKind::Json => {
                let text = response.text().await?;
                if text.trim().is_empty() {
                    return Ok(ApiResponse::Json(Value::Null));
                }
                Ok(ApiResponse::Json(serde_json::from_str(&text)?))
            }
            ResponseKind::Media => {
                let content_type = response
                    .headers()
                    .get(CONTENT_TYPE)
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = response.bytes().await?.to_vec();
                Ok(ApiResponse::Media { data, content_type })
            }
        }
    }
}

async fn build_form(parts: Vec<FormPart>) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File { name, path, mime_type } => {
                let bytes = tokio::fs::read(&path).await?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload".to_string());
                let mut file_part = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime_type {
                    file_part = file_part.mime_str(&mime)?;
                }
                form.part(name, file_part)
            }
        };
    }
    Ok(form)
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GraphClient {
        GraphClient::with_token("test-token", &ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_version, "v13.0");
        assert_eq!(config.token_env, DEFAULT_TOKEN_ENV);
        assert!(config.access_token.is_none());
        assert!(config.timeout_ms.is_none());
    }

    #[test]
    fn test_config_partial_yaml() {
        let config: ClientConfig = serde_yaml::from_str("api_version: v19.0\n").unwrap();
        assert_eq!(config.api_version, "v19.0");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_resolve_explicit_token() {
        let config = ClientConfig {
            access_token: Some("explicit".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_token().unwrap(), "explicit");
    }

    #[test]
    fn test_resolve_token_from_named_env() {
        let config = ClientConfig {
            token_env: "WACLOUD_TEST_TOKEN_FROM_ENV".to_string(),
            ..Default::default()
        };
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("WACLOUD_TEST_TOKEN_FROM_ENV", "from-env");
        }
        assert_eq!(config.resolve_token().unwrap(), "from-env");
        unsafe {
            std::env::remove_var("WACLOUD_TEST_TOKEN_FROM_ENV");
        }
    }

    #[test]
    fn test_missing_token() {
        let config = ClientConfig {
            token_env: "WACLOUD_TEST_TOKEN_NEVER_SET".to_string(),
            ..Default::default()
        };
        let err = GraphClient::from_config(&config).unwrap_err();
        match err {
            CloudError::MissingToken { env_var } => assert_eq!(env_var, "WACLOUD_TEST_TOKEN_NEVER_SET"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(GraphClient::with_token("", &ClientConfig::default()).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::with_base_url("not a url");
        let err = GraphClient::with_token("t", &config).unwrap_err();
        assert!(matches!(err, CloudError::InvalidUrl(_)));
    }

    #[test]
    fn test_url_default_version() {
        let req = ApiRequest::post().segment("100").segment("messages");
        let url = client().url_for(&req).unwrap();
        assert_eq!(url.as_str(), "https://graph.facebook.com/v13.0/100/messages");
    }

    #[test]
    fn test_url_version_override_and_query() {
        let req = ApiRequest::get()
            .version(Some("v19.0".to_string()))
            .segment("42")
            .query("fields", "id,name");
        let url = client().url_for(&req).unwrap();
        assert_eq!(url.as_str(), "https://graph.facebook.com/v19.0/42?fields=id%2Cname");
    }

    #[test]
    fn test_url_segments_are_encoded() {
        let req = ApiRequest::get().segment("a b/c");
        let url = client().url_for(&req).unwrap();
        assert_eq!(url.path(), "/v13.0/a%20b%2Fc");
    }

    #[test]
    fn test_url_base_with_trailing_slash() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:1234/");
        let client = GraphClient::with_token("t", &config).unwrap();
        let url = client.url_for(&ApiRequest::get().segment("1")).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:1234/v13.0/1");
    }

    #[test]
    fn test_url_empty_segment_rejected() {
        let req = ApiRequest::get().segment("").segment("messages");
        let err = client().url_for(&req).unwrap_err();
        assert!(matches!(err, CloudError::InvalidArguments(_)));
    }

    #[test]
    fn test_url_empty_version_rejected() {
        let req = ApiRequest::get().version(Some(" ".to_string())).segment("1");
        assert!(client().url_for(&req).is_err());
    }

    #[test]
    fn test_url_absolute_passthrough() {
        let req = ApiRequest::get().absolute("https://lookaside.fbsbx.com/whatsapp_business/attachments/?mid=1");
        let url = client().url_for(&req).unwrap();
        assert_eq!(url.host_str(), Some("lookaside.fbsbx.com"));
        assert_eq!(url.query(), Some("mid=1"));
    }

    #[test]
    fn test_url_absolute_same_origin_allowed() {
        let req = ApiRequest::get().absolute("https://graph.facebook.com/v13.0/m1/content");
        assert!(client().url_for(&req).is_ok());
    }

    #[test]
    fn test_url_absolute_untrusted_rejected() {
        for url in [
            "https://attacker.example.net/steal",
            "http://lookaside.fbsbx.com/whatsapp_business/attachments/?mid=1",
            "https://lookaside.fbsbx.com:8443/x",
            "https://lookaside.fbsbx.com.attacker.net/x",
            "http://graph.facebook.com/v13.0/m1",
        ] {
            let err = client().url_for(&ApiRequest::get().absolute(url)).unwrap_err();
            assert!(matches!(err, CloudError::InvalidArguments(_)), "{url}");
            assert!(!err.to_string().contains("test-token"));
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("GraphClient"));
        assert!(!debug.contains("test-token"));
    }
}

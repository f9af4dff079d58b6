//! Successful Cloud API responses

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

/// Body of a 2xx response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Parsed JSON, passed through untouched
    Json(Value),
    /// Binary media download
    Media { data: Vec<u8>, content_type: String },
}

impl ApiResponse {
    /// Render for the agent layer; media becomes `{mediaData, contentType}`
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Media { data, content_type } => json!({
                "mediaData": STANDARD.encode(data),
                "contentType": content_type,
            }),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Media { .. } => None,
        }
    }

    /// Raw bytes when this is a media download
    pub fn media_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Media { data, .. } => Some(data),
            Self::Json(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_passthrough() {
        let body = json!({"messages": [{"id": "wamid.1"}]});
        let resp = ApiResponse::Json(body.clone());
        assert_eq!(resp.as_json(), Some(&body));
        assert!(resp.media_bytes().is_none());
        assert_eq!(resp.into_json(), body);
    }

    #[test]
    fn test_media_renders_base64() {
        let resp = ApiResponse::Media {
            data: b"hello".to_vec(),
            content_type: "image/jpeg".to_string(),
        };
        assert_eq!(resp.media_bytes(), Some(&b"hello"[..]));
        let value = resp.into_json();
        assert_eq!(value["mediaData"], "aGVsbG8=");
        assert_eq!(value["contentType"], "image/jpeg");
    }
}

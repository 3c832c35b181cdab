//! Remote content source
//!
//! Fetches a document through a GitHub-style contents API: one GET, a JSON
//! envelope whose `content` field holds base64 text. There is no retry; any
//! failure is returned to the caller, which substitutes a fallback link.

use base64::Engine;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use thiserror::Error;

use crate::config::RemoteConfig;

/// Characters escaped inside a single URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Remote fetch errors
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Remote source is not configured (owner and repo are required)")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote returned status {0}")]
    Status(u16),

    #[error("Response has no content field")]
    MissingContent,

    #[error("Invalid base64 content: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Deserialize)]
struct ContentsEnvelope {
    content: Option<String>,
}

/// Client for the configured remote repository
#[derive(Debug, Clone)]
pub struct RemoteSource {
    config: RemoteConfig,
    client: reqwest::Client,
}

impl RemoteSource {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// API URL for a repository-relative path
    pub fn url_for(&self, path: &str) -> String {
        let path = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| utf8_percent_encode(s, SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.config.api_base.trim_end_matches('/'),
            utf8_percent_encode(&self.config.owner, SEGMENT),
            utf8_percent_encode(&self.config.repo, SEGMENT),
            path,
            utf8_percent_encode(&self.config.branch, SEGMENT)
        )
    }

    /// Fetch and decode one document
    pub async fn fetch(&self, path: &str) -> Result<String, RemoteError> {
        if self.config.owner.is_empty() || self.config.repo.is_empty() {
            return Err(RemoteError::NotConfigured);
        }

        let url = self.url_for(path);
        tracing::debug!("Fetching remote content: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("folio-rs/", env!("CARGO_PKG_VERSION")))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let envelope: ContentsEnvelope = response.json().await?;
        let encoded = envelope.content.ok_or(RemoteError::MissingContent)?;
        decode_content(&encoded)
    }
}

/// Decode base64 text as returned by the contents API (wrapped with newlines)
pub fn decode_content(encoded: &str) -> Result<String, RemoteError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}


#[cfg(test)]
mod tests {
    use super::testing::{config_for, spawn};
    use super::*;
    use axum::http::StatusCode;
    use axum::{Json, Router};
    use base64::engine::general_purpose::STANDARD;

    #[test]
    fn test_url_for_encodes_segments() {
        let source = RemoteSource::new(RemoteConfig {
            owner: "someone".to_string(),
            repo: "my-website".to_string(),
            ..RemoteConfig::default()
        });
        assert_eq!(
            source.url_for("content/notes/学习之道.md"),
            "https://api.github.com/repos/someone/my-website/contents/content/notes/%E5%AD%A6%E4%B9%A0%E4%B9%8B%E9%81%93.md?ref=main"
        );
        assert_eq!(
            source.url_for("/content/a b.md"),
            "https://api.github.com/repos/someone/my-website/contents/content/a%20b.md?ref=main"
        );
    }

    #[test]
    fn test_decode_content_with_newlines() {
        let encoded = STANDARD.encode("# 你好\n\nworld");
        let (a, b) = encoded.split_at(6);
        let wrapped = format!("{}\n{}\n", a, b);
        assert_eq!(decode_content(&wrapped).unwrap(), "# 你好\n\nworld");
    }

    #[test]
    fn test_decode_content_errors() {
        assert!(matches!(decode_content("!!!"), Err(RemoteError::Decode(_))));
        let not_utf8 = STANDARD.encode([0xff, 0xfe]);
        assert!(matches!(decode_content(&not_utf8), Err(RemoteError::Utf8(_))));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let body = STANDARD.encode("remote **text**");
        let app = Router::new().fallback(move || {
            let body = body.clone();
            async move { Json(serde_json::json!({ "content": body, "encoding": "base64" })) }
        });
        let addr = spawn(app).await;

        let source = RemoteSource::new(config_for(addr));
        assert_eq!(source.fetch("content/a.md").await.unwrap(), "remote **text**");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let app = Router::new().fallback(|| async { (StatusCode::NOT_FOUND, "Not Found") });
        let addr = spawn(app).await;

        let source = RemoteSource::new(config_for(addr));
        let err = source.fetch("content/missing.md").await.unwrap_err();
        assert!(matches!(err, RemoteError::Status(404)));
    }

    #[tokio::test]
    async fn test_fetch_missing_content_field() {
        let app = Router::new()
            .fallback(|| async { Json(serde_json::json!({ "type": "dir", "entries": [] })) });
        let addr = spawn(app).await;

        let source = RemoteSource::new(config_for(addr));
        let err = source.fetch("content").await.unwrap_err();
        assert!(matches!(err, RemoteError::MissingContent));
    }

    #[tokio::test]
    async fn test_fetch_unconfigured() {
        let source = RemoteSource::new(RemoteConfig::default());
        let err = source.fetch("content/a.md").await.unwrap_err();
        assert!(matches!(err, RemoteError::NotConfigured));
    }
}

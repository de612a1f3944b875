//! Reqwest-backed translation backend.
//!
//! Owns transport details only: request serialisation, credentials, timeout,
//! HTTP error mapping and response decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use satchel_translate::{LanguagePair, Translation, TranslationError, Translator};

use crate::config::TranslatorConfig;

const API_KEY_HEADER: &str = "X-Api-Key";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequestDto<'a> {
    app_id: &'a str,
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseDto {
    source: String,
    target: String,
}

pub struct HttpTranslator {
    client: Client,
    endpoint: Url,
    app_id: String,
    secret: String,
    api_key: String,
}

impl core::fmt::Debug for HttpTranslator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HttpTranslator")
            .field("endpoint", &self.endpoint.as_str())
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

impl HttpTranslator {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        timeout: Duration,
        app_id: impl Into<String>,
        secret: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            app_id: app_id.into(),
            secret: secret.into(),
            api_key: api_key.into(),
        })
    }

    /// `Ok(None)` when no endpoint is configured.
    pub fn from_config(config: &TranslatorConfig) -> anyhow::Result<Option<Self>> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            return Ok(None);
        };
        let endpoint = Url::parse(endpoint)
            .map_err(|e| anyhow::anyhow!("invalid translator endpoint '{endpoint}': {e}"))?;
        let translator = Self::new(
            endpoint,
            config.timeout(),
            config.app_id.as_str(),
            config.secret.as_str(),
            config.api_key.as_str(),
        )?;
        Ok(Some(translator))
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(
        &self,
        pair: &LanguagePair,
        text: &str,
    ) -> Result<Translation, TranslationError> {
        let body = TranslateRequestDto {
            app_id: &self.app_id,
            from: &pair.from,
            to: &pair.to,
            text,
        };
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, self.api_key.as_str());
        }
        if !self.secret.is_empty() {
            request = request.bearer_auth(&self.secret);
        }

        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, bytes.as_ref()));
        }

        let decoded: TranslateResponseDto = serde_json::from_slice(bytes.as_ref())
            .map_err(|e| TranslationError::Decode(format!("invalid translation payload: {e}")))?;
        Ok(Translation {
            source: decoded.source,
            target: decoded.target,
        })
    }
}

fn map_transport_error(err: reqwest::Error) -> TranslationError {
    if err.is_timeout() {
        TranslationError::Timeout
    } else {
        TranslationError::Transport(err.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> TranslationError {
    let message: String = String::from_utf8_lossy(body)
        .trim()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();
    TranslationError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Stand-in used when no backend endpoint is configured.
#[derive(Debug, Default)]
pub struct UnconfiguredTranslator;

#[async_trait]
impl Translator for UnconfiguredTranslator {
    async fn translate(
        &self,
        _pair: &LanguagePair,
        _text: &str,
    ) -> Result<Translation, TranslationError> {
        Err(TranslationError::NotConfigured(
            "translator.endpoint is not set".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn pair() -> LanguagePair {
        LanguagePair::new("auto", "en")
    }

    /// Serve exactly one connection with a canned HTTP response and hand
    /// back the raw request.
    async fn one_shot_server(
        response: impl Into<String>,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        let response = response.into();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&request);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= head_end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (Url::parse(&format!("http://{addr}/translate")).unwrap(), handle)
    }

    fn translator(endpoint: Url, timeout: Duration) -> HttpTranslator {
        HttpTranslator::new(endpoint, timeout, "app-1", "s3cret", "key-1").unwrap()
    }

    #[tokio::test]
    async fn posts_credentials_and_decodes_target() {
        let body = r#"{"source":"hallo","target":"hello"}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
             content-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (url, server) = one_shot_server(response).await;

        let result = translator(url, Duration::from_secs(5))
            .translate(&pair(), "hallo")
            .await
            .unwrap();
        assert_eq!(result.target, "hello");

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.starts_with("post /translate"));
        assert!(request.contains("x-api-key: key-1"));
        assert!(request.contains("authorization: bearer s3cret"));
        assert!(request.contains(r#""appid":"app-1""#));
        assert!(request.contains(r#""from":"auto""#));
        assert!(request.contains(r#""text":"hallo""#));
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (url, _server) = one_shot_server(concat!(
            "HTTP/1.1 503 Service Unavailable\r\n",
            "content-length: 4\r\nconnection: close\r\n\r\nbusy",
        ))
        .await;

        let err = translator(url, Duration::from_secs(5))
            .translate(&pair(), "x")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TranslationError::Status {
                status: 503,
                message: "busy".into()
            }
        );
    }

    #[tokio::test]
    async fn undecodable_body_is_a_decode_error() {
        let (url, _server) = one_shot_server(
            "HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nno",
        )
        .await;

        let err = translator(url, Duration::from_secs(5))
            .translate(&pair(), "x")
            .await
            .unwrap_err();
        assert!(matches!(err, TranslationError::Decode(_)));
    }

    #[tokio::test]
    async fn silent_backend_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });
        let url = Url::parse(&format!("http://{addr}/translate")).unwrap();

        let err = translator(url, Duration::from_millis(200))
            .translate(&pair(), "x")
            .await
            .unwrap_err();
        assert_eq!(err, TranslationError::Timeout);
    }

    #[tokio::test]
    async fn unconfigured_translator_always_fails() {
        let err = UnconfiguredTranslator.translate(&pair(), "x").await.unwrap_err();
        assert!(matches!(err, TranslationError::NotConfigured(_)));
    }

    #[test]
    fn missing_endpoint_builds_nothing() {
        let config = TranslatorConfig::default();
        assert!(HttpTranslator::from_config(&config).unwrap().is_none());

        let config = TranslatorConfig {
            endpoint: Some("not a url".into()),
            ..TranslatorConfig::default()
        };
        assert!(HttpTranslator::from_config(&config).is_err());
    }
}

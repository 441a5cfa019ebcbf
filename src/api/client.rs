use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("api returned code {code}: {message}")]
    Status { code: i64, message: String },

    #[error("login required")]
    LoginRequired,

    #[error("decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Minimal surface of the music-service REST API the player depends on.
pub trait MusicApi: Send + Sync {
    /// GET `endpoint` with query `params`; resolves to the JSON body of a
    /// `code == 200` response.
    fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

#[derive(Debug)]
struct Inner {
    http: reqwest::Client,
    base_url: String,
    session: Mutex<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NcmClient {
    inner: Arc<Inner>,
}

impl NcmClient {
    pub fn new(base_url: &str, session: Option<String>) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://music.163.com/"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(15))
            .build()
            .context("build reqwest client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                session: Mutex::new(session.filter(|s| !s.is_empty())),
            }),
        })
    }

    pub fn has_session(&self) -> bool {
        self.session().is_some()
    }

    fn session(&self) -> Option<String> {
        self.inner.session.lock().ok().and_then(|s| s.clone())
    }

    fn clear_session(&self) {
        if let Ok(mut s) = self.inner.session.lock()
            && s.take().is_some()
        {
            tracing::warn!("server rejected the session cookie; cleared it");
        }
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let mut url = format!(
            "{}{}?timestamp={timestamp}&randomCNIP=true",
            self.inner.base_url, endpoint
        );
        for (k, v) in params {
            url.push_str(&format!("&{}={}", k, urlencoding::encode(v)));
        }
        if let Some(cookie) = self.session() {
            url.push_str(&format!("&cookie={}", urlencoding::encode(&cookie)));
        }
        url
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.build_url(endpoint, params);
        tracing::debug!(endpoint, "api request");
        let body = self.inner.http.get(&url).send().await?.text().await?;
        let v: Value = serde_json::from_str(&body)?;
        check_code(&v).inspect_err(|e| {
            if matches!(e, ApiError::LoginRequired) {
                self.clear_session();
            }
        })?;
        Ok(v)
    }
}

impl MusicApi for NcmClient {
    fn get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, ApiError>> + Send {
        self.fetch(endpoint, params)
    }
}

/// Maps the envelope `code` to an error; bodies without a code pass through.
fn check_code(v: &Value) -> Result<(), ApiError> {
    let Some(code) = v.get("code").and_then(Value::as_i64) else {
        return Ok(());
    };
    if code == 200 {
        return Ok(());
    }
    let message = v
        .get("message")
        .or_else(|| v.get("msg"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if code == 301 && is_login_message(&message) {
        return Err(ApiError::LoginRequired);
    }
    Err(ApiError::Status { code, message })
}

fn is_login_message(message: &str) -> bool {
    message.contains("需要登录") || message.to_ascii_lowercase().contains("login")
}

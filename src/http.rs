//! HTTP transport seam.
//!
//! [`Transport`] is the only place outbound requests leave the process.
//! [`ReqwestTransport`] is the production implementation; tests plug in a
//! scripted one to drive status codes and bodies deterministically.

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::Result;

/// Status and raw body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Sends a GET request with the given headers.
///
/// `url` already carries the query string; implementations must not
/// re-encode or reorder it, since the signature covers it byte for byte.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(&'static str, String)]) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a shared `reqwest` client using rustls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the underlying client.
    ///
    /// # Errors
    ///
    /// Returns [`StochbotError::Transport`](crate::StochbotError::Transport)
    /// if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, headers: &[(&'static str, String)]) -> Result<HttpResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

//! HTTP transport used to reach the Crowdin API.
//!
//! The client only needs one primitive: send a request, get back a status and
//! the raw body bytes. `HttpTransport` is that seam; `ReqwestTransport` is the
//! default implementation.

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use url::Url;

use crate::error::{CrowdinError, Result};

/// HTTP verbs used by the Crowdin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// One multipart form field, ready to send.
#[derive(Debug)]
pub enum FormPart {
    /// Plain text value.
    Text { name: String, value: String },
    /// Open file streamed as the field body. Dropping the part closes the file.
    File {
        name: String,
        file_name: String,
        length: u64,
        file: tokio::fs::File,
    },
}

impl FormPart {
    /// Field name of this part.
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// A fully built request: the authenticated URL and an optional form body.
#[derive(Debug)]
pub struct EndpointRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub form: Option<Vec<FormPart>>,
}

/// Status and undecoded body of a response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Single request/response primitive the client is built on.
///
/// Implementations must not decode the body; a failure to obtain any
/// response is reported as `CrowdinError::Transport`.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: EndpointRequest) -> impl Future<Output = Result<RawResponse>> + Send;
}

/// reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with default settings.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a transport that routes every request through a proxy.
    ///
    /// # Arguments
    /// * `proxy` - Proxy URL (e.g., "http://proxy:8080" or "socks5://proxy:1080")
    pub fn with_proxy(proxy: &str) -> Result<Self> {
        let proxy = reqwest::Proxy::all(proxy)
            .map_err(|e| CrowdinError::Configuration(format!("Invalid proxy: {}", e)))?;

        let client = Client::builder()
            .proxy(proxy)
            .build()
            .map_err(|e| CrowdinError::Configuration(format!("Failed to build client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (timeouts, pools and TLS are its concern).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: EndpointRequest) -> Result<RawResponse> {
        let EndpointRequest { method, url, form } = request;

        let mut builder = self.client.request(method.into(), url);
        if let Some(parts) = form {
            builder = builder.multipart(into_multipart(parts)?);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse { status, body })
    }
}

fn into_multipart(parts: Vec<FormPart>) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                length,
                file,
            } => {
                let part = Part::stream_with_length(file, length)
                    .file_name(file_name)
                    .mime_str("application/octet-stream")
                    .map_err(CrowdinError::from)?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

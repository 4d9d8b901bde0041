// API client module: a small blocking HTTP transport plus the two admin
// endpoints a theme deployment needs (upload, activate). Each call signs a
// fresh token and performs exactly one request; nothing is retried.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{DeployError, Result, TransportError};
use crate::multipart::MultipartPayload;
use crate::token::{unix_now, Credential};

pub const UPLOAD_PATH: &str = "/ghost/api/admin/themes/upload/";
pub const ACCEPT_VERSION: &str = "v5.0";

const ACCEPT_VERSION_HEADER: &str = "accept-version";
const FALLBACK_FILE_NAME: &str = "theme.zip";

/// Path of the activation endpoint for `name`.
pub fn activate_path(name: &ThemeName) -> String {
    format!("/ghost/api/admin/themes/{}/activate/", name.as_str())
}

/// A fully buffered response whose body parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Remote failure: the server answered but rejected the request.
    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }
}

/// One HTTP request/response exchange against the configured site.
pub trait Transport {
    fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<ApiResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<ApiResponse, TransportError> {
        (**self).send(method, path, headers, body)
    }
}

/// Blocking reqwest transport bound to one site origin.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    origin: Url,
}

impl HttpTransport {
    /// Build a transport for the scheme/host/port of `site`. Any path on
    /// the site URL is ignored: the admin API is rooted at the host.
    /// Redirects are not followed, so a 3xx is classified like any other
    /// response.
    pub fn new(site: &Url, timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;
        let mut origin = site.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        Ok(HttpTransport { client, origin })
    }

    fn url_for(&self, path: &str) -> Url {
        let mut url = self.origin.clone();
        url.set_path(path);
        url
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.url_for(path);
        debug!(%method, %url, "sending request");

        let mut req = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }

        let res = req
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = res.status().as_u16();
        let bytes = res
            .bytes()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        debug!(status, len = bytes.len(), "response received");

        match serde_json::from_slice(&bytes) {
            Ok(body) => Ok(ApiResponse { status, body }),
            Err(_) => Err(TransportError::Protocol {
                status,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
        }
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("origin", &self.origin.as_str())
            .finish()
    }
}

/// Name of an uploaded theme, as reported by the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeName(String);

impl ThemeName {
    /// Accepts non-empty names that can be placed in a URL path segment.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        if name.is_empty() || name.contains(['/', '?', '#']) {
            return None;
        }
        Some(ThemeName(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    themes: Vec<ThemeDescriptor>,
}

#[derive(Deserialize)]
struct ThemeDescriptor {
    name: String,
}

/// Pull the first theme's name out of a successful upload response.
pub fn theme_name_from_upload(body: &Value) -> Result<ThemeName> {
    let parsed = UploadResponse::deserialize(body)
        .map_err(|e| DeployError::MalformedResponse(format!("upload response: {e}")))?;
    let first = parsed
        .themes
        .into_iter()
        .next()
        .ok_or_else(|| DeployError::MalformedResponse("upload response lists no themes".into()))?;
    ThemeName::new(first.name.clone()).ok_or_else(|| {
        DeployError::MalformedResponse(format!("unusable theme name '{}'", first.name))
    })
}

/// The theme endpoints of the admin API, signed with one credential.
pub struct ThemesApi<T> {
    transport: T,
    credential: Credential,
}

impl<T: Transport> ThemesApi<T> {
    pub fn new(transport: T, credential: Credential) -> Self {
        ThemesApi {
            transport,
            credential,
        }
    }

    /// Common headers with a freshly minted token.
    fn auth_headers(&self) -> std::result::Result<HeaderMap, TransportError> {
        let token = self.credential.sign(unix_now());
        debug!(kid = self.credential.key_id(), exp = token.expires_at, "signed admin token");

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Ghost {}", token.compact()))?,
        );
        headers.insert(
            HeaderName::from_static(ACCEPT_VERSION_HEADER),
            HeaderValue::from_static(ACCEPT_VERSION),
        );
        Ok(headers)
    }

    /// Upload the zip at `path` and return the name the site assigned it.
    pub fn upload_theme(&self, path: &Path) -> Result<ThemeName> {
        let data = fs::read(path).map_err(|source| DeployError::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(FALLBACK_FILE_NAME);

        let payload = MultipartPayload::new(file_name, &data);
        debug!(file = file_name, bytes = payload.len(), "uploading theme");

        let headers = self
            .auth_headers()
            .and_then(|mut h| {
                h.insert(CONTENT_TYPE, HeaderValue::from_str(&payload.content_type())?);
                h.insert(CONTENT_LENGTH, HeaderValue::from(payload.len()));
                Ok(h)
            })
            .map_err(upload_error)?;

        let res = self
            .transport
            .send(Method::POST, UPLOAD_PATH, headers, Some(payload.into_bytes()))
            .map_err(upload_error)?;
        if res.is_failure() {
            return Err(DeployError::UploadFailed {
                status: Some(res.status),
                detail: res.body.to_string(),
            });
        }

        let name = theme_name_from_upload(&res.body)?;
        debug!(theme = %name, status = res.status, "theme uploaded");
        Ok(name)
    }

    /// Make `name` the site's active theme.
    pub fn activate_theme(&self, name: &ThemeName) -> Result<()> {
        let path = activate_path(name);
        let headers = self
            .auth_headers()
            .map(|mut h| {
                h.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                h
            })
            .map_err(activation_error)?;

        let res = self
            .transport
            .send(Method::PUT, &path, headers, None)
            .map_err(activation_error)?;
        if res.is_failure() {
            return Err(DeployError::ActivationFailed {
                status: Some(res.status),
                detail: res.body.to_string(),
            });
        }

        debug!(theme = %name, status = res.status, "theme activated");
        Ok(())
    }
}

fn upload_error(err: TransportError) -> DeployError {
    match err {
        TransportError::Network(msg) => DeployError::Network(format!("upload: {msg}")),
        TransportError::Protocol { status, .. } => DeployError::UploadFailed {
            status: Some(status),
            detail: err.to_string(),
        },
        TransportError::InvalidHeader(_) => DeployError::UploadFailed {
            status: None,
            detail: err.to_string(),
        },
    }
}

fn activation_error(err: TransportError) -> DeployError {
    match err {
        TransportError::Network(msg) => DeployError::Network(format!("activation: {msg}")),
        TransportError::Protocol { status, .. } => DeployError::ActivationFailed {
            status: Some(status),
            detail: err.to_string(),
        },
        TransportError::InvalidHeader(_) => DeployError::ActivationFailed {
            status: None,
            detail: err.to_string(),
        },
    }
}

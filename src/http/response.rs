//! Response metadata and completed exchanges.

use crate::base::apierror::ApiError;
use crate::http::wire::WireRequest;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::path::PathBuf;
use url::Url;

/// Status, headers and URL of a response, without its body.
///
/// The status is optional because a raw streamed response is untyped until
/// it is confirmed to be an HTTP response.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: Option<StatusCode>,
    pub headers: HeaderMap,
    pub url: Url,
}

impl ResponseMeta {
    pub fn new(status: Option<StatusCode>, headers: HeaderMap, url: Url) -> Self {
        Self {
            status,
            headers,
            url,
        }
    }

    /// The `Content-Type` value without parameters, lowercased.
    pub fn mime_type(&self) -> Option<String> {
        let value = self.headers.get(http::header::CONTENT_TYPE)?.to_str().ok()?;
        let essence = value.split(';').next()?.trim().to_ascii_lowercase();
        (!essence.is_empty()).then_some(essence)
    }
}

/// Method, URL and headers of the request that produced a response.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl From<&WireRequest> for RequestMeta {
    fn from(request: &WireRequest) -> Self {
        Self {
            method: request.method.clone(),
            url: request.url.clone(),
            headers: request.headers.clone(),
        }
    }
}

/// A buffered, successful response.
#[derive(Debug, Clone)]
pub struct Response {
    pub request: RequestMeta,
    pub meta: ResponseMeta,
    pub body: Bytes,
}

impl Response {
    pub fn status(&self) -> Option<StatusCode> {
        self.meta.status
    }

    /// Decode the body as JSON into `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::DataConversionFailed(e.to_string()))
    }

    /// Decode the body as UTF-8 text.
    pub fn text(&self) -> Result<String, ApiError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| ApiError::DataConversionFailed(e.to_string()))
    }
}

/// A successful download moved to its final location.
#[derive(Debug, Clone)]
pub struct Download {
    pub location: PathBuf,
    pub request: RequestMeta,
    pub response: ResponseMeta,
    /// The URL the file was fetched from, for re-deriving names or MIME types.
    pub remote_url: Url,
}

/// What a successful request produced.
#[derive(Debug, Clone)]
pub enum Outcome {
    Body(Response),
    File(Download),
}

impl Outcome {
    /// Decode a buffered body into `T`; a download cannot be decoded.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
        match self {
            Outcome::Body(response) => response.json(),
            Outcome::File(download) => Err(ApiError::DataConversionFailed(format!(
                "expected a response body, got file {}",
                download.location.display()
            ))),
        }
    }

    pub fn into_download(self) -> Result<Download, ApiError> {
        match self {
            Outcome::File(download) => Ok(download),
            Outcome::Body(_) => Err(ApiError::DataConversionFailed(
                "expected a downloaded file, got a response body".to_string(),
            )),
        }
    }

    pub fn response_meta(&self) -> &ResponseMeta {
        match self {
            Outcome::Body(response) => &response.meta,
            Outcome::File(download) => &download.response,
        }
    }
}

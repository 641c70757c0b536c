//! HTTP/1.1 transport over hyper, one connection per request.

use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::http::response::ResponseMeta;
use crate::http::transport::{Transport, TransportFactory};
use crate::http::wire::WireRequest;
use crate::socket::connectjob::ConnectJob;
use crate::socket::tls::TlsConfig;
use crate::tls::pinning::{PinningMaterial, TrustValidator};
use bytes::Bytes;
use http::header::{HeaderValue, HOST};
use http::Request;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::client::conn::http1;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::{NamedTempFile, TempPath};
use tokio::io::AsyncWriteExt;
use url::Url;

/// Sends requests over a fresh HTTP/1.1 connection each time.
#[derive(Debug, Clone)]
pub struct HyperTransport {
    connect: ConnectJob,
    timeout: Option<Duration>,
}

impl HyperTransport {
    pub fn new(connect: ConnectJob, timeout: Option<Duration>) -> Self {
        Self { connect, timeout }
    }

    pub fn is_pinned(&self) -> bool {
        self.connect.is_pinned()
    }

    /// Connect, handshake and send; resolves once response headers arrive.
    async fn send(&self, request: WireRequest) -> Result<http::Response<Incoming>, NetError> {
        let socket = self.connect.connect(&request.url).await?;
        let (mut sender, conn) = http1::handshake(TokioIo::new(socket))
            .await
            .map_err(map_hyper_error)?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "connection driver finished with error");
            }
        });

        let request = to_hyper_request(request)?;
        sender.send_request(request).await.map_err(map_hyper_error)
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, NetError>>,
    ) -> Result<T, NetError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut)
                .await
                .map_err(|_| NetError::ConnectionTimedOut)?,
            None => fut.await,
        }
    }
}

impl Transport for HyperTransport {
    async fn execute(&self, request: WireRequest) -> Result<(Bytes, ResponseMeta), NetError> {
        let url = request.url.clone();
        self.with_timeout(async move {
            let response = self.send(request).await?;
            let (parts, body) = response.into_parts();
            let body = body.collect().await.map_err(map_hyper_error)?.to_bytes();
            tracing::trace!(url = %url, status = %parts.status, len = body.len(), "response buffered");
            Ok((body, ResponseMeta::new(Some(parts.status), parts.headers, url)))
        })
        .await
    }

    async fn download(
        &self,
        request: WireRequest,
        dir: &Path,
    ) -> Result<(TempPath, ResponseMeta), NetError> {
        let url = request.url.clone();
        // Only connecting and waiting for headers is bounded; the body may be large.
        let response = self.with_timeout(self.send(request)).await?;
        let (parts, mut body) = response.into_parts();

        let (file, path) = NamedTempFile::new_in(dir).file_context()?.into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let mut written = 0u64;
        while let Some(frame) = body.frame().await {
            let frame = frame.map_err(map_hyper_error)?;
            if let Ok(data) = frame.into_data() {
                file.write_all(&data).await.file_context()?;
                written += data.len() as u64;
            }
        }
        file.flush().await.file_context()?;

        tracing::trace!(url = %url, status = %parts.status, written, "response streamed to disk");
        Ok((path, ResponseMeta::new(Some(parts.status), parts.headers, url)))
    }
}

/// Builds [`HyperTransport`]s sharing one TLS configuration.
#[derive(Debug, Clone)]
pub struct HyperTransportFactory {
    tls: Arc<TlsConfig>,
    timeout: Option<Duration>,
    shared: Arc<HyperTransport>,
}

impl HyperTransportFactory {
    pub fn new(tls: TlsConfig, timeout: Option<Duration>) -> Self {
        let tls = Arc::new(tls);
        let shared = Arc::new(HyperTransport::new(ConnectJob::new(tls.clone(), None), timeout));
        Self {
            tls,
            timeout,
            shared,
        }
    }
}

impl Default for HyperTransportFactory {
    fn default() -> Self {
        Self::new(TlsConfig::default(), None)
    }
}

impl TransportFactory for HyperTransportFactory {
    type Transport = HyperTransport;

    fn shared(&self) -> Arc<HyperTransport> {
        self.shared.clone()
    }

    fn pinned(&self, material: Arc<PinningMaterial>) -> HyperTransport {
        let validator = TrustValidator::new(material);
        HyperTransport::new(ConnectJob::new(self.tls.clone(), Some(validator)), self.timeout)
    }
}

fn to_hyper_request(request: WireRequest) -> Result<Request<Full<Bytes>>, NetError> {
    let mut builder = Request::builder()
        .method(request.method)
        .uri(origin_form(&request.url));
    if let Some(headers) = builder.headers_mut() {
        *headers = request.headers;
        if !headers.contains_key(HOST) {
            let host = HeaderValue::from_str(&host_header(&request.url)?)
                .map_err(|_| NetError::InvalidUrl)?;
            headers.insert(HOST, host);
        }
    }
    builder
        .body(Full::new(request.body.unwrap_or_default()))
        .map_err(|_| NetError::InvalidUrl)
}

/// Path and query, as sent on the HTTP/1.1 request line.
fn origin_form(url: &Url) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

/// `host[:port]`, the port only when it is not the scheme default.
fn host_header(url: &Url) -> Result<String, NetError> {
    let host = url.host_str().ok_or(NetError::InvalidUrl)?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn map_hyper_error(e: hyper::Error) -> NetError {
    let mapped = if e.is_timeout() {
        NetError::TimedOut
    } else if e.is_incomplete_message() {
        NetError::EmptyResponse
    } else if e.is_canceled() {
        NetError::ConnectionAborted
    } else if e.is_parse() || e.is_parse_status() {
        NetError::InvalidHttpResponse
    } else {
        NetError::ConnectionClosed
    };
    tracing::debug!(error = %e, code = mapped.as_i32(), "http exchange failed");
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_origin_form() {
        let url = Url::parse("https://api.example.com/v1/items?q=a%20b&x=1").unwrap();
        assert_eq!(origin_form(&url), "/v1/items?q=a%20b&x=1");
        let bare = Url::parse("https://api.example.com").unwrap();
        assert_eq!(origin_form(&bare), "/");
    }

    #[test]
    fn test_host_header_omits_default_port() {
        let url = Url::parse("https://api.example.com:443/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "api.example.com");
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert_eq!(host_header(&url).unwrap(), "127.0.0.1:8080");
    }

    #[test]
    fn test_hyper_request_keeps_headers_and_body() {
        let mut wire = WireRequest::new(
            Method::POST,
            Url::parse("http://localhost:9000/items").unwrap(),
        );
        wire.headers
            .insert("x-trace", HeaderValue::from_static("abc"));
        wire.body = Some(Bytes::from_static(b"{}"));

        let request = to_hyper_request(wire).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.uri(), "/items");
        assert_eq!(request.headers()["host"], "localhost:9000");
        assert_eq!(request.headers()["x-trace"], "abc");
    }

    #[test]
    fn test_factory_pins_only_on_request() {
        let factory = HyperTransportFactory::default();
        assert!(!factory.shared().is_pinned());
        let material = Arc::new(PinningMaterial::new().public_key_hash("sha256/00"));
        assert!(factory.pinned(material).is_pinned());
    }
}

//! The perform engine.
//!
//! A [`Client`] turns one [`RequestDescriptor`] into one outcome: it checks
//! connectivity, compiles the descriptor, picks a transport (pinned when
//! the descriptor carries pinning material), classifies the response and
//! either decodes the body or finalizes the downloaded file.
//!
//! # Example
//!
//! ```rust,ignore
//! use netlayer::{Client, Endpoint, RequestDescriptor, Task};
//! use std::sync::Arc;
//!
//! let endpoint = Arc::new(Endpoint::new("https", "api.example.com")?);
//! let client = Client::builder()
//!     .timeout(Duration::from_secs(30))
//!     .build();
//!
//! let item: Item = client
//!     .fetch(&RequestDescriptor::post(endpoint, "/items").task(Task::json(new_item)))
//!     .await?;
//! ```

use crate::base::apierror::ApiError;
use crate::base::neterror::NetError;
use crate::base::netlog::{RequestObserver, TracingObserver};
use crate::base::networkchange::{Reachability, ReachabilityMonitor};
use crate::http::compiler::compile;
use crate::http::download::{self, CommonMimeTypes, ExtensionResolver};
use crate::http::response::{Download, Outcome, RequestMeta, Response, ResponseMeta};
use crate::http::status::StatusFamily;
use crate::http::streamfactory::HyperTransportFactory;
use crate::http::transport::{Transport, TransportFactory};
use crate::http::wire::WireRequest;
use crate::socket::tls::TlsConfig;
use crate::urlrequest::request::RequestDescriptor;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Executes request descriptors.
///
/// Use [`Client::builder()`] to configure and create a client. Cloning is
/// cheap and clones share the transport factory and collaborators.
pub struct Client<F: TransportFactory = HyperTransportFactory> {
    factory: Arc<F>,
    reachability: Arc<dyn Reachability>,
    observer: Arc<dyn RequestObserver>,
    resolver: Arc<dyn ExtensionResolver>,
    download_dir: PathBuf,
}

impl<F: TransportFactory> Clone for Client<F> {
    fn clone(&self) -> Self {
        Self {
            factory: self.factory.clone(),
            reachability: self.reachability.clone(),
            observer: self.observer.clone(),
            resolver: self.resolver.clone(),
            download_dir: self.download_dir.clone(),
        }
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        ClientBuilder::default().build()
    }

    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }
}

impl<F: TransportFactory> Client<F> {
    /// Directory downloads are finalized into.
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Run one request to completion.
    ///
    /// Single attempt, no retries. Transport failures come back as
    /// [`ApiError::Transport`]; non-2xx statuses as [`ApiError::Http`].
    pub async fn perform(&self, descriptor: &RequestDescriptor) -> Result<Outcome, ApiError> {
        if !self.reachability.is_reachable() {
            tracing::debug!(path = %descriptor.path, "network unreachable, request not sent");
            return Err(ApiError::NoNetwork);
        }

        let request = compile(descriptor).await?;
        let download = descriptor.task.is_download();

        let (meta, result) = match descriptor.active_pinning() {
            Some(material) => {
                // Fresh transport per call, never shared between descriptors.
                let transport = self.factory.pinned(material.clone());
                self.exchange(&transport, &request, download).await
            }
            None => {
                let transport = self.factory.shared();
                self.exchange(transport.as_ref(), &request, download).await
            }
        };

        self.observer
            .did_complete(&request, meta.as_ref(), result.as_ref().err());
        result
    }

    /// Run a request and decode its JSON body into `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T, ApiError> {
        self.perform(descriptor).await?.decode()
    }

    /// Run a request for its success alone, discarding any body.
    pub async fn perform_empty(&self, descriptor: &RequestDescriptor) -> Result<(), ApiError> {
        self.perform(descriptor).await.map(|_| ())
    }

    /// Run a download request and return the finalized file.
    pub async fn download(&self, descriptor: &RequestDescriptor) -> Result<Download, ApiError> {
        self.perform(descriptor).await?.into_download()
    }

    async fn exchange<T: Transport>(
        &self,
        transport: &T,
        request: &WireRequest,
        download: bool,
    ) -> (Option<ResponseMeta>, Result<Outcome, ApiError>) {
        if download {
            return match transport.download(request.clone(), &self.download_dir).await {
                Ok((temp, meta)) => {
                    let result = self.finish_download(temp, request, &meta);
                    (Some(meta), result)
                }
                Err(e) => (None, Err(transport_failure(e))),
            };
        }

        match transport.execute(request.clone()).await {
            Ok((body, meta)) => {
                let result = classify(&meta).map(|()| {
                    Outcome::Body(Response {
                        request: RequestMeta::from(request),
                        meta: meta.clone(),
                        body,
                    })
                });
                (Some(meta), result)
            }
            Err(e) => (None, Err(transport_failure(e))),
        }
    }

    fn finish_download(
        &self,
        temp: tempfile::TempPath,
        request: &WireRequest,
        meta: &ResponseMeta,
    ) -> Result<Outcome, ApiError> {
        // On failure `temp` is dropped here and its file removed.
        classify(meta)?;
        let location = download::finalize(
            temp,
            &self.download_dir,
            &request.url,
            meta,
            self.resolver.as_ref(),
        )?;
        Ok(Outcome::File(Download {
            location,
            request: RequestMeta::from(request),
            response: meta.clone(),
            remote_url: request.url.clone(),
        }))
    }
}

/// A reply that was not HTTP at all is a response failure, not a transport one.
fn transport_failure(e: NetError) -> ApiError {
    match e {
        NetError::InvalidResponse | NetError::InvalidHttpResponse => ApiError::InvalidResponse,
        other => ApiError::Transport(other),
    }
}

/// Success for 2xx; anything else, including a missing status, is an HTTP failure.
fn classify(meta: &ResponseMeta) -> Result<(), ApiError> {
    match meta.status {
        None => Err(ApiError::missing_status()),
        Some(status) if StatusFamily::from_code(status.as_u16()).is_success() => Ok(()),
        Some(status) => Err(ApiError::from_status(status.as_u16())),
    }
}

/// Builder for creating a [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    timeout: Option<Duration>,
    download_dir: Option<PathBuf>,
    tls_options: Option<TlsConfig>,
    reachability: Option<Arc<dyn Reachability>>,
    observer: Option<Arc<dyn RequestObserver>>,
    extension_resolver: Option<Arc<dyn ExtensionResolver>>,
}

impl ClientBuilder {
    /// Set request timeout, covering connect and send.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the directory downloads are finalized into (default: OS temp dir).
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Set TLS options for the default transport.
    pub fn tls_options(mut self, opts: TlsConfig) -> Self {
        self.tls_options = Some(opts);
        self
    }

    /// Set the connectivity source checked before every request.
    pub fn reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
        self.reachability = Some(reachability);
        self
    }

    /// Set the per-attempt observer (default: [`TracingObserver`]).
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set the MIME-to-extension table used to name downloads.
    pub fn extension_resolver(mut self, resolver: Arc<dyn ExtensionResolver>) -> Self {
        self.extension_resolver = Some(resolver);
        self
    }

    /// Build a client over the hyper transport.
    pub fn build(mut self) -> Client {
        let tls = self.tls_options.take().unwrap_or_default();
        let factory = HyperTransportFactory::new(tls, self.timeout);
        self.build_with(factory)
    }

    /// Build a client over a custom transport factory.
    ///
    /// TLS options and timeout are properties of the factory and are not
    /// applied here.
    pub fn build_with<F: TransportFactory>(self, factory: F) -> Client<F> {
        Client {
            factory: Arc::new(factory),
            reachability: self
                .reachability
                .unwrap_or_else(|| Arc::new(ReachabilityMonitor::default())),
            observer: self.observer.unwrap_or_else(|| Arc::new(TracingObserver)),
            resolver: self
                .extension_resolver
                .unwrap_or_else(|| Arc::new(CommonMimeTypes)),
            download_dir: self.download_dir.unwrap_or_else(std::env::temp_dir),
        }
    }
}

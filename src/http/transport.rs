//! The boundary between the perform engine and an HTTP client.
//!
//! The engine only needs two exchanges: buffer a response in memory, or
//! stream it into a temporary file. Anything that can do both, and can be
//! rebuilt around a [`TrustValidator`](crate::tls::TrustValidator), plugs
//! in through [`TransportFactory`].

use crate::base::neterror::NetError;
use crate::http::response::ResponseMeta;
use crate::http::wire::WireRequest;
use crate::tls::pinning::PinningMaterial;
use bytes::Bytes;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempPath;

/// Executes compiled requests.
pub trait Transport: Send + Sync {
    /// Send `request` and buffer the full response body.
    fn execute(
        &self,
        request: WireRequest,
    ) -> impl Future<Output = Result<(Bytes, ResponseMeta), NetError>> + Send;

    /// Send `request` and stream the body into a temporary file under `dir`.
    ///
    /// The returned path deletes its file on drop unless persisted, so an
    /// abandoned download leaves nothing behind.
    fn download(
        &self,
        request: WireRequest,
        dir: &Path,
    ) -> impl Future<Output = Result<(TempPath, ResponseMeta), NetError>> + Send;
}

/// Produces transports, optionally bound to pinning material.
pub trait TransportFactory: Send + Sync {
    type Transport: Transport;

    /// The transport used for requests without pinning.
    fn shared(&self) -> Arc<Self::Transport>;

    /// A fresh transport whose TLS trust decisions go through a validator
    /// built from `material`.
    fn pinned(&self, material: Arc<PinningMaterial>) -> Self::Transport;
}

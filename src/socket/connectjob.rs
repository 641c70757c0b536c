use crate::base::context::IoResultExt;
use crate::base::neterror::NetError;
use crate::socket::client::SocketType;
use crate::socket::tls::TlsConfig;
use crate::tls::certificate::StoreContextChain;
use crate::tls::pinning::{Challenge, Disposition, TrustValidator};
use boring::ssl::{SslConnector, SslMethod, SslVerifyMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::net::TcpStream;
use url::Url;

/// Manages the connection process: DNS -> TCP -> TLS.
///
/// When a [`TrustValidator`] is attached, it replaces the default trust
/// decision for every TLS handshake this job performs.
#[derive(Debug, Clone)]
pub struct ConnectJob {
    tls: Arc<TlsConfig>,
    validator: Option<TrustValidator>,
}

impl ConnectJob {
    pub fn new(tls: Arc<TlsConfig>, validator: Option<TrustValidator>) -> Self {
        Self { tls, validator }
    }

    pub fn is_pinned(&self) -> bool {
        self.validator.is_some()
    }

    pub async fn connect(&self, url: &Url) -> Result<SocketType, NetError> {
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;
        let is_tls = match url.scheme() {
            "https" => true,
            "http" => false,
            _ => return Err(NetError::UnknownUrlScheme),
        };

        // 1. DNS resolution
        let bare_host = host.trim_start_matches('[').trim_end_matches(']');
        let addrs: Vec<_> = tokio::net::lookup_host((bare_host, port))
            .await
            .dns_context(bare_host)?
            .collect();
        if addrs.is_empty() {
            return Err(NetError::NameNotResolved);
        }

        // 2. TCP connect, first address that answers wins
        let mut last_err = None;
        let mut stream = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }
        let stream = match (stream, last_err) {
            (Some(s), _) => s,
            (None, Some(e)) => return Err(e).connection_context(bare_host, port),
            (None, None) => return Err(NetError::ConnectionFailed),
        };
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(host = bare_host, error = %e, "failed to set TCP_NODELAY");
        }

        if !is_tls {
            return Ok(SocketType::Tcp(stream));
        }

        // 3. TLS handshake
        let cancelled = Arc::new(AtomicBool::new(false));
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        self.tls.apply_to_builder(&mut builder)?;

        match &self.validator {
            Some(validator) => {
                let validator = validator.clone();
                let challenge_host = bare_host.to_string();
                let flag = cancelled.clone();
                let decided: OnceLock<Disposition> = OnceLock::new();
                builder.set_verify_callback(SslVerifyMode::PEER, move |preverify_ok, ctx| {
                    let disposition = *decided.get_or_init(|| {
                        let chain = StoreContextChain::new(ctx);
                        validator.evaluate(&Challenge::server_trust(&challenge_host, &chain))
                    });
                    match disposition {
                        Disposition::UseCredential => true,
                        Disposition::PerformDefaultHandling => preverify_ok,
                        Disposition::Cancel => {
                            flag.store(true, Ordering::Release);
                            false
                        }
                    }
                });
            }
            None => builder.set_verify(SslVerifyMode::PEER),
        }

        let connector = builder.build();
        let mut config = connector.configure().map_err(|_| NetError::SslProtocolError)?;
        if !TlsConfig::should_set_sni(bare_host) {
            config.set_use_server_name_indication(false);
        }

        match tokio_boring::connect(config, bare_host, stream).await {
            Ok(tls_stream) => {
                tracing::debug!(host = %bare_host, port, pinned = self.is_pinned(), "tls established");
                Ok(SocketType::Ssl(tls_stream))
            }
            Err(e) if cancelled.load(Ordering::Acquire) => {
                tracing::warn!(host = %bare_host, error = %e, "handshake cancelled by pinning");
                Err(NetError::SslPinnedKeyNotInCertChain)
            }
            Err(e) => {
                tracing::debug!(host = %bare_host, error = %e, "tls handshake failed");
                Err(NetError::SslProtocolError)
            }
        }
    }
}

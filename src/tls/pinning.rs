//! Certificate and public-key pinning for MITM prevention.
//!
//! A [`TrustValidator`] decides, per TLS handshake, whether the chain a
//! server presented is trusted because it matches pinned material, should
//! be left to the platform trust store, or must be rejected.
//!
//! Two strategies are supported and evaluated in priority order:
//! 1. Certificate pinning: a chain certificate's DER bytes equal a pinned
//!    certificate's DER bytes.
//! 2. Public-key pinning: `sha256/<hex>` of a chain certificate's public key
//!    equals a pinned hash. Survives certificate rotation when the key pair
//!    is kept.
//!
//! When certificates are pinned, hashes are never consulted, even if no
//! certificate matches.

use crate::tls::certificate::{Certificate, CertificateChain};
use std::collections::HashSet;
use std::sync::Arc;

/// Pinned trust anchors and the policy applied when they do not match.
#[derive(Debug, Clone)]
pub struct PinningMaterial {
    pub pinned_certificates: Vec<Certificate>,
    /// `sha256/<hex>` strings.
    pub pinned_public_key_hashes: HashSet<String>,
    /// Hosts pinning applies to, stored lowercase.
    pub pinned_hosts: HashSet<String>,
    pub allow_fallback: bool,
    pub enabled: bool,
}

impl Default for PinningMaterial {
    fn default() -> Self {
        Self {
            pinned_certificates: Vec::new(),
            pinned_public_key_hashes: HashSet::new(),
            pinned_hosts: HashSet::new(),
            allow_fallback: false,
            enabled: true,
        }
    }
}

impl PinningMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin a certificate.
    pub fn certificate(mut self, cert: Certificate) -> Self {
        if !self.pinned_certificates.contains(&cert) {
            self.pinned_certificates.push(cert);
        }
        self
    }

    /// Pin a public-key hash (`sha256/<hex>`).
    pub fn public_key_hash(mut self, pin: impl Into<String>) -> Self {
        self.pinned_public_key_hashes
            .insert(pin.into().to_ascii_lowercase());
        self
    }

    /// Apply pinning to connections to `host`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.pinned_hosts.insert(host.into().to_ascii_lowercase());
        self
    }

    /// Defer to the platform trust store instead of cancelling on mismatch.
    pub fn allow_fallback(mut self, allow: bool) -> Self {
        self.allow_fallback = allow;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns true when at least one certificate or hash is pinned.
    pub fn has_pins(&self) -> bool {
        !self.pinned_certificates.is_empty() || !self.pinned_public_key_hashes.is_empty()
    }

    pub fn is_pinned_host(&self, host: &str) -> bool {
        self.pinned_hosts.contains(&host.to_ascii_lowercase())
    }
}

/// Kind of authentication challenge raised during a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    ServerTrust,
    ClientCertificate,
    HttpAuth,
}

/// One authentication challenge to evaluate.
pub struct Challenge<'a> {
    pub kind: ChallengeKind,
    pub host: &'a str,
    pub chain: &'a dyn CertificateChain,
}

impl<'a> Challenge<'a> {
    pub fn server_trust(host: &'a str, chain: &'a dyn CertificateChain) -> Self {
        Self {
            kind: ChallengeKind::ServerTrust,
            host,
            chain,
        }
    }
}

/// What to do with a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Defer to the platform trust store.
    PerformDefaultHandling,
    /// Trust the presented chain.
    UseCredential,
    /// Abort the connection.
    Cancel,
}

/// Evaluates server trust against [`PinningMaterial`].
///
/// Holds only immutable configuration, so one validator may serve any
/// number of concurrent handshakes.
#[derive(Debug, Clone)]
pub struct TrustValidator {
    material: Arc<PinningMaterial>,
}

impl TrustValidator {
    pub fn new(material: Arc<PinningMaterial>) -> Self {
        Self { material }
    }

    pub fn material(&self) -> &PinningMaterial {
        &self.material
    }

    pub fn evaluate(&self, challenge: &Challenge<'_>) -> Disposition {
        if !self.material.enabled {
            return Disposition::PerformDefaultHandling;
        }
        if challenge.kind != ChallengeKind::ServerTrust {
            return Disposition::PerformDefaultHandling;
        }
        if !self.material.is_pinned_host(challenge.host) {
            tracing::debug!(host = %challenge.host, "host not pinned");
            return self.fallback();
        }

        let chain = challenge.chain.certificates();
        if self.chain_matches(&chain) {
            tracing::debug!(host = %challenge.host, "pinned trust accepted");
            Disposition::UseCredential
        } else {
            tracing::warn!(
                host = %challenge.host,
                chain_len = chain.len(),
                allow_fallback = self.material.allow_fallback,
                "server chain does not match pinned material"
            );
            self.fallback()
        }
    }

    fn chain_matches(&self, chain: &[Certificate]) -> bool {
        let material = &self.material;
        if !material.pinned_certificates.is_empty() {
            chain
                .iter()
                .any(|cert| material.pinned_certificates.contains(cert))
        } else if !material.pinned_public_key_hashes.is_empty() {
            chain.iter().any(|cert| match cert.public_key_hash() {
                Ok(pin) => material.pinned_public_key_hashes.contains(&pin),
                Err(_) => false,
            })
        } else {
            // Nothing pinned never counts as a match.
            false
        }
    }

    fn fallback(&self) -> Disposition {
        if self.material.allow_fallback {
            Disposition::PerformDefaultHandling
        } else {
            Disposition::Cancel
        }
    }
}

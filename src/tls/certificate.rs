//! Certificates and certificate chains as seen by the trust validator.

use crate::base::neterror::NetError;
use boring::bn::BigNumContext;
use boring::ec::PointConversionForm;
use boring::hash::{hash, MessageDigest};
use boring::pkey::Id;
use boring::x509::{X509StoreContextRef, X509};
use bytes::Bytes;
use std::fmt;

/// Prefix of every formatted public-key pin.
pub const PIN_PREFIX: &str = "sha256/";

/// A DER-encoded X.509 certificate.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Certificate {
    der: Bytes,
}

impl Certificate {
    pub fn from_der(der: impl Into<Bytes>) -> Self {
        Self { der: der.into() }
    }

    /// Parse a PEM certificate and keep its DER encoding.
    pub fn from_pem(pem: &[u8]) -> Result<Self, NetError> {
        let cert = X509::from_pem(pem).map_err(|_| NetError::SslServerCertBadFormat)?;
        let der = cert.to_der().map_err(|_| NetError::SslServerCertBadFormat)?;
        Ok(Self::from_der(der))
    }

    /// Raw encoded bytes, compared byte-for-byte when pinning certificates.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// External representation of the certificate's public key.
    ///
    /// RSA keys export as PKCS#1 `RSAPublicKey` DER, EC keys as the X9.63
    /// uncompressed point, anything else as SubjectPublicKeyInfo DER.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, NetError> {
        let cert = X509::from_der(&self.der).map_err(|_| NetError::SslServerCertBadFormat)?;
        let key = cert
            .public_key()
            .map_err(|_| NetError::SslServerCertBadFormat)?;

        let exported = if key.id() == Id::RSA {
            key.rsa().and_then(|rsa| rsa.public_key_to_der_pkcs1())
        } else if key.id() == Id::EC {
            key.ec_key().and_then(|ec| {
                let mut ctx = BigNumContext::new()?;
                ec.public_key()
                    .to_bytes(ec.group(), PointConversionForm::UNCOMPRESSED, &mut ctx)
            })
        } else {
            key.public_key_to_der()
        };

        exported.map_err(|_| NetError::SslServerCertBadFormat)
    }

    /// `sha256/<hex>` over [`public_key_bytes`](Self::public_key_bytes).
    pub fn public_key_hash(&self) -> Result<String, NetError> {
        let key = self.public_key_bytes()?;
        let digest =
            hash(MessageDigest::sha256(), &key).map_err(|_| NetError::SslServerCertBadFormat)?;
        Ok(format_pin(&digest))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("der_len", &self.der.len())
            .finish()
    }
}

/// Format a SHA-256 digest as `sha256/<lowercase hex>`.
pub fn format_pin(digest: &[u8]) -> String {
    let mut pin = String::with_capacity(PIN_PREFIX.len() + digest.len() * 2);
    pin.push_str(PIN_PREFIX);
    for byte in digest {
        pin.push_str(&format!("{:02x}", byte));
    }
    pin
}

/// Enumerates the certificate chain a server presented, leaf first.
///
/// Keeps trust evaluation independent of how a TLS library exposes chains.
pub trait CertificateChain {
    fn certificates(&self) -> Vec<Certificate>;
}

impl CertificateChain for Vec<Certificate> {
    fn certificates(&self) -> Vec<Certificate> {
        self.clone()
    }
}

/// Chain view over a BoringSSL verification context.
pub struct StoreContextChain<'a> {
    ctx: &'a X509StoreContextRef,
}

impl<'a> StoreContextChain<'a> {
    pub fn new(ctx: &'a X509StoreContextRef) -> Self {
        Self { ctx }
    }
}

impl CertificateChain for StoreContextChain<'_> {
    fn certificates(&self) -> Vec<Certificate> {
        let Some(chain) = self.ctx.chain() else {
            return Vec::new();
        };
        chain
            .iter()
            .filter_map(|cert| cert.to_der().ok())
            .map(Certificate::from_der)
            .collect()
    }
}

//! Socket and connection establishment.
//!
//! - [`connectjob`]: DNS → TCP → TLS connection flow, with the optional
//!   pinning trust callback
//! - [`client`]: the connected stream, plain or TLS
//! - [`tls`]: TLS configuration with BoringSSL

pub mod client;
pub mod connectjob;
pub mod tls;

pub use client::SocketType;
pub use connectjob::ConnectJob;
pub use tls::TlsConfig;

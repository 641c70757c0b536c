//! # netlayer
//!
//! A declarative HTTP request pipeline for Rust.
//!
//! Callers describe *what* to send with an [`Endpoint`] and a
//! [`RequestDescriptor`]; the [`Client`] compiles it into a wire request,
//! sends it over a BoringSSL-backed HTTP/1.1 transport and returns a decoded
//! body, a finalized download or a typed [`ApiError`].
//!
//! ## Features
//!
//! - **Request tasks**: query parameters, JSON bodies, file and multipart
//!   uploads, plain and resumable downloads
//! - **Header merging**: defaults, then request headers, then auth headers
//! - **Trust pinning**: certificate or `sha256/` public-key pins per host,
//!   with an explicit fallback policy
//! - **Connectivity gate**: requests fail fast with `NoNetwork` while the
//!   reachability snapshot says the network is down
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netlayer::{Client, Endpoint, RequestDescriptor, Task};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netlayer::ApiError> {
//!     let endpoint = Arc::new(Endpoint::new("https", "api.example.com")?);
//!     let client = Client::new();
//!     let items: serde_json::Value = client
//!         .fetch(&RequestDescriptor::get(endpoint, "/items").task(Task::query([("page", serde_json::json!(2))])))
//!         .await?;
//!     println!("{items}");
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error taxonomy, transport error codes, reachability, observers
//! - [`http`] - Request compilation, multipart bodies, responses, transports
//! - [`socket`] - DNS, TCP and TLS connection establishment
//! - [`tls`] - Certificates and trust pinning
//! - [`urlrequest`] - Endpoints and request descriptors

pub mod base;
pub mod client;
pub mod http;
pub mod socket;
pub mod tls;
pub mod urlrequest;

pub use base::{ApiError, NetError};
pub use client::{Client, ClientBuilder};
pub use http::{Download, Outcome};
pub use tls::{Certificate, PinningMaterial};
pub use urlrequest::{Endpoint, MultipartField, ProtocolStyle, RequestDescriptor, Task};

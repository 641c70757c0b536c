//! Declarative request descriptions.
//!
//! An [`Endpoint`] names a server; a [`RequestDescriptor`] names one
//! operation against it. Neither performs I/O.

pub mod endpoint;
pub mod request;

pub use endpoint::Endpoint;
pub use request::{JsonPayload, MultipartField, ProtocolStyle, RequestDescriptor, Task};

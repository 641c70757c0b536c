pub mod compiler;
pub mod download;
pub mod headers;
pub mod multipart;
pub mod response;
pub mod status;
pub mod streamfactory;
pub mod transport;
pub mod wire;

// Re-exports for convenience
pub use compiler::compile;
pub use download::{CommonMimeTypes, ExtensionResolver};
pub use headers::HeaderSet;
pub use response::{Download, Outcome, RequestMeta, Response, ResponseMeta};
pub use status::StatusFamily;
pub use streamfactory::{HyperTransport, HyperTransportFactory};
pub use transport::{Transport, TransportFactory};
pub use wire::WireRequest;

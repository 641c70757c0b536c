//! Base types and error handling.
//!
//! Provides foundational types shared by every layer:
//! - [`ApiError`]: the closed failure taxonomy returned to callers
//! - [`NetError`]: transport error codes matching `net_error_list.h`
//! - [`ReachabilityMonitor`]: the connectivity snapshot checked before each request
//! - [`RequestObserver`]: per-attempt completion reporting

pub mod apierror;
pub mod context;
pub mod netlog;
pub mod networkchange;
pub mod neterror;

pub use apierror::ApiError;
pub use netlog::{NullObserver, RequestObserver, TracingObserver};
pub use networkchange::{PathStatus, Reachability, ReachabilityMonitor};
pub use neterror::NetError;

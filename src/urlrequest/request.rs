use crate::http::headers::HeaderSet;
use crate::tls::pinning::PinningMaterial;
use crate::urlrequest::endpoint::Endpoint;
use bytes::Bytes;
use http::Method;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Protocol style of a request. Only REST is implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolStyle {
    #[default]
    Rest,
    Soap,
}

/// A value that can be serialized into a JSON request body.
pub trait JsonPayload: Send + Sync {
    fn to_json(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T> JsonPayload for T
where
    T: serde::Serialize + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// One field of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartField {
    Text(String),
    File {
        data: Bytes,
        file_name: String,
        mime_type: String,
    },
}

impl MultipartField {
    pub fn text(value: impl Into<String>) -> Self {
        MultipartField::Text(value.into())
    }

    pub fn file(
        data: impl Into<Bytes>,
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        MultipartField::File {
            data: data.into(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// The shape of a single request's body and behavior.
#[derive(Clone)]
pub enum Task {
    /// No body.
    Plain,
    /// Appended to the URL as query items; values are stringified.
    QueryParameters(serde_json::Map<String, serde_json::Value>),
    /// JSON-serialized body.
    JsonBody(Arc<dyn JsonPayload>),
    /// Raw bytes read from a local file.
    UploadFile(PathBuf),
    /// `multipart/form-data` body, fields emitted in order.
    UploadMultipart(Vec<(String, MultipartField)>),
    /// Body passthrough, with a `Range` header when `offset` is set.
    DownloadResumable {
        body: Option<Bytes>,
        offset: Option<u64>,
    },
    /// No body; the response is streamed to a file.
    Download,
}

impl Task {
    pub fn json<T>(value: T) -> Self
    where
        T: serde::Serialize + Send + Sync + 'static,
    {
        Task::JsonBody(Arc::new(value))
    }

    pub fn query<I, K>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        Task::QueryParameters(params.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns true for tasks whose response is streamed to disk.
    pub fn is_download(&self) -> bool {
        match self {
            Task::Download | Task::DownloadResumable { .. } => true,
            Task::Plain
            | Task::QueryParameters(_)
            | Task::JsonBody(_)
            | Task::UploadFile(_)
            | Task::UploadMultipart(_) => false,
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Plain => f.write_str("Plain"),
            Task::QueryParameters(params) => f.debug_tuple("QueryParameters").field(params).finish(),
            Task::JsonBody(_) => f.write_str("JsonBody(..)"),
            Task::UploadFile(path) => f.debug_tuple("UploadFile").field(path).finish(),
            Task::UploadMultipart(fields) => {
                let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
                f.debug_tuple("UploadMultipart").field(&names).finish()
            }
            Task::DownloadResumable { body, offset } => f
                .debug_struct("DownloadResumable")
                .field("body_len", &body.as_ref().map(|b| b.len()))
                .field("offset", offset)
                .finish(),
            Task::Download => f.write_str("Download"),
        }
    }
}

/// Declarative description of one operation against an [`Endpoint`].
///
/// Built per call and consumed once by [`Client::perform`](crate::client::Client::perform).
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub endpoint: Arc<Endpoint>,
    pub path: String,
    pub method: Method,
    pub protocol: ProtocolStyle,
    pub task: Task,
    pub headers: HeaderSet,
    pub auth_headers: HeaderSet,
    pub pinning: Option<Arc<PinningMaterial>>,
}

impl RequestDescriptor {
    pub fn new(endpoint: Arc<Endpoint>, method: Method, path: impl Into<String>) -> Self {
        Self {
            endpoint,
            path: path.into(),
            method,
            protocol: ProtocolStyle::Rest,
            task: Task::Plain,
            headers: HeaderSet::new(),
            auth_headers: HeaderSet::new(),
            pinning: None,
        }
    }

    pub fn get(endpoint: Arc<Endpoint>, path: impl Into<String>) -> Self {
        Self::new(endpoint, Method::GET, path)
    }

    pub fn post(endpoint: Arc<Endpoint>, path: impl Into<String>) -> Self {
        Self::new(endpoint, Method::POST, path)
    }

    pub fn put(endpoint: Arc<Endpoint>, path: impl Into<String>) -> Self {
        Self::new(endpoint, Method::PUT, path)
    }

    pub fn patch(endpoint: Arc<Endpoint>, path: impl Into<String>) -> Self {
        Self::new(endpoint, Method::PATCH, path)
    }

    pub fn delete(endpoint: Arc<Endpoint>, path: impl Into<String>) -> Self {
        Self::new(endpoint, Method::DELETE, path)
    }

    pub fn task(mut self, task: Task) -> Self {
        self.task = task;
        self
    }

    pub fn protocol(mut self, protocol: ProtocolStyle) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn auth_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_headers.insert(name, value);
        self
    }

    pub fn pinning(mut self, pinning: Arc<PinningMaterial>) -> Self {
        self.pinning = Some(pinning);
        self
    }

    /// Pinning material that actually carries pins.
    pub fn active_pinning(&self) -> Option<&Arc<PinningMaterial>> {
        self.pinning.as_ref().filter(|p| p.has_pins())
    }
}

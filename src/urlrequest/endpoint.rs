use crate::base::apierror::ApiError;
use url::Url;

/// Identity of a logical server: scheme, host, optional port and API root.
///
/// The base URL is validated once, at construction, so a malformed
/// endpoint fails at configuration time instead of on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    scheme: String,
    host: String,
    port: Option<u16>,
    api_root: Option<String>,
    base_url: String,
}

impl Endpoint {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_parts(scheme.into(), host.into(), None, None)
    }

    /// Parse an endpoint from a base URL such as `https://api.example.com:8443/v2`.
    pub fn parse(base: &str) -> Result<Self, ApiError> {
        let url = Url::parse(base).map_err(|_| ApiError::InvalidUrl(base.to_string()))?;
        let host = url
            .host_str()
            .ok_or_else(|| ApiError::InvalidUrl(base.to_string()))?
            .to_string();
        let root = url.path().trim_end_matches('/');
        let api_root = (!root.is_empty()).then(|| root.to_string());
        Self::with_parts(url.scheme().to_string(), host, url.port(), api_root)
    }

    /// Set an explicit port.
    pub fn port(self, port: u16) -> Result<Self, ApiError> {
        Self::with_parts(self.scheme, self.host, Some(port), self.api_root)
    }

    /// Set the path every request path is appended to, e.g. `/api/v1`.
    pub fn api_root(self, root: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_parts(self.scheme, self.host, self.port, Some(root.into()))
    }

    fn with_parts(
        scheme: String,
        host: String,
        port: Option<u16>,
        api_root: Option<String>,
    ) -> Result<Self, ApiError> {
        let api_root = api_root
            .map(|root| root.trim_matches('/').to_string())
            .filter(|root| !root.is_empty());

        let mut base_url = format!("{}://{}", scheme, host);
        if let Some(port) = port {
            base_url.push_str(&format!(":{}", port));
        }
        if let Some(ref root) = api_root {
            base_url.push('/');
            base_url.push_str(root);
        }

        let parsed = Url::parse(&base_url).map_err(|_| ApiError::InvalidUrl(base_url.clone()))?;
        if parsed.host_str().is_none() {
            return Err(ApiError::InvalidUrl(base_url));
        }

        Ok(Self {
            scheme,
            host,
            port,
            api_root,
            base_url,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn get_port(&self) -> Option<u16> {
        self.port
    }

    pub fn get_api_root(&self) -> Option<&str> {
        self.api_root.as_deref()
    }

    /// `scheme://host[:port][/root]`, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Concatenate the base URL and a request path verbatim.
    pub fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

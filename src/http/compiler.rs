//! Request compilation: [`RequestDescriptor`] to [`WireRequest`].
//!
//! Compilation either yields a complete request or fails; nothing is sent
//! for a descriptor that did not compile.

use crate::base::apierror::ApiError;
use crate::http::headers::HeaderSet;
use crate::http::multipart::{generate_boundary, Form};
use crate::http::wire::WireRequest;
use crate::urlrequest::request::{ProtocolStyle, RequestDescriptor, Task};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use http::HeaderMap;
use url::Url;

/// Compile a descriptor into a transport-ready request.
pub async fn compile(descriptor: &RequestDescriptor) -> Result<WireRequest, ApiError> {
    if descriptor.protocol == ProtocolStyle::Soap {
        return Err(ApiError::SoapUnsupported);
    }

    let raw_url = descriptor.endpoint.join(&descriptor.path);
    let url = Url::parse(&raw_url).map_err(|_| ApiError::InvalidUrl(raw_url.clone()))?;

    let headers = HeaderSet::layered_header_map(
        &HeaderSet::defaults(),
        &descriptor.headers,
        &descriptor.auth_headers,
    )?;

    let mut request = WireRequest::new(descriptor.method.clone(), url);
    request.headers = headers;

    apply_task(&mut request, &descriptor.task).await?;

    tracing::trace!(
        method = %request.method,
        url = %request.url,
        body_len = request.body_len(),
        "compiled request"
    );
    Ok(request)
}

async fn apply_task(request: &mut WireRequest, task: &Task) -> Result<(), ApiError> {
    match task {
        Task::Plain | Task::Download => {}
        Task::QueryParameters(params) => {
            if !params.is_empty() {
                let mut pairs = request.url.query_pairs_mut();
                for (key, value) in params {
                    pairs.append_pair(key, &query_value(value));
                }
            }
        }
        Task::JsonBody(payload) => {
            let body = payload
                .to_json()
                .map_err(|e| ApiError::DataConversionFailed(e.to_string()))?;
            set_header(&mut request.headers, CONTENT_TYPE, "application/json")?;
            set_body(request, Bytes::from(body))?;
        }
        Task::UploadFile(path) => {
            let body = tokio::fs::read(path).await.map_err(|e| {
                ApiError::DataConversionFailed(format!("{}: {}", path.display(), e))
            })?;
            request.body = Some(Bytes::from(body));
        }
        Task::UploadMultipart(fields) => {
            let form = Form::new(generate_boundary()?, fields)?;
            set_header(&mut request.headers, CONTENT_TYPE, &form.content_type())?;
            set_body(request, form.into_body())?;
        }
        Task::DownloadResumable { body, offset } => {
            request.body = body.clone();
            if let Some(offset) = offset {
                set_header(&mut request.headers, RANGE, &format!("bytes={}-", offset))?;
            }
        }
    }
    Ok(())
}

/// Set the body together with its `Content-Length`.
fn set_body(request: &mut WireRequest, body: Bytes) -> Result<(), ApiError> {
    set_header(&mut request.headers, CONTENT_LENGTH, &body.len().to_string())?;
    request.body = Some(body);
    Ok(())
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), ApiError> {
    let value = HeaderValue::from_str(value)
        .map_err(|_| ApiError::StringConversionFailed(format!("value of header {name}")))?;
    headers.insert(name, value);
    Ok(())
}

/// String form of a query value.
fn query_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::urlrequest::endpoint::Endpoint;
    use serde_json::json;
    use std::sync::Arc;

    fn endpoint() -> Arc<Endpoint> {
        Arc::new(Endpoint::new("https", "api.example.com").unwrap())
    }

    #[test]
    fn test_query_value() {
        assert_eq!(query_value(&json!("text")), "text");
        assert_eq!(query_value(&json!(42)), "42");
        assert_eq!(query_value(&json!(true)), "true");
        assert_eq!(query_value(&json!(null)), "");
        assert_eq!(query_value(&json!([1, 2])), "[1,2]");
    }

    #[tokio::test]
    async fn test_plain_has_no_body() {
        let req = compile(&RequestDescriptor::get(endpoint(), "/items"))
            .await
            .unwrap();
        assert!(req.body.is_none());
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_soap_rejected_before_url_check() {
        let descriptor = RequestDescriptor::get(endpoint(), "/bad path with spaces %zz")
            .protocol(ProtocolStyle::Soap);
        assert!(matches!(
            compile(&descriptor).await,
            Err(ApiError::SoapUnsupported)
        ));
    }

    #[tokio::test]
    async fn test_invalid_url() {
        // Concatenated onto the authority, this becomes an out-of-range port.
        let descriptor = RequestDescriptor::get(endpoint(), ":99999");
        assert!(matches!(
            compile(&descriptor).await,
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_json_serialization_failure() {
        use std::collections::HashMap;
        // JSON object keys must be strings.
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let descriptor = RequestDescriptor::post(endpoint(), "/items").task(Task::json(bad));
        assert!(matches!(
            compile(&descriptor).await,
            Err(ApiError::DataConversionFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_resumable_range_header() {
        let descriptor = RequestDescriptor::get(endpoint(), "/big.bin").task(Task::DownloadResumable {
            body: Some(Bytes::from_static(b"resume-token")),
            offset: Some(1024),
        });
        let req = compile(&descriptor).await.unwrap();
        assert_eq!(req.header("range"), Some("bytes=1024-"));
        assert_eq!(req.body.as_deref(), Some(&b"resume-token"[..]));
    }

    #[tokio::test]
    async fn test_resumable_without_offset() {
        let descriptor = RequestDescriptor::get(endpoint(), "/big.bin").task(Task::DownloadResumable {
            body: None,
            offset: None,
        });
        let req = compile(&descriptor).await.unwrap();
        assert!(req.header("range").is_none());
        assert!(req.body.is_none());
    }
}

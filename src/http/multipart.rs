//! Multipart form data support.
//!
//! Provides RFC 2046 multipart/form-data encoding for uploads. Fields are
//! written in the order given, every line ends with `\r\n`, and the body
//! closes with `--boundary--\r\n`.
//!
//! # Example
//! ```ignore
//! use netlayer::http::multipart::Form;
//! use netlayer::urlrequest::MultipartField;
//!
//! let fields = vec![
//!     ("username".to_string(), MultipartField::text("user123")),
//!     ("file".to_string(), MultipartField::file(b"hi".to_vec(), "doc.txt", "text/plain")),
//! ];
//! let form = Form::new(generate_boundary()?, &fields)?;
//! let body = form.into_body();
//! ```

use crate::base::apierror::ApiError;
use crate::urlrequest::request::MultipartField;
use bytes::{BufMut, Bytes, BytesMut};
use std::borrow::Cow;

/// Longest boundary allowed by RFC 2046.
const MAX_BOUNDARY_LEN: usize = 70;

/// A validated multipart form ready to be serialized.
#[derive(Debug)]
pub struct Form<'a> {
    boundary: String,
    fields: &'a [(String, MultipartField)],
}

impl<'a> Form<'a> {
    /// Validate the boundary and every field's header text.
    pub fn new(
        boundary: impl Into<String>,
        fields: &'a [(String, MultipartField)],
    ) -> Result<Self, ApiError> {
        let boundary = boundary.into();
        if boundary.is_empty()
            || boundary.len() > MAX_BOUNDARY_LEN
            || !boundary.bytes().all(|b| b.is_ascii_graphic())
        {
            return Err(ApiError::StringConversionFailed(format!(
                "multipart boundary {boundary:?}"
            )));
        }

        for (name, field) in fields {
            header_safe(name)?;
            if let MultipartField::File {
                file_name,
                mime_type,
                ..
            } = field
            {
                header_safe(file_name)?;
                header_safe(mime_type)?;
            }
        }

        Ok(Self { boundary, fields })
    }

    /// Get the boundary string.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Get the Content-Type header value.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Compute the total content length.
    pub fn content_length(&self) -> usize {
        let mut length = 0usize;

        for (name, field) in self.fields {
            // --boundary\r\n
            length += 2 + self.boundary.len() + 2;
            // headers, blank line
            length += format_headers(name, field).len() + 4;
            // body\r\n
            length += field_data(field).len() + 2;
        }

        // --boundary--\r\n
        length + 2 + self.boundary.len() + 4
    }

    /// Serialize the form into body bytes.
    pub fn into_body(self) -> Bytes {
        let mut output = BytesMut::with_capacity(self.content_length());

        for (name, field) in self.fields {
            output.put_slice(b"--");
            output.put_slice(self.boundary.as_bytes());
            output.put_slice(b"\r\n");

            output.put_slice(format_headers(name, field).as_bytes());
            output.put_slice(b"\r\n\r\n");

            output.put_slice(field_data(field));
            output.put_slice(b"\r\n");
        }

        output.put_slice(b"--");
        output.put_slice(self.boundary.as_bytes());
        output.put_slice(b"--\r\n");

        output.freeze()
    }
}

/// Build a multipart body from ordered fields with the given boundary.
pub fn build(fields: &[(String, MultipartField)], boundary: &str) -> Result<Bytes, ApiError> {
    Ok(Form::new(boundary, fields)?.into_body())
}

fn field_data(field: &MultipartField) -> &[u8] {
    match field {
        MultipartField::Text(value) => value.as_bytes(),
        MultipartField::File { data, .. } => data.as_ref(),
    }
}

/// Format the part headers, without the trailing blank line.
fn format_headers(name: &str, field: &MultipartField) -> String {
    let mut header = format!(
        "Content-Disposition: form-data; name=\"{}\"",
        escape_quotes(name)
    );

    if let MultipartField::File {
        file_name,
        mime_type,
        ..
    } = field
    {
        header.push_str(&format!("; filename=\"{}\"", escape_quotes(file_name)));
        header.push_str(&format!("\r\nContent-Type: {}", mime_type));
    }

    header
}

/// Reject text that would break out of a part header line.
fn header_safe(s: &str) -> Result<(), ApiError> {
    if s.contains(['\r', '\n', '\0']) {
        Err(ApiError::StringConversionFailed(format!(
            "multipart header text {s:?}"
        )))
    } else {
        Ok(())
    }
}

/// Escape quotes and backslashes in a string.
fn escape_quotes(s: &str) -> Cow<'_, str> {
    if s.contains('"') || s.contains('\\') {
        Cow::Owned(s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        Cow::Borrowed(s)
    }
}

/// Generate an unguessable boundary from 128 random bits.
pub fn generate_boundary() -> Result<String, ApiError> {
    let mut raw = [0u8; 16];
    boring::rand::rand_bytes(&mut raw)
        .map_err(|_| ApiError::StringConversionFailed("multipart boundary".to_string()))?;

    let hex: String = raw.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(format!("netlayer-boundary-{}", hex))
}

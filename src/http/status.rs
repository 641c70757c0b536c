//! Status code bucketing.

use std::fmt;

/// Classification of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFamily {
    /// 100-199
    Informational,
    /// 200-299
    Success,
    /// 300-399
    Redirect,
    /// 400-499
    ClientError,
    /// 500-599
    ServerError,
    /// Anything outside 100-599.
    Unknown,
}

impl StatusFamily {
    pub fn from_code(code: u16) -> Self {
        match code {
            100..=199 => StatusFamily::Informational,
            200..=299 => StatusFamily::Success,
            300..=399 => StatusFamily::Redirect,
            400..=499 => StatusFamily::ClientError,
            500..=599 => StatusFamily::ServerError,
            _ => StatusFamily::Unknown,
        }
    }

    pub fn is_success(self) -> bool {
        self == StatusFamily::Success
    }
}

impl fmt::Display for StatusFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusFamily::Informational => "informational",
            StatusFamily::Success => "success",
            StatusFamily::Redirect => "redirect",
            StatusFamily::ClientError => "client error",
            StatusFamily::ServerError => "server error",
            StatusFamily::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

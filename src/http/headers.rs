use crate::base::apierror::ApiError;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use std::str::FromStr;

/// Header defaults applied before descriptor and auth headers.
pub const DEFAULT_HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
];

/// An insertion-ordered header mapping with case-sensitive keys.
///
/// Keys are compared byte-for-byte: `Accept` and `accept` are distinct
/// entries until the set is lowered into an [`http::HeaderMap`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// The default `Content-Type`/`Accept` pair.
    pub fn defaults() -> Self {
        let mut set = Self::new();
        for (name, value) in DEFAULT_HEADERS {
            set.insert(name, value);
        }
        set
    }

    /// Update in place if the key exists, else append.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some((_, v)) = self.headers.iter_mut().find(|(n, _)| *n == name) {
            *v = value;
        } else {
            self.headers.push((name, value));
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.headers.retain(|(n, _)| n != name);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Copy every entry of `other` over this set; `other` wins on collision.
    pub fn overlay(&mut self, other: &HeaderSet) {
        for (name, value) in &other.headers {
            self.insert(name.clone(), value.clone());
        }
    }

    /// `base` overridden by `explicit`, overridden by `auth`.
    pub fn merged(base: &HeaderSet, explicit: &HeaderSet, auth: &HeaderSet) -> HeaderSet {
        let mut merged = base.clone();
        merged.overlay(explicit);
        merged.overlay(auth);
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Lower into an [`http::HeaderMap`], validating names and values.
    pub fn to_header_map(&self) -> Result<HeaderMap, ApiError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        self.lower_into(&mut map)?;
        Ok(map)
    }

    /// Lower `base`, `explicit` and `auth` in that order into one map.
    ///
    /// Wire names are case-insensitive, so keys that differ only in case
    /// collapse here and the later layer wins regardless of position.
    pub fn layered_header_map(
        base: &HeaderSet,
        explicit: &HeaderSet,
        auth: &HeaderSet,
    ) -> Result<HeaderMap, ApiError> {
        let mut map = HeaderMap::with_capacity(base.len() + explicit.len() + auth.len());
        for layer in [base, explicit, auth] {
            layer.lower_into(&mut map)?;
        }
        Ok(map)
    }

    fn lower_into(&self, map: &mut HeaderMap) -> Result<(), ApiError> {
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_str(name)
                .map_err(|_| ApiError::StringConversionFailed(format!("header name {name:?}")))?;
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                ApiError::StringConversionFailed(format!("value of header {name:?}"))
            })?;
            map.insert(header_name, header_value);
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = HeaderSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut headers = HeaderSet::new();
        headers.insert("Content-Type", "application/json");
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut headers = HeaderSet::new();
        headers.insert("ACCEPT", "text/html");
        assert!(headers.get("accept").is_none());
        assert_eq!(headers.get("ACCEPT"), Some("text/html"));
    }

    #[test]
    fn test_update_existing_header() {
        let mut headers = HeaderSet::new();
        headers.insert("Host", "example.com");
        headers.insert("Host", "updated.com");
        assert_eq!(headers.get("Host"), Some("updated.com"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_remove_header() {
        let mut headers = HeaderSet::new();
        headers.insert("X-Custom", "value");
        headers.remove("X-Custom");
        assert!(headers.get("X-Custom").is_none());
    }

    #[test]
    fn test_defaults() {
        let headers = HeaderSet::defaults();
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
        assert_eq!(headers.get("Accept"), Some("application/json"));
    }

    #[test]
    fn test_merge_precedence() {
        let base: HeaderSet = [("A", "base"), ("B", "base")].into_iter().collect();
        let explicit: HeaderSet = [("B", "explicit"), ("C", "explicit")].into_iter().collect();
        let auth: HeaderSet = [("C", "auth"), ("D", "auth")].into_iter().collect();

        let merged = HeaderSet::merged(&base, &explicit, &auth);
        assert_eq!(merged.get("A"), Some("base"));
        assert_eq!(merged.get("B"), Some("explicit"));
        assert_eq!(merged.get("C"), Some("auth"));
        assert_eq!(merged.get("D"), Some("auth"));
        assert!(merged.get("E").is_none());
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_invalid_header_name() {
        let headers: HeaderSet = [("Invalid Header", "value")].into_iter().collect();
        assert!(matches!(
            headers.to_header_map(),
            Err(ApiError::StringConversionFailed(_))
        ));
    }

    #[test]
    fn test_invalid_header_value() {
        let headers: HeaderSet = [("Valid", "invalid\nvalue")].into_iter().collect();
        assert!(headers.to_header_map().is_err());
    }

    #[test]
    fn test_to_header_map_preserves_values() {
        let headers: HeaderSet = [("Host", "example.com"), ("Accept", "*/*")]
            .into_iter()
            .collect();
        let map = headers.to_header_map().unwrap();
        assert_eq!(map.get("host").unwrap(), "example.com");
        assert_eq!(map.get("accept").unwrap(), "*/*");
    }

    #[test]
    fn test_layered_map_auth_wins_across_case() {
        let explicit: HeaderSet = [("accept", "explicit/x")].into_iter().collect();
        let auth: HeaderSet = [("Accept", "auth/y")].into_iter().collect();
        let map = HeaderSet::layered_header_map(&HeaderSet::defaults(), &explicit, &auth).unwrap();
        assert_eq!(map["accept"], "auth/y");
        assert_eq!(map.get_all("accept").iter().count(), 1);
    }
}

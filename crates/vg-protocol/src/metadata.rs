use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known metadata keys.
pub mod keys {
    /// `Bearer <token>` credential on authenticated calls.
    pub const AUTHORIZATION: &str = "authorization";
    /// Token echoed back in the SignIn response headers.
    pub const AUTH_TOKEN: &str = "x-auth-token";
    /// Uploader id hint on UploadVideo.
    pub const USER_ID: &str = "user-id";
    /// Uploader display-name hint on UploadVideo.
    pub const USER_NAME: &str = "user-name";
}

const BEARER_PREFIX: &str = "bearer ";

/// Call-scoped headers: a multi-valued map with lower-cased keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    entries: BTreeMap<String, Vec<String>>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to a single value, replacing any existing values.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_ascii_lowercase(), vec![value.into()]);
    }

    /// Add a value for `key`, keeping existing values.
    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.entries
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&key.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Builder form of [`Metadata::insert`].
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set the `authorization` header to `Bearer <token>`.
    pub fn with_bearer(self, token: &str) -> Self {
        self.with(keys::AUTHORIZATION, format!("Bearer {token}"))
    }

    /// The raw `authorization` header, if present.
    pub fn authorization(&self) -> Option<&str> {
        self.get(keys::AUTHORIZATION)
    }

    /// Extract the token from an `authorization: Bearer <token>` header.
    ///
    /// The scheme is matched case-insensitively. Returns `None` if the header
    /// is missing, uses another scheme, or carries an empty token.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.authorization()?;
        let scheme = value.get(..BEARER_PREFIX.len())?;
        if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
            return None;
        }
        let token = value[BEARER_PREFIX.len()..].trim();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        let mut md = Metadata::new();
        md.insert("User-Id", "user_1");
        assert_eq!(md.get("user-id"), Some("user_1"));
        assert_eq!(md.get("USER-ID"), Some("user_1"));
    }

    #[test]
    fn insert_replaces_append_accumulates() {
        let mut md = Metadata::new();
        md.append("x", "1");
        md.append("x", "2");
        assert_eq!(md.get_all("x"), ["1".to_string(), "2".to_string()]);
        assert_eq!(md.get("x"), Some("1"));
        md.insert("x", "3");
        assert_eq!(md.get_all("x"), ["3".to_string()]);
        assert_eq!(md.iter().count(), 1);
    }

    #[test]
    fn bearer_token_extraction() {
        let md = Metadata::new().with_bearer("abc.def.ghi");
        assert_eq!(md.bearer_token(), Some("abc.def.ghi"));

        let md = Metadata::new().with(keys::AUTHORIZATION, "bearer tok");
        assert_eq!(md.bearer_token(), Some("tok"));
    }

    #[test]
    fn bearer_token_rejects_other_forms() {
        assert_eq!(Metadata::new().bearer_token(), None);
        for value in ["Basic dXNlcjpwdw==", "Bearer", "Bearer   ", "tok", ""] {
            let md = Metadata::new().with(keys::AUTHORIZATION, value);
            assert_eq!(md.bearer_token(), None, "{value:?} should not yield a token");
        }
    }

    #[test]
    fn missing_key_yields_empty_slice() {
        let md = Metadata::new();
        assert!(md.get_all("nope").is_empty());
        assert!(!md.contains_key("nope"));
        assert!(md.is_empty());
    }
}

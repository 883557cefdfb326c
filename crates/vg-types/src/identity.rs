use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

const USER_ID_PREFIX: &str = "user_";

/// Identifier assigned to a user at sign-up, of the form `user_<n>`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// The id given to the `n`th registered user (1-based).
    pub fn sequential(n: usize) -> Self {
        Self(format!("{USER_ID_PREFIX}{n}"))
    }

    /// Parse a `user_<n>` identifier.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        match s.strip_prefix(USER_ID_PREFIX) {
            Some(n) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(Self(s.to_string()))
            }
            _ => Err(TypeError::InvalidUserId(s.to_string())),
        }
    }

    /// Wrap a raw id that came from an untrusted hint or a sentinel.
    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (user id, username) pair attached to a call.
///
/// Inside the server an `Identity` only ever comes from a verified bearer
/// token, a caller-supplied header hint, or the [`Identity::unknown`]
/// sentinel. Which of these applies is decided by the caller of this type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub username: String,
}

impl Identity {
    pub const UNKNOWN_ID: &'static str = "unknown";
    pub const UNKNOWN_NAME: &'static str = "Unknown User";

    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Sentinel owner used when a call carries no identity at all.
    pub fn unknown() -> Self {
        Self {
            user_id: UserId::from_raw(Self::UNKNOWN_ID),
            username: Self::UNKNOWN_NAME.into(),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.user_id.as_str() == Self::UNKNOWN_ID
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.user_id)
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Longest identifier [`ObjectId::parse`] accepts, in bytes.
pub const MAX_OBJECT_ID_LEN: usize = 1024;

/// Identifier of a stored video.
///
/// Unlike a content hash, an `ObjectId` is chosen by the uploader and acts as
/// the primary key of the object store. Uploading twice under the same id
/// replaces the earlier object.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap a raw identifier without validation.
    ///
    /// An empty id is representable because the wire format allows it; use
    /// [`ObjectId::parse`] where emptiness must be rejected.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an identifier, rejecting the empty string and anything longer
    /// than [`MAX_OBJECT_ID_LEN`].
    pub fn parse(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        if id.is_empty() {
            return Err(TypeError::EmptyObjectId);
        }
        if id.len() > MAX_OBJECT_ID_LEN {
            return Err(TypeError::ObjectIdTooLong {
                len: id.len(),
                max: MAX_OBJECT_ID_LEN,
            });
        }
        Ok(Self(id))
    }

    /// Returns `true` if the identifier is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({:?})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

use serde::{Deserialize, Serialize};

use crate::identity::Identity;
use crate::object::ObjectId;

/// Metadata recorded when an upload commits.
///
/// Sent back in the upload response and attached to the first chunk of
/// every download of the object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub uploader_id: String,
    pub uploader_name: String,
    /// Commit time in Unix epoch seconds.
    pub upload_timestamp: i64,
    pub file_name: String,
    pub file_size: u64,
}

impl VideoMetadata {
    /// Build the metadata for an object committed by `owner`.
    ///
    /// The file name is the declared object id; uploads carry no separate
    /// file name on the wire.
    pub fn for_upload(owner: &Identity, object_id: &ObjectId, file_size: u64, upload_timestamp: i64) -> Self {
        Self {
            uploader_id: owner.user_id.to_string(),
            uploader_name: owner.username.clone(),
            upload_timestamp,
            file_name: object_id.to_string(),
            file_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::UserId;

    #[test]
    fn for_upload_copies_owner_and_id() {
        let owner = Identity::new(UserId::sequential(1), "alice");
        let meta = VideoMetadata::for_upload(&owner, &ObjectId::from("v1"), 900_000, 1_700_000_000);
        assert_eq!(meta.uploader_id, "user_1");
        assert_eq!(meta.uploader_name, "alice");
        assert_eq!(meta.file_name, "v1");
        assert_eq!(meta.file_size, 900_000);
        assert_eq!(meta.upload_timestamp, 1_700_000_000);
    }
}

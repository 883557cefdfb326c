use bytes::Bytes;
use vg_types::{ObjectId, VideoMetadata};

/// A committed video: id, payload and metadata.
///
/// The payload is a [`Bytes`] handle so reads hand out cheap clones of the
/// same buffer rather than copying it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub id: ObjectId,
    pub data: Bytes,
    pub metadata: VideoMetadata,
}

impl StoredObject {
    pub fn new(id: ObjectId, data: impl Into<Bytes>, metadata: VideoMetadata) -> Self {
        Self {
            id,
            data: data.into(),
            metadata,
        }
    }

    /// Payload length in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Returns `true` if the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> VideoMetadata {
        VideoMetadata {
            uploader_id: "user_1".into(),
            uploader_name: "alice".into(),
            upload_timestamp: 0,
            file_name: "v1".into(),
            file_size: 3,
        }
    }

    #[test]
    fn size_and_emptiness() {
        let obj = StoredObject::new(ObjectId::from("v1"), vec![1u8, 2, 3], meta());
        assert_eq!(obj.size(), 3);
        assert!(!obj.is_empty());

        let empty = StoredObject::new(ObjectId::from("v2"), Bytes::new(), meta());
        assert!(empty.is_empty());
    }

    #[test]
    fn clones_share_the_payload() {
        let obj = StoredObject::new(ObjectId::from("v1"), vec![0u8; 1024], meta());
        let copy = obj.clone();
        assert_eq!(obj.data.as_ptr(), copy.data.as_ptr());
    }
}

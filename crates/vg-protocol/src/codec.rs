use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{RpcFrame, MAX_MESSAGE_SIZE};

/// Length of the big-endian length prefix.
pub const LENGTH_PREFIX: usize = 4;

/// Codec for encoding/decoding RPC frames.
///
/// Layout: `[4 bytes len][1 byte tag][bincode payload]`, where `len`
/// covers the tag and the payload.
#[derive(Clone, Copy, Debug)]
pub struct RpcCodec {
    max_message_size: usize,
}

impl Default for RpcCodec {
    fn default() -> Self {
        Self::new(MAX_MESSAGE_SIZE)
    }
}

impl RpcCodec {
    pub fn new(max_message_size: usize) -> Self {
        Self { max_message_size }
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    /// Encode a frame with its length prefix and tag.
    pub fn encode(&self, frame: &RpcFrame) -> ProtocolResult<Vec<u8>> {
        let payload = bincode::serialize(frame)
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        if payload.len() > self.max_message_size {
            return Err(ProtocolError::MessageTooLarge {
                size: payload.len(),
                max: self.max_message_size,
            });
        }
        let len = (payload.len() + 1) as u32;
        let mut buf = Vec::with_capacity(LENGTH_PREFIX + 1 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.push(frame.type_tag());
        buf.extend_from_slice(&payload);
        Ok(buf)
    }

    /// Validate a length prefix and return the number of bytes that follow it.
    pub fn frame_len(&self, prefix: [u8; LENGTH_PREFIX]) -> ProtocolResult<usize> {
        let len = u32::from_be_bytes(prefix) as usize;
        if len < 1 {
            return Err(ProtocolError::FramingError("zero-length frame".into()));
        }
        if len - 1 > self.max_message_size {
            return Err(ProtocolError::MessageTooLarge {
                size: len - 1,
                max: self.max_message_size,
            });
        }
        Ok(len)
    }

    /// Decode one framed message. Returns (frame, bytes_consumed).
    pub fn decode(&self, data: &[u8]) -> ProtocolResult<(RpcFrame, usize)> {
        if data.len() < LENGTH_PREFIX + 1 {
            return Err(ProtocolError::FramingError("too short".into()));
        }
        let mut prefix = [0u8; LENGTH_PREFIX];
        prefix.copy_from_slice(&data[..LENGTH_PREFIX]);
        let len = self.frame_len(prefix)?;
        let total = LENGTH_PREFIX + len;
        if data.len() < total {
            return Err(ProtocolError::FramingError(format!(
                "incomplete: have {}, need {}",
                data.len(),
                total
            )));
        }
        let tag = data[LENGTH_PREFIX];
        if !RpcFrame::is_known_tag(tag) {
            return Err(ProtocolError::InvalidFrameType(tag));
        }
        let frame: RpcFrame = bincode::deserialize(&data[LENGTH_PREFIX + 1..total])
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        if frame.type_tag() != tag {
            return Err(ProtocolError::FramingError(format!(
                "tag {tag} does not match {} frame",
                frame.type_name()
            )));
        }
        Ok((frame, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::*;
    use crate::metadata::Metadata;
    use crate::status::Status;
    use vg_types::VideoMetadata;

    fn codec() -> RpcCodec {
        RpcCodec::default()
    }

    fn meta() -> VideoMetadata {
        VideoMetadata {
            uploader_id: "user_1".into(),
            uploader_name: "alice".into(),
            upload_timestamp: 1_700_000_000,
            file_name: "v1".into(),
            file_size: 3,
        }
    }

    #[test]
    fn open_frame_roundtrip() {
        let frame = RpcFrame::Open {
            method: crate::methods::UPLOAD_VIDEO.into(),
            metadata: Metadata::new().with_bearer("tok"),
        };
        let encoded = codec().encode(&frame).unwrap();
        let (decoded, consumed) = codec().decode(&encoded).unwrap();
        assert_eq!(consumed, encoded.len());
        assert_eq!(decoded, frame);
    }

    #[test]
    fn download_chunk_keeps_optional_metadata() {
        for metadata in [Some(meta()), None] {
            let frame = RpcFrame::Message(RpcMessage::DownloadVideoResponse(DownloadVideoResponse {
                video_id: "v1".into(),
                data: vec![1, 2, 3],
                sequence: 1,
                metadata: metadata.clone(),
            }));
            let (decoded, _) = codec().decode(&codec().encode(&frame).unwrap()).unwrap();
            assert_eq!(decoded, frame);
        }
    }

    #[test]
    fn status_frame_roundtrip() {
        let frame = RpcFrame::Status(Status::failed_precondition("no download source"));
        let (decoded, _) = codec().decode(&codec().encode(&frame).unwrap()).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn decodes_first_of_two_frames() {
        let mut buf = codec().encode(&RpcFrame::HalfClose).unwrap();
        let first_len = buf.len();
        buf.extend(codec().encode(&RpcFrame::Status(Status::ok())).unwrap());
        let (frame, consumed) = codec().decode(&buf).unwrap();
        assert_eq!(frame, RpcFrame::HalfClose);
        assert_eq!(consumed, first_len);
        let (frame, _) = codec().decode(&buf[consumed..]).unwrap();
        assert_eq!(frame, RpcFrame::Status(Status::ok()));
    }

    #[test]
    fn decode_truncated() {
        let err = codec().decode(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));

        let encoded = codec().encode(&RpcFrame::HalfClose).unwrap();
        let err = codec().decode(&encoded[..encoded.len() - 1]).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));
    }

    #[test]
    fn decode_zero_length() {
        let data = [0u8, 0, 0, 0, 0];
        let err = codec().decode(&data).unwrap_err();
        assert!(matches!(err, ProtocolError::FramingError(_)));
    }

    #[test]
    fn decode_unknown_tag() {
        let mut encoded = codec().encode(&RpcFrame::HalfClose).unwrap();
        encoded[LENGTH_PREFIX] = 99;
        assert!(matches!(codec().decode(&encoded), Err(ProtocolError::InvalidFrameType(99))));
    }

    #[test]
    fn oversized_frames_rejected_both_ways() {
        let small = RpcCodec::new(64);
        let frame = RpcFrame::Message(RpcMessage::UploadVideoRequest(UploadVideoRequest {
            video_id: "v1".into(),
            data: vec![0u8; 128],
            sequence: 1,
        }));
        assert!(matches!(small.encode(&frame), Err(ProtocolError::MessageTooLarge { .. })));

        let encoded = codec().encode(&frame).unwrap();
        assert!(matches!(small.decode(&encoded), Err(ProtocolError::MessageTooLarge { .. })));
    }
}

//! Frame payload decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{VisionError, VisionResult};

/// An encoded image (JPEG/PNG) received from a subject.
///
/// Pixel decoding is left to the detection backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Decode a base64 frame payload.
///
/// Browser clients often send a data URL (`data:image/jpeg;base64,...`);
/// the prefix is stripped before decoding.
pub fn decode_frame(payload: &str) -> VisionResult<Frame> {
    let encoded = match payload.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => payload,
    };
    let bytes = STANDARD.decode(encoded.trim())?;
    if bytes.is_empty() {
        return Err(VisionError::invalid_frame("empty image payload"));
    }
    Ok(Frame::from_bytes(bytes))
}

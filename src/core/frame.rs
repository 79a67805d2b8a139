use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use super::error::MockupError;
use super::request::OutputKind;

/// A single generated image at one rotation angle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedFrame {
    /// Position in the rotation sequence
    pub index: u32,
    /// Yaw angle in degrees
    pub angle: u32,
    pub media_type: String,
    /// Base64 encoded image data
    #[serde(skip_serializing)]
    #[serde(default)]
    pub data: String,
}

impl GeneratedFrame {
    /// Embeddable `data:` URL for this frame
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    pub fn decode(&self) -> Result<Vec<u8>, MockupError> {
        BASE64
            .decode(&self.data)
            .map_err(|e| MockupError::InvalidResponse(format!("frame {} is not valid base64: {}", self.index, e)))
    }

    /// File extension matching the media type
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

/// Ordered frames of one finished generation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    kind: OutputKind,
    frames: Vec<GeneratedFrame>,
}

impl GenerationResult {
    pub fn new(kind: OutputKind, frames: Vec<GeneratedFrame>) -> Self {
        Self { kind, frames }
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    pub fn frames(&self) -> &[GeneratedFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// True when the frames should be cycled rather than shown statically
    pub fn is_animated(&self) -> bool {
        self.kind.is_animated() && self.frames.len() > 1
    }
}

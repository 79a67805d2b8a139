use serde::{Deserialize, Serialize};

use super::error::MockupError;

/// Product categories offered by the form
pub const CATEGORIES: &[&str] = &[
    "Electronics",
    "Fashion & Accessories",
    "Furniture & Decor",
    "Cosmetics & Beauty",
    "Food & Beverages",
    "Toys & Games",
];

/// Scene the product is placed in
pub const MOCKUP_STYLES: &[&str] = &[
    "White background with soft shadow",
    "Hand holding the product",
    "Modern office desk",
    "Minimalist marble scene",
    "Photo studio setting",
    "Outdoor nature",
];

pub const LIGHTING_STYLES: &[&str] = &[
    "Studio lighting (soft)",
    "Natural light (daytime)",
    "Dramatic lighting (high contrast)",
    "Futuristic neon light",
];

pub const RESOLUTIONS: &[&str] = &["Low (720p)", "Medium (1080p)", "High (4K)"];

/// Rotation frame counts for animated output
pub const FRAME_COUNTS: &[u32] = &[12, 24, 36];

/// What the generated frames are assembled into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    Static,
    #[default]
    #[serde(rename = "gif", alias = "loop")]
    LoopingImage,
    Video,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Static => "static",
            OutputKind::LoopingImage => "gif",
            OutputKind::Video => "video",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OutputKind::Static => "3D Static Image",
            OutputKind::LoopingImage => "360° GIF",
            OutputKind::Video => "360° Video",
        }
    }

    pub fn parse(s: &str) -> Result<Self, MockupError> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(OutputKind::Static),
            "gif" | "loop" => Ok(OutputKind::LoopingImage),
            "video" => Ok(OutputKind::Video),
            other => Err(MockupError::InvalidParameter(format!(
                "Unknown output kind '{}'. Valid values: {}",
                other,
                Self::variants().join(", ")
            ))),
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["static", "gif", "video"]
    }

    pub fn all() -> &'static [OutputKind] {
        &[OutputKind::Static, OutputKind::LoopingImage, OutputKind::Video]
    }

    /// Whether frames of this kind are cycled for display
    pub fn is_animated(&self) -> bool {
        !matches!(self, OutputKind::Static)
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Source product image, ready for transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Base64 encoded bytes
    pub data: String,
    pub media_type: String,
}

/// One submission's worth of generation parameters
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub source: SourceImage,
    pub category: String,
    pub mockup_style: String,
    pub output_kind: OutputKind,
    /// Only meaningful for animated kinds
    pub frame_count: u32,
    pub lighting: String,
    pub reflections: bool,
    pub resolution: String,
    pub watermark: Option<String>,
}

impl GenerationRequest {
    pub fn new(source: SourceImage) -> Self {
        Self {
            source,
            category: CATEGORIES[0].to_string(),
            mockup_style: MOCKUP_STYLES[0].to_string(),
            output_kind: OutputKind::default(),
            frame_count: 24,
            lighting: LIGHTING_STYLES[0].to_string(),
            reflections: true,
            resolution: RESOLUTIONS[1].to_string(),
            watermark: None,
        }
    }

    pub fn with_output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = kind;
        self
    }

    pub fn with_frame_count(mut self, count: u32) -> Self {
        self.frame_count = count;
        self
    }

    pub fn with_reflections(mut self, on: bool) -> Self {
        self.reflections = on;
        self
    }

    pub fn with_watermark(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.watermark = if text.trim().is_empty() { None } else { Some(text) };
        self
    }

    /// Number of frames to request; static output is always a single frame
    pub fn total_frames(&self) -> u32 {
        match self.output_kind {
            OutputKind::Static => 1,
            _ => self.frame_count.max(1),
        }
    }

    /// Yaw angle in degrees for the frame at `index`
    pub fn angle_for(&self, index: u32) -> u32 {
        rotation_angle(index, self.total_frames())
    }
}

/// Evenly spaced yaw angle; a lone frame gets a 30° three-quarter view
pub fn rotation_angle(index: u32, total: u32) -> u32 {
    if total <= 1 {
        30
    } else {
        (360.0 * f64::from(index) / f64::from(total)).round() as u32
    }
}

/// Percentage complete after `done` of `total` frames
pub fn progress_percent(done: u32, total: u32) -> u8 {
    if total == 0 {
        return 100;
    }
    (100.0 * f64::from(done) / f64::from(total)).round().min(100.0) as u8
}

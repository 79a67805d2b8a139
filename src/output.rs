use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use image::codecs::gif::{GifEncoder, Repeat};
use image::imageops::{self, FilterType};
use image::{Delay, Frame};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use uuid::Uuid;

use crate::core::{GenerationRequest, GenerationResult, OutputKind};

/// Settings recorded in the manifest; the source image itself is not stored
#[derive(Debug, Clone, Serialize)]
pub struct RunSettings {
    pub category: String,
    pub mockup_style: String,
    pub output_kind: OutputKind,
    pub frame_count: u32,
    pub lighting: String,
    pub reflections: bool,
    pub resolution: String,
    pub watermark: Option<String>,
    pub model: String,
}

impl RunSettings {
    pub fn from_request(request: &GenerationRequest, model: &str) -> Self {
        Self {
            category: request.category.clone(),
            mockup_style: request.mockup_style.clone(),
            output_kind: request.output_kind,
            frame_count: request.total_frames(),
            lighting: request.lighting.clone(),
            reflections: request.reflections,
            resolution: request.resolution.clone(),
            watermark: request.watermark.clone(),
            model: model.to_string(),
        }
    }
}

/// Files written for one run
#[derive(Debug, Clone, Serialize)]
pub struct SavedRun {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    pub settings: RunSettings,
    pub angles: Vec<u32>,
    pub frames: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<PathBuf>,
    pub manifest: PathBuf,
}

/// New run identifier, e.g. "mk_1a2b3c4d"
pub fn new_run_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("mk_{}", &uuid[..8])
}

/// Write every frame, the looping GIF when asked for, and a JSON manifest
pub async fn save_run(
    result: &GenerationResult,
    settings: RunSettings,
    output_dir: &Path,
    frame_interval: Duration,
) -> Result<SavedRun> {
    anyhow::ensure!(!result.is_empty(), "Nothing to save: the run produced no frames");

    fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let run_id = new_run_id();
    let mut frames = Vec::with_capacity(result.len());
    let mut decoded = Vec::with_capacity(result.len());

    for frame in result.frames() {
        let bytes = frame.decode()?;
        let path = output_dir.join(format!("{}_{:03}.{}", run_id, frame.index, frame.extension()));
        fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Saved frame to: {}", path.display());
        frames.push(path);
        decoded.push(bytes);
    }

    let animation = if result.kind() == OutputKind::LoopingImage && result.len() > 1 {
        let path = output_dir.join(format!("{}.gif", run_id));
        let gif_path = path.clone();
        tokio::task::spawn_blocking(move || write_gif(&decoded, &gif_path, frame_interval))
            .await
            .context("GIF encoder task panicked")??;
        tracing::info!("Saved animation to: {}", path.display());
        Some(path)
    } else {
        None
    };

    let manifest = output_dir.join(format!("{}.json", run_id));
    let saved = SavedRun {
        run_id,
        created_at: Utc::now(),
        settings,
        angles: result.frames().iter().map(|f| f.angle).collect(),
        frames,
        animation,
        manifest: manifest.clone(),
    };

    fs::write(&manifest, serde_json::to_string_pretty(&saved)?)
        .await
        .context("Failed to write run manifest")?;

    Ok(saved)
}

/// Encode frames as an infinitely looping animated GIF
fn write_gif(images: &[Vec<u8>], path: &Path, frame_interval: Duration) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut encoder = GifEncoder::new(file);
    encoder.set_repeat(Repeat::Infinite)?;

    let delay = Delay::from_saturating_duration(frame_interval);
    let mut size = None;
    for (i, bytes) in images.iter().enumerate() {
        let mut rgba = image::load_from_memory(bytes)
            .with_context(|| format!("Frame {} is not a decodable image", i))?
            .to_rgba8();

        // Every frame takes the canvas size of the first one
        let (width, height) = *size.get_or_insert(rgba.dimensions());
        if rgba.dimensions() != (width, height) {
            tracing::debug!("Resizing frame {} to {}x{}", i, width, height);
            rgba = imageops::resize(&rgba, width, height, FilterType::Triangle);
        }
        encoder.encode_frame(Frame::from_parts(rgba, 0, 0, delay))?;
    }
    Ok(())
}

use ratatui::{layout::Rect, Frame};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol, StatefulImage};

use crate::core::GenerationResult;

/// Font size assumed when the terminal can't be queried
const FALLBACK_FONT_SIZE: (u16, u16) = (8, 16);

/// Generated frames decoded once and kept ready for drawing
pub struct FramePreview {
    picker: Picker,
    frames: Vec<Option<StatefulProtocol>>,
}

impl FramePreview {
    pub fn new(picker: Picker) -> Self {
        Self {
            picker,
            frames: Vec::new(),
        }
    }

    /// Ask the terminal which graphics protocol it speaks; must run on the alternate screen
    pub fn detect() -> Self {
        let picker = Picker::from_query_stdio().unwrap_or_else(|e| {
            tracing::debug!("Terminal graphics query failed, using half blocks: {:?}", e);
            Picker::from_fontsize(FALLBACK_FONT_SIZE)
        });
        Self::new(picker)
    }

    /// Unicode half-block rendering, works on any terminal
    pub fn halfblocks() -> Self {
        Self::new(Picker::from_fontsize(FALLBACK_FONT_SIZE))
    }

    /// Decode every frame of a result; undecodable frames are skipped
    pub fn load(&mut self, result: &GenerationResult) {
        self.frames = result
            .frames()
            .iter()
            .map(|frame| {
                let bytes = frame.decode().ok()?;
                match image::load_from_memory(&bytes) {
                    Ok(img) => Some(self.picker.new_resize_protocol(img)),
                    Err(e) => {
                        tracing::debug!("Frame {} can't be previewed: {}", frame.index, e);
                        None
                    }
                }
            })
            .collect();
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn has_frame(&self, index: usize) -> bool {
        matches!(self.frames.get(index), Some(Some(_)))
    }

    /// Draw frame `index` scaled into `area`
    pub fn render(&mut self, frame: &mut Frame, index: usize, area: Rect) {
        if let Some(Some(protocol)) = self.frames.get_mut(index) {
            frame.render_stateful_widget(StatefulImage::<StatefulProtocol>::default(), area, protocol);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::{GeneratedFrame, OutputKind};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    pub(crate) fn png_frame(index: u32, angle: u32) -> GeneratedFrame {
        let img = RgbaImage::from_pixel(8, 8, Rgba([200, 40, 40, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        GeneratedFrame {
            index,
            angle,
            media_type: "image/png".into(),
            data: BASE64.encode(buf.into_inner()),
        }
    }

    #[test]
    fn loads_decodable_frames_only() {
        let broken = GeneratedFrame {
            index: 1,
            angle: 180,
            media_type: "image/png".into(),
            data: BASE64.encode(b"not an image"),
        };
        let result = GenerationResult::new(OutputKind::Video, vec![png_frame(0, 0), broken]);

        let mut preview = FramePreview::halfblocks();
        preview.load(&result);
        assert!(preview.has_frame(0));
        assert!(!preview.has_frame(1));
        assert!(!preview.has_frame(2));

        preview.clear();
        assert!(!preview.has_frame(0));
    }
}

use async_trait::async_trait;

use super::error::MockupError;
use super::frame::{GeneratedFrame, GenerationResult};
use super::prompt::build_instruction;
use super::request::{progress_percent, GenerationRequest, SourceImage};

/// A generative-image backend that renders one frame per call
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Render a single image from the source image and an instruction.
    ///
    /// The returned frame carries the payload and media type; index and
    /// angle are filled in by the caller.
    async fn render(&self, source: &SourceImage, instruction: &str) -> Result<GeneratedFrame, MockupError>;
}

/// Request every frame of `request` in order, reporting progress after each.
///
/// Calls are strictly sequential. The first failure stops the sequence and is
/// returned unchanged; no partial result is produced.
pub async fn generate_frames<M, F>(
    model: &M,
    request: &GenerationRequest,
    mut on_progress: F,
) -> Result<GenerationResult, MockupError>
where
    M: ImageModel + ?Sized,
    F: FnMut(u8),
{
    let total = request.total_frames();
    let mut frames = Vec::with_capacity(total as usize);

    for index in 0..total {
        let angle = request.angle_for(index);
        let instruction = build_instruction(request, angle);

        tracing::debug!("Requesting frame {}/{} at {}°", index + 1, total, angle);

        let mut frame = match model.render(&request.source, &instruction).await {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Frame {} of {} failed: {}", index + 1, total, e);
                return Err(e);
            }
        };
        frame.index = index;
        frame.angle = angle;
        frames.push(frame);

        on_progress(progress_percent(index + 1, total));
    }

    tracing::info!("Generated {} frame(s)", frames.len());
    Ok(GenerationResult::new(request.output_kind, frames))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::request::OutputKind;
    use std::sync::Mutex;

    /// Scripted model: records every instruction and fails on a chosen call
    pub(crate) struct ScriptedModel {
        pub calls: Mutex<Vec<String>>,
        fail_on: Option<(usize, fn() -> MockupError)>,
    }

    impl ScriptedModel {
        pub fn ok() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }

        pub fn failing_at(call: usize, err: fn() -> MockupError) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: Some((call, err)),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageModel for ScriptedModel {
        async fn render(&self, source: &SourceImage, instruction: &str) -> Result<GeneratedFrame, MockupError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(instruction.to_string());
                calls.len()
            };
            if let Some((n, err)) = self.fail_on {
                if n == call {
                    return Err(err());
                }
            }
            Ok(GeneratedFrame {
                index: 0,
                angle: 0,
                media_type: source.media_type.clone(),
                data: format!("frame{}", call),
            })
        }
    }

    fn request(kind: OutputKind, frames: u32) -> GenerationRequest {
        GenerationRequest::new(SourceImage {
            data: "c3Jj".into(),
            media_type: "image/png".into(),
        })
        .with_output_kind(kind)
        .with_frame_count(frames)
    }

    #[tokio::test]
    async fn static_makes_one_call_at_thirty_degrees() {
        let model = ScriptedModel::ok();
        let mut progress = Vec::new();

        let result = generate_frames(&model, &request(OutputKind::Static, 36), |p| progress.push(p))
            .await
            .unwrap();

        assert_eq!(model.call_count(), 1);
        assert_eq!(result.len(), 1);
        assert_eq!(result.frames()[0].angle, 30);
        assert!(model.calls.lock().unwrap()[0].contains("rotated 30 degrees"));
        assert_eq!(progress, vec![100]);
    }

    #[tokio::test]
    async fn video_of_twelve_frames() {
        let model = ScriptedModel::ok();
        let mut progress = Vec::new();

        let result = generate_frames(&model, &request(OutputKind::Video, 12), |p| progress.push(p))
            .await
            .unwrap();

        assert_eq!(model.call_count(), 12);
        let angles: Vec<u32> = result.frames().iter().map(|f| f.angle).collect();
        assert_eq!(angles, vec![0, 30, 60, 90, 120, 150, 180, 210, 240, 270, 300, 330]);
        let indices: Vec<u32> = result.frames().iter().map(|f| f.index).collect();
        assert_eq!(indices, (0..12).collect::<Vec<_>>());
        assert_eq!(progress, vec![8, 17, 25, 33, 42, 50, 58, 67, 75, 83, 92, 100]);
        assert_eq!(result.kind(), OutputKind::Video);

        for (i, instruction) in model.calls.lock().unwrap().iter().enumerate() {
            assert!(instruction.contains(&format!("rotated {} degrees", i * 30)));
        }
    }

    #[tokio::test]
    async fn frames_keep_call_order() {
        let model = ScriptedModel::ok();
        let result = generate_frames(&model, &request(OutputKind::LoopingImage, 24), |_| {})
            .await
            .unwrap();

        assert_eq!(result.len(), 24);
        assert_eq!(result.frames()[0].data, "frame1");
        assert_eq!(result.frames()[23].data, "frame24");
        assert_eq!(result.frames()[1].angle, 15);
    }

    #[tokio::test]
    async fn blocked_call_stops_the_sequence() {
        let model = ScriptedModel::failing_at(2, || MockupError::BlockedContent {
            reason: "SAFETY".into(),
        });
        let mut progress = Vec::new();

        let err = generate_frames(&model, &request(OutputKind::Video, 5), |p| progress.push(p))
            .await
            .unwrap_err();

        assert!(matches!(err, MockupError::BlockedContent { ref reason } if reason == "SAFETY"));
        assert_eq!(model.call_count(), 2);
        assert_eq!(progress, vec![20]);
    }

    #[tokio::test]
    async fn other_failures_propagate_unchanged() {
        let model = ScriptedModel::failing_at(1, || MockupError::ApiError {
            message: "connection reset".into(),
            source: None,
        });

        let err = generate_frames(&model, &request(OutputKind::LoopingImage, 12), |_| {})
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "API error: connection reset");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_image_reports_finish_reason() {
        let model = ScriptedModel::failing_at(3, || MockupError::NoImageReturned {
            finish_reason: Some("STOP".into()),
        });

        let err = generate_frames(&model, &request(OutputKind::Video, 12), |_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, MockupError::NoImageReturned { finish_reason: Some(ref r) } if r == "STOP"));
        assert_eq!(model.call_count(), 3);
    }
}

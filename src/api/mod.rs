mod types;

use async_trait::async_trait;

pub use types::*;

use crate::config::Config;
use crate::core::{GeneratedFrame, ImageModel, MockupError, SourceImage};
use crate::http_client::HTTP_CLIENT;

/// Finish reasons that mean the service refused on policy grounds
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "RECITATION",
    "IMAGE_SAFETY",
    "IMAGE_PROHIBITED_CONTENT",
];

/// Gemini API client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    /// Create a new client from config
    pub fn from_config(config: &Config) -> Result<Self, MockupError> {
        let api_key = config.api_key().ok_or(MockupError::MissingApiKey)?;
        Ok(Self::new(api_key, &config.api.base_url, &config.api.model))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one image + instruction to the model
    pub async fn generate(&self, source: &SourceImage, instruction: &str) -> Result<GenerateResponse, MockupError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let request = build_generate_request(source, instruction);

        tracing::debug!("Sending generate request to: {}", url);

        let response = HTTP_CLIENT
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| match e.error.status.as_str() {
                    "" => e.error.message,
                    status => format!("{} ({})", e.error.message, status),
                })
                .unwrap_or_else(|_| format!("{}: {}", status, body));
            return Err(MockupError::ApiError {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| MockupError::InvalidResponse(format!("Failed to parse Gemini API response: {}", e)))
    }
}

#[async_trait]
impl ImageModel for GeminiClient {
    async fn render(&self, source: &SourceImage, instruction: &str) -> Result<GeneratedFrame, MockupError> {
        let response = self.generate(source, instruction).await?;
        extract_frame(response, &source.media_type)
    }
}

/// Build the API request body: the image first, then the instruction, image-only output
fn build_generate_request(source: &SourceImage, instruction: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![
                ContentPart::InlineData {
                    inline_data: InlineData {
                        mime_type: Some(source.media_type.clone()),
                        data: source.data.clone(),
                    },
                },
                ContentPart::Text {
                    text: instruction.to_string(),
                },
            ],
            role: None,
        }],
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
        }),
    }
}

/// Pull the single image out of a response, or explain why there is none
pub fn extract_frame(response: GenerateResponse, fallback_media_type: &str) -> Result<GeneratedFrame, MockupError> {
    if let Some(reason) = response.prompt_feedback.as_ref().and_then(|f| f.block_reason.clone()) {
        tracing::warn!("Prompt blocked: {}", reason);
        let reason = match response.prompt_feedback.and_then(|f| f.block_reason_message) {
            Some(message) => format!("{} - {}", reason, message),
            None => reason,
        };
        return Err(MockupError::BlockedContent { reason });
    }

    let Some(candidate) = response.candidates.unwrap_or_default().into_iter().next() else {
        return Err(MockupError::NoImageReturned { finish_reason: None });
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if BLOCKING_FINISH_REASONS.contains(&reason) {
            tracing::warn!("Generation refused: {}", reason);
            let reason = match &candidate.finish_message {
                Some(message) => format!("{} - {}", reason, message),
                None => reason.to_string(),
            };
            return Err(MockupError::BlockedContent { reason });
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
    for part in parts {
        match part {
            ContentPart::InlineData { inline_data } => {
                return Ok(GeneratedFrame {
                    index: 0,
                    angle: 0,
                    media_type: inline_data
                        .mime_type
                        .unwrap_or_else(|| fallback_media_type.to_string()),
                    data: inline_data.data,
                });
            }
            ContentPart::Text { text } => {
                tracing::debug!("Response text: {}", text);
            }
        }
    }

    Err(MockupError::NoImageReturned {
        finish_reason: candidate.finish_reason,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parse(value: serde_json::Value) -> GenerateResponse {
        serde_json::from_value(value).unwrap()
    }

    fn source() -> SourceImage {
        SourceImage {
            data: "c291cmNl".into(),
            media_type: "image/jpeg".into(),
        }
    }

    #[test]
    fn request_puts_image_before_instruction() {
        let body = serde_json::to_value(build_generate_request(&source(), "rotate it")).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "c291cmNl"}},
                        {"text": "rotate it"}
                    ]
                }],
                "generationConfig": {"responseModalities": ["IMAGE"]}
            })
        );
    }

    #[test]
    fn extracts_first_inline_image() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "here you go"},
                    {"inlineData": {"mimeType": "image/png", "data": "aW1n"}}
                ]},
                "finishReason": "STOP"
            }]
        }));

        let frame = extract_frame(response, "image/jpeg").unwrap();
        assert_eq!(frame.media_type, "image/png");
        assert_eq!(frame.data, "aW1n");
    }

    #[test]
    fn missing_mime_type_falls_back_to_source() {
        let response = parse(json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": "aW1n"}}]}}]
        }));
        assert_eq!(extract_frame(response, "image/jpeg").unwrap().media_type, "image/jpeg");
    }

    #[test]
    fn prompt_block_is_blocked_content() {
        let response = parse(json!({"promptFeedback": {"blockReason": "PROHIBITED_CONTENT"}}));
        let err = extract_frame(response, "image/png").unwrap_err();
        assert!(matches!(err, MockupError::BlockedContent { ref reason } if reason == "PROHIBITED_CONTENT"));
    }

    #[test]
    fn safety_finish_is_blocked_content() {
        let response = parse(json!({
            "candidates": [{"finishReason": "IMAGE_SAFETY", "finishMessage": "unsafe output"}]
        }));
        let err = extract_frame(response, "image/png").unwrap_err();
        assert!(matches!(err, MockupError::BlockedContent { ref reason } if reason == "IMAGE_SAFETY - unsafe output"));
    }

    #[test]
    fn text_only_answer_is_no_image() {
        let response = parse(json!({
            "candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}, "finishReason": "STOP"}]
        }));
        let err = extract_frame(response, "image/png").unwrap_err();
        assert!(matches!(err, MockupError::NoImageReturned { finish_reason: Some(ref r) } if r == "STOP"));

        let err = extract_frame(parse(json!({})), "image/png").unwrap_err();
        assert!(matches!(err, MockupError::NoImageReturned { finish_reason: None }));
    }

    #[tokio::test]
    async fn renders_against_the_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash-image:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "ZnJhbWU="}}]},
                    "finishReason": "STOP"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new("test-key", server.uri(), "gemini-2.5-flash-image");
        let frame = client.render(&source(), "rotate it").await.unwrap();
        assert_eq!(frame.data, "ZnJhbWU=");
    }

    #[tokio::test]
    async fn http_errors_carry_the_service_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("bad", server.uri(), "gemini-2.5-flash-image");
        let err = client.render(&source(), "rotate it").await.unwrap_err();
        assert_eq!(err.to_string(), "API error: API key not valid (INVALID_ARGUMENT)");
        assert_eq!(err.kind(), "transport_or_unknown");
    }
}

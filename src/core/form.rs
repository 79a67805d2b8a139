use std::path::PathBuf;

use super::error::MockupError;
use super::request::{
    GenerationRequest, OutputKind, SourceImage, CATEGORIES, FRAME_COUNTS, LIGHTING_STYLES,
    MOCKUP_STYLES, RESOLUTIONS,
};

/// Form fields, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    ProductImage,
    Category,
    MockupStyle,
    OutputKind,
    FrameCount,
    Lighting,
    Reflections,
    Resolution,
    Watermark,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::ProductImage,
            FormField::Category,
            FormField::MockupStyle,
            FormField::OutputKind,
            FormField::FrameCount,
            FormField::Lighting,
            FormField::Reflections,
            FormField::Resolution,
            FormField::Watermark,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::ProductImage => "1. Product Image",
            FormField::Category => "2. Product Category",
            FormField::MockupStyle => "3. Mockup Style",
            FormField::OutputKind => "4. Output Type",
            FormField::FrameCount => "   Rotation Frames",
            FormField::Lighting => "5. Lighting",
            FormField::Reflections => "   Reflections",
            FormField::Resolution => "6. Resolution",
            FormField::Watermark => "7. Watermark (optional)",
        }
    }

    /// Enumerated choices, for fields that have them
    pub fn options(&self) -> Option<Vec<String>> {
        match self {
            FormField::Category => Some(owned(CATEGORIES)),
            FormField::MockupStyle => Some(owned(MOCKUP_STYLES)),
            FormField::OutputKind => Some(owned(OutputKind::variants())),
            FormField::FrameCount => Some(FRAME_COUNTS.iter().map(|n| n.to_string()).collect()),
            FormField::Lighting => Some(owned(LIGHTING_STYLES)),
            FormField::Reflections => Some(vec!["true".into(), "false".into()]),
            FormField::Resolution => Some(owned(RESOLUTIONS)),
            FormField::ProductImage | FormField::Watermark => None,
        }
    }
}

/// Current user selections; a request is built from it on each submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockupForm {
    pub product_image: Option<PathBuf>,
    pub category: String,
    pub mockup_style: String,
    pub output_kind: OutputKind,
    pub frame_count: u32,
    pub lighting: String,
    pub reflections: bool,
    pub resolution: String,
    pub watermark: String,
}

impl Default for MockupForm {
    fn default() -> Self {
        Self {
            product_image: None,
            category: CATEGORIES[0].to_string(),
            mockup_style: MOCKUP_STYLES[0].to_string(),
            output_kind: OutputKind::LoopingImage,
            frame_count: 24,
            lighting: LIGHTING_STYLES[0].to_string(),
            reflections: true,
            resolution: RESOLUTIONS[1].to_string(),
            watermark: String::new(),
        }
    }
}

impl MockupForm {
    /// Fields that are shown for the current output kind
    pub fn visible_fields(&self) -> Vec<FormField> {
        FormField::all()
            .iter()
            .copied()
            .filter(|f| *f != FormField::FrameCount || self.output_kind != OutputKind::Static)
            .collect()
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::ProductImage => self
                .product_image
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            FormField::Category => self.category.clone(),
            FormField::MockupStyle => self.mockup_style.clone(),
            FormField::OutputKind => self.output_kind.as_str().to_string(),
            FormField::FrameCount => self.frame_count.to_string(),
            FormField::Lighting => self.lighting.clone(),
            FormField::Reflections => self.reflections.to_string(),
            FormField::Resolution => self.resolution.clone(),
            FormField::Watermark => self.watermark.clone(),
        }
    }

    /// Set a field from text. Enumerated fields accept the label or a 1-based index.
    pub fn set(&mut self, field: FormField, value: &str) -> Result<(), MockupError> {
        let value = value.trim();
        match field {
            FormField::ProductImage => {
                self.product_image = if value.is_empty() { None } else { Some(PathBuf::from(value)) };
            }
            FormField::Watermark => self.watermark = value.to_string(),
            FormField::OutputKind => self.output_kind = OutputKind::parse(value)?,
            FormField::Reflections => {
                self.reflections = value.parse().map_err(|_| {
                    MockupError::InvalidParameter(format!("'{}' is not true or false", value))
                })?;
            }
            FormField::FrameCount => {
                let chosen = resolve_choice(field, value)?;
                self.frame_count = chosen.parse().map_err(|_| {
                    MockupError::InvalidParameter(format!("'{}' is not a frame count", chosen))
                })?;
            }
            FormField::Category => self.category = resolve_choice(field, value)?,
            FormField::MockupStyle => self.mockup_style = resolve_choice(field, value)?,
            FormField::Lighting => self.lighting = resolve_choice(field, value)?,
            FormField::Resolution => self.resolution = resolve_choice(field, value)?,
        }
        Ok(())
    }

    /// Move an enumerated field to its next option, wrapping around
    pub fn cycle(&mut self, field: FormField, forward: bool) -> Result<(), MockupError> {
        let Some(options) = field.options() else {
            return Ok(());
        };
        let current = self.value(field);
        let idx = options.iter().position(|o| *o == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % options.len()
        } else {
            (idx + options.len() - 1) % options.len()
        };
        self.set(field, &options[next])
    }

    /// Validate selections and the image path, returning the pieces a request needs
    pub fn validate(&self) -> Result<&std::path::Path, MockupError> {
        let path = self
            .product_image
            .as_deref()
            .ok_or_else(|| MockupError::Validation("Please upload a product image.".to_string()))?;

        if self.output_kind != OutputKind::Static && !FRAME_COUNTS.contains(&self.frame_count) {
            return Err(MockupError::InvalidParameter(format!(
                "Frame count must be one of {:?}",
                FRAME_COUNTS
            )));
        }
        Ok(path)
    }

    /// Build a fresh request from the current selections and an encoded image
    pub fn build_request(&self, source: SourceImage) -> GenerationRequest {
        GenerationRequest {
            category: self.category.clone(),
            mockup_style: self.mockup_style.clone(),
            lighting: self.lighting.clone(),
            resolution: self.resolution.clone(),
            ..GenerationRequest::new(source)
        }
        .with_output_kind(self.output_kind)
        .with_frame_count(self.frame_count)
        .with_reflections(self.reflections)
        .with_watermark(self.watermark.clone())
    }

    /// Validate, load and encode the product image, and build the request
    pub async fn submit(&self) -> Result<GenerationRequest, MockupError> {
        let path = self.validate()?;
        let source = super::encoder::load_source_image(path).await?;
        Ok(self.build_request(source))
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Match a value against a field's options by exact label (case-insensitive) or 1-based index
pub fn resolve_choice(field: FormField, value: &str) -> Result<String, MockupError> {
    let options = field.options().unwrap_or_default();

    if let Some(found) = options.iter().find(|o| o.eq_ignore_ascii_case(value)) {
        return Ok(found.clone());
    }
    if let Ok(n) = value.parse::<usize>() {
        if field != FormField::FrameCount && (1..=options.len()).contains(&n) {
            return Ok(options[n - 1].clone());
        }
    }

    Err(MockupError::InvalidParameter(format!(
        "Invalid value '{}' for {}. Valid values: {}",
        value,
        field.label().trim(),
        options.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_form() {
        let form = MockupForm::default();
        assert_eq!(form.output_kind, OutputKind::LoopingImage);
        assert_eq!(form.frame_count, 24);
        assert_eq!(form.resolution, "Medium (1080p)");
        assert!(form.reflections);
    }

    #[tokio::test]
    async fn submit_without_image_is_rejected() {
        let err = MockupForm::default().submit().await.unwrap_err();
        assert!(matches!(err, MockupError::Validation(ref m) if m == "Please upload a product image."));
    }

    #[test]
    fn frame_count_hidden_for_static() {
        let mut form = MockupForm::default();
        assert!(form.visible_fields().contains(&FormField::FrameCount));
        form.output_kind = OutputKind::Static;
        assert!(!form.visible_fields().contains(&FormField::FrameCount));
    }

    #[test]
    fn choices_by_label_or_index() {
        let mut form = MockupForm::default();
        form.set(FormField::Category, "toys & games").unwrap();
        assert_eq!(form.category, "Toys & Games");
        form.set(FormField::Lighting, "4").unwrap();
        assert_eq!(form.lighting, "Futuristic neon light");
        form.set(FormField::FrameCount, "36").unwrap();
        assert_eq!(form.frame_count, 36);

        assert!(form.set(FormField::FrameCount, "2").is_err());
        assert!(form.set(FormField::Resolution, "8K").is_err());
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let mut form = MockupForm::default();
        form.cycle(FormField::Resolution, true).unwrap();
        assert_eq!(form.resolution, "High (4K)");
        form.cycle(FormField::Resolution, true).unwrap();
        assert_eq!(form.resolution, "Low (720p)");
        form.cycle(FormField::Resolution, false).unwrap();
        assert_eq!(form.resolution, "High (4K)");

        form.cycle(FormField::Reflections, true).unwrap();
        assert!(!form.reflections);
    }

    #[test]
    fn request_carries_selections() {
        let mut form = MockupForm::default();
        form.set(FormField::OutputKind, "static").unwrap();
        form.set(FormField::Watermark, "  ").unwrap();
        let req = form.build_request(SourceImage {
            data: "AA==".into(),
            media_type: "image/png".into(),
        });
        assert_eq!(req.total_frames(), 1);
        assert!(req.watermark.is_none());
        assert_eq!(req.category, form.category);

        form.set(FormField::OutputKind, "video").unwrap();
        form.set(FormField::FrameCount, "36").unwrap();
        form.set(FormField::Lighting, "4").unwrap();
        form.reflections = false;
        let req = form.build_request(SourceImage {
            data: "AA==".into(),
            media_type: "image/png".into(),
        });
        assert_eq!(req.total_frames(), 36);
        assert_eq!(req.lighting, "Futuristic neon light");
        assert!(!req.reflections);
    }

    #[test]
    fn validate_checks_frame_count() {
        let mut form = MockupForm {
            product_image: Some(PathBuf::from("p.png")),
            ..Default::default()
        };
        form.frame_count = 7;
        assert!(matches!(form.validate(), Err(MockupError::InvalidParameter(_))));
        form.output_kind = OutputKind::Static;
        assert!(form.validate().is_ok());
    }
}

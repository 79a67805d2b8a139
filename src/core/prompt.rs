use super::request::GenerationRequest;

/// Reflection clause, phrased by the toggle
pub fn reflection_clause(reflections: bool) -> &'static str {
    if reflections {
        "Include subtle, realistic reflections on the product and the surface."
    } else {
        "Do not include reflections."
    }
}

/// Watermark clause, empty when no watermark text is set
pub fn watermark_clause(watermark: Option<&str>) -> String {
    match watermark.map(str::trim) {
        Some(text) if !text.is_empty() => format!(
            "Add a discreet watermark with the text \"{}\" in the bottom-right corner.",
            text
        ),
        _ => String::new(),
    }
}

/// Build the instruction sent alongside the source image for one frame
pub fn build_instruction(request: &GenerationRequest, angle: u32) -> String {
    let watermark = watermark_clause(request.watermark.as_deref());
    let watermark_line = if watermark.is_empty() {
        String::new()
    } else {
        format!("7. Watermark: {}\n", watermark)
    };

    format!(
        "Task: Generate a single photorealistic 3D product visualization from the attached 2D image.\n\
         \n\
         Context:\n\
         - Product: {category}\n\
         - Original image: [attached]\n\
         \n\
         Detailed instructions:\n\
         1. 3D model: Interpret the 2D image to build a believable 3D representation of the product. Keep the original design, color, texture and branding with absolute fidelity.\n\
         2. View angle: Render the product rotated {angle} degrees around the vertical (yaw) axis. For a single static image, 30 degrees gives a good 3D perspective.\n\
         3. Scene (mockup style): Place the product in a \"{style}\" setting.\n\
         4. Lighting: Apply a \"{lighting}\" scheme.\n\
         5. Visual effects: {reflections}\n\
         6. Quality: The final image must be high quality, suitable for a {resolution} resolution.\n\
         {watermark_line}\
         \n\
         Critical requirement: The output MUST be ONLY the generated image, with no text, caption or explanation.",
        category = request.category,
        angle = angle,
        style = request.mockup_style,
        lighting = request.lighting,
        reflections = reflection_clause(request.reflections),
        resolution = request.resolution,
        watermark_line = watermark_line,
    )
}

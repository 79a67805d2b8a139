pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mockup3d",
    version,
    about = "3D product mockup generator - turn a 2D product photo into 3D and 360° views with Google Gemini",
    long_about = r#"3D product mockup generator

Turns a 2D product photo into a photorealistic 3D view, a looping 360° GIF or a
360° frame sequence. Each frame is one Gemini image generation call at a
different rotation angle.
Run without arguments to launch the interactive form.

SETUP:
  Set your API key via environment variable or config:
    export GEMINI_API_KEY=your-key-here
    mockup3d config set api.key your-key-here

EXAMPLES:
  Static 3D view:
    mockup3d generate product.png --kind static

  Looping 360° GIF with 12 frames:
    mockup3d generate sneaker.jpg --kind gif --frames 12

  Video frame sequence with a watermark:
    mockup3d g mug.png --kind video --frames 36 --watermark MyShop.com

  List the available categories, styles and lighting:
    mockup3d options

OUTPUT FORMATS:
  --format text   Human-readable output (default)
  --format json   Machine-readable JSON
  --format quiet  Minimal output, just file paths"#,
    after_help = r#"CONFIGURATION:
  Config file: ~/.config/mockup3d/config.toml (Linux)

  Enumerated options (category, style, lighting, resolution) accept the full
  label or its 1-based number from `mockup3d options`."#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a 3D mockup from a product image
    ///
    /// Frames are requested one at a time; the first failure stops the run.
    #[command(alias = "g")]
    Generate(commands::generate::GenerateArgs),

    /// List the choices for every form option
    Options(commands::options::OptionsArgs),

    /// View and modify configuration
    Config(commands::config::ConfigArgs),
}

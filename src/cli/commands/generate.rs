use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::GeminiClient;
use crate::config::{Config, DisplayMode};
use crate::core::session::{phase_message, progress_text};
use crate::core::{generate_frames, FormField, GenerationRequest, GenerationResult, MockupError, MockupForm};
use crate::output::{save_run, RunSettings, SavedRun};

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to the product image (PNG, JPEG, WebP; up to 10 MB)
    #[arg(required = true)]
    pub image: PathBuf,

    /// Product category (label or number from `mockup3d options`)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Mockup style / scene
    #[arg(long)]
    pub style: Option<String>,

    /// Output type (static, gif, video)
    #[arg(short, long)]
    pub kind: Option<String>,

    /// Rotation frames for gif/video (12, 24, 36)
    #[arg(long)]
    pub frames: Option<u32>,

    /// Lighting style
    #[arg(short, long)]
    pub lighting: Option<String>,

    /// Leave out reflections
    #[arg(long)]
    pub no_reflections: bool,

    /// Resolution label
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Watermark text placed in the bottom-right corner
    #[arg(short, long)]
    pub watermark: Option<String>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output directory for the generated frames
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't write frames to disk
    #[arg(long)]
    pub no_save: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Form pre-filled from config, with command-line overrides applied
pub fn build_form(args: &GenerateArgs, config: &Config) -> Result<MockupForm, MockupError> {
    let mut form = config.form_defaults();
    form.product_image = Some(args.image.clone());

    let overrides = [
        (FormField::Category, args.category.clone()),
        (FormField::MockupStyle, args.style.clone()),
        (FormField::OutputKind, args.kind.clone()),
        (FormField::FrameCount, args.frames.map(|n| n.to_string())),
        (FormField::Lighting, args.lighting.clone()),
        (FormField::Resolution, args.resolution.clone()),
        (FormField::Watermark, args.watermark.clone()),
    ];
    for (field, value) in overrides {
        if let Some(value) = value {
            form.set(field, &value)?;
        }
    }
    if args.no_reflections {
        form.reflections = false;
    }

    Ok(form)
}

/// Validate the selections, then load and encode the product image
pub async fn prepare_request(args: &GenerateArgs, config: &Config) -> Result<GenerationRequest> {
    let form = build_form(args, config)?;
    form.validate()?;
    let request = form
        .submit()
        .await
        .with_context(|| format!("Failed to load product image {}", args.image.display()))?;
    Ok(request)
}

pub async fn run(args: GenerateArgs, config: &Config) -> Result<()> {
    let request = prepare_request(&args, config).await?;

    let mut client = GeminiClient::from_config(config)?;
    if let Some(model) = &args.model {
        client = client.with_model(model);
    }

    let total = request.total_frames();
    let kind = request.output_kind;

    // Show progress
    let pb = if args.format == "text" {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.yellow} [{bar:30.cyan/blue}] {pos:>3}% {msg}")?
                .progress_chars("=> "),
        );
        pb.set_message(format!("{} {}", progress_text(0, total, kind), phase_message(0).dimmed()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    tracing::info!("Generating {} frame(s) of kind {}", total, kind);

    let outcome = generate_frames(&client, &request, |percent| {
        if let Some(pb) = &pb {
            pb.set_position(u64::from(percent));
            pb.set_message(format!(
                "{} {}",
                progress_text(percent, total, kind),
                phase_message(percent).dimmed()
            ));
        }
    })
    .await;

    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            if let Some(pb) = &pb {
                pb.abandon_with_message(format!("{} Generation failed", "✗".red()));
            }
            if args.format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "status": "failed",
                        "error_kind": e.kind(),
                        "error": e.to_string(),
                    }))?
                );
            } else if args.format != "quiet" {
                eprintln!("{}: {}", "Generation Error".red().bold(), e);
            }
            // Already reported above
            std::process::exit(1);
        }
    };

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    if args.no_save || !config.output.auto_save {
        if let Some(pb) = &pb {
            pb.finish_with_message(format!(
                "{} Generated {} frame(s) (not saved)",
                "✓".green(),
                result.len()
            ));
        }
        if args.format == "json" {
            print_unsaved_json(&result)?;
        }
        return Ok(());
    }

    let settings = RunSettings::from_request(&request, client.model());
    let saved = save_run(&result, settings, &output_dir, config.frame_interval()).await?;

    if let Some(pb) = &pb {
        pb.finish_with_message(format!("{} Generated {} frame(s)", "✓".green(), result.len()));
    }

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&saved)?),
        "quiet" => {
            if let Some(animation) = &saved.animation {
                println!("{}", animation.display());
            }
            for path in &saved.frames {
                println!("{}", path.display());
            }
        }
        _ => {
            print_summary(&saved);
            if config.output.display == DisplayMode::Terminal {
                if let Some(first) = saved.frames.first() {
                    println!();
                    display_image_terminal(first);
                }
            }
        }
    }

    Ok(())
}

fn print_summary(saved: &SavedRun) {
    let s = &saved.settings;
    println!();
    println!("{}: {}", "Run ID".cyan().bold(), saved.run_id);
    println!("{}: {}", "Output".cyan().bold(), s.output_kind.display_name());
    println!("{}: {}", "Category".cyan().bold(), s.category);
    println!("{}: {}", "Style".cyan().bold(), s.mockup_style);
    println!("{}: {}", "Lighting".cyan().bold(), s.lighting);
    println!("{}: {}", "Model".cyan().bold(), s.model);
    println!("{}: {}", "Status".cyan().bold(), "completed".green());
    println!();
    if let Some(animation) = &saved.animation {
        println!("{}: {}", "Animation".cyan().bold(), animation.display());
    }
    println!("{}:", "Frames".cyan().bold());
    for (path, angle) in saved.frames.iter().zip(&saved.angles) {
        println!("  {:>3}°  {}", angle, path.display());
    }
    println!("{}", format!("Manifest: {}", saved.manifest.display()).dimmed());
}

fn print_unsaved_json(result: &GenerationResult) -> Result<()> {
    let frames: Vec<_> = result
        .frames()
        .iter()
        .map(|f| {
            json!({
                "index": f.index,
                "angle": f.angle,
                "media_type": f.media_type,
                "data_url": f.data_url(),
            })
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "status": "completed",
            "output_kind": result.kind(),
            "frames": frames,
        }))?
    );
    Ok(())
}

/// Display an image in the terminal using viuer
fn display_image_terminal(path: &std::path::Path) {
    let conf = viuer::Config {
        width: Some(80),
        height: Some(30),
        absolute_offset: false,
        ..Default::default()
    };

    if let Err(e) = viuer::print_from_file(path, &conf) {
        tracing::debug!("Failed to display image in terminal: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::core::OutputKind;
    use clap::Parser;

    fn args(extra: &[&str]) -> GenerateArgs {
        let mut argv = vec!["mockup3d", "generate", "product.png"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Generate(args)) => args,
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn config_defaults_fill_the_form() {
        let mut config = Config::default();
        config.set("defaults.output_kind", "static").unwrap();

        let form = build_form(&args(&[]), &config).unwrap();
        assert_eq!(form.output_kind, OutputKind::Static);
        assert_eq!(form.product_image, Some(PathBuf::from("product.png")));
        assert!(form.reflections);
    }

    #[test]
    fn flags_override_defaults() {
        let form = build_form(
            &args(&["--kind", "video", "--frames", "36", "--category", "3", "--no-reflections"]),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(form.output_kind, OutputKind::Video);
        assert_eq!(form.frame_count, 36);
        assert_eq!(form.category, "Furniture & Decor");
        assert!(!form.reflections);
    }

    #[test]
    fn bad_choice_is_rejected() {
        let err = build_form(&args(&["--frames", "13"]), &Config::default()).unwrap_err();
        assert!(matches!(err, MockupError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn invalid_config_frames_are_not_reported_as_image_errors() {
        let mut config = Config::default();
        config.defaults.output_kind = OutputKind::Video;
        config.defaults.frame_count = 10;

        let err = prepare_request(&args(&[]), &config).await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.starts_with("Invalid parameter"), "{}", message);
        assert!(!message.contains("product image"));
    }

    #[tokio::test]
    async fn unreadable_image_names_the_file() {
        let err = prepare_request(&args(&[]), &Config::default()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load product image product.png"));
    }
}

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::config::Config;
use crate::core::request::{CATEGORIES, FRAME_COUNTS, LIGHTING_STYLES, MOCKUP_STYLES, RESOLUTIONS};
use crate::core::OutputKind;

#[derive(Args)]
pub struct OptionsArgs {
    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

pub fn run(args: OptionsArgs) -> Result<()> {
    if args.format == "json" {
        let kinds: Vec<_> = OutputKind::all()
            .iter()
            .map(|k| json!({"id": k.as_str(), "name": k.display_name()}))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "categories": CATEGORIES,
                "mockup_styles": MOCKUP_STYLES,
                "output_kinds": kinds,
                "frame_counts": FRAME_COUNTS,
                "lighting": LIGHTING_STYLES,
                "resolutions": RESOLUTIONS,
                "models": Config::models(),
            }))?
        );
        return Ok(());
    }

    print_list("Categories (--category)", CATEGORIES);
    print_list("Mockup styles (--style)", MOCKUP_STYLES);

    println!("{}", "Output types (--kind)".cyan().bold());
    for kind in OutputKind::all() {
        println!("  {:<8} {}", kind.as_str(), kind.display_name().dimmed());
    }
    println!();

    println!("{}", "Rotation frames (--frames)".cyan().bold());
    let counts: Vec<String> = FRAME_COUNTS.iter().map(|n| n.to_string()).collect();
    println!("  {}", counts.join(", "));
    println!();

    print_list("Lighting (--lighting)", LIGHTING_STYLES);
    print_list("Resolutions (--resolution)", RESOLUTIONS);
    print_list("Models (--model)", Config::models());

    Ok(())
}

fn print_list(title: &str, items: &[&str]) {
    println!("{}", title.cyan().bold());
    for (i, item) in items.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, item);
    }
    println!();
}

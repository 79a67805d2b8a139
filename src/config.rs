use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::form::{resolve_choice, FormField, MockupForm};
use crate::core::OutputKind;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tui: TuiConfig,

    #[serde(skip)]
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Initial form selections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_mockup_style")]
    pub mockup_style: String,
    #[serde(default)]
    pub output_kind: OutputKind,
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
    #[serde(default = "default_lighting")]
    pub lighting: String,
    #[serde(default = "default_true")]
    pub reflections: bool,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default)]
    pub watermark: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub auto_save: bool,
    #[serde(default = "default_display")]
    pub display: DisplayMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Delay between frames when cycling an animation
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Terminal,
    None,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Terminal => "terminal",
            DisplayMode::None => "none",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "terminal" => Ok(DisplayMode::Terminal),
            "none" => Ok(DisplayMode::None),
            _ => anyhow::bail!("Invalid display mode. Valid values: {}", Self::variants().join(", ")),
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["terminal", "none"]
    }
}

// Default value functions
fn default_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_category() -> String {
    MockupForm::default().category
}

fn default_mockup_style() -> String {
    MockupForm::default().mockup_style
}

fn default_frame_count() -> u32 {
    MockupForm::default().frame_count
}

fn default_lighting() -> String {
    MockupForm::default().lighting
}

fn default_resolution() -> String {
    MockupForm::default().resolution
}

fn default_output_directory() -> String {
    "./mockup3d-output".to_string()
}

fn default_true() -> bool {
    true
}

fn default_display() -> DisplayMode {
    DisplayMode::Terminal
}

fn default_frame_interval_ms() -> u64 {
    100
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let form = MockupForm::default();
        Self {
            category: form.category,
            mockup_style: form.mockup_style,
            output_kind: form.output_kind,
            frame_count: form.frame_count,
            lighting: form.lighting,
            reflections: form.reflections,
            resolution: form.resolution,
            watermark: form.watermark,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            auto_save: true,
            display: DisplayMode::Terminal,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            theme: default_theme(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            defaults: DefaultsConfig::default(),
            output: OutputConfig::default(),
            tui: TuiConfig::default(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "mockup3d", "mockup3d")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file or create default
    pub fn load_or_create() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;

        // Environment variable takes precedence
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.api.key = Some(key);
        }

        Ok(config)
    }

    /// Load config from a specific file, writing defaults there if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&content)
                .context("Failed to parse config file")?;
            config.config_path = path.to_path_buf();
            Ok(config)
        } else {
            let config = Config {
                config_path: path.to_path_buf(),
                ..Config::default()
            };
            config.save()?;
            Ok(config)
        }
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&self.config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// API key, after the GEMINI_API_KEY override applied at load
    pub fn api_key(&self) -> Option<&str> {
        self.api.key.as_deref()
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.tui.frame_interval_ms.max(1))
    }

    /// Form pre-filled with the configured defaults
    pub fn form_defaults(&self) -> MockupForm {
        let d = &self.defaults;
        MockupForm {
            product_image: None,
            category: d.category.clone(),
            mockup_style: d.mockup_style.clone(),
            output_kind: d.output_kind,
            frame_count: d.frame_count,
            lighting: d.lighting.clone(),
            reflections: d.reflections,
            resolution: d.resolution.clone(),
            watermark: d.watermark.clone(),
        }
    }

    /// Set a config value by key path (e.g., "api.key", "defaults.frame_count")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.key" => self.api.key = Some(value.to_string()),
            "api.model" => self.api.model = value.to_string(),
            "api.base_url" => self.api.base_url = value.to_string(),
            "defaults.category" => self.defaults.category = resolve_choice(FormField::Category, value)?,
            "defaults.mockup_style" => {
                self.defaults.mockup_style = resolve_choice(FormField::MockupStyle, value)?
            }
            "defaults.output_kind" => self.defaults.output_kind = OutputKind::parse(value)?,
            "defaults.frame_count" => {
                self.defaults.frame_count = resolve_choice(FormField::FrameCount, value)?
                    .parse()
                    .context("Invalid frame count")?;
            }
            "defaults.lighting" => self.defaults.lighting = resolve_choice(FormField::Lighting, value)?,
            "defaults.reflections" => {
                self.defaults.reflections = value.parse()
                    .context("Invalid boolean value")?;
            }
            "defaults.resolution" => {
                self.defaults.resolution = resolve_choice(FormField::Resolution, value)?
            }
            "defaults.watermark" => self.defaults.watermark = value.to_string(),
            "output.directory" => self.output.directory = value.to_string(),
            "output.auto_save" => {
                self.output.auto_save = value.parse()
                    .context("Invalid boolean value")?;
            }
            "output.display" => self.output.display = DisplayMode::parse(value)?,
            "tui.frame_interval_ms" => {
                self.tui.frame_interval_ms = value.parse()
                    .context("Invalid number of milliseconds")?;
            }
            "tui.theme" => self.tui.theme = value.to_string(),
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.key" => self.api.key.clone().map(|_| "****".to_string()), // Mask API key
            "api.model" => Some(self.api.model.clone()),
            "api.base_url" => Some(self.api.base_url.clone()),
            "defaults.category" => Some(self.defaults.category.clone()),
            "defaults.mockup_style" => Some(self.defaults.mockup_style.clone()),
            "defaults.output_kind" => Some(self.defaults.output_kind.as_str().to_string()),
            "defaults.frame_count" => Some(self.defaults.frame_count.to_string()),
            "defaults.lighting" => Some(self.defaults.lighting.clone()),
            "defaults.reflections" => Some(self.defaults.reflections.to_string()),
            "defaults.resolution" => Some(self.defaults.resolution.clone()),
            "defaults.watermark" => Some(self.defaults.watermark.clone()),
            "output.directory" => Some(self.output.directory.clone()),
            "output.auto_save" => Some(self.output.auto_save.to_string()),
            "output.display" => Some(self.output.display.as_str().to_string()),
            "tui.frame_interval_ms" => Some(self.tui.frame_interval_ms.to_string()),
            "tui.theme" => Some(self.tui.theme.clone()),
            _ => None,
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "api.key",
            "api.model",
            "api.base_url",
            "defaults.category",
            "defaults.mockup_style",
            "defaults.output_kind",
            "defaults.frame_count",
            "defaults.lighting",
            "defaults.reflections",
            "defaults.resolution",
            "defaults.watermark",
            "output.directory",
            "output.auto_save",
            "output.display",
            "tui.frame_interval_ms",
            "tui.theme",
        ]
    }

    /// Available models
    pub fn models() -> &'static [&'static str] {
        &["gemini-2.5-flash-image", "gemini-3-pro-image-preview"]
    }
}

//! Plugin configuration module.
//!
//! The host photo-booth owns the configuration file. It hands the plugin a
//! flat, stringly-typed view of it: sections of `key = value` pairs. This
//! module turns that view into a typed [`Settings`] snapshot, once, at
//! startup.
//!
//! ## Sections
//!
//! ```toml
//! [gallery]                 # owned by this plugin, see GALLERY_OPTIONS
//! gallery_size = "300x300"
//! gallery_base_url = ""
//!
//! [downloader]              # foreign, read-only
//! base_url = "http://booth.local/photos/"
//!
//! [qrcode]                  # foreign, read-only, never created here
//! save = "yes"
//! suffix = "_qrcode"
//! ext = "png"
//! save_path = ""
//! ```
//!
//! Top-level keys outside any table land in the `default` section, which is
//! the last fallback for `base_url`.
//!
//! ## Parsing Rules
//!
//! Resolution never fails. Every option has a default, and malformed values
//! fall back to it:
//!
//! - Booleans: `1`, `true`, `yes`, `on` (any case) are true, anything else false.
//! - `gallery_size`: `WxH` with two positive integers, else `300x300`.
//! - `gallery_quality`: integer clamped to 1–100, else `85`.
//! - `gallery_qrcode_wait_seconds`: non-negative float, else `1.0`. Capped
//!   at [`MAX_QRCODE_WAIT`].
//!
//! An empty value counts as unset.

use crate::imaging::Quality;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

pub const GALLERY_SECTION: &str = "gallery";
pub const DOWNLOADER_SECTION: &str = "downloader";
pub const DEFAULT_SECTION: &str = "default";
pub const QRCODE_SECTION: &str = "qrcode";

pub const DEFAULT_SIZE: (u32, u32) = (300, 300);
pub const DEFAULT_QUALITY: u32 = 85;
pub const DEFAULT_QRCODE_WAIT: Duration = Duration::from_secs(1);
/// Longest QR wait accepted from config. The wait blocks the host.
pub const MAX_QRCODE_WAIT: Duration = Duration::from_secs(60);
pub const DEFAULT_QRCODE_SUFFIX: &str = "_qrcode";
pub const DEFAULT_QRCODE_EXT: &str = "png";

/// A single option registered with the host during the configure hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOption {
    pub section: &'static str,
    pub name: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

const fn gallery_option(
    name: &'static str,
    default: &'static str,
    description: &'static str,
) -> ConfigOption {
    ConfigOption {
        section: GALLERY_SECTION,
        name,
        default,
        description,
    }
}

/// Every option of the `[gallery]` section. The QR section is deliberately
/// absent: it belongs to the QR-code plugin.
pub const GALLERY_OPTIONS: &[ConfigOption] = &[
    gallery_option("gallery_enabled", "yes", "Enable gallery plugin features"),
    gallery_option("gallery_size", "300x300", "Thumbnail size WxH"),
    gallery_option("gallery_suffix", "_thumb", "Suffix for thumbnail files"),
    gallery_option("gallery_quality", "85", "JPEG quality for thumbnails"),
    gallery_option(
        "gallery_output_folder",
        "",
        "Optional subfolder near image to write thumbs",
    ),
    gallery_option(
        "gallery_keep_aspect",
        "yes",
        "Keep aspect ratio when resizing",
    ),
    gallery_option(
        "gallery_update_manifest",
        "yes",
        "Update or create thumbs.json after thumbnail creation",
    ),
    gallery_option(
        "gallery_manifest_name",
        "thumbs.json",
        "Manifest filename to write/update in image directory",
    ),
    gallery_option(
        "gallery_manifest_include_base_url",
        "yes",
        "Include base_url (from GALLERY_BASE_URL or DOWNLOADER) when writing manifest entries",
    ),
    gallery_option(
        "gallery_template",
        "",
        "Optional path to gallery_template.html",
    ),
    gallery_option(
        "gallery_output",
        "gallery.html",
        "Output filename for gallery HTML",
    ),
    gallery_option(
        "gallery_base_url",
        "",
        "Optional base URL to prefix thumb/full entries and gallery links",
    ),
    gallery_option(
        "gallery_qrcode_wait_seconds",
        "1.0",
        "Seconds to wait/poll for qrcode file before writing manifest",
    ),
];

/// Options registered by plugins during the configure hook.
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    options: Vec<ConfigOption>,
}

impl OptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an option. Re-registering the same section/name replaces it.
    pub fn add_option(&mut self, option: ConfigOption) {
        match self
            .options
            .iter_mut()
            .find(|o| o.section == option.section && o.name == option.name)
        {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
    }

    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    pub fn find(&self, section: &str, name: &str) -> Option<&ConfigOption> {
        self.options
            .iter()
            .find(|o| o.section.eq_ignore_ascii_case(section) && o.name.eq_ignore_ascii_case(name))
    }
}

/// The host's configuration as raw strings, grouped by section.
///
/// Section and key names are case-insensitive. Reads never insert anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_ascii_lowercase())
            .or_default()
            .insert(key.to_ascii_lowercase(), value.into());
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(&section.to_ascii_lowercase())?
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(&section.to_ascii_lowercase())
    }

    /// Fill registered defaults for keys the user left unset.
    ///
    /// Explicitly set values, even empty ones, are kept.
    pub fn apply_defaults(&mut self, registry: &OptionRegistry) {
        for option in registry.options() {
            if self.get(option.section, option.name).is_none() {
                self.set(option.section, option.name, option.default);
            }
        }
    }

    /// Parse a TOML document into raw sections.
    ///
    /// Tables become sections, top-level scalars go to `default`. Scalars of
    /// any type are stringified; arrays and nested tables are rejected.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let mut config = Self::new();
        for (key, value) in table {
            match value {
                toml::Value::Table(section) => {
                    for (name, value) in section {
                        let raw = scalar_to_string(&value).ok_or_else(|| {
                            ConfigError::Validation(format!(
                                "{key}.{name} must be a string, number or boolean"
                            ))
                        })?;
                        config.set(&key, &name, raw);
                    }
                }
                other => {
                    let raw = scalar_to_string(&other).ok_or_else(|| {
                        ConfigError::Validation(format!(
                            "{key} must be a string, number or boolean"
                        ))
                    })?;
                    config.set(DEFAULT_SECTION, &key, raw);
                }
            }
        }
        Ok(config)
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Load the host configuration file.
///
/// Returns an empty config if the file doesn't exist.
/// Returns `Err` if the file exists but isn't valid TOML.
pub fn load_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    if !path.exists() {
        return Ok(RawConfig::new());
    }
    let content = fs::read_to_string(path)?;
    RawConfig::from_toml_str(&content)
}

/// QR-code discovery parameters, borrowed from the QR plugin's section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSettings {
    /// Whether the QR plugin saves its images to disk at all.
    pub save: bool,
    pub suffix: String,
    /// Extension without the leading dot.
    pub ext: String,
    pub save_path: Option<PathBuf>,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            save: false,
            suffix: DEFAULT_QRCODE_SUFFIX.to_string(),
            ext: DEFAULT_QRCODE_EXT.to_string(),
            save_path: None,
        }
    }
}

impl QrSettings {
    /// Read the `[qrcode]` section if it exists. A missing section disables
    /// QR discovery by filename.
    pub fn resolve(raw: &RawConfig) -> Self {
        if !raw.has_section(QRCODE_SECTION) {
            return Self::default();
        }
        let defaults = Self::default();
        let save = raw
            .get(QRCODE_SECTION, "save")
            .map(parse_bool)
            .unwrap_or(false);
        let suffix = raw
            .get(QRCODE_SECTION, "suffix")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.suffix);
        let ext = raw
            .get(QRCODE_SECTION, "ext")
            .map(|e| e.trim().trim_start_matches('.'))
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .unwrap_or(defaults.ext);
        let save_path = raw
            .get(QRCODE_SECTION, "save_path")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self {
            save,
            suffix,
            ext,
            save_path,
        }
    }
}

/// Typed settings snapshot, derived once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub enabled: bool,
    /// Thumbnail bounding box as `(width, height)`.
    pub size: (u32, u32),
    pub suffix: String,
    pub quality: Quality,
    /// Subfolder of the picture directory for thumbnails.
    pub output_folder: Option<String>,
    pub keep_aspect: bool,
    pub update_manifest: bool,
    pub manifest_name: String,
    pub include_base_url: bool,
    pub template: Option<PathBuf>,
    /// Gallery page filename, written next to the picture.
    pub output: String,
    pub base_url: Option<String>,
    pub qrcode_wait: Duration,
    pub qrcode: QrSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self::resolve(&RawConfig::new())
    }
}

impl Settings {
    /// Resolve every option from the raw config, falling back to defaults.
    pub fn resolve(raw: &RawConfig) -> Self {
        Self {
            enabled: gallery_bool(raw, "gallery_enabled", true),
            size: gallery_value(raw, "gallery_size")
                .map(parse_size)
                .unwrap_or(DEFAULT_SIZE),
            suffix: gallery_string(raw, "gallery_suffix", "_thumb"),
            quality: gallery_value(raw, "gallery_quality")
                .map(parse_quality)
                .unwrap_or(Quality::new(DEFAULT_QUALITY)),
            output_folder: gallery_value(raw, "gallery_output_folder").map(str::to_string),
            keep_aspect: gallery_bool(raw, "gallery_keep_aspect", true),
            update_manifest: gallery_bool(raw, "gallery_update_manifest", true),
            manifest_name: gallery_string(raw, "gallery_manifest_name", "thumbs.json"),
            include_base_url: gallery_bool(raw, "gallery_manifest_include_base_url", true),
            template: gallery_value(raw, "gallery_template").map(PathBuf::from),
            output: gallery_string(raw, "gallery_output", "gallery.html"),
            base_url: resolve_base_url(raw),
            qrcode_wait: gallery_value(raw, "gallery_qrcode_wait_seconds")
                .map(parse_wait_seconds)
                .unwrap_or(DEFAULT_QRCODE_WAIT),
            qrcode: QrSettings::resolve(raw),
        }
    }

    /// Base URL to prefix manifest entries with, if enabled.
    pub fn manifest_base_url(&self) -> Option<&str> {
        if self.include_base_url {
            self.base_url.as_deref()
        } else {
            None
        }
    }
}

fn gallery_value<'a>(raw: &'a RawConfig, key: &str) -> Option<&'a str> {
    raw.get(GALLERY_SECTION, key).filter(|v| !v.trim().is_empty())
}

fn gallery_bool(raw: &RawConfig, key: &str, default: bool) -> bool {
    gallery_value(raw, key).map(parse_bool).unwrap_or(default)
}

fn gallery_string(raw: &RawConfig, key: &str, default: &str) -> String {
    gallery_value(raw, key).unwrap_or(default).to_string()
}

/// Explicit gallery URL, then `downloader.base_url`, then `default.base_url`.
fn resolve_base_url(raw: &RawConfig) -> Option<String> {
    [
        (GALLERY_SECTION, "gallery_base_url"),
        (DOWNLOADER_SECTION, "base_url"),
        (DEFAULT_SECTION, "base_url"),
    ]
    .into_iter()
    .filter_map(|(section, key)| raw.get(section, key))
    .map(str::trim)
    .find(|url| !url.is_empty())
    .map(str::to_string)
}

/// `1`, `true`, `yes` and `on` are true (case-insensitive); anything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a `WxH` size string. Anything malformed yields [`DEFAULT_SIZE`].
///
/// ```
/// # use booth_gallery::config::parse_size;
/// assert_eq!(parse_size("640x480"), (640, 480));
/// assert_eq!(parse_size("200X100"), (200, 100));
/// assert_eq!(parse_size("big"), (300, 300));
/// ```
pub fn parse_size(value: &str) -> (u32, u32) {
    let lower = value.to_ascii_lowercase();
    let mut parts = lower.split('x');
    let parsed = match (parts.next(), parts.next(), parts.next()) {
        (Some(w), Some(h), None) => w.trim().parse::<u32>().ok().zip(h.trim().parse().ok()),
        _ => None,
    };
    match parsed {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => DEFAULT_SIZE,
    }
}

/// Parse a JPEG quality, clamped to 1–100. Non-integers yield 85.
pub fn parse_quality(value: &str) -> Quality {
    match value.trim().parse::<i64>() {
        Ok(q) => Quality::new(q.clamp(1, 100) as u32),
        Err(_) => Quality::new(DEFAULT_QUALITY),
    }
}

/// Parse a wait duration in seconds. Negative, non-finite or malformed
/// values yield one second; anything above [`MAX_QRCODE_WAIT`] is capped.
pub fn parse_wait_seconds(value: &str) -> Duration {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| {
            if secs == 0.0 {
                Duration::ZERO
            } else {
                Duration::from_secs_f64(secs.min(MAX_QRCODE_WAIT.as_secs_f64()))
            }
        })
        .unwrap_or(DEFAULT_QRCODE_WAIT)
}

/// Render a documented TOML block with every registered option at its default.
pub fn stock_config_toml(registry: &OptionRegistry) -> String {
    let mut sections: Vec<&str> = Vec::new();
    for option in registry.options() {
        if !sections.contains(&option.section) {
            sections.push(option.section);
        }
    }

    let mut out = String::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("[{section}]\n"));
        for option in registry.options().iter().filter(|o| o.section == *section) {
            out.push_str(&format!("# {}\n", option.description));
            out.push_str(&format!("{} = {:?}\n", option.name, option.default));
        }
    }
    out
}

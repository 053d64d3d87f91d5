//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Capture
//!
//! ```text
//! photo1.jpg → photo1_thumb.jpg (300x225)
//!     Source: /booth/photo1.jpg
//!     QR code: photo1_qrcode.png
//!     Manifest: thumbs.json (2 entries)
//!     Gallery: skipped
//! ```
//!
//! Early exits print a single line, e.g. `Skipped: gallery disabled`.
//!
//! ## Settings
//!
//! ```text
//! Gallery
//!     enabled: yes
//!     size: 300x300 (keep aspect)
//!     ...
//! QR code
//!     save: no
//!     ...
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::config::{OptionRegistry, Settings};
use crate::plugin::{CaptureOutcome, CaptureReport, StageStatus};
use std::fmt::Display;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name for display, or the whole path when it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn stage_line<T, E: Display>(
    label: &str,
    status: &StageStatus<T, E>,
    done: impl FnOnce(&T) -> String,
) -> String {
    let detail = match status {
        StageStatus::Done(value) => done(value),
        StageStatus::Skipped => "skipped".to_string(),
        StageStatus::Failed(error) => format!("failed: {error}"),
    };
    format!("{}{}: {}", indent(1), label, detail)
}

// ============================================================================
// Capture
// ============================================================================

fn format_report(report: &CaptureReport) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} \u{2192} {} ({}x{})",
            display_name(&report.picture),
            display_name(&report.thumbnail),
            report.thumbnail_size.width,
            report.thumbnail_size.height
        ),
        format!("{}Source: {}", indent(1), report.picture.display()),
    ];

    lines.push(match &report.qrcode {
        Some(qr) => format!("{}QR code: {}", indent(1), display_name(qr)),
        None => format!("{}QR code: none", indent(1)),
    });
    lines.push(stage_line("Manifest", &report.manifest, |update| {
        format!("{} ({} entries)", display_name(&update.path), update.entries)
    }));
    lines.push(stage_line("Gallery", &report.gallery, |output| {
        display_name(output)
    }));
    lines
}

/// Format the outcome of one capture event.
pub fn format_capture_outcome(outcome: &CaptureOutcome) -> Vec<String> {
    match outcome {
        CaptureOutcome::Disabled => vec!["Skipped: gallery disabled".to_string()],
        CaptureOutcome::NoPicture => vec!["Skipped: no picture in context".to_string()],
        CaptureOutcome::PictureMissing(path) => {
            vec![format!("Skipped: picture not found: {}", path.display())]
        }
        CaptureOutcome::ThumbnailFailed { picture, error } => vec![
            format!("{} \u{2192} thumbnail failed", display_name(picture)),
            format!("{}Source: {}", indent(1), picture.display()),
            format!("{}Error: {}", indent(1), error),
        ],
        CaptureOutcome::Completed(report) => format_report(report),
    }
}

pub fn print_capture_outcome(outcome: &CaptureOutcome) {
    for line in format_capture_outcome(outcome) {
        println!("{}", line);
    }
}

// ============================================================================
// Settings and options
// ============================================================================

/// Format the resolved settings snapshot.
pub fn format_settings(settings: &Settings) -> Vec<String> {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "(none)".to_string());
    let aspect = if settings.keep_aspect {
        "keep aspect"
    } else {
        "exact"
    };

    let field = |name: &str, value: String| format!("{}{}: {}", indent(1), name, value);
    let qr = &settings.qrcode;
    vec![
        "Gallery".to_string(),
        field("enabled", yes_no(settings.enabled).to_string()),
        field(
            "size",
            format!("{}x{} ({})", settings.size.0, settings.size.1, aspect),
        ),
        field("quality", settings.quality.value().to_string()),
        field("suffix", settings.suffix.clone()),
        field("output folder", optional(settings.output_folder.clone())),
        field(
            "manifest",
            if settings.update_manifest {
                settings.manifest_name.clone()
            } else {
                "disabled".to_string()
            },
        ),
        field("base url", optional(settings.base_url.clone())),
        field(
            "base url in manifest",
            yes_no(settings.include_base_url).to_string(),
        ),
        field(
            "template",
            optional(settings.template.as_ref().map(|t| t.display().to_string())),
        ),
        field("output", settings.output.clone()),
        field(
            "qrcode wait",
            format!("{:.1}s", settings.qrcode_wait.as_secs_f64()),
        ),
        "QR code".to_string(),
        field("save", yes_no(qr.save).to_string()),
        field("suffix", qr.suffix.clone()),
        field("ext", qr.ext.clone()),
        field(
            "save path",
            optional(qr.save_path.as_ref().map(|p| p.display().to_string())),
        ),
    ]
}

pub fn print_settings(settings: &Settings) {
    for line in format_settings(settings) {
        println!("{}", line);
    }
}

/// Format registered options as `section.name = "default"` lines with
/// their descriptions underneath.
pub fn format_options(registry: &OptionRegistry) -> Vec<String> {
    let mut lines = Vec::new();
    for option in registry.options() {
        lines.push(format!(
            "{}.{} = {:?}",
            option.section, option.name, option.default
        ));
        lines.push(format!("{}{}", indent(1), option.description));
    }
    lines
}

pub fn print_options(registry: &OptionRegistry) {
    for line in format_options(registry) {
        println!("{}", line);
    }
}

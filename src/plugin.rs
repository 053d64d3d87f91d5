//! Host plugin hooks and the per-capture pipeline.
//!
//! The host calls [`HostPlugin`] hooks in this order: `configure` once to
//! collect options, `startup` once with the loaded config, `on_capture`
//! after every saved picture, and `cleanup` on exit.
//!
//! # Capture Pipeline
//!
//! ```text
//! locate picture → thumbnail → publish facts → locate QR → manifest → gallery
//! ```
//!
//! | Stage | On failure |
//! |---|---|
//! | locate picture | skip the event (`NoPicture`, `PictureMissing`) |
//! | thumbnail | abort the event (`ThumbnailFailed`) |
//! | locate QR | never fails; no QR code means no `qrcode` field |
//! | manifest | logged, gallery still published |
//! | gallery | logged |
//!
//! Stage functions return `Result`s. This module is the only place that
//! logs them, and nothing propagates back to the host: every path ends in a
//! [`CaptureOutcome`].

use crate::config::{GALLERY_OPTIONS, OptionRegistry, RawConfig, Settings};
use crate::context::HostContext;
use crate::gallery::{self, GalleryError};
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, RustBackend, ThumbnailConfig, create_thumbnail,
};
use crate::manifest::{self, ManifestEntry, ManifestError};
use crate::qrcode::{self, DEFAULT_POLL_INTERVAL};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The hooks a host photo-booth calls on its plugins.
pub trait HostPlugin {
    /// Register configuration options with their defaults.
    fn configure(&self, options: &mut OptionRegistry);

    /// Receive the resolved configuration.
    fn startup(&mut self, config: &RawConfig, ctx: &mut HostContext);

    /// Process the picture the host just saved.
    fn on_capture(&self, ctx: &mut HostContext) -> CaptureOutcome;

    fn cleanup(&self, _ctx: &mut HostContext) {}
}

/// How a stage that may be switched off went.
#[derive(Debug)]
pub enum StageStatus<T, E> {
    Done(T),
    Skipped,
    Failed(E),
}

impl<T, E> StageStatus<T, E> {
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A successful manifest update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestUpdate {
    pub path: PathBuf,
    pub entries: usize,
}

/// Everything produced for one capture.
#[derive(Debug)]
pub struct CaptureReport {
    pub picture: PathBuf,
    pub thumbnail: PathBuf,
    pub thumbnail_size: Dimensions,
    pub qrcode: Option<PathBuf>,
    pub manifest: StageStatus<ManifestUpdate, ManifestError>,
    pub gallery: StageStatus<PathBuf, GalleryError>,
}

/// Result of one capture event.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// `gallery_enabled` is off.
    Disabled,
    /// No context field names a picture.
    NoPicture,
    /// The named picture is not on disk.
    PictureMissing(PathBuf),
    /// Thumbnail generation failed; nothing else was touched.
    ThumbnailFailed {
        picture: PathBuf,
        error: BackendError,
    },
    Completed(CaptureReport),
}

impl CaptureOutcome {
    pub fn report(&self) -> Option<&CaptureReport> {
        match self {
            Self::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// The gallery plugin: thumbnails, `thumbs.json`, and the gallery page.
#[derive(Debug)]
pub struct GalleryPlugin<B = RustBackend> {
    settings: Settings,
    backend: B,
    poll_interval: Duration,
}

impl GalleryPlugin<RustBackend> {
    pub fn new() -> Self {
        Self::with_backend(RustBackend::new())
    }
}

impl Default for GalleryPlugin<RustBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ImageBackend> GalleryPlugin<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            settings: Settings::default(),
            backend,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run the capture pipeline once.
    pub fn process_capture(&self, ctx: &mut HostContext) -> CaptureOutcome {
        let settings = &self.settings;
        if !settings.enabled {
            return CaptureOutcome::Disabled;
        }

        let Some(picture) = ctx.picture().map(Path::to_path_buf) else {
            debug!("no picture published in host context; skipping");
            return CaptureOutcome::NoPicture;
        };
        if !picture.exists() {
            debug!(picture = %picture.display(), "picture not found; skipping");
            return CaptureOutcome::PictureMissing(picture);
        }

        let thumbnail = match create_thumbnail(
            &self.backend,
            &picture,
            &ThumbnailConfig::from_settings(settings),
        ) {
            Ok(thumbnail) => thumbnail,
            Err(error) => {
                error!(picture = %picture.display(), %error, "failed to create thumbnail");
                return CaptureOutcome::ThumbnailFailed { picture, error };
            }
        };
        info!(
            thumbnail = %thumbnail.path.display(),
            width = thumbnail.dimensions.width,
            height = thumbnail.dimensions.height,
            "thumbnail created"
        );

        ctx.publish_capture(&picture, &thumbnail.path);
        debug!("published picture and thumbnail paths to host context");

        let qrcode = qrcode::wait_for(
            &picture,
            ctx,
            &settings.qrcode,
            settings.qrcode_wait,
            self.poll_interval,
        );
        match &qrcode {
            Some(path) => debug!(qrcode = %path.display(), "qrcode found"),
            None => debug!(
                picture = %picture.display(),
                expected = ?qrcode::expected_filename(&picture, &settings.qrcode),
                "no qrcode for picture"
            ),
        }

        let manifest = self.sync_manifest(&picture, &thumbnail.path, qrcode.as_deref());
        match &manifest {
            StageStatus::Done(update) => info!(
                manifest = %update.path.display(),
                entries = update.entries,
                "manifest updated"
            ),
            StageStatus::Failed(error) => warn!(%error, "failed to update manifest"),
            StageStatus::Skipped => debug!("manifest update disabled"),
        }

        let gallery = self.publish_gallery(&picture);
        match &gallery {
            StageStatus::Done(output) => info!(gallery = %output.display(), "gallery page written"),
            StageStatus::Failed(error) => warn!(%error, "failed to copy gallery template"),
            StageStatus::Skipped => debug!("no gallery template configured"),
        }

        CaptureOutcome::Completed(CaptureReport {
            picture,
            thumbnail: thumbnail.path,
            thumbnail_size: thumbnail.dimensions,
            qrcode,
            manifest,
            gallery,
        })
    }

    fn sync_manifest(
        &self,
        picture: &Path,
        thumbnail: &Path,
        qrcode: Option<&Path>,
    ) -> StageStatus<ManifestUpdate, ManifestError> {
        if !self.settings.update_manifest {
            return StageStatus::Skipped;
        }
        let path = picture
            .parent()
            .unwrap_or(Path::new(""))
            .join(&self.settings.manifest_name);
        let entry = ManifestEntry::for_capture(
            picture,
            thumbnail,
            qrcode,
            self.settings.manifest_base_url(),
        );
        match manifest::sync(&path, &entry) {
            Ok(entries) => StageStatus::Done(ManifestUpdate { path, entries }),
            Err(error) => StageStatus::Failed(error),
        }
    }

    fn publish_gallery(&self, picture: &Path) -> StageStatus<PathBuf, GalleryError> {
        let Some(template) = self.settings.template.as_deref() else {
            return StageStatus::Skipped;
        };
        let output = gallery::output_path(picture, &self.settings.output);
        match gallery::publish(template, &output) {
            Ok(_) => StageStatus::Done(output),
            Err(GalleryError::TemplateMissing(path)) => {
                debug!(template = %path.display(), "gallery template not found");
                StageStatus::Skipped
            }
            Err(error) => StageStatus::Failed(error),
        }
    }
}

impl<B: ImageBackend> HostPlugin for GalleryPlugin<B> {
    fn configure(&self, options: &mut OptionRegistry) {
        for option in GALLERY_OPTIONS {
            options.add_option(*option);
        }
    }

    fn startup(&mut self, config: &RawConfig, _ctx: &mut HostContext) {
        self.settings = Settings::resolve(config);
        let s = &self.settings;
        info!(
            enabled = s.enabled,
            size = ?s.size,
            suffix = %s.suffix,
            update_manifest = s.update_manifest,
            template = ?s.template,
            base_url = ?s.base_url,
            qrcode_save = s.qrcode.save,
            qrcode_suffix = %s.qrcode.suffix,
            qrcode_ext = %s.qrcode.ext,
            qrcode_save_path = ?s.qrcode.save_path,
            qrcode_wait = ?s.qrcode_wait,
            "gallery plugin configured"
        );
    }

    fn on_capture(&self, ctx: &mut HostContext) -> CaptureOutcome {
        self.process_capture(ctx)
    }

    fn cleanup(&self, _ctx: &mut HostContext) {
        debug!("gallery plugin cleanup");
    }
}

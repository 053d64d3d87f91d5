//! QR-code discovery.
//!
//! A separate plugin renders a QR code linking to each picture. This plugin
//! never creates one; it only looks for it, so the manifest entry can link
//! to it. The QR plugin may still be writing its file when we look, so
//! [`wait_for`] retries [`locate`] for a short, bounded time.
//!
//! ## Lookup Order
//!
//! 1. Context fields published by the QR plugin ([`QRCODE_FIELDS`]), first
//!    existing file wins.
//! 2. If the QR section enables saving: `<stem><suffix>.<ext>` in the
//!    configured `save_path`, then the host `output_dir`, then the
//!    picture's own directory.

use crate::config::QrSettings;
use crate::context::{HostContext, QRCODE_FIELDS};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Delay between two lookups while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// File name the QR plugin gives the code for `picture`.
///
/// ```
/// # use booth_gallery::config::QrSettings;
/// # use booth_gallery::qrcode::expected_filename;
/// # use std::path::Path;
/// let name = expected_filename(Path::new("/booth/photo1.jpg"), &QrSettings::default());
/// assert_eq!(name, "photo1_qrcode.png");
/// ```
pub fn expected_filename(picture: &Path, qr: &QrSettings) -> OsString {
    let mut name = OsString::from(picture.file_stem().unwrap_or_default());
    name.push(&qr.suffix);
    name.push(".");
    name.push(&qr.ext);
    name
}

/// Directories searched for the expected file name, in priority order.
pub fn candidate_dirs(picture: &Path, ctx: &HostContext, qr: &QrSettings) -> Vec<PathBuf> {
    let mut dirs = Vec::with_capacity(3);
    dirs.extend(qr.save_path.clone());
    dirs.extend(
        ctx.output_dir
            .clone()
            .filter(|d| !d.as_os_str().is_empty()),
    );
    dirs.push(picture.parent().unwrap_or(Path::new("")).to_path_buf());
    dirs
}

/// Find the QR code for `picture` right now. `None` means there is none yet.
pub fn locate(picture: &Path, ctx: &HostContext, qr: &QrSettings) -> Option<PathBuf> {
    let published = QRCODE_FIELDS
        .iter()
        .filter_map(|field| field.value(ctx))
        .find(|path| path.is_file());
    if let Some(path) = published {
        return Some(path.to_path_buf());
    }

    if !qr.save {
        return None;
    }

    let name = expected_filename(picture, qr);
    candidate_dirs(picture, ctx, qr)
        .into_iter()
        .map(|dir| dir.join(&name))
        .find(|path| path.is_file())
}

/// Retry [`locate`] every `poll` until it succeeds or `timeout` elapses.
///
/// Always looks at least once. Blocks the calling thread. When QR saving is
/// disabled and no QR plugin published anything, a single lookup is made:
/// no later lookup could find something new. A timeout too large to add to
/// the current instant means no deadline.
pub fn wait_for(
    picture: &Path,
    ctx: &HostContext,
    qr: &QrSettings,
    timeout: Duration,
    poll: Duration,
) -> Option<PathBuf> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        if let Some(found) = locate(picture, ctx, qr) {
            return Some(found);
        }
        if !qr.save && !ctx.has_qrcode_facts() {
            return None;
        }
        let pause = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return None;
                }
                poll.min(deadline - now)
            }
            None => poll,
        };
        thread::sleep(pause);
    }
}

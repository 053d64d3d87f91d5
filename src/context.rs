//! Shared host context.
//!
//! The host hands every plugin the same mutable context. Plugins publish
//! facts into it and read facts other plugins published. Nothing here is
//! owned exclusively: it is a best-effort blackboard.
//!
//! ## Schema
//!
//! | Field | Written by | Read by |
//! |---|---|---|
//! | `previous_picture_file` | host, this plugin | this plugin, uploaders |
//! | `last_picture`, `last_saved_file`, `picture_file` | older hosts | this plugin |
//! | `qrcode_file`, `qrcode_saved_file`, `qrcode_filename`, `qrcode_path`, `qrcode` | QR plugins | this plugin |
//! | `output_dir` | host | this plugin |
//! | `previous_thumbnail_file` | this plugin | uploaders |
//! | `previous_picture_files` | this plugin (newest first) | uploaders |
//!
//! Several names mean the same thing across host and plugin versions. The
//! alias lists [`PICTURE_FIELDS`] and [`QRCODE_FIELDS`] give the order in
//! which they are tried.

use std::path::{Path, PathBuf};

/// Mutable facts shared between the host and its plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub previous_picture_file: Option<PathBuf>,
    pub last_picture: Option<PathBuf>,
    pub last_saved_file: Option<PathBuf>,
    pub picture_file: Option<PathBuf>,

    pub qrcode_file: Option<PathBuf>,
    pub qrcode_saved_file: Option<PathBuf>,
    pub qrcode_filename: Option<PathBuf>,
    pub qrcode_path: Option<PathBuf>,
    pub qrcode: Option<PathBuf>,

    /// Host's generic output directory.
    pub output_dir: Option<PathBuf>,

    pub previous_thumbnail_file: Option<PathBuf>,
    /// Every picture processed so far, newest first.
    pub previous_picture_files: Vec<PathBuf>,
}

/// A named path field of [`HostContext`].
#[derive(Clone, Copy)]
pub struct ContextField {
    pub name: &'static str,
    get: fn(&HostContext) -> Option<&Path>,
}

impl std::fmt::Debug for ContextField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ContextField").field(&self.name).finish()
    }
}

impl ContextField {
    /// The field's value, treating an empty path as unset.
    pub fn value<'a>(&self, ctx: &'a HostContext) -> Option<&'a Path> {
        (self.get)(ctx).filter(|p| !p.as_os_str().is_empty())
    }
}

macro_rules! path_field {
    ($field:ident) => {{
        fn get(ctx: &HostContext) -> Option<&Path> {
            ctx.$field.as_deref()
        }
        ContextField {
            name: stringify!($field),
            get,
        }
    }};
}

/// Where the just-saved picture may be published, canonical name first.
pub const PICTURE_FIELDS: &[ContextField] = &[
    path_field!(previous_picture_file),
    path_field!(last_picture),
    path_field!(last_saved_file),
    path_field!(picture_file),
];

/// Where a QR plugin may publish the QR image for the current picture.
pub const QRCODE_FIELDS: &[ContextField] = &[
    path_field!(qrcode_file),
    path_field!(qrcode_saved_file),
    path_field!(qrcode_filename),
    path_field!(qrcode_path),
    path_field!(qrcode),
];

/// First populated field in `fields`, with the name it was found under.
pub fn first_populated<'a>(
    ctx: &'a HostContext,
    fields: &[ContextField],
) -> Option<(&'static str, &'a Path)> {
    fields
        .iter()
        .find_map(|field| field.value(ctx).map(|path| (field.name, path)))
}

impl HostContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The just-saved picture, if any alias names one.
    pub fn picture(&self) -> Option<&Path> {
        first_populated(self, PICTURE_FIELDS).map(|(_, path)| path)
    }

    /// Whether any QR plugin has published anything at all.
    pub fn has_qrcode_facts(&self) -> bool {
        first_populated(self, QRCODE_FIELDS).is_some()
    }

    /// Record a processed capture for other plugins.
    pub fn publish_capture(&mut self, picture: &Path, thumbnail: &Path) {
        self.previous_picture_file = Some(picture.to_path_buf());
        self.previous_thumbnail_file = Some(thumbnail.to_path_buf());
        self.previous_picture_files.insert(0, picture.to_path_buf());
    }
}

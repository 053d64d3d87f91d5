//! # Booth Gallery
//!
//! A photo-booth plugin that keeps a browsable gallery next to the pictures.
//! After every capture it writes a thumbnail, records the picture in a JSON
//! manifest (`thumbs.json`), and drops a static gallery page beside them.
//! A web page can then render the whole session from the manifest alone.
//!
//! # Capture Pipeline
//!
//! ```text
//! photo1.jpg ──► photo1_thumb.jpg
//!            ──► thumbs.json      [{"thumb", "full", "filename", "qrcode"?}, ...]
//!            ──► gallery.html     (verbatim template copy)
//! ```
//!
//! The host photo-booth drives the plugin through the [`plugin::HostPlugin`]
//! hooks and shares a [`context::HostContext`] with every plugin. A QR-code
//! plugin, if installed, may publish a QR image for the picture; the gallery
//! links to it when it shows up within a short wait.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Option registry, raw host config, typed [`config::Settings`] |
//! | [`context`] | Shared host context and its alias lists |
//! | [`imaging`] | Thumbnail generation: backend trait + `image` crate backend |
//! | [`qrcode`] | QR-code discovery with a bounded wait |
//! | [`manifest`] | `thumbs.json` load, dedup, prepend, atomic save |
//! | [`gallery`] | Gallery page publishing |
//! | [`plugin`] | Host hooks and the per-capture pipeline |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Newest First, One Entry per Picture
//!
//! The manifest is a plain JSON array ordered newest first. Re-processing a
//! picture replaces its entry and moves it to the front; every other entry,
//! including ones this plugin does not understand, is kept byte-for-byte in
//! meaning.
//!
//! ## Atomic Manifest Writes
//!
//! Browsers poll `thumbs.json` while the booth is running. The manifest is
//! written to a temp file in the same directory and renamed over the old
//! one, so a reader sees either the old or the new list, never half of one.
//!
//! ## Failures Stay Inside the Plugin
//!
//! A photo booth must keep taking pictures. Every stage reports through
//! [`plugin::CaptureOutcome`] and the log; nothing is returned to the host
//! as an error. Only a failed thumbnail stops the remaining stages, since
//! the manifest entry would point at a file that does not exist.

mod atomic;
pub mod config;
pub mod context;
pub mod gallery;
pub mod imaging;
pub mod manifest;
pub mod output;
pub mod plugin;
pub mod qrcode;

#[cfg(test)]
pub(crate) mod test_helpers;

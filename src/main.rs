use booth_gallery::config::{self, OptionRegistry, RawConfig, Settings};
use booth_gallery::context::HostContext;
use booth_gallery::output;
use booth_gallery::plugin::{CaptureOutcome, GalleryPlugin, HostPlugin};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let hash = env!("BOOTH_GALLERY_GIT_HASH");
    if hash.is_empty() {
        return env!("CARGO_PKG_VERSION");
    }
    let dirty = if env!("BOOTH_GALLERY_GIT_DIRTY") == "true" {
        "-dirty"
    } else {
        ""
    };
    // Leaked once at startup
    Box::leak(format!("{} ({hash}{dirty})", env!("CARGO_PKG_VERSION")).into_boxed_str())
}

#[derive(Parser)]
#[command(name = "booth-gallery")]
#[command(about = "Thumbnails, thumbs.json and a gallery page for photo-booth pictures")]
#[command(long_about = "\
Thumbnails, thumbs.json and a gallery page for photo-booth pictures

Stands in for the photo-booth host: loads the host config file, runs the
plugin's configure and startup hooks, then feeds it one capture event.

For photo1.jpg the plugin writes, next to the picture:

  photo1_thumb.jpg     thumbnail within gallery_size
  thumbs.json          manifest, newest first, one entry per picture
  gallery.html         copy of gallery_template, when configured

Config file layout (TOML, every key optional):

  [gallery]            this plugin's options, see 'booth-gallery options'
  [downloader]         base_url fallback
  [qrcode]             save / suffix / ext / save_path of the QR plugin

Set RUST_LOG=debug to see every decision the pipeline makes.")]
#[command(version = version_string())]
struct Cli {
    /// Host configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one captured picture
    Capture {
        /// The picture the booth just saved
        picture: PathBuf,

        /// Host output directory, searched for QR codes
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// QR code published for this picture by another plugin
        #[arg(long)]
        qrcode: Option<PathBuf>,
    },
    /// List the options the plugin registers
    Options,
    /// Print a stock [gallery] block with all options documented
    GenConfig,
    /// Print the settings resolved from the config file
    ShowConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut plugin = GalleryPlugin::new();

    match cli.command {
        Command::Capture {
            picture,
            output_dir,
            qrcode,
        } => {
            let raw = host_config(&plugin, cli.config.as_deref())?;
            let mut ctx = HostContext {
                previous_picture_file: Some(picture),
                output_dir,
                qrcode_file: qrcode,
                ..HostContext::default()
            };

            plugin.startup(&raw, &mut ctx);
            let outcome = plugin.on_capture(&mut ctx);
            output::print_capture_outcome(&outcome);
            plugin.cleanup(&mut ctx);

            match outcome {
                CaptureOutcome::ThumbnailFailed { error, .. } => return Err(error.into()),
                CaptureOutcome::PictureMissing(path) => {
                    return Err(format!("picture not found: {}", path.display()).into());
                }
                _ => {}
            }
        }
        Command::Options => {
            output::print_options(&registry(&plugin));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml(&registry(&plugin)));
        }
        Command::ShowConfig => {
            let raw = host_config(&plugin, cli.config.as_deref())?;
            output::print_settings(&Settings::resolve(&raw));
        }
    }

    Ok(())
}

fn registry(plugin: &impl HostPlugin) -> OptionRegistry {
    let mut registry = OptionRegistry::new();
    plugin.configure(&mut registry);
    registry
}

/// Load the config file the way the host does: registered defaults fill in
/// whatever the file leaves out.
fn host_config(
    plugin: &impl HostPlugin,
    path: Option<&Path>,
) -> Result<RawConfig, config::ConfigError> {
    let mut raw = match path {
        Some(path) => config::load_raw_config(path)?,
        None => RawConfig::new(),
    };
    raw.apply_defaults(&registry(plugin));
    Ok(raw)
}

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thumbsplit::config::{self, CompressionMode, ThumbConfig};
use thumbsplit::imaging::RustBackend;
use thumbsplit::types::{
    EnhancementLevel, EnhancementOptions, LayoutMode, Multipliers, RenderRequest,
};
use thumbsplit::{layout, output, render};
use tracing::Level;

#[derive(Parser)]
#[command(name = "thumbsplit")]
#[command(about = "Compose YouTube thumbnails from 2 or 3 images")]
#[command(long_about = "\
Compose YouTube thumbnails from 2 or 3 images

Images are placed side by side on a 1280x720 canvas, cropped to fill their
slots, and separated by solid (optionally tilted) dividers:

  +---------+-+---------+-+---------+
  |         |/|         |/|         |
  |  image  / |  image  / |  image  |
  |    1   /| |    2   /| |    3    |
  +-------+-+-+-------+-+-+---------+

With --layout auto (the default) the first three images are measured: simple,
similarly shaped images get a 3-way split, anything else a 2-way split.

Configuration is read from ./thumbsplit.toml when present, or from the file
named with --config. Run 'thumbsplit gen-config' for a documented template.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./thumbsplit.toml when it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log pipeline decisions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Source images, in slot order (left to right)
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Divider width in pixels
    #[arg(long, default_value_t = 10)]
    divider_width: u32,

    /// Divider tilt in degrees; positive leans the top to the left
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    tilt: f64,

    /// Divider color as #rgb, #rrggbb or #rrggbbaa
    #[arg(long, default_value = "#ffffff")]
    color: String,

    /// Number of slots
    #[arg(long, value_enum, default_value_t = LayoutMode::Auto)]
    layout: LayoutMode,

    /// Adaptive enhancement strength
    #[arg(long, value_enum, conflicts_with_all = ["brightness", "contrast", "saturation", "sharpness"])]
    enhance: Option<EnhancementLevel>,

    /// Brightness multiplier (1.0 = unchanged)
    #[arg(long)]
    brightness: Option<f32>,

    /// Contrast multiplier (1.0 = unchanged)
    #[arg(long)]
    contrast: Option<f32>,

    /// Saturation multiplier (1.0 = unchanged)
    #[arg(long)]
    saturation: Option<f32>,

    /// Sharpening multiplier (0 disables sharpening)
    #[arg(long)]
    sharpness: Option<f32>,

    /// Output file name (".png" is appended when missing)
    #[arg(long)]
    name: Option<String>,

    /// Output directory (overrides the config)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Strip metadata and shrink the file with a palette re-encode when worthwhile
    #[arg(long)]
    youtube_optimize: bool,

    /// Encode with a 256-color palette instead of truecolor
    #[arg(long)]
    palette: bool,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

impl RenderArgs {
    fn enhancement(&self) -> Option<EnhancementOptions> {
        if let Some(level) = self.enhance {
            return Some(EnhancementOptions::Level(level));
        }
        let explicit = [
            self.brightness,
            self.contrast,
            self.saturation,
            self.sharpness,
        ];
        if explicit.iter().all(Option::is_none) {
            return None;
        }
        let defaults = Multipliers::default();
        Some(EnhancementOptions::Multipliers(Multipliers {
            brightness: self.brightness.unwrap_or(defaults.brightness),
            contrast: self.contrast.unwrap_or(defaults.contrast),
            saturation: self.saturation.unwrap_or(defaults.saturation),
            sharpness: self.sharpness.unwrap_or(defaults.sharpness),
        }))
    }

    fn to_request(&self) -> RenderRequest {
        RenderRequest {
            image_paths: self.images.clone(),
            divider_width: self.divider_width,
            divider_tilt: self.tilt,
            divider_color: self.color.clone(),
            layout: self.layout,
            enhance: self.enhancement(),
            output_name: self.name.clone(),
            output_dir: self.output_dir.clone(),
            youtube_optimize: self.youtube_optimize,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Render a thumbnail
    Render(RenderArgs),
    /// Show image statistics and the automatic layout decision
    Analyze {
        /// Source images, in slot order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Print a stock thumbsplit.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Render(args) => {
            let mut config = load_config(cli.config.as_deref())?;
            if args.palette {
                config.output.compression = CompressionMode::Palette;
            }
            init_thread_pool(&config.processing);

            let response = render::render(&args.to_request(), &config);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                output::print_render_response(&response);
            }
            if !response.success {
                std::process::exit(1);
            }
        }
        Command::Analyze { images } => {
            let config = load_config(cli.config.as_deref())?;
            init_thread_pool(&config.processing);

            let decision = layout::select_split_count(
                &RustBackend::new(),
                &images,
                LayoutMode::Auto,
                &config.layout,
            )?;
            output::print_analysis(&images, &decision);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Explicit `--config` files must exist; the implicit one is optional.
fn load_config(explicit: Option<&Path>) -> Result<ThumbConfig, config::ConfigError> {
    match explicit {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(config::CONFIG_FILE_NAME)),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available cores; config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

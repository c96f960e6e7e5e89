// ============================================================================
// PGLabel CLI: headless viewport rendering via command-line arguments
// ============================================================================
//
// Usage examples:
//   pglabel render -f cells.png --scale 0.25 --offset-x 100 -o view.png
//   pglabel render -f cells.png -b stain.png --opacity 0.5 --fit -o view.png
//   pglabel render -f cells.png --blob 120,80,14 --blob 300,90,10 --select 0 \
//                  -o view.png --overlays view.json
//   pglabel pyramid cells.png
//   pglabel config --write
//
// Everything runs synchronously through a Session; the rendered frame is
// placed on a surface-sized canvas at its shift.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use image::{Rgb, RgbImage};
use pglabel_raster::{Downsample, Point, Pyramid};

use crate::config::{AppConfig, LogLevel};
use crate::constants::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use crate::detection::{ingest, BlobCandidate};
use crate::error::AppError;
use crate::session::Session;
use crate::zoom_math::Viewport;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PGLabel headless viewport renderer.
#[derive(Parser, Debug)]
#[command(
    name = "pglabel",
    version,
    about = "Render annotated image viewports without a GUI"
)]
pub struct Cli {
    /// Configuration file. Defaults to the per-user config file if it exists.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured log level (error, warn, info, debug, trace).
    #[arg(short, long, global = true, value_name = "LEVEL", value_parser = parse_log_level)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the visible region of an image to a file.
    Render(RenderArgs),
    /// Print the pyramid level sizes of an image.
    Pyramid {
        /// Image to inspect
        image: PathBuf,
    },
    /// Print the effective configuration as JSON.
    Config {
        /// Also save it to the per-user config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Foreground image.
    #[arg(short, long, value_name = "IMAGE")]
    pub foreground: PathBuf,

    /// Reference image blended under the foreground.
    #[arg(short, long, value_name = "IMAGE")]
    pub background: Option<PathBuf>,

    /// Foreground opacity. Values outside 0..1 are clamped per channel.
    #[arg(long, default_value_t = 1.0)]
    pub opacity: f32,

    /// Screen pixels per image pixel.
    #[arg(short, long, default_value_t = 1.0, value_parser = parse_scale)]
    pub scale: f32,

    /// Horizontal pan offset in screen pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_x: f32,

    /// Vertical pan offset in screen pixels.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset_y: f32,

    /// Fit the whole image into the surface (ignores --scale and offsets).
    #[arg(long)]
    pub fit: bool,

    /// Surface width.
    #[arg(long, default_value_t = DEFAULT_SURFACE_WIDTH)]
    pub width: u32,

    /// Surface height.
    #[arg(long, default_value_t = DEFAULT_SURFACE_HEIGHT)]
    pub height: u32,

    /// Render the filtered image instead of the layer stack.
    #[arg(long)]
    pub filtered: bool,

    /// Blob as `x,y,radius` in image coordinates. Repeatable; ids start at 0.
    #[arg(long = "blob", value_name = "X,Y,R", value_parser = parse_blob)]
    pub blobs: Vec<BlobCandidate>,

    /// Id of a blob to mark selected. Repeatable.
    #[arg(long = "select", value_name = "ID")]
    pub selected: Vec<u64>,

    /// Output image (format from extension).
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Write the screen-space overlays as JSON.
    #[arg(long, value_name = "FILE")]
    pub overlays: Option<PathBuf>,
}

fn parse_log_level(s: &str) -> Result<LogLevel, String> {
    serde_json::from_value(serde_json::Value::String(s.to_lowercase()))
        .map_err(|_| format!("unknown log level '{}'", s))
}

fn parse_scale(s: &str) -> Result<f32, String> {
    let scale: f32 = s.parse().map_err(|e| format!("{}", e))?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(format!("scale must be a positive number, got {}", s))
    }
}

/// Parse `x,y,r`.
fn parse_blob(s: &str) -> Result<BlobCandidate, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, r] = parts.as_slice() else {
        return Err(format!("expected X,Y,R but got '{}'", s));
    };
    let number = |v: &str| -> Result<f32, String> {
        v.parse::<f32>()
            .map_err(|e| format!("invalid number '{}': {}", v, e))
    };
    let radius = number(r)?;
    if radius < 0.0 {
        return Err(format!("radius must not be negative, got {}", radius));
    }
    Ok(BlobCandidate {
        x: number(x)?,
        y: number(y)?,
        radius,
    })
}

// ============================================================================
// Public entry point
// ============================================================================

/// Load the configuration named on the command line, or the per-user one.
pub fn load_config(cli: &Cli) -> Result<AppConfig, AppError> {
    if let Some(path) = &cli.config {
        return Ok(AppConfig::load(path)?);
    }
    Ok(user_config().unwrap_or_default())
}

#[cfg(not(target_arch = "wasm32"))]
fn user_config() -> Option<AppConfig> {
    AppConfig::load_from_default_path()
}

#[cfg(target_arch = "wasm32")]
fn user_config() -> Option<AppConfig> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn save_user_config(config: &AppConfig) -> Result<(), AppError> {
    Ok(config.save_to_default_path()?)
}

#[cfg(target_arch = "wasm32")]
fn save_user_config(_config: &AppConfig) -> Result<(), AppError> {
    Ok(())
}

/// Run one command.
pub fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    match cli.command {
        Command::Render(args) => render(&args, &config),
        Command::Pyramid { image } => print_pyramid(&image, &config),
        Command::Config { write } => {
            println!("{}", config.to_json()?);
            if write {
                save_user_config(&config)?;
            }
            Ok(())
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn render(args: &RenderArgs, config: &AppConfig) -> Result<(), AppError> {
    let mut session = Session::new(config);
    session.set_surface_size(args.width, args.height);
    session.load_foreground_path(&args.foreground)?;

    if let Some(background) = &args.background {
        session.load_background_path(background)?;
    }

    let canvas = compose_view(&mut session, args)?;
    canvas.save(&args.output).map_err(|source| AppError::Write {
        path: args.output.clone(),
        source,
    })?;
    log::info!("Wrote {:?}", args.output);

    if let Some(path) = &args.overlays {
        write_overlays(&session, path)?;
    }

    let status = session.status();
    log::info!(
        "Scale {} X, total blobs: {}, selected blobs: {}",
        status.scale,
        status.total_blobs,
        status.selected_blobs
    );
    Ok(())
}

/// Apply the view arguments to a loaded session and paint the resulting
/// frame onto a surface-sized canvas.
fn compose_view(session: &mut Session, args: &RenderArgs) -> Result<RgbImage, AppError> {
    session.set_opacity(args.opacity);

    ingest(session.store_mut(), &args.blobs);
    for &id in &args.selected {
        if !session.store_mut().select(id) {
            log::warn!("No blob with id {} to select", id);
        }
    }

    if args.filtered {
        session.toggle_filtered_view();
    }
    if args.fit {
        session.fit_view();
    } else {
        session.set_viewport(Viewport::new(
            args.scale,
            Point::new(args.offset_x, args.offset_y),
        ));
    }

    // An interactive surface keeps its last frame when a redraw misses the
    // image; a one-shot render must come from the final view.
    if !session.redraw() {
        return Err(AppError::EmptyView(format!(
            "view at scale {} does not overlap the image",
            session.viewport().scale
        )));
    }
    let frame = session
        .frame()
        .ok_or_else(|| AppError::EmptyView("no frame rendered".to_string()))?;
    log::debug!(
        "Frame level {}, {}x{} at {:?}",
        frame.level,
        frame.image.width(),
        frame.image.height(),
        frame.shift
    );

    let (width, height) = session.surface_size();
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
    image::imageops::overlay(
        &mut canvas,
        &frame.image,
        frame.shift.x as i64,
        frame.shift.y as i64,
    );
    Ok(canvas)
}

fn write_overlays(session: &Session, path: &Path) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(&session.overlays())?;
    std::fs::write(path, json)?;
    log::info!("Wrote overlays to {:?}", path);
    Ok(())
}

fn print_pyramid(path: &Path, config: &AppConfig) -> Result<(), AppError> {
    let image = image::open(path)
        .map_err(|source| crate::session::LoadError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();
    let pyramid = Pyramid::build_with(
        image,
        config.pyramid.min_level_dimension,
        Downsample::Linear,
    )
    .map_err(crate::session::LoadError::from)?;

    for (index, level) in pyramid.levels().enumerate() {
        println!("L{}: {}x{}", index, level.width(), level.height());
    }
    Ok(())
}

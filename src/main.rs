use clap::{Parser, Subcommand};
use poster_forge::geometry::{Offset, Rect};
use poster_forge::imaging::{
    Dimensions, EncodeParams, ExportFormat, ImageBackend, Quality, RustBackend,
};
use poster_forge::types::PosterJob;
use poster_forge::{EditorSession, config, export, output};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "poster-forge")]
#[command(about = "Composite a photo and a name onto a poster template")]
#[command(long_about = "\
Composite a photo and a name onto a poster template

The template image defines the poster's size. In fixed mode the photo is
cropped to the frame's aspect ratio and stretched into the frame, with the
name centered underneath. In free mode the photo is centered, scaled and
offset, with the name near the bottom edge.

Configuration is read from poster.toml in --config-dir:

  poster.toml
  [template] path = \"assets/template.png\"
  [frame]    x = 60  y = 560  width = 430  height = 570
  [export]   format = \"jpeg\"  quality = 92

Run 'poster-forge gen-config' to print a documented poster.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing poster.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log debug details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Inputs describing the poster, shared by render and preview.
#[derive(clap::Args, Clone)]
struct PosterArgs {
    /// Photo to place on the poster
    #[arg(long)]
    photo: Option<PathBuf>,

    /// Crop rectangle in photo pixels: x,y,width,height
    #[arg(long, value_parser = parse_crop, allow_hyphen_values = true)]
    crop: Option<[f64; 4]>,

    /// Zoom reported by the crop selection
    #[arg(long, default_value_t = 1.0)]
    zoom: f64,

    /// Name drawn on the poster
    #[arg(long)]
    name: Option<String>,

    /// Free mode: photo offset from center in template pixels: dx,dy
    #[arg(long, value_parser = parse_pair, allow_hyphen_values = true)]
    offset: Option<[f64; 2]>,

    /// Free mode: photo scale
    #[arg(long)]
    scale: Option<f64>,

    /// JSON job file; command-line flags override its values
    #[arg(long)]
    job: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Export the full-resolution poster
    Render {
        #[command(flatten)]
        poster: PosterArgs,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Write a scaled PNG preview
    Preview {
        #[command(flatten)]
        poster: PosterArgs,

        /// Container width in pixels (default: preview.default_container_width)
        #[arg(long)]
        width: Option<u32>,

        /// Output PNG file
        #[arg(long, default_value = "preview.png")]
        out: PathBuf,
    },
    /// Validate config and template without rendering
    Check,
    /// Print a stock poster.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render { poster, out } => {
            let session = open_session(&cli.config_dir, &poster)?;
            let artifact = session.export()?;
            let path = export::write_artifact(&artifact, &out)?;
            output::print_render_output(&artifact, session.state(), &path);
        }
        Command::Preview { poster, width, out } => {
            let session = open_session(&cli.config_dir, &poster)?;
            let width = width.unwrap_or(session.default_container_width());
            session.render_preview(width)?;
            let frame = session
                .latest_preview()
                .ok_or("preview was superseded before it could be saved")?;
            let png = RustBackend::new().encode(
                frame.image.pixels(),
                &EncodeParams {
                    format: ExportFormat::Png,
                    quality: Quality::default(),
                },
            )?;
            let artifact = export::ExportArtifact {
                bytes: png,
                filename: out
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "preview.png".to_string()),
                format: ExportFormat::Png,
                width: frame.image.natural_width(),
                height: frame.image.natural_height(),
            };
            let dir = out.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let path = export::write_artifact(&artifact, dir)?;
            output::print_preview_output(
                Dimensions {
                    width: artifact.width,
                    height: artifact.height,
                },
                frame.scale,
                &path,
            );
        }
        Command::Check => {
            let config = config::load_config(&cli.config_dir)?;
            let session = EditorSession::open(&config, Arc::new(RustBackend::new()))?;
            let dims = RustBackend::new().identify(&config.template.path)?;
            output::print_check_output(
                &config.template.path,
                dims,
                &session.frame(),
                config.placement.mode,
            );
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "poster_forge=debug" } else { "poster_forge=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load config, open a session and replay the job file plus flags onto it.
fn open_session(
    config_dir: &Path,
    args: &PosterArgs,
) -> Result<EditorSession, Box<dyn std::error::Error>> {
    let config = config::load_config(config_dir)?;
    let mut session = EditorSession::open(&config, Arc::new(RustBackend::new()))?;

    if let Some(job_path) = &args.job {
        let job = PosterJob::from_json(&std::fs::read_to_string(job_path)?)?;
        let base = job_path.parent().unwrap_or(Path::new("."));
        job.apply(&mut session, base)?;
    }

    if let Some(photo) = &args.photo {
        session.load_photo(photo)?;
    }
    if let Some([x, y, w, h]) = args.crop {
        session.apply_crop(Rect::new(x, y, w, h)?, args.zoom)?;
    }
    if let Some(scale) = args.scale {
        session.set_scale(scale)?;
    }
    if let Some([dx, dy]) = args.offset {
        session.nudge(Offset::new(dx, dy))?;
    }
    if let Some(name) = &args.name {
        session.set_name(name.clone());
    }
    Ok(session)
}

fn parse_numbers<const N: usize>(s: &str) -> Result<[f64; N], String> {
    let values: Vec<f64> = s
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid number {part:?}: {e}"))
        })
        .collect::<Result<_, _>>()?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| format!("expected {N} comma-separated numbers, got {}", v.len()))
}

fn parse_crop(s: &str) -> Result<[f64; 4], String> {
    parse_numbers::<4>(s)
}

fn parse_pair(s: &str) -> Result<[f64; 2], String> {
    parse_numbers::<2>(s)
}

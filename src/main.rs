use clap::{Parser, Subcommand};
use picforge::config::{self, EngineConfig};
use picforge::imaging::operations::{self, OperationError};
use picforge::imaging::{
    BlurLevel, FilterKind, ImageFormat, Rectangle, RustBackend, calculate_percent_region,
};
use picforge::transport;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "picforge")]
#[command(about = "Image transformation primitives")]
#[command(long_about = "\
Image transformation primitives

Blur regions, stamp watermarks, apply color filters, scale with the aspect
ratio preserved, and render QR codes. Inputs may be BMP, PNG, JPG, GIF or
WebP; output is encoded in the session format (png unless configured).

Blur levels:  light (1) | medium (3) | hard (5) | full (10)
Filters:      grayscale | sepia | color-invert | lightness | oil-paint | auto-filter

Set RUST_LOG=debug to see the computed geometry of each operation.

Run 'picforge gen-config' to generate a documented picforge.toml.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file
    #[arg(long, default_value = "picforge.toml", global = true)]
    config: PathBuf,

    /// Output format, overrides the config file (unknown names fall back to png)
    #[arg(long, global = true, value_parser = parse_format)]
    format: Option<ImageFormat>,

    #[command(subcommand)]
    command: Command,
}

/// Shared input/output flags for commands that transform one image.
#[derive(clap::Args, Clone)]
struct ImageIo {
    /// Input image
    input: PathBuf,
    /// Where to write the result
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Blur an explicit pixel rectangle
    Blur {
        #[command(flatten)]
        io: ImageIo,
        #[arg(long)]
        x: u32,
        #[arg(long)]
        y: u32,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long, default_value = "medium")]
        level: BlurLevel,
    },
    /// Blur the bottom-right tile sized by percentages of the image
    BlurPercent {
        #[command(flatten)]
        io: ImageIo,
        /// Tile width as a percentage of the image width (0-100]
        #[arg(long)]
        horizontal: f64,
        /// Tile height as a percentage of the image height (0-100]
        #[arg(long)]
        vertical: f64,
        #[arg(long, default_value = "medium")]
        level: BlurLevel,
    },
    /// Print the tile blur-percent would blur, as JSON
    Region {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long)]
        horizontal: f64,
        #[arg(long)]
        vertical: f64,
    },
    /// Draw an overlay image at a percentage position
    Watermark {
        #[command(flatten)]
        io: ImageIo,
        /// Overlay image
        #[arg(long)]
        mark: PathBuf,
        /// Left edge as a percentage of the image width
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        /// Top edge as a percentage of the image height
        #[arg(long, default_value_t = 0.0)]
        y: f64,
    },
    /// Apply a color filter
    Filter {
        #[command(flatten)]
        io: ImageIo,
        /// Filter name; unknown names fall back to auto-filter
        #[arg(long)]
        kind: String,
        /// Intensity for grayscale, sepia and lightness
        #[arg(long)]
        level: Option<BlurLevel>,
    },
    /// Shrink to a maximum width, keeping the aspect ratio
    Scale {
        /// Input image path or http(s) URL
        input: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Maximum width; defaults to scale.max_width from the config
        #[arg(long)]
        max_width: Option<i32>,
        /// Write base64 text instead of raw bytes
        #[arg(long)]
        base64: bool,
    },
    /// Render text as a PNG QR code
    Qr {
        text: String,
        #[arg(short, long)]
        output: PathBuf,
        /// Pixels per module; defaults to qr.pixels_per_module from the config
        #[arg(long)]
        pixels_per_module: Option<u32>,
        /// Write base64 text instead of raw bytes
        #[arg(long)]
        base64: bool,
    },
    /// Print a stock picforge.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut engine = config::load_config(&cli.config)?;
    if let Some(format) = cli.format {
        engine.output.format = format;
    }
    let codec = engine.codec();
    let backend = RustBackend::new();

    match cli.command {
        Command::Blur {
            io,
            x,
            y,
            width,
            height,
            level,
        } => {
            let bytes = transport::read_file(&io.input)?;
            let region = Rectangle::new(x, y, width, height);
            let out = operations::blur_region(&backend, &codec, &bytes, region, level)?;
            write_output(&io.output, &out)?;
        }
        Command::BlurPercent {
            io,
            horizontal,
            vertical,
            level,
        } => {
            let bytes = transport::read_file(&io.input)?;
            let out =
                operations::blur_percent(&backend, &codec, &bytes, horizontal, vertical, level)?;
            write_output(&io.output, &out)?;
        }
        Command::Region {
            width,
            height,
            horizontal,
            vertical,
        } => {
            let region = calculate_percent_region((width, height), horizontal, vertical)?;
            println!("{}", serde_json::to_string_pretty(&region)?);
        }
        Command::Watermark { io, mark, x, y } => {
            let bytes = transport::read_file(&io.input)?;
            let overlay = transport::read_file(&mark)?;
            let out = operations::watermark(&backend, &codec, &bytes, &overlay, x, y)?;
            write_output(&io.output, &out)?;
        }
        Command::Filter { io, kind, level } => {
            let bytes = transport::read_file(&io.input)?;
            let kind = FilterKind::from_name(&kind);
            let out = operations::apply_filter(&backend, &codec, &bytes, kind, level)?;
            write_output(&io.output, &out)?;
        }
        Command::Scale {
            input,
            output,
            max_width,
            base64,
        } => {
            let max_width = max_width.unwrap_or(engine.scale.max_width);
            let out = scale_input(&backend, &engine, &input, max_width)?;
            if base64 {
                transport::write_text(&output, &transport::encode_base64(&out))?;
            } else {
                write_output(&output, &out)?;
            }
        }
        Command::Qr {
            text,
            output,
            pixels_per_module,
            base64,
        } => {
            if let Some(ppm) = pixels_per_module {
                engine.override_pixels_per_module(ppm)?;
            }
            let ppm = engine.qr.pixels_per_module;
            if base64 {
                let encoded = operations::render_qr(&backend, &text, ppm)?;
                transport::write_text(&output, &encoded)?;
            } else {
                let out = operations::render_qr_binary(&backend, &text, ppm)?;
                write_output(&output, &out)?;
            }
        }
        // Printed before the config is loaded.
        Command::GenConfig => {}
    }

    Ok(())
}

fn parse_format(name: &str) -> Result<ImageFormat, Infallible> {
    Ok(ImageFormat::from_name(name))
}

fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn scale_input(
    backend: &RustBackend,
    engine: &EngineConfig,
    input: &str,
    max_width: i32,
) -> Result<Vec<u8>, OperationError> {
    let codec = engine.codec();
    if is_url(input) {
        operations::scale_url_to_binary(backend, &codec, input, max_width, engine.timeout())
    } else {
        operations::scale_file_to_binary(backend, &codec, Path::new(input), max_width)
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(), OperationError> {
    operations::save_binary_to_file(path, bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "Wrote output");
    Ok(())
}

//! CLI binary for proofshot.
//!
//! A thin shim over the library's transforms for profile-photo preparation
//! and payload diagnostics. The capture session itself needs live camera
//! hardware and a portal backend, so it is exercised from host applications
//! and the integration tests, not from here.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use proofshot::{
    crop_region, crop_square_centered, estimated_kilobytes, resize_encode, CropConfig, CropRegion,
    EncodeConfig,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Square avatar crops for a batch of portraits
  proofshot avatar photos/*.jpg --out-dir avatars/

  # Manual crop from an interactive preview's coordinates
  proofshot crop portrait.jpg --x 350 --y 0 --size 900 -o avatar.webp

  # Fit frames inside the verification bounds and print the payload string
  proofshot fit frame.png --data-uri

  # Estimate the decoded size of a saved payload
  proofshot estimate payload.txt

OUTPUT FORMAT:
  All transforms emit lossy WebP. Artifact names keep the source stem with
  the extension rewritten (portrait.jpg -> portrait.webp).
"#;

/// Prepare attendance-proof and profile photos: crop, fit, encode, estimate.
#[derive(Parser, Debug)]
#[command(
    name = "proofshot",
    version,
    about = "Prepare attendance-proof and profile photos: crop, fit, encode, estimate",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PROOFSHOT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PROOFSHOT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Center-crop images into square avatars.
    Avatar {
        /// Input image files (jpeg/png/webp).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Square output edge length in pixels.
        #[arg(long, env = "PROOFSHOT_AVATAR_SIZE", default_value_t = 800)]
        size: u32,

        /// Encode quality in (0, 1].
        #[arg(long, env = "PROOFSHOT_AVATAR_QUALITY", default_value_t = 0.85)]
        quality: f32,

        /// Directory for the output artifacts (default: next to each input).
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Crop an explicit square region (e.g. from an interactive preview).
    Crop {
        /// Input image file.
        file: PathBuf,

        /// Left edge of the square, in source pixels.
        #[arg(long)]
        x: u32,

        /// Top edge of the square, in source pixels.
        #[arg(long)]
        y: u32,

        /// Edge length of the source square, in pixels.
        #[arg(long)]
        size: u32,

        /// Square output edge length in pixels.
        #[arg(long, default_value_t = 800)]
        target_size: u32,

        /// Encode quality in (0, 1].
        #[arg(long, default_value_t = 0.85)]
        quality: f32,

        /// Output path (default: input name with a .webp extension).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Proportionally fit images inside a bounding box and re-encode.
    Fit {
        /// Input image files (jpeg/png/webp).
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Maximum output width in pixels.
        #[arg(long, default_value_t = 1280)]
        max_width: u32,

        /// Maximum output height in pixels.
        #[arg(long, default_value_t = 720)]
        max_height: u32,

        /// Encode quality in (0, 1].
        #[arg(long, default_value_t = 0.8)]
        quality: f32,

        /// Directory for the output files (default: next to each input).
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Print the base64 data URI to stdout instead of writing files.
        /// Only valid with a single input file.
        #[arg(long)]
        data_uri: bool,
    },

    /// Estimate the decoded byte size of a base64/data-URI payload file.
    Estimate {
        /// Text file holding the payload (or `-` for stdin).
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Avatar {
            files,
            size,
            quality,
            out_dir,
        } => {
            let config = CropConfig::builder()
                .target_size(size)
                .quality(quality)
                .build()
                .context("Invalid avatar configuration")?;
            run_batch(&files, out_dir.as_deref(), cli.quiet, |path, bytes| {
                let artifact = crop_square_centered(bytes, &path.to_string_lossy(), &config)?;
                Ok((artifact.file_name, artifact.image))
            })
        }

        Command::Crop {
            file,
            x,
            y,
            size,
            target_size,
            quality,
            output,
        } => {
            let config = CropConfig::builder()
                .target_size(target_size)
                .quality(quality)
                .build()
                .context("Invalid crop configuration")?;
            let bytes =
                std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let artifact = crop_region(
                &bytes,
                &file.to_string_lossy(),
                CropRegion { x, y, size },
                &config,
            )?;
            let out = output.unwrap_or_else(|| PathBuf::from(&artifact.file_name));
            std::fs::write(&out, artifact.image.bytes())
                .with_context(|| format!("Failed to write {}", out.display()))?;
            if !cli.quiet {
                eprintln!(
                    "{} {} {}",
                    green("✔"),
                    bold(&out.display().to_string()),
                    dim(&format!("{} bytes", artifact.image.len()))
                );
            }
            Ok(())
        }

        Command::Fit {
            files,
            max_width,
            max_height,
            quality,
            out_dir,
            data_uri,
        } => {
            let config = EncodeConfig::builder()
                .max_width(max_width)
                .max_height(max_height)
                .quality(quality)
                .build()
                .context("Invalid fit configuration")?;

            if data_uri {
                if files.len() != 1 {
                    bail!("--data-uri takes exactly one input file");
                }
                let bytes = std::fs::read(&files[0])
                    .with_context(|| format!("Failed to read {}", files[0].display()))?;
                let encoded = resize_encode(&bytes, &config)?;
                let uri = encoded.to_data_uri();
                io::stdout().write_all(uri.as_bytes())?;
                io::stdout().write_all(b"\n")?;
                if !cli.quiet {
                    eprintln!(
                        "{} {}x{}  ~{} KB decoded",
                        dim("payload:"),
                        encoded.width(),
                        encoded.height(),
                        estimated_kilobytes(&uri)
                    );
                }
                return Ok(());
            }

            run_batch(&files, out_dir.as_deref(), cli.quiet, |path, bytes| {
                let encoded = resize_encode(bytes, &config)?;
                let name = path
                    .with_extension("webp")
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output.webp".into());
                Ok((name, encoded))
            })
        }

        Command::Estimate { file } => {
            let text = if file.as_os_str() == "-" {
                io::read_to_string(io::stdin()).context("Failed to read stdin")?
            } else {
                std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file.display()))?
            };
            println!("{} KB", estimated_kilobytes(text.trim()));
            Ok(())
        }
    }
}

/// Apply a transform to each input file, writing artifacts with a progress
/// bar. Per-file failures are reported and counted, not fatal to the batch.
fn run_batch(
    files: &[PathBuf],
    out_dir: Option<&Path>,
    quiet: bool,
    transform: impl Fn(&Path, &[u8]) -> Result<(String, proofshot::EncodedImage)>,
) -> Result<()> {
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let bar = if quiet || files.len() < 2 {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        bar
    };

    let mut failed = 0usize;
    for path in files {
        let result = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|bytes| transform(path, &bytes));

        match result {
            Ok((name, encoded)) => {
                let out = match out_dir {
                    Some(dir) => dir.join(
                        Path::new(&name)
                            .file_name()
                            .map(PathBuf::from)
                            .unwrap_or_else(|| PathBuf::from(&name)),
                    ),
                    None => path.with_file_name(
                        Path::new(&name)
                            .file_name()
                            .map(PathBuf::from)
                            .unwrap_or_else(|| PathBuf::from(&name)),
                    ),
                };
                std::fs::write(&out, encoded.bytes())
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                bar.println(format!(
                    "  {} {}  {}",
                    green("✓"),
                    out.display(),
                    dim(&format!("{} bytes", encoded.len()))
                ));
            }
            Err(e) => {
                failed += 1;
                bar.println(format!("  {} {}  {}", red("✗"), path.display(), red(&format!("{e:#}"))));
            }
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    if !quiet {
        let ok = files.len() - failed;
        if failed == 0 {
            eprintln!("{} {} files processed", green("✔"), bold(&ok.to_string()));
        } else {
            eprintln!(
                "{} {}/{} files processed  ({} failed)",
                red("✘"),
                bold(&ok.to_string()),
                files.len(),
                red(&failed.to_string()),
            );
        }
    }
    if failed == files.len() && !files.is_empty() {
        bail!("all inputs failed");
    }
    Ok(())
}

//! Splicer CLI - splice images into strips or grids.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use splicer::layout::LayoutPlan;
use splicer::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "splicer", version, about = "Splice images into one composite")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Splice images and export the result
    Splice(SpliceArgs),
    /// Print the layout plan for a set of images as JSON
    Plan(PlanArgs),
    /// List the layout modes
    Modes,
}

#[derive(Args, Debug)]
struct SpliceArgs {
    /// Image files, in splice order
    inputs: Vec<PathBuf>,
    /// horizontal, vertical or grid
    #[arg(short, long)]
    mode: Option<LayoutMode>,
    /// Stamp 图1, 图2, ... onto the images
    #[arg(long, action = ArgAction::SetTrue)]
    watermark: bool,
    /// Watermark color: red, white or black
    #[arg(long)]
    color: Option<WatermarkColor>,
    /// Output file; the format follows the extension unless --format is given
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// png or jpg
    #[arg(long)]
    format: Option<ExportFormat>,
    /// Copy the composite to the clipboard
    #[arg(long, action = ArgAction::SetTrue)]
    copy: bool,
    /// Add image paths or pixels from the clipboard
    #[arg(long, action = ArgAction::SetTrue)]
    paste: bool,
    /// A drag-and-drop payload (Tcl list of paths)
    #[arg(long)]
    drop: Option<String>,
    /// Write a downscaled preview PNG
    #[arg(long)]
    preview: Option<PathBuf>,
    /// Preview bounding box
    #[arg(long, default_value = "800x600", value_parser = parse_size)]
    preview_size: (u32, u32),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Image files, in splice order
    inputs: Vec<PathBuf>,
    /// horizontal, vertical or grid
    #[arg(short, long)]
    mode: Option<LayoutMode>,
}

fn parse_size(s: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse::<u32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<u32>().map_err(|e| e.to_string())?;
    if w == 0 || h == 0 {
        return Err("preview size must be non-zero".to_string());
    }
    Ok((w, h))
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (message, hint, code) = report(&e);
            eprintln!("{}", message);
            if let Some(hint) = hint {
                eprintln!("Hint: {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

/// Message, hint and exit status for an error that reached `main`.
fn report(e: &anyhow::Error) -> (String, Option<String>, u8) {
    match e.downcast_ref::<SplicerError>() {
        Some(err) => (
            format!("Error ({}): {:#}", err.category(), e),
            err.suggested_fix(),
            err.exit_code(),
        ),
        None => (format!("Error: {:#}", e), None, 1),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SpliceConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => SpliceConfig::default(),
    };

    match cli.command {
        Commands::Splice(args) => splice(config, args),
        Commands::Plan(args) => plan(config, args),
        Commands::Modes => {
            for mode in LayoutMode::ALL {
                println!("  {:<16} {}", mode.as_str(), mode.description());
            }
            Ok(())
        }
    }
}

fn splice(mut config: SpliceConfig, args: SpliceArgs) -> Result<()> {
    if let Some(mode) = args.mode {
        config.layout = mode;
    }
    if args.watermark {
        config.watermark.enabled = true;
    }
    if let Some(color) = args.color {
        config.watermark.color = color;
    }
    if let Some(format) = args.format {
        config.export.format = format;
    }

    let mut session = Session::new(config);
    session.add_paths(&args.inputs)?;
    if let Some(raw) = &args.drop {
        session.add_dropped(raw)?;
    }
    if args.paste {
        with_clipboard(|clipboard| session.paste(clipboard))?;
    }

    session.splice()?;

    if let Some(path) = &args.output {
        let format = session.save(path, args.format)?;
        println!("Saved {} to {}", format, path.display());
    }

    if let Some(path) = &args.preview {
        let (max_width, max_height) = args.preview_size;
        session
            .preview(max_width, max_height)?
            .save(path)
            .with_context(|| format!("writing preview {}", path.display()))?;
        println!("Preview written to {}", path.display());
    }

    if args.copy {
        with_clipboard(|clipboard| session.copy(clipboard))?;
        println!("Copied to clipboard");
    }

    if args.output.is_none() && args.preview.is_none() && !args.copy {
        log::warn!("No --output, --preview or --copy given, the composite was discarded");
    }

    Ok(())
}

fn plan(config: SpliceConfig, args: PlanArgs) -> Result<()> {
    let mode = args.mode.unwrap_or(config.layout);

    let sizes = args
        .inputs
        .iter()
        .map(|path| {
            image::image_dimensions(path)
                .with_context(|| format!("reading dimensions of {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let plan = LayoutPlan::compute(mode, &sizes).map_err(SplicerError::from)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

#[cfg(feature = "clipboard")]
fn with_clipboard<T>(f: impl FnOnce(&mut SystemClipboard) -> SplicerResult<T>) -> Result<T> {
    let mut clipboard = SystemClipboard::new().map_err(SplicerError::from)?;
    Ok(f(&mut clipboard)?)
}

#[cfg(not(feature = "clipboard"))]
fn with_clipboard<T>(f: impl FnOnce(&mut UnsupportedClipboard) -> SplicerResult<T>) -> Result<T> {
    Ok(f(&mut UnsupportedClipboard)?)
}

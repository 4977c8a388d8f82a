//! Headless driver: run a flame scene for a number of frames and write PNG
//! snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use image::{imageops::FilterType, RgbImage};

use flame_sparks::{Backdrop, Frame, SceneConfig, SceneDirector, Sequences};

#[derive(Parser)]
#[command(name = "flame-render")]
#[command(about = "Render a staged flame particle scene to PNG frames", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML scene configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image whose matching pixels become mask emitters
    #[arg(short, long)]
    mask: Option<PathBuf>,

    /// Picture drawn under the flames (overrides `screen.backdrop`)
    #[arg(short, long)]
    backdrop: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Time step per frame, in target frames
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Write every Nth frame (0 writes only the last)
    #[arg(long, default_value_t = 0)]
    every: u64,

    /// Override the configured random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Output directory
    #[arg(short, long, default_value = "frames")]
    output: PathBuf,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still takes precedence over the command-line level
    env_logger::Builder::new()
        .filter_level(log_level(cli.verbose, cli.quiet))
        .parse_default_env()
        .init();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_toml_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(path) = &cli.backdrop {
        config.screen.backdrop = Some(path.clone());
    }

    let mask = match &cli.mask {
        Some(path) => load_mask(path, &config)?,
        None => Vec::new(),
    };
    log::info!("{} mask anchors", mask.len());

    let sequences = Sequences::with_reference_shapes(mask);
    log::info!("{} emitters to stage", sequences.total());

    let mut director = SceneDirector::from_config(sequences, &config);
    let mut frame = Frame::new(config.screen.width, config.screen.height)?
        .with_blend_mode(config.screen.blend_mode);
    let background = config.screen.background_f64();
    let backdrop = match &config.screen.backdrop {
        Some(path) => Some(load_backdrop(path, &config)?),
        None => None,
    };

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;

    for n in 1..=cli.frames {
        frame.clear(background);
        if let Some(backdrop) = &backdrop {
            frame.draw_backdrop(backdrop);
        }
        director.admit_and_advance(cli.dt, &mut frame);

        let snapshot = (cli.every > 0 && n % cli.every == 0) || n == cli.frames;
        if snapshot {
            let path = cli.output.join(format!("frame_{n:05}.png"));
            save_frame(&frame, background, &path)?;
            log::info!(
                "frame {}: stage {}, {} emitters, {} particles -> {}",
                n,
                director.stage().name(),
                director.active_count(),
                director.total_particles(),
                path.display()
            );
        }
    }

    if !cli.quiet {
        println!(
            "Rendered {} frames: {} emitters, {} particles, stage {}",
            cli.frames,
            director.active_count(),
            director.total_particles(),
            director.stage().name()
        );
    }
    Ok(())
}

/// Map `-v` repetitions and `-q` onto a log level, `warn` by default.
fn log_level(verbose: u8, quiet: bool) -> log::LevelFilter {
    match verbose {
        0 if quiet => log::LevelFilter::Error,
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

/// Load the backdrop picture and scale it to the screen.
fn load_backdrop(path: &Path, config: &SceneConfig) -> Result<Backdrop> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open backdrop image {}", path.display()))?
        .to_rgb8();
    let (w, h) = (config.screen.width as u32, config.screen.height as u32);
    let scaled = image::imageops::resize(&img, w, h, FilterType::Triangle);

    let backdrop = Backdrop::from_rgb8(scaled.as_raw(), w as usize, h as usize)?;
    Ok(backdrop)
}

/// Load, scale to the screen and extract mask anchors.
fn load_mask(path: &Path, config: &SceneConfig) -> Result<Vec<glam::DVec2>> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open mask image {}", path.display()))?
        .to_rgba8();
    let (w, h) = (config.screen.width as u32, config.screen.height as u32);
    let scaled = image::imageops::resize(&img, w, h, FilterType::Triangle);

    let anchors = config
        .mask
        .anchors(scaled.as_raw(), w as usize, h as usize, config.screen.width)?;
    Ok(anchors)
}

fn save_frame(frame: &Frame, background: [f64; 3], path: &Path) -> Result<()> {
    let rgb = frame.to_rgb8(background);
    let img = RgbImage::from_raw(frame.width() as u32, frame.height() as u32, rgb)
        .context("Frame buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use image::ImageReader;
use texatlas_core::{pack_textures, AtlasConfig, FreeRectHeuristic, FsPageStore, SourceTexture};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "texatlas",
    about = "Pack a folder of images into texture atlas pages",
    version
)]
struct Cli {
    /// Input directory with png/jpg images
    input: PathBuf,
    /// Output directory (atlas pages + metadata records)
    #[arg(short, long, default_value = "atlas_out")]
    out_dir: PathBuf,
    /// Atlas base name (defaults to the input directory name)
    #[arg(short, long)]
    name: Option<String>,
    /// Page width
    #[arg(long, default_value_t = 1024)]
    width: u32,
    /// Page height
    #[arg(long, default_value_t = 1024)]
    height: u32,
    /// Free-rect heuristic: bssf|blsf|baf|bl|cp
    #[arg(long, default_value = "cp")]
    heuristic: String,
    /// Allow 90deg rotation of placements
    #[arg(long, default_value_t = false)]
    allow_flip: bool,
    /// Discard the previous layout and re-place everything
    #[arg(long, default_value_t = false)]
    reflow: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    if !cli.input.is_dir() {
        anyhow::bail!("input directory does not exist: {}", cli.input.display());
    }

    let heuristic: FreeRectHeuristic = cli
        .heuristic
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown heuristic: {}", cli.heuristic))?;

    let cfg = AtlasConfig::builder()
        .with_page_dimensions(cli.width, cli.height)
        .allow_flip(cli.allow_flip)
        .heuristic(heuristic)
        .build();

    let atlas_name = match &cli.name {
        Some(name) => name.clone(),
        None => cli
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_else(|| "atlas".into()),
    };

    let textures = load_textures(&cli.input)?;
    info!(count = textures.len(), "loaded source images");

    let mut store = FsPageStore::new(&cli.out_dir, &atlas_name);
    let report = pack_textures(&textures, &atlas_name, &cfg, &mut store, cli.reflow)?;
    println!("{}", report.summary());
    Ok(())
}

/// Collects and decodes every png/jpg under `dir`. A single unreadable
/// image is skipped, not fatal.
fn load_textures(dir: &Path) -> anyhow::Result<Vec<SourceTexture>> {
    let mut textures = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || !is_supported(path) {
            continue;
        }
        let key = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        match ImageReader::open(path)
            .with_context(|| format!("open {}", path.display()))
            .and_then(|r| r.decode().with_context(|| format!("decode {}", path.display())))
        {
            Ok(img) => textures.push(SourceTexture::new(key, img.to_rgba8())),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable image"),
        }
    }
    Ok(textures)
}

fn is_supported(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()),
        Some(ref ext) if ext == "png" || ext == "jpg" || ext == "jpeg"
    )
}

fn init_tracing(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

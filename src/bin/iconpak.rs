//! iconpak - build and inspect icon bundles
//!
//! # Commands
//!
//! - `iconpak pack <manifest>` - Decode the listed images and write the bundle
//! - `iconpak list <bundle>` - Print the entry table
//! - `iconpak extract <bundle> <id> -o icon.png` - Save one icon as an image
//! - `iconpak verify <bundle>` - Validate a bundle and report the first problem
//!
//! Set `RUST_LOG=debug` for per-step logging.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use icon_bundle::{IconId, IconManifest, read_bundle};

/// Build and inspect icon bundles
#[derive(Parser)]
#[command(name = "iconpak")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack the images listed in a JSON manifest into a bundle
    Pack(PackArgs),

    /// List the icons in a bundle
    List(BundleArgs),

    /// Write one icon from a bundle to an image file
    Extract(ExtractArgs),

    /// Check that a bundle is structurally valid
    Verify(BundleArgs),
}

#[derive(Args)]
struct PackArgs {
    /// Manifest file (image paths are relative to its directory)
    manifest: PathBuf,

    /// Output file, overriding the manifest's `output`
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct BundleArgs {
    /// Bundle file
    bundle: PathBuf,
}

#[derive(Args)]
struct ExtractArgs {
    /// Bundle file
    bundle: PathBuf,

    /// Icon id
    id: IconId,

    /// Image file to write; format follows the extension
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pack(args) => pack(args),
        Commands::List(args) => list(args),
        Commands::Extract(args) => extract(args),
        Commands::Verify(args) => verify(args),
    }
}

fn pack(args: PackArgs) -> Result<()> {
    let mut manifest = IconManifest::load(&args.manifest)
        .with_context(|| format!("Failed to load manifest: {}", args.manifest.display()))?;
    if let Some(output) = args.output {
        // Absolute overrides replace the base directory on join.
        manifest.output = std::env::current_dir()?.join(output);
    }

    let base_dir = args
        .manifest
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    let out = manifest
        .pack_to_file(&base_dir)
        .context("Failed to pack icons")?;

    println!("{} icons -> {}", manifest.icons.len(), out.display());
    Ok(())
}

fn list(args: BundleArgs) -> Result<()> {
    let bundle = read_bundle(&args.bundle)
        .with_context(|| format!("Failed to open bundle: {}", args.bundle.display()))?;

    println!("{:>5}  {:>11}  {:>10}  {:>10}", "id", "size", "offset", "bytes");
    for entry in bundle.entries() {
        println!(
            "{:>5}  {:>11}  {:>10}  {:>10}",
            entry.id,
            format!("{}x{}", entry.width, entry.height),
            entry.offset,
            entry.pixel_len()
        );
    }
    println!("{} icons, {} bytes", bundle.len(), bundle.as_bytes().len());
    Ok(())
}

fn extract(args: ExtractArgs) -> Result<()> {
    let bundle = read_bundle(&args.bundle)
        .with_context(|| format!("Failed to open bundle: {}", args.bundle.display()))?;
    let icon = bundle.lookup(args.id)?;

    icon.to_rgba_image()
        .context("Icon pixel length does not match its dimensions")?
        .save(&args.output)
        .with_context(|| format!("Failed to write image: {}", args.output.display()))?;

    println!(
        "icon {} ({}x{}) -> {}",
        icon.id,
        icon.width,
        icon.height,
        args.output.display()
    );
    Ok(())
}

fn verify(args: BundleArgs) -> Result<()> {
    let bundle = read_bundle(&args.bundle)
        .with_context(|| format!("Invalid bundle: {}", args.bundle.display()))?;
    println!("ok: {} icons", bundle.len());
    Ok(())
}

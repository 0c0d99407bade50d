mod logging;

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use font_asset::{contact_sheet, AssetError, BuildConfig, CharSet, FontAsset, FontAssetBuilder};
use image::ImageFormat;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use walkdir::WalkDir;

const TYPEFACE_EXTENSIONS: [&str; 2] = ["ttf", "otf"];
const ASSET_EXTENSION: &str = "vlw";

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert typefaces to 1-bit bitmap font assets")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Only report errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build one font asset from a typeface
    Build(BuildArgs),
    /// Build assets for every typeface and size combination in parallel
    Batch(BatchArgs),
    /// Decode a font asset and preview its glyphs
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct BuildArgs {
    /// TrueType or OpenType file
    typeface: PathBuf,
    /// Output asset path
    #[arg(short, long)]
    output: PathBuf,
    /// Point size to rasterize at
    #[arg(long, default_value_t = 16)]
    size: u16,
    /// Display name used in log output
    #[arg(long)]
    name: Option<String>,
    #[command(flatten)]
    glyphs: GlyphSettings,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Typeface file or directory searched for .ttf/.otf files
    input: PathBuf,
    /// Output directory for asset files
    #[arg(short, long)]
    out_dir: PathBuf,
    /// Point sizes to build for every typeface
    #[arg(long, value_delimiter = ',', default_values_t = [12, 16, 20, 24])]
    sizes: Vec<u16>,
    #[command(flatten)]
    glyphs: GlyphSettings,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Font asset to decode
    input: PathBuf,
    /// Only preview these glyphs (repeatable)
    #[arg(long = "glyph")]
    glyphs: Vec<char>,
    /// Save a PNG contact sheet of all glyphs
    #[arg(long)]
    sheet: Option<PathBuf>,
    /// Glyphs per row in the contact sheet
    #[arg(long, default_value_t = 16)]
    columns: u32,
}

#[derive(Parser, Debug, Clone)]
struct GlyphSettings {
    /// Restrict the asset to these printable ASCII characters
    #[arg(long)]
    chars: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(logging::level_for(cli.verbose, cli.quiet))
        .context("failed to initialize logging")?;

    match cli.command {
        Commands::Build(args) => build(args),
        Commands::Batch(args) => batch(args),
        Commands::Inspect(args) => inspect(args),
    }
}

fn build(args: BuildArgs) -> Result<()> {
    let mut config = BuildConfig::new(&args.typeface, &args.output, args.size);
    config.display_name = args.name;
    config.charset = args.glyphs.to_charset()?;

    let report = FontAssetBuilder
        .build(&config)
        .with_context(|| format!("failed to build {:?}", args.output))?;

    println!(
        "{} glyphs, {} bytes written to {:?}",
        report.glyph_count, report.bytes_written, report.output_path
    );
    Ok(())
}

fn batch(args: BatchArgs) -> Result<()> {
    let typefaces = find_typefaces(&args.input)?;
    if args.sizes.is_empty() {
        anyhow::bail!("no point sizes requested");
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("failed to create output directory {:?}", args.out_dir))?;

    let charset = args.glyphs.to_charset()?;
    let configs: Vec<BuildConfig> = typefaces
        .iter()
        .flat_map(|typeface| args.sizes.iter().map(move |&size| (typeface, size)))
        .map(|(typeface, size)| {
            let stem = typeface.file_stem().and_then(OsStr::to_str).unwrap_or("font");
            let output = args.out_dir.join(format!("{stem}{size}.{ASSET_EXTENSION}"));
            let mut config = BuildConfig::new(typeface, output, size);
            config.charset = charset.clone();
            config
        })
        .collect();

    let progress = ProgressBar::new(configs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} assets",
        )
        .context("invalid progress template")?
        .progress_chars("=> "),
    );

    let results = FontAssetBuilder.build_many(
        &configs,
        |config| font_asset::TypefaceSource::open(&config.typeface_path, config.point_size),
        |_, _| progress.inc(1),
    );

    let mut failures = 0;
    for (config, result) in configs.iter().zip(&results) {
        match result {
            Ok(report) => info!("wrote {:?}", report.output_path),
            Err(err) => {
                failures += 1;
                report_failure(config, err);
            },
        }
    }

    progress.finish_with_message(format!("Assets written to {:?}", args.out_dir));
    if failures > 0 {
        anyhow::bail!("{failures} of {} builds failed", configs.len());
    }
    Ok(())
}

fn report_failure(config: &BuildConfig, err: &AssetError) {
    error!("{} {}pt: {err}", config.display_name(), config.point_size);
}

fn inspect(args: InspectArgs) -> Result<()> {
    let file =
        File::open(&args.input).with_context(|| format!("failed to open {:?}", args.input))?;
    let asset = FontAsset::read_from(&mut BufReader::new(file))
        .with_context(|| format!("failed to decode {:?}", args.input))?;

    println!("{:?}: {} glyphs at {}pt", args.input, asset.glyph_count(), asset.point_size());

    for record in asset.records() {
        if !args.glyphs.is_empty() && !args.glyphs.contains(&record.code_point()) {
            continue;
        }

        let metrics = record.metrics();
        println!(
            "\n{:?} {}x{} offset ({}, {})",
            metrics.code_point, metrics.width, metrics.height, metrics.x_offset, metrics.y_offset
        );
        for row in record.bitmap().text_rows() {
            println!("{}", row);
        }
    }

    if let Some(path) = &args.sheet {
        save_sheet(&asset, args.columns, path)?;
    }

    Ok(())
}

/// Always writes PNG, whatever extension `path` carries.
fn save_sheet(asset: &FontAsset, columns: u32, path: &Path) -> Result<()> {
    contact_sheet(asset, columns)
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("failed to save contact sheet {:?}", path))
}

fn find_typefaces(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        if !path.exists() {
            anyhow::bail!("typeface {:?} does not exist", path);
        }
        return Ok(vec![path.to_path_buf()]);
    }

    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().to_path_buf())
        .filter(|path| is_typeface(path))
        .collect();
    entries.sort();
    if entries.is_empty() {
        anyhow::bail!("no typeface files found in {:?}", path);
    }
    Ok(entries)
}

fn is_typeface(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|ext| TYPEFACE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl GlyphSettings {
    fn to_charset(&self) -> Result<CharSet> {
        match &self.chars {
            Some(chars) => CharSet::from_chars(chars.chars()).context("invalid --chars"),
            None => Ok(CharSet::ascii_printable()),
        }
    }
}

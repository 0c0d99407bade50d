mod asset;
mod raster;

use std::any::Any;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;

use log::info;

pub use asset::{
    bitmap::GlyphBitmap,
    charset::{CharSet, PRINTABLE_ASCII},
    container::{FontAsset, HEADER_LEN, MAGIC, VERSION},
    pack::{pack_rows, packed_len, row_stride, unpack_rows},
    record::{GlyphMetrics, GlyphRecord, RECORD_HEADER_LEN},
    sheet::contact_sheet,
};
pub use raster::{
    binarize::{binarize, COVERAGE_THRESHOLD},
    source::{BoundingBox, GlyphSource, RasterGlyph},
    typeface::TypefaceSource,
};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to load typeface {}: {reason}", path.display())]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error("failed to write {}: {source}", path.display())]
    Sink { path: PathBuf, source: io::Error },
    #[error("invalid point size {0}")]
    InvalidPointSize(u16),
    #[error("code point {0:?} is outside the printable ASCII range")]
    UnsupportedCodePoint(char),
    #[error("no code points requested")]
    EmptyCharSet,
    #[error("build aborted: {0}")]
    InvariantViolation(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("not a font asset (magic {0:02x?})")]
    BadMagic([u8; 4]),
    #[error("unsupported font asset version {0}")]
    UnsupportedVersion(u16),
    #[error("unexpected end of data in {0}")]
    Truncated(&'static str),
    #[error("invalid code point {0:#06x}")]
    InvalidCodePoint(u16),
    #[error("glyph {0:?} has zero width or height")]
    ZeroSizedGlyph(char),
    #[error("{0} unexpected bytes after the last glyph")]
    TrailingBytes(usize),
    #[error("failed to read font asset: {0}")]
    Io(#[from] io::Error),
}

/// Everything needed to produce one asset file.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub typeface_path: PathBuf,
    pub output_path: PathBuf,
    pub point_size: u16,
    /// Human readable name used in log output.
    pub display_name: Option<String>,
    pub charset: CharSet,
}

impl BuildConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        typeface_path: P,
        output_path: Q,
        point_size: u16,
    ) -> Self {
        Self {
            typeface_path: typeface_path.into(),
            output_path: output_path.into(),
            point_size,
            display_name: None,
            charset: CharSet::ascii_printable(),
        }
    }

    pub fn display_name(&self) -> String {
        match &self.display_name {
            Some(name) => name.clone(),
            None => self
                .typeface_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.typeface_path.display().to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub glyph_count: u16,
    pub bytes_written: usize,
}

#[derive(Default)]
pub struct FontAssetBuilder;

impl FontAssetBuilder {
    /// Opens the configured typeface, encodes it and writes the asset file.
    pub fn build(&self, config: &BuildConfig) -> Result<BuildReport, AssetError> {
        self.build_with(config, |config| {
            TypefaceSource::open(&config.typeface_path, config.point_size)
        })
    }

    pub fn build_with<F, S>(&self, config: &BuildConfig, open: F) -> Result<BuildReport, AssetError>
    where
        F: FnOnce(&BuildConfig) -> Result<S, AssetError>,
        S: GlyphSource,
    {
        if config.point_size == 0 {
            return Err(AssetError::InvalidPointSize(config.point_size));
        }

        info!("creating {} {}pt font", config.display_name(), config.point_size);
        let source = open(config)?;
        if source.point_size() != config.point_size {
            return Err(AssetError::InvariantViolation(format!(
                "source renders at {}pt but {}pt was requested",
                source.point_size(),
                config.point_size
            )));
        }

        let asset = self.build_asset(&source, &config.charset);
        let report = self.write_asset(&asset, &config.output_path)?;
        info!(
            "created {} ({} glyphs, {} bytes)",
            report.output_path.display(),
            report.glyph_count,
            report.bytes_written
        );
        Ok(report)
    }

    /// Rasterizes every code point of `charset` once, in order.
    pub fn build_asset<S: GlyphSource + ?Sized>(&self, source: &S, charset: &CharSet) -> FontAsset {
        let point_size = source.point_size();
        assert!(point_size > 0, "glyph source reports a zero point size");
        let records: Vec<GlyphRecord> = charset
            .chars()
            .iter()
            .map(|&ch| GlyphRecord::build(ch, &source.rasterize(ch), point_size))
            .collect();

        assert_eq!(records.len(), charset.len(), "glyph count mismatch");
        FontAsset::new(point_size, records)
    }

    /// Writes `asset` to `path`. A partially written file is left in place on failure.
    pub fn write_asset(&self, asset: &FontAsset, path: &Path) -> Result<BuildReport, AssetError> {
        let sink_error = |source| AssetError::Sink { path: path.to_path_buf(), source };

        let file = File::create(path).map_err(sink_error)?;
        let mut writer = BufWriter::new(file);
        let bytes_written = asset.write_to(&mut writer).map_err(sink_error)?;
        writer.flush().map_err(sink_error)?;

        Ok(BuildReport {
            output_path: path.to_path_buf(),
            glyph_count: asset.glyph_count(),
            bytes_written,
        })
    }

    /// Runs every build on its own thread.
    ///
    /// Results come back in the order of `configs`. A failing or panicking build only affects
    /// its own entry; `on_done` is called as each build finishes.
    pub fn build_many<F, S, D>(
        &self,
        configs: &[BuildConfig],
        open: F,
        on_done: D,
    ) -> Vec<Result<BuildReport, AssetError>>
    where
        F: Fn(&BuildConfig) -> Result<S, AssetError> + Sync,
        S: GlyphSource,
        D: Fn(&BuildConfig, &Result<BuildReport, AssetError>) + Sync,
    {
        let open = &open;
        let on_done = &on_done;

        thread::scope(|scope| {
            let handles: Vec<_> = configs
                .iter()
                .map(|config| {
                    scope.spawn(move || {
                        let result = panic::catch_unwind(AssertUnwindSafe(|| {
                            self.build_with(config, open)
                        }))
                        .unwrap_or_else(|payload| {
                            Err(AssetError::InvariantViolation(panic_message(payload.as_ref())))
                        });
                        on_done(config, &result);
                        result
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|payload| {
                        Err(AssetError::InvariantViolation(panic_message(payload.as_ref())))
                    })
                })
                .collect()
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic")
    }
}

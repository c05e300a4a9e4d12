//! Source raster to DTED Level 2 conversion.
//!
//! A tile goes through three stages, chained through two scratch files:
//!
//! 1. **resample**: crop to the exact 1° × 1° window and resample to the
//!    band's column count × [`GRID_HEIGHT`] rows, stamping [`NODATA_VALUE`].
//!    The cloud-optimized sources lose their no-data marking, so it has to be
//!    restored here or the fill stage cannot see the holes.
//! 2. **fill_gaps**: interpolate no-data pixels from valid neighbours within
//!    [`FILL_MAX_DISTANCE`] pixels.
//! 3. **encode**: write the filled raster as DTED Level 2 to the final path.
//!
//! The raster work itself is delegated to a [`RasterToolkit`]. Production code
//! uses [`GdalToolkit`], which shells out to the GDAL command-line utilities.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Cop2DtedError, Result};
use crate::tile::{TileCoordinate, Window, GRID_HEIGHT, NODATA_VALUE};

/// Search distance, in pixels, used when filling no-data holes.
pub const FILL_MAX_DISTANCE: u32 = 2;

/// GDAL driver name of the output format.
pub const DTED_DRIVER: &str = "DTED";

/// DTED compliance level written for every tile.
pub const DTED_LEVEL: u8 = 2;

/// Stage names used in errors and logs.
pub const STAGE_RESAMPLE: &str = "resample";
pub const STAGE_FILL: &str = "fill_gaps";
pub const STAGE_ENCODE: &str = "encode";

/// The raster operations the converter needs from a geospatial toolkit.
///
/// Each operation reads `src` and writes a complete raster to `dst`.
pub trait RasterToolkit {
    /// Crop `src` to `window` and resample to `width` × `height` pixels,
    /// marking `nodata` as the no-data value of the result.
    fn resample(
        &self,
        src: &Path,
        window: Window,
        width: u32,
        height: u32,
        nodata: i32,
        dst: &Path,
    ) -> Result<()>;

    /// Fill no-data pixels from neighbours at most `max_distance` pixels away.
    fn fill_gaps(&self, src: &Path, max_distance: u32, dst: &Path) -> Result<()>;

    /// Re-encode `src` with the given output driver and compliance level.
    fn encode(&self, src: &Path, driver: &str, level: u8, dst: &Path) -> Result<()>;
}

/// Converts one fetched source raster into its output file.
pub trait TileConverter {
    /// Convert `source` for `coord` below `output_base`.
    ///
    /// Failures are logged and reported as `false`; they never propagate.
    fn convert(&self, source: &Path, coord: TileCoordinate, output_base: &Path) -> bool;
}

/// [`RasterToolkit`] backed by the GDAL command-line utilities.
#[derive(Debug, Clone)]
pub struct GdalToolkit {
    translate: String,
    fillnodata: String,
}

impl Default for GdalToolkit {
    fn default() -> Self {
        Self {
            translate: "gdal_translate".to_string(),
            fillnodata: "gdal_fillnodata.py".to_string(),
        }
    }
}

impl GdalToolkit {
    /// Use a different `gdal_translate` executable.
    pub fn with_translate(mut self, program: impl Into<String>) -> Self {
        self.translate = program.into();
        self
    }

    /// Use a different `gdal_fillnodata` executable.
    pub fn with_fillnodata(mut self, program: impl Into<String>) -> Self {
        self.fillnodata = program.into();
        self
    }

    fn resample_command(
        &self,
        src: &Path,
        window: Window,
        width: u32,
        height: u32,
        nodata: i32,
        dst: &Path,
    ) -> Command {
        let mut cmd = Command::new(&self.translate);
        cmd.args(["-of", "GTiff", "-q", "-projwin"])
            .args([window.ulx, window.uly, window.lrx, window.lry].map(|v| format!("{:.1}", v)))
            .arg("-outsize")
            .args([width.to_string(), height.to_string()])
            .args(["-a_nodata".to_string(), nodata.to_string()])
            .arg(src)
            .arg(dst);
        cmd
    }

    fn fill_command(&self, src: &Path, max_distance: u32, dst: &Path) -> Command {
        // GDAL_PAM_ENABLED=NO keeps .aux.xml sidecars out of the scratch dir
        let mut cmd = Command::new(&self.fillnodata);
        cmd.args(["--config", "GDAL_PAM_ENABLED", "NO", "-q", "-md"])
            .arg(max_distance.to_string())
            .arg(src)
            .arg(dst);
        cmd
    }

    fn encode_command(&self, src: &Path, driver: &str, level: u8, dst: &Path) -> Command {
        let mut cmd = Command::new(&self.translate);
        cmd.args(["--config", "GDAL_PAM_ENABLED", "NO", "-of", driver, "-q", "-co"])
            .arg(format!("LEVEL={}", level))
            .arg(src)
            .arg(dst);
        cmd
    }

    /// Run a command to completion, mapping spawn errors and non-zero exits.
    fn run(stage: &'static str, mut cmd: Command) -> Result<()> {
        let program = cmd.get_program().to_string_lossy().into_owned();
        tracing::debug!(stage, program = %program, "Running {:?}", cmd);

        let output = cmd.output().map_err(|e| Cop2DtedError::StageFailed {
            stage,
            reason: format!("failed to run {}: {}", program, e),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Cop2DtedError::StageFailed {
                stage,
                reason: format!("{} {} {}", program, output.status, stderr.trim())
                    .trim_end()
                    .to_string(),
            });
        }

        Ok(())
    }
}

impl RasterToolkit for GdalToolkit {
    fn resample(
        &self,
        src: &Path,
        window: Window,
        width: u32,
        height: u32,
        nodata: i32,
        dst: &Path,
    ) -> Result<()> {
        Self::run(
            STAGE_RESAMPLE,
            self.resample_command(src, window, width, height, nodata, dst),
        )
    }

    fn fill_gaps(&self, src: &Path, max_distance: u32, dst: &Path) -> Result<()> {
        Self::run(STAGE_FILL, self.fill_command(src, max_distance, dst))
    }

    fn encode(&self, src: &Path, driver: &str, level: u8, dst: &Path) -> Result<()> {
        Self::run(STAGE_ENCODE, self.encode_command(src, driver, level, dst))
    }
}

/// Scratch rasters of one tile, removed when dropped.
struct ScratchFiles {
    resampled: PathBuf,
    filled: PathBuf,
}

impl ScratchFiles {
    fn new(scratch_dir: &Path, coord: TileCoordinate) -> Self {
        Self {
            resampled: scratch_dir.join(format!("temp_{}_{}_1.tif", coord.lat, coord.lon)),
            filled: scratch_dir.join(format!("temp_{}_{}_2.tif", coord.lat, coord.lon)),
        }
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in [&self.resampled, &self.filled] {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    tracing::warn!(path = %path.display(), "Failed to remove scratch file: {}", e);
                }
            }
        }
    }
}

/// Three-stage converter over a [`RasterToolkit`].
///
/// # Example
///
/// ```ignore
/// use cop2dted::convert::{Converter, GdalToolkit, TileConverter};
/// use cop2dted::TileCoordinate;
///
/// let converter = Converter::new(GdalToolkit::default(), "/tmp/cop2dted");
/// let ok = converter.convert(
///     Path::new("Copernicus_DSM_COG_10_N53_00_E020_00_DEM.tif"),
///     TileCoordinate::new(53, 20),
///     Path::new("./DTED_Lithuania"),
/// );
/// ```
pub struct Converter<T> {
    toolkit: T,
    scratch_dir: PathBuf,
}

impl<T: RasterToolkit> Converter<T> {
    /// Create a converter writing its scratch rasters into `scratch_dir`.
    pub fn new<P: AsRef<Path>>(toolkit: T, scratch_dir: P) -> Self {
        Self {
            toolkit,
            scratch_dir: scratch_dir.as_ref().to_path_buf(),
        }
    }

    /// Run all three stages and return the path of the written file.
    pub fn try_convert(
        &self,
        source: &Path,
        coord: TileCoordinate,
        output_base: &Path,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.scratch_dir)?;
        let scratch = ScratchFiles::new(&self.scratch_dir, coord);

        self.toolkit.resample(
            source,
            coord.window(),
            coord.grid_width(),
            GRID_HEIGHT,
            NODATA_VALUE,
            &scratch.resampled,
        )?;

        self.toolkit
            .fill_gaps(&scratch.resampled, FILL_MAX_DISTANCE, &scratch.filled)?;

        let final_path = coord.output_path(output_base);
        if let Some(parent) = final_path.parent() {
            fs::create_dir_all(parent)?;
        }

        self.toolkit
            .encode(&scratch.filled, DTED_DRIVER, DTED_LEVEL, &final_path)?;

        Ok(final_path)
    }
}

impl<T: RasterToolkit> TileConverter for Converter<T> {
    fn convert(&self, source: &Path, coord: TileCoordinate, output_base: &Path) -> bool {
        match self.try_convert(source, coord, output_base) {
            Ok(path) => {
                tracing::info!(lat = coord.lat, lon = coord.lon, "Wrote {}", path.display());
                true
            }
            Err(e) => {
                tracing::error!(
                    lat = coord.lat,
                    lon = coord.lon,
                    "Error processing {}: {}",
                    source.display(),
                    e
                );
                false
            }
        }
    }
}

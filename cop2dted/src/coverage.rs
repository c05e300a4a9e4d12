//! Coverage runs over a latitude/longitude rectangle.
//!
//! [`CoverageRunner`] walks every tile of a [`CoverageArea`], fetches its
//! source raster, converts it, and tallies the outcome. A failing tile never
//! stops the run.
//!
//! # Example
//!
//! ```ignore
//! use cop2dted::{CoverageArea, CoverageRunner};
//! use cop2dted::convert::{Converter, GdalToolkit};
//! use cop2dted::download::{DownloadConfig, Downloader};
//!
//! let fetcher = Downloader::new(DownloadConfig::default(), ".")?;
//! let converter = Converter::new(GdalToolkit::default(), ".");
//! let runner = CoverageRunner::new(fetcher, converter, "./DTED_Lithuania");
//!
//! let summary = runner.run(&CoverageArea::new(53, 57, 20, 28));
//! println!("Success: {}, Fail: {}", summary.succeeded, summary.failed());
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use rayon::iter::{ParallelBridge, ParallelIterator};

use crate::convert::TileConverter;
use crate::download::TileFetcher;
use crate::tile::TileCoordinate;

/// Rectangle of whole-degree tiles. Upper bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageArea {
    /// Southernmost tile latitude (inclusive).
    pub lat_min: i32,
    /// Northern bound (exclusive).
    pub lat_max: i32,
    /// Westernmost tile longitude (inclusive).
    pub lon_min: i32,
    /// Eastern bound (exclusive).
    pub lon_max: i32,
}

impl CoverageArea {
    /// Create a new coverage area.
    pub fn new(lat_min: i32, lat_max: i32, lon_min: i32, lon_max: i32) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Tiles in processing order: latitude outer, longitude inner.
    ///
    /// Empty or inverted ranges yield no tiles.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoordinate> {
        let area = *self;
        (area.lat_min..area.lat_max).flat_map(move |lat| {
            (area.lon_min..area.lon_max).map(move |lon| TileCoordinate::new(lat, lon))
        })
    }

    /// Number of tiles in the area.
    pub fn tile_count(&self) -> u64 {
        let rows = (self.lat_max as i64 - self.lat_min as i64).max(0) as u64;
        let cols = (self.lon_max as i64 - self.lon_min as i64).max(0) as u64;
        rows * cols
    }
}

impl fmt::Display for CoverageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lat {}-{}, Lon {}-{}",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

/// What happened to a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    /// The output file was written and the source removed.
    Converted,
    /// No source raster could be obtained.
    FetchFailed,
    /// The source was fetched but a conversion stage failed.
    ConvertFailed,
}

/// Outcome reported to the progress callback after each tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileOutcome {
    pub coord: TileCoordinate,
    pub status: TileStatus,
}

/// Callback invoked after each tile completes.
pub type TileCallback = Box<dyn Fn(&TileOutcome) + Send + Sync>;

/// Statistics from a coverage run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Tiles converted successfully.
    pub succeeded: u64,
    /// Tiles whose source could not be fetched.
    pub fetch_failed: u64,
    /// Tiles whose conversion failed.
    pub convert_failed: u64,
    /// Total elapsed time in milliseconds.
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Tiles that failed for any reason.
    pub fn failed(&self) -> u64 {
        self.fetch_failed + self.convert_failed
    }

    /// Tiles processed.
    pub fn total(&self) -> u64 {
        self.succeeded + self.failed()
    }

    /// `(success_count, fail_count)`.
    pub fn counts(&self) -> (u64, u64) {
        (self.succeeded, self.failed())
    }
}

#[derive(Default)]
struct Tally {
    succeeded: AtomicU64,
    fetch_failed: AtomicU64,
    convert_failed: AtomicU64,
}

/// Drives fetch and conversion over every tile of an area.
pub struct CoverageRunner<F, C> {
    fetcher: F,
    converter: C,
    output_base: PathBuf,
    jobs: usize,
    on_tile: Option<TileCallback>,
}

impl<F, C> CoverageRunner<F, C>
where
    F: TileFetcher + Sync,
    C: TileConverter + Sync,
{
    /// Create a sequential runner writing below `output_base`.
    pub fn new<P: AsRef<Path>>(fetcher: F, converter: C, output_base: P) -> Self {
        Self {
            fetcher,
            converter,
            output_base: output_base.as_ref().to_path_buf(),
            jobs: 1,
            on_tile: None,
        }
    }

    /// Process up to `jobs` tiles at a time. Values below 1 mean 1.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Register a callback invoked after each tile.
    pub fn on_tile(mut self, callback: impl Fn(&TileOutcome) + Send + Sync + 'static) -> Self {
        self.on_tile = Some(Box::new(callback));
        self
    }

    /// The tile fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Base directory of the output tree.
    pub fn output_base(&self) -> &Path {
        &self.output_base
    }

    /// Fetch and convert a single tile.
    ///
    /// On success the fetched source is deleted. After a failed conversion
    /// it is left in place so the next run can reuse it.
    pub fn process_tile(&self, coord: TileCoordinate) -> TileStatus {
        let tile_name = coord.tile_name();

        let Some(source) = self.fetcher.fetch(&tile_name) else {
            return TileStatus::FetchFailed;
        };

        if !self.converter.convert(&source, coord, &self.output_base) {
            return TileStatus::ConvertFailed;
        }

        if let Err(e) = fs::remove_file(&source) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %source.display(), "Failed to remove source raster: {}", e);
            }
        }

        TileStatus::Converted
    }

    /// Process every tile of `area` and return the tally.
    pub fn run(&self, area: &CoverageArea) -> RunSummary {
        let start = Instant::now();
        let tally = Tally::default();

        tracing::debug!(tiles = area.tile_count(), jobs = self.jobs, "Processing {}", area);

        if self.jobs <= 1 {
            self.run_sequential(area, &tally);
        } else {
            match rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build() {
                Ok(pool) => pool.install(|| {
                    area.tiles()
                        .par_bridge()
                        .for_each(|coord| self.record(&tally, coord));
                }),
                Err(e) => {
                    tracing::warn!(jobs = self.jobs, "Worker pool unavailable, running sequentially: {}", e);
                    self.run_sequential(area, &tally);
                }
            }
        }

        RunSummary {
            succeeded: tally.succeeded.load(Ordering::Relaxed),
            fetch_failed: tally.fetch_failed.load(Ordering::Relaxed),
            convert_failed: tally.convert_failed.load(Ordering::Relaxed),
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn run_sequential(&self, area: &CoverageArea, tally: &Tally) {
        for coord in area.tiles() {
            self.record(tally, coord);
        }
    }

    fn record(&self, tally: &Tally, coord: TileCoordinate) {
        let status = self.process_tile(coord);

        let counter = match status {
            TileStatus::Converted => &tally.succeeded,
            TileStatus::FetchFailed => &tally.fetch_failed,
            TileStatus::ConvertFailed => &tally.convert_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        if let Some(callback) = &self.on_tile {
            callback(&TileOutcome { coord, status });
        }
    }
}

//! # cop2dted - Copernicus DEM to DTED Level 2
//!
//! Fetches Copernicus GLO-30 elevation tiles from the public AWS bucket and
//! converts them into DTED Level 2 files laid out by coordinate.
//!
//! ## Features
//!
//! - **Resumable**: fetched tiles are cached on disk and reused on re-runs
//! - **Standard grids**: column counts follow the DTED latitude bands
//! - **Fault tolerant**: a missing or broken tile is counted, never fatal
//! - **Pluggable**: fetching and raster work sit behind traits
//!
//! ## Quick Start
//!
//! ```ignore
//! use cop2dted::{CoverageArea, CoverageRunner};
//! use cop2dted::convert::{Converter, GdalToolkit};
//! use cop2dted::download::{DownloadConfig, Downloader};
//!
//! let fetcher = Downloader::new(DownloadConfig::default(), "/var/cache/cop2dted")?;
//! let converter = Converter::new(GdalToolkit::default(), "/var/cache/cop2dted");
//! let runner = CoverageRunner::new(fetcher, converter, "./DTED_Lithuania");
//!
//! let summary = runner.run(&CoverageArea::new(53, 57, 20, 28));
//! // ./DTED_Lithuania/e020/n53.dt2, ...
//! ```
//!
//! ## DTED Level 2 Grid
//!
//! Every tile has 3601 rows. The number of columns depends on latitude:
//!
//! | \|lat\| | Columns |
//! |--------|---------|
//! | < 50° | 3601 |
//! | < 70° | 1801 |
//! | < 75° | 1201 |
//! | < 80° | 901 |
//! | ≥ 80° | 601 |
//!
//! ## Requirements
//!
//! The production converter shells out to `gdal_translate` and
//! `gdal_fillnodata.py`, which must be on `PATH`.

pub mod convert;
pub mod coverage;
pub mod download;
pub mod error;
pub mod filename;
pub mod tile;

// Re-export main types at crate root for convenience
pub use coverage::{CoverageArea, CoverageRunner, RunSummary, TileOutcome, TileStatus};
pub use error::{Cop2DtedError, Result};
pub use tile::{grid_width, LatitudeBand, TileCoordinate, GRID_HEIGHT, NODATA_VALUE};

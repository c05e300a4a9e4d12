//! Tile coordinates and DTED Level 2 grid geometry.
//!
//! This module provides [`TileCoordinate`], the integer key every other part
//! of the pipeline derives its names and paths from, and the latitude-band
//! table that fixes the output grid width.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::filename::{lat_file_name, lon_dir_name, tile_name};

/// Number of rows in every DTED Level 2 tile (1 arc-second along meridians).
pub const GRID_HEIGHT: u32 = 3601;

/// No-data sentinel stamped on the resampled raster before gap filling.
pub const NODATA_VALUE: i32 = -9999;

/// Latitude band of MIL-PRF-89020B, which fixes the column count of a tile.
///
/// Meridians converge toward the poles, so the longitude spacing coarsens
/// with latitude to keep the ground distance between samples comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatitudeBand {
    /// |lat| < 50°: 1 arc-second longitude spacing
    Zone1,
    /// 50° ≤ |lat| < 70°: 2 arc-seconds
    Zone2,
    /// 70° ≤ |lat| < 75°: 3 arc-seconds
    Zone3,
    /// 75° ≤ |lat| < 80°: 4 arc-seconds
    Zone4,
    /// |lat| ≥ 80°: 6 arc-seconds
    Zone5,
}

impl LatitudeBand {
    /// Band containing the given tile latitude.
    pub fn from_lat(lat: i32) -> Self {
        match lat.unsigned_abs() {
            0..=49 => LatitudeBand::Zone1,
            50..=69 => LatitudeBand::Zone2,
            70..=74 => LatitudeBand::Zone3,
            75..=79 => LatitudeBand::Zone4,
            _ => LatitudeBand::Zone5,
        }
    }

    /// Returns the number of columns mandated for this band.
    pub fn columns(&self) -> u32 {
        match self {
            LatitudeBand::Zone1 => 3601,
            LatitudeBand::Zone2 => 1801,
            LatitudeBand::Zone3 => 1201,
            LatitudeBand::Zone4 => 901,
            LatitudeBand::Zone5 => 601,
        }
    }
}

/// Mandatory DTED Level 2 column count for a tile latitude.
///
/// # Examples
///
/// ```
/// use cop2dted::tile::grid_width;
///
/// assert_eq!(grid_width(49), 3601);
/// assert_eq!(grid_width(50), 1801);
/// assert_eq!(grid_width(-80), 601);
/// ```
pub fn grid_width(lat: i32) -> u32 {
    LatitudeBand::from_lat(lat).columns()
}

/// Georeferenced crop window, upper-left corner first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    /// Western edge (upper-left x).
    pub ulx: f64,
    /// Northern edge (upper-left y).
    pub uly: f64,
    /// Eastern edge (lower-right x).
    pub lrx: f64,
    /// Southern edge (lower-right y).
    pub lry: f64,
}

/// One 1° × 1° cell, identified by its southwest corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoordinate {
    /// Latitude of the southern edge, in [-90, 90).
    pub lat: i32,
    /// Longitude of the western edge, in [-180, 180).
    pub lon: i32,
}

impl TileCoordinate {
    /// Create a new tile coordinate.
    pub fn new(lat: i32, lon: i32) -> Self {
        Self { lat, lon }
    }

    /// Copernicus tile name for this cell.
    pub fn tile_name(&self) -> String {
        tile_name(self.lat, self.lon)
    }

    /// Output grid width for this cell.
    pub fn grid_width(&self) -> u32 {
        grid_width(self.lat)
    }

    /// Exact crop window covering this cell.
    pub fn window(&self) -> Window {
        Window {
            ulx: self.lon as f64,
            uly: (self.lat + 1) as f64,
            lrx: (self.lon + 1) as f64,
            lry: self.lat as f64,
        }
    }

    /// Path of the converted file below `output_base`.
    pub fn output_path(&self, output_base: &Path) -> PathBuf {
        output_base
            .join(lon_dir_name(self.lon))
            .join(lat_file_name(self.lat))
    }
}

impl fmt::Display for TileCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_width_boundaries() {
        assert_eq!(grid_width(0), 3601);
        assert_eq!(grid_width(49), 3601);
        assert_eq!(grid_width(50), 1801);
        assert_eq!(grid_width(69), 1801);
        assert_eq!(grid_width(70), 1201);
        assert_eq!(grid_width(74), 1201);
        assert_eq!(grid_width(75), 901);
        assert_eq!(grid_width(79), 901);
        assert_eq!(grid_width(80), 601);
        assert_eq!(grid_width(89), 601);
    }

    #[test]
    fn test_grid_width_symmetric() {
        for lat in 0..=90 {
            assert_eq!(grid_width(lat), grid_width(-lat), "lat={}", lat);
        }
    }

    #[test]
    fn test_grid_width_monotonic() {
        let mut previous = grid_width(0);
        for lat in 1..=90 {
            let width = grid_width(lat);
            assert!(width <= previous, "width grew at lat={}", lat);
            previous = width;
        }
    }

    #[test]
    fn test_latitude_band() {
        assert_eq!(LatitudeBand::from_lat(-49), LatitudeBand::Zone1);
        assert_eq!(LatitudeBand::from_lat(55), LatitudeBand::Zone2);
        assert_eq!(LatitudeBand::from_lat(-72), LatitudeBand::Zone3);
        assert_eq!(LatitudeBand::from_lat(77), LatitudeBand::Zone4);
        assert_eq!(LatitudeBand::from_lat(-90), LatitudeBand::Zone5);
    }

    #[test]
    fn test_window_north_edge_first() {
        let window = TileCoordinate::new(53, 20).window();
        assert_eq!(window.ulx, 20.0);
        assert_eq!(window.uly, 54.0);
        assert_eq!(window.lrx, 21.0);
        assert_eq!(window.lry, 53.0);

        let window = TileCoordinate::new(-3, -71).window();
        assert_eq!(window.ulx, -71.0);
        assert_eq!(window.uly, -2.0);
        assert_eq!(window.lrx, -70.0);
        assert_eq!(window.lry, -3.0);
    }

    #[test]
    fn test_output_path() {
        let base = Path::new("/data/dted");
        assert_eq!(
            TileCoordinate::new(53, 20).output_path(base),
            PathBuf::from("/data/dted/e020/n53.dt2")
        );
        assert_eq!(
            TileCoordinate::new(-3, -71).output_path(base),
            PathBuf::from("/data/dted/w071/s03.dt2")
        );
    }

    #[test]
    fn test_coordinate_helpers() {
        let coord = TileCoordinate::new(55, 23);
        assert_eq!(coord.tile_name(), "Copernicus_DSM_COG_10_N55_00_E023_00_DEM");
        assert_eq!(coord.grid_width(), 1801);
        assert_eq!(coord.to_string(), "(55, 23)");
    }
}

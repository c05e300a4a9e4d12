//! Tile naming utilities.
//!
//! This module converts integer tile coordinates into the names used by the
//! Copernicus object store and by the DTED output tree.
//!
//! # Copernicus Names
//!
//! GLO-30 tiles follow the convention
//! `Copernicus_DSM_COG_10_{N|S}{lat}_00_{E|W}{lon}_00_DEM`:
//!
//! - Latitude: 2 digits with N/S prefix (e.g., N55, S03)
//! - Longitude: 3 digits with E/W prefix (e.g., E023, W071)
//!
//! The name represents the **southwest corner** of the 1° × 1° tile.
//!
//! # DTED Layout
//!
//! Converted tiles are stored as `{e|w}{lon}/{n|s}{lat}.dt2`, one directory
//! per longitude column.

/// Extension of converted DTED Level 2 files.
pub const DTED_EXTENSION: &str = "dt2";

/// Extension of source rasters as stored in the bucket.
pub const SOURCE_EXTENSION: &str = "tif";

/// Convert an integer tile coordinate to a Copernicus tile name.
///
/// No range validation is done; callers pass valid coordinates.
///
/// # Examples
///
/// ```
/// use cop2dted::filename::tile_name;
///
/// assert_eq!(tile_name(55, 23), "Copernicus_DSM_COG_10_N55_00_E023_00_DEM");
/// assert_eq!(tile_name(-3, -71), "Copernicus_DSM_COG_10_S03_00_W071_00_DEM");
/// ```
pub fn tile_name(lat: i32, lon: i32) -> String {
    let lat_prefix = if lat >= 0 { 'N' } else { 'S' };
    let lon_prefix = if lon >= 0 { 'E' } else { 'W' };

    format!(
        "Copernicus_DSM_COG_10_{}{:02}_00_{}{:03}_00_DEM",
        lat_prefix,
        lat.unsigned_abs(),
        lon_prefix,
        lon.unsigned_abs()
    )
}

/// Object key of a tile inside the bucket: `<name>/<name>.tif`.
pub fn object_key(tile_name: &str) -> String {
    format!("{}/{}.{}", tile_name, tile_name, SOURCE_EXTENSION)
}

/// Local filename of a fetched source raster: `<name>.tif`.
pub fn source_filename(tile_name: &str) -> String {
    format!("{}.{}", tile_name, SOURCE_EXTENSION)
}

/// Name of the longitude directory in the DTED tree (e.g., "e020", "w071").
pub fn lon_dir_name(lon: i32) -> String {
    let prefix = if lon >= 0 { 'e' } else { 'w' };
    format!("{}{:03}", prefix, lon.unsigned_abs())
}

/// Name of the DTED file inside a longitude directory (e.g., "n53.dt2").
pub fn lat_file_name(lat: i32) -> String {
    let prefix = if lat >= 0 { 'n' } else { 's' };
    format!("{}{:02}.{}", prefix, lat.unsigned_abs(), DTED_EXTENSION)
}

//! Source tile retrieval.
//!
//! This module defines [`TileFetcher`], the seam the coverage driver uses to
//! obtain a local source raster for a tile, and the HTTP [`Downloader`] that
//! implements it against the public Copernicus bucket. The downloader is only
//! available when the `download` feature is enabled.
//!
//! # Data Source
//!
//! Copernicus GLO-30 is published as an AWS Open Data bucket that allows
//! anonymous reads, so objects are fetched with a plain unsigned GET:
//!
//! `https://copernicus-dem-30m.s3.amazonaws.com/{name}/{name}.tif`
//!
//! # Cache Directory
//!
//! Fetched rasters are written to an explicit cache directory. A raster that
//! is already present there is reused without any network access, so an
//! interrupted run can simply be started again.

use std::path::{Path, PathBuf};

#[cfg(feature = "download")]
use std::fs::{self, File};

#[cfg(feature = "download")]
use reqwest::blocking::Client;

#[cfg(feature = "download")]
use crate::error::{Cop2DtedError, Result};
use crate::filename::{object_key, source_filename};

/// Public bucket serving Copernicus GLO-30 tiles.
pub const COPERNICUS_BUCKET_URL: &str = "https://copernicus-dem-30m.s3.amazonaws.com";

/// Something that can materialize a source raster for a tile name.
///
/// Implementations never fail loudly: any problem is logged and reported as
/// `None`, and the caller counts the tile as failed.
pub trait TileFetcher {
    /// Return a local path to the raster for `tile_name`, or `None`.
    fn fetch(&self, tile_name: &str) -> Option<PathBuf>;
}

/// Path of an already fetched raster in `cache_dir`, if present.
pub fn cached_source(cache_dir: &Path, tile_name: &str) -> Option<PathBuf> {
    let path = cache_dir.join(source_filename(tile_name));
    path.is_file().then_some(path)
}

/// Configuration for downloading source tiles.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Base URL of the bucket (no trailing slash needed).
    pub bucket_url: String,
    /// Request timeout in seconds. `None` waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            bucket_url: COPERNICUS_BUCKET_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl DownloadConfig {
    /// Create a configuration for a different bucket or mirror.
    ///
    /// # Example
    ///
    /// ```
    /// use cop2dted::download::DownloadConfig;
    ///
    /// let config = DownloadConfig::with_bucket_url("http://localhost:9000/copernicus-dem-30m");
    /// assert_eq!(config.timeout_secs, None);
    /// ```
    pub fn with_bucket_url(bucket_url: impl Into<String>) -> Self {
        Self {
            bucket_url: bucket_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Full URL of the object holding `tile_name`.
    pub fn object_url(&self, tile_name: &str) -> String {
        format!(
            "{}/{}",
            self.bucket_url.trim_end_matches('/'),
            object_key(tile_name)
        )
    }
}

/// Copernicus tile downloader backed by a local cache directory.
#[cfg(feature = "download")]
pub struct Downloader {
    client: Client,
    config: DownloadConfig,
    cache_dir: PathBuf,
}

#[cfg(feature = "download")]
impl Downloader {
    /// Create a new downloader writing into `cache_dir`.
    pub fn new<P: AsRef<Path>>(config: DownloadConfig, cache_dir: P) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout_secs.map(std::time::Duration::from_secs))
            .build()
            .map_err(|e| Cop2DtedError::DownloadFailed {
                tile: String::new(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config,
            cache_dir: cache_dir.as_ref().to_path_buf(),
        })
    }

    /// Directory fetched rasters are stored in.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Download the raster for `tile_name`, reusing a cached copy.
    ///
    /// # Returns
    ///
    /// The path to the local `.tif` file.
    pub fn download(&self, tile_name: &str) -> Result<PathBuf> {
        if let Some(path) = cached_source(&self.cache_dir, tile_name) {
            tracing::info!(
                "File {} already exists. Skipping download.",
                path.display()
            );
            return Ok(path);
        }

        fs::create_dir_all(&self.cache_dir)?;

        let dest_path = self.cache_dir.join(source_filename(tile_name));
        let part_path = self
            .cache_dir
            .join(format!("{}.part", source_filename(tile_name)));
        let url = self.config.object_url(tile_name);

        tracing::info!(key = %object_key(tile_name), "Downloading {} from bucket...", tile_name);

        match self.do_download(&url, tile_name, &part_path) {
            Ok(()) => promote_part_file(&part_path, dest_path),
            Err(e) => {
                let _ = fs::remove_file(&part_path);
                Err(e)
            }
        }
    }

    /// Perform the actual download into `part_path`.
    fn do_download(&self, url: &str, tile_name: &str, part_path: &Path) -> Result<()> {
        let mut response = self.client.get(url).send()?;

        if !response.status().is_success() {
            return Err(Cop2DtedError::DownloadFailed {
                tile: tile_name.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let mut file = File::create(part_path)?;
        let bytes = response.copy_to(&mut file)?;
        file.sync_all()?;

        tracing::debug!(tile = tile_name, bytes, "Download complete");
        Ok(())
    }
}

/// Move a completed download into place. The partial file never outlives a
/// failed rename.
#[cfg(feature = "download")]
fn promote_part_file(part_path: &Path, dest_path: PathBuf) -> Result<PathBuf> {
    match fs::rename(part_path, &dest_path) {
        Ok(()) => Ok(dest_path),
        Err(e) => {
            let _ = fs::remove_file(part_path);
            Err(e.into())
        }
    }
}

#[cfg(feature = "download")]
impl TileFetcher for Downloader {
    fn fetch(&self, tile_name: &str) -> Option<PathBuf> {
        match self.download(tile_name) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!(tile = tile_name, "Failed to download {}: {}", tile_name, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const TILE: &str = "Copernicus_DSM_COG_10_N55_00_E023_00_DEM";

    #[test]
    fn test_default_config() {
        let config = DownloadConfig::default();
        assert_eq!(config.bucket_url, COPERNICUS_BUCKET_URL);
        assert_eq!(config.timeout_secs, None);
    }

    #[test]
    fn test_config_builder() {
        let config = DownloadConfig::with_bucket_url("http://localhost:9000/dem").with_timeout(60);
        assert_eq!(config.bucket_url, "http://localhost:9000/dem");
        assert_eq!(config.timeout_secs, Some(60));
    }

    #[test]
    fn test_object_url() {
        let config = DownloadConfig::default();
        assert_eq!(
            config.object_url(TILE),
            format!("https://copernicus-dem-30m.s3.amazonaws.com/{TILE}/{TILE}.tif")
        );

        // Trailing slash is not doubled
        let config = DownloadConfig::with_bucket_url("http://mirror.example/dem/");
        assert_eq!(
            config.object_url(TILE),
            format!("http://mirror.example/dem/{TILE}/{TILE}.tif")
        );
    }

    #[test]
    fn test_cached_source() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(cached_source(temp_dir.path(), TILE), None);

        let path = temp_dir.path().join(format!("{TILE}.tif"));
        fs::write(&path, b"cached").unwrap();
        assert_eq!(cached_source(temp_dir.path(), TILE), Some(path));
    }

    #[cfg(feature = "download")]
    #[test]
    fn test_fetch_reuses_cached_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(format!("{TILE}.tif"));
        fs::write(&path, b"cached").unwrap();

        // Port 9 (discard) is never contacted when the file is cached
        let config = DownloadConfig::with_bucket_url("http://127.0.0.1:9");
        let downloader = Downloader::new(config, temp_dir.path()).unwrap();

        assert_eq!(downloader.fetch(TILE), Some(path.clone()));
        assert_eq!(fs::read(&path).unwrap(), b"cached");
    }

    #[cfg(feature = "download")]
    #[test]
    fn test_fetch_failure_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let config = DownloadConfig::with_bucket_url("http://127.0.0.1:9").with_timeout(5);
        let downloader = Downloader::new(config, temp_dir.path()).unwrap();

        assert_eq!(downloader.fetch(TILE), None);

        // Neither the raster nor a partial file is left behind
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(feature = "download")]
    #[test]
    fn test_promote_part_file() {
        let temp_dir = TempDir::new().unwrap();
        let part = temp_dir.path().join(format!("{TILE}.tif.part"));
        let dest = temp_dir.path().join(format!("{TILE}.tif"));
        fs::write(&part, b"raster").unwrap();

        assert_eq!(promote_part_file(&part, dest.clone()).unwrap(), dest);
        assert!(!part.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"raster");
    }

    #[cfg(feature = "download")]
    #[test]
    fn test_failed_rename_removes_part_file() {
        let temp_dir = TempDir::new().unwrap();
        let part = temp_dir.path().join(format!("{TILE}.tif.part"));
        fs::write(&part, b"raster").unwrap();

        // A non-empty directory squatting on the destination blocks the rename
        let dest = temp_dir.path().join(format!("{TILE}.tif"));
        fs::create_dir(&dest).unwrap();
        fs::write(dest.join("keep"), b"x").unwrap();

        assert!(matches!(
            promote_part_file(&part, dest.clone()),
            Err(Cop2DtedError::Io(_))
        ));
        assert!(!part.exists());
        assert!(dest.is_dir());
    }

    #[cfg(feature = "download")]
    #[test]
    fn test_downloader_cache_dir() {
        let temp_dir = TempDir::new().unwrap();
        let downloader = Downloader::new(DownloadConfig::default(), temp_dir.path()).unwrap();
        assert_eq!(downloader.cache_dir(), temp_dir.path());
    }
}

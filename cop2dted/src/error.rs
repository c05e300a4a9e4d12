//! Error types for the cop2dted library.

use thiserror::Error;

/// Errors that can occur while fetching or converting a tile.
#[derive(Error, Debug)]
pub enum Cop2DtedError {
    /// IO error when reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport error while talking to the object store.
    #[cfg(feature = "download")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The source raster for a tile could not be retrieved.
    #[error("Failed to download {tile}: {reason}")]
    DownloadFailed { tile: String, reason: String },

    /// One of the external conversion stages did not complete.
    #[error("Stage '{stage}' failed: {reason}")]
    StageFailed { stage: &'static str, reason: String },
}

/// Result type alias using [`Cop2DtedError`].
pub type Result<T> = std::result::Result<T, Cop2DtedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Cop2DtedError::DownloadFailed {
            tile: "Copernicus_DSM_COG_10_N55_00_E023_00_DEM".to_string(),
            reason: "HTTP 403 Forbidden".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("N55_00_E023"));
        assert!(msg.contains("403"));

        let err = Cop2DtedError::StageFailed {
            stage: "fill_gaps",
            reason: "exit status: 1".to_string(),
        };
        assert!(err.to_string().contains("fill_gaps"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.tif");
        let err: Cop2DtedError = io.into();
        assert!(err.to_string().contains("missing.tif"));
    }
}

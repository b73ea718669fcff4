//! Gzip compression of finished tar archives

use std::path::Path;
use webdist_errors::{BuildError, Error};

/// Compress a tar file with gzip using async-compression
///
/// # Errors
///
/// Returns `BuildError::ArchiveFailed` if reading, compressing or writing fails.
pub async fn compress_with_gzip(tar_path: &Path, output_path: &Path) -> Result<(), Error> {
    use async_compression::tokio::write::GzipEncoder;
    use tokio::fs::File;
    use tokio::io::{AsyncWriteExt, BufReader};

    let failed = |e: std::io::Error| -> Error {
        BuildError::ArchiveFailed {
            message: format!("gzip {}: {e}", output_path.display()),
        }
        .into()
    };

    let input_file = File::open(tar_path).await.map_err(failed)?;
    let output_file = File::create(output_path).await.map_err(failed)?;
    let mut encoder = GzipEncoder::new(output_file);

    let mut reader = BufReader::new(input_file);
    tokio::io::copy(&mut reader, &mut encoder)
        .await
        .map_err(failed)?;

    // Flush the gzip trailer
    encoder.shutdown().await.map_err(failed)?;

    Ok(())
}

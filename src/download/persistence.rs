//! Writing response bodies to the zone file directory.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::ClientError;

/// Creates `dir` (and parents) if missing; an existing directory is fine.
pub(crate) async fn ensure_directory(dir: &Path) -> Result<(), ClientError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ClientError::io(dir, e))
}

/// Streams `response` into `dir/filename`, replacing any existing file.
///
/// Returns the written path and byte count. A partially written file is
/// removed when the stream fails.
pub(crate) async fn persist_response(
    response: reqwest::Response,
    dir: &Path,
    filename: &str,
    url: &str,
) -> Result<(PathBuf, u64), ClientError> {
    ensure_directory(dir).await?;

    let file_path = dir.join(filename);
    let mut file = File::create(&file_path)
        .await
        .map_err(|e| ClientError::io(file_path.clone(), e))?;

    match stream_to_file(&mut file, response, url, &file_path).await {
        Ok(bytes) => Ok((file_path, bytes)),
        Err(error) => {
            drop(file);
            debug!(path = %file_path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&file_path).await;
            Err(error)
        }
    }
}

/// Streams response body to file, returning bytes written.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, ClientError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| ClientError::transport(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| ClientError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    writer
        .flush()
        .await
        .map_err(|e| ClientError::io(file_path, e))?;

    Ok(bytes_written)
}

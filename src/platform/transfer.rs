//! Streaming file transfer helpers
//!
//! Uploads read the file in bounded frames and hand them to the multipart
//! encoder as a body stream, so the file is never loaded whole. Downloads
//! consume the response as a byte stream and write it sequentially.

use futures::StreamExt;
use log::debug;
use mime::Mime;
use reqwest::multipart::Part;
use reqwest::Body;
use std::io;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::ReaderStream;

use crate::config::transfer;
use crate::error::{PlatformError, Result};
use crate::platform::client::validate_response;
use crate::platform::PlatformClient;

/// Guess a MIME type from a file extension
pub fn mime_type_for(path: &Path) -> Mime {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let guessed = match ext.as_str() {
        "json" => Some(mime::APPLICATION_JSON),
        "txt" | "log" => Some(mime::TEXT_PLAIN),
        "csv" => Some(mime::TEXT_CSV),
        "jpg" | "jpeg" => Some(mime::IMAGE_JPEG),
        "png" => Some(mime::IMAGE_PNG),
        "gif" => Some(mime::IMAGE_GIF),
        "pdf" => Some(mime::APPLICATION_PDF),
        "mp4" => "video/mp4".parse().ok(),
        "mov" => "video/quicktime".parse().ok(),
        "avi" => "video/x-msvideo".parse().ok(),
        "tar" => "application/x-tar".parse().ok(),
        "gz" | "tgz" => "application/gzip".parse().ok(),
        "zip" => "application/zip".parse().ok(),
        _ => None,
    };
    guessed.unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Chunked reader over an open file, yielding at most `UPLOAD_CHUNK_SIZE` bytes per item
pub fn file_chunks(file: File) -> ReaderStream<File> {
    ReaderStream::with_capacity(file, transfer::UPLOAD_CHUNK_SIZE)
}

/// Multipart part that streams `path` from disk
pub async fn file_part(path: &Path) -> Result<Part> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            PlatformError::io_at(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a file path"),
            )
        })?
        .to_string_lossy()
        .to_string();

    let file = File::open(path)
        .await
        .map_err(|e| PlatformError::io_at(path, e))?;
    let length = file.metadata().await?.len();
    let mime_type = mime_type_for(path);
    debug!(
        "Streaming upload of {} ({} bytes, {})",
        path.display(),
        length,
        mime_type
    );

    let body = Body::wrap_stream(file_chunks(file));
    Ok(Part::stream_with_length(body, length)
        .file_name(file_name)
        .mime_str(mime_type.as_ref())?)
}

impl PlatformClient {
    /// Stream the body of a GET to `output`, creating its directory
    ///
    /// No resumption: a failed transfer leaves a partial file to be retried
    /// from scratch.
    pub(crate) async fn stream_download(&self, url: &str, output: &Path) -> Result<()> {
        let response = validate_response(self.get(url).send().await?).await?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file = File::create(output)
            .await
            .map_err(|e| PlatformError::io_at(output, e))?;
        let mut writer = BufWriter::with_capacity(transfer::DOWNLOAD_CHUNK_SIZE, file);

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        debug!("Downloaded {} bytes to {}", written, output.display());
        Ok(())
    }
}

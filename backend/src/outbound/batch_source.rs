//! Batch file reader for venue ingestion.
//!
//! Two layouts are accepted:
//! - a JSON array of venue objects (first non-whitespace byte is `[`);
//! - JSON Lines, one venue object per line, blank lines ignored.
//!
//! Every entry decodes on its own, so a bad entry becomes a rejected record
//! instead of failing the whole batch.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::domain::ports::VenueBatch;
use crate::domain::{VenueDraft, VenueValidationError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Errors returned while loading a batch file.
#[derive(Debug, Error)]
pub enum BatchSourceError {
    /// Batch file could not be opened or read.
    #[error("failed to read batch at {path}: {source}")]
    Read {
        /// Path to the batch file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The payload is not decodable as a whole.
    #[error("batch {label} could not be decoded: {message}")]
    Decode {
        /// Batch label.
        label: String,
        /// Decoder message.
        message: String,
    },
}

/// Read and decode a batch file.
///
/// The batch label is the file name; the digest is the SHA-256 of the raw
/// bytes.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use sailing_venues::outbound::batch_source::read_batch_file;
///
/// let batch = read_batch_file(Path::new("data/batch-001.jsonl")).expect("batch");
/// println!("{} records", batch.records.len());
/// ```
pub fn read_batch_file(path: &Path) -> Result<VenueBatch, BatchSourceError> {
    let payload = read_bytes(path)?;
    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut batch = decode_batch(&label, &payload)?;
    batch.digest = Some(format!("{:x}", Sha256::digest(&payload)));
    debug!(
        batch = %batch.label,
        entries = batch.records.len(),
        "batch file decoded"
    );
    Ok(batch)
}

/// Decode an in-memory batch payload.
///
/// A leading UTF-8 byte order mark is ignored.
pub fn decode_batch(label: &str, payload: &[u8]) -> Result<VenueBatch, BatchSourceError> {
    let body = payload.strip_prefix(UTF8_BOM).unwrap_or(payload);
    let records = if starts_with_array(body) {
        decode_array(label, body)?
    } else {
        decode_lines(label, body)?
    };
    Ok(VenueBatch {
        label: label.to_owned(),
        digest: None,
        records,
    })
}

fn starts_with_array(payload: &[u8]) -> bool {
    payload
        .iter()
        .find(|byte| !byte.is_ascii_whitespace())
        .is_some_and(|byte| *byte == b'[')
}

fn decode_array(
    label: &str,
    payload: &[u8],
) -> Result<Vec<Result<VenueDraft, VenueValidationError>>, BatchSourceError> {
    let entries: Vec<Value> =
        serde_json::from_slice(payload).map_err(|err| BatchSourceError::Decode {
            label: label.to_owned(),
            message: err.to_string(),
        })?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<VenueDraft>(entry).map_err(|err| {
                VenueValidationError::Unparseable {
                    message: format!("element {index}: {err}"),
                }
            })
        })
        .collect())
}

fn decode_lines(
    label: &str,
    payload: &[u8],
) -> Result<Vec<Result<VenueDraft, VenueValidationError>>, BatchSourceError> {
    let text = std::str::from_utf8(payload).map_err(|err| BatchSourceError::Decode {
        label: label.to_owned(),
        message: format!("payload is not UTF-8: {err}"),
    })?;
    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<VenueDraft>(line).map_err(|err| {
                VenueValidationError::Unparseable {
                    message: format!("line {}: {err}", index + 1),
                }
            })
        })
        .collect())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, BatchSourceError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let file_name = path.file_name().ok_or_else(|| BatchSourceError::Read {
        path: path.to_path_buf(),
        source: std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "batch path must be a file",
        ),
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|source| {
        BatchSourceError::Read {
            path: path.to_path_buf(),
            source,
        }
    })?;
    dir.read(Path::new(file_name))
        .map_err(|source| BatchSourceError::Read {
            path: path.to_path_buf(),
            source,
        })
}

use std::borrow::Cow;
use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use flate2::read::{GzDecoder, MultiGzDecoder};
use tar::Archive;
use tracing::warn;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[..2] == GZIP_MAGIC
}

pub fn gunzip(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    MultiGzDecoder::new(bytes)
        .read_to_end(&mut out)
        .context("gzip decompression failed")?;
    Ok(out)
}

/// Decompressed body text, or the raw body when it is not valid gzip.
/// Invalid UTF-8 is replaced with U+FFFD and logged.
pub fn gunzip_or_plain(bytes: &[u8]) -> String {
    if is_gzip(bytes) {
        if let Ok(out) = gunzip(bytes) {
            return lossy_text(&out);
        }
    }
    lossy_text(bytes)
}

fn lossy_text(bytes: &[u8]) -> String {
    match String::from_utf8_lossy(bytes) {
        Cow::Borrowed(text) => text.to_string(),
        Cow::Owned(text) => {
            let replaced = text.matches('\u{fffd}').count();
            warn!(bytes = bytes.len(), replaced, "response body is not valid UTF-8, invalid bytes replaced");
            text
        }
    }
}

/// Pulls `<stem>.csv` or `<stem>.csv.gz` out of a gzip-compressed tar
/// archive. Directory prefixes inside the archive are ignored. Returns
/// `Ok(None)` when no member matches.
pub fn extract_member(archive_bytes: &[u8], stem: &str) -> Result<Option<Vec<u8>>> {
    let plain_name = format!("{}.csv", stem);
    let gz_name = format!("{}.csv.gz", stem);

    let decoder = GzDecoder::new(Cursor::new(archive_bytes));
    let mut archive = Archive::new(decoder);
    for entry in archive.entries().context("failed to read tar entries")? {
        let mut entry = entry.context("corrupt tar entry")?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = {
            let path = entry.path().context("tar entry has invalid path")?;
            path.file_name().and_then(|s| s.to_str()).map(str::to_string)
        };
        let Some(name) = name else {
            continue;
        };
        if name != plain_name && name != gz_name {
            continue;
        }
        let mut data = Vec::new();
        entry
            .read_to_end(&mut data)
            .with_context(|| format!("failed to read archive member {}", name))?;
        if name == gz_name || is_gzip(&data) {
            data = gunzip(&data).with_context(|| format!("failed to decompress {}", name))?;
        }
        return Ok(Some(data));
    }
    Ok(None)
}

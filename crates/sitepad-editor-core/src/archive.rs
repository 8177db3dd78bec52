//! Zip archive codec for the workspace mapping.
//!
//! Archives are the portable form of a site: the bundle the editor starts
//! from, the file the user downloads, and (as a data URL) the snapshot kept in
//! local storage.

use std::io::{Cursor, Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::content::FileContent;
use crate::error::ArchiveError;
use crate::kind::FileKind;
use crate::workspace::FileMap;

/// Name given to downloaded archives.
pub const DOWNLOAD_FILE_NAME: &str = "rawtastic-main.zip";

const DATA_URL_PREFIX: &str = "data:application/zip;base64,";

/// Upper bound on the buffer reserved from an entry's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

/// Decompress an archive into a path to content mapping.
///
/// Entries are read as text unless their extension marks them as an image,
/// in which case they are kept as raw bytes. Directory entries are skipped;
/// folders are implied by the file paths.
pub fn read_archive(bytes: &[u8]) -> Result<FileMap, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(ArchiveError::Decode)?;
    let mut files = FileMap::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(ArchiveError::Decode)?;
        if entry.is_dir() {
            continue;
        }
        let path = entry.name().to_owned();
        // the declared size comes from the archive and is not trusted
        let mut raw = Vec::with_capacity(entry.size().min(MAX_PREALLOC) as usize);
        entry
            .read_to_end(&mut raw)
            .map_err(|source| ArchiveError::Entry {
                path: path.clone(),
                source,
            })?;

        let content = if FileKind::from_path(&path).is_some_and(FileKind::is_binary) {
            FileContent::Binary(Bytes::from(raw))
        } else {
            FileContent::Text(String::from_utf8_lossy(&raw).into_owned())
        };
        files.insert(path, content);
    }

    tracing::debug!(entries = files.len(), "archive read");
    Ok(files)
}

/// Serialize a mapping into a fresh zip archive, content as-is.
pub fn write_archive(files: &FileMap) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, content) in files {
        if path.ends_with('/') {
            writer
                .add_directory(path.as_str(), options)
                .map_err(ArchiveError::Encode)?;
            continue;
        }
        writer
            .start_file(path.as_str(), options)
            .map_err(ArchiveError::Encode)?;
        writer.write_all(content.as_bytes())?;
    }

    let cursor = writer.finish().map_err(ArchiveError::Encode)?;
    Ok(cursor.into_inner())
}

/// Encode archive bytes as a `data:` URL, the form kept in local storage.
pub fn to_data_url(archive: &[u8]) -> String {
    let mut url = String::with_capacity(DATA_URL_PREFIX.len() + archive.len() * 4 / 3 + 4);
    url.push_str(DATA_URL_PREFIX);
    STANDARD.encode_string(archive, &mut url);
    url
}

/// Decode a `data:...;base64,` URL back into archive bytes.
pub fn from_data_url(url: &str) -> Result<Vec<u8>, ArchiveError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| ArchiveError::DataUrl("missing data: scheme".into()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ArchiveError::DataUrl("missing ',' separator".into()))?;
    if !header.ends_with(";base64") {
        return Err(ArchiveError::DataUrl("payload is not base64 encoded".into()));
    }
    STANDARD
        .decode(payload.trim())
        .map_err(|e| ArchiveError::DataUrl(e.to_string()))
}

//! Portable archive of the site, for download and local persistence.

use sitepad_editor_core::{DOWNLOAD_FILE_NAME, FileMap, write_archive};

use crate::error::PreviewError;

/// A built archive ready to hand to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteArchive {
    pub file_name: &'static str,
    pub bytes: Vec<u8>,
}

impl SiteArchive {
    pub const MIME_TYPE: &'static str = "application/zip";
}

/// Serialize every entry of `files` as-is, with no link rewriting.
pub fn build_archive(files: &FileMap) -> Result<SiteArchive, PreviewError> {
    let bytes = write_archive(files)?;
    tracing::debug!(files = files.len(), bytes = bytes.len(), "archive built");
    Ok(SiteArchive {
        file_name: DOWNLOAD_FILE_NAME,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use sitepad_editor_core::{FileContent, read_archive};

    use super::*;

    #[test]
    fn archive_keeps_original_links() {
        let mut files = FileMap::new();
        files.insert("index.html".into(), "<img src='a.png'>".into());
        files.insert("a.png".into(), FileContent::from(vec![1, 2, 3]));

        let archive = build_archive(&files).unwrap();
        assert_eq!(archive.file_name, "rawtastic-main.zip");
        let reloaded = read_archive(&archive.bytes).unwrap();
        assert_eq!(reloaded, files);
    }
}

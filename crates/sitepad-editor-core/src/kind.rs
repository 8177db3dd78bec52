//! Recognised file kinds.
//!
//! Everything the editor does differently per extension (tree icon, editing
//! mode, MIME type, text vs binary loading) is data on [`FileKind`].

/// Icon shown for files whose extension is not recognised.
pub const UNKNOWN_FILE_ICON: &str = "📄";
/// Icon for a collapsed folder.
pub const FOLDER_ICON: &str = "📁";
/// Icon for an expanded folder.
pub const FOLDER_OPEN_ICON: &str = "📂";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileKind {
    Html,
    Css,
    Js,
    Markdown,
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl FileKind {
    pub const ALL: [FileKind; 8] = [
        FileKind::Html,
        FileKind::Css,
        FileKind::Js,
        FileKind::Markdown,
        FileKind::Png,
        FileKind::Jpg,
        FileKind::Jpeg,
        FileKind::Gif,
    ];

    /// Classify a path by the text after its last `.`.
    ///
    /// Matching is ASCII case-insensitive. Paths without an extension, or with an
    /// extension outside the known set, return `None`.
    pub fn from_path(path: &str) -> Option<Self> {
        let name = path.rsplit('/').next().unwrap_or(path);
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    pub fn extension(self) -> &'static str {
        match self {
            FileKind::Html => "html",
            FileKind::Css => "css",
            FileKind::Js => "js",
            FileKind::Markdown => "md",
            FileKind::Png => "png",
            FileKind::Jpg => "jpg",
            FileKind::Jpeg => "jpeg",
            FileKind::Gif => "gif",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FileKind::Html => "🌐",
            FileKind::Css => "🎨",
            FileKind::Js => "⚡",
            FileKind::Markdown => "📝",
            FileKind::Png | FileKind::Jpg | FileKind::Jpeg | FileKind::Gif => "🖼️",
        }
    }

    /// Language mode tag handed to the editing surface. Images are not editable.
    pub fn editor_mode(self) -> Option<&'static str> {
        match self {
            FileKind::Html => Some("html"),
            FileKind::Css => Some("css"),
            FileKind::Js => Some("javascript"),
            FileKind::Markdown => Some("markdown"),
            FileKind::Png | FileKind::Jpg | FileKind::Jpeg | FileKind::Gif => None,
        }
    }

    /// MIME type used when the file is materialised as a resource handle.
    pub fn mime_type(self) -> &'static str {
        match self {
            FileKind::Html => "text/html",
            FileKind::Css => "text/css",
            FileKind::Js => "text/js",
            FileKind::Markdown => "text/markdown",
            FileKind::Png => "image/png",
            FileKind::Jpg => "image/jpg",
            FileKind::Jpeg => "image/jpeg",
            FileKind::Gif => "image/gif",
        }
    }

    /// Whether archive entries of this kind are loaded as opaque bytes.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            FileKind::Png | FileKind::Jpg | FileKind::Jpeg | FileKind::Gif
        )
    }

    /// Whether files of this kind appear in the file tree.
    pub fn shown_in_tree(self) -> bool {
        matches!(
            self,
            FileKind::Html | FileKind::Css | FileKind::Js | FileKind::Markdown
        )
    }
}

/// Tree icon for an arbitrary path.
pub fn icon_for(path: &str) -> &'static str {
    FileKind::from_path(path)
        .map(FileKind::icon)
        .unwrap_or(UNKNOWN_FILE_ICON)
}

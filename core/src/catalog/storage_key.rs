use camino::Utf8Path as Path;

pub const OPTIMIZED_DIR: &str = "optimized";
pub const THUMBNAIL_DIR: &str = "thumbnails";
pub const VIDEO_DIR: &str = "videos";

pub const OPTIMIZED_MARKER: &str = "-optimized";
pub const THUMBNAIL_MARKER: &str = "-thumb";

/// Every directory of the asset store, the root (`""`) first.
pub const LAYOUT_DIRS: [&str; 4] = ["", OPTIMIZED_DIR, THUMBNAIL_DIR, VIDEO_DIR];

/// URL prefix the asset store is served under
pub const URL_PREFIX: &str = "/uploads";

pub fn original(filename: &str) -> String {
    filename.to_owned()
}

pub fn optimized(filename: &str) -> String {
    format!(
        "{}/{}",
        OPTIMIZED_DIR,
        derived_name(filename, OPTIMIZED_MARKER)
    )
}

pub fn thumbnail(filename: &str) -> String {
    format!(
        "{}/{}",
        THUMBNAIL_DIR,
        derived_name(filename, THUMBNAIL_MARKER)
    )
}

pub fn video(filename: &str) -> String {
    format!("{}/{}", VIDEO_DIR, filename)
}

/// `<stem><marker>.<ext>` with the extension lowercased,
/// or `<filename><marker>` if there is no extension.
pub fn derived_name(filename: &str, marker: &str) -> String {
    let path = Path::new(filename);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!("{}{}.{}", stem, marker, ext.to_ascii_lowercase()),
        _ => format!("{}{}", filename, marker),
    }
}

/// Whether a file name looks like one of the derived variants.
pub fn is_derived_name(filename: &str) -> bool {
    filename.contains(OPTIMIZED_MARKER) || filename.contains(THUMBNAIL_MARKER)
}

pub fn url(key: &str) -> String {
    format!("{}/{}", URL_PREFIX, key)
}

use std::borrow::Cow;

pub fn guess_mime_type(file_ext: &str) -> Option<Cow<'static, str>> {
    match file_ext {
        "jpg" | "jpeg" => Some(Cow::Borrowed("image/jpeg")),
        "png" => Some(Cow::Borrowed("image/png")),
        "gif" => Some(Cow::Borrowed("image/gif")),
        "webp" => Some(Cow::Borrowed("image/webp")),
        "bmp" => Some(Cow::Borrowed("image/bmp")),
        "tif" | "tiff" => Some(Cow::Borrowed("image/tiff")),
        "mp4" => Some(Cow::Borrowed("video/mp4")),
        "webm" => Some(Cow::Borrowed("video/webm")),
        "mov" => Some(Cow::Borrowed("video/quicktime")),
        _ => None,
    }
}

pub fn guess_mime_type_path(path: &camino::Utf8Path) -> Option<Cow<'static, str>> {
    let ext = path.extension()?.to_ascii_lowercase();
    match guess_mime_type(&ext) {
        Some(m) => Some(m),
        None => {
            tracing::warn!(
                "can't guess MIME type for filename '{}'",
                path.file_name().unwrap_or_default()
            );
            None
        }
    }
}

/// `image/JPEG; charset=binary` -> `image/jpeg`
pub fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

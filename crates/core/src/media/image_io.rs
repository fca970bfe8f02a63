use std::path::Path;

use crate::media::error::MediaError;
use crate::shared::frame::Frame;

/// Decode a single image file into a BGR [`Frame`].
///
/// The frame's filename is the file's basename; the index is `None`
/// (folder frames are keyed by name alone).
pub fn read_image(path: &Path) -> Result<Frame, MediaError> {
    let img = image::open(path)
        .map_err(|e| MediaError::decode(path, e.to_string()))?
        .into_rgb8();

    let (width, height) = img.dimensions();
    let mut data = img.into_raw();
    // RGB -> BGR in place
    for px in data.chunks_exact_mut(3) {
        px.swap(0, 2);
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Frame::new(data, width, height, 3, filename, None))
}

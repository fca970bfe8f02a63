use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("input location not found: {0}")]
    InputNotFound(PathBuf),
    #[error("input is neither a video file nor a folder: {0}")]
    UnsupportedInput(PathBuf),
    #[error("failed to decode '{path}': {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("frame not found: '{0}'")]
    FrameNotFound(String),
    #[error("no video stream found in '{0}'")]
    NoVideoStream(PathBuf),
    #[error("ffmpeg: {0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),
}

impl MediaError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

use std::path::{Path, PathBuf};

use crate::media::error::MediaError;
use crate::media::image_io::read_image;
use crate::media::video_stream::{self, VideoStream};
use crate::shared::constants::{IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::shared::frame::Frame;

/// Unified frame producer for a video file or a folder of images.
///
/// The kind is fixed at construction: an existing file with a known video
/// extension is a video source; an existing directory is a folder source;
/// anything else is a fatal input error. Streaming and random access use
/// independent decode sessions so the main loop never pays a seek cost.
#[derive(Debug)]
pub struct FrameSource {
    input: SourceInput,
    frame_count: usize,
}

#[derive(Debug)]
enum SourceInput {
    Video { path: PathBuf },
    Folder { path: PathBuf, files: Vec<PathBuf> },
}

impl FrameSource {
    pub fn open(input_dir: &Path) -> Result<Self, MediaError> {
        if !input_dir.exists() {
            return Err(MediaError::InputNotFound(input_dir.to_path_buf()));
        }

        if input_dir.is_file() {
            if !has_extension(input_dir, VIDEO_EXTENSIONS) {
                return Err(MediaError::UnsupportedInput(input_dir.to_path_buf()));
            }
            log::info!("Input video: {}", input_dir.display());
            let frame_count = video_stream::fast_frame_count(input_dir)?;
            return Ok(Self {
                input: SourceInput::Video {
                    path: input_dir.to_path_buf(),
                },
                frame_count,
            });
        }

        if !input_dir.is_dir() {
            return Err(MediaError::UnsupportedInput(input_dir.to_path_buf()));
        }

        log::info!("Input directory: {}", input_dir.display());
        let files = discover_images(input_dir)?;
        let frame_count = files.len();
        Ok(Self {
            input: SourceInput::Folder {
                path: input_dir.to_path_buf(),
                files,
            },
            frame_count,
        })
    }

    pub fn is_video(&self) -> bool {
        matches!(self.input, SourceInput::Video { .. })
    }

    /// Number of frames in the source.
    ///
    /// For video this is a container-level count and may differ from the
    /// number of decodable frames; for a folder it is the number of
    /// discovered files, including any that later fail to decode.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Lazy sequential pass over all frames, in presentation order for video
    /// and lexicographic filename order for a folder.
    ///
    /// Single unreadable items are logged and skipped; the sequence
    /// continues. Failing to open the video decode session at all is an
    /// error, not an empty stream. Restartable only by calling `stream()`
    /// again, which opens a fresh decode session.
    pub fn stream(&self) -> Result<Box<dyn Iterator<Item = Frame> + '_>, MediaError> {
        match &self.input {
            SourceInput::Video { path } => {
                let stream = VideoStream::open(path)?;
                Ok(Box::new(stream.filter_map(|result| match result {
                    Ok(frame) => Some(frame),
                    Err(e) => {
                        log::warn!("Skipping undecodable video frame: {e}");
                        None
                    }
                })))
            }
            SourceInput::Folder { files, .. } => {
                Ok(Box::new(files.iter().filter_map(|path| {
                    match read_image(path) {
                        Ok(frame) => Some(frame),
                        Err(e) => {
                            log::warn!("Skipping unreadable image: {e}");
                            None
                        }
                    }
                })))
            }
        }
    }

    /// Random access to a single frame by filename.
    ///
    /// For a folder this decodes the named file directly and propagates any
    /// decode failure (the caller asked for this specific file). For video
    /// the 1-based index is recovered from the filename's trailing numeric
    /// suffix (or a bare number) and the frame is re-decoded in a fresh
    /// session, so the pixels match what `stream()` produced for the same
    /// index exactly. Undecodable frames are skipped while counting, the
    /// same way `stream()` skips them when numbering.
    pub fn load_one(&self, filename: &str) -> Result<Frame, MediaError> {
        match &self.input {
            SourceInput::Video { path } => {
                let index = video_stream::parse_frame_index(filename)
                    .ok_or_else(|| MediaError::FrameNotFound(filename.to_string()))?;
                if index == 0 {
                    return Err(MediaError::FrameNotFound(filename.to_string()));
                }
                log::debug!("Loading video frame {index} for '{filename}'");
                VideoStream::open(path)?
                    .filter_map(Result::ok)
                    .nth(index - 1)
                    .ok_or_else(|| MediaError::FrameNotFound(filename.to_string()))
            }
            SourceInput::Folder { path, .. } => {
                let candidate = Path::new(filename);
                let full = if candidate.is_absolute() {
                    candidate.to_path_buf()
                } else {
                    path.join(filename)
                };
                read_image(&full)
            }
        }
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// All image files directly inside `dir`, sorted by filename for a stable
/// iteration order.
fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, MediaError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|_| MediaError::InputNotFound(dir.to_path_buf()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_extension(path, IMAGE_EXTENSIONS))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::video_stream::test_support::create_test_video;

    fn write_png(dir: &Path, name: &str, value: u8) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(8, 8);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([value, value, value]);
        }
        img.save(&path).unwrap();
        path
    }

    // ── construction ────────────────────────────────────────────────

    #[test]
    fn test_open_missing_input_is_fatal() {
        let err = FrameSource::open(Path::new("/nonexistent/input")).unwrap_err();
        assert!(matches!(err, MediaError::InputNotFound(_)));
    }

    #[test]
    fn test_open_non_video_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        let err = FrameSource::open(&path).unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedInput(_)));
    }

    #[test]
    fn test_folder_source_is_not_video() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 10);
        let source = FrameSource::open(dir.path()).unwrap();
        assert!(!source.is_video());
    }

    #[test]
    fn test_video_source_is_video() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 160, 120, 30.0);
        let source = FrameSource::open(&path).unwrap();
        assert!(source.is_video());
    }

    // ── folder streaming ────────────────────────────────────────────

    #[test]
    fn test_folder_counts_all_but_streams_only_decodable() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 10);
        std::fs::write(dir.path().join("b.png"), b"corrupt").unwrap();
        write_png(dir.path(), "c.png", 30);

        let source = FrameSource::open(dir.path()).unwrap();
        assert_eq!(source.frame_count(), 3);

        let names: Vec<String> = source
            .stream()
            .unwrap()
            .map(|f| f.filename().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "c.png"]);
    }

    #[test]
    fn test_folder_stream_is_sorted_and_restartable() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "c.png", 1);
        write_png(dir.path(), "a.png", 2);
        write_png(dir.path(), "b.png", 3);

        let source = FrameSource::open(dir.path()).unwrap();
        let first: Vec<String> =
            source.stream().unwrap().map(|f| f.filename().into()).collect();
        let second: Vec<String> =
            source.stream().unwrap().map(|f| f.filename().into()).collect();
        assert_eq!(first, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_folder_ignores_non_image_files() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 10);
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let source = FrameSource::open(dir.path()).unwrap();
        assert_eq!(source.frame_count(), 1);
    }

    // ── folder random access ────────────────────────────────────────

    #[test]
    fn test_folder_load_one_by_name() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 42);

        let source = FrameSource::open(dir.path()).unwrap();
        let frame = source.load_one("a.png").unwrap();
        assert_eq!(frame.data()[0], 42);
    }

    #[test]
    fn test_folder_load_one_unreadable_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"corrupt").unwrap();

        let source = FrameSource::open(dir.path()).unwrap();
        assert!(source.load_one("bad.png").is_err());
    }

    // ── video streaming and random access ───────────────────────────

    #[test]
    fn test_video_stream_filenames_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 160, 120, 30.0);

        let source = FrameSource::open(&path).unwrap();
        assert_eq!(source.frame_count(), 3);

        let names: Vec<String> =
            source.stream().unwrap().map(|f| f.filename().into()).collect();
        assert_eq!(
            names,
            vec!["clip_000001.png", "clip_000002.png", "clip_000003.png"]
        );
    }

    #[test]
    fn test_video_stream_open_failure_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 160, 120, 30.0);

        let source = FrameSource::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(source.stream().is_err());
    }

    #[test]
    fn test_video_load_one_matches_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 160, 120, 30.0);

        let source = FrameSource::open(&path).unwrap();
        let streamed: Vec<Frame> = source.stream().unwrap().collect();
        let loaded = source.load_one("clip_000002.png").unwrap();

        assert_eq!(loaded.index(), Some(2));
        assert_eq!(loaded.data(), streamed[1].data());
    }

    #[test]
    fn test_video_load_one_accepts_bare_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 160, 120, 30.0);

        let source = FrameSource::open(&path).unwrap();
        let frame = source.load_one("2").unwrap();
        assert_eq!(frame.index(), Some(2));
    }

    #[test]
    fn test_video_load_one_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 160, 120, 30.0);

        let source = FrameSource::open(&path).unwrap();
        let err = source.load_one("clip_000099.png").unwrap_err();
        assert!(matches!(err, MediaError::FrameNotFound(_)));
    }

    #[test]
    fn test_video_load_one_unparseable_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        create_test_video(&path, 3, 160, 120, 30.0);

        let source = FrameSource::open(&path).unwrap();
        let err = source.load_one("plain.png").unwrap_err();
        assert!(matches!(err, MediaError::FrameNotFound(_)));
    }
}

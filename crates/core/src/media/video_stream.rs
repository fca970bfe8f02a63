use std::path::{Path, PathBuf};

use crate::media::error::MediaError;
use crate::shared::frame::Frame;

/// Forward-only frame decoder for one video file.
///
/// Owns its own ffmpeg session so a fresh stream never interferes with any
/// other decode in flight. Frames are converted to BGR24 and carry a
/// synthesized filename `"<basename>_{index:06}.png"` with `index` starting
/// at 1 in presentation order.
pub struct VideoStream {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    basename: String,
    next_index: usize,
    flushing: bool,
    done: bool,
}

// Safety: VideoStream is only used from a single thread at a time. The raw
// pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for VideoStream {}

impl VideoStream {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::BGR24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            width,
            height,
            video_stream_index,
            basename: basename_of(path),
            next_index: 1,
            flushing: false,
            done: false,
        })
    }

    fn try_receive(&mut self) -> Option<Result<Frame, MediaError>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_ok() {
            let mut bgr_frame = ffmpeg_next::util::frame::video::Video::empty();
            if let Err(e) = self.scaler.run(&decoded, &mut bgr_frame) {
                return Some(Err(e.into()));
            }

            let pixels = extract_bgr_pixels(&bgr_frame, self.width, self.height);
            let filename = frame_filename(&self.basename, self.next_index);
            let frame = Frame::new(
                pixels,
                self.width,
                self.height,
                3,
                filename,
                Some(self.next_index),
            );
            self.next_index += 1;
            Some(Ok(frame))
        } else {
            None
        }
    }
}

impl Iterator for VideoStream {
    type Item = Result<Frame, MediaError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Container-level frame count: O(1), reads stream metadata without decoding.
///
/// Falls back to `duration * fps` when the container doesn't record a frame
/// count, so the result is approximate for some formats.
pub fn fast_frame_count(path: &Path) -> Result<usize, MediaError> {
    ffmpeg_next::init()?;

    let ictx = ffmpeg_next::format::input(path)?;
    let stream = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))?;

    let counted = stream.frames();
    if counted > 0 {
        return Ok(counted as usize);
    }

    let rate = stream.avg_frame_rate();
    let fps = if rate.denominator() != 0 {
        rate.numerator() as f64 / rate.denominator() as f64
    } else {
        0.0
    };
    let tb = stream.time_base();
    let seconds = if tb.denominator() != 0 {
        stream.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64
    } else {
        0.0
    };

    Ok((seconds * fps).round().max(0.0) as usize)
}

/// Synthesized filename for a 1-based video frame index.
pub fn frame_filename(basename: &str, index: usize) -> String {
    format!("{basename}_{index:06}.png")
}

/// Recover a 1-based frame index from a synthesized filename or bare number.
///
/// Accepts `"clip_000002.png"` (trailing numeric suffix after the last `_`)
/// or `"2"`. Returns `None` when nothing numeric can be parsed.
pub fn parse_frame_index(filename: &str) -> Option<usize> {
    if !filename.is_empty() && filename.bytes().all(|b| b.is_ascii_digit()) {
        return filename.parse().ok();
    }
    let stem = Path::new(filename).file_stem()?.to_str()?;
    let suffix = stem.rsplit('_').next()?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

fn basename_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Copies pixel data from an ffmpeg frame into a contiguous BGR buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row
/// (stride > width*3); this strips the padding.
fn extract_bgr_pixels(
    bgr_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = bgr_frame.stride(0);
    let data = bgr_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    /// Encode a small MPEG4 test clip with per-frame grey levels `(i * 40) % 256`.
    pub fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: f64) {
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();

        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps as i32));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps as i32, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);

        octx.write_header().unwrap();

        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::BGR24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..num_frames {
            let mut bgr_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::BGR24,
                width,
                height,
            );
            let stride = bgr_frame.stride(0);
            let data = bgr_frame.data_mut(0);
            let value = ((i * 40) % 256) as u8;
            for row in 0..height as usize {
                for col in 0..width as usize {
                    let offset = row * stride + col * 3;
                    data[offset] = value;
                    data[offset + 1] = value;
                    data[offset + 2] = value;
                }
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&bgr_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));

            encoder.send_frame(&yuv_frame).unwrap();

            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
                encoded.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }

        octx.write_trailer().unwrap();
    }
}

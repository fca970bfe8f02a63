//! Diagnostic overlay drawn onto aligned face crops.
//!
//! Presentational only: landmark dots, pose axes, the face and legacy
//! centering boxes, the source face size and pitch/yaw readouts.

use log::debug;

use crate::detection::domain::aligned_face::{centered_size, Centering};
use crate::postprocess::draw;
use crate::postprocess::WorkingMedia;

/// Rendering constants derived from the aligned face size. Computed once
/// per run, when the first face's size becomes known.
#[derive(Clone, Copy, Debug)]
struct OverlayLayout {
    face_size: usize,
    legacy_size: usize,
    font_scale: usize,
    font_pad: usize,
    dot_radius: i32,
}

impl OverlayLayout {
    fn for_size(size: usize) -> Self {
        Self {
            face_size: centered_size(Centering::Head, Centering::Face, size),
            legacy_size: centered_size(Centering::Head, Centering::Legacy, size),
            font_scale: (size / 128).max(1),
            font_pad: size / 64,
            dot_radius: (size / 256).max(1) as i32,
        }
    }
}

#[derive(Debug, Default)]
pub struct DebugOverlayAction {
    layout: Option<OverlayLayout>,
}

impl DebugOverlayAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(&mut self, media: &mut WorkingMedia) {
        let frame_name = media.frame.filename().to_string();
        for (idx, detection) in media.detections.iter_mut().enumerate() {
            let pose = detection.pose;
            let source_size = detection.bounding_box.diagonal();
            let Some(aligned) = detection.aligned.as_mut() else {
                continue;
            };

            let size = aligned.size();
            let layout = *self
                .layout
                .get_or_insert_with(|| OverlayLayout::for_size(size));
            debug!("Drawing landmarks. Frame: '{frame_name}', face: {idx}");

            let points = *aligned.landmarks().points();
            let face_roi = aligned.cropped_roi(layout.face_size);
            let legacy_roi = aligned.cropped_roi(layout.legacy_size);
            let pixels = aligned.pixels_mut();

            // Landmarks
            for (x, y) in points {
                if x <= 0.0 {
                    continue;
                }
                draw::fill_circle(
                    pixels,
                    size,
                    (x.round() as i32, y.round() as i32),
                    layout.dot_radius,
                    draw::YELLOW,
                );
            }

            // Pose axes from the crop centre
            let centre = (size as i32 / 2, size as i32 / 2);
            let [x_axis, y_axis, z_axis] = pose.axis_points(size);
            draw::draw_line(pixels, size, centre, y_axis, draw::GREEN);
            draw::draw_line(pixels, size, centre, x_axis, draw::BLUE);
            draw::draw_line(pixels, size, centre, z_axis, draw::RED);

            // Face centering box, with the source size in the top-right corner
            let (fx1, fy1, fx2, fy2) = face_roi;
            draw::draw_rect(
                pixels,
                size,
                (fx1 as i32, fy1 as i32),
                (fx2 as i32 - 1, fy2 as i32 - 1),
                draw::GREEN,
            );
            let size_text = format!("{}px", source_size.round() as i64);
            let text_x =
                fx2 as i32 - (draw::text_width(&size_text, layout.font_scale) + layout.font_pad) as i32;
            let text_y = fy1 as i32 + layout.font_pad as i32;
            draw::draw_text_bordered(
                pixels,
                size,
                &size_text,
                (text_x, text_y),
                layout.font_scale,
                draw::GREEN,
            );

            // Legacy centering box
            let (lx1, ly1, lx2, ly2) = legacy_roi;
            draw::draw_rect(
                pixels,
                size,
                (lx1 as i32, ly1 as i32),
                (lx2 as i32 - 1, ly2 as i32 - 1),
                draw::RED,
            );

            // Pose readouts, top-left
            let pad = layout.font_pad as i32;
            let line_height = (draw::text_height(layout.font_scale) + layout.font_pad) as i32;
            draw::draw_text_bordered(
                pixels,
                size,
                &format!("pitch: {:.2}", pose.pitch),
                (pad, pad),
                layout.font_scale,
                draw::BLUE,
            );
            draw::draw_text_bordered(
                pixels,
                size,
                &format!("yaw: {:.2}", pose.yaw),
                (pad, pad + line_height),
                layout.font_scale,
                draw::RED,
            );
        }
    }
}

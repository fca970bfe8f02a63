//! The extract driver: frames in, aligned faces and alignment records out.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::alignments::{AlignmentRecord, AlignmentsStore, JsonAlignmentsIo, LoadPolicy};
use crate::config::ExtractConfig;
use crate::detection::domain::aligned_face::AlignedFace;
use crate::detection::domain::aligner::FaceAligner;
use crate::detection::domain::detector::FaceDetector;
use crate::detection::domain::face::FaceDetection;
use crate::detection::domain::recognizer::PluginFactory;
use crate::media::FrameSource;
use crate::postprocess::pipeline::PostProcessPipeline;
use crate::postprocess::WorkingMedia;
use crate::shared::constants::ALIGNED_FACE_SIZE;

/// Receives every face that survives post-processing. The CLI writes PNGs;
/// tests collect in memory.
pub trait FaceSink {
    fn write(
        &mut self,
        frame_filename: &str,
        face_index: usize,
        face: &AlignedFace,
    ) -> Result<(), Box<dyn std::error::Error>>;
}

/// Discards faces; used when only the alignments file is wanted.
pub struct NullFaceSink;

impl FaceSink for NullFaceSink {
    fn write(
        &mut self,
        _frame_filename: &str,
        _face_index: usize,
        _face: &AlignedFace,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ExtractSummary {
    pub frames_found: usize,
    pub frames_skipped: usize,
    pub faces_detected: usize,
    /// Some frame held more than one face; results deserve a manual check.
    pub verify_output: bool,
}

impl ExtractSummary {
    pub fn log(&self) {
        info!("-------------------------");
        info!("Images found:        {}", self.frames_found);
        info!("Faces detected:      {}", self.faces_detected);
        info!("-------------------------");
        if self.verify_output {
            info!("Note:");
            info!("Multiple faces were detected in one or more pictures.");
            info!("Double check your results.");
            info!("-------------------------");
        }
    }
}

pub struct ExtractUseCase {
    config: ExtractConfig,
    detector: Box<dyn FaceDetector>,
    aligner: Box<dyn FaceAligner>,
    postprocess: PostProcessPipeline,
    sink: Box<dyn FaceSink>,
}

impl ExtractUseCase {
    pub fn new(
        config: ExtractConfig,
        factory: Arc<dyn PluginFactory>,
        sink: Box<dyn FaceSink>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        // Filter references are computed inside pipeline construction,
        // before the main loop's sessions exist.
        let postprocess = PostProcessPipeline::from_config(&config, &factory);
        let detector = factory.build_detector()?;
        let aligner = factory.build_aligner()?;
        Ok(Self {
            config,
            detector,
            aligner,
            postprocess,
            sink,
        })
    }

    pub fn run(&mut self) -> Result<ExtractSummary, Box<dyn std::error::Error>> {
        let source = FrameSource::open(&self.config.input_dir)?;
        let alignments_path = AlignmentsStore::resolve_path(
            self.config.alignments_path.as_deref(),
            &self.config.input_dir,
            source.is_video(),
        );
        let mut alignments = AlignmentsStore::open(
            alignments_path,
            Box::new(JsonAlignmentsIo),
            LoadPolicy {
                is_extract: true,
                skip_existing: self.config.skip_existing,
                skip_faces: self.config.skip_faces,
            },
        )?;

        let mut summary = ExtractSummary {
            frames_found: source.frame_count(),
            ..ExtractSummary::default()
        };
        info!(
            "Starting extraction: {} frame(s) in {:?}",
            summary.frames_found, self.config.input_dir
        );

        for frame in source.stream()? {
            let filename = frame.filename().to_string();
            if alignments.frame_exists(&filename) {
                debug!("Skipping previously processed frame '{filename}'");
                summary.frames_skipped += 1;
                continue;
            }

            let raw_faces = match self.detector.detect(&frame) {
                Ok(faces) => faces,
                Err(err) => {
                    warn!("Detection failed for '{filename}': {err}. Skipping frame");
                    continue;
                }
            };

            let mut detections = Vec::with_capacity(raw_faces.len());
            for raw in &raw_faces {
                match self.aligner.align(&frame, raw, ALIGNED_FACE_SIZE) {
                    Ok(aligned) => detections.push(FaceDetection::new(
                        raw.bounding_box.clone(),
                        raw.landmarks.clone(),
                        Some(aligned),
                    )),
                    Err(err) => {
                        warn!("Alignment failed for a face in '{filename}': {err}. Dropping face");
                    }
                }
            }

            let mut media = WorkingMedia::new(frame, detections);
            self.postprocess.process(&mut media);

            for (idx, detection) in media.detections.iter().enumerate() {
                if let Some(aligned) = detection.aligned.as_ref() {
                    if let Err(err) = self.sink.write(&filename, idx, aligned) {
                        warn!("Could not write face {idx} for '{filename}': {err}");
                    }
                }
            }

            summary.faces_detected += media.detections.len();
            if media.detections.len() > 1 {
                summary.verify_output = true;
            }
            alignments.update(filename, AlignmentRecord::from_detections(&media.detections));
            // Persist after every frame so a killed run resumes from the
            // last completed one instead of starting over.
            alignments.save()?;
        }

        alignments.save()?;
        summary.log();
        Ok(summary)
    }
}

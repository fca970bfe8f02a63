//! Identity-based face filtering.
//!
//! Reference embeddings are computed once up front from user-supplied
//! images; each detected face is then kept or dropped by embedding
//! distance against the allow and deny sets.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::bounded;
use log::{debug, info, warn};

use crate::detection::domain::recognizer::{FaceRecognizer, PluginFactory};
use crate::media::read_image;
use crate::postprocess::WorkingMedia;

/// Aligned crop size used for reference embedding extraction.
const REFERENCE_ALIGN_SIZE: usize = 112;

/// Reference embeddings: `allow` identities a face must resemble, `deny`
/// identities it must not.
#[derive(Clone, Debug, Default)]
pub struct FilterReference {
    pub allow: Vec<Vec<f32>>,
    pub deny: Vec<Vec<f32>>,
}

impl FilterReference {
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

pub struct FaceFilterAction {
    references: FilterReference,
    threshold: f32,
    recognizer: Box<dyn FaceRecognizer>,
}

impl FaceFilterAction {
    pub fn new(
        references: FilterReference,
        threshold: f32,
        recognizer: Box<dyn FaceRecognizer>,
    ) -> Self {
        Self {
            references,
            threshold,
            recognizer,
        }
    }

    /// Build the filter from reference image paths, or `None` when no
    /// usable reference files remain after validation.
    pub fn build(
        filter: &[PathBuf],
        nfilter: &[PathBuf],
        threshold: f32,
        factory: &Arc<dyn PluginFactory>,
        multiprocess: bool,
    ) -> Result<Option<Self>, Box<dyn std::error::Error>> {
        let allow_paths = resolve_filter_files("filter", filter);
        let deny_paths = resolve_filter_files("nfilter", nfilter);
        if allow_paths.is_empty() && deny_paths.is_empty() {
            return Ok(None);
        }

        info!("Extracting and aligning faces for the face filter...");
        let references = compute_references(factory, allow_paths, deny_paths, multiprocess)?;
        if references.is_empty() {
            warn!("No faces could be extracted from the filter reference images. This filter will not be applied.");
            return Ok(None);
        }

        Ok(Some(Self::new(
            references,
            threshold,
            factory.build_recognizer()?,
        )))
    }

    /// Drops detections that fail the identity check. Dropped faces are
    /// removed from the working record entirely, so the persisted alignments
    /// never see them.
    pub fn process(&mut self, media: &mut WorkingMedia) {
        let filename = media.frame.filename().to_string();
        for (idx, detection) in media.detections.iter_mut().enumerate() {
            let Some(aligned) = detection.aligned.as_ref() else {
                continue;
            };

            if detection.embedding.is_none() {
                match self.recognizer.embed(aligned) {
                    Ok(embedding) => detection.embedding = Some(embedding),
                    Err(err) => {
                        warn!("Could not embed face {idx} in '{filename}': {err}. Keeping face");
                        continue;
                    }
                }
            }
            let embedding = detection.embedding.as_ref().unwrap();

            if self.keep(embedding) {
                debug!("Accepting recognised face. Frame: '{filename}', face: {idx}");
            } else {
                info!("Skipping not recognised face. Frame: '{filename}', face: {idx}");
                detection.filtered = true;
            }
        }
        media.detections.retain(|d| !d.filtered);
    }

    /// A face is kept when it matches the allow set (if one exists) and
    /// does not match the deny set (if one exists).
    fn keep(&self, embedding: &[f32]) -> bool {
        let matches = |references: &[Vec<f32>]| {
            references
                .iter()
                .any(|r| euclidean_distance(r, embedding) <= self.threshold)
        };
        let allow_ok = self.references.allow.is_empty() || matches(&self.references.allow);
        let deny_ok = self.references.deny.is_empty() || !matches(&self.references.deny);
        allow_ok && deny_ok
    }
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

/// Keep only reference paths that exist on disk; a requested list that
/// resolves to nothing is a warning, never an error.
fn resolve_filter_files(kind: &str, paths: &[PathBuf]) -> Vec<PathBuf> {
    if paths.is_empty() {
        return Vec::new();
    }
    info!("{kind}: {paths:?}");
    let existing: Vec<PathBuf> = paths.iter().filter(|p| p.exists()).cloned().collect();
    if existing.is_empty() {
        warn!("Face {kind} files were requested, but no files could be found. This filter will not be applied.");
    }
    existing
}

/// Compute the reference embeddings, on a worker thread unless
/// `multiprocess` is off. The worker builds its own plugin instances so two
/// inference sessions never share state.
fn compute_references(
    factory: &Arc<dyn PluginFactory>,
    allow_paths: Vec<PathBuf>,
    deny_paths: Vec<PathBuf>,
    multiprocess: bool,
) -> Result<FilterReference, Box<dyn std::error::Error>> {
    if !multiprocess {
        return embed_references(factory.as_ref(), &allow_paths, &deny_paths);
    }

    let factory = Arc::clone(factory);
    let (sender, receiver) = bounded(1);
    let handle = std::thread::spawn(move || {
        let result = embed_references(factory.as_ref(), &allow_paths, &deny_paths)
            .map_err(|e| e.to_string());
        let _ = sender.send(result);
    });
    let result = receiver.recv().map_err(|e| e.to_string())?;
    handle.join().map_err(|_| "reference worker panicked")?;
    Ok(result?)
}

fn embed_references(
    factory: &dyn PluginFactory,
    allow_paths: &[PathBuf],
    deny_paths: &[PathBuf],
) -> Result<FilterReference, Box<dyn std::error::Error>> {
    let mut detector = factory.build_detector()?;
    let mut aligner = factory.build_aligner()?;
    let mut recognizer = factory.build_recognizer()?;

    let mut embed_one = |path: &Path| -> Option<Vec<f32>> {
        let frame = match read_image(path) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("Could not read filter reference {path:?}: {err}. Skipping");
                return None;
            }
        };
        let faces = match detector.detect(&frame) {
            Ok(faces) => faces,
            Err(err) => {
                warn!("Detection failed for filter reference {path:?}: {err}. Skipping");
                return None;
            }
        };
        // The largest face in the reference image is assumed to be the
        // intended identity.
        let face = faces.into_iter().max_by(|a, b| {
            let area_a = a.bounding_box.width * a.bounding_box.height;
            let area_b = b.bounding_box.width * b.bounding_box.height;
            area_a.partial_cmp(&area_b).unwrap_or(std::cmp::Ordering::Equal)
        })?;

        let aligned = match aligner.align(&frame, &face, REFERENCE_ALIGN_SIZE) {
            Ok(aligned) => aligned,
            Err(err) => {
                warn!("Alignment failed for filter reference {path:?}: {err}. Skipping");
                return None;
            }
        };
        match recognizer.embed(&aligned) {
            Ok(embedding) => Some(embedding),
            Err(err) => {
                warn!("Embedding failed for filter reference {path:?}: {err}. Skipping");
                None
            }
        }
    };

    let allow: Vec<Vec<f32>> = allow_paths.iter().filter_map(|p| embed_one(p)).collect();
    let deny: Vec<Vec<f32>> = deny_paths.iter().filter_map(|p| embed_one(p)).collect();
    debug!(
        "Filter references: {} allow, {} deny",
        allow.len(),
        deny.len()
    );
    Ok(FilterReference { allow, deny })
}

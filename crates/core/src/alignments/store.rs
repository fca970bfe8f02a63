use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::alignments::io::{AlignmentsError, AlignmentsIo};
use crate::alignments::record::AlignmentRecord;

/// Resume-control flags, fixed for the lifetime of one run.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadPolicy {
    /// True when running the extract phase (records may be rewritten).
    pub is_extract: bool,
    /// Do not redo frames that already have a record.
    pub skip_existing: bool,
    /// Additionally redo frames previously recorded with zero faces.
    pub skip_faces: bool,
}

/// Resumable per-frame metadata, keyed by frame filename.
pub struct AlignmentsStore {
    path: PathBuf,
    io: Box<dyn AlignmentsIo>,
    data: BTreeMap<String, AlignmentRecord>,
}

impl AlignmentsStore {
    /// Storage location priority: an explicit path wins; otherwise the file
    /// sits beside a video as `<basename>_alignments`, or inside an input
    /// folder as `alignments`. The io appends its own extension.
    pub fn resolve_path(explicit: Option<&Path>, input: &Path, is_video: bool) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        if is_video {
            let basename = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let parent = input.parent().unwrap_or_else(|| Path::new("."));
            parent.join(format!("{basename}_alignments"))
        } else {
            input.join("alignments")
        }
    }

    pub fn open(
        path: PathBuf,
        io: Box<dyn AlignmentsIo>,
        policy: LoadPolicy,
    ) -> Result<Self, AlignmentsError> {
        let data = Self::load_with_policy(io.as_ref(), &path, policy)?;
        debug!(
            "Alignments store at {:?}: {} record(s) after load policy",
            io.file_path(&path),
            data.len()
        );
        Ok(Self { path, io, data })
    }

    fn load_with_policy(
        io: &dyn AlignmentsIo,
        path: &Path,
        policy: LoadPolicy,
    ) -> Result<BTreeMap<String, AlignmentRecord>, AlignmentsError> {
        if !policy.is_extract {
            return if io.exists(path) {
                io.load(path)
            } else {
                Ok(BTreeMap::new())
            };
        }

        if !policy.skip_existing && !policy.skip_faces {
            // Full re-extraction; any existing file is rewritten on save.
            return Ok(BTreeMap::new());
        }

        if !io.exists(path) {
            warn!(
                "Skip flags requested but no alignments file exists at {:?}. \
                 All frames will be processed",
                io.file_path(path)
            );
            return Ok(BTreeMap::new());
        }

        let mut data = io.load(path)?;
        if policy.skip_faces {
            let before = data.len();
            data.retain(|_, record| record.has_faces());
            debug!(
                "Dropped {} faceless record(s) for re-detection",
                before - data.len()
            );
        }
        Ok(data)
    }

    pub fn frame_exists(&self, filename: &str) -> bool {
        self.data.contains_key(filename)
    }

    pub fn frame_has_faces(&self, filename: &str) -> bool {
        self.data
            .get(filename)
            .is_some_and(AlignmentRecord::has_faces)
    }

    pub fn get(&self, filename: &str) -> Option<&AlignmentRecord> {
        self.data.get(filename)
    }

    /// Inserts or replaces the record for a frame. Filenames are unique
    /// keys; updating an existing frame overwrites its previous record.
    pub fn update(&mut self, filename: impl Into<String>, record: AlignmentRecord) {
        self.data.insert(filename.into(), record);
    }

    pub fn save(&self) -> Result<(), AlignmentsError> {
        self.io.save(&self.path, &self.data)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.data.values().map(|r| r.faces.len()).sum()
    }

    /// Frames recorded with more than one face, for the end-of-run summary.
    pub fn multi_face_frames(&self) -> Vec<&str> {
        self.data
            .iter()
            .filter(|(_, r)| r.faces.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignments::io::JsonAlignmentsIo;
    use crate::detection::domain::face::{BoundingBox, FaceDetection};
    use crate::detection::domain::landmarks::FaceLandmarks;
    use rstest::rstest;
    use tempfile::TempDir;

    fn one_face_record() -> AlignmentRecord {
        let det = FaceDetection::new(
            BoundingBox {
                x: 5.0,
                y: 5.0,
                width: 40.0,
                height: 40.0,
                confidence: 0.9,
            },
            FaceLandmarks::new([
                (10.0, 15.0),
                (35.0, 15.0),
                (22.0, 28.0),
                (14.0, 38.0),
                (32.0, 38.0),
            ]),
            None,
        );
        AlignmentRecord::from_detections(&[det])
    }

    /// Writes a two-record alignments file: one frame with a face, one
    /// processed frame with no faces.
    fn seeded_store_path(dir: &TempDir) -> PathBuf {
        let logical = dir.path().join("alignments");
        let mut data = BTreeMap::new();
        data.insert("frame_000001.png".to_string(), one_face_record());
        data.insert("frame_000002.png".to_string(), AlignmentRecord::default());
        JsonAlignmentsIo.save(&logical, &data).unwrap();
        logical
    }

    fn open(path: PathBuf, policy: LoadPolicy) -> AlignmentsStore {
        AlignmentsStore::open(path, Box::new(JsonAlignmentsIo), policy).unwrap()
    }

    #[test]
    fn test_resolve_path_explicit_wins() {
        let explicit = Path::new("/data/custom_alignments");
        let resolved = AlignmentsStore::resolve_path(
            Some(explicit),
            Path::new("/videos/clip.mp4"),
            true,
        );
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_resolve_path_video_sits_beside_video() {
        let resolved =
            AlignmentsStore::resolve_path(None, Path::new("/videos/clip.mp4"), true);
        assert_eq!(resolved, PathBuf::from("/videos/clip_alignments"));
    }

    #[test]
    fn test_resolve_path_folder_sits_inside_folder() {
        let resolved = AlignmentsStore::resolve_path(None, Path::new("/images"), false);
        assert_eq!(resolved, PathBuf::from("/images/alignments"));
    }

    #[test]
    fn test_non_extract_without_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = open(
            dir.path().join("alignments"),
            LoadPolicy {
                is_extract: false,
                ..LoadPolicy::default()
            },
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_extract_with_file_loads_everything() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store_path(&dir);
        let store = open(
            path,
            LoadPolicy {
                is_extract: false,
                ..LoadPolicy::default()
            },
        );
        assert_eq!(store.len(), 2);
        assert!(store.frame_exists("frame_000002.png"));
    }

    #[test]
    fn test_extract_without_skip_flags_forces_full_reextraction() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store_path(&dir);
        let store = open(
            path,
            LoadPolicy {
                is_extract: true,
                skip_existing: false,
                skip_faces: false,
            },
        );
        assert!(store.is_empty());
    }

    #[rstest]
    #[case::skip_existing(true, false)]
    #[case::skip_faces(false, true)]
    #[case::both(true, true)]
    fn test_extract_skip_flags_without_file_is_empty(
        #[case] skip_existing: bool,
        #[case] skip_faces: bool,
    ) {
        let dir = TempDir::new().unwrap();
        let store = open(
            dir.path().join("alignments"),
            LoadPolicy {
                is_extract: true,
                skip_existing,
                skip_faces,
            },
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_extract_skip_existing_keeps_faceless_records() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store_path(&dir);
        let store = open(
            path,
            LoadPolicy {
                is_extract: true,
                skip_existing: true,
                skip_faces: false,
            },
        );
        assert_eq!(store.len(), 2);
        assert!(store.frame_exists("frame_000002.png"));
        assert!(!store.frame_has_faces("frame_000002.png"));
    }

    #[rstest]
    #[case::skip_faces_only(false, true)]
    #[case::both_flags(true, true)]
    fn test_extract_skip_faces_drops_faceless_records(
        #[case] skip_existing: bool,
        #[case] skip_faces: bool,
    ) {
        let dir = TempDir::new().unwrap();
        let path = seeded_store_path(&dir);
        let store = open(
            path,
            LoadPolicy {
                is_extract: true,
                skip_existing,
                skip_faces,
            },
        );
        assert_eq!(store.len(), 1);
        assert!(store.frame_exists("frame_000001.png"));
        assert_eq!(store.get("frame_000001.png").unwrap(), &one_face_record());
        assert!(!store.frame_exists("frame_000002.png"));
    }

    #[test]
    fn test_resumed_run_with_no_new_frames_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = seeded_store_path(&dir);
        let original = JsonAlignmentsIo.load(&path).unwrap();

        // Every frame already has a record, so a resumed run updates nothing.
        let store = open(
            path.clone(),
            LoadPolicy {
                is_extract: true,
                skip_existing: true,
                skip_faces: false,
            },
        );
        store.save().unwrap();

        assert_eq!(JsonAlignmentsIo.load(&path).unwrap(), original);
    }

    #[test]
    fn test_update_overwrites_same_filename() {
        let dir = TempDir::new().unwrap();
        let mut store = open(dir.path().join("alignments"), LoadPolicy::default());
        store.update("a.png", one_face_record());
        store.update("a.png", AlignmentRecord::default());
        assert_eq!(store.len(), 1);
        assert!(!store.frame_has_faces("a.png"));
    }

    #[test]
    fn test_summary_counters() {
        let dir = TempDir::new().unwrap();
        let mut store = open(dir.path().join("alignments"), LoadPolicy::default());
        let two_faces = AlignmentRecord {
            faces: vec![
                one_face_record().faces[0].clone(),
                one_face_record().faces[0].clone(),
            ],
        };
        store.update("a.png", one_face_record());
        store.update("b.png", two_faces);
        assert_eq!(store.face_count(), 3);
        assert_eq!(store.multi_face_frames(), vec!["b.png"]);
    }
}

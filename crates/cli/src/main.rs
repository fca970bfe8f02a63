use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;

use faceharvest_core::config::{ExtractConfig, DEFAULT_REF_THRESHOLD};
use faceharvest_core::detection::domain::aligned_face::AlignedFace;
use faceharvest_core::detection::domain::recognizer::PluginFactory;
use faceharvest_core::detection::infrastructure::plugins::{
    AlignerKind, DetectorKind, OnnxPluginFactory,
};
use faceharvest_core::pipeline::{ExtractUseCase, FaceSink};

/// Face extraction from videos and image folders.
#[derive(Parser)]
#[command(name = "faceharvest")]
struct Cli {
    /// Input video file or image folder.
    input_dir: PathBuf,

    /// Directory to write extracted face images to.
    output_dir: PathBuf,

    /// Explicit alignments file location (extension added automatically).
    #[arg(long)]
    alignments: Option<PathBuf>,

    /// Do not redo frames that already have an alignments record.
    #[arg(long)]
    skip_existing: bool,

    /// Additionally redo frames previously recorded with zero faces.
    #[arg(long)]
    skip_faces: bool,

    /// Reference images of identities to keep (comma-separated).
    #[arg(long, value_delimiter = ',')]
    filter: Vec<PathBuf>,

    /// Reference images of identities to reject (comma-separated).
    #[arg(long, value_delimiter = ',')]
    nfilter: Vec<PathBuf>,

    /// Maximum embedding distance for a positive identity match.
    #[arg(long, default_value_t = DEFAULT_REF_THRESHOLD)]
    ref_threshold: f32,

    /// Face detector plugin.
    #[arg(long, default_value = "onnx")]
    detector: String,

    /// Face aligner plugin.
    #[arg(long, default_value = "similarity")]
    aligner: String,

    /// Compute filter reference embeddings on the main thread.
    #[arg(long)]
    singleprocess: bool,

    /// Draw diagnostic landmarks and pose onto the extracted faces.
    #[arg(long)]
    debug_landmarks: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let detector = DetectorKind::from_str(&cli.detector)?;
    let aligner = AlignerKind::from_str(&cli.aligner)?;

    let config = ExtractConfig {
        input_dir: cli.input_dir,
        output_dir: cli.output_dir.clone(),
        alignments_path: cli.alignments,
        skip_existing: cli.skip_existing,
        skip_faces: cli.skip_faces,
        filter: cli.filter,
        nfilter: cli.nfilter,
        ref_threshold: cli.ref_threshold,
        detector,
        aligner,
        singleprocess: cli.singleprocess,
        debug_landmarks: cli.debug_landmarks,
    };

    let factory: Arc<dyn PluginFactory> = Arc::new(OnnxPluginFactory::resolve(detector, aligner)?);
    let sink = Box::new(PngFaceSink::new(cli.output_dir)?);

    let mut use_case = ExtractUseCase::new(config, factory, sink)?;
    use_case.run()?;
    log::info!("Process successfully completed. Shutting down...");
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input_dir.exists() {
        return Err(format!("Input not found: {}", cli.input_dir.display()).into());
    }
    if !(0.0..=2.0).contains(&cli.ref_threshold) {
        return Err(format!(
            "Reference threshold must be between 0.0 and 2.0, got {}",
            cli.ref_threshold
        )
        .into());
    }
    Ok(())
}

/// Writes surviving faces as PNGs named `<frame-stem>_<face-index>.png`.
struct PngFaceSink {
    output_dir: PathBuf,
}

impl PngFaceSink {
    fn new(output_dir: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }
}

impl FaceSink for PngFaceSink {
    fn write(
        &mut self,
        frame_filename: &str,
        face_index: usize,
        face: &AlignedFace,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let stem = Path::new(frame_filename)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| frame_filename.to_string());
        let path = self.output_dir.join(format!("{stem}_{face_index}.png"));

        let size = face.size() as u32;
        let mut image = image::RgbImage::new(size, size);
        for (pixel, bgr) in image.pixels_mut().zip(face.pixels().chunks_exact(3)) {
            *pixel = image::Rgb([bgr[2], bgr[1], bgr[0]]);
        }
        image.save(&path)?;
        Ok(())
    }
}

pub const DETECT_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const DETECT_MODEL_URL: &str =
    "https://github.com/faceharvest/models/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/faceharvest/models/releases/download/v0.1.0/w600k_r50.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const VIDEO_EXTENSIONS: &[&str] = &[
    "avi", "flv", "m4v", "mkv", "mov", "mp4", "mpeg", "mpg", "ts", "vob", "webm", "wmv",
];

/// Pixel size of the aligned face output produced for each detection.
pub const ALIGNED_FACE_SIZE: usize = 512;

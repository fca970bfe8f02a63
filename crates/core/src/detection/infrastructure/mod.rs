pub mod model_resolver;
pub mod onnx_detector;
pub mod onnx_recognizer;
pub mod plugins;
pub mod similarity_aligner;

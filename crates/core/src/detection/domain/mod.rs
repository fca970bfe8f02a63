pub mod aligned_face;
pub mod aligner;
pub mod detector;
pub mod face;
pub mod landmarks;
pub mod recognizer;

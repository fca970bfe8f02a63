mod error;
mod frame_source;
mod image_io;
mod video_stream;

pub use error::MediaError;
pub use frame_source::FrameSource;
pub use image_io::read_image;
pub use video_stream::VideoStream;

/// Frame source adapters for glyphplay (still image, ffmpeg video).

pub mod image;
pub mod video;

pub use image::ImageSource;
pub use video::VideoSource;

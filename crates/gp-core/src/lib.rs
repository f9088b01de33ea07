/// Configuration, types, and shared structures for glyphplay.
///
/// This crate contains all shared types, traits, and configuration logic
/// used across the glyphplay workspace.

pub mod config;
pub mod error;
pub mod frame;
pub mod palette;
pub mod traits;

pub use config::{ConvertConfig, Luma};
pub use error::PlayerError;
pub use frame::{FrameBuffer, GlyphGrid};
pub use palette::Palette;
pub use traits::{FrameSource, SourceKind};

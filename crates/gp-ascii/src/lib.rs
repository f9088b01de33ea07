/// Glyph conversion engine for glyphplay.
///
/// Converts pixel frames to text-glyph grids: block-average luminance
/// sampling, then LUT-based brightness→glyph mapping.
pub mod convert;
pub mod mapper;
pub mod sampler;

pub use convert::Converter;
pub use mapper::GlyphLut;
pub use sampler::LumaGrid;

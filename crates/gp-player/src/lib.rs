/// Playback scheduler and lifecycle manager for glyphplay.
///
/// Owns the session (source + frame buffer + output grid), drives the
/// capture→sample→map cycle in step with the source's native timing, and
/// guarantees deterministic teardown.
pub mod player;
pub mod ticker;

pub use player::{FrameCallback, GlyphPlayer, PlayerState};
pub use ticker::{CancelToken, run_push_loop};

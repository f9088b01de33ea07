use thiserror::Error;

/// Errors surfaced by the player and its source adapters.
///
/// Every error is local to one session: a failed load never replaces a
/// working session's resources.
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Decode or metadata failure while loading a media source.
    /// Not retried automatically — surfaced to the caller for reporting.
    #[error("Chargement média impossible : {reason}")]
    MediaLoad {
        /// Human-readable cause from the underlying decoder.
        reason: String,
    },

    /// An operation requiring an active source ran before one was set.
    /// Programming error — fail fast, not recoverable by retry.
    #[error("Aucune source active. Appelez set_video() ou set_image() d'abord.")]
    NoSource,

    /// The source decoded but its type mismatches the operation
    /// (e.g. play() on an image session).
    #[error("Opération non supportée pour cette source : {operation}")]
    UnsupportedMedia {
        /// The operation that was refused.
        operation: &'static str,
    },

    /// Invalid palette, step, or threshold value.
    #[error("Configuration invalide : {0}")]
    InvalidConfig(String),
}

impl PlayerError {
    /// Wrap a decoder failure into a `MediaLoad` error.
    ///
    /// # Example
    /// ```
    /// use gp_core::error::PlayerError;
    /// let e = PlayerError::media_load("metadata never arrived");
    /// assert!(matches!(e, PlayerError::MediaLoad { .. }));
    /// ```
    #[must_use]
    pub fn media_load(cause: impl std::fmt::Display) -> Self {
        Self::MediaLoad {
            reason: cause.to_string(),
        }
    }
}

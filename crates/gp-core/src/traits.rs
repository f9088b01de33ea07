use crate::frame::FrameBuffer;

/// Nature d'une source de frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// Flux vidéo avec horloge de lecture native.
    Video,
    /// Image fixe — conversion one-shot.
    Image,
}

/// Fournit des frames visuelles au pipeline de conversion.
///
/// Implémenté par : `ImageSource`, `VideoSource`.
///
/// Le player ne connaît les sources qu'à travers ce trait — une seule
/// implémentation du pipeline sert tous les front ends.
///
/// # Example
/// ```
/// use gp_core::traits::{FrameSource, SourceKind};
/// use gp_core::frame::FrameBuffer;
///
/// struct DummySource;
/// impl FrameSource for DummySource {
///     fn kind(&self) -> SourceKind { SourceKind::Image }
///     fn native_size(&self) -> (u32, u32) { (1, 1) }
///     fn draw_into(&mut self, _target: &mut FrameBuffer) {}
///     fn start(&mut self) {}
///     fn pause(&mut self) {}
///     fn rewind(&mut self) {}
///     fn is_playing(&self) -> bool { false }
/// }
/// ```
pub trait FrameSource: Send + 'static {
    /// Vidéo ou image.
    fn kind(&self) -> SourceKind;

    /// Dimensions natives en pixels, connues dès le chargement.
    fn native_size(&self) -> (u32, u32);

    /// Dessine l'état visuel courant dans `target` (frame décodée courante
    /// pour une vidéo, l'image elle-même pour une image fixe).
    ///
    /// Ne bloque JAMAIS — si aucune nouvelle frame n'est disponible,
    /// `target` garde son contenu précédent.
    fn draw_into(&mut self, target: &mut FrameBuffer);

    /// Images par seconde natives. 0.0 pour une source fixe.
    fn fps(&self) -> f64 {
        0.0
    }

    /// Démarre la lecture native. No-op pour une image.
    fn start(&mut self);

    /// Suspend la lecture native. Idempotent.
    fn pause(&mut self);

    /// Rembobine à la position d'origine. Idempotent.
    fn rewind(&mut self);

    /// `true` tant que la source joue. Passe à `false` de lui-même en fin
    /// de média — le scheduler sonde cette valeur à chaque cycle.
    fn is_playing(&self) -> bool;
}

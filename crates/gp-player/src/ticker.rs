use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::player::GlyphPlayer;

/// Jeton d'annulation coopératif pour la boucle push.
///
/// Clonable et partageable entre threads (handler ctrl-c, UI…). Annuler ne
/// peut pas interrompre un cycle déjà en cours — seulement empêcher la
/// planification du suivant.
///
/// # Example
/// ```
/// use gp_player::ticker::CancelToken;
/// let token = CancelToken::new();
/// assert!(!token.is_cancelled());
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Crée un jeton non annulé.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Annule : la boucle push s'arrête avant son prochain cycle.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// `true` si `cancel()` a été appelé.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Boucle push : la tâche périodique annulable qui cadence `tick()` au fps
/// natif de la source, sur le thread de l'appelant (l'hôte).
///
/// Un seul fil de contrôle logique : chaque passe est synchrone, la main
/// est rendue entre deux passes par le sommeil de cadencement. La boucle
/// se termine d'elle-même quand `tick()` refuse de replanifier (fin de
/// média, pause, stop) ou quand le jeton est annulé.
pub fn run_push_loop(player: &mut GlyphPlayer, token: &CancelToken) {
    let fps = player.fps().unwrap_or(30.0).clamp(1.0, 120.0);
    let period = Duration::from_secs_f64(1.0 / fps);
    log::debug!("run_push_loop: cadence {fps:.3} fps");

    loop {
        if token.is_cancelled() {
            player.pause();
            break;
        }
        let start = Instant::now();
        if !player.tick() {
            break;
        }
        if let Some(remaining) = period.checked_sub(start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_token_stops_the_loop_immediately() {
        let mut player = GlyphPlayer::new(gp_core::config::ConvertConfig::default()).unwrap();
        let token = CancelToken::new();
        token.cancel();
        // Aucune session, aucune lecture : retour immédiat, pas de panic.
        run_push_loop(&mut player, &token);
    }

    #[test]
    fn token_clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        b.cancel();
        assert!(a.is_cancelled());
    }
}

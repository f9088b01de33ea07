use gp_ascii::convert::Converter;
use gp_core::config::ConvertConfig;
use gp_core::error::PlayerError;
use gp_core::frame::{FrameBuffer, GlyphGrid};
use gp_core::traits::{FrameSource, SourceKind};

/// État du cycle de vie de lecture.
///
/// `Idle → Loaded → Playing ⇄ Paused`; `stop()` ramène à `Loaded`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerState {
    /// Aucune session active.
    Idle,
    /// Source chargée, lecture non démarrée (ou arrêtée).
    Loaded,
    /// Cycle push actif.
    Playing,
    /// Lecture suspendue (explicitement ou en fin de média).
    Paused,
}

/// Callback recevant la grille fraîche à chaque cycle push.
pub type FrameCallback = Box<dyn FnMut(&GlyphGrid) + Send>;

/// Une session lie exactement une source à un frame buffer, une grille de
/// sortie et l'état de lecture. Jamais partagée entre deux sources.
struct Session {
    source: Box<dyn FrameSource>,
    frame: FrameBuffer,
    grid: GlyphGrid,
}

impl Session {
    fn new(source: Box<dyn FrameSource>) -> Self {
        let (w, h) = source.native_size();
        Self {
            source,
            frame: FrameBuffer::new(w, h),
            grid: GlyphGrid::new(0, 0),
        }
    }
}

/// Le player : convertit la source active en grilles de glyphes, cadencé
/// par l'hôte, et garantit un teardown déterministe.
///
/// Une seule session active à la fois — `set_video`/`set_image` remplacent
/// implicitement la précédente. Toute interaction passe par les opérations
/// documentées; le pipeline interne n'est jamais muté de l'extérieur.
///
/// # Example
/// ```
/// use gp_player::player::{GlyphPlayer, PlayerState};
/// use gp_core::config::ConvertConfig;
///
/// let player = GlyphPlayer::new(ConvertConfig::default()).unwrap();
/// assert_eq!(player.state(), PlayerState::Idle);
/// ```
pub struct GlyphPlayer {
    config: ConvertConfig,
    converter: Converter,
    session: Option<Session>,
    state: PlayerState,
    callback: Option<FrameCallback>,
}

impl GlyphPlayer {
    /// Crée un player sans session active.
    ///
    /// # Errors
    /// Retourne `InvalidConfig` si la configuration est invalide.
    pub fn new(config: ConvertConfig) -> Result<Self, PlayerError> {
        let converter = Converter::new(&config)?;
        Ok(Self {
            config,
            converter,
            session: None,
            state: PlayerState::Idle,
            callback: None,
        })
    }

    /// État courant du cycle de vie.
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Configuration de conversion courante.
    #[must_use]
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Remplace la configuration. Prend effet au prochain cycle — aucune
    /// grille passée n'est recalculée, aucun stall du pipeline.
    ///
    /// # Errors
    /// Retourne `InvalidConfig` si la nouvelle configuration est invalide;
    /// l'ancienne reste alors en place.
    pub fn set_config(&mut self, config: ConvertConfig) -> Result<(), PlayerError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Fps natif de la source active, si une session existe.
    #[must_use]
    pub fn fps(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.source.fps())
    }

    /// Attache une source vidéo déjà chargée. La session précédente est
    /// libérée au moment de l'attache — jamais avant que la nouvelle source
    /// soit confirmée chargeable (le chargement a eu lieu chez l'appelant).
    ///
    /// # Errors
    /// Retourne `UnsupportedMedia` si la source n'est pas une vidéo.
    pub fn set_video(&mut self, source: Box<dyn FrameSource>) -> Result<(), PlayerError> {
        if source.kind() != SourceKind::Video {
            return Err(PlayerError::UnsupportedMedia {
                operation: "set_video",
            });
        }
        self.replace_session(Session::new(source));
        self.state = PlayerState::Loaded;
        Ok(())
    }

    /// Attache une source image et effectue immédiatement une conversion
    /// one-shot : la grille est disponible via `frame()` sans `play()`.
    ///
    /// # Errors
    /// Retourne `UnsupportedMedia` si la source n'est pas une image.
    pub fn set_image(&mut self, source: Box<dyn FrameSource>) -> Result<(), PlayerError> {
        if source.kind() != SourceKind::Image {
            return Err(PlayerError::UnsupportedMedia {
                operation: "set_image",
            });
        }
        self.replace_session(Session::new(source));
        self.state = PlayerState::Loaded;
        self.run_cycle()?;
        Ok(())
    }

    /// Démarre la lecture native et le cycle push. Valide depuis `Loaded`
    /// ou `Paused`; no-op si déjà `Playing`.
    ///
    /// L'hôte doit ensuite cadencer `tick()` (voir
    /// [`run_push_loop`](crate::ticker::run_push_loop)).
    ///
    /// # Errors
    /// `NoSource` sans session active, `UnsupportedMedia` sur une session
    /// image.
    pub fn play(&mut self, on_frame: Option<FrameCallback>) -> Result<(), PlayerError> {
        let Some(session) = self.session.as_mut() else {
            return Err(PlayerError::NoSource);
        };
        if session.source.kind() != SourceKind::Video {
            return Err(PlayerError::UnsupportedMedia { operation: "play" });
        }
        if on_frame.is_some() {
            self.callback = on_frame;
        }
        if self.state == PlayerState::Playing {
            return Ok(());
        }
        session.source.start();
        self.state = PlayerState::Playing;
        log::debug!("play: lecture démarrée");
        Ok(())
    }

    /// Suspend la lecture native et annule le cycle planifié. Idempotent.
    pub fn pause(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.source.pause();
        }
        if self.state == PlayerState::Playing {
            self.state = PlayerState::Paused;
        }
    }

    /// Met en pause, rembobine à l'origine et annule le cycle planifié.
    /// Idempotent quel que soit l'état courant.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.source.pause();
            session.source.rewind();
            self.state = PlayerState::Loaded;
        }
    }

    /// Exécute un cycle planifié : capture→échantillonnage→mapping puis
    /// livraison synchrone au callback. Retourne `true` si le cycle suivant
    /// doit être planifié.
    ///
    /// Sonde d'abord la source : dès qu'elle signale la fin de lecture, le
    /// cycle est abandonné avant de commencer et la boucle s'auto-termine
    /// (transition vers `Paused`) — aucun `pause()` explicite requis.
    pub fn tick(&mut self) -> bool {
        if self.state != PlayerState::Playing {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.source.is_playing() {
            log::debug!("tick: la source ne joue plus, auto-terminaison");
            self.state = PlayerState::Paused;
            return false;
        }

        session.source.draw_into(&mut session.frame);
        if let Err(e) = self
            .converter
            .convert(&session.frame, &self.config, &mut session.grid)
        {
            // set_config valide en amont; un échec ici est un bug.
            log::error!("tick: conversion impossible: {e}");
            self.state = PlayerState::Paused;
            return false;
        }
        if let Some(cb) = self.callback.as_mut() {
            cb(&session.grid);
        }
        true
    }

    /// Mode pull : retourne la grille courante, disponible dans tout état
    /// dès qu'une source est chargée.
    ///
    /// Vidéo : force un cycle frais à la demande, découplé de la boucle
    /// push. Image : retourne la grille calculée au chargement, sans
    /// recalcul.
    ///
    /// # Errors
    /// `NoSource` si aucune session n'est active.
    pub fn frame(&mut self) -> Result<&GlyphGrid, PlayerError> {
        let Some(session) = self.session.as_ref() else {
            return Err(PlayerError::NoSource);
        };
        if session.source.kind() == SourceKind::Video {
            self.run_cycle()?;
        }
        // La session vient d'être vérifiée; le ok_or est structurel.
        self.session
            .as_ref()
            .map(|s| &s.grid)
            .ok_or(PlayerError::NoSource)
    }

    /// Teardown unique et déterministe : pause/rembobine la source active,
    /// détache le callback, libère frame buffer et grille. Sûr à appeler
    /// plusieurs fois et sur une instance jamais utilisée.
    pub fn destroy(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.source.pause();
            session.source.rewind();
            log::debug!("destroy: session libérée");
        }
        self.callback = None;
        self.state = PlayerState::Idle;
    }

    /// Libère la session précédente avant d'attacher la nouvelle : deux
    /// sources ne possèdent jamais le frame buffer simultanément.
    fn replace_session(&mut self, next: Session) {
        if let Some(mut prev) = self.session.take() {
            prev.source.pause();
            prev.source.rewind();
            log::debug!("replace_session: session précédente libérée");
        }
        self.session = Some(next);
    }

    /// Une passe capture→conversion sur la session courante.
    fn run_cycle(&mut self) -> Result<(), PlayerError> {
        let Some(session) = self.session.as_mut() else {
            return Err(PlayerError::NoSource);
        };
        session.source.draw_into(&mut session.frame);
        self.converter
            .convert(&session.frame, &self.config, &mut session.grid)
    }
}

impl Drop for GlyphPlayer {
    fn drop(&mut self) {
        self.destroy();
    }
}

// Décodage vidéo via ffmpeg en subprocess (std::process::Command) :
//   - `probe_video`      : interroge ffprobe pour width/height/fps
//   - `spawn_ffmpeg_pipe`: lance ffmpeg → flux raw RGBA sur stdout
//   - `decode_loop`      : thread dédié, lit les frames, publie la dernière
//   - la façade `VideoSource` ne fait que poser des flags et envoyer des
//     commandes — elle ne bloque jamais sur le worker.
// Prérequis runtime : `ffmpeg` et `ffprobe` accessibles dans PATH.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use flume::{Receiver, Sender};
use gp_core::error::PlayerError;
use gp_core::frame::FrameBuffer;
use gp_core::traits::{FrameSource, SourceKind};

/// Taille du pool de frames pré-allouées.
/// Doit couvrir la frame publiée + une en lecture + une en écriture.
const POOL_SIZE: usize = 4;

/// Commandes envoyées au thread de décodage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VideoCommand {
    /// Reprendre le décodage (respawn ffmpeg à 0 si nécessaire).
    Play,
    /// Suspendre le décodage.
    Pause,
    /// Revenir à la position d'origine.
    Rewind,
    /// Arrêter le thread proprement.
    Quit,
}

/// Métadonnées extraites via ffprobe.
#[derive(Clone, Copy, Debug)]
pub struct VideoInfo {
    /// Largeur native en pixels.
    pub width: u32,
    /// Hauteur native en pixels.
    pub height: u32,
    /// Images par seconde (ex: 23.976, 24.0, 30.0, 60.0).
    pub fps: f64,
}

/// État partagé façade ↔ worker. Tout est atomique ou publié en bloc.
struct Shared {
    /// Dernière frame décodée, remplacée en entier à chaque publication.
    latest: ArcSwapOption<FrameBuffer>,
    /// `true` tant que la lecture native est en cours.
    playing: AtomicBool,
    /// `true` une fois la fin du média atteinte (reset par Rewind).
    ended: AtomicBool,
}

/// Source vidéo décodée par ffmpeg, cadencée à son fps natif.
///
/// Le thread worker publie ses frames entières via `ArcSwapOption` ;
/// `draw_into` copie la dernière frame publiée sans jamais bloquer.
/// En fin de média, `is_playing()` passe à `false` de lui-même.
///
/// # Example
/// ```no_run
/// use gp_source::video::VideoSource;
/// use std::path::Path;
/// let source = VideoSource::open(Path::new("clip.mp4")).unwrap();
/// ```
pub struct VideoSource {
    info: VideoInfo,
    shared: Arc<Shared>,
    cmd_tx: Sender<VideoCommand>,
    handle: Option<thread::JoinHandle<()>>,
    /// Fichier temporaire maintenu en vie pour les sources en mémoire.
    _blob: Option<tempfile::NamedTempFile>,
}

impl VideoSource {
    /// Ouvre une vidéo depuis le disque. Sonde les métadonnées et démarre
    /// le thread de décodage en pause — la lecture ne commence qu'à
    /// `start()`.
    ///
    /// # Errors
    /// Retourne `MediaLoad` si ffprobe échoue ou si le fichier ne contient
    /// aucun flux vidéo décodable.
    pub fn open(path: &Path) -> Result<Self, PlayerError> {
        Self::open_inner(path.to_path_buf(), None)
    }

    /// Ouvre une vidéo depuis un blob mémoire encodé. Le blob est écrit
    /// dans un fichier temporaire possédé par la source — aucun accès
    /// réseau.
    ///
    /// # Errors
    /// Retourne `MediaLoad` si l'écriture temporaire ou le décodage échoue.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlayerError> {
        let mut blob = tempfile::NamedTempFile::new()
            .map_err(|e| PlayerError::media_load(format!("fichier temporaire : {e}")))?;
        blob.write_all(bytes)
            .map_err(|e| PlayerError::media_load(format!("écriture blob vidéo : {e}")))?;
        Self::open_inner(blob.path().to_path_buf(), Some(blob))
    }

    fn open_inner(
        path: PathBuf,
        blob: Option<tempfile::NamedTempFile>,
    ) -> Result<Self, PlayerError> {
        let info = probe_video(&path)?;
        let shared = Arc::new(Shared {
            latest: ArcSwapOption::empty(),
            playing: AtomicBool::new(false),
            ended: AtomicBool::new(false),
        });
        let (cmd_tx, cmd_rx) = flume::bounded(10);

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("gp-video".to_string())
            .spawn(move || decode_loop(&path, info, &worker_shared, &cmd_rx))
            .map_err(|e| PlayerError::media_load(format!("thread vidéo : {e}")))?;

        Ok(Self {
            info,
            shared,
            cmd_tx,
            handle: Some(handle),
            _blob: blob,
        })
    }
}

impl FrameSource for VideoSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Video
    }

    fn native_size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn draw_into(&mut self, target: &mut FrameBuffer) {
        if let Some(frame) = self.shared.latest.load_full() {
            target.resize(frame.width, frame.height);
            target.data.copy_from_slice(&frame.data);
        }
        // Pas de frame décodée : target garde son contenu précédent.
    }

    fn fps(&self) -> f64 {
        self.info.fps
    }

    fn start(&mut self) {
        // Après une fin naturelle, relancer rejoue depuis l'origine : le
        // worker a tué son pipe, le prochain Play respawne ffmpeg à 0.
        self.shared.ended.store(false, Ordering::Relaxed);
        self.shared.playing.store(true, Ordering::Relaxed);
        let _ = self.cmd_tx.send(VideoCommand::Play);
    }

    fn pause(&mut self) {
        self.shared.playing.store(false, Ordering::Relaxed);
        let _ = self.cmd_tx.send(VideoCommand::Pause);
    }

    fn rewind(&mut self) {
        self.shared.playing.store(false, Ordering::Relaxed);
        let _ = self.cmd_tx.send(VideoCommand::Rewind);
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Relaxed)
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(VideoCommand::Quit);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Interroge `ffprobe` pour obtenir les métadonnées du flux vidéo principal.
///
/// # Errors
/// Retourne `MediaLoad` si `ffprobe` est introuvable ou si le fichier ne
/// contient aucun flux vidéo décodable.
pub fn probe_video(path: &Path) -> Result<VideoInfo, PlayerError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| PlayerError::media_load("chemin vidéo invalide (non-UTF8)"))?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .map_err(|e| {
            PlayerError::media_load(format!(
                "impossible de lancer ffprobe (installé et dans le PATH ?) : {e}"
            ))
        })?;

    let text = String::from_utf8_lossy(&output.stdout);

    let mut width: u32 = 0;
    let mut height: u32 = 0;
    let mut fps: f64 = 30.0;

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format: "24/1" ou "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 {
                fps = num / den;
            }
        }
    }

    if width == 0 || height == 0 {
        return Err(PlayerError::media_load(format!(
            "aucun flux vidéo décodable dans {}",
            path.display()
        )));
    }

    log::info!(
        "probe_video: {width}x{height} @ {fps:.3}fps — {}",
        path.display()
    );

    Ok(VideoInfo { width, height, fps })
}

/// Lance un processus `ffmpeg` qui écrit des frames RGBA brutes sur stdout.
///
/// Chaque frame = `w × h × 4` bytes (RGBA row-major, sans padding).
/// `-an` supprime l'audio. Retourne `None` si le spawn échoue.
#[must_use]
fn spawn_ffmpeg_pipe(path: &Path, info: VideoInfo) -> Option<Child> {
    let Some(path_str) = path.to_str() else {
        log::warn!("spawn_ffmpeg_pipe: chemin non-UTF8");
        return None;
    };

    let scale_filter = format!("scale={}:{}:flags=bilinear", info.width, info.height);
    let fps_str = format!("{:.3}", info.fps.clamp(1.0, 120.0));

    match Command::new("ffmpeg")
        .args([
            "-i",
            path_str,
            "-vf",
            &scale_filter,
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-r",
            &fps_str,
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => {
            log::debug!(
                "ffmpeg spawné: {}x{} @ {fps_str}fps",
                info.width,
                info.height
            );
            Some(child)
        }
        Err(e) => {
            log::warn!("spawn_ffmpeg_pipe: impossible de lancer ffmpeg: {e}");
            None
        }
    }
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// `Ok(true)` si lu en entier, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false), // EOF
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Tue le pipe ffmpeg courant et attend la fin du processus.
///
/// Invariant : tout `Child` abandonné passe par ici — un enfant tué mais
/// jamais `wait()` reste zombie jusqu'à la fin du programme, et chaque
/// cycle stop/play en accumulerait un de plus.
fn kill_and_reap(child: &mut Option<Child>) {
    if let Some(mut c) = child.take() {
        let _ = c.kill();
        let _ = c.wait();
    }
}

/// Trouve ou crée un slot libre dans le pool.
///
/// Invariant : retourne un index `i` tel que `Arc::strong_count(&pool[i]) == 1`.
/// Si tous les slots sont pris, alloue un nouveau slot (cas exceptionnel).
fn find_or_create_slot(pool: &mut Vec<Arc<FrameBuffer>>, w: u32, h: u32) -> usize {
    if let Some(i) = pool.iter().position(|a| Arc::strong_count(a) == 1) {
        i
    } else {
        pool.push(Arc::new(FrameBuffer::new(w, h)));
        pool.len() - 1
    }
}

/// Dispatche les commandes en attente. Retourne `true` si le thread doit
/// quitter (Quit reçu ou canal déconnecté).
fn process_commands(
    cmd_rx: &Receiver<VideoCommand>,
    shared: &Shared,
    child: &mut Option<Child>,
    paused: &mut bool,
) -> bool {
    loop {
        match cmd_rx.try_recv() {
            Ok(VideoCommand::Quit) | Err(flume::TryRecvError::Disconnected) => {
                kill_and_reap(child);
                return true;
            }
            Ok(VideoCommand::Pause) => {
                *paused = true;
                log::debug!("Thread vidéo: Pause");
            }
            Ok(VideoCommand::Play) => {
                *paused = false;
                log::debug!("Thread vidéo: Play");
            }
            Ok(VideoCommand::Rewind) => {
                // Tue le pipe courant; le prochain Play respawne à 0.
                kill_and_reap(child);
                *paused = true;
                shared.ended.store(false, Ordering::Relaxed);
                shared.latest.store(None);
                log::debug!("Thread vidéo: Rewind");
            }
            Err(flume::TryRecvError::Empty) => return false,
        }
    }
}

/// Boucle principale du thread de décodage.
fn decode_loop(path: &Path, info: VideoInfo, shared: &Shared, cmd_rx: &Receiver<VideoCommand>) {
    let frame_period = Duration::from_secs_f64(1.0 / info.fps.clamp(1.0, 120.0));
    let frame_bytes = info.width as usize * info.height as usize * 4;
    let mut pool: Vec<Arc<FrameBuffer>> = (0..POOL_SIZE)
        .map(|_| Arc::new(FrameBuffer::new(info.width, info.height)))
        .collect();
    let mut child: Option<Child> = None;
    let mut paused = true;
    let mut last_frame = Instant::now();

    loop {
        // === Commandes (non-bloquant) ===
        if process_commands(cmd_rx, shared, &mut child, &mut paused) {
            break;
        }

        // === Pause / fin de média ===
        if paused || shared.ended.load(Ordering::Relaxed) {
            thread::sleep(Duration::from_millis(10));
            continue;
        }

        // Lecture demandée mais pas de pipe : (re)spawn depuis l'origine.
        if child.is_none() {
            child = spawn_ffmpeg_pipe(path, info);
            if child.is_none() {
                shared.playing.store(false, Ordering::Relaxed);
                shared.ended.store(true, Ordering::Relaxed);
                continue;
            }
        }

        // === Cadencement au fps natif ===
        let elapsed = last_frame.elapsed();
        if let Some(remaining) = frame_period.checked_sub(elapsed) {
            thread::sleep(remaining);
            continue;
        }
        last_frame = Instant::now();

        // === Slot libre dans le pool (zero-alloc si possible) ===
        let idx = find_or_create_slot(&mut pool, info.width, info.height);
        let Some(fb) = Arc::get_mut(&mut pool[idx]) else {
            continue; // Sécurité (ne devrait pas arriver)
        };

        // === Lire une frame depuis le pipe ffmpeg ===
        let read_result = child
            .as_mut()
            .and_then(|c| c.stdout.as_mut())
            .map_or(Ok(false), |stdout| {
                read_exact_or_eof(stdout, &mut fb.data[..frame_bytes])
            });

        match read_result {
            Ok(true) => {
                // Publication en bloc : le lecteur voit l'ancienne frame ou
                // la nouvelle, jamais un état partiel.
                shared.latest.store(Some(Arc::clone(&pool[idx])));
            }
            Ok(false) => {
                // EOF : fin naturelle du média, la dernière frame reste
                // publiée et is_playing() retombe à false de lui-même.
                log::info!("Thread vidéo: EOF, arrêt du décodage.");
                shared.playing.store(false, Ordering::Relaxed);
                shared.ended.store(true, Ordering::Relaxed);
                kill_and_reap(&mut child);
            }
            Err(e) => {
                log::warn!("Thread vidéo: erreur lecture pipe: {e}");
                shared.playing.store(false, Ordering::Relaxed);
                kill_and_reap(&mut child);
            }
        }
    }

    // Cleanup final
    kill_and_reap(&mut child);
    log::info!("Thread vidéo terminé proprement.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_fraction_parsing() {
        // Le parsing r_frame_rate est exercé indirectement via probe_video;
        // ici on vérifie la formule sur les formats usuels.
        for (raw, expected) in [("24/1", 24.0), ("30000/1001", 29.97)] {
            let mut parts = raw.splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap();
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap();
            assert!((num / den - expected).abs() < 0.01);
        }
    }

    #[test]
    fn pool_slot_reuse_requires_unique_ownership() {
        let mut pool: Vec<Arc<FrameBuffer>> = (0..2).map(|_| Arc::new(FrameBuffer::new(2, 2))).collect();
        let held = Arc::clone(&pool[0]);
        let idx = find_or_create_slot(&mut pool, 2, 2);
        assert_eq!(idx, 1, "le slot retenu ailleurs ne doit pas être réutilisé");
        drop(held);

        let held_all: Vec<_> = pool.iter().map(Arc::clone).collect();
        let idx = find_or_create_slot(&mut pool, 2, 2);
        assert_eq!(idx, 2, "pool saturé : nouveau slot alloué");
        drop(held_all);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn kill_and_reap_leaves_no_zombie() {
        let spawned = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let pid = spawned.id();
        let mut child = Some(spawned);

        kill_and_reap(&mut child);
        assert!(child.is_none());

        // Le processus est récolté, pas seulement tué : soit son entrée
        // /proc a disparu, soit elle n'est plus en état zombie (Z).
        let stat = std::fs::read_to_string(format!("/proc/{pid}/stat"));
        if let Ok(stat) = stat {
            assert!(
                !stat.contains(") Z "),
                "le processus {pid} est resté zombie après kill_and_reap"
            );
        }
    }

    #[test]
    fn read_exact_or_eof_reports_truncation() {
        let data = [1u8, 2, 3];
        let mut buf = [0u8; 4];
        let mut cursor = std::io::Cursor::new(&data[..]);
        assert!(!read_exact_or_eof(&mut cursor, &mut buf).unwrap());

        let mut cursor = std::io::Cursor::new(&data[..]);
        let mut buf = [0u8; 3];
        assert!(read_exact_or_eof(&mut cursor, &mut buf).unwrap());
        assert_eq!(buf, [1, 2, 3]);
    }
}

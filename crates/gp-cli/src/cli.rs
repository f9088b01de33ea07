use std::path::PathBuf;

use clap::Parser;

/// glyphplay — video/image to text-glyph playback.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source : chemin vers une image (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Source : chemin vers une vidéo. Requiert ffmpeg/ffprobe en PATH.
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Fichier de configuration TOML (section [convert]).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Palette, du glyphe le plus sombre au plus clair.
    #[arg(long)]
    pub chars: Option<String>,

    /// Taille de bloc d'échantillonnage (≥ 1).
    #[arg(long)]
    pub step: Option<u32>,

    /// Seuil de saturation [0, 255]. Défaut : dérivé de la palette.
    #[arg(long)]
    pub threshold: Option<u8>,

    /// Inverser la luminance (pour fond clair).
    #[arg(long, default_value_t = false)]
    pub invert: bool,

    /// Luminance pondérée BT.709 au lieu du canal rouge seul.
    #[arg(long, default_value_t = false)]
    pub weighted: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or both sources are specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        match (self.image.is_some(), self.video.is_some()) {
            (false, false) => {
                anyhow::bail!("Aucune source spécifiée. Utilisez --image ou --video.")
            }
            (true, true) => {
                anyhow::bail!("Une seule source à la fois. Spécifiez --image OU --video.")
            }
            _ => Ok(()),
        }
    }
}

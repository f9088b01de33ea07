use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PlayerError;
use crate::palette::{PALETTE_DEFAULT, Palette};

/// Canal échantillonné par le sampler.
///
/// # Example
/// ```
/// use gp_core::config::Luma;
/// assert!(matches!(Luma::default(), Luma::Red));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Luma {
    /// Canal rouge seul — simplification délibérée pour approximation
    /// niveaux-de-gris, comportement historique par défaut.
    #[default]
    Red,
    /// Luminance pondérée BT.709 (opt-in, change la sortie visuelle).
    Weighted,
}

/// Configuration de conversion, sérialisable en TOML.
///
/// Relue à chaque cycle par le pipeline : un changement pendant la lecture
/// prend effet au cycle suivant, sans recalcul des grilles passées.
///
/// # Example
/// ```
/// use gp_core::config::ConvertConfig;
/// let config = ConvertConfig::default();
/// assert_eq!(config.step, 2);
/// assert_eq!(config.chars, "@%#*+=-:. ");
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConvertConfig {
    /// Palette, du glyphe le plus sombre au plus clair.
    pub chars: String,
    /// Taille de bloc : résolution de sortie = ceil(dim / step).
    pub step: u32,
    /// Seuil de saturation [0, 255]. `None` = `floor(255×(L-1)/L)`.
    pub threshold: Option<u8>,
    /// Inverser la luminance (pour fond clair).
    pub invert: bool,
    /// Canal de luminance échantillonné.
    pub luma: Luma,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            chars: PALETTE_DEFAULT.to_string(),
            step: 2,
            threshold: None,
            invert: false,
            luma: Luma::Red,
        }
    }
}

impl ConvertConfig {
    /// Valide la configuration.
    ///
    /// # Errors
    /// Retourne `InvalidConfig` si `step == 0` ou si la palette a moins
    /// de 2 glyphes.
    pub fn validate(&self) -> Result<(), PlayerError> {
        if self.step == 0 {
            return Err(PlayerError::InvalidConfig(
                "step doit être ≥ 1".to_string(),
            ));
        }
        Palette::new(&self.chars).map(|_| ())
    }

    /// Seuil effectif : valeur explicite, sinon défaut dérivé de la palette.
    ///
    /// # Example
    /// ```
    /// use gp_core::config::ConvertConfig;
    /// use gp_core::palette::Palette;
    /// let config = ConvertConfig::default();
    /// let palette = Palette::new(&config.chars).unwrap();
    /// assert_eq!(config.effective_threshold(&palette), 229);
    /// ```
    #[must_use]
    pub fn effective_threshold(&self, palette: &Palette) -> u8 {
        self.threshold.unwrap_or_else(|| palette.default_threshold())
    }
}

/// Structure TOML intermédiaire, tous champs optionnels.
#[derive(Deserialize)]
struct ConfigFile {
    convert: Option<ConvertSection>,
}

/// Section `[convert]` du fichier TOML, fusion partielle sur les défauts.
#[derive(Deserialize)]
struct ConvertSection {
    chars: Option<String>,
    step: Option<u32>,
    threshold: Option<u8>,
    invert: Option<bool>,
    luma: Option<Luma>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use gp_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<ConvertConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut config = ConvertConfig::default();
    if let Some(c) = file.convert {
        if let Some(v) = c.chars {
            config.chars = v;
        }
        if let Some(v) = c.step {
            config.step = v;
        }
        if let Some(v) = c.threshold {
            config.threshold = Some(v);
        }
        if let Some(v) = c.invert {
            config.invert = v;
        }
        if let Some(v) = c.luma {
            config.luma = v;
        }
    }

    config
        .validate()
        .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ConvertConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.invert);
        assert_eq!(config.threshold, None);
    }

    #[test]
    fn zero_step_is_rejected() {
        let config = ConvertConfig {
            step: 0,
            ..ConvertConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn explicit_threshold_wins_over_derived() {
        let palette = Palette::default();
        let mut config = ConvertConfig::default();
        assert_eq!(config.effective_threshold(&palette), 229);
        config.threshold = Some(100);
        assert_eq!(config.effective_threshold(&palette), 100);
    }

    #[test]
    fn partial_toml_merges_over_defaults() {
        let file: ConfigFile = toml::from_str("[convert]\nstep = 4\ninvert = true\n").unwrap();
        let section = file.convert.unwrap();
        assert_eq!(section.step, Some(4));
        assert_eq!(section.invert, Some(true));
        assert_eq!(section.chars, None);
    }
}

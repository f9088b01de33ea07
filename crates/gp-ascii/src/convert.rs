use gp_core::config::ConvertConfig;
use gp_core::error::PlayerError;
use gp_core::frame::{FrameBuffer, GlyphGrid};
use gp_core::palette::Palette;

use crate::mapper::GlyphLut;
use crate::sampler::{LumaGrid, sample_blocks};

/// Orchestre la passe capture→échantillonnage→mapping.
///
/// Possède la LUT et la grille de luminosité intermédiaire, toutes deux
/// réutilisées d'un cycle à l'autre. La LUT n'est reconstruite que si
/// palette, seuil ou inversion ont changé — un changement de configuration
/// en cours de lecture prend effet au cycle suivant.
///
/// # Example
/// ```
/// use gp_core::config::ConvertConfig;
/// use gp_core::frame::{FrameBuffer, GlyphGrid};
/// use gp_ascii::convert::Converter;
///
/// let config = ConvertConfig::default();
/// let mut converter = Converter::new(&config).unwrap();
/// let frame = FrameBuffer::new(8, 8);
/// let mut grid = GlyphGrid::new(0, 0);
/// converter.convert(&frame, &config, &mut grid).unwrap();
/// assert_eq!((grid.width, grid.height), (4, 4));
/// ```
pub struct Converter {
    lut: GlyphLut,
    lut_key: (String, u8, bool),
    luma: LumaGrid,
}

impl Converter {
    /// Construit un convertisseur pour la configuration donnée.
    ///
    /// # Errors
    /// Retourne `InvalidConfig` si la configuration est invalide.
    pub fn new(config: &ConvertConfig) -> Result<Self, PlayerError> {
        config.validate()?;
        let palette = Palette::new(&config.chars)?;
        let threshold = config.effective_threshold(&palette);
        Ok(Self {
            lut: GlyphLut::new(&palette, threshold, config.invert),
            lut_key: (config.chars.clone(), threshold, config.invert),
            luma: LumaGrid::new(0, 0),
        })
    }

    /// Reconstruit la LUT si palette, seuil ou inversion ont changé.
    ///
    /// # Errors
    /// Retourne `InvalidConfig` si la nouvelle palette est invalide.
    pub fn update_if_needed(&mut self, config: &ConvertConfig) -> Result<(), PlayerError> {
        let palette = Palette::new(&config.chars)?;
        let threshold = config.effective_threshold(&palette);
        let key = (config.chars.clone(), threshold, config.invert);
        if key != self.lut_key {
            log::debug!(
                "Reconstruction LUT : {} glyphes, seuil {}, invert {}",
                palette.len(),
                threshold,
                config.invert
            );
            self.lut = GlyphLut::new(&palette, threshold, config.invert);
            self.lut_key = key;
        }
        Ok(())
    }

    /// Exécute une passe complète : échantillonnage par blocs puis mapping
    /// glyphe, résultat écrit dans `out` (redimensionnée si nécessaire).
    ///
    /// Passe synchrone — ne suspend jamais en cours de route.
    ///
    /// # Errors
    /// Retourne `InvalidConfig` si `config` est invalide.
    pub fn convert(
        &mut self,
        frame: &FrameBuffer,
        config: &ConvertConfig,
        out: &mut GlyphGrid,
    ) -> Result<(), PlayerError> {
        config.validate()?;
        self.update_if_needed(config)?;
        sample_blocks(frame, config.step, config.luma, &mut self.luma);
        self.lut.map_grid(&self.luma, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_black_two_by_two_scenario() {
        let config = ConvertConfig {
            chars: "@ ".to_string(),
            step: 1,
            ..ConvertConfig::default()
        };
        let mut converter = Converter::new(&config).unwrap();
        let frame = FrameBuffer::new(2, 2);
        let mut grid = GlyphGrid::new(0, 0);
        converter.convert(&frame, &config, &mut grid).unwrap();
        let rows: Vec<Vec<char>> = grid.rows().map(<[char]>::to_vec).collect();
        assert_eq!(rows, vec![vec!['@', '@'], vec!['@', '@']]);
    }

    #[test]
    fn all_black_two_by_two_inverted_scenario() {
        let config = ConvertConfig {
            chars: "@ ".to_string(),
            step: 1,
            invert: true,
            ..ConvertConfig::default()
        };
        let mut converter = Converter::new(&config).unwrap();
        let frame = FrameBuffer::new(2, 2);
        let mut grid = GlyphGrid::new(0, 0);
        converter.convert(&frame, &config, &mut grid).unwrap();
        let rows: Vec<Vec<char>> = grid.rows().map(<[char]>::to_vec).collect();
        assert_eq!(rows, vec![vec![' ', ' '], vec![' ', ' ']]);
    }

    #[test]
    fn step_change_applies_on_next_cycle() {
        let mut config = ConvertConfig {
            chars: "@ ".to_string(),
            step: 1,
            ..ConvertConfig::default()
        };
        let mut converter = Converter::new(&config).unwrap();
        let frame = FrameBuffer::new(4, 4);
        let mut grid = GlyphGrid::new(0, 0);

        converter.convert(&frame, &config, &mut grid).unwrap();
        assert_eq!((grid.width, grid.height), (4, 4));

        config.step = 2;
        converter.convert(&frame, &config, &mut grid).unwrap();
        assert_eq!((grid.width, grid.height), (2, 2));
    }

    #[test]
    fn invalid_config_is_refused() {
        let config = ConvertConfig {
            chars: "@".to_string(),
            ..ConvertConfig::default()
        };
        assert!(Converter::new(&config).is_err());
    }
}

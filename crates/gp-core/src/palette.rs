use crate::error::PlayerError;

/// 10 caractères — défaut historique, du plus dense au plus clair.
pub const PALETTE_DEFAULT: &str = "@%#*+=-:. ";

/// Blocs Unicode — pseudo-pixels, haut contraste.
pub const PALETTE_BLOCKS: &str = "█▓▒░ ";

/// 70 caractères — Paul Bourke, résolution maximale (dense→clair).
pub const PALETTE_DENSE: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Palette ordonnée de glyphes, index 0 = le plus sombre.
///
/// Les doublons sont permis et n'ont aucune signification particulière.
/// Immutable une fois la session démarrée — changer de palette passe par
/// une nouvelle configuration.
///
/// # Example
/// ```
/// use gp_core::palette::Palette;
/// let p = Palette::new("@ ").unwrap();
/// assert_eq!(p.len(), 2);
/// assert_eq!(p.glyph_for(0), '@');
/// assert_eq!(p.glyph_for(255), ' ');
/// ```
#[derive(Clone, Debug)]
pub struct Palette {
    glyphs: Vec<char>,
}

impl Palette {
    /// Construit une palette depuis une chaîne ordonnée sombre→clair.
    ///
    /// # Errors
    /// Retourne `InvalidConfig` si la chaîne contient moins de 2 glyphes.
    pub fn new(chars: &str) -> Result<Self, PlayerError> {
        let glyphs: Vec<char> = chars.chars().collect();
        if glyphs.len() < 2 {
            return Err(PlayerError::InvalidConfig(format!(
                "palette trop courte ({} glyphe), minimum 2",
                glyphs.len()
            )));
        }
        Ok(Self { glyphs })
    }

    /// Nombre de glyphes dans la palette.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Toujours `false` — la construction impose au moins 2 glyphes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyphe à l'index donné, clampé sur `[0, len-1]`.
    #[inline]
    #[must_use]
    pub fn glyph(&self, idx: usize) -> char {
        self.glyphs[idx.min(self.glyphs.len() - 1)]
    }

    /// Mappe une luminosité brute [0, 255] vers un glyphe :
    /// `idx = floor(v / 255 × (L-1))`, clampé sur `[0, L-1]`.
    ///
    /// # Example
    /// ```
    /// use gp_core::palette::Palette;
    /// let p = Palette::new("0123456789").unwrap();
    /// // floor(128/255 × 9) = 4
    /// assert_eq!(p.glyph_for(128), '4');
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn glyph_for(&self, v: u8) -> char {
        let idx = v as usize * (self.glyphs.len() - 1) / 255;
        self.glyph(idx)
    }

    /// Seuil de saturation par défaut : `floor(255 × (L-1) / L)`.
    ///
    /// # Example
    /// ```
    /// use gp_core::palette::Palette;
    /// let p = Palette::new("0123456789").unwrap();
    /// assert_eq!(p.default_threshold(), 229);
    /// ```
    #[must_use]
    pub fn default_threshold(&self) -> u8 {
        (255 * (self.glyphs.len() - 1) / self.glyphs.len()) as u8
    }
}

impl Default for Palette {
    fn default() -> Self {
        // PALETTE_DEFAULT a 10 glyphes, la construction ne peut pas échouer.
        Self {
            glyphs: PALETTE_DEFAULT.chars().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_palette() {
        assert!(Palette::new("").is_err());
        assert!(Palette::new("@").is_err());
        assert!(Palette::new("@ ").is_ok());
    }

    #[test]
    fn duplicate_glyphs_are_permitted() {
        let p = Palette::new("@@..").unwrap();
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn glyph_for_extremes_and_midpoint() {
        let p = Palette::new("@ ").unwrap();
        assert_eq!(p.glyph_for(0), '@');
        assert_eq!(p.glyph_for(255), ' ');

        let p10 = Palette::new("0123456789").unwrap();
        assert_eq!(p10.glyph_for(128), '4');
    }

    #[test]
    fn glyph_for_is_monotonic() {
        let p = Palette::new(PALETTE_DEFAULT).unwrap();
        let chars: Vec<char> = PALETTE_DEFAULT.chars().collect();
        let mut prev = 0usize;
        for v in 0..=255u8 {
            let idx = chars.iter().position(|&c| c == p.glyph_for(v)).unwrap();
            assert!(idx >= prev, "mapping non monotone à v={v}");
            prev = idx;
        }
    }

    #[test]
    fn default_threshold_formula() {
        let p = Palette::new("@ ").unwrap();
        assert_eq!(p.default_threshold(), 127);
        let p10 = Palette::default();
        assert_eq!(p10.default_threshold(), 229);
    }
}

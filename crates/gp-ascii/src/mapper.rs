use gp_core::frame::GlyphGrid;
use gp_core::palette::Palette;
use rayon::prelude::*;

use crate::sampler::LumaGrid;

/// Lookup table luminosité [0..255] → glyphe.
///
/// Pré-calcule inversion, seuil de saturation et index palette pour un coût
/// O(1) par cellule. Reconstruite uniquement quand palette, seuil ou
/// inversion changent.
///
/// # Example
/// ```
/// use gp_core::palette::Palette;
/// use gp_ascii::mapper::GlyphLut;
/// let palette = Palette::new("@ ").unwrap();
/// let lut = GlyphLut::new(&palette, 255, false);
/// assert_eq!(lut.map(0), '@');
/// assert_eq!(lut.map(255), ' ');
/// ```
pub struct GlyphLut {
    lut: [char; 256],
}

impl GlyphLut {
    /// Construit la table pour une palette, un seuil et un flag d'inversion.
    ///
    /// Ordre d'application, par valeur :
    /// 1. inversion : `v ← 255 - v`
    /// 2. seuil unilatéral : `v > threshold ⇒ v ← 255` (les valeurs sous le
    ///    seuil passent inchangées — écrasement des hautes lumières, pas une
    ///    binarisation)
    /// 3. index : `floor(v / 255 × (L-1))`, clampé
    #[must_use]
    pub fn new(palette: &Palette, threshold: u8, invert: bool) -> Self {
        let mut lut = [' '; 256];
        for (v, slot) in lut.iter_mut().enumerate() {
            let mut val = if invert { 255 - v as u8 } else { v as u8 };
            if val > threshold {
                val = 255;
            }
            *slot = palette.glyph_for(val);
        }
        Self { lut }
    }

    /// Mappe une luminosité brute vers son glyphe.
    ///
    /// # Example
    /// ```
    /// use gp_core::palette::Palette;
    /// use gp_ascii::mapper::GlyphLut;
    /// let palette = Palette::new("0123456789").unwrap();
    /// let lut = GlyphLut::new(&palette, 255, false);
    /// assert_eq!(lut.map(128), '4');
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn map(&self, v: u8) -> char {
        self.lut[v as usize]
    }

    /// Mappe une grille de luminosités entière vers `out`.
    ///
    /// Chaque cellule est indépendante — les rangées sont traitées en
    /// parallèle, la passe reste synchrone.
    pub fn map_grid(&self, luma: &LumaGrid, out: &mut GlyphGrid) {
        out.resize(luma.width, luma.height);
        let w = luma.width.max(1) as usize;
        out.cells
            .par_chunks_mut(w)
            .zip(luma.values.par_chunks(w))
            .for_each(|(row, values)| {
                for (cell, &v) in row.iter_mut().zip(values) {
                    *cell = self.map(v);
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_is_monotonic() {
        let palette = Palette::new("@%#*+=-:. ").unwrap();
        let chars: Vec<char> = "@%#*+=-:. ".chars().collect();
        let lut = GlyphLut::new(&palette, 255, false);
        let mut prev = 0usize;
        for v in 0..=255u8 {
            let idx = chars.iter().position(|&c| c == lut.map(v)).unwrap();
            assert!(idx >= prev, "mapping non monotone à v={v}");
            prev = idx;
        }
    }

    #[test]
    fn threshold_clips_one_sided() {
        let palette = Palette::new("0123456789").unwrap();
        let lut = GlyphLut::new(&palette, 100, false);
        // Au-dessus du seuil : écrasé à pleine luminosité.
        assert_eq!(lut.map(101), '9');
        assert_eq!(lut.map(200), '9');
        // En dessous : inchangé, pas de binarisation.
        assert_eq!(lut.map(100), '3'); // floor(100/255 × 9) = 3
        assert_eq!(lut.map(50), '1'); // floor(50/255 × 9) = 1
    }

    #[test]
    fn invert_applies_before_threshold() {
        let palette = Palette::new("@ ").unwrap();
        let lut = GlyphLut::new(&palette, 100, true);
        // v=0 → inversé 255 → au-dessus du seuil → 255 → ' '
        assert_eq!(lut.map(0), ' ');
        // v=255 → inversé 0 → sous le seuil → '@'
        assert_eq!(lut.map(255), '@');
    }

    #[test]
    fn two_glyph_boundary() {
        let palette = Palette::new("@ ").unwrap();
        let lut = GlyphLut::new(&palette, 255, false);
        assert_eq!(lut.map(0), '@');
        assert_eq!(lut.map(254), '@'); // floor(254/255 × 1) = 0
        assert_eq!(lut.map(255), ' ');
    }

    #[test]
    fn map_grid_fills_all_cells() {
        let palette = Palette::new("@ ").unwrap();
        let lut = GlyphLut::new(&palette, 255, false);
        let luma = LumaGrid::new(3, 2);
        let mut grid = GlyphGrid::new(0, 0);
        lut.map_grid(&luma, &mut grid);
        assert_eq!((grid.width, grid.height), (3, 2));
        assert!(grid.cells.iter().all(|&c| c == '@'));
    }
}

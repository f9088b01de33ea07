/// Buffer de pixels possédé exclusivement par la session courante.
///
/// Stocke les pixels en RGBA row-major, 4 bytes par pixel. Dimensionné aux
/// dimensions natives de la source active, réalloué quand elles changent,
/// jamais partagé entre deux sources.
///
/// # Example
/// ```
/// use gp_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer pré-alloué aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use gp_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!((fb.width, fb.height), (100, 50));
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; (width as usize) * (height as usize) * 4],
            width,
            height,
        }
    }

    /// Réalloue le buffer si les dimensions diffèrent, sinon no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.data = vec![0u8; (width as usize) * (height as usize) * 4];
            self.width = width;
            self.height = height;
        }
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    ///
    /// # Example
    /// ```
    /// use gp_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(10, 10);
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        if idx + 3 >= self.data.len() {
            return (0, 0, 0, 0);
        }
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Luminance perceptuelle BT.709 du pixel (x, y).
    ///
    /// # Example
    /// ```
    /// use gp_core::frame::FrameBuffer;
    /// let mut fb = FrameBuffer::new(1, 1);
    /// fb.data[0] = 255; fb.data[1] = 255; fb.data[2] = 255;
    /// assert_eq!(fb.luminance(0, 0), 255);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luminance(&self, x: u32, y: u32) -> u8 {
        let (r, g, b, _) = self.pixel(x, y);
        ((u32::from(r) * 2126 + u32::from(g) * 7152 + u32::from(b) * 722) / 10000) as u8
    }
}

/// Grille de glyphes — sortie d'un cycle de conversion.
///
/// Row-major, un `char` par cellule. Réutilisée comme buffer de sortie d'un
/// cycle à l'autre; les consommateurs la traitent comme un snapshot valable
/// jusqu'au cycle suivant.
///
/// # Example
/// ```
/// use gp_core::frame::GlyphGrid;
/// let mut grid = GlyphGrid::new(2, 2);
/// grid.set(0, 0, '@');
/// assert_eq!(grid.get(0, 0), '@');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    /// Flat array of glyphs, row-major.
    pub cells: Vec<char>,
    /// Width in glyphs.
    pub width: u32,
    /// Height in glyphs.
    pub height: u32,
}

impl GlyphGrid {
    /// Crée une grille pré-allouée, remplie d'espaces.
    ///
    /// # Example
    /// ```
    /// use gp_core::frame::GlyphGrid;
    /// let grid = GlyphGrid::new(80, 24);
    /// assert_eq!(grid.cells.len(), 80 * 24);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            cells: vec![' '; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Réalloue la grille si les dimensions diffèrent, sinon no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.cells = vec![' '; width as usize * height as usize];
            self.width = width;
            self.height = height;
        }
    }

    /// Set the glyph at position (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u32, y: u32, glyph: char) {
        self.cells[y as usize * self.width as usize + x as usize] = glyph;
    }

    /// Get the glyph at position (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> char {
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// Itère sur les lignes de la grille, du haut vers le bas.
    ///
    /// # Example
    /// ```
    /// use gp_core::frame::GlyphGrid;
    /// let grid = GlyphGrid::new(3, 2);
    /// assert_eq!(grid.rows().count(), 2);
    /// ```
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Rend la grille en texte brut, une ligne par rangée.
    ///
    /// # Example
    /// ```
    /// use gp_core::frame::GlyphGrid;
    /// let mut grid = GlyphGrid::new(2, 1);
    /// grid.set(0, 0, '@');
    /// grid.set(1, 0, '.');
    /// assert_eq!(grid.to_text(), "@.\n");
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.rows() {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_resize_reallocates_on_change() {
        let mut fb = FrameBuffer::new(4, 4);
        fb.resize(4, 4);
        assert_eq!(fb.data.len(), 64);
        fb.resize(2, 3);
        assert_eq!((fb.width, fb.height), (2, 3));
        assert_eq!(fb.data.len(), 24);
    }

    #[test]
    fn grid_rows_and_text() {
        let mut grid = GlyphGrid::new(2, 2);
        grid.set(0, 0, 'a');
        grid.set(1, 0, 'b');
        grid.set(0, 1, 'c');
        grid.set(1, 1, 'd');
        let rows: Vec<&[char]> = grid.rows().collect();
        assert_eq!(rows[0], ['a', 'b']);
        assert_eq!(rows[1], ['c', 'd']);
        assert_eq!(grid.to_text(), "ab\ncd\n");
    }

    #[test]
    fn luminance_weights_sum_to_full_scale() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.data[0] = 255;
        fb.data[1] = 255;
        fb.data[2] = 255;
        assert_eq!(fb.luminance(0, 0), 255);
        fb.data[0] = 0;
        fb.data[1] = 0;
        fb.data[2] = 0;
        assert_eq!(fb.luminance(0, 0), 0);
    }
}

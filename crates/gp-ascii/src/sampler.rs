use gp_core::config::Luma;
use gp_core::frame::FrameBuffer;
use rayon::prelude::*;

/// Grille intermédiaire de luminosités brutes [0, 255], row-major.
///
/// Réutilisée d'un cycle à l'autre pour éviter les allocations.
///
/// # Example
/// ```
/// use gp_ascii::sampler::LumaGrid;
/// let grid = LumaGrid::new(4, 3);
/// assert_eq!(grid.values.len(), 12);
/// ```
#[derive(Clone, Debug)]
pub struct LumaGrid {
    /// Luminosités moyennées par bloc, row-major.
    pub values: Vec<u8>,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
}

impl LumaGrid {
    /// Crée une grille pré-allouée, remplie de zéros.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            values: vec![0u8; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Réalloue si les dimensions diffèrent, sinon no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            self.values = vec![0u8; width as usize * height as usize];
            self.width = width;
            self.height = height;
        }
    }
}

/// Dimensions de la grille de sortie : `ceil(w/step) × ceil(h/step)`.
///
/// # Example
/// ```
/// use gp_ascii::sampler::grid_size;
/// assert_eq!(grid_size(10, 10, 1), (10, 10));
/// assert_eq!(grid_size(10, 7, 3), (4, 3));
/// ```
#[must_use]
pub fn grid_size(width: u32, height: u32, step: u32) -> (u32, u32) {
    let step = step.max(1);
    (width.div_ceil(step), height.div_ceil(step))
}

/// Valeur échantillonnée d'un pixel selon le canal configuré.
#[inline(always)]
fn sample_channel(data: &[u8], idx: usize, luma: Luma) -> u32 {
    match luma {
        Luma::Red => u32::from(data[idx]),
        Luma::Weighted => {
            (u32::from(data[idx]) * 2126
                + u32::from(data[idx + 1]) * 7152
                + u32::from(data[idx + 2]) * 722)
                / 10000
        }
    }
}

/// Réduit `frame` en une grille de luminosités par moyennage de blocs
/// `step × step`.
///
/// Les blocs partiels en bordure droite/basse ne somment que les pixels
/// dans les bornes, mais le diviseur reste `step × step` : les pixels
/// coupés comptent comme zéro, le bord sort donc plus sombre.
///
/// `out` est redimensionnée à `ceil(h/step) × ceil(w/step)`.
///
/// # Example
/// ```
/// use gp_core::frame::FrameBuffer;
/// use gp_core::config::Luma;
/// use gp_ascii::sampler::{LumaGrid, sample_blocks};
///
/// let mut frame = FrameBuffer::new(2, 2);
/// frame.data.fill(200);
/// let mut out = LumaGrid::new(0, 0);
/// sample_blocks(&frame, 2, Luma::Red, &mut out);
/// assert_eq!((out.width, out.height), (1, 1));
/// assert_eq!(out.values[0], 200);
/// ```
pub fn sample_blocks(frame: &FrameBuffer, step: u32, luma: Luma, out: &mut LumaGrid) {
    let step = step.max(1);
    let (gw, gh) = grid_size(frame.width, frame.height, step);
    out.resize(gw, gh);
    if gw == 0 || gh == 0 {
        return;
    }

    let divisor = u64::from(step) * u64::from(step);
    let fw = frame.width as usize;
    let data = &frame.data;

    out.values
        .par_chunks_mut(gw as usize)
        .enumerate()
        .for_each(|(gy, row)| {
            let y0 = gy as u32 * step;
            let y1 = (y0 + step).min(frame.height);
            for (gx, cell) in row.iter_mut().enumerate() {
                let x0 = gx as u32 * step;
                let x1 = (x0 + step).min(frame.width);

                let mut sum: u64 = 0;
                for y in y0..y1 {
                    let row_base = y as usize * fw;
                    for x in x0..x1 {
                        sum += u64::from(sample_channel(data, (row_base + x as usize) * 4, luma));
                    }
                }
                *cell = (sum / divisor) as u8;
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_red(width: u32, height: u32, red: u8) -> FrameBuffer {
        let mut frame = FrameBuffer::new(width, height);
        for px in frame.data.chunks_mut(4) {
            px[0] = red;
        }
        frame
    }

    #[test]
    fn step_one_preserves_source_dimensions() {
        let frame = frame_with_red(7, 5, 99);
        let mut out = LumaGrid::new(0, 0);
        sample_blocks(&frame, 1, Luma::Red, &mut out);
        assert_eq!((out.width, out.height), (7, 5));
        assert!(out.values.iter().all(|&v| v == 99));
    }

    #[test]
    fn output_dimensions_are_ceiling_divided() {
        for (w, h, step, gw, gh) in [(10, 10, 2, 5, 5), (11, 10, 2, 6, 5), (1, 1, 8, 1, 1)] {
            let frame = frame_with_red(w, h, 0);
            let mut out = LumaGrid::new(0, 0);
            sample_blocks(&frame, step, Luma::Red, &mut out);
            assert_eq!((out.width, out.height), (gw, gh), "w={w} h={h} step={step}");
        }
    }

    #[test]
    fn clipped_blocks_keep_full_divisor() {
        // 3×3 frame, step=2 : la cellule bas-droite ne couvre que (2,2).
        // Sa moyenne = 200 / 4 = 50, pas 200 / 1.
        let frame = frame_with_red(3, 3, 200);
        let mut out = LumaGrid::new(0, 0);
        sample_blocks(&frame, 2, Luma::Red, &mut out);
        assert_eq!((out.width, out.height), (2, 2));
        assert_eq!(out.values[0], 200); // bloc complet 2×2
        assert_eq!(out.values[1], 100); // 2 pixels sur 4
        assert_eq!(out.values[3], 50); // 1 pixel sur 4
    }

    #[test]
    fn sampling_is_monotonic_in_pixel_values() {
        let dim = frame_with_red(4, 4, 80);
        let bright = frame_with_red(4, 4, 160);
        let mut out_dim = LumaGrid::new(0, 0);
        let mut out_bright = LumaGrid::new(0, 0);
        sample_blocks(&dim, 2, Luma::Red, &mut out_dim);
        sample_blocks(&bright, 2, Luma::Red, &mut out_bright);
        for (d, b) in out_dim.values.iter().zip(&out_bright.values) {
            assert!(d <= b);
        }
    }

    #[test]
    fn red_channel_ignores_green_and_blue() {
        let mut frame = FrameBuffer::new(2, 2);
        for px in frame.data.chunks_mut(4) {
            px[1] = 255;
            px[2] = 255;
        }
        let mut out = LumaGrid::new(0, 0);
        sample_blocks(&frame, 1, Luma::Red, &mut out);
        assert!(out.values.iter().all(|&v| v == 0));

        sample_blocks(&frame, 1, Luma::Weighted, &mut out);
        assert!(out.values.iter().all(|&v| v > 0));
    }
}

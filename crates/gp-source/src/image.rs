use std::path::Path;

use gp_core::error::PlayerError;
use gp_core::frame::FrameBuffer;
use gp_core::traits::{FrameSource, SourceKind};

/// Source d'image fixe. Dessine toujours la même frame.
///
/// # Example
/// ```no_run
/// use gp_source::image::ImageSource;
/// use std::path::Path;
/// let source = ImageSource::open(Path::new("test.png")).unwrap();
/// ```
#[derive(Debug)]
pub struct ImageSource {
    frame: FrameBuffer,
}

impl ImageSource {
    /// Charge une image depuis le disque.
    ///
    /// # Errors
    /// Retourne `MediaLoad` si le fichier est illisible ou indécodable.
    pub fn open(path: &Path) -> Result<Self, PlayerError> {
        let img = image::open(path).map_err(|e| {
            PlayerError::media_load(format!("{} : {e}", path.display()))
        })?;
        Ok(Self::from_decoded(img))
    }

    /// Décode une image depuis un blob mémoire (aucun accès réseau).
    ///
    /// # Errors
    /// Retourne `MediaLoad` si le blob n'est pas une image décodable.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PlayerError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| PlayerError::media_load(format!("blob image : {e}")))?;
        Ok(Self::from_decoded(img))
    }

    fn from_decoded(img: image::DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::info!("Image chargée : {width}x{height}");
        Self {
            frame: FrameBuffer {
                data: rgba.into_raw(),
                width,
                height,
            },
        }
    }
}

impl FrameSource for ImageSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Image
    }

    fn native_size(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn draw_into(&mut self, target: &mut FrameBuffer) {
        target.resize(self.frame.width, self.frame.height);
        target.data.copy_from_slice(&self.frame.data);
    }

    fn start(&mut self) {}

    fn pause(&mut self) {}

    fn rewind(&mut self) {}

    fn is_playing(&self) -> bool {
        false
    }
}

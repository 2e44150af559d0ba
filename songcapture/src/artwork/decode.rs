//! Decoding artwork bytes into RGBA images.

use image::imageops::FilterType;
use tracing::trace;

use crate::artwork::ResolveError;
use crate::cache::Weighted;

/// A decoded RGBA8 image.
#[derive(Clone, PartialEq, Eq)]
pub struct Artwork {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Artwork {
    /// Wraps raw RGBA8 pixels.
    ///
    /// Returns `None` if `rgba` is not `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 pixels.
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn byte_len(&self) -> usize {
        self.rgba.len()
    }
}

impl std::fmt::Debug for Artwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Artwork")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl Weighted for Artwork {
    fn weight(&self) -> usize {
        self.rgba.len()
    }
}

/// Turns encoded bytes into an [`Artwork`].
///
/// Called on the blocking thread pool.
pub trait ArtworkDecoder: Send + Sync + 'static {
    fn decode(&self, bytes: &[u8]) -> Result<Artwork, ResolveError>;
}

/// Decoder backed by the `image` crate.
///
/// Optionally downsamples so neither edge exceeds `max_edge`, keeping the
/// aspect ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageDecoder {
    max_edge: Option<u32>,
}

impl ImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_edge(mut self, max_edge: Option<u32>) -> Self {
        self.max_edge = max_edge.filter(|e| *e > 0);
        self
    }
}

impl ArtworkDecoder for ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Artwork, ResolveError> {
        let mut image =
            image::load_from_memory(bytes).map_err(|e| ResolveError::DecodeFailure(e.to_string()))?;

        if let Some(edge) = self.max_edge {
            if image.width() > edge || image.height() > edge {
                trace!(
                    width = image.width(),
                    height = image.height(),
                    edge,
                    "Downsampling artwork"
                );
                image = image.resize(edge, edge, FilterType::Triangle);
            }
        }

        let rgba = image.into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Artwork {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }
}

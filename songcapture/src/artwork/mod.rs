//! Artwork loading.
//!
//! Playlist rows carry an artwork locator. [`ArtworkLoader`] turns locators
//! into decoded [`Artwork`], fetching each locator at most once at a time no
//! matter how many rows ask for it.
//!
//! ```ignore
//! use songcapture::artwork::{ArtworkConfig, ArtworkLoader};
//! use songcapture::provider::AsyncReqwestClient;
//!
//! let loader = ArtworkLoader::with_http_client(AsyncReqwestClient::new()?, &ArtworkConfig::default());
//! let artwork = loader.resolve("https://is1-ssl.mzstatic.com/.../300x300bb.jpg").await?;
//! println!("{}x{}", artwork.width(), artwork.height());
//! ```

mod decode;
mod error;
mod loader;
mod source;

pub use decode::{Artwork, ArtworkDecoder, ImageDecoder};
pub use error::ResolveError;
pub use loader::{ArtworkConfig, ArtworkLoader, DEFAULT_ARTWORK_MEMORY_SIZE};
pub use source::{
    parse_locator, ArtworkSource, HttpArtworkSource, LocalAssetSource, SourceKind,
};

//! Byte sources for artwork locators.
//!
//! A locator is a URL. Its scheme picks the source:
//!
//! | Scheme              | Source                 |
//! |---------------------|------------------------|
//! | `http`, `https`     | [`HttpArtworkSource`]  |
//! | `musickit`, `file`  | [`LocalAssetSource`]   |
//!
//! Any other scheme is rejected as an invalid key.

use std::path::{Component, Path, PathBuf};

use futures::future::BoxFuture;
use reqwest::Url;
use tracing::trace;

use crate::artwork::ResolveError;
use crate::provider::AsyncHttpClient;

/// Which source serves a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Remote,
    Local,
}

impl SourceKind {
    /// Routes a parsed locator by scheme.
    pub fn for_url(url: &Url) -> Result<Self, ResolveError> {
        match url.scheme() {
            "http" | "https" => Ok(SourceKind::Remote),
            "musickit" | "file" => Ok(SourceKind::Local),
            other => Err(ResolveError::InvalidKey(format!(
                "unsupported scheme '{}' in {}",
                other, url
            ))),
        }
    }
}

/// Parses a locator string.
pub fn parse_locator(key: &str) -> Result<Url, ResolveError> {
    Url::parse(key).map_err(|e| ResolveError::InvalidKey(format!("{}: {}", key, e)))
}

/// Retrieves the encoded bytes behind a locator.
pub trait ArtworkSource: Send + Sync + 'static {
    fn fetch_bytes<'a>(&'a self, locator: &'a Url) -> BoxFuture<'a, Result<Vec<u8>, ResolveError>>;
}

/// Fetches `http`/`https` locators through an [`AsyncHttpClient`].
pub struct HttpArtworkSource<C> {
    client: C,
}

impl<C: AsyncHttpClient> HttpArtworkSource<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

impl<C: AsyncHttpClient + 'static> ArtworkSource for HttpArtworkSource<C> {
    fn fetch_bytes<'a>(&'a self, locator: &'a Url) -> BoxFuture<'a, Result<Vec<u8>, ResolveError>> {
        Box::pin(async move {
            trace!(url = %locator, "Fetching remote artwork");
            Ok(self.client.get(locator.as_str(), &[]).await?)
        })
    }
}

/// Reads `file` and `musickit` locators from disk.
///
/// `file:///abs/path.png` is read as-is. `musickit://host/path.png` is read
/// from `<root>/host/path.png`.
#[derive(Debug, Clone)]
pub struct LocalAssetSource {
    root: PathBuf,
}

impl LocalAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a locator to a path on disk.
    pub fn path_for(&self, locator: &Url) -> Result<PathBuf, ResolveError> {
        match locator.scheme() {
            "file" => locator
                .to_file_path()
                .map_err(|_| ResolveError::InvalidKey(format!("not a local path: {}", locator))),
            "musickit" => {
                let mut path = self.root.clone();
                let host = locator.host_str().into_iter();
                let segments = locator.path_segments().into_iter().flatten();
                for part in host.chain(segments).filter(|s| !s.is_empty()) {
                    if !is_plain_component(part) {
                        return Err(ResolveError::InvalidKey(format!(
                            "path escapes asset root: {}",
                            locator
                        )));
                    }
                    path.push(part);
                }
                // The joined path must be plain names under the root.
                let contained = path
                    .strip_prefix(&self.root)
                    .map(|rest| rest.components().all(|c| matches!(c, Component::Normal(_))))
                    .unwrap_or(false);
                if !contained {
                    return Err(ResolveError::InvalidKey(format!(
                        "path escapes asset root: {}",
                        locator
                    )));
                }
                Ok(path)
            }
            other => Err(ResolveError::InvalidKey(format!(
                "scheme '{}' is not a local asset",
                other
            ))),
        }
    }
}

/// True when `part` names one entry inside a directory.
///
/// Host and path parts arrive percent-encoded, so `%2E%2E` is checked
/// alongside `..`.
fn is_plain_component(part: &str) -> bool {
    let decoded = part.replace("%2E", ".").replace("%2e", ".");
    if decoded == "." || decoded == ".." {
        return false;
    }
    !part.contains(['/', '\\', ':'])
        && !part.to_ascii_lowercase().contains("%2f")
        && !part.to_ascii_lowercase().contains("%5c")
}

impl ArtworkSource for LocalAssetSource {
    fn fetch_bytes<'a>(&'a self, locator: &'a Url) -> BoxFuture<'a, Result<Vec<u8>, ResolveError>> {
        Box::pin(async move {
            let path = self.path_for(locator)?;
            trace!(path = %path.display(), "Reading local artwork");
            tokio::fs::read(&path)
                .await
                .map_err(|e| ResolveError::Io(format!("{}: {}", path.display(), e)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{MockAsyncHttpClient, ProviderError};
    use tempfile::TempDir;

    #[test]
    fn test_scheme_routing() {
        let route = |s: &str| SourceKind::for_url(&parse_locator(s).unwrap());
        assert_eq!(route("https://a/b.png").unwrap(), SourceKind::Remote);
        assert_eq!(route("http://a/b.png").unwrap(), SourceKind::Remote);
        assert_eq!(route("musickit://artwork/1.png").unwrap(), SourceKind::Local);
        assert_eq!(route("file:///tmp/x.png").unwrap(), SourceKind::Local);
        assert!(matches!(
            route("ftp://a/b.png"),
            Err(ResolveError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_unparsable_locator_is_invalid_key() {
        assert!(matches!(
            parse_locator("not a url"),
            Err(ResolveError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_musickit_path_under_root() {
        let source = LocalAssetSource::new("/assets");
        let url = parse_locator("musickit://artwork/ab/cd.png").unwrap();
        assert_eq!(
            source.path_for(&url).unwrap(),
            PathBuf::from("/assets/artwork/ab/cd.png")
        );
    }

    #[test]
    fn test_musickit_parent_host_rejected() {
        let source = LocalAssetSource::new("/assets");
        for locator in ["musickit://../etc/passwd", "musickit://%2E%2E/x", "musickit://%2e./x"] {
            let url = parse_locator(locator).unwrap();
            assert!(
                matches!(source.path_for(&url), Err(ResolveError::InvalidKey(_))),
                "{} should be rejected",
                locator
            );
        }
    }

    #[test]
    fn test_musickit_current_dir_host_rejected() {
        let source = LocalAssetSource::new("/assets");
        let url = parse_locator("musickit://./secret").unwrap();
        assert!(matches!(
            source.path_for(&url),
            Err(ResolveError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_musickit_encoded_separator_rejected() {
        let source = LocalAssetSource::new("/assets");
        let url = parse_locator("musickit://artwork/a%2F..%2F..%2Fx").unwrap();
        assert!(matches!(
            source.path_for(&url),
            Err(ResolveError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_musickit_normalized_dots_stay_under_root() {
        let source = LocalAssetSource::new("/assets");
        let url = parse_locator("musickit://artwork/%2E%2E/%2E%2E/x").unwrap();
        assert_eq!(
            source.path_for(&url).unwrap(),
            PathBuf::from("/assets/artwork/x")
        );
    }

    #[test]
    fn test_plain_component() {
        assert!(is_plain_component("artwork"));
        assert!(is_plain_component("cover.png"));
        assert!(is_plain_component("..."));
        assert!(!is_plain_component(".."));
        assert!(!is_plain_component("."));
        assert!(!is_plain_component("%2E%2e"));
        assert!(!is_plain_component("a\\b"));
        assert!(!is_plain_component("a%2fb"));
    }

    #[tokio::test]
    async fn test_local_source_reads_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("artwork")).unwrap();
        std::fs::write(dir.path().join("artwork/a.png"), b"bytes").unwrap();

        let source = LocalAssetSource::new(dir.path());
        let url = parse_locator("musickit://artwork/a.png").unwrap();
        assert_eq!(source.fetch_bytes(&url).await.unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_local_source_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = LocalAssetSource::new(dir.path());
        let url = parse_locator("musickit://artwork/missing.png").unwrap();
        assert!(matches!(
            source.fetch_bytes(&url).await,
            Err(ResolveError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_http_source_uses_client() {
        let client = MockAsyncHttpClient::new(Ok(vec![1, 2, 3]));
        let source = HttpArtworkSource::new(client);
        let url = parse_locator("https://cdn.example/a.png").unwrap();

        assert_eq!(source.fetch_bytes(&url).await.unwrap(), vec![1, 2, 3]);
        let recorded = source.client.recorded();
        assert_eq!(recorded[0].url, "https://cdn.example/a.png");
    }

    #[tokio::test]
    async fn test_http_source_maps_transport_errors() {
        let client = MockAsyncHttpClient::new(Err(ProviderError::HttpStatus {
            status: 500,
            url: "https://cdn.example/a.png".into(),
        }));
        let source = HttpArtworkSource::new(client);
        let url = parse_locator("https://cdn.example/a.png").unwrap();

        assert!(matches!(
            source.fetch_bytes(&url).await,
            Err(ResolveError::Transport(ProviderError::HttpStatus { status: 500, .. }))
        ));
    }
}

//! Core playlist domain types.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A remote music service that hosts a user's playlists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Service {
    /// Apple Music library playlists.
    AppleMusic,
    /// Spotify playlists (pagination not yet available).
    Spotify,
}

impl Service {
    /// All known services, in display order.
    pub const ALL: [Service; 2] = [Service::AppleMusic, Service::Spotify];

    /// User-facing service name.
    pub fn title(&self) -> &'static str {
        match self {
            Service::AppleMusic => "Apple Music",
            Service::Spotify => "Spotify",
        }
    }

    /// Stable identifier used in config files and cache keys.
    pub fn key(&self) -> &'static str {
        match self {
            Service::AppleMusic => "apple_music",
            Service::Spotify => "spotify",
        }
    }

    /// Parse a service from its config key (case-insensitive).
    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "apple_music" | "applemusic" => Some(Service::AppleMusic),
            "spotify" => Some(Service::Spotify),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Identity of a remote playlist.
///
/// Two playlists are the same playlist iff both the service and the raw
/// identifier match, regardless of name or artwork.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaylistId {
    service: Service,
    raw: String,
}

impl PlaylistId {
    /// Creates an identity from a service and the service's own identifier.
    pub fn new(service: Service, raw: impl Into<String>) -> Self {
        Self {
            service,
            raw: raw.into(),
        }
    }

    /// The service hosting this playlist.
    pub fn service(&self) -> Service {
        self.service
    }

    /// The provider-specific identifier.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.service, self.raw)
    }
}

/// A playlist as last reported by its provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    /// Stable identity.
    pub id: PlaylistId,
    /// Display name.
    pub name: String,
    /// Artwork locator, resolvable through the artwork loader.
    pub artwork: Option<String>,
}

impl Playlist {
    /// Creates a playlist without artwork.
    pub fn new(id: PlaylistId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            artwork: None,
        }
    }

    /// Sets the artwork locator.
    pub fn with_artwork(mut self, locator: impl Into<String>) -> Self {
        self.artwork = Some(locator.into());
        self
    }

    /// The service this playlist belongs to.
    pub fn service(&self) -> Service {
        self.id.service()
    }
}

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a user-defined playlist group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaylistGroupId(u64);

impl PlaylistGroupId {
    /// Allocates a new process-unique group id.
    pub fn generate() -> Self {
        Self(NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for PlaylistGroupId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A named, user-curated collection of playlists across services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistGroup {
    pub id: PlaylistGroupId,
    pub name: String,
    pub playlists: Vec<Playlist>,
}

impl PlaylistGroup {
    /// Creates a group with a freshly generated id.
    pub fn new(name: impl Into<String>, playlists: Vec<Playlist>) -> Self {
        Self {
            id: PlaylistGroupId::generate(),
            name: name.into(),
            playlists,
        }
    }
}

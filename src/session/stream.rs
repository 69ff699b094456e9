//! Aggregated media stream
//!
//! All tracks consumed during one session end up in a single logical
//! stream, the thing an application hands to its player. Tracks are only
//! ever appended; a new session starts a new stream.

use uuid::Uuid;

use crate::protocol::{ConsumerId, MediaKind};

/// Identity of an aggregated stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(Uuid);

impl StreamId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One track inside a [`MediaStream`]
#[derive(Debug, Clone)]
pub struct StreamTrack<T> {
    /// Consumer the track came from
    pub consumer_id: ConsumerId,
    /// Media kind
    pub kind: MediaKind,
    /// The track handle
    pub track: T,
}

/// Aggregated stream of every track consumed in a session
///
/// Cheap to clone when `T` is a handle type; each `StreamUpdated` event
/// carries a snapshot sharing the same [`StreamId`].
#[derive(Debug, Clone)]
pub struct MediaStream<T> {
    id: StreamId,
    tracks: Vec<StreamTrack<T>>,
}

impl<T> MediaStream<T> {
    /// Create an empty stream with a fresh identity
    pub fn new() -> Self {
        Self {
            id: StreamId::new(),
            tracks: Vec::new(),
        }
    }

    /// Append a track
    pub fn add_track(&mut self, consumer_id: ConsumerId, kind: MediaKind, track: T) {
        self.tracks.push(StreamTrack {
            consumer_id,
            kind,
            track,
        });
    }

    /// Stream identity
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// All tracks, in the order they were consumed
    pub fn tracks(&self) -> &[StreamTrack<T>] {
        &self.tracks
    }

    /// Tracks of one kind
    pub fn tracks_of(&self, kind: MediaKind) -> impl Iterator<Item = &T> {
        self.tracks
            .iter()
            .filter(move |t| t.kind == kind)
            .map(|t| &t.track)
    }

    /// Video tracks
    pub fn video_tracks(&self) -> impl Iterator<Item = &T> {
        self.tracks_of(MediaKind::Video)
    }

    /// Audio tracks
    pub fn audio_tracks(&self) -> impl Iterator<Item = &T> {
        self.tracks_of(MediaKind::Audio)
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the stream has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl<T> Default for MediaStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

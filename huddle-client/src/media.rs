use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

/// A local track that can be attached to a session.
///
/// Sessions downcast through `as_any` to the concrete track type they know how to send.
pub trait MediaTrack: Send + Sync + fmt::Debug + 'static {
    fn id(&self) -> &str;
    fn kind(&self) -> TrackKind;
    fn is_enabled(&self) -> bool;
    fn set_enabled(&self, enabled: bool);
    fn as_any(&self) -> &dyn Any;
}

/// Track with no media backend of its own. The embedding application feeds it.
#[derive(Debug)]
pub struct CaptureTrack {
    id: String,
    kind: TrackKind,
    enabled: AtomicBool,
}

impl CaptureTrack {
    pub fn new(id: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: id.into(),
            kind,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn audio(id: impl Into<String>) -> Self {
        Self::new(id, TrackKind::Audio)
    }

    pub fn video(id: impl Into<String>) -> Self {
        Self::new(id, TrackKind::Video)
    }
}

impl MediaTrack for CaptureTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The local stream offered to every peer in the room.
#[derive(Debug, Clone, Default)]
pub struct LocalMedia {
    stream_id: String,
    tracks: Vec<Arc<dyn MediaTrack>>,
}

impl LocalMedia {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            tracks: Vec::new(),
        }
    }

    pub fn with_track(mut self, track: Arc<dyn MediaTrack>) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn audio_track(&self) -> Option<&Arc<dyn MediaTrack>> {
        self.tracks.iter().find(|t| t.kind() == TrackKind::Audio)
    }

    /// Mute flag announced on join: muted unless an enabled audio track exists.
    pub fn is_muted(&self) -> bool {
        !self.audio_track().is_some_and(|t| t.is_enabled())
    }
}

/// A remote stream surfaced to the UI. `inner` holds the backend object
/// (a webrtc `TrackRemote` for the built-in session).
#[derive(Clone)]
pub struct MediaHandle {
    stream_id: String,
    track_id: String,
    kind: TrackKind,
    inner: Arc<dyn Any + Send + Sync>,
}

impl MediaHandle {
    pub fn new(
        stream_id: impl Into<String>,
        track_id: impl Into<String>,
        kind: TrackKind,
        inner: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            stream_id: stream_id.into(),
            track_id: track_id.into(),
            kind,
            inner,
        }
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle")
            .field("stream_id", &self.stream_id)
            .field("track_id", &self.track_id)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

use crate::media::MediaTrack;
use huddle_core::{IceCandidate, SessionDescription};
use std::sync::Arc;

pub(crate) enum LinkCommand {
    AddTracks(Vec<Arc<dyn MediaTrack>>),
    /// `attach` is added after the remote description applies and before any answer is made.
    RemoteDescription {
        description: SessionDescription,
        attach: Vec<Arc<dyn MediaTrack>>,
    },
    RemoteCandidate(IceCandidate),
    Close,
}

mod channel_impl;
mod connector_command;
mod connector_event;
mod connector_loop;
mod link_event_impl;
mod peer_record;
mod signal_impl;

pub use connector_event::*;

use crate::config::ConnectorConfig;
use crate::error::{ConnectorError, ConnectorResult};
use crate::media::LocalMedia;
use crate::session::{RtcSessionFactory, SessionFactory};
use crate::transport::{ControlTransport, WsTransport};
use connector_command::ConnectorCommand;
use connector_loop::ConnectorLoop;
use huddle_core::{RoomIdentity, UserUpdate};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Handle to the signaling connector task.
///
/// The connector owns the control channel and one [`crate::link::PeerLink`] per
/// remote participant. Cloning the handle is cheap; the task stops on
/// [`SignalingConnector::close`] or when every handle is dropped.
#[derive(Clone)]
pub struct SignalingConnector {
    commands: mpsc::UnboundedSender<ConnectorCommand>,
}

impl SignalingConnector {
    /// Spawns the connector task. Must be called inside a tokio runtime.
    /// Nothing is opened until [`SignalingConnector::connect`].
    pub fn new(
        config: ConnectorConfig,
        transport: Arc<dyn ControlTransport>,
        sessions: Arc<dyn SessionFactory>,
    ) -> (Self, mpsc::UnboundedReceiver<ConnectorEvent>) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let connector = ConnectorLoop::new(config, transport, sessions, command_rx, events_tx);
        tokio::spawn(connector.run());

        (Self { commands }, events_rx)
    }

    /// WebSocket control channel and webrtc-rs sessions.
    pub fn with_webrtc(config: ConnectorConfig) -> (Self, mpsc::UnboundedReceiver<ConnectorEvent>) {
        Self::new(
            config,
            Arc::new(WsTransport::new()),
            Arc::new(RtcSessionFactory::new()),
        )
    }

    /// Opens the control channel. A no-op while one is open or opening.
    pub fn connect(&self) -> ConnectorResult<()> {
        self.send(ConnectorCommand::Connect)
    }

    /// Sends `join`, queued until the channel is open. The announced mute flag
    /// follows the first audio track of `local_media`.
    pub fn join_room(&self, identity: RoomIdentity, local_media: LocalMedia) -> ConnectorResult<()> {
        self.send(ConnectorCommand::JoinRoom {
            identity,
            local_media,
        })
    }

    pub fn send_user_update(&self, update: UserUpdate) -> ConnectorResult<()> {
        self.send(ConnectorCommand::SendUserUpdate(update))
    }

    pub async fn snapshot(&self) -> ConnectorResult<ConnectorSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.send(ConnectorCommand::Snapshot(tx))?;
        rx.await.map_err(|_| ConnectorError::Shutdown)
    }

    /// Closes every link, cancels timers and drops the control channel.
    pub async fn close(&self) -> ConnectorResult<()> {
        let (tx, rx) = oneshot::channel();
        self.send(ConnectorCommand::Close(tx))?;
        rx.await.map_err(|_| ConnectorError::Shutdown)
    }

    fn send(&self, cmd: ConnectorCommand) -> ConnectorResult<()> {
        self.commands
            .send(cmd)
            .map_err(|_| ConnectorError::Shutdown)
    }
}

use crate::config::ConnectorConfig;
use crate::connector::connector_command::{ConnectorCommand, TimerFire};
use crate::connector::peer_record::PeerRecord;
use crate::connector::{ConnectorEvent, ConnectorSnapshot};
use crate::link::LinkEvent;
use crate::media::LocalMedia;
use crate::session::SessionFactory;
use crate::timer::TimerSlot;
use crate::transport::{ChannelEvent, ChannelSender, ControlTransport};
use huddle_core::{RoomIdentity, Uid};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

pub(crate) enum ChannelState {
    Idle,
    Connecting,
    Open(ChannelSender),
}

/// The single owner of all connector state. Commands, channel events, link
/// events and timer fires are handled one at a time on this task.
pub(crate) struct ConnectorLoop {
    pub(crate) config: ConnectorConfig,
    pub(crate) transport: Arc<dyn ControlTransport>,
    pub(crate) sessions: Arc<dyn SessionFactory>,

    pub(crate) peers: HashMap<Uid, PeerRecord>,
    pub(crate) identity: Option<RoomIdentity>,
    pub(crate) local_media: Option<LocalMedia>,

    pub(crate) channel: ChannelState,
    pub(crate) generation: u64,
    pub(crate) outbox: VecDeque<String>,
    /// Offer/answer/candidate frames held until the server has (re)admitted us.
    pub(crate) relay_backlog: VecDeque<String>,
    /// `user-joined` seen on the current connection.
    pub(crate) room_joined: bool,
    pub(crate) heartbeat: TimerSlot,
    pub(crate) reconnect: TimerSlot,
    pub(crate) shutting_down: bool,

    command_rx: mpsc::UnboundedReceiver<ConnectorCommand>,
    channel_rx: mpsc::UnboundedReceiver<ChannelEvent>,
    pub(crate) channel_tx: mpsc::UnboundedSender<ChannelEvent>,
    link_rx: mpsc::UnboundedReceiver<LinkEvent>,
    pub(crate) link_tx: mpsc::UnboundedSender<LinkEvent>,
    timer_rx: mpsc::UnboundedReceiver<TimerFire>,
    pub(crate) timer_tx: mpsc::UnboundedSender<TimerFire>,
    pub(crate) events: mpsc::UnboundedSender<ConnectorEvent>,
}

impl ConnectorLoop {
    pub(crate) fn new(
        config: ConnectorConfig,
        transport: Arc<dyn ControlTransport>,
        sessions: Arc<dyn SessionFactory>,
        command_rx: mpsc::UnboundedReceiver<ConnectorCommand>,
        events: mpsc::UnboundedSender<ConnectorEvent>,
    ) -> Self {
        let (channel_tx, channel_rx) = mpsc::unbounded_channel();
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        Self {
            config,
            transport,
            sessions,
            peers: HashMap::new(),
            identity: None,
            local_media: None,
            channel: ChannelState::Idle,
            generation: 0,
            outbox: VecDeque::new(),
            relay_backlog: VecDeque::new(),
            room_joined: false,
            heartbeat: TimerSlot::new(),
            reconnect: TimerSlot::new(),
            shutting_down: false,
            command_rx,
            channel_rx,
            channel_tx,
            link_rx,
            link_tx,
            timer_rx,
            timer_tx,
            events,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Connector event loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(ConnectorCommand::Close(done)) => {
                            self.shutdown().await;
                            self.command_rx.close();
                            let _ = done.send(());
                            break;
                        }
                        Some(c) => self.handle_command(c),
                        None => {
                            info!("All connector handles dropped. Shutting down.");
                            self.shutdown().await;
                            break;
                        }
                    }
                }

                Some(evt) = self.channel_rx.recv() => {
                    self.handle_channel_event(evt).await;
                }

                Some(evt) = self.link_rx.recv() => {
                    self.handle_link_event(evt);
                }

                Some(fire) = self.timer_rx.recv() => {
                    self.handle_timer(fire);
                }
            }
        }

        info!("Connector event loop finished");
    }

    fn handle_command(&mut self, cmd: ConnectorCommand) {
        match cmd {
            ConnectorCommand::Connect => self.connect(),
            ConnectorCommand::JoinRoom {
                identity,
                local_media,
            } => self.join_room(identity, local_media),
            ConnectorCommand::SendUserUpdate(update) => self.send_user_update(update),
            ConnectorCommand::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            ConnectorCommand::Close(_) => {}
        }
    }

    pub(crate) fn emit(&self, event: ConnectorEvent) {
        if self.events.send(event).is_err() {
            debug!("Connector event receiver dropped");
        }
    }

    fn snapshot(&self) -> ConnectorSnapshot {
        let mut peers: Vec<_> = self.peers.values().map(|p| p.snapshot()).collect();
        peers.sort_by(|a, b| a.user.uid.cmp(&b.user.uid));

        ConnectorSnapshot {
            channel_open: matches!(self.channel, ChannelState::Open(_)),
            reconnect_pending: self.reconnect.is_armed(),
            heartbeat_active: self.heartbeat.is_armed(),
            queued_messages: self.outbox.len() + self.relay_backlog.len(),
            identity: self.identity.clone(),
            peers,
        }
    }

    async fn shutdown(&mut self) {
        info!("Shutting down connector with {} peers", self.peers.len());
        self.shutting_down = true;
        self.heartbeat.cancel();
        self.reconnect.cancel();

        for (_, record) in self.peers.drain() {
            if let Some(link) = record.link {
                link.close().await;
            }
        }

        // Dropping the sender closes the connection.
        self.channel = ChannelState::Idle;
        self.outbox.clear();
        self.relay_backlog.clear();
    }
}

use crate::connector::ConnectorEvent;
use crate::connector::connector_command::TimerFire;
use crate::connector::connector_loop::{ChannelState, ConnectorLoop};
use crate::error::ConnectorResult;
use crate::transport::ChannelEvent;
use huddle_core::SignalMessage;
use tracing::{debug, error, info, warn};

impl ConnectorLoop {
    /// Opens the control channel unless one is open or being opened.
    pub(crate) fn connect(&mut self) {
        if !matches!(self.channel, ChannelState::Idle) {
            debug!("Control channel already open or opening");
            return;
        }
        // An explicit connect supersedes a scheduled one.
        self.reconnect.cancel();
        self.open_channel();
    }

    fn open_channel(&mut self) {
        self.generation += 1;
        self.channel = ChannelState::Connecting;
        self.room_joined = false;
        info!(
            "Opening control channel to {} (generation {})",
            self.config.signaling_url, self.generation
        );
        self.transport.open(
            &self.config.signaling_url,
            self.generation,
            self.channel_tx.clone(),
        );
    }

    pub(crate) async fn handle_channel_event(&mut self, evt: ChannelEvent) {
        if evt.generation() != self.generation || self.shutting_down {
            debug!("Ignoring event from stale channel {}", evt.generation());
            return;
        }

        match evt {
            ChannelEvent::Opened { sender, .. } => {
                info!("Control channel open");
                self.channel = ChannelState::Open(sender);
                self.emit(ConnectorEvent::SignalingOpened);
                self.start_heartbeat();
                self.flush_outbox();
            }
            ChannelEvent::Frame { text, .. } => {
                if let Err(e) = self.handle_frame(&text).await {
                    warn!("Dropping frame: {}", e);
                }
            }
            ChannelEvent::Closed { reason, .. } => {
                if matches!(self.channel, ChannelState::Idle) {
                    return;
                }
                warn!(
                    "Control channel lost: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                self.channel = ChannelState::Idle;
                self.room_joined = false;
                self.heartbeat.cancel();
                self.emit(ConnectorEvent::SignalingClosed);
                self.schedule_reconnect();
            }
        }
    }

    async fn handle_frame(&mut self, text: &str) -> ConnectorResult<()> {
        let msg: SignalMessage = serde_json::from_str(text)?;
        self.handle_signal(msg).await
    }

    fn schedule_reconnect(&mut self) {
        let tx = self.timer_tx.clone();
        let generation = self.generation;
        let armed = self.reconnect.arm_once(self.config.reconnect_delay, move || {
            let _ = tx.send(TimerFire::Reconnect { generation });
        });

        if armed {
            info!("Reconnecting in {:?}", self.config.reconnect_delay);
        } else {
            debug!("Reconnect already scheduled");
        }
    }

    fn start_heartbeat(&mut self) {
        let tx = self.timer_tx.clone();
        let generation = self.generation;
        self.heartbeat
            .restart_interval(self.config.heartbeat_interval, move || {
                tx.send(TimerFire::Heartbeat { generation }).is_ok()
            });
    }

    pub(crate) fn handle_timer(&mut self, fire: TimerFire) {
        match fire {
            TimerFire::Reconnect { generation } => {
                // Superseded by an explicit connect; the slot may hold a newer timer.
                if generation != self.generation {
                    debug!("Ignoring reconnect armed for generation {}", generation);
                    return;
                }
                self.reconnect.cancel();
                if self.shutting_down {
                    return;
                }
                if matches!(self.channel, ChannelState::Idle) {
                    self.open_channel();
                }
            }
            TimerFire::Heartbeat { generation } => {
                if generation != self.generation {
                    return;
                }
                // Heartbeats are never queued for a later connection.
                if let ChannelState::Open(sender) = &self.channel {
                    match serde_json::to_string(&SignalMessage::heartbeat()) {
                        Ok(text) => {
                            if let Err(e) = sender.send(text) {
                                debug!("Heartbeat not sent: {}", e);
                            }
                        }
                        Err(e) => error!("Failed to encode heartbeat: {}", e),
                    }
                }
            }
        }
    }

    /// Sends now if the channel is open, otherwise queues for the next open.
    ///
    /// Offer, answer and candidate frames also wait until the server has
    /// answered our `join` on the current connection.
    pub(crate) fn send_message(&mut self, msg: SignalMessage) {
        let text = match serde_json::to_string(&msg) {
            Ok(text) => text,
            Err(e) => {
                error!("Failed to encode {} message: {}", msg.kind(), e);
                return;
            }
        };

        let relayed = matches!(
            msg,
            SignalMessage::Offer(_) | SignalMessage::Answer(_) | SignalMessage::Candidate(_)
        );
        if relayed && !self.room_joined {
            debug!("Not admitted yet; holding {}", msg.kind());
            self.relay_backlog.push_back(text);
            return;
        }

        match &self.channel {
            ChannelState::Open(sender) => {
                if sender.send(text.clone()).is_err() {
                    debug!("Channel went away; queueing {}", msg.kind());
                    self.queue_for(relayed, text);
                }
            }
            _ => {
                debug!("Channel not open; queueing {}", msg.kind());
                self.queue_for(relayed, text);
            }
        }
    }

    fn queue_for(&mut self, relayed: bool, text: String) {
        if relayed {
            self.relay_backlog.push_back(text);
        } else {
            self.outbox.push_back(text);
        }
    }

    fn flush_outbox(&mut self) {
        let ChannelState::Open(sender) = &self.channel else {
            return;
        };
        while let Some(text) = self.outbox.pop_front() {
            if sender.send(text.clone()).is_err() {
                self.outbox.push_front(text);
                break;
            }
        }
    }

    /// Releases held negotiation frames once `user-joined` arrives.
    pub(crate) fn mark_room_joined(&mut self) {
        self.room_joined = true;
        let ChannelState::Open(sender) = &self.channel else {
            return;
        };
        if !self.relay_backlog.is_empty() {
            debug!("Releasing {} held negotiation frames", self.relay_backlog.len());
        }
        while let Some(text) = self.relay_backlog.pop_front() {
            if sender.send(text.clone()).is_err() {
                self.relay_backlog.push_front(text);
                break;
            }
        }
    }
}

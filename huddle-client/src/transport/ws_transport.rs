use crate::error::TransportError;
use crate::transport::{ChannelEvent, ChannelEventSender, ChannelSender, ControlTransport};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

/// WebSocket control channel carrying one JSON text frame per signaling message.
#[derive(Debug, Default, Clone)]
pub struct WsTransport;

impl WsTransport {
    pub fn new() -> Self {
        Self
    }
}

impl ControlTransport for WsTransport {
    fn open(&self, url: &str, generation: u64, events: ChannelEventSender) {
        let url = url.to_string();
        tokio::spawn(run_connection(url, generation, events));
    }
}

async fn run_connection(url: String, generation: u64, events: ChannelEventSender) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let err = TransportError::Open {
                url,
                reason: e.to_string(),
            };
            warn!("{}", err);
            let _ = events.send(ChannelEvent::Closed {
                generation,
                reason: Some(err.to_string()),
            });
            return;
        }
    };

    info!("Control channel {} open (generation {})", url, generation);
    let (mut ws_write, mut ws_read) = ws_stream.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

    if events
        .send(ChannelEvent::Opened {
            generation,
            sender: ChannelSender::new(out_tx),
        })
        .is_err()
    {
        let _ = ws_write.close().await;
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            if ws_write.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_write.close().await;
    });

    let frame_tx = events.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let frame = ChannelEvent::Frame {
                        generation,
                        text: text.as_str().to_owned(),
                    };
                    if frame_tx.send(frame).is_err() {
                        break;
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!("Server closed control channel: {:?}", frame);
                    return Some("closed by server".to_string());
                }
                Ok(_) => {}
                Err(e) => return Some(e.to_string()),
            }
        }
        None
    });

    let reason = tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            None
        }
        res = &mut recv_task => {
            send_task.abort();
            res.ok().flatten()
        }
    };

    info!("Control channel {} closed (generation {})", url, generation);
    let _ = events.send(ChannelEvent::Closed { generation, reason });
}

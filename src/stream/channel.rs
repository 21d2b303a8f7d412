use super::messages::{ClientMessage, ServerMessage};
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Connection settings for the caption channel
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws/captions`
    pub url: String,
    /// Bound on each connection attempt
    pub connect_timeout: Duration,
    /// Fixed delay before a reconnect attempt after abnormal closure
    pub reconnect_delay: Duration,
    /// Retry after abnormal closure; normal closure never reconnects
    pub auto_reconnect: bool,
}

impl ChannelConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            reconnect_delay: Duration::from_secs(3),
            auto_reconnect: true,
        }
    }
}

enum Command {
    Send(ClientMessage),
    Close,
}

/// Why the socket stopped pumping
enum Closure {
    /// Explicit disconnect or a close frame with the normal-closure code
    Normal,
    Abnormal(String),
}

/// Client side of the duplex caption channel.
///
/// Inbound messages are delivered exactly once, in receipt order, on the
/// receiver returned by `connect`. Outbound sends are fire-and-forget and
/// silently dropped (with a warning) while the transport is down.
pub struct CaptionChannel {
    command_tx: mpsc::UnboundedSender<Command>,
    connected: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

impl CaptionChannel {
    /// Open the channel. Resolves once the transport is up; fails on a
    /// connection error or once the connect timeout elapses.
    pub async fn connect(
        config: ChannelConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerMessage>)> {
        let socket = open_socket(&config).await?;

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let closed = Arc::new(AtomicBool::new(false));

        tokio::spawn(drive(
            config,
            socket,
            command_rx,
            message_tx,
            Arc::clone(&connected),
            Arc::clone(&closed),
        ));

        Ok((
            Self {
                command_tx,
                connected,
                closed,
            },
            message_rx,
        ))
    }

    /// Fire-and-forget send; never fails
    pub fn send(&self, message: ClientMessage) {
        if !self.connected.load(Ordering::SeqCst) {
            warn!("Caption channel not connected; dropping outbound message");
            return;
        }
        if self.command_tx.send(Command::Send(message)).is_err() {
            warn!("Caption channel task stopped; dropping outbound message");
        }
    }

    /// Graceful shutdown: sends a normal-closure frame and permanently
    /// suppresses reconnection.
    pub fn disconnect(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(Command::Close);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

async fn open_socket(config: &ChannelConfig) -> Result<Socket> {
    let (socket, _response) = timeout(config.connect_timeout, connect_async(config.url.as_str()))
        .await
        .context("Connection attempt timed out")?
        .context("Failed to connect to caption endpoint")?;

    Ok(socket)
}

async fn drive(
    config: ChannelConfig,
    mut socket: Socket,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    message_tx: mpsc::UnboundedSender<ServerMessage>,
    connected: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
) {
    loop {
        let closure = pump(&mut socket, &mut command_rx, &message_tx).await;
        connected.store(false, Ordering::SeqCst);

        match closure {
            Closure::Normal => {
                debug!("Caption channel closed normally");
                break;
            }
            Closure::Abnormal(detail) => {
                if closed.load(Ordering::SeqCst) || !config.auto_reconnect {
                    break;
                }

                warn!(
                    "Caption channel lost ({}); reconnecting in {:?}",
                    detail, config.reconnect_delay
                );
                sleep(config.reconnect_delay).await;

                // disconnect() may have raced with the backoff
                if closed.load(Ordering::SeqCst) {
                    break;
                }

                match open_socket(&config).await {
                    Ok(new_socket) => {
                        socket = new_socket;
                        connected.store(true, Ordering::SeqCst);
                        info!("Caption channel reconnected");
                    }
                    Err(e) => {
                        warn!("Reconnect failed: {}", e);
                        break;
                    }
                }
            }
        }
    }
}

/// Pump one established socket until it closes, forwarding inbound messages
/// and outbound commands.
async fn pump(
    socket: &mut Socket,
    command_rx: &mut mpsc::UnboundedReceiver<Command>,
    message_tx: &mpsc::UnboundedSender<ServerMessage>,
) -> Closure {
    loop {
        tokio::select! {
            command = command_rx.recv() => match command {
                Some(Command::Send(message)) => match serde_json::to_string(&message) {
                    Ok(json) => {
                        if let Err(e) = socket.send(Message::Text(json)).await {
                            return Closure::Abnormal(e.to_string());
                        }
                    }
                    Err(e) => warn!("Failed to encode outbound message: {}", e),
                },
                Some(Command::Close) => {
                    let _ = socket
                        .close(Some(CloseFrame {
                            code: CloseCode::Normal,
                            reason: "client disconnect".into(),
                        }))
                        .await;
                    return Closure::Normal;
                }
                None => {
                    // Channel handle dropped; treat like an explicit disconnect
                    let _ = socket.close(None).await;
                    return Closure::Normal;
                }
            },
            frame = socket.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ServerMessage>(&text) {
                        // Receiver may be gone; the connection stays up
                        Ok(message) => {
                            let _ = message_tx.send(message);
                        }
                        Err(e) => warn!("Unrecognized inbound message: {}", e),
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    return match frame {
                        Some(frame) if frame.code == CloseCode::Normal => Closure::Normal,
                        Some(frame) => Closure::Abnormal(format!("close code {}", frame.code)),
                        None => Closure::Abnormal("closed without a status code".to_string()),
                    };
                }
                // Ping/pong are answered by the transport
                Some(Ok(_)) => {}
                Some(Err(e)) => return Closure::Abnormal(e.to_string()),
                None => return Closure::Abnormal("connection dropped".to_string()),
            },
        }
    }
}

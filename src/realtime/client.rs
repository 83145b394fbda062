// src/realtime/client.rs
//
// Push-channel client: maintains one websocket connection to the pub/sub
// broker, one channel subscription at a time, and delivers
// "something changed, go re-fetch" signals to the registered callback.

use crate::auth::CredentialStore;
use crate::config::ApiConfig;
use crate::realtime::protocol::{self, Frame};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Real-time service is not configured")]
    NotConfigured,

    #[error("Not connected to the real-time service")]
    NotConnected,

    #[error("No current user")]
    NoCurrentUser,

    #[error("Connection handshake failed: {0}")]
    Handshake(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Invoked on every update signal. Implementations are expected to spawn
/// their own async work; the read loop never blocks on the callback.
pub type UpdateCallback = Arc<dyn Fn() + Send + Sync>;

/// Seam for the synchronization store; lets tests substitute a stub.
#[async_trait]
pub trait PushChannel: Send + Sync {
    async fn connect(&self) -> Result<(), PushError>;
    async fn subscribe_to_updates(&self, on_update: UpdateCallback) -> Result<(), PushError>;
    async fn disconnect(&self);
}

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

struct Subscription {
    channel: String,
    on_update: UpdateCallback,
}

pub struct PusherClient {
    endpoint: String,
    configured: bool,
    credentials: Arc<CredentialStore>,
    writer: Arc<Mutex<Option<WsWriter>>>,
    subscription: Arc<RwLock<Option<Subscription>>>,
    reader_task: Mutex<Option<JoinHandle<()>>>,
}

impl PusherClient {
    pub fn new(config: &ApiConfig, credentials: Arc<CredentialStore>) -> Self {
        Self {
            endpoint: protocol::connection_url(&config.pusher_key, &config.pusher_cluster),
            configured: !config.pusher_key.is_empty(),
            credentials,
            writer: Arc::new(Mutex::new(None)),
            subscription: Arc::new(RwLock::new(None)),
            reader_task: Mutex::new(None),
        }
    }

    /// Connect to an explicit websocket endpoint. Used by tests against
    /// an in-process broker.
    pub fn with_endpoint(endpoint: String, credentials: Arc<CredentialStore>) -> Self {
        Self {
            endpoint,
            configured: true,
            credentials,
            writer: Arc::new(Mutex::new(None)),
            subscription: Arc::new(RwLock::new(None)),
            reader_task: Mutex::new(None),
        }
    }

    /// Wait for the broker's connection-established frame before the
    /// connection is considered usable.
    async fn handshake(
        stream: &mut WebSocketStream<MaybeTlsStream<TcpStream>>,
    ) -> Result<(), PushError> {
        let wait = timeout(HANDSHAKE_TIMEOUT, async {
            while let Some(message) = stream.next().await {
                let message = message.map_err(|e| PushError::Transport(e.to_string()))?;
                if let Message::Text(text) = message {
                    if let Some(frame) = Frame::parse(&text) {
                        match frame.event.as_str() {
                            protocol::CONNECTION_ESTABLISHED => {
                                let data = protocol::nested_data(&frame.data);
                                debug!(socket_id = ?data.get("socket_id"), "Connection established");
                                return Ok(());
                            }
                            protocol::ERROR => {
                                return Err(PushError::Handshake(
                                    protocol::nested_data(&frame.data).to_string(),
                                ));
                            }
                            _ => {}
                        }
                    }
                }
            }
            Err(PushError::Handshake("connection closed during handshake".to_string()))
        })
        .await;

        match wait {
            Ok(result) => result,
            Err(_) => Err(PushError::Handshake("handshake timed out".to_string())),
        }
    }

    fn spawn_read_loop(
        &self,
        mut reader: WsReader,
        writer: Arc<Mutex<Option<WsWriter>>>,
        subscription: Arc<RwLock<Option<Subscription>>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(message) = reader.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let Some(frame) = Frame::parse(&text) else {
                            debug!("Ignoring unparseable frame");
                            continue;
                        };
                        match frame.event.as_str() {
                            protocol::PING => {
                                let mut writer = writer.lock().await;
                                if let Some(writer) = writer.as_mut() {
                                    let _ = writer
                                        .send(Message::Text(protocol::pong_frame()))
                                        .await;
                                }
                            }
                            protocol::UPDATE_EVENT => {
                                let subscription = subscription.read().await;
                                if let Some(sub) = subscription.as_ref() {
                                    if frame.channel.as_deref() == Some(sub.channel.as_str()) {
                                        debug!(channel = %sub.channel, "Update signal received");
                                        (sub.on_update)();
                                    }
                                }
                            }
                            protocol::SUBSCRIPTION_SUCCEEDED => {
                                info!(channel = ?frame.channel, "Channel subscription succeeded");
                            }
                            protocol::ERROR => {
                                warn!(data = ?frame.data, "Broker reported an error");
                            }
                            // Unknown event names are received but ignored;
                            // new server-side events must not break us.
                            other => {
                                debug!(event = other, "Ignoring event");
                            }
                        }
                    }
                    Ok(Message::Ping(payload)) => {
                        let mut writer = writer.lock().await;
                        if let Some(writer) = writer.as_mut() {
                            let _ = writer.send(Message::Pong(payload)).await;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Real-time read failed");
                        break;
                    }
                }
            }
            info!("Real-time connection closed");
        })
    }
}

#[async_trait]
impl PushChannel for PusherClient {
    async fn connect(&self) -> Result<(), PushError> {
        if !self.configured {
            return Err(PushError::NotConfigured);
        }

        // Re-initializing tears down any previous connection first.
        self.disconnect().await;

        info!("Connecting to real-time service");
        let (mut stream, _) = connect_async(&self.endpoint)
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;
        Self::handshake(&mut stream).await?;

        let (write_half, read_half) = stream.split();
        *self.writer.lock().await = Some(write_half);

        let task =
            self.spawn_read_loop(read_half, self.writer.clone(), self.subscription.clone());
        *self.reader_task.lock().await = Some(task);

        info!("Real-time connection ready");
        Ok(())
    }

    async fn subscribe_to_updates(&self, on_update: UpdateCallback) -> Result<(), PushError> {
        let user = self
            .credentials
            .get_user()
            .await
            .ok_or(PushError::NoCurrentUser)?;
        let channel = protocol::channel_for_user(user.id);

        let mut writer = self.writer.lock().await;
        let writer = writer.as_mut().ok_or(PushError::NotConnected)?;

        // Never two concurrent subscriptions on this client: tear down
        // the previous channel before subscribing to the new one.
        let mut subscription = self.subscription.write().await;
        if let Some(previous) = subscription.take() {
            debug!(channel = %previous.channel, "Unsubscribing previous channel");
            writer
                .send(Message::Text(protocol::unsubscribe_frame(&previous.channel)))
                .await
                .map_err(|e| PushError::Transport(e.to_string()))?;
        }

        info!(channel = %channel, "Subscribing to channel");
        writer
            .send(Message::Text(protocol::subscribe_frame(&channel)))
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        *subscription = Some(Subscription { channel, on_update });
        Ok(())
    }

    /// Valid from any state, idempotent.
    async fn disconnect(&self) {
        let subscription = self.subscription.write().await.take();
        let mut writer = self.writer.lock().await;
        if let Some(mut write_half) = writer.take() {
            if let Some(sub) = subscription {
                debug!(channel = %sub.channel, "Unsubscribing channel");
                let _ = write_half
                    .send(Message::Text(protocol::unsubscribe_frame(&sub.channel)))
                    .await;
            }
            info!("Closing real-time connection");
            let _ = write_half.close().await;
        }
        drop(writer);

        if let Some(task) = self.reader_task.lock().await.take() {
            task.abort();
        }
    }
}

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Author of an inbound transport message.
pub struct MessageAuthor {
    pub id: u64,
    pub display_name: String,
    pub is_bot: bool,
    pub is_webhook: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One raw message delivered by the transport, before qualification.
pub struct InboundMessage {
    pub id: u64,
    pub author: MessageAuthor,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub content: String,
}

#[derive(Debug, Clone)]
/// Enumerates supported `TransportEvent` values.
pub enum TransportEvent {
    /// Connection established and session usable. Fires at least once.
    Ready,
    MessageReceived(InboundMessage),
    LatencyUpdated { old_ms: u64, new_ms: u64 },
    /// Unexpected connection loss. Treated as unrecoverable by design.
    Disconnected { reason: String },
    /// Diagnostic passthrough from the transport SDK.
    Log { source: String, message: String },
}

#[derive(Debug, Error)]
/// Errors surfaced by transport operations.
pub enum TransportError {
    #[error("login failed: {0}")]
    Login(String),
    #[error("start failed: {0}")]
    Start(String),
    #[error("send failed: {0}")]
    Send(String),
    #[error("logout failed: {0}")]
    Logout(String),
}

#[async_trait]
/// Trait contract for the real-time chat transport.
///
/// The returned receiver is the event subscription handle; dropping it
/// deregisters the subscriber. The runtime holds exactly one for its
/// lifetime and drops it during shutdown.
pub trait ChatTransport: Send + Sync {
    fn subscribe(&self) -> mpsc::Receiver<TransportEvent>;
    /// Id of the account the bot runs as, for mention-prefix matching.
    fn current_user_id(&self) -> u64;
    async fn login(&self) -> Result<(), TransportError>;
    async fn start(&self) -> Result<(), TransportError>;
    async fn logout(&self) -> Result<(), TransportError>;
    async fn set_presence(&self, text: &str) -> Result<(), TransportError>;
    async fn send_message(&self, channel_id: u64, text: &str) -> Result<(), TransportError>;
}

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// A message received from any platform
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Platform identifier (e.g., "telegram")
    pub platform: String,
    /// Platform-specific user ID as string
    pub user_id: String,
    /// Platform-specific chat/channel ID as string
    pub chat_id: String,
    /// Platform-specific message ID, used when quoting the message
    pub message_id: String,
    /// Display name of the user
    pub user_name: String,
    /// The message text, `None` for photos, stickers and other non-text payloads
    pub text: Option<String>,
}

/// How the platform should render a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    Html,
    Plain,
}

/// A single outbound reply produced by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: ReplyFormat,
    /// Send as a reply quoting the inbound message
    pub quote: bool,
}

impl Reply {
    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Html,
            quote: false,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Plain,
            quote: false,
        }
    }

    pub fn quoted(mut self) -> Self {
        self.quote = true;
        self
    }
}

/// Outbound side of a platform, bound to the chat the inbound message came from
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn send(&self, reply: &Reply) -> Result<()>;
}

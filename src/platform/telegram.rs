use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ParseMode, ReplyParameters};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

use crate::config::TelegramConfig;
use crate::platform::{IncomingMessage, Reply, ReplyFormat, ReplySink};
use crate::router::{self, Command};

/// Telegram rejects messages longer than 4096 chars; leave some headroom.
const MAX_CHUNK_LEN: usize = 4000;

/// Read-only state shared by every handler invocation
struct BotContext {
    bot_username: String,
}

/// Split long messages for Telegram's 4096 char limit
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + max_len).min(text.len());
        // Walk back to a valid UTF-8 char boundary so slicing doesn't panic
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }
        let actual_end = if end < text.len() {
            text[start..end]
                .rfind('\n')
                .or_else(|| text[start..end].rfind(' '))
                .map(|pos| start + pos + 1)
                .unwrap_or(end)
        } else {
            end
        };

        chunks.push(text[start..actual_end].to_string());
        start = actual_end;
    }

    // Telegram rejects whitespace-only messages
    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

/// An empty allow-list lets everyone through.
fn is_allowed(allowed_user_ids: &[u64], user_id: Option<u64>) -> bool {
    if allowed_user_ids.is_empty() {
        return true;
    }
    user_id.is_some_and(|id| allowed_user_ids.contains(&id))
}

fn to_incoming(msg: &Message) -> IncomingMessage {
    let user_name = msg
        .from
        .as_ref()
        .map(|user| user.first_name.clone())
        .or_else(|| msg.chat.title().map(str::to_string))
        .unwrap_or_default();

    IncomingMessage {
        platform: "telegram".to_string(),
        user_id: msg
            .from
            .as_ref()
            .map(|user| user.id.0.to_string())
            .unwrap_or_default(),
        chat_id: msg.chat.id.0.to_string(),
        message_id: msg.id.0.to_string(),
        user_name,
        text: msg.text().map(str::to_string),
    }
}

/// Sends replies into the chat a message came from
struct TelegramReply {
    bot: Bot,
    chat_id: ChatId,
    message_id: MessageId,
}

impl TelegramReply {
    fn new(bot: Bot, msg: &Message) -> Self {
        Self {
            bot,
            chat_id: msg.chat.id,
            message_id: msg.id,
        }
    }
}

#[async_trait]
impl ReplySink for TelegramReply {
    async fn send(&self, reply: &Reply) -> Result<()> {
        for (i, chunk) in split_message(&reply.text, MAX_CHUNK_LEN)
            .into_iter()
            .enumerate()
        {
            let mut request = self.bot.send_message(self.chat_id, chunk);
            if reply.format == ReplyFormat::Html {
                request = request.parse_mode(ParseMode::Html);
            }
            if reply.quote && i == 0 {
                request = request.reply_parameters(ReplyParameters::new(self.message_id));
            }
            request
                .await
                .with_context(|| format!("Failed to send reply to chat {}", self.chat_id.0))?;
        }
        Ok(())
    }
}

/// Run the Telegram bot platform
pub async fn run(config: &TelegramConfig) -> Result<()> {
    let bot = Bot::new(&config.bot_token);

    info!("Starting Telegram platform...");

    let me = bot
        .get_me()
        .await
        .context("Failed to fetch bot identity, check the bot token")?;
    info!("Authorized as @{}", me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register command list: {}", e);
    }

    let ctx = Arc::new(BotContext {
        bot_username: me.username().to_string(),
    });

    let allowed_user_ids = config.allowed_user_ids.clone();
    if !allowed_user_ids.is_empty() {
        info!("Restricting bot to users: {:?}", allowed_user_ids);
    }

    let handler = Update::filter_message()
        .filter_map(move |msg: Message| {
            let user_id = msg.from.as_ref().map(|user| user.id.0);
            if is_allowed(&allowed_user_ids, user_id) {
                Some(msg)
            } else {
                None
            }
        })
        .endpoint(handle_message);

    info!("Bot started successfully!");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![ctx])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, ctx: Arc<BotContext>) -> Result<()> {
    let incoming = to_incoming(&msg);
    let sink = TelegramReply::new(bot, &msg);
    router::handle(&incoming, &ctx.bot_username, &sink).await
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use teloxide::utils::command::BotCommands;
use teloxide::utils::html;
use tracing::info;

use crate::platform::{IncomingMessage, Reply, ReplySink};

/// Commands the bot answers with a canned response
#[derive(BotCommands, Clone, Copy, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Show this help message")]
    Help,
    #[command(description = "About this bot")]
    About,
    #[command(description = "Show current date and time")]
    Date,
}

impl Command {
    /// Parse the leading token of `text` as a command.
    ///
    /// Only the first token is considered, so `/start payload` is still `/start`.
    /// A `@mention` suffix must name `bot_name`.
    pub fn parse_token(text: &str, bot_name: &str) -> Option<Self> {
        let token = text.split(char::is_whitespace).next()?;
        if !token.starts_with('/') {
            return None;
        }
        <Self as BotCommands>::parse(token, bot_name).ok()
    }
}

pub fn start_text(user_name: &str) -> String {
    format!(
        "👋 <b>Hello, {}!</b>\n\n\
         I'm a Telegram bot built with teloxide.\n\
         Send /help to see available commands.",
        html::escape(user_name)
    )
}

pub fn help_text() -> String {
    "<b>📚 Available Commands:</b>\n\n\
     /start - Start the bot\n\
     /help - Show this help message\n\
     /about - About this bot\n\
     /date - Show current date and time\n\n\
     Just send me any message and I'll echo it back!"
        .to_string()
}

pub fn about_text() -> String {
    format!(
        "<b>🤖 About This Bot</b>\n\n\
         Framework: teloxide\n\
         Language: Rust\n\
         Version: {}\n\n\
         Built with ❤️ using the telegram-bot-base template",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn date_text(now: DateTime<Utc>) -> String {
    format!(
        "📅 Current date and time: {}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

pub fn echo_text(text: &str) -> String {
    format!("You said: {}", text)
}

pub fn unsupported_text() -> String {
    "I can only handle text messages for now. 📝".to_string()
}

/// What an inbound message asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Command(Command),
    Text,
    NonText,
}

impl MessageKind {
    pub fn of(msg: &IncomingMessage, bot_name: &str) -> Self {
        match msg.text.as_deref() {
            None => Self::NonText,
            Some(text) => Command::parse_token(text, bot_name)
                .map(Self::Command)
                .unwrap_or(Self::Text),
        }
    }
}

fn reply_for(kind: MessageKind, msg: &IncomingMessage, now: DateTime<Utc>) -> Reply {
    match kind {
        MessageKind::Command(Command::Start) => Reply::html(start_text(&msg.user_name)),
        MessageKind::Command(Command::Help) => Reply::html(help_text()),
        MessageKind::Command(Command::About) => Reply::html(about_text()),
        MessageKind::Command(Command::Date) => Reply::html(date_text(now)),
        MessageKind::Text => Reply::plain(echo_text(msg.text.as_deref().unwrap_or_default())),
        MessageKind::NonText => Reply::plain(unsupported_text()).quoted(),
    }
}

/// Pick the single reply for an inbound message
pub fn route(msg: &IncomingMessage, bot_name: &str, now: DateTime<Utc>) -> Reply {
    reply_for(MessageKind::of(msg, bot_name), msg, now)
}

/// Route the message and send exactly one reply through `sink`
pub async fn handle<S>(msg: &IncomingMessage, bot_name: &str, sink: &S) -> Result<()>
where
    S: ReplySink + ?Sized,
{
    let kind = MessageKind::of(msg, bot_name);
    info!(
        "{} message {} from {} ({}) in chat {}: {:?}",
        msg.platform, msg.message_id, msg.user_name, msg.user_id, msg.chat_id, kind
    );

    let reply = reply_for(kind, msg, Utc::now());
    sink.send(&reply).await
}

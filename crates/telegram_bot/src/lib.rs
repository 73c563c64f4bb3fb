//! Telegram bot.
//!
//! Every incoming message is answered from a fresh financial snapshot: the
//! bot fetches the month-to-date context, hands it to the assistant together
//! with the user's question, and replies with text or a rendered chart. No
//! conversation state is kept between messages.

use teloxide::prelude::*;

pub mod assistant;
mod charts;
mod commands;
mod handlers;

const DEFAULT_ASSISTANT_MODEL: &str = "gemini-2.0-flash";

/// Chats allowed to talk to the bot. Immutable after startup; an empty list
/// denies everyone.
#[derive(Clone, Debug, Default)]
pub struct AllowList {
    chats: Vec<ChatId>,
}

impl AllowList {
    pub fn new(chat_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            chats: chat_ids.into_iter().map(ChatId).collect(),
        }
    }

    pub fn is_authorized(&self, chat_id: ChatId) -> bool {
        if self.chats.is_empty() {
            tracing::warn!("no allowed chat ids configured, denying access");
            return false;
        }
        self.chats.contains(&chat_id)
    }
}

#[derive(Clone)]
pub struct ConfigParameters {
    allow_list: AllowList,
    api: organizze::Client,
    assistant: assistant::Assistant,
}

pub struct Bot {
    token: String,
    allow_list: AllowList,
    api: organizze::Client,
    assistant: assistant::Assistant,
}

impl Bot {
    pub fn new(
        token: &str,
        allow_list: AllowList,
        api: organizze::Client,
        assistant: assistant::Assistant,
    ) -> Self {
        Self {
            token: token.to_string(),
            allow_list,
            api,
            assistant,
        }
    }

    pub fn builder() -> BotBuilder {
        BotBuilder::default()
    }

    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let parameters = ConfigParameters {
            allow_list: self.allow_list.clone(),
            api: self.api.clone(),
            assistant: self.assistant.clone(),
        };

        let handler =
            dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[derive(Default, Debug)]
pub struct BotBuilder {
    token: String,
    allowed_chat_ids: Vec<i64>,
    organizze_email: String,
    organizze_api_key: String,
    assistant_api_key: String,
    assistant_model: Option<String>,
}

impl BotBuilder {
    pub fn token(mut self, token: &str) -> BotBuilder {
        self.token = token.to_string();
        self
    }

    pub fn allowed_chat_ids(mut self, chat_ids: Vec<i64>) -> BotBuilder {
        self.allowed_chat_ids = chat_ids;
        self
    }

    pub fn organizze(mut self, email: &str, api_key: &str) -> BotBuilder {
        self.organizze_email = email.to_string();
        self.organizze_api_key = api_key.to_string();
        self
    }

    pub fn assistant(mut self, api_key: &str, model: Option<String>) -> BotBuilder {
        self.assistant_api_key = api_key.to_string();
        self.assistant_model = model;
        self
    }

    pub fn build(self) -> Result<Bot, String> {
        tracing::info!("Initializing telegram bot...");

        let api = organizze::Client::new(&self.organizze_email, &self.organizze_api_key)
            .map_err(|err| format!("failed to build organizze client: {err}"))?;

        let model = self
            .assistant_model
            .unwrap_or_else(|| DEFAULT_ASSISTANT_MODEL.to_string());
        let assistant = assistant::Assistant::new(&self.assistant_api_key, &model)
            .map_err(|err| format!("failed to build assistant client: {err}"))?;

        Ok(Bot::new(
            &self.token,
            AllowList::new(self.allowed_chat_ids),
            api,
            assistant,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allow_list_denies_everyone() {
        let list = AllowList::default();
        assert!(!list.is_authorized(ChatId(42)));
    }

    #[test]
    fn only_listed_chats_are_authorized() {
        let list = AllowList::new([42, 77]);
        assert!(list.is_authorized(ChatId(42)));
        assert!(list.is_authorized(ChatId(77)));
        assert!(!list.is_authorized(ChatId(1)));
    }
}

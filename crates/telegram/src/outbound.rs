use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use stenbot_core::dialogue::MessageIntent;
use stenbot_core::session::ConversationId;

use crate::events::encode_choice;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport request failed: {0}")]
    Request(String),
    #[error("telegram api rejected the call ({status}): {description}")]
    Api { status: u16, description: String },
    #[error("telegram api response could not be parsed: {0}")]
    InvalidResponse(String),
}

/// Delivery seam between the dispatch workers and Telegram. Workers only
/// ever see this trait, so tests swap in recording or failing senders.
#[async_trait]
pub trait OutboundSender: Send + Sync {
    async fn send_message(
        &self,
        conversation_id: ConversationId,
        intent: &MessageIntent,
    ) -> Result<(), TransportError>;

    async fn acknowledge_callback(&self, callback_query_id: &str) -> Result<(), TransportError>;
}

/// Sender that drops everything. Used in tests and as a bootstrap default.
#[derive(Default)]
pub struct NoopSender;

#[async_trait]
impl OutboundSender for NoopSender {
    async fn send_message(
        &self,
        _conversation_id: ConversationId,
        _intent: &MessageIntent,
    ) -> Result<(), TransportError> {
        Ok(())
    }

    async fn acknowledge_callback(&self, _callback_query_id: &str) -> Result<(), TransportError> {
        Ok(())
    }
}

#[derive(Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<ReplyMarkup>,
}

#[derive(Serialize)]
struct ReplyMarkup {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Serialize)]
struct InlineButton {
    text: String,
    callback_data: String,
}

#[derive(Serialize)]
struct AnswerCallbackPayload<'a> {
    callback_query_id: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Bot API client over HTTPS. One button per keyboard row, matching how
/// the dialogue presents short labelled options.
pub struct TelegramApiSender {
    http: reqwest::Client,
    api_base_url: String,
    bot_token: String,
}

impl TelegramApiSender {
    pub fn new(http: reqwest::Client, api_base_url: String, bot_token: String) -> Self {
        Self { http, api_base_url, bot_token }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base_url.trim_end_matches('/'), self.bot_token)
    }

    async fn call<T: Serialize>(&self, method: &str, payload: &T) -> Result<(), TransportError> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|error| TransportError::Request(error.to_string()))?;

        let status = response.status().as_u16();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|error| TransportError::InvalidResponse(error.to_string()))?;
        if !body.ok {
            return Err(TransportError::Api {
                status,
                description: body.description.unwrap_or_else(|| "no description".to_owned()),
            });
        }
        debug!(event_name = "egress.telegram.api_call", method, "telegram api call succeeded");
        Ok(())
    }
}

fn reply_markup(intent: &MessageIntent) -> Option<ReplyMarkup> {
    if intent.options.is_empty() {
        return None;
    }
    let rows = intent
        .options
        .iter()
        .map(|(label, choice)| {
            vec![InlineButton { text: label.clone(), callback_data: encode_choice(choice) }]
        })
        .collect();
    Some(ReplyMarkup { inline_keyboard: rows })
}

#[async_trait]
impl OutboundSender for TelegramApiSender {
    async fn send_message(
        &self,
        conversation_id: ConversationId,
        intent: &MessageIntent,
    ) -> Result<(), TransportError> {
        let payload = SendMessagePayload {
            chat_id: conversation_id.0,
            text: &intent.text,
            reply_markup: reply_markup(intent),
        };
        self.call("sendMessage", &payload).await
    }

    async fn acknowledge_callback(&self, callback_query_id: &str) -> Result<(), TransportError> {
        self.call("answerCallbackQuery", &AnswerCallbackPayload { callback_query_id }).await
    }
}

#[cfg(test)]
mod tests {
    use stenbot_core::dialogue::{Choice, MessageIntent};

    use super::{reply_markup, SendMessagePayload};

    #[test]
    fn plain_text_sends_without_a_keyboard() {
        let intent = MessageIntent::text("Enter the wall width.");
        let payload =
            SendMessagePayload { chat_id: 42, text: &intent.text, reply_markup: reply_markup(&intent) };

        let json = serde_json::to_value(&payload).expect("payload json");

        assert_eq!(json["chat_id"], 42);
        assert_eq!(json["text"], "Enter the wall width.");
        assert!(json.get("reply_markup").is_none());
    }

    #[test]
    fn options_render_as_one_button_per_row() {
        let intent = MessageIntent::with_options(
            "Calculate another material?",
            vec![
                ("Yes".to_owned(), Choice::AddAnotherMaterial(true)),
                ("No".to_owned(), Choice::AddAnotherMaterial(false)),
            ],
        );

        let markup = serde_json::to_value(reply_markup(&intent).expect("keyboard"))
            .expect("markup json");
        let rows = markup["inline_keyboard"].as_array().expect("rows");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0]["text"], "Yes");
        assert_eq!(rows[0][0]["callback_data"], "add_material|yes");
        assert_eq!(rows[1][0]["callback_data"], "add_material|no");
    }
}

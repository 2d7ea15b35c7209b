use serde::Deserialize;
use thiserror::Error;

use stenbot_core::catalog::{PanelProduct, ProfileKind, SlatKind, ThreeDVariant};
use stenbot_core::dialogue::{Category, Choice, Event};
use stenbot_core::input::Unit;
use stenbot_core::session::{ConversationId, HeightMode};

/// A Telegram `Update` object, reduced to the fields the bot consumes.
/// Unknown fields are ignored so new API additions never break decoding.
#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub message: Option<IncomingMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

/// One inbound event, already attributed to a conversation and normalized
/// into the dialogue engine's event vocabulary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub conversation_id: ConversationId,
    pub event: Event,
    /// Present when the event came from an inline keyboard press; the
    /// transport must acknowledge it via `answerCallbackQuery`.
    pub callback_query_id: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventDecodeError {
    #[error("callback data carries an unknown action token: `{0}`")]
    UnknownAction(String),
    #[error("callback data argument could not be parsed: `{0}`")]
    BadArgument(String),
    #[error("callback query {0} has no originating chat")]
    MissingChat(String),
    #[error("callback query {0} carries no data")]
    MissingData(String),
}

/// Turn a raw Telegram update into a dialogue event, if it carries one.
/// Service updates the bot does not consume (edits, channel posts, empty
/// messages) decode to `None` and are acknowledged without dispatch.
pub fn decode_update(update: &Update) -> Result<Option<InboundEvent>, EventDecodeError> {
    if let Some(callback) = &update.callback_query {
        let chat_id = callback
            .message
            .as_ref()
            .map(|message| message.chat.id)
            .ok_or_else(|| EventDecodeError::MissingChat(callback.id.clone()))?;
        let data = callback
            .data
            .as_deref()
            .ok_or_else(|| EventDecodeError::MissingData(callback.id.clone()))?;
        let choice = decode_choice(data)?;
        return Ok(Some(InboundEvent {
            conversation_id: ConversationId(chat_id),
            event: Event::Choice(choice),
            callback_query_id: Some(callback.id.clone()),
        }));
    }

    if let Some(message) = &update.message {
        let Some(text) = message.text.as_deref() else {
            return Ok(None);
        };
        let event = match text.trim() {
            "" => return Ok(None),
            "/start" => Event::Choice(Choice::StartOver),
            text => Event::FreeText(text.to_owned()),
        };
        return Ok(Some(InboundEvent {
            conversation_id: ConversationId(message.chat.id),
            event,
            callback_query_id: None,
        }));
    }

    Ok(None)
}

/// Encode a choice as inline-keyboard callback data. `decode_choice` is the
/// exact inverse; Telegram limits callback data to 64 bytes, which every
/// token here fits well within.
pub fn encode_choice(choice: &Choice) -> String {
    match choice {
        Choice::StartCalculation => "start".to_owned(),
        Choice::PickCategory(category) => format!("cat|{}", category_token(*category)),
        Choice::PickProduct(product) => format!("product|{}", product_token(*product)),
        Choice::PickThickness(mm) => format!("thickness|{mm}"),
        Choice::PickLength(mm) => format!("length|{mm}"),
        Choice::CustomName(yes) => format!("custom_name|{}", yes_no(*yes)),
        Choice::PickProfileThickness(mm) => format!("profile_thickness|{mm}"),
        Choice::PickProfileKind(kind) => format!("profile_kind|{}", profile_kind_token(*kind)),
        Choice::PickSlatKind(SlatKind::Wpc) => "slat|wpc".to_owned(),
        Choice::PickSlatKind(SlatKind::Wood) => "slat|wood".to_owned(),
        Choice::PickThreeDVariant(ThreeDVariant::Size600x1200) => "three_d|600x1200".to_owned(),
        Choice::PickThreeDVariant(ThreeDVariant::Size1200x3000) => "three_d|1200x3000".to_owned(),
        Choice::AddAnotherMaterial(yes) => format!("add_material|{}", yes_no(*yes)),
        Choice::PickUnit(Unit::Metres) => "unit|m".to_owned(),
        Choice::PickUnit(Unit::Millimetres) => "unit|mm".to_owned(),
        Choice::AnotherOpening(yes) => format!("opening|{}", yes_no(*yes)),
        Choice::PickHeightMode(HeightMode::Room) => "height_mode|room".to_owned(),
        Choice::PickHeightMode(HeightMode::Material) => "height_mode|material".to_owned(),
        Choice::SendToAdmin => "send".to_owned(),
        Choice::StartOver => "restart".to_owned(),
    }
}

pub fn decode_choice(data: &str) -> Result<Choice, EventDecodeError> {
    let (action, argument) = match data.split_once('|') {
        Some((action, argument)) => (action, Some(argument)),
        None => (data, None),
    };

    let bad = || EventDecodeError::BadArgument(data.to_owned());

    let choice = match (action, argument) {
        ("start", None) => Choice::StartCalculation,
        ("send", None) => Choice::SendToAdmin,
        ("restart", None) => Choice::StartOver,
        ("cat", Some(token)) => Choice::PickCategory(parse_category(token).ok_or_else(bad)?),
        ("product", Some(token)) => Choice::PickProduct(parse_product(token).ok_or_else(bad)?),
        ("thickness", Some(raw)) => Choice::PickThickness(raw.parse().map_err(|_| bad())?),
        ("length", Some(raw)) => Choice::PickLength(raw.parse().map_err(|_| bad())?),
        ("custom_name", Some(raw)) => Choice::CustomName(parse_yes_no(raw).ok_or_else(bad)?),
        ("profile_thickness", Some(raw)) => {
            Choice::PickProfileThickness(raw.parse().map_err(|_| bad())?)
        }
        ("profile_kind", Some(token)) => {
            Choice::PickProfileKind(parse_profile_kind(token).ok_or_else(bad)?)
        }
        ("slat", Some("wpc")) => Choice::PickSlatKind(SlatKind::Wpc),
        ("slat", Some("wood")) => Choice::PickSlatKind(SlatKind::Wood),
        ("three_d", Some("600x1200")) => Choice::PickThreeDVariant(ThreeDVariant::Size600x1200),
        ("three_d", Some("1200x3000")) => Choice::PickThreeDVariant(ThreeDVariant::Size1200x3000),
        ("add_material", Some(raw)) => {
            Choice::AddAnotherMaterial(parse_yes_no(raw).ok_or_else(bad)?)
        }
        ("unit", Some("m")) => Choice::PickUnit(Unit::Metres),
        ("unit", Some("mm")) => Choice::PickUnit(Unit::Millimetres),
        ("opening", Some(raw)) => Choice::AnotherOpening(parse_yes_no(raw).ok_or_else(bad)?),
        ("height_mode", Some("room")) => Choice::PickHeightMode(HeightMode::Room),
        ("height_mode", Some("material")) => Choice::PickHeightMode(HeightMode::Material),
        ("slat" | "three_d" | "unit" | "height_mode", Some(_)) => return Err(bad()),
        _ => return Err(EventDecodeError::UnknownAction(data.to_owned())),
    };
    Ok(choice)
}

fn yes_no(yes: bool) -> &'static str {
    if yes {
        "yes"
    } else {
        "no"
    }
}

fn parse_yes_no(raw: &str) -> Option<bool> {
    match raw {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

fn category_token(category: Category) -> &'static str {
    match category {
        Category::WallPanels => "wall_panels",
        Category::Spc => "spc",
        Category::Profiles => "profiles",
        Category::Slats => "slats",
        Category::ThreeD => "three_d",
    }
}

fn parse_category(token: &str) -> Option<Category> {
    match token {
        "wall_panels" => Some(Category::WallPanels),
        "spc" => Some(Category::Spc),
        "profiles" => Some(Category::Profiles),
        "slats" => Some(Category::Slats),
        "three_d" => Some(Category::ThreeD),
        _ => None,
    }
}

fn product_token(product: PanelProduct) -> &'static str {
    match product {
        PanelProduct::WpcCharcoalBamboo => "wpc_charcoal_bamboo",
        PanelProduct::WpcBamboo => "wpc_bamboo",
        PanelProduct::WpcHighDensity => "wpc_high_density",
        PanelProduct::SpcPanel => "spc_panel",
    }
}

fn parse_product(token: &str) -> Option<PanelProduct> {
    match token {
        "wpc_charcoal_bamboo" => Some(PanelProduct::WpcCharcoalBamboo),
        "wpc_bamboo" => Some(PanelProduct::WpcBamboo),
        "wpc_high_density" => Some(PanelProduct::WpcHighDensity),
        "spc_panel" => Some(PanelProduct::SpcPanel),
        _ => None,
    }
}

fn profile_kind_token(kind: ProfileKind) -> &'static str {
    match kind {
        ProfileKind::Joining => "joining",
        ProfileKind::Finishing => "finishing",
        ProfileKind::OuterCorner => "outer_corner",
    }
}

fn parse_profile_kind(token: &str) -> Option<ProfileKind> {
    match token {
        "joining" => Some(ProfileKind::Joining),
        "finishing" => Some(ProfileKind::Finishing),
        "outer_corner" => Some(ProfileKind::OuterCorner),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use stenbot_core::dialogue::{Choice, Event};
    use stenbot_core::session::ConversationId;

    use super::{decode_choice, decode_update, encode_choice, EventDecodeError, Update};

    fn update_from(json: serde_json::Value) -> Update {
        serde_json::from_value(json).expect("update json")
    }

    #[test]
    fn text_messages_decode_to_free_text() {
        let update = update_from(serde_json::json!({
            "update_id": 1,
            "message": { "chat": { "id": 42 }, "text": "3.2" }
        }));

        let event = decode_update(&update).expect("decode").expect("event");

        assert_eq!(event.conversation_id, ConversationId(42));
        assert_eq!(event.event, Event::FreeText("3.2".to_owned()));
        assert_eq!(event.callback_query_id, None);
    }

    #[test]
    fn start_command_resets_the_dialogue() {
        let update = update_from(serde_json::json!({
            "update_id": 2,
            "message": { "chat": { "id": 42 }, "text": "/start" }
        }));

        let event = decode_update(&update).expect("decode").expect("event");

        assert_eq!(event.event, Event::Choice(Choice::StartOver));
    }

    #[test]
    fn callback_presses_decode_to_choices() {
        let update = update_from(serde_json::json!({
            "update_id": 3,
            "callback_query": {
                "id": "cbq-1",
                "message": { "chat": { "id": 7 } },
                "data": "cat|wall_panels"
            }
        }));

        let event = decode_update(&update).expect("decode").expect("event");

        assert_eq!(event.conversation_id, ConversationId(7));
        assert_eq!(
            event.event,
            Event::Choice(Choice::PickCategory(stenbot_core::dialogue::Category::WallPanels))
        );
        assert_eq!(event.callback_query_id.as_deref(), Some("cbq-1"));
    }

    #[test]
    fn updates_without_payload_are_skipped() {
        let update = update_from(serde_json::json!({
            "update_id": 4,
            "message": { "chat": { "id": 7 } }
        }));

        assert_eq!(decode_update(&update).expect("decode"), None);
    }

    #[test]
    fn unknown_callback_actions_are_rejected() {
        assert_eq!(
            decode_choice("approve|Q-1001"),
            Err(EventDecodeError::UnknownAction("approve|Q-1001".to_owned()))
        );
        assert_eq!(
            decode_choice("thickness|thick"),
            Err(EventDecodeError::BadArgument("thickness|thick".to_owned()))
        );
    }

    #[test]
    fn encoded_tokens_stay_within_telegram_callback_limits() {
        use stenbot_core::catalog::PanelProduct;

        let token = encode_choice(&Choice::PickProduct(PanelProduct::WpcCharcoalBamboo));
        assert_eq!(token, "product|wpc_charcoal_bamboo");
        // Telegram rejects callback data longer than 64 bytes.
        assert!(token.len() <= 64);
        assert_eq!(decode_choice(&token), Ok(Choice::PickProduct(PanelProduct::WpcCharcoalBamboo)));
    }
}

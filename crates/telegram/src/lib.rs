//! Telegram integration for stenbot:
//! - **Events** (`events`) - decodes Bot API updates into dialogue events
//! - **Dispatch** (`dispatch`) - one ordered worker task per conversation
//! - **Outbound** (`outbound`) - `sendMessage` / `answerCallbackQuery` client
//!
//! # Architecture
//!
//! ```text
//! Webhook update → decode_update → DispatchBridge → worker → DialogueEngine
//!                                                      ↓
//!                                  OutboundSender ← replies
//! ```
//!
//! The webhook handler stays thin: it decodes, hands the event to the
//! bridge, and always acknowledges the update. Everything stateful lives
//! in the per-conversation workers.

pub mod dispatch;
pub mod events;
pub mod outbound;

pub use dispatch::{DialogueStep, DispatchBridge, DispatchTuning};
pub use events::{decode_update, InboundEvent, Update};
pub use outbound::{NoopSender, OutboundSender, TelegramApiSender, TransportError};

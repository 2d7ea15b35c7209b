pub mod calc;
pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod input;
pub mod session;

pub use calc::{area_quote, length_quote, piece_quote, CalcError, ReservePolicy};
pub use catalog::{
    Catalog, CatalogError, PanelProduct, PanelVariant, ProfileKind, SlatKind, ThreeDVariant,
};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use dialogue::{
    Category, Choice, DialogueEngine, Event, MessageIntent, Phase, StepOutcome,
};
pub use errors::{ApplicationError, DomainError};
pub use input::{parse_measure, parse_opening, parse_quantity, ParseError, Unit};
pub use session::{
    CalculationResult, ConversationId, HeightMode, Material, Opening, Quantity, Selection, Session,
};

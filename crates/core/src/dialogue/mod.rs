pub mod engine;
pub mod states;

pub use engine::DialogueEngine;
pub use states::{Category, Choice, Event, MessageIntent, OpeningStage, Phase, StepOutcome};

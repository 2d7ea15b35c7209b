use serde::{Deserialize, Serialize};

use crate::catalog::{PanelProduct, ProfileKind, SlatKind, ThreeDVariant};
use crate::input::Unit;
use crate::session::HeightMode;

/// Discrete dialogue step. The variant fully determines which event shapes
/// are legal next and carries the partial selection data that step needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Idle,
    SelectingCategory,
    SelectingPanelProduct,
    SelectingThickness { product: PanelProduct },
    SelectingLength { product: PanelProduct, thickness_mm: Option<u32> },
    ConfirmingCustomName,
    NamingSelection,
    SelectingProfileThickness,
    SelectingProfileKind { thickness_mm: u32 },
    AwaitingProfileQuantity { thickness_mm: u32, kind: ProfileKind },
    SelectingSlatKind,
    SelectingThreeDVariant,
    ChoosingNextStep,
    CollectingUnit,
    CollectingWidth,
    CollectingHeight,
    CollectingOpenings { stage: OpeningStage },
    ChoosingHeightMode,
}

/// The opening loop alternates between the yes/no question and the size
/// entry until the user declines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpeningStage {
    Ask,
    Size,
}

/// Material category shown on the first selection screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    WallPanels,
    Spc,
    Profiles,
    Slats,
    ThreeD,
}

impl Category {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::WallPanels => "WPC wall panels",
            Self::Spc => "SPC panel",
            Self::Profiles => "Profiles",
            Self::Slats => "Slat panels",
            Self::ThreeD => "3D panels",
        }
    }
}

/// Closed set of discrete choice tokens. The transport boundary decodes raw
/// callback data into this enum once; the machine never sees raw strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Choice {
    StartCalculation,
    PickCategory(Category),
    PickProduct(PanelProduct),
    PickThickness(u32),
    PickLength(u32),
    CustomName(bool),
    PickProfileThickness(u32),
    PickProfileKind(ProfileKind),
    PickSlatKind(SlatKind),
    PickThreeDVariant(ThreeDVariant),
    AddAnotherMaterial(bool),
    PickUnit(Unit),
    AnotherOpening(bool),
    PickHeightMode(HeightMode),
    SendToAdmin,
    StartOver,
}

/// One inbound event for a conversation, already normalized by the boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Choice(Choice),
    FreeText(String),
}

/// Outbound message intent. The core emits text plus labelled choice tokens;
/// rendering (inline keyboards etc.) is the transport adapter's concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageIntent {
    pub text: String,
    pub options: Vec<(String, Choice)>,
}

impl MessageIntent {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), options: Vec::new() }
    }

    pub fn with_options(text: impl Into<String>, options: Vec<(String, Choice)>) -> Self {
        Self { text: text.into(), options }
    }
}

/// Result of one state-machine step: replies to the user and, after a
/// finished quote was forwarded, a copy for the admin conversation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub replies: Vec<MessageIntent>,
    pub admin_forward: Option<MessageIntent>,
}

impl StepOutcome {
    pub fn reply(intent: MessageIntent) -> Self {
        Self { replies: vec![intent], admin_forward: None }
    }

    pub fn replies(intents: Vec<MessageIntent>) -> Self {
        Self { replies: intents, admin_forward: None }
    }
}

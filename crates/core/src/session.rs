use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::{PanelProduct, ProfileKind, SlatKind, ThreeDVariant};
use crate::dialogue::states::Phase;
use crate::input::Unit;

/// Chat-transport conversation identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which height bounds the covered area: the room height the user entered,
/// or the selected panel's own length (panels mounted full-length).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeightMode {
    Room,
    Material,
}

/// Window or door area deducted from gross coverage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Opening {
    pub width_m: f64,
    pub height_m: f64,
}

impl Opening {
    pub fn area_m2(&self) -> f64 {
        self.width_m * self.height_m
    }
}

/// One chosen material line item. Immutable once appended, apart from the
/// optional custom name annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub material: Material,
    pub custom_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    Panel { product: PanelProduct, thickness_mm: Option<u32>, length_mm: u32 },
    Profile { thickness_mm: u32, kind: ProfileKind, quantity: u32 },
    Slats { kind: SlatKind },
    ThreeD { variant: ThreeDVariant },
}

impl Selection {
    pub fn new(material: Material) -> Self {
        Self { material, custom_name: None }
    }

    pub fn display_name(&self) -> String {
        if let Some(name) = &self.custom_name {
            return name.clone();
        }
        match &self.material {
            Material::Panel { product, thickness_mm: Some(thickness), length_mm } => {
                format!("{} {thickness} mm / {length_mm} mm", product.display_name())
            }
            Material::Panel { product, thickness_mm: None, length_mm } => {
                format!("{} / {length_mm} mm", product.display_name())
            }
            Material::Profile { thickness_mm, kind, quantity } => {
                format!("{} {thickness_mm} mm x {quantity} pcs", kind.display_name())
            }
            Material::Slats { kind } => kind.display_name().to_owned(),
            Material::ThreeD { variant } => format!("3D panel {}", variant.display_name()),
        }
    }

    /// Whether this line consumes the wall area (width and height).
    pub fn covers_area(&self) -> bool {
        matches!(self.material, Material::Panel { .. } | Material::ThreeD { .. })
    }

    /// Whether this line consumes the wall length only (linear material).
    pub fn covers_length(&self) -> bool {
        matches!(self.material, Material::Slats { .. })
    }
}

/// Purchase quantity in the unit the material is sold by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quantity {
    Units(u32),
    LinearMetres(u32),
    Pieces(u32),
}

/// Finalized outcome for one selection against one dimension set.
#[derive(Clone, Debug, PartialEq)]
pub struct CalculationResult {
    pub selection: Selection,
    pub quantity: Quantity,
    pub purchased_coverage: f64,
    pub waste_amount: f64,
    pub waste_percent: f64,
    pub total_cost: Decimal,
}

/// Per-conversation mutable state. Mutated only by the dialogue machine,
/// under the dispatch bridge's one-step-at-a-time guarantee.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub conversation_id: ConversationId,
    pub phase: Phase,
    pub selections: Vec<Selection>,
    pub unit: Option<Unit>,
    pub room_width_m: Option<f64>,
    pub room_height_m: Option<f64>,
    pub openings: Vec<Opening>,
    pub height_mode: Option<HeightMode>,
    pub results: Vec<CalculationResult>,
    pub materials_locked: bool,
    pub last_error: Option<String>,
    pub last_send_failure: Option<String>,
}

impl Session {
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            phase: Phase::Idle,
            selections: Vec::new(),
            unit: None,
            room_width_m: None,
            room_height_m: None,
            openings: Vec::new(),
            height_mode: None,
            results: Vec::new(),
            materials_locked: false,
            last_error: None,
            last_send_failure: None,
        }
    }

    /// Start-over: fresh state for the same conversation.
    pub fn reset(&mut self) {
        *self = Self::new(self.conversation_id);
    }

    pub fn deducted_area_m2(&self) -> f64 {
        self.openings.iter().map(Opening::area_m2).sum()
    }

    pub fn total_cost(&self) -> Decimal {
        self.results.iter().map(|result| result.total_cost).sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::catalog::{PanelProduct, ProfileKind};
    use crate::dialogue::states::Phase;

    use super::{ConversationId, Material, Opening, Selection, Session};

    #[test]
    fn new_session_starts_idle_and_unlocked() {
        let session = Session::new(ConversationId(42));
        assert_eq!(session.phase, Phase::Idle);
        assert!(!session.materials_locked);
        assert!(session.selections.is_empty());
    }

    #[test]
    fn reset_clears_everything_but_the_conversation_id() {
        let mut session = Session::new(ConversationId(7));
        session.materials_locked = true;
        session.openings.push(Opening { width_m: 1.2, height_m: 1.5 });
        session.selections.push(Selection::new(Material::Slats {
            kind: crate::catalog::SlatKind::Wpc,
        }));

        session.reset();

        assert_eq!(session, Session::new(ConversationId(7)));
    }

    #[test]
    fn deducted_area_sums_all_openings() {
        let mut session = Session::new(ConversationId(1));
        session.openings.push(Opening { width_m: 1.2, height_m: 1.5 });
        session.openings.push(Opening { width_m: 0.9, height_m: 2.1 });
        assert!((session.deducted_area_m2() - (1.8 + 1.89)).abs() < 1e-9);
    }

    #[test]
    fn custom_name_overrides_display_name() {
        let mut selection = Selection::new(Material::Panel {
            product: PanelProduct::WpcBamboo,
            thickness_mm: Some(8),
            length_mm: 2440,
        });
        assert_eq!(selection.display_name(), "WPC bamboo 8 mm / 2440 mm");

        selection.custom_name = Some("Loft-8 bamboo".to_owned());
        assert_eq!(selection.display_name(), "Loft-8 bamboo");
    }

    #[test]
    fn coverage_kind_follows_material() {
        let panel = Selection::new(Material::Panel {
            product: PanelProduct::SpcPanel,
            thickness_mm: None,
            length_mm: 2600,
        });
        let profile = Selection::new(Material::Profile {
            thickness_mm: 8,
            kind: ProfileKind::Joining,
            quantity: 4,
        });
        assert!(panel.covers_area());
        assert!(!panel.covers_length());
        assert!(!profile.covers_area());
        assert!(!profile.covers_length());
    }
}

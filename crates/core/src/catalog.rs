use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Panel product families offered in the selection flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelProduct {
    WpcCharcoalBamboo,
    WpcBamboo,
    WpcHighDensity,
    SpcPanel,
}

impl PanelProduct {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::WpcCharcoalBamboo => "WPC charcoal bamboo",
            Self::WpcBamboo => "WPC bamboo",
            Self::WpcHighDensity => "WPC high density",
            Self::SpcPanel => "SPC panel",
        }
    }

    /// SPC panels come in a single gauge, so the thickness step is skipped.
    pub fn has_thickness_choice(&self) -> bool {
        !matches!(self, Self::SpcPanel)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKind {
    Joining,
    Finishing,
    OuterCorner,
}

impl ProfileKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Joining => "Joining profile",
            Self::Finishing => "Finishing profile",
            Self::OuterCorner => "Outer corner profile",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlatKind {
    Wpc,
    Wood,
}

impl SlatKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Wpc => "WPC slats",
            Self::Wood => "Wooden slats",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreeDVariant {
    Size600x1200,
    Size1200x3000,
}

impl ThreeDVariant {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Size600x1200 => "600x1200 mm",
            Self::Size1200x3000 => "1200x3000 mm",
        }
    }
}

/// One purchasable panel variant. `thickness_mm` is `None` for products with
/// a single gauge (SPC).
#[derive(Clone, Debug, PartialEq)]
pub struct PanelVariant {
    pub product: PanelProduct,
    pub thickness_mm: Option<u32>,
    pub width_mm: u32,
    pub length_mm: u32,
    pub unit_area_m2: f64,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfilePrice {
    pub thickness_mm: u32,
    pub kind: ProfileKind,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlatPrice {
    pub kind: SlatKind,
    pub price_per_m: Decimal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThreeDPanel {
    pub variant: ThreeDVariant,
    pub unit_area_m2: f64,
    pub unit_price: Decimal,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("no panel variant for {product:?} thickness {thickness_mm:?} length {length_mm}")]
    PanelNotFound { product: PanelProduct, thickness_mm: Option<u32>, length_mm: u32 },
    #[error("no profile price for {kind:?} at thickness {thickness_mm}")]
    ProfileNotFound { thickness_mm: u32, kind: ProfileKind },
    #[error("no slat price for {kind:?}")]
    SlatNotFound { kind: SlatKind },
    #[error("no 3d panel variant {variant:?}")]
    ThreeDNotFound { variant: ThreeDVariant },
}

/// Read-only price catalog, built once at startup and shared by reference.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    panels: Vec<PanelVariant>,
    profiles: Vec<ProfilePrice>,
    slats: Vec<SlatPrice>,
    three_d: Vec<ThreeDPanel>,
}

impl Catalog {
    pub fn new(
        panels: Vec<PanelVariant>,
        profiles: Vec<ProfilePrice>,
        slats: Vec<SlatPrice>,
        three_d: Vec<ThreeDPanel>,
    ) -> Self {
        Self { panels, profiles, slats, three_d }
    }

    /// Catalog with the current production price list.
    pub fn builtin() -> Self {
        use PanelProduct::*;

        let mut panels = Vec::new();
        let mut push = |product, thickness_mm, length_mm, unit_area_m2, price_rub: i64| {
            panels.push(PanelVariant {
                product,
                thickness_mm,
                width_mm: 1220,
                length_mm,
                unit_area_m2,
                unit_price: Decimal::from(price_rub),
            });
        };

        push(WpcCharcoalBamboo, Some(5), 2440, 2.928, 10_500);
        push(WpcCharcoalBamboo, Some(5), 2600, 3.12, 11_100);
        push(WpcCharcoalBamboo, Some(8), 2440, 2.928, 12_200);
        push(WpcCharcoalBamboo, Some(8), 2600, 3.12, 13_000);
        push(WpcBamboo, Some(5), 2440, 2.928, 12_200);
        push(WpcBamboo, Some(5), 2600, 3.12, 13_000);
        push(WpcBamboo, Some(8), 2440, 2.928, 13_900);
        push(WpcBamboo, Some(8), 2600, 3.12, 14_900);
        push(WpcHighDensity, Some(8), 2440, 2.928, 15_500);
        push(WpcHighDensity, Some(8), 2600, 3.12, 16_500);
        push(SpcPanel, None, 2440, 2.928, 9_500);
        push(SpcPanel, None, 2600, 3.12, 10_100);

        let profiles = vec![
            ProfilePrice { thickness_mm: 5, kind: ProfileKind::Joining, unit_price: Decimal::from(1_350) },
            ProfilePrice { thickness_mm: 5, kind: ProfileKind::Finishing, unit_price: Decimal::from(1_350) },
            ProfilePrice { thickness_mm: 5, kind: ProfileKind::OuterCorner, unit_price: Decimal::from(1_450) },
            ProfilePrice { thickness_mm: 8, kind: ProfileKind::Joining, unit_price: Decimal::from(1_450) },
            ProfilePrice { thickness_mm: 8, kind: ProfileKind::Finishing, unit_price: Decimal::from(1_450) },
            ProfilePrice { thickness_mm: 8, kind: ProfileKind::OuterCorner, unit_price: Decimal::from(1_550) },
        ];

        let slats = vec![
            SlatPrice { kind: SlatKind::Wpc, price_per_m: Decimal::from(1_200) },
            SlatPrice { kind: SlatKind::Wood, price_per_m: Decimal::from(1_500) },
        ];

        let three_d = vec![
            ThreeDPanel {
                variant: ThreeDVariant::Size600x1200,
                unit_area_m2: 0.72,
                unit_price: Decimal::from(3_000),
            },
            ThreeDPanel {
                variant: ThreeDVariant::Size1200x3000,
                unit_area_m2: 3.6,
                unit_price: Decimal::from(8_000),
            },
        ];

        Self::new(panels, profiles, slats, three_d)
    }

    pub fn panel(
        &self,
        product: PanelProduct,
        thickness_mm: Option<u32>,
        length_mm: u32,
    ) -> Result<&PanelVariant, CatalogError> {
        self.panels
            .iter()
            .find(|variant| {
                variant.product == product
                    && variant.thickness_mm == thickness_mm
                    && variant.length_mm == length_mm
            })
            .ok_or(CatalogError::PanelNotFound { product, thickness_mm, length_mm })
    }

    pub fn profile(&self, thickness_mm: u32, kind: ProfileKind) -> Result<&ProfilePrice, CatalogError> {
        self.profiles
            .iter()
            .find(|profile| profile.thickness_mm == thickness_mm && profile.kind == kind)
            .ok_or(CatalogError::ProfileNotFound { thickness_mm, kind })
    }

    pub fn slat(&self, kind: SlatKind) -> Result<&SlatPrice, CatalogError> {
        self.slats.iter().find(|slat| slat.kind == kind).ok_or(CatalogError::SlatNotFound { kind })
    }

    pub fn three_d(&self, variant: ThreeDVariant) -> Result<&ThreeDPanel, CatalogError> {
        self.three_d
            .iter()
            .find(|panel| panel.variant == variant)
            .ok_or(CatalogError::ThreeDNotFound { variant })
    }

    /// Distinct thicknesses available for a product, for the thickness prompt.
    pub fn thicknesses_for(&self, product: PanelProduct) -> Vec<u32> {
        let mut thicknesses: Vec<u32> = self
            .panels
            .iter()
            .filter(|variant| variant.product == product)
            .filter_map(|variant| variant.thickness_mm)
            .collect();
        thicknesses.sort_unstable();
        thicknesses.dedup();
        thicknesses
    }

    /// Distinct panel lengths available for a product/thickness pair.
    pub fn lengths_for(&self, product: PanelProduct, thickness_mm: Option<u32>) -> Vec<u32> {
        let mut lengths: Vec<u32> = self
            .panels
            .iter()
            .filter(|variant| variant.product == product && variant.thickness_mm == thickness_mm)
            .map(|variant| variant.length_mm)
            .collect();
        lengths.sort_unstable();
        lengths.dedup();
        lengths
    }

    pub fn profile_thicknesses(&self) -> Vec<u32> {
        let mut thicknesses: Vec<u32> =
            self.profiles.iter().map(|profile| profile.thickness_mm).collect();
        thicknesses.sort_unstable();
        thicknesses.dedup();
        thicknesses
    }

    pub fn three_d_panels(&self) -> &[ThreeDPanel] {
        &self.three_d
    }

    pub fn panel_products(&self) -> Vec<PanelProduct> {
        let mut products: Vec<PanelProduct> = Vec::new();
        for variant in &self.panels {
            if !products.contains(&variant.product) {
                products.push(variant.product);
            }
        }
        products
    }
}

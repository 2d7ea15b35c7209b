use rust_decimal::Decimal;
use thiserror::Error;

/// Cutting reserve applied to net coverage before rounding up to whole
/// purchase units. The production default is 10%; `neutral()` disables it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReservePolicy {
    pub factor: f64,
}

impl ReservePolicy {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    pub fn neutral() -> Self {
        Self { factor: 1.0 }
    }

    fn apply(&self, value: f64) -> f64 {
        value * self.factor
    }
}

impl Default for ReservePolicy {
    fn default() -> Self {
        Self { factor: 1.1 }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("net coverage must be positive, got {net:.3}")]
    InvalidDimensions { net: f64 },
    #[error("unit coverage must be positive, got {unit:.3}")]
    NonPositiveUnit { unit: f64 },
    #[error("piece quantity must be at least 1")]
    ZeroQuantity,
}

/// Quote for area-covering material (wall panels, 3D panels).
#[derive(Clone, Debug, PartialEq)]
pub struct AreaQuote {
    pub units: u32,
    pub net_m2: f64,
    pub purchased_m2: f64,
    pub waste_m2: f64,
    pub waste_percent: f64,
    pub total_cost: Decimal,
}

/// Quote for linear material (slats), purchased in whole metres.
#[derive(Clone, Debug, PartialEq)]
pub struct LengthQuote {
    pub metres: u32,
    pub raw_m: f64,
    pub waste_m: f64,
    pub waste_percent: f64,
    pub total_cost: Decimal,
}

/// Quote for piece-counted material (profiles). No waste is computed.
#[derive(Clone, Debug, PartialEq)]
pub struct PieceQuote {
    pub quantity: u32,
    pub total_cost: Decimal,
}

/// Units to buy so that `units * unit_area >= net * reserve`, never
/// under-buying. Waste percent is always taken against the purchased area,
/// which keeps it strictly below 100 for any positive net coverage.
pub fn area_quote(
    net_m2: f64,
    unit_area_m2: f64,
    unit_price: Decimal,
    reserve: ReservePolicy,
) -> Result<AreaQuote, CalcError> {
    if !net_m2.is_finite() || net_m2 <= 0.0 {
        return Err(CalcError::InvalidDimensions { net: net_m2 });
    }
    if !unit_area_m2.is_finite() || unit_area_m2 <= 0.0 {
        return Err(CalcError::NonPositiveUnit { unit: unit_area_m2 });
    }

    let required_m2 = reserve.apply(net_m2);
    let units = (required_m2 / unit_area_m2).ceil() as u32;
    let units = units.max(1);
    let purchased_m2 = f64::from(units) * unit_area_m2;
    let waste_m2 = purchased_m2 - net_m2;
    let waste_percent = if purchased_m2 > 0.0 { waste_m2 / purchased_m2 * 100.0 } else { 0.0 };

    Ok(AreaQuote {
        units,
        net_m2,
        purchased_m2,
        waste_m2,
        waste_percent,
        total_cost: unit_price * Decimal::from(units),
    })
}

pub fn length_quote(
    raw_m: f64,
    price_per_m: Decimal,
    reserve: ReservePolicy,
) -> Result<LengthQuote, CalcError> {
    if !raw_m.is_finite() || raw_m <= 0.0 {
        return Err(CalcError::InvalidDimensions { net: raw_m });
    }

    let required_m = reserve.apply(raw_m);
    let metres = (required_m.ceil() as u32).max(1);
    let purchased_m = f64::from(metres);
    let waste_m = purchased_m - raw_m;
    let waste_percent = if purchased_m > 0.0 { waste_m / purchased_m * 100.0 } else { 0.0 };

    Ok(LengthQuote {
        metres,
        raw_m,
        waste_m,
        waste_percent,
        total_cost: price_per_m * Decimal::from(metres),
    })
}

pub fn piece_quote(quantity: u32, unit_price: Decimal) -> Result<PieceQuote, CalcError> {
    if quantity == 0 {
        return Err(CalcError::ZeroQuantity);
    }
    Ok(PieceQuote { quantity, total_cost: unit_price * Decimal::from(quantity) })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{area_quote, length_quote, piece_quote, CalcError, ReservePolicy};

    #[test]
    fn panel_example_from_price_list() {
        // 10 m² of 2.928 m² panels without reserve: exactly the hand-checked
        // figures quoted to customers.
        let quote = area_quote(10.0, 2.928, Decimal::from(10_500), ReservePolicy::neutral())
            .expect("positive coverage");

        assert_eq!(quote.units, 4);
        assert!((quote.purchased_m2 - 11.712).abs() < 1e-9);
        assert!((quote.waste_m2 - 1.712).abs() < 1e-9);
        assert!((quote.waste_percent - 14.617_486_338_797_814).abs() < 1e-9);
        assert_eq!(quote.total_cost, Decimal::from(42_000));
    }

    #[test]
    fn default_reserve_inflates_before_rounding() {
        // 2.8 m² needs one 2.928 m² panel raw, but two once the 10% reserve
        // pushes the requirement past a single panel.
        let neutral = area_quote(2.8, 2.928, Decimal::from(9_500), ReservePolicy::neutral())
            .expect("positive coverage");
        let reserved = area_quote(2.8, 2.928, Decimal::from(9_500), ReservePolicy::default())
            .expect("positive coverage");

        assert_eq!(neutral.units, 1);
        assert_eq!(reserved.units, 2);
    }

    #[test]
    fn ceiling_never_under_buys() {
        // P1: units * unit_area >= net, and one fewer unit would be short.
        let nets = [0.1, 0.5, 1.0, 2.927, 2.928, 2.929, 6.3, 10.0, 55.75, 100.01];
        let areas = [0.72, 2.928, 3.12, 3.6];
        for net in nets {
            for area in areas {
                let quote = area_quote(net, area, Decimal::from(1_000), ReservePolicy::neutral())
                    .expect("positive coverage");
                assert!(
                    quote.units as f64 * area >= net,
                    "under-bought: net {net} area {area} units {}",
                    quote.units
                );
                if quote.units > 1 {
                    assert!(
                        (quote.units - 1) as f64 * area < net,
                        "over-bought: net {net} area {area} units {}",
                        quote.units
                    );
                }
            }
        }
    }

    #[test]
    fn waste_percent_stays_below_one_hundred() {
        // P2: waste is measured against purchased coverage.
        let nets = [0.01, 0.3, 1.0, 2.5, 7.77, 29.0];
        for net in nets {
            let quote = area_quote(net, 3.12, Decimal::from(1_000), ReservePolicy::default())
                .expect("positive coverage");
            assert!(quote.waste_percent >= 0.0);
            assert!(quote.waste_percent < 100.0, "net {net}: {}", quote.waste_percent);
        }
    }

    #[test]
    fn non_positive_net_coverage_is_an_error() {
        let error = area_quote(0.0, 2.928, Decimal::from(10_500), ReservePolicy::default())
            .expect_err("zero coverage");
        assert!(matches!(error, CalcError::InvalidDimensions { .. }));

        let error = area_quote(-1.8, 2.928, Decimal::from(10_500), ReservePolicy::default())
            .expect_err("openings larger than the wall");
        assert!(matches!(error, CalcError::InvalidDimensions { .. }));
    }

    #[test]
    fn nan_coverage_is_rejected() {
        let error = area_quote(f64::NAN, 2.928, Decimal::from(10_500), ReservePolicy::default())
            .expect_err("nan coverage");
        assert!(matches!(error, CalcError::InvalidDimensions { .. }));
    }

    #[test]
    fn slats_round_up_to_whole_metres() {
        let quote = length_quote(5.0, Decimal::from(1_200), ReservePolicy::default())
            .expect("positive length");

        assert_eq!(quote.metres, 6);
        assert_eq!(quote.total_cost, Decimal::from(7_200));
        assert!((quote.waste_m - 1.0).abs() < 1e-9);
        assert!(quote.waste_percent < 100.0);
    }

    #[test]
    fn profiles_are_priced_per_piece_without_waste() {
        let quote = piece_quote(7, Decimal::from(1_450)).expect("positive quantity");
        assert_eq!(quote.total_cost, Decimal::from(10_150));

        assert_eq!(piece_quote(0, Decimal::from(1_450)), Err(CalcError::ZeroQuantity));
    }
}

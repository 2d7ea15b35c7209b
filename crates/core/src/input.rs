use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Measurement unit chosen once per session and cached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Metres,
    Millimetres,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Metres => "m",
            Self::Millimetres => "mm",
        }
    }

    fn to_metres(&self, value: f64) -> f64 {
        match self {
            Self::Metres => value,
            Self::Millimetres => value / 1_000.0,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("`{token}` is not a number")]
    InvalidNumber { token: String },
    #[error("value must be positive, got {value}")]
    NonPositive { value: f64 },
    #[error("expected `width x height`, e.g. `1.2 x 0.9`")]
    InvalidOpeningShape,
    #[error("`{token}` is not a whole quantity")]
    InvalidQuantity { token: String },
}

/// Parses one measurement in the session unit, returning metres.
///
/// Accepts a plain number or a `+`-separated sum so several wall segments can
/// be entered as one width (`"3+1.2+2"`). Decimal commas are tolerated.
pub fn parse_measure(text: &str, unit: Unit) -> Result<f64, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut total = 0.0_f64;
    for segment in trimmed.split('+') {
        total += parse_number(segment)?;
    }

    let metres = unit.to_metres(total);
    if !metres.is_finite() || metres <= 0.0 {
        return Err(ParseError::NonPositive { value: metres });
    }
    Ok(metres)
}

/// Parses an opening as `width x height` in the session unit, returning
/// metres. `x`, `X` and `×` all separate the two sides.
pub fn parse_opening(text: &str, unit: Unit) -> Result<(f64, f64), ParseError> {
    let sides: Vec<&str> =
        text.split(|c| matches!(c, 'x' | 'X' | '×')).map(str::trim).collect();
    let [width, height] = sides.as_slice() else {
        return Err(ParseError::InvalidOpeningShape);
    };

    let width_m = parse_measure(width, unit)?;
    let height_m = parse_measure(height, unit)?;
    Ok((width_m, height_m))
}

/// Parses a piece count (profiles). Must be a whole number of at least 1.
pub fn parse_quantity(text: &str) -> Result<u32, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    let quantity: u32 = trimmed
        .parse()
        .map_err(|_| ParseError::InvalidQuantity { token: trimmed.to_owned() })?;
    if quantity == 0 {
        return Err(ParseError::InvalidQuantity { token: trimmed.to_owned() });
    }
    Ok(quantity)
}

fn parse_number(segment: &str) -> Result<f64, ParseError> {
    let token = segment.trim().replace(',', ".");
    if token.is_empty() {
        return Err(ParseError::InvalidNumber { token: segment.trim().to_owned() });
    }
    token.parse::<f64>().map_err(|_| ParseError::InvalidNumber { token })
}

#[cfg(test)]
mod tests {
    use super::{parse_measure, parse_opening, parse_quantity, ParseError, Unit};

    #[test]
    fn plain_number_in_metres() {
        assert_eq!(parse_measure("2.7", Unit::Metres), Ok(2.7));
    }

    #[test]
    fn millimetres_convert_to_metres() {
        assert_eq!(parse_measure("2440", Unit::Millimetres), Ok(2.44));
    }

    #[test]
    fn segment_sum_combines_wall_sections() {
        let width = parse_measure("3+1.2+2", Unit::Metres).expect("valid sum");
        assert!((width - 6.2).abs() < 1e-9);
    }

    #[test]
    fn decimal_comma_is_accepted() {
        assert_eq!(parse_measure("1,5", Unit::Metres), Ok(1.5));
    }

    #[test]
    fn garbage_and_non_positive_values_are_rejected() {
        assert!(matches!(
            parse_measure("wide", Unit::Metres),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert!(matches!(parse_measure("", Unit::Metres), Err(ParseError::Empty)));
        assert!(matches!(
            parse_measure("0", Unit::Metres),
            Err(ParseError::NonPositive { .. })
        ));
        assert!(matches!(
            parse_measure("-3", Unit::Metres),
            Err(ParseError::NonPositive { .. })
        ));
        assert!(matches!(
            parse_measure("2+-2", Unit::Metres),
            Err(ParseError::NonPositive { .. })
        ));
    }

    #[test]
    fn opening_parses_width_and_height() {
        assert_eq!(parse_opening("1.2 x 0.9", Unit::Metres), Ok((1.2, 0.9)));
        assert_eq!(parse_opening("1200X900", Unit::Millimetres), Ok((1.2, 0.9)));
        assert_eq!(parse_opening("1.2 × 1.5", Unit::Metres), Ok((1.2, 1.5)));
    }

    #[test]
    fn opening_without_separator_is_rejected() {
        assert!(matches!(
            parse_opening("1.2 0.9", Unit::Metres),
            Err(ParseError::InvalidOpeningShape)
        ));
        assert!(matches!(
            parse_opening("1 x 2 x 3", Unit::Metres),
            Err(ParseError::InvalidOpeningShape)
        ));
    }

    #[test]
    fn quantity_must_be_a_positive_integer() {
        assert_eq!(parse_quantity(" 7 "), Ok(7));
        assert!(matches!(parse_quantity("7.5"), Err(ParseError::InvalidQuantity { .. })));
        assert!(matches!(parse_quantity("0"), Err(ParseError::InvalidQuantity { .. })));
        assert!(matches!(parse_quantity(""), Err(ParseError::Empty)));
    }
}

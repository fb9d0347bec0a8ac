//! Unit conversion for `/convert <value> <from> to <to>`.

use crate::errors::{AppResult, InvalidInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Kilogram,
    Pound,
    Kilometer,
    Mile,
    Celsius,
    Fahrenheit,
}

impl Unit {
    /// Recognise a unit by any of its accepted spellings (case-insensitive)
    pub fn parse(token: &str) -> Option<Unit> {
        match token.to_lowercase().as_str() {
            "kg" | "кг" => Some(Unit::Kilogram),
            "lb" | "фунт" | "фунты" => Some(Unit::Pound),
            "km" | "километр" | "километры" => Some(Unit::Kilometer),
            "mi" | "miles" | "мил" | "мили" => Some(Unit::Mile),
            "c" | "°c" | "celsius" => Some(Unit::Celsius),
            "f" | "°f" | "fahrenheit" => Some(Unit::Fahrenheit),
            _ => None,
        }
    }

    /// Localization key of the unit label
    pub fn label_key(&self) -> &'static str {
        match self {
            Unit::Kilogram => "unit-kg",
            Unit::Pound => "unit-lb",
            Unit::Kilometer => "unit-km",
            Unit::Mile => "unit-mi",
            Unit::Celsius => "unit-celsius",
            Unit::Fahrenheit => "unit-fahrenheit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub value: f64,
    pub from: Unit,
    pub result: f64,
    pub to: Unit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutcome {
    /// Arguments do not have the `<value> <from> to <to>` shape
    Usage,
    Unsupported,
    Converted(Conversion),
}

/// Convert between a supported pair of units
pub fn convert(value: f64, from: Unit, to: Unit) -> Option<f64> {
    match (from, to) {
        (Unit::Kilogram, Unit::Pound) => Some(value * 2.20462),
        (Unit::Kilometer, Unit::Mile) => Some(value * 0.621371),
        (Unit::Celsius, Unit::Fahrenheit) => Some(value * 9.0 / 5.0 + 32.0),
        (Unit::Fahrenheit, Unit::Celsius) => Some((value - 32.0) * 5.0 / 9.0),
        _ => None,
    }
}

/// Parse and run a conversion from raw command arguments
pub fn convert_args(args: &str) -> AppResult<ConvertOutcome> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let Some(to_index) = tokens.iter().position(|t| *t == "to") else {
        return Ok(ConvertOutcome::Usage);
    };
    if tokens.len() < 4 || to_index + 1 >= tokens.len() {
        return Ok(ConvertOutcome::Usage);
    }

    let value: f64 = tokens[0]
        .replace(',', ".")
        .parse()
        .map_err(|_| InvalidInput::Number(tokens[0].to_string()))?;
    if !value.is_finite() {
        return Err(InvalidInput::Number(tokens[0].to_string()).into());
    }

    let units = Unit::parse(tokens[1]).zip(Unit::parse(tokens[to_index + 1]));
    let Some((from, to)) = units else {
        return Ok(ConvertOutcome::Unsupported);
    };

    Ok(match convert(value, from, to) {
        Some(result) => ConvertOutcome::Converted(Conversion {
            value,
            from,
            result,
            to,
        }),
        None => ConvertOutcome::Unsupported,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    fn converted(args: &str) -> Conversion {
        match convert_args(args).unwrap() {
            ConvertOutcome::Converted(c) => c,
            other => panic!("expected conversion for {:?}, got {:?}", args, other),
        }
    }

    #[test]
    fn test_supported_pairs() {
        assert!((converted("100 kg to lb").result - 220.462).abs() < 1e-9);
        assert!((converted("10 км to мили").result - 6.21371).abs() < 1e-9);
        assert!((converted("20 C to F").result - 68.0).abs() < 1e-9);
        assert!((converted("68 °F to celsius").result - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_usage_and_unsupported() {
        assert_eq!(convert_args("").unwrap(), ConvertOutcome::Usage);
        assert_eq!(convert_args("100 kg lb").unwrap(), ConvertOutcome::Usage);
        assert_eq!(convert_args("100 kg x to").unwrap(), ConvertOutcome::Usage);
        assert_eq!(convert_args("100 lb to kg").unwrap(), ConvertOutcome::Unsupported);
        assert_eq!(convert_args("100 kg to parsec").unwrap(), ConvertOutcome::Unsupported);
    }

    #[test]
    fn test_bad_number() {
        assert_eq!(
            convert_args("lots kg to lb").unwrap_err(),
            AppError::InvalidInput(InvalidInput::Number("lots".to_string()))
        );
    }
}

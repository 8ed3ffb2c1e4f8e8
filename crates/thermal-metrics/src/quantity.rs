//! Resource quantity parsing.
//!
//! The custom metrics API reports values as quantities: a decimal number
//! with an optional SI (`m`, `k`, ...) or binary (`Ki`, `Mi`, ...) suffix, or
//! a decimal exponent (`4.5e1`). Thermal exporters publish milli-degrees
//! (`"45000m"`), so everything is normalised to milli-units here.

// Multipliers go straight to milli-units so "30019m" stays exactly 30019.
const BINARY_SUFFIXES: [(&str, f64); 6] = [
    ("Ki", 1_024_000.0),
    ("Mi", 1_048_576_000.0),
    ("Gi", 1_073_741_824_000.0),
    ("Ti", 1_099_511_627_776_000.0),
    ("Pi", 1_125_899_906_842_624_000.0),
    ("Ei", 1_152_921_504_606_846_976_000.0),
];

const DECIMAL_SUFFIXES: [(char, f64); 9] = [
    ('n', 1e-6),
    ('u', 1e-3),
    ('m', 1.0),
    ('k', 1e6),
    ('M', 1e9),
    ('G', 1e12),
    ('T', 1e15),
    ('P', 1e18),
    ('E', 1e21),
];

/// Multiplier for a bare number (whole units).
const UNIT_MILLI: f64 = 1000.0;

/// Parse a quantity string into milli-units.
pub fn parse_quantity_milli(input: &str) -> Result<f64, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty quantity".to_string());
    }

    let (number, multiplier) = split_suffix(s);
    if number.is_empty() {
        return Err(format!("quantity {input:?} has no numeric part"));
    }
    // Reject things f64::from_str is happy with but quantities aren't ("inf", "NaN").
    if !number
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'))
    {
        return Err(format!("quantity {input:?} is not a number"));
    }

    let value: f64 = number
        .parse()
        .map_err(|_| format!("quantity {input:?} is not a number"))?;
    let milli = value * multiplier;
    if !milli.is_finite() {
        return Err(format!("quantity {input:?} is out of range"));
    }
    Ok(milli)
}

fn split_suffix(s: &str) -> (&str, f64) {
    for (suffix, multiplier) in BINARY_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            return (number, multiplier);
        }
    }

    for (suffix, multiplier) in DECIMAL_SUFFIXES {
        if let Some(number) = s.strip_suffix(suffix) {
            // "1E" is exa, but "1e3"/"1E3" is an exponent and ends in a digit.
            return (number, multiplier);
        }
    }

    (s, UNIT_MILLI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn milli_suffix() {
        assert_eq!(parse_quantity_milli("45000m").unwrap(), 45000.0);
        assert_eq!(parse_quantity_milli("40500m").unwrap(), 40500.0);
    }

    #[test]
    fn plain_units() {
        assert_eq!(parse_quantity_milli("45").unwrap(), 45000.0);
        assert_eq!(parse_quantity_milli("37.5").unwrap(), 37500.0);
    }

    #[test]
    fn exponent_form() {
        assert_eq!(parse_quantity_milli("4.5e1").unwrap(), 45000.0);
        assert_eq!(parse_quantity_milli("45E0").unwrap(), 45000.0);
    }

    #[test]
    fn decimal_and_binary_suffixes() {
        assert_eq!(parse_quantity_milli("2k").unwrap(), 2_000_000.0);
        assert_eq!(parse_quantity_milli("1Ki").unwrap(), 1_024_000.0);
        assert!((parse_quantity_milli("45000000u").unwrap() - 45000.0).abs() < 1e-6);
    }

    #[test]
    fn milli_values_are_exact() {
        assert_eq!(parse_quantity_milli("30019m").unwrap(), 30019.0);
        for milli in 0..=120_000u32 {
            let parsed = parse_quantity_milli(&format!("{milli}m")).unwrap();
            assert_eq!(parsed, f64::from(milli), "{milli}m");
        }
    }

    #[test]
    fn negative_values_are_allowed() {
        assert_eq!(parse_quantity_milli("-5").unwrap(), -5000.0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_quantity_milli("").is_err());
        assert!(parse_quantity_milli("m").is_err());
        assert!(parse_quantity_milli("hot").is_err());
        assert!(parse_quantity_milli("inf").is_err());
        assert!(parse_quantity_milli("NaN").is_err());
        assert!(parse_quantity_milli("12 degrees").is_err());
    }
}

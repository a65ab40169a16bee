use serde_json::Value;

/// Coerces an upstream bid into a non-negative whole number of coins.
///
/// Numbers and numeric strings are truncated toward zero. Anything else
/// (null, booleans, garbage strings, negatives, NaN) becomes 0.
#[must_use]
pub fn coerce_bid(value: &Value) -> u64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(v) if v.is_finite() && v > 0.0 => v.trunc() as u64,
        _ => 0,
    }
}

/// Inclusive price bounds applied after a search has been assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, bid: u64) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let bid = bid as f64;
        self.min.is_none_or(|min| bid >= min) && self.max.is_none_or(|max| bid <= max)
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Parses an optional price query parameter. Blank values count as absent.
pub fn parse_price_param(raw: Option<&str>) -> Result<Option<f64>, String> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| format!("'{s}' is not a valid price")),
    }
}

use super::resources::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rate entry the backend uses for flavors it has no price for. It is not a
/// real flavor, so listings skip it.
pub const DEFAULT_RATE_KEY: &str = "default";

pub const CURRENCY_SYMBOL: &str = "₹";

/// Currency code assumed when the backend does not name one.
pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_cost: f64,
    #[serde(default)]
    pub currency: Option<String>,
    /// Hourly rate per flavor name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub rates: BTreeMap<String, f64>,
}

impl PricingInfo {
    pub fn currency_code(&self) -> &str {
        self.currency
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
    }

    /// Flavor rates worth showing to the user.
    pub fn visible_rates(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates
            .iter()
            .filter(|(flavor, _)| flavor.as_str() != DEFAULT_RATE_KEY)
            .map(|(flavor, rate)| (flavor.as_str(), *rate))
    }
}

/// Formats an amount the way the `en-IN` locale formats rupees:
/// two fraction digits and lakh/crore digit grouping (`₹1,23,456.78`).
/// Halves round away from zero, so `0.125` becomes `₹0.13`.
pub fn format_price(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 { "-" } else { "" };
    format!(
        "{}{}{}.{:02}",
        sign,
        CURRENCY_SYMBOL,
        group_indian(&(cents / 100).to_string()),
        cents % 100
    )
}

/// Hourly rate as the backend sent it, `5` stays `5` and `7.5` stays `7.5`.
pub fn format_rate(rate: f64) -> String {
    format!("{}", rate)
}

// Last three digits form the first group, every further group has two.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_small_amounts() {
        assert_eq!(format_price(12.5), "₹12.50");
        assert_eq!(format_price(0.0), "₹0.00");
        assert_eq!(format_price(999.999), "₹1,000.00");
        assert_eq!(format_price(0.005), "₹0.01");
        assert_eq!(format_price(0.125), "₹0.13");
    }

    #[test]
    fn test_format_price_indian_grouping() {
        assert_eq!(format_price(1234.0), "₹1,234.00");
        assert_eq!(format_price(123456.78), "₹1,23,456.78");
        assert_eq!(format_price(12345678.9), "₹1,23,45,678.90");
    }

    #[test]
    fn test_format_price_negative() {
        assert_eq!(format_price(-5.0), "-₹5.00");
        assert_eq!(format_price(-123456.0), "-₹1,23,456.00");
        assert_eq!(format_price(-0.125), "-₹0.13");
    }

    #[test]
    fn test_format_rate_keeps_backend_precision() {
        assert_eq!(format_rate(5.0), "5");
        assert_eq!(format_rate(7.5), "7.5");
    }

    #[test]
    fn test_currency_code_falls_back_to_rupees() {
        let mut pricing = PricingInfo::default();
        assert_eq!(pricing.currency_code(), "INR");
        pricing.currency = Some(String::new());
        assert_eq!(pricing.currency_code(), "INR");
        pricing.currency = Some("USD".to_string());
        assert_eq!(pricing.currency_code(), "USD");
    }

    #[test]
    fn test_visible_rates_skip_default() {
        let mut pricing = PricingInfo::default();
        pricing.rates.insert("m1.small".to_string(), 10.0);
        pricing.rates.insert(DEFAULT_RATE_KEY.to_string(), 15.0);
        pricing.rates.insert("m1.large".to_string(), 40.0);

        let rates: Vec<_> = pricing.visible_rates().collect();
        assert_eq!(rates, vec![("m1.large", 40.0), ("m1.small", 10.0)]);
    }
}

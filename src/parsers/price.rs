/// Format a USD amount for display, e.g. `$1234.50`.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}

/// Shipping cell text: the cost, or `Free` when absent or zero.
pub fn format_shipping(shipping_cost: Option<f64>) -> String {
    match shipping_cost {
        Some(cost) if cost > 0.0 => format_usd(cost),
        _ => "Free".to_string(),
    }
}

use serde::Serialize;

use crate::stock::StockEntry;

/// Kilograms of flowers per foot of diameter per layer. A fixed pricing
/// policy constant, not derived from any physical model.
pub const KG_PER_FOOT_LAYER: f64 = 0.5;

/// Applied when a requested color has no catalog row.
pub const DEFAULT_PRICE_PER_KG: f64 = 150.0;

pub const CURRENCY_PREFIX: &str = "AED";

#[derive(Debug, Clone, Serialize)]
pub struct FlowerAllocation {
    pub flower: String,
    /// Formatted to one decimal, e.g. "3.0 kg".
    pub qty: String,
    /// Rounded to a whole currency unit, e.g. "AED 750".
    pub price: String,
    #[serde(rename = "pricePerKg")]
    pub price_per_kg: f64,
    #[serde(skip)]
    pub price_amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricingResult {
    pub allocations: Vec<FlowerAllocation>,
    pub total_price: String,
}

/// Maps each requested color to a priced flower quantity.
///
/// The first catalog row whose color matches case-insensitively wins; there
/// is deliberately no further disambiguation between rows of the same color.
/// Colors absent from the catalog get a synthesized "Mixed {color} flowers"
/// allocation at the default rate. The total is the sum of the already
/// rounded per-allocation prices so it always matches the displayed
/// breakdown.
///
/// Callers must reject an empty color set before calling.
pub fn allocate(
    size_feet: f64,
    layer_count: u32,
    colors: &[String],
    stock: &[StockEntry],
) -> PricingResult {
    let total_qty = size_feet * f64::from(layer_count) * KG_PER_FOOT_LAYER;
    let qty_per_color = total_qty / colors.len() as f64;

    let allocations: Vec<FlowerAllocation> = colors
        .iter()
        .map(|color| {
            let matched = stock
                .iter()
                .find(|entry| entry.color.eq_ignore_ascii_case(color));

            let (flower, price_per_kg) = match matched {
                Some(entry) => (entry.flower.clone(), entry.price_per_kg),
                None => (format!("Mixed {color} flowers"), DEFAULT_PRICE_PER_KG),
            };

            let price_amount = (qty_per_color * price_per_kg).round() as i64;
            FlowerAllocation {
                flower,
                qty: format!("{qty_per_color:.1} kg"),
                price: format!("{CURRENCY_PREFIX} {price_amount}"),
                price_per_kg,
                price_amount,
            }
        })
        .collect();

    let total: i64 = allocations.iter().map(|item| item.price_amount).sum();

    PricingResult {
        allocations,
        total_price: format!("{CURRENCY_PREFIX} {total}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(flower: &str, color: &str, price_per_kg: f64) -> StockEntry {
        StockEntry {
            flower: flower.to_string(),
            color: color.to_string(),
            available_as: "Loose".to_string(),
            price_per_kg,
        }
    }

    fn colors(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn reference_scenario_four_feet_three_layers() {
        let stock = vec![
            entry("Marigold Yellow", "Yellow", 250.0),
            entry("Rose Petals", "Red", 400.0),
        ];

        let result = allocate(4.0, 3, &colors(&["Yellow", "Red"]), &stock);

        assert_eq!(result.allocations.len(), 2);
        assert_eq!(result.allocations[0].flower, "Marigold Yellow");
        assert_eq!(result.allocations[0].qty, "3.0 kg");
        assert_eq!(result.allocations[0].price, "AED 750");
        assert_eq!(result.allocations[1].flower, "Rose Petals");
        assert_eq!(result.allocations[1].price, "AED 1200");
        assert_eq!(result.total_price, "AED 1950");
    }

    #[test]
    fn color_match_is_case_insensitive_first_row_wins() {
        let stock = vec![
            entry("Rose Petals", "Red", 400.0),
            entry("Red Arali", "red", 320.0),
        ];

        let result = allocate(2.0, 2, &colors(&["RED"]), &stock);
        assert_eq!(result.allocations[0].flower, "Rose Petals");
        assert_eq!(result.allocations[0].price_per_kg, 400.0);
    }

    #[test]
    fn unknown_color_gets_mixed_placeholder_at_default_rate() {
        let stock = vec![entry("Jasmine", "White", 500.0)];

        let result = allocate(4.0, 3, &colors(&["Blue"]), &stock);
        let allocation = &result.allocations[0];
        assert_eq!(allocation.flower, "Mixed Blue flowers");
        assert_eq!(allocation.qty, "6.0 kg");
        // round(6.0 * 150) = 900
        assert_eq!(allocation.price, "AED 900");
        assert_eq!(allocation.price_per_kg, DEFAULT_PRICE_PER_KG);
    }

    #[test]
    fn total_sums_rounded_prices_not_a_higher_precision_recomputation() {
        // 1 ft x 1 layer = 0.5 kg over three colors: each allocation is
        // 0.1667 kg at 100/kg = 16.67, rounding to 17. The rounded sum is
        // 51; recomputing from the unrounded total (0.5 * 100 = 50) would
        // give 50. The displayed total must match the breakdown.
        let stock = vec![
            entry("A", "Yellow", 100.0),
            entry("B", "Red", 100.0),
            entry("C", "White", 100.0),
        ];

        let result = allocate(1.0, 1, &colors(&["Yellow", "Red", "White"]), &stock);
        assert!(result.allocations.iter().all(|a| a.price == "AED 17"));
        assert_eq!(result.total_price, "AED 51");
    }

    #[test]
    fn quantities_conserve_the_size_layer_budget() {
        let stock = vec![entry("Marigold Yellow", "Yellow", 250.0)];
        let palette = colors(&["Yellow", "Red", "White", "Green"]);

        let result = allocate(7.0, 5, &palette, &stock);
        let total_qty: f64 = result
            .allocations
            .iter()
            .map(|a| a.qty.trim_end_matches(" kg").parse::<f64>().unwrap())
            .sum();
        let budget = 7.0 * 5.0 * KG_PER_FOOT_LAYER;
        // One-decimal formatting loses at most 0.05 per allocation.
        assert!((total_qty - budget).abs() <= 0.05 * palette.len() as f64);
    }

    #[test]
    fn allocations_follow_input_color_order() {
        let stock = vec![
            entry("Jasmine", "White", 500.0),
            entry("Rose Petals", "Red", 400.0),
        ];

        let result = allocate(3.0, 3, &colors(&["Red", "White"]), &stock);
        assert_eq!(result.allocations[0].flower, "Rose Petals");
        assert_eq!(result.allocations[1].flower, "Jasmine");
    }
}

use std::collections::HashMap;

use anyhow::Context;
use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::ai::preview;
use crate::error::ApiError;
use crate::pricing::allocate;
use crate::review;
use crate::state::AppState;
use crate::stock::load_stock;

/// Accepts numbers or numeric strings, falling back to the default when the
/// value is absent, unparseable, or not positive. Zero counts as missing,
/// not as a zero-quantity design.
fn number_or(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(parsed) if parsed > 0.0 => parsed,
        _ => default,
    }
}

fn color_list(body: &Value) -> Vec<String> {
    body.get("colors")
        .and_then(|value| value.as_array())
        .map(|colors| {
            colors
                .iter()
                .filter_map(|color| color.as_str())
                .map(|color| color.trim().to_string())
                .filter(|color| !color.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Groups caller-selected flower images by color; an empty result means the
/// caller made no selection and the static lookup applies.
fn selected_flower_images(body: &Value) -> HashMap<String, Vec<String>> {
    let mut by_color: HashMap<String, Vec<String>> = HashMap::new();
    let Some(selected) = body.get("selectedFlowers").and_then(|value| value.as_array()) else {
        return by_color;
    };
    for flower in selected {
        let (Some(color), Some(image_path)) = (
            flower.get("color").and_then(|value| value.as_str()),
            flower.get("imagePath").and_then(|value| value.as_str()),
        ) else {
            continue;
        };
        by_color
            .entry(color.to_string())
            .or_default()
            .push(image_path.to_string());
    }
    by_color
}

/// Guided-selection flow: the caller supplies the palette directly, so there
/// is no vision step; pricing and preview run against the chosen colors.
pub async fn process_guided_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let colors = color_list(&body);
    if colors.is_empty() {
        return Err(ApiError::client("Please select at least one color"));
    }

    let size = number_or(body.get("size"), 3.0);
    let layers = number_or(body.get("layers"), 3.0) as u32;

    let stock = load_stock(&state.config.stock_file)
        .await
        .context("Failed to read flower stock")?;

    let pricing = allocate(size, layers, &colors, &stock);

    let selected = selected_flower_images(&body);
    let flower_images = if selected.is_empty() {
        preview::default_flower_image_map()
    } else {
        selected
    };

    let (preview_image, _) = preview::generate_preview(
        &state.config,
        &state.http,
        size,
        layers,
        &colors,
        &flower_images,
    )
    .await
    .into_parts()?;

    let design_review = review::guided_design_review(&colors, size, layers);

    Ok(Json(json!({
        "colors_detected": colors,
        "flowerList": pricing.allocations,
        "totalPrice": pricing.total_price,
        "preview_image": preview_image,
        "design_review": design_review,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_accept_strings_and_default_on_garbage() {
        assert_eq!(number_or(Some(&json!(4)), 3.0), 4.0);
        assert_eq!(number_or(Some(&json!("4.5")), 3.0), 4.5);
        assert_eq!(number_or(Some(&json!("not a number")), 3.0), 3.0);
        assert_eq!(number_or(None, 3.0), 3.0);
    }

    #[test]
    fn zero_and_negative_dimensions_fall_back_to_the_default() {
        assert_eq!(number_or(Some(&json!(0)), 3.0), 3.0);
        assert_eq!(number_or(Some(&json!("0")), 3.0), 3.0);
        assert_eq!(number_or(Some(&json!(-2)), 3.0), 3.0);
        assert_eq!(number_or(Some(&json!(0.0)), 3.0), 3.0);
    }

    #[test]
    fn colors_require_a_string_array() {
        assert!(color_list(&json!({ "colors": "Yellow" })).is_empty());
        assert!(color_list(&json!({})).is_empty());
        assert_eq!(
            color_list(&json!({ "colors": ["Yellow", "", "Red"] })),
            vec!["Yellow".to_string(), "Red".to_string()]
        );
    }

    #[test]
    fn selected_flowers_group_by_color() {
        let body = json!({
            "selectedFlowers": [
                { "color": "Red", "imagePath": "red_rose.webp" },
                { "color": "Red", "imagePath": "Red Arali.png" },
                { "color": "White", "imagePath": "Lilly.png" },
                { "imagePath": "missing-color.png" }
            ]
        });
        let grouped = selected_flower_images(&body);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["Red"], vec!["red_rose.webp", "Red Arali.png"]);
        assert_eq!(grouped["White"], vec!["Lilly.png"]);
    }
}

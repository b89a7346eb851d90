use anyhow::Context;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::info;

use crate::ai::{preview, vision, RecoveryReason};
use crate::error::ApiError;
use crate::pricing::allocate;
use crate::review;
use crate::state::AppState;
use crate::stock::load_stock;

struct ImageUploadForm {
    image: Option<(String, Vec<u8>)>,
    size: Option<String>,
    layers: Option<String>,
}

async fn read_form(multipart: &mut Multipart) -> anyhow::Result<ImageUploadForm> {
    let mut form = ImageUploadForm {
        image: None,
        size: None,
        layers: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .context("failed to read multipart field")?
    {
        match field.name() {
            Some("image") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload")
                    .replace(['/', '\\'], "_");
                let bytes = field
                    .bytes()
                    .await
                    .context("failed to read uploaded image")?;
                form.image = Some((file_name, bytes.to_vec()));
            }
            Some("size") => form.size = Some(field.text().await.unwrap_or_default()),
            Some("layers") => form.layers = Some(field.text().await.unwrap_or_default()),
            _ => {}
        }
    }
    Ok(form)
}

/// Image-upload flow: persist the upload, detect dominant colors, price the
/// palette, and request a preview. Every external call recovers locally, so
/// only a missing image or a genuinely unexpected failure is non-200.
pub async fn process_image_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = read_form(&mut multipart).await?;
    let Some((original_name, bytes)) = form.image else {
        return Err(ApiError::client("No image file provided"));
    };

    // Zero counts as missing, same as the guided flow.
    let size = form
        .size
        .as_deref()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| *value > 0.0)
        .unwrap_or(3.0);
    let layers = form
        .layers
        .as_deref()
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(3);

    let stock = load_stock(&state.config.stock_file)
        .await
        .context("Failed to read flower stock")?;

    // Collision-avoiding name; no cleanup or type validation by design.
    let stored_name = format!("{}-{}", Utc::now().timestamp_millis(), original_name);
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .context("failed to create upload directory")?;
    tokio::fs::write(state.config.upload_dir.join(&stored_name), &bytes)
        .await
        .context("failed to store uploaded image")?;

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    let image_url = format!("http://{host}/uploads/{stored_name}");
    let uploaded_image = format!("/uploads/{stored_name}");
    info!("Stored upload {stored_name}; analyzer reference {image_url}");

    let (colors, vision_recovery) =
        vision::analyze_image(&state.config, &state.http, &image_url, &stock, size, layers)
            .await
            .into_parts()?;

    let design_review = match vision_recovery {
        Some(RecoveryReason::RemoteFailure) => review::fallback_design_review(size, layers),
        _ => review::image_design_review(&colors, size, layers),
    };

    let pricing = allocate(size, layers, &colors, &stock);

    let (preview_image, _) = preview::generate_preview(
        &state.config,
        &state.http,
        size,
        layers,
        &colors,
        &preview::default_flower_image_map(),
    )
    .await
    .into_parts()?;

    Ok(Json(json!({
        "colors_detected": colors,
        "mapped_flowers": pricing.allocations,
        "total_price": pricing.total_price,
        "preview_image": preview_image,
        "uploaded_image": uploaded_image,
        "design_review": design_review,
    })))
}

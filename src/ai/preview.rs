use std::collections::HashMap;
use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::ai::{RecoveryReason, UpstreamOutcome};
use crate::config::Config;

/// Served when preview generation fails for any reason.
pub const PLACEHOLDER_PREVIEW_URL: &str =
    "https://i.pinimg.com/originals/fa/1a/97/fa1a97d5f4e7fc274e0d507abd3b4a75.jpg";

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(90);

/// Example flower photos per color, referenced in generation prompts when
/// the caller has not picked specific flowers.
static DEFAULT_FLOWER_IMAGES: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    HashMap::from([
        (
            "Yellow",
            vec![
                "Marigold Yellow.webp",
                "Yellow_Seventhi.avif",
                "Naatu Seventhi.avif",
            ],
        ),
        ("Orange", vec!["Marigold_Orange.webp", "Orange_rose.png"]),
        ("Red", vec!["red_rose.webp", "Red Arali.png"]),
        ("Pink", vec!["Pink arali.webp", "Penner rose.webp"]),
        ("Purple", vec!["Purple_seventhi.webp", "Vaadamalli.png"]),
        ("White", vec!["White_seventhi.webp", "Lilly.png"]),
        ("Green", vec!["Savukku.png"]),
    ])
});

pub fn default_flower_image_map() -> HashMap<String, Vec<String>> {
    DEFAULT_FLOWER_IMAGES
        .iter()
        .map(|(color, images)| {
            (
                (*color).to_string(),
                images.iter().map(|image| (*image).to_string()).collect(),
            )
        })
        .collect()
}

/// Requests a generated preview image; any failure recovers to the fixed
/// placeholder so the surrounding request still succeeds.
pub async fn generate_preview(
    config: &Config,
    client: &Client,
    size: f64,
    layers: u32,
    colors: &[String],
    flower_images: &HashMap<String, Vec<String>>,
) -> UpstreamOutcome<String> {
    let prompt = build_prompt(size, layers, colors, flower_images);
    debug!(target: "ai.preview", prompt = %prompt, "sending preview request");

    match request_generation(config, client, &prompt).await {
        Ok(url) => UpstreamOutcome::Success(url),
        Err(err) => {
            warn!("Preview generation failed: {err:#}");
            UpstreamOutcome::Recovered {
                value: PLACEHOLDER_PREVIEW_URL.to_string(),
                reason: RecoveryReason::RemoteFailure,
            }
        }
    }
}

async fn request_generation(config: &Config, client: &Client, prompt: &str) -> anyhow::Result<String> {
    let response = client
        .post(&config.dalle_endpoint)
        .timeout(UPSTREAM_TIMEOUT)
        .header("api-key", &config.dalle_api_key)
        .json(&json!({
            "prompt": prompt,
            "size": "1024x1024",
            "n": 1
        }))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("image endpoint returned {status}: {body}");
    }

    let body: Value = response.json().await?;
    body.pointer("/data/0/url")
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
        .ok_or_else(|| anyhow::anyhow!("image response missing data[0].url"))
}

/// Builds the generation prompt, naming one example flower per color when a
/// mapping exists (file extension dropped) and a generic reference
/// otherwise.
pub fn build_prompt(
    size: f64,
    layers: u32,
    colors: &[String],
    flower_images: &HashMap<String, Vec<String>>,
) -> String {
    let color_list = colors.join(", ");
    let references = colors
        .iter()
        .map(|color| {
            let example = flower_images
                .iter()
                .find(|(key, images)| key.eq_ignore_ascii_case(color) && !images.is_empty())
                .map(|(_, images)| images[0].as_str());
            match example {
                Some(image) => format!("{color} flowers like {}", strip_extension(image)),
                None => format!("{color} flowers"),
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Realistic photograph of a traditional Onam pookkolam (Indian flower rangoli) \
         made with real {color_list} flower petals including {references}. The \
         pookkolam is {size} feet in diameter with {layers} concentric circular \
         layers. The photograph shows the detailed texture of actual flower petals \
         and natural lighting. The pookkolam is arranged on a traditional floor in \
         Kerala style with authentic flower arrangements."
    )
}

fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

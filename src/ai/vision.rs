use std::time::{Duration, SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::{Host, Url};

use crate::ai::{RecoveryReason, UpstreamOutcome};
use crate::config::Config;
use crate::stock::StockEntry;

/// Fixed palette when the remote response yields no parseable color list.
pub const PARSE_FALLBACK_COLORS: [&str; 3] = ["Yellow", "Red", "White"];

/// Fixed palette when the remote service cannot be reached at all.
pub const REMOTE_FALLBACK_COLORS: [&str; 4] = ["Yellow", "Pink", "Purple", "Green"];

/// Pool the local sampler pads from once the catalog colors run out.
const COMMON_COLORS: [&str; 7] = [
    "Yellow", "Pink", "Purple", "White", "Red", "Orange", "Green",
];

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(90);

/// Extracts 3-5 dominant color names for the uploaded image.
///
/// The remote analyzer fetches the image by URL, so a loopback-hosted URL is
/// unreachable to it; that case short-circuits to the local sampler. Remote
/// or parse failures recover to fixed palettes. The caller always gets a
/// usable color set.
pub async fn analyze_image(
    config: &Config,
    client: &Client,
    image_url: &str,
    stock: &[StockEntry],
    size: f64,
    layers: u32,
) -> UpstreamOutcome<Vec<String>> {
    if is_loopback_url(image_url) {
        info!("Image URL {image_url} is loopback-hosted; using local color sampling");
        return UpstreamOutcome::Recovered {
            value: sample_stock_colors(stock),
            reason: RecoveryReason::LoopbackHost,
        };
    }

    match request_analysis(config, client, image_url, stock, size, layers).await {
        Ok(content) => match parse_detected_colors(&content) {
            Some(colors) => UpstreamOutcome::Success(colors),
            None => {
                warn!("Vision response contained no parseable color list");
                UpstreamOutcome::Recovered {
                    value: to_owned(&PARSE_FALLBACK_COLORS),
                    reason: RecoveryReason::UnparseableResponse,
                }
            }
        },
        Err(err) => {
            warn!("Vision analysis failed: {err:#}");
            UpstreamOutcome::Recovered {
                value: to_owned(&REMOTE_FALLBACK_COLORS),
                reason: RecoveryReason::RemoteFailure,
            }
        }
    }
}

async fn request_analysis(
    config: &Config,
    client: &Client,
    image_url: &str,
    stock: &[StockEntry],
    size: f64,
    layers: u32,
) -> anyhow::Result<String> {
    let stock_list = stock
        .iter()
        .map(|entry| format!("{} - {}/kg", entry.flower, entry.price_per_kg))
        .collect::<Vec<_>>()
        .join(", ");

    let payload = json!({
        "messages": [
            {
                "role": "system",
                "content": "You are a flower design assistant. Extract dominant colors \
                            from pookkolam (Indian flower rangoli) images, map them to \
                            flowers from stock, and identify 3-5 main colors. Respond \
                            with JSON containing colors_detected array."
            },
            {
                "role": "user",
                "content": [
                    {
                        "type": "text",
                        "text": format!("Here is the stock list with prices: {stock_list}")
                    },
                    {
                        "type": "text",
                        "text": format!(
                            "Calculate for a {size} ft, {layers} layer pookkolam. Analyze \
                             this image and identify 3-5 main colors. IMPORTANT: Include a \
                             'colors_detected' array in your response with the color names."
                        )
                    },
                    {
                        "type": "image_url",
                        "image_url": image_url
                    }
                ]
            }
        ],
        "max_tokens": 1000,
        "temperature": 0.7
    });

    debug!(target: "ai.vision", endpoint = %config.vision_endpoint, "sending vision request");

    let response = client
        .post(&config.vision_endpoint)
        .timeout(UPSTREAM_TIMEOUT)
        .header("api-key", &config.vision_api_key)
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("vision endpoint returned {status}: {body}");
    }

    let body: Value = response.json().await?;
    body.pointer("/choices/0/message/content")
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
        .ok_or_else(|| anyhow::anyhow!("vision response missing choices[0].message.content"))
}

/// Strict parse of the analyzer's free text: first the embedded JSON object
/// with a `colors_detected` string array, then a pattern scan for a
/// `colors detected:` field. `None` means unparseable, never a partial
/// result.
pub fn parse_detected_colors(text: &str) -> Option<Vec<String>> {
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            // A JSON object is present; it either validates or the whole
            // response counts as unparseable. No pattern-scan rescue here.
            let parsed: Value = serde_json::from_str(&text[start..=end]).ok()?;
            let colors: Vec<String> = parsed
                .get("colors_detected")?
                .as_array()?
                .iter()
                .filter_map(|value| value.as_str())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect();
            return if colors.is_empty() { None } else { Some(colors) };
        }
    }

    static COLORS_FIELD: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)colors[_\s]detected[:\s]+(.*)").expect("valid regex"));
    static SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,\s]+").expect("valid regex"));

    let captured = COLORS_FIELD.captures(text)?.get(1)?.as_str();
    let line = captured.lines().next().unwrap_or(captured);
    let colors: Vec<String> = SEPARATOR
        .split(line)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    if colors.is_empty() {
        None
    } else {
        Some(colors)
    }
}

/// Heuristic stand-in for remote analysis: 3-5 distinct colors drawn from
/// the catalog in order, padded from the common-color pool if the catalog
/// has too few.
pub fn sample_stock_colors(stock: &[StockEntry]) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for entry in stock {
        if !colors
            .iter()
            .any(|color| color.eq_ignore_ascii_case(&entry.color))
        {
            colors.push(entry.color.clone());
        }
    }

    let jitter = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.subsec_nanos() as usize)
        .unwrap_or(0);
    let target = 3 + jitter % 3;

    colors.truncate(target);
    for candidate in COMMON_COLORS {
        if colors.len() >= target {
            break;
        }
        if !colors
            .iter()
            .any(|color| color.eq_ignore_ascii_case(candidate))
        {
            colors.push(candidate.to_string());
        }
    }
    colors
}

fn is_loopback_url(image_url: &str) -> bool {
    let Ok(parsed) = Url::parse(image_url) else {
        return false;
    };
    match parsed.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

fn to_owned(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|color| color.to_string()).collect()
}

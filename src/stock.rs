use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One row of the flower catalog. Field names mirror the CSV headers so the
/// same shape flows through the CSV reader and the `/api/flowers` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockEntry {
    #[serde(rename = "Flower")]
    pub flower: String,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Available As")]
    pub available_as: String,
    #[serde(rename = "PricePerKg")]
    pub price_per_kg: f64,
}

const DEFAULT_STOCK: &[(&str, &str, &str, f64)] = &[
    ("Marigold Yellow", "Yellow", "Loose", 250.0),
    ("Marigold Orange", "Orange", "Loose", 260.0),
    ("Rose Petals", "Red", "Petals", 400.0),
    ("Jasmine", "White", "Loose", 500.0),
    ("Chrysanthemum Purple", "Purple", "Loose", 300.0),
    ("Carnation Pink", "Pink", "Loose", 450.0),
    ("Leaves Green", "Green", "Loose", 100.0),
];

fn default_stock_csv() -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (flower, color, available_as, price_per_kg) in DEFAULT_STOCK {
        writer.serialize(StockEntry {
            flower: (*flower).to_string(),
            color: (*color).to_string(),
            available_as: (*available_as).to_string(),
            price_per_kg: *price_per_kg,
        })?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to build default stock: {err}"))
}

/// Loads the catalog, creating it with the default rows when absent.
/// Re-read on every request; nothing writes back to it.
pub async fn load_stock(path: &Path) -> Result<Vec<StockEntry>> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(path, default_stock_csv()?)
            .await
            .with_context(|| format!("failed to write default stock to {}", path.display()))?;
        info!("Created default flower stock at {}", path.display());
    }

    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read flower stock from {}", path.display()))?;

    let mut reader = csv::Reader::from_reader(raw.as_slice());
    let mut entries = Vec::new();
    for record in reader.deserialize() {
        let entry: StockEntry =
            record.with_context(|| format!("malformed stock row in {}", path.display()))?;
        entries.push(entry);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn creates_default_catalog_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("flower_stock.csv");

        let entries = load_stock(&path).await.unwrap();
        assert!(path.exists());
        assert_eq!(entries.len(), 7);
        assert_eq!(entries[0].flower, "Marigold Yellow");
        assert_eq!(entries[0].color, "Yellow");
        assert_eq!(entries[0].price_per_kg, 250.0);
        assert!(entries.iter().all(|entry| entry.price_per_kg > 0.0));
    }

    #[tokio::test]
    async fn reads_existing_catalog_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flower_stock.csv");
        std::fs::write(
            &path,
            "Flower,Color,Available As,PricePerKg\n\
             Rose Petals,Red,Petals,400\n\
             Red Arali,Red,Loose,320\n",
        )
        .unwrap();

        let entries = load_stock(&path).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].flower, "Rose Petals");
        assert_eq!(entries[1].flower, "Red Arali");
    }

    #[tokio::test]
    async fn malformed_rows_are_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flower_stock.csv");
        std::fs::write(
            &path,
            "Flower,Color,Available As,PricePerKg\nJasmine,White,Loose,not-a-price\n",
        )
        .unwrap();

        assert!(load_stock(&path).await.is_err());
    }
}

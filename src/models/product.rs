use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/600x400?text=No+Image";
pub const DEFAULT_CATEGORY: &str = "UNCATEGORIZED";
pub const DEFAULT_CONDITION: &str = "BRAND_NEW";

// The validated form of the raw client payload. Clients send loosely typed
// JSON (numbers as strings, single image instead of a list); everything is
// coerced once here, at initiation, so materialization works from clean data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedProduct {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub brand: Option<String>,
    pub warranty: Option<String>,
    pub price: Option<f64>,
    pub discount_price: Option<f64>,
    pub stock_in_count: u32,
    pub image_urls: Vec<String>,
    pub quick_sale: bool,
}

impl StagedProduct {
    pub fn from_value(data: &Value) -> Self {
        let stock_in_count = coerce_number(data.get("stockInCount"))
            .filter(|n| *n >= 1.0)
            .map(|n| n as u32)
            .unwrap_or(1);

        Self {
            title: coerce_string(data.get("title")),
            description: coerce_string(data.get("description")),
            category: coerce_string(data.get("category")),
            condition: coerce_string(data.get("condition")),
            brand: coerce_string(data.get("brand")),
            warranty: coerce_string(data.get("warranty")),
            price: coerce_number(data.get("price")),
            discount_price: coerce_number(data.get("discountPrice")),
            stock_in_count,
            image_urls: coerce_images(data),
            quick_sale: data.get("quickSale").and_then(Value::as_bool).unwrap_or(false),
        }
    }
}

fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

// imageUrls may arrive as an array or a bare string; imageUrl is the
// single-image spelling used by older clients.
fn coerce_images(data: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    match data.get("imageUrls") {
        Some(Value::Array(items)) => {
            urls.extend(items.iter().filter_map(|v| v.as_str().map(str::to_string)));
        }
        Some(Value::String(s)) if !s.is_empty() => urls.push(s.clone()),
        _ => {}
    }
    if urls.is_empty() {
        if let Some(Value::String(s)) = data.get("imageUrl") {
            if !s.is_empty() {
                urls.push(s.clone());
            }
        }
    }
    urls
}

#[derive(Debug, Error)]
pub enum MaterializationError {
    #[error("staged product has no title")]
    MissingTitle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub discount_price: Option<f64>,
    pub category: String,
    pub condition: String,
    pub brand: Option<String>,
    pub warranty: Option<String>,
    pub stock_in_count: u32,
    pub stock_total: u32,
    pub image_url: String,
    pub images: Vec<String>,
    pub seller_id: String,
    pub status: String,
    pub quick_sale: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    // Builds the listing from staged data: first image becomes the cover,
    // the rest the gallery, numeric fields fall back to safe defaults.
    pub fn from_staged(staged: &StagedProduct, seller_id: &str) -> Result<Self, MaterializationError> {
        let title = staged.title.clone().ok_or(MaterializationError::MissingTitle)?;

        let mut images = staged.image_urls.clone();
        let image_url = if images.is_empty() {
            PLACEHOLDER_IMAGE_URL.to_string()
        } else {
            images.remove(0)
        };

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description: staged.description.clone().unwrap_or_default(),
            price: staged.price.unwrap_or(0.0),
            discount_price: staged.discount_price,
            category: staged
                .category
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            condition: staged
                .condition
                .clone()
                .unwrap_or_else(|| DEFAULT_CONDITION.to_string()),
            brand: staged.brand.clone(),
            warranty: staged.warranty.clone(),
            stock_in_count: staged.stock_in_count.max(1),
            stock_total: staged.stock_in_count.max(1),
            image_url,
            images,
            seller_id: seller_id.to_string(),
            status: "onsale".to_string(),
            quick_sale: staged.quick_sale,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_coerces_numeric_strings() {
        let staged = StagedProduct::from_value(&json!({
            "title": "Phone case",
            "price": "1000",
            "discountPrice": "750.50",
            "stockInCount": "3"
        }));

        assert_eq!(staged.price, Some(1000.0));
        assert_eq!(staged.discount_price, Some(750.5));
        assert_eq!(staged.stock_in_count, 3);
    }

    #[test]
    fn from_value_defaults_stock_to_one() {
        let staged = StagedProduct::from_value(&json!({ "price": 100 }));
        assert_eq!(staged.stock_in_count, 1);

        let staged = StagedProduct::from_value(&json!({ "price": 100, "stockInCount": "many" }));
        assert_eq!(staged.stock_in_count, 1);
    }

    #[test]
    fn from_value_accepts_single_image_spellings() {
        let staged = StagedProduct::from_value(&json!({ "imageUrls": "a.jpg" }));
        assert_eq!(staged.image_urls, vec!["a.jpg"]);

        let staged = StagedProduct::from_value(&json!({ "imageUrl": "b.jpg" }));
        assert_eq!(staged.image_urls, vec!["b.jpg"]);

        let staged = StagedProduct::from_value(&json!({ "imageUrls": ["a.jpg", "b.jpg"] }));
        assert_eq!(staged.image_urls, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn from_staged_splits_cover_and_gallery() {
        let staged = StagedProduct::from_value(&json!({
            "title": "Blender",
            "price": 4500,
            "imageUrls": ["cover.jpg", "side.jpg", "back.jpg"]
        }));

        let product = Product::from_staged(&staged, "user-1").unwrap();
        assert_eq!(product.image_url, "cover.jpg");
        assert_eq!(product.images, vec!["side.jpg", "back.jpg"]);
        assert_eq!(product.seller_id, "user-1");
        assert_eq!(product.status, "onsale");
    }

    #[test]
    fn from_staged_applies_defaults() {
        let staged = StagedProduct::from_value(&json!({ "title": "Mystery box" }));

        let product = Product::from_staged(&staged, "user-1").unwrap();
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE_URL);
        assert!(product.images.is_empty());
        assert_eq!(product.price, 0.0);
        assert_eq!(product.stock_in_count, 1);
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.condition, DEFAULT_CONDITION);
    }

    #[test]
    fn from_staged_requires_title() {
        let staged = StagedProduct::from_value(&json!({ "price": 100 }));
        assert!(matches!(
            Product::from_staged(&staged, "user-1"),
            Err(MaterializationError::MissingTitle)
        ));
    }
}

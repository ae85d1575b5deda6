use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Storefront product (gear, guides, merchandise)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: u32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_available(&self) -> bool {
        self.is_active && self.stock > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub stock: u32,
    pub image_url: Option<String>,
}

impl ProductDraft {
    pub fn into_product(self) -> Result<Product, ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::Invalid("name is required".to_string()));
        }
        if self.price < 0 {
            return Err(ProductError::Invalid("price must not be negative".to_string()));
        }

        Ok(Product {
            id: Uuid::new_v4(),
            name: self.name,
            category: self.category,
            description: self.description,
            price: self.price,
            stock: self.stock,
            image_url: self.image_url,
            is_active: true,
            created_at: Utc::now(),
        })
    }
}

/// Product-related errors
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Invalid product: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_into_product() {
        let product = ProductDraft {
            name: "Dry bag".to_string(),
            category: "gear".to_string(),
            description: None,
            price: 120,
            stock: 0,
            image_url: None,
        }
        .into_product()
        .unwrap();

        assert!(product.is_active);
        assert!(!product.is_available());
    }

    #[test]
    fn test_negative_price_rejected() {
        let result = ProductDraft {
            name: "Hat".to_string(),
            category: "apparel".to_string(),
            description: None,
            price: -1,
            stock: 3,
            image_url: None,
        }
        .into_product();

        assert!(matches!(result, Err(ProductError::Invalid(_))));
    }
}

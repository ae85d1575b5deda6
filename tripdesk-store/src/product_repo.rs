use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use tripdesk_catalog::Product;
use tripdesk_core::repository::{ProductRepository, RepoError};

use crate::database::db_count;

pub struct StoreProductRepository {
    pool: PgPool,
}

impl StoreProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    category: String,
    description: Option<String>,
    price: i64,
    stock: i32,
    image_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            price: row.price,
            stock: row.stock.max(0) as u32,
            image_url: row.image_url,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ProductRepository for StoreProductRepository {
    async fn create_product(&self, product: &Product) -> Result<Uuid, RepoError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, description, price, stock, image_url, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.price)
        .bind(db_count(product.stock, "stock")?)
        .bind(&product.image_url)
        .bind(product.is_active)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(product.id)
    }

    async fn get_product(&self, id: Uuid) -> Result<Option<Product>, RepoError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, category, description, price, stock, image_url, is_active, created_at
             FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepoError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            "SELECT id, name, category, description, price, stock, image_url, is_active, created_at
             FROM products ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

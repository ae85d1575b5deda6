use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tripdesk_catalog::{InventoryError, Trip, TripDate};
use tripdesk_core::repository::{RepoError, TripRepository};

use crate::database::db_count;

pub struct StoreTripRepository {
    pool: PgPool,
}

impl StoreTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn dates_for(&self, trip_ids: &[String]) -> Result<HashMap<String, Vec<TripDate>>, RepoError> {
        let rows: Vec<TripDateRow> = sqlx::query_as(
            "SELECT id, trip_id, start_date, end_date, is_available, available_slots
             FROM trip_dates WHERE trip_id = ANY($1) ORDER BY start_date",
        )
        .bind(trip_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_trip: HashMap<String, Vec<TripDate>> = HashMap::new();
        for row in rows {
            let trip_id = row.trip_id.clone();
            by_trip.entry(trip_id).or_default().push(row.into());
        }
        Ok(by_trip)
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: String,
    title: String,
    destination: String,
    category: String,
    description: Option<String>,
    itinerary: Option<String>,
    base_price: i64,
    discount: i64,
    min_group_size: i32,
    max_group_size: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct TripDateRow {
    id: String,
    trip_id: String,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    is_available: bool,
    available_slots: i32,
}

impl From<TripDateRow> for TripDate {
    fn from(row: TripDateRow) -> Self {
        TripDate {
            id: row.id,
            start_date: row.start_date,
            end_date: row.end_date,
            is_available: row.is_available,
            available_slots: row.available_slots.max(0) as u32,
        }
    }
}

impl TripRow {
    fn into_trip(self, dates: Vec<TripDate>) -> Trip {
        Trip {
            id: self.id,
            title: self.title,
            destination: self.destination,
            category: self.category,
            description: self.description,
            itinerary: self.itinerary,
            base_price: self.base_price,
            discount: self.discount,
            min_group_size: self.min_group_size.max(0) as u32,
            max_group_size: self.max_group_size.max(0) as u32,
            dates,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const TRIP_COLUMNS: &str = "id, title, destination, category, description, itinerary, base_price, discount, \
                            min_group_size, max_group_size, is_active, created_at, updated_at";

#[async_trait]
impl TripRepository for StoreTripRepository {
    async fn get_trip(&self, id: &str) -> Result<Option<Trip>, RepoError> {
        let row: Option<TripRow> = sqlx::query_as(&format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut dates = self.dates_for(&[row.id.clone()]).await?;
        let trip_dates = dates.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_trip(trip_dates)))
    }

    async fn list_trips(&self) -> Result<Vec<Trip>, RepoError> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!("SELECT {} FROM trips ORDER BY created_at DESC", TRIP_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let mut dates = self.dates_for(&ids).await?;

        Ok(rows.into_iter()
            .map(|row| {
                let trip_dates = dates.remove(&row.id).unwrap_or_default();
                row.into_trip(trip_dates)
            })
            .collect())
    }

    async fn save_trip(&self, trip: &Trip) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO trips (id, title, destination, category, description, itinerary, base_price, discount,
                               min_group_size, max_group_size, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                destination = EXCLUDED.destination,
                category = EXCLUDED.category,
                description = EXCLUDED.description,
                itinerary = EXCLUDED.itinerary,
                base_price = EXCLUDED.base_price,
                discount = EXCLUDED.discount,
                min_group_size = EXCLUDED.min_group_size,
                max_group_size = EXCLUDED.max_group_size,
                is_active = EXCLUDED.is_active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&trip.id)
        .bind(&trip.title)
        .bind(&trip.destination)
        .bind(&trip.category)
        .bind(&trip.description)
        .bind(&trip.itinerary)
        .bind(trip.base_price)
        .bind(trip.discount)
        .bind(db_count(trip.min_group_size, "min_group_size")?)
        .bind(db_count(trip.max_group_size, "max_group_size")?)
        .bind(trip.is_active)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM trip_dates WHERE trip_id = $1")
            .bind(&trip.id)
            .execute(&mut *tx)
            .await?;

        for date in &trip.dates {
            sqlx::query(
                r#"
                INSERT INTO trip_dates (id, trip_id, start_date, end_date, is_available, available_slots)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&date.id)
            .bind(&trip.id)
            .bind(date.start_date)
            .bind(date.end_date)
            .bind(date.is_available)
            .bind(db_count(date.available_slots, "available_slots")?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_trip(&self, id: &str) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn reserve_slots(&self, trip_id: &str, date_id: &str, quantity: u32) -> Result<(), RepoError> {
        let qty = db_count(quantity, "quantity")?;
        let result = sqlx::query(
            r#"
            UPDATE trip_dates
            SET available_slots = available_slots - $3,
                is_available = (available_slots - $3) > 0
            WHERE trip_id = $1 AND id = $2 AND is_available AND available_slots >= $3
            "#,
        )
        .bind(trip_id)
        .bind(date_id)
        .bind(qty)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Nothing updated: work out why for the caller.
        let current: Option<(bool, i32)> = sqlx::query_as(
            "SELECT is_available, available_slots FROM trip_dates WHERE trip_id = $1 AND id = $2",
        )
        .bind(trip_id)
        .bind(date_id)
        .fetch_optional(&self.pool)
        .await?;

        let err = match current {
            None => InventoryError::NotFound(date_id.to_string()),
            Some((false, _)) => InventoryError::Closed(date_id.to_string()),
            Some((true, available)) => InventoryError::InsufficientSlots {
                requested: quantity,
                available: available.max(0) as u32,
            },
        };
        Err(Box::new(err))
    }

    async fn release_slots(&self, trip_id: &str, date_id: &str, quantity: u32) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE trip_dates
            SET available_slots = available_slots + $3,
                is_available = CASE WHEN available_slots = 0 AND $3 > 0 THEN TRUE ELSE is_available END
            WHERE trip_id = $1 AND id = $2
            "#,
        )
        .bind(trip_id)
        .bind(date_id)
        .bind(db_count(quantity, "quantity")?)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Box::new(InventoryError::NotFound(date_id.to_string())));
        }
        Ok(())
    }
}

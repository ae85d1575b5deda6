use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use tripdesk_booking::{Booking, BookingStatus, PersonalInfo, TravelDetails};
use tripdesk_core::repository::{BookingFilter, BookingRepository, RepoError};

use crate::database::db_count;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    trip_id: String,
    selected_date: String,
    personal_info: Json<PersonalInfo>,
    travel_details: Json<TravelDetails>,
    number_of_people: i32,
    total_price: i64,
    status: String,
    idempotency_key: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = RepoError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            trip_id: row.trip_id,
            selected_date: row.selected_date,
            personal_info: row.personal_info.0,
            travel_details: row.travel_details.0,
            number_of_people: row.number_of_people.max(0) as u32,
            total_price: row.total_price,
            status: row.status.parse::<BookingStatus>()?,
            idempotency_key: row.idempotency_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const BOOKING_COLUMNS: &str = "id, trip_id, selected_date, personal_info, travel_details, number_of_people, \
                               total_price, status, idempotency_key, created_at, updated_at";

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create_booking(&self, booking: &Booking) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (id, trip_id, selected_date, personal_info, travel_details, number_of_people,
                                  total_price, status, idempotency_key, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.trip_id)
        .bind(&booking.selected_date)
        .bind(Json(&booking.personal_info))
        .bind(Json(&booking.travel_details))
        .bind(db_count(booking.number_of_people, "number_of_people")?)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.idempotency_key)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn find_by_idempotency_key(&self, key: Uuid) -> Result<Option<Booking>, RepoError> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {} FROM bookings WHERE idempotency_key = $1", BOOKING_COLUMNS))
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, RepoError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings
             WHERE ($1::TEXT IS NULL OR trip_id = $1) AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(filter.trip_id.as_deref())
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

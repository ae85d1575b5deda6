use async_trait::async_trait;
use sqlx::PgPool;
use tripdesk_core::membership::MemberRecord;
use tripdesk_core::repository::{MemberRepository, RepoError};

pub struct StoreMemberRepository {
    pool: PgPool,
}

impl StoreMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: uuid::Uuid,
    full_name: String,
    email: String,
    phone: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

#[async_trait]
impl MemberRepository for StoreMemberRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<MemberRecord>, RepoError> {
        let row: Option<MemberRow> = sqlx::query_as(
            "SELECT id, full_name, email, phone, expires_at FROM members WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| MemberRecord {
            id: r.id,
            full_name: r.full_name,
            email: r.email,
            phone: r.phone,
            expires_at: r.expires_at,
        }))
    }
}

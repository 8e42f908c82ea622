/// Vacation resource model and database operations
///
/// A vacation resource is a user's yearly entitlement, valid over a window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Vacation resource model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VacationResource {
    pub id: Uuid,

    /// Entitled user
    pub user_id: Uuid,

    /// Number of vacation days per year
    pub yearly_days: i32,

    /// Start of the validity window
    #[sqlx(rename = "from_date")]
    pub from: DateTime<Utc>,

    /// End of the validity window
    #[sqlx(rename = "to_date")]
    pub to: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a vacation resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVacationResource {
    pub user_id: Uuid,
    pub yearly_days: i32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Full replacement of a vacation resource's mutable fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVacationResource {
    pub yearly_days: i32,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl VacationResource {
    /// Inserts a new vacation resource
    pub async fn create(pool: &PgPool, data: CreateVacationResource) -> Result<Self, sqlx::Error> {
        let resource = sqlx::query_as::<_, VacationResource>(
            r#"
            INSERT INTO vacation_resources (id, user_id, yearly_days, from_date, to_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, yearly_days, from_date, to_date,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.yearly_days)
        .bind(data.from)
        .bind(data.to)
        .fetch_one(pool)
        .await?;

        Ok(resource)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let resource = sqlx::query_as::<_, VacationResource>(
            r#"
            SELECT id, user_id, yearly_days, from_date, to_date,
                   created_at, updated_at, deleted_at
            FROM vacation_resources
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(resource)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let resources = sqlx::query_as::<_, VacationResource>(
            r#"
            SELECT id, user_id, yearly_days, from_date, to_date,
                   created_at, updated_at, deleted_at
            FROM vacation_resources
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY from_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(resources)
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateVacationResource,
    ) -> Result<Option<Self>, sqlx::Error> {
        let resource = sqlx::query_as::<_, VacationResource>(
            r#"
            UPDATE vacation_resources
            SET yearly_days = $2, from_date = $3, to_date = $4, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, user_id, yearly_days, from_date, to_date,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.yearly_days)
        .bind(data.from)
        .bind(data.to)
        .fetch_optional(pool)
        .await?;

        Ok(resource)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE vacation_resources SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

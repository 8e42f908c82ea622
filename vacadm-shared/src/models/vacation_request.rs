/// Vacation request model and database operations
///
/// A vacation request is a *pending* absence. It stays pending until a
/// proven ancestor of the requesting user approves it, which creates a
/// [`Vacation`](super::vacation::Vacation). Rejection is not modelled.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Vacation request model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VacationRequest {
    /// Unique request ID
    pub id: Uuid,

    /// Requesting user
    pub user_id: Uuid,

    /// Requested start
    #[sqlx(rename = "from_date")]
    pub from: DateTime<Utc>,

    /// Requested end
    #[sqlx(rename = "to_date")]
    pub to: DateTime<Utc>,

    pub created_at: DateTime<Utc>,

    pub updated_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a vacation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVacationRequest {
    pub user_id: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Full replacement of the requested interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVacationRequest {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl VacationRequest {
    /// Inserts a new vacation request
    pub async fn create(pool: &PgPool, data: CreateVacationRequest) -> Result<Self, sqlx::Error> {
        let request = sqlx::query_as::<_, VacationRequest>(
            r#"
            INSERT INTO vacation_requests (id, user_id, from_date, to_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, from_date, to_date, created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.from)
        .bind(data.to)
        .fetch_one(pool)
        .await?;

        Ok(request)
    }

    /// Finds a live vacation request by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let request = sqlx::query_as::<_, VacationRequest>(
            r#"
            SELECT id, user_id, from_date, to_date, created_at, updated_at, deleted_at
            FROM vacation_requests
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(request)
    }

    /// Lists the live requests of one user, ordered by start
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let requests = sqlx::query_as::<_, VacationRequest>(
            r#"
            SELECT id, user_id, from_date, to_date, created_at, updated_at, deleted_at
            FROM vacation_requests
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY from_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(requests)
    }

    /// Replaces the requested interval
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateVacationRequest,
    ) -> Result<Option<Self>, sqlx::Error> {
        let request = sqlx::query_as::<_, VacationRequest>(
            r#"
            UPDATE vacation_requests
            SET from_date = $2, to_date = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, user_id, from_date, to_date, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.from)
        .bind(data.to)
        .fetch_optional(pool)
        .await?;

        Ok(request)
    }

    /// Marks a request as deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE vacation_requests SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

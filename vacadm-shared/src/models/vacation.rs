/// Vacation model and database operations
///
/// A vacation is a *confirmed* absence. Vacations are only created by the
/// approval workflow ([`crate::approval`]) and are never updated afterwards.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE vacations (
///     id UUID PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id),
///     approved_by UUID NOT NULL REFERENCES users(id),
///     from_date TIMESTAMPTZ NOT NULL,
///     to_date TIMESTAMPTZ NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     deleted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Vacation model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vacation {
    /// Unique vacation ID
    pub id: Uuid,

    /// User who is absent
    pub user_id: Uuid,

    /// User who approved the absence
    pub approved_by: Uuid,

    /// Start of the absence
    #[sqlx(rename = "from_date")]
    pub from: DateTime<Utc>,

    /// End of the absence
    #[sqlx(rename = "to_date")]
    pub to: DateTime<Utc>,

    /// When the vacation was created
    pub created_at: DateTime<Utc>,

    /// When the vacation was deleted (persistent storage only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a vacation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVacation {
    pub user_id: Uuid,
    pub approved_by: Uuid,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Vacation {
    /// Inserts a new vacation
    pub async fn create(pool: &PgPool, data: CreateVacation) -> Result<Self, sqlx::Error> {
        let vacation = sqlx::query_as::<_, Vacation>(
            r#"
            INSERT INTO vacations (id, user_id, approved_by, from_date, to_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, approved_by, from_date, to_date, created_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.approved_by)
        .bind(data.from)
        .bind(data.to)
        .fetch_one(pool)
        .await?;

        Ok(vacation)
    }

    /// Finds a live vacation by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let vacation = sqlx::query_as::<_, Vacation>(
            r#"
            SELECT id, user_id, approved_by, from_date, to_date, created_at, deleted_at
            FROM vacations
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(vacation)
    }

    /// Lists the live vacations of one user, ordered by start
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let vacations = sqlx::query_as::<_, Vacation>(
            r#"
            SELECT id, user_id, approved_by, from_date, to_date, created_at, deleted_at
            FROM vacations
            WHERE user_id = $1 AND deleted_at IS NULL
            ORDER BY from_date ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(vacations)
    }

    /// Lists the live vacations of every live member of a team
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let vacations = sqlx::query_as::<_, Vacation>(
            r#"
            SELECT v.id, v.user_id, v.approved_by, v.from_date, v.to_date,
                   v.created_at, v.deleted_at
            FROM vacations v
            INNER JOIN users u ON u.id = v.user_id
            WHERE u.team_id = $1
              AND u.deleted_at IS NULL
              AND v.deleted_at IS NULL
            ORDER BY v.from_date ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(vacations)
    }

    /// Marks a vacation as deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE vacations SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

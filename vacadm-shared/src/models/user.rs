/// User model and database operations
///
/// Users form a forest: every user has at most one direct parent, and the
/// parent relation is followed transitively when deciding delegated
/// permissions (see [`crate::auth::relation`]). A user may belong to one team.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     parent_id UUID REFERENCES users(id),
///     team_id UUID REFERENCES teams(id),
///     first_name VARCHAR(255) NOT NULL DEFAULT '',
///     last_name VARCHAR(255) NOT NULL DEFAULT '',
///     email VARCHAR(320) NOT NULL,      -- unique among live users
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ,
///     deleted_at TIMESTAMPTZ
/// );
/// ```
///
/// Deletion is logical: `deleted_at` is set and every query filters such rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4), assigned on creation
    pub id: Uuid,

    /// Direct parent of this user, if any
    ///
    /// Reference only: deleting the parent does not cascade.
    pub parent_id: Option<Uuid>,

    /// Team this user belongs to, if any
    pub team_id: Option<Uuid>,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address, unique across all live users
    pub email: String,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: Option<DateTime<Utc>>,

    /// When the user was deleted (persistent storage only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Full display name, used in notifications
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for creating a new user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateUser {
    /// Optional parent, must reference an existing user
    pub parent_id: Option<Uuid>,

    /// Optional team, must reference an existing team
    pub team_id: Option<Uuid>,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Email address (required, unique)
    pub email: String,
}

/// Input for updating an existing user
///
/// All fields are optional. Only `Some` fields are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New parent
    pub parent_id: Option<Uuid>,

    /// New team
    pub team_id: Option<Uuid>,

    /// New first name
    pub first_name: Option<String>,

    /// New last name
    pub last_name: Option<String>,

    /// New email address
    pub email: Option<String>,
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique index violation)
    /// - Parent or team do not exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, parent_id, team_id, first_name, last_name, email)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, parent_id, team_id, first_name, last_name, email,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.parent_id)
        .bind(data.team_id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a live user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, parent_id, team_id, first_name, last_name, email,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a live user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, parent_id, team_id, first_name, last_name, email,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists all live users, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, parent_id, team_id, first_name, last_name, email,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Lists all live users belonging to a team
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, parent_id, team_id, first_name, last_name, email,
                   created_at, updated_at, deleted_at
            FROM users
            WHERE team_id = $1 AND deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Applies a partial update
    ///
    /// Fields that are `None` in `data` keep their current value. The
    /// `updated_at` timestamp is set to the current time.
    ///
    /// # Returns
    ///
    /// The updated user, or None if no live user has this ID
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET parent_id = COALESCE($2, parent_id),
                team_id = COALESCE($3, team_id),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                email = COALESCE($6, email),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, parent_id, team_id, first_name, last_name, email,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.parent_id)
        .bind(data.team_id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Marks a user as deleted
    ///
    /// # Returns
    ///
    /// True if a live user was deleted, false if none existed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Team model and database operations
///
/// A team has exactly one owner; a user may own several teams. Members
/// reference their team through `users.team_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Team model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// Owner of the team, references an existing user at creation time
    pub owner_id: Uuid,

    /// Team name
    pub name: String,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: Option<DateTime<Utc>>,

    /// When the team was deleted (persistent storage only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a new team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Owner of the team
    pub owner_id: Uuid,

    /// Team name
    pub name: String,
}

/// Input for updating a team; only `Some` fields change
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeam {
    /// New owner
    pub owner_id: Option<Uuid>,

    /// New name
    pub name: Option<String>,
}

impl Team {
    /// Inserts a new team
    pub async fn create(pool: &PgPool, data: CreateTeam) -> Result<Self, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (id, owner_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, created_at, updated_at, deleted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.owner_id)
        .bind(data.name)
        .fetch_one(pool)
        .await?;

        Ok(team)
    }

    /// Finds a live team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at, deleted_at
            FROM teams
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Lists all live teams, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at, deleted_at
            FROM teams
            WHERE deleted_at IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Applies a partial update, returning None if the team does not exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTeam,
    ) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET owner_id = COALESCE($2, owner_id),
                name = COALESCE($3, name),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING id, owner_id, name, created_at, updated_at, deleted_at
            "#,
        )
        .bind(id)
        .bind(data.owner_id)
        .bind(data.name)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Marks a team as deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE teams SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_team_default() {
        let update = UpdateTeam::default();
        assert!(update.owner_id.is_none());
        assert!(update.name.is_none());
    }

    #[test]
    fn test_team_serializes_owner() {
        let owner_id = Uuid::new_v4();
        let team = Team {
            id: Uuid::new_v4(),
            owner_id,
            name: "platform".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };

        let json = serde_json::to_value(&team).unwrap();
        assert_eq!(json["owner_id"], owner_id.to_string());
        assert_eq!(json["name"], "platform");
    }
}

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use stratus_application::SpaceRepository;
use stratus_core::{AppError, AppResult};
use stratus_domain::{Organization, OrganizationGuid, Space, SpaceGuid};
use uuid::Uuid;

/// PostgreSQL-backed organization and space catalog.
#[derive(Clone)]
pub struct PostgresSpaceRepository {
    pool: PgPool,
}

impl PostgresSpaceRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SpaceRow {
    guid: Uuid,
    name: String,
    organization_guid: Uuid,
}

#[async_trait]
impl SpaceRepository for PostgresSpaceRepository {
    async fn save_organization(&self, organization: Organization) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO organizations (guid, name)
            VALUES ($1, $2)
            "#,
        )
        .bind(organization.guid().as_uuid())
        .bind(organization.name())
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
                AppError::Conflict(format!(
                    "organization '{}' already exists",
                    organization.guid()
                ))
            }
            error => AppError::Persistence(format!("failed to save organization: {error}")),
        })?;

        Ok(())
    }

    async fn save_space(&self, space: Space) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO spaces (guid, name, organization_guid)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(space.guid().as_uuid())
        .bind(space.name())
        .bind(space.organization_guid().as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| match error {
            sqlx::Error::Database(database_error) if database_error.is_unique_violation() => {
                AppError::Conflict(format!("space '{}' already exists", space.guid()))
            }
            sqlx::Error::Database(database_error) if database_error.is_foreign_key_violation() => {
                AppError::NotFound(format!(
                    "organization '{}' does not exist",
                    space.organization_guid()
                ))
            }
            error => AppError::Persistence(format!("failed to save space: {error}")),
        })?;

        Ok(())
    }

    async fn find_space(&self, guid: SpaceGuid) -> AppResult<Option<Space>> {
        let row = sqlx::query_as::<_, SpaceRow>(
            r#"
            SELECT guid, name, organization_guid
            FROM spaces
            WHERE guid = $1
            "#,
        )
        .bind(guid.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Persistence(format!("failed to find space '{guid}': {error}")))?;

        row.map(|row| {
            Space::new(
                SpaceGuid::from_uuid(row.guid),
                row.name,
                OrganizationGuid::from_uuid(row.organization_guid),
            )
        })
        .transpose()
    }

    async fn delete_space(&self, guid: SpaceGuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM spaces
            WHERE guid = $1
            "#,
        )
        .bind(guid.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!("failed to delete space '{guid}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("space '{guid}' does not exist")));
        }

        Ok(())
    }
}

//! District and school directory. Read-only reference data for pickers.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PortalError;
use crate::models::{District, School};

pub struct DistrictDirectory {
    pool: PgPool,
}

impl DistrictDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<District>, PortalError> {
        let rows = sqlx::query_as::<_, District>(
            "SELECT id, name, state FROM districts ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn schools(&self, district_id: Uuid) -> Result<Vec<School>, PortalError> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM districts WHERE id = $1")
            .bind(district_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(PortalError::not_found("District"));
        }

        let rows = sqlx::query_as::<_, School>(
            "SELECT id, district_id, name FROM schools WHERE district_id = $1 ORDER BY name ASC",
        )
        .bind(district_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

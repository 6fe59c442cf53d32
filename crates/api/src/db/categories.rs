//! Category repository for database operations.

use sqlx::PgPool;

use gxi_core::CategoryId;

use super::{RepositoryError, map_unique_violation};
use crate::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, is_active, created_at, updated_at";

const NAME_CONFLICT: &str = "Category with this name already exists.";

/// Partial update for a category. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for catalog database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM category ORDER BY created_at DESC");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(categories)
    }

    /// Get a category by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM category WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists
    /// (case-insensitive).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, name: &str, is_active: bool) -> Result<Category, RepositoryError> {
        let sql = format!(
            "INSERT INTO category (name, is_active) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(name)
            .bind(is_active)
            .fetch_one(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, NAME_CONFLICT))?;
        Ok(category)
    }

    /// Apply a partial update. `None` fields keep their current value;
    /// `updated_at` always advances.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if a changed name is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, RepositoryError> {
        let sql = format!(
            "UPDATE category SET \
             name = COALESCE($2, name), \
             is_active = COALESCE($3, is_active), \
             updated_at = now() \
             WHERE id = $1 \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(&patch.name)
            .bind(patch.is_active)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, NAME_CONFLICT))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

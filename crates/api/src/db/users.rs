//! User repository for database operations.

use sqlx::PgPool;

use gxi_core::{Email, Role, UserId};

use super::{RepositoryError, map_unique_violation};
use crate::models::User;

/// Columns of `user_profile` in the order the [`User`] row type expects.
const USER_COLUMNS: &str = "id, email, password_hash, role, first_name, last_name, company_name, \
     street_address, address_line_2, city, state, zip_code, phone_number, \
     is_active, parent_id, root_company_id, date_joined";

/// Advisory lock key serializing registrations.
///
/// Bootstrap ("first user becomes superadmin") is a check-then-insert over
/// store cardinality; the transaction-scoped lock makes it atomic so two
/// concurrent first registrations cannot both claim the role.
const REGISTRATION_LOCK_KEY: i64 = 0x6778_6900_7265_6701;

const EMAIL_CONFLICT: &str = "A user with this email already exists.";

/// Profile fields accepted at registration. Role, activation, and the
/// password hash are decided by the store, never by the caller.
#[derive(Debug, Clone, Default)]
pub struct NewRegistration {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub street_address: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
}

/// Partial update for a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub role: Option<Role>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub street_address: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone_number: Option<String>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user_profile WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by their email address (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user_profile WHERE lower(email) = lower($1)");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user_profile ORDER BY date_joined DESC");
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(self.pool).await?;
        Ok(users)
    }

    /// List the users a non-superadmin may see: accounts in the same root
    /// company lineage, or the viewer's direct children.
    ///
    /// A viewer with no root company only sees their direct children
    /// (`root_company_id = NULL` never matches).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_visible_to(
        &self,
        viewer: UserId,
        root_company: Option<UserId>,
    ) -> Result<Vec<User>, RepositoryError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM user_profile \
             WHERE root_company_id = $1 OR parent_id = $2 \
             ORDER BY date_joined DESC"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(root_company)
            .bind(viewer)
            .fetch_all(self.pool)
            .await?;
        Ok(users)
    }

    /// Create an account through the registration flow.
    ///
    /// Runs the bootstrap state transition atomically: inside one
    /// transaction, take the registration advisory lock, count the store,
    /// and insert with role=superadmin/active when the store is empty or
    /// role=customer/inactive otherwise. The `lower(email)` unique index is
    /// the backstop against concurrent duplicate registrations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists
    /// (case-insensitive).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_registration(
        &self,
        email: &Email,
        profile: &NewRegistration,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(REGISTRATION_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profile")
            .fetch_one(&mut *tx)
            .await?;

        let (role, is_active) = if count == 0 {
            (Role::Superadmin, true)
        } else {
            (Role::Customer, false)
        };

        let sql = format!(
            "INSERT INTO user_profile \
             (email, password_hash, role, first_name, last_name, company_name, \
              street_address, address_line_2, city, state, zip_code, phone_number, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {USER_COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .bind(password_hash)
            .bind(role)
            .bind(&profile.first_name)
            .bind(&profile.last_name)
            .bind(&profile.company_name)
            .bind(&profile.street_address)
            .bind(&profile.address_line_2)
            .bind(&profile.city)
            .bind(&profile.state)
            .bind(&profile.zip_code)
            .bind(&profile.phone_number)
            .bind(is_active)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, EMAIL_CONFLICT))?;

        tx.commit().await?;
        Ok(user)
    }

    /// Apply a partial update. `None` fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if a changed email is already
    /// used by another account.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, id: UserId, patch: &UserPatch) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE user_profile SET \
             email = COALESCE($2, email), \
             role = COALESCE($3, role), \
             first_name = COALESCE($4, first_name), \
             last_name = COALESCE($5, last_name), \
             company_name = COALESCE($6, company_name), \
             street_address = COALESCE($7, street_address), \
             address_line_2 = COALESCE($8, address_line_2), \
             city = COALESCE($9, city), \
             state = COALESCE($10, state), \
             zip_code = COALESCE($11, zip_code), \
             phone_number = COALESCE($12, phone_number) \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&patch.email)
            .bind(patch.role)
            .bind(&patch.first_name)
            .bind(&patch.last_name)
            .bind(&patch.company_name)
            .bind(&patch.street_address)
            .bind(&patch.address_line_2)
            .bind(&patch.city)
            .bind(&patch.state)
            .bind(&patch.zip_code)
            .bind(&patch.phone_number)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| map_unique_violation(e, EMAIL_CONFLICT))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Set the activation flag (the superadmin approval step).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_active(&self, id: UserId, is_active: bool) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE user_profile SET is_active = $2 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(is_active)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace the stored password hash for an email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user matches the email.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_password_hash(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE user_profile SET password_hash = $2 WHERE lower(email) = lower($1)")
                .bind(email)
                .bind(password_hash)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Delete a user by ID.
    ///
    /// Children in the ownership forest are orphaned, not deleted: the
    /// schema sets their `parent_id`/`root_company_id` to NULL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM user_profile WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

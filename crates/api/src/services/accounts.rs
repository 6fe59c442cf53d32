//! Account lifecycle orchestration: registration, login, management, and
//! password recovery.

use sqlx::PgPool;

use gxi_core::{Email, Role, UserId};

use crate::db::{NewRegistration, UserPatch, UserRepository};
use crate::error::AppError;
use crate::models::{CurrentUser, User};
use crate::permissions;
use crate::services::email::EmailService;
use crate::services::otp::OtpService;
use crate::services::password;
use crate::services::tokens::{TokenPair, TokenSigner};

const NO_USER_FOR_EMAIL: &str = "No user found with this email.";

/// Account lifecycle service.
#[derive(Clone)]
pub struct AccountService {
    pool: PgPool,
    email: EmailService,
    tokens: TokenSigner,
    otp: OtpService,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(pool: PgPool, email: EmailService, tokens: TokenSigner, otp: OtpService) -> Self {
        Self {
            pool,
            email,
            tokens,
            otp,
        }
    }

    /// Register an account.
    ///
    /// The first account in an empty store becomes an active superadmin;
    /// every later registration is an inactive customer awaiting approval.
    /// The server generates the initial password and discloses it exactly
    /// once, in the welcome email; registration succeeds regardless of
    /// delivery.
    ///
    /// # Errors
    ///
    /// Returns a conflict-flavored `AppError::Database` (rendered as 400)
    /// when the email is already registered, case-insensitively.
    pub async fn register(
        &self,
        email: &Email,
        profile: &NewRegistration,
    ) -> Result<User, AppError> {
        let plaintext = password::generate_password();
        let hash = password::hash_password(&plaintext)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let repo = UserRepository::new(&self.pool);
        let user = repo.create_registration(email, profile, &hash).await?;

        let first_name = user.first_name.as_deref().unwrap_or("there");
        self.email
            .send_welcome_in_background(&user.email, first_name, &plaintext);

        tracing::info!(
            user_id = %user.id,
            role = %user.role,
            is_active = user.is_active,
            "User registered"
        );
        Ok(user)
    }

    /// Authenticate and issue a session.
    ///
    /// # Errors
    ///
    /// Checked in this order, and the order is load-bearing:
    /// - `AppError::NotFound` when no account matches the email
    /// - `AppError::Forbidden` when the account is inactive
    /// - `AppError::Unauthorized` when the password does not match
    pub async fn login(&self, email: &Email, password: &str) -> Result<(User, TokenPair), AppError> {
        let repo = UserRepository::new(&self.pool);
        let user = repo
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_USER_FOR_EMAIL.to_string()))?;

        if !user.is_active {
            return Err(AppError::Forbidden(
                "Account is inactive. Contact an administrator.".to_string(),
            ));
        }

        let Some(stored_hash) = user.password_hash.as_deref() else {
            return Err(AppError::Unauthorized("Invalid credentials.".to_string()));
        };
        let matches = password::verify_password(password, stored_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        if !matches {
            return Err(AppError::Unauthorized("Invalid credentials.".to_string()));
        }

        let pair = self
            .tokens
            .issue_pair(&user)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok((user, pair))
    }

    /// List the users visible to the requester: everyone for a superadmin,
    /// otherwise the requester's root-company lineage plus direct children.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the query fails.
    pub async fn list_users(&self, requester: &User) -> Result<Vec<User>, AppError> {
        let repo = UserRepository::new(&self.pool);
        let users = if requester.role == Role::Superadmin {
            repo.list_all().await?
        } else {
            repo.list_visible_to(requester.id, requester.root_company_id)
                .await?
        };
        Ok(users)
    }

    /// Fetch a single user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no such user exists.
    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        let repo = UserRepository::new(&self.pool);
        repo.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {id} not found.")))
    }

    /// Apply a partial update to a user the requester manages.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the target doesn't exist,
    /// `AppError::Forbidden` if the requester is neither a superadmin nor
    /// the target's parent, and a conflict-flavored `AppError::Database`
    /// when a changed email is taken.
    pub async fn update_user(
        &self,
        requester: &User,
        id: UserId,
        patch: &UserPatch,
    ) -> Result<User, AppError> {
        let repo = UserRepository::new(&self.pool);
        let target = self.get_user(id).await?;
        ensure_can_manage(requester, &target)?;

        let updated = repo.update(id, patch).await?;
        tracing::info!(user_id = %id, by = %requester.id, "User updated");
        Ok(updated)
    }

    /// Delete a user the requester manages. Children in the ownership
    /// forest are orphaned, not removed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the target doesn't exist and
    /// `AppError::Forbidden` if the requester may not manage it.
    pub async fn delete_user(&self, requester: &User, id: UserId) -> Result<(), AppError> {
        let repo = UserRepository::new(&self.pool);
        let target = self.get_user(id).await?;
        ensure_can_manage(requester, &target)?;

        repo.delete(id).await?;
        tracing::info!(user_id = %id, by = %requester.id, "User deleted");
        Ok(())
    }

    /// Reset a password with a recovery code.
    ///
    /// Input validation (presence, confirmation match) runs before any OTP
    /// work, so a malformed request never consumes a valid code.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for missing or mismatched fields,
    /// `AppError::InvalidOrExpiredOtp` when the code fails verification,
    /// and `AppError::NotFound` when no account matches the email.
    pub async fn forgot_password(
        &self,
        email: &Email,
        otp_code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        if otp_code.is_empty() {
            return Err(AppError::Validation("OTP is required.".to_string()));
        }
        if new_password.is_empty() || confirm_password.is_empty() {
            return Err(AppError::Validation(
                "Password and confirm password are required.".to_string(),
            ));
        }
        if new_password != confirm_password {
            return Err(AppError::Validation("Passwords do not match.".to_string()));
        }

        self.otp.verify(email, otp_code).await?;

        let repo = UserRepository::new(&self.pool);
        let user = repo
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_USER_FOR_EMAIL.to_string()))?;

        let hash = password::hash_password(new_password)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        repo.set_password_hash(&user.email, &hash).await?;

        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }
}

fn ensure_can_manage(requester: &User, target: &User) -> Result<(), AppError> {
    let identity = CurrentUser::from_user(requester);
    if !permissions::can_manage_user(&identity, target) {
        return Err(AppError::Forbidden(
            "You do not have permission to manage this user.".to_string(),
        ));
    }
    Ok(())
}

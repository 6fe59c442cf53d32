//! User management route handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use gxi_core::{Role, UserId};

use crate::db::UserPatch;
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, User, UserProfile, UserSummary};
use crate::permissions;
use crate::response::ApiResponse;
use crate::routes::auth::parse_email;
use crate::state::AppState;

/// Partial update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<String>,
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

/// List the users the requester may see.
///
/// Superadmins see everyone; other active accounts see their root-company
/// lineage and their direct children.
///
/// # Errors
///
/// Returns 403 for an inactive account.
#[instrument(skip(state, auth), fields(requester = %auth.0.id))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let requester = auth.0;
    ensure_active(&requester)?;

    let users = state.accounts().list_users(&requester).await?;
    let summaries: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();

    Ok(Json(ApiResponse::success(
        "Users retrieved successfully.",
        summaries,
    )))
}

/// Fetch a single user's profile.
///
/// # Errors
///
/// Returns 403 for an inactive account and 404 for an unknown user.
#[instrument(skip(state, auth), fields(requester = %auth.0.id))]
pub async fn show(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    ensure_active(&auth.0)?;

    let user = state.accounts().get_user(UserId::new(id)).await?;
    Ok(Json(ApiResponse::success(
        "User retrieved successfully.",
        UserProfile::from(&user),
    )))
}

/// Apply a partial update to a user the requester manages.
///
/// Role changes are restricted: only a superadmin may set a role, and only
/// to `customer`.
///
/// # Errors
///
/// Returns 400 for malformed fields or a taken email, 403 when the
/// requester may not manage the target, and 404 for an unknown user.
#[instrument(skip(state, auth, body), fields(requester = %auth.0.id))]
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let requester = auth.0;
    ensure_active(&requester)?;

    let email = body.email.as_deref().map(parse_email).transpose()?;
    let role = body
        .role
        .as_deref()
        .map(|raw| {
            raw.parse::<Role>()
                .map_err(|e| AppError::Validation(e.to_string()))
        })
        .transpose()?;
    if let Some(target_role) = role
        && !permissions::can_create_role(requester.role, target_role)
    {
        return Err(AppError::Forbidden(
            "You do not have permission to assign this role.".to_string(),
        ));
    }

    let patch = UserPatch {
        email,
        role,
        first_name: body.first_name,
        last_name: body.last_name,
        company_name: body.company_name,
        street_address: body.street_address,
        address_line_2: body.address_line_2,
        city: body.city,
        state: body.state,
        zip_code: body.zip_code,
        phone_number: body.phone_number,
    };

    let updated = state
        .accounts()
        .update_user(&requester, UserId::new(id), &patch)
        .await?;

    Ok(Json(ApiResponse::success(
        "User updated successfully.",
        UserProfile::from(&updated),
    )))
}

/// Delete a user the requester manages. Children are orphaned, not removed.
///
/// # Errors
///
/// Returns 403 when the requester may not manage the target and 404 for an
/// unknown user.
#[instrument(skip(state, auth), fields(requester = %auth.0.id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let requester = auth.0;
    ensure_active(&requester)?;

    state
        .accounts()
        .delete_user(&requester, UserId::new(id))
        .await?;

    Ok(Json(ApiResponse::message("User deleted successfully.")))
}

/// Reject requests from accounts that are no longer active.
fn ensure_active(requester: &User) -> Result<(), AppError> {
    let identity = CurrentUser::from_user(requester);
    if !permissions::is_authenticated_and_active(Some(&identity)) {
        return Err(AppError::Forbidden(
            "Account is inactive. Contact an administrator.".to_string(),
        ));
    }
    Ok(())
}

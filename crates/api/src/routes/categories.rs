//! Catalog route handlers.
//!
//! Reads are open; writes are superadmin only. The catalog is simple
//! enough that handlers talk to the repository directly.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use gxi_core::CategoryId;

use crate::db::{CategoryPatch, CategoryRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::CurrentUser;
use crate::permissions;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Category creation body.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// Partial update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}

const fn default_true() -> bool {
    true
}

/// List all categories, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let repo = CategoryRepository::new(state.pool());
    let categories = repo.list().await?;

    Ok(Json(ApiResponse::success(
        "Categories retrieved successfully.",
        categories,
    )))
}

/// Fetch a single category.
///
/// # Errors
///
/// Returns 404 for an unknown category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let repo = CategoryRepository::new(state.pool());
    let category = repo
        .get_by_id(CategoryId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category {id} not found.")))?;

    Ok(Json(ApiResponse::success(
        "Category retrieved successfully.",
        category,
    )))
}

/// Create a category.
///
/// # Errors
///
/// Returns 400 for an empty or already-taken name and 403 for anyone but
/// an active superadmin.
#[instrument(skip(state, auth, body), fields(requester = %auth.0.id))]
pub async fn create(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_can_mutate(&auth)?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Category name is required.".to_string()));
    }

    let repo = CategoryRepository::new(state.pool());
    let category = repo.create(name, body.is_active).await?;

    tracing::info!(category_id = %category.id, by = %auth.0.id, "Category created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Category created successfully.",
            category,
        )),
    ))
}

/// Apply a partial update to a category.
///
/// # Errors
///
/// Returns 400 for an empty or taken name, 403 for non-superadmins, and
/// 404 for an unknown category.
#[instrument(skip(state, auth, body), fields(requester = %auth.0.id))]
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
    Json(body): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_can_mutate(&auth)?;

    let name = body
        .name
        .map(|raw| {
            let trimmed = raw.trim().to_owned();
            if trimmed.is_empty() {
                Err(AppError::Validation("Category name is required.".to_string()))
            } else {
                Ok(trimmed)
            }
        })
        .transpose()?;

    let repo = CategoryRepository::new(state.pool());
    let patch = CategoryPatch {
        name,
        is_active: body.is_active,
    };
    let category = repo.update(CategoryId::new(id), &patch).await?;

    tracing::info!(category_id = %category.id, by = %auth.0.id, "Category updated");
    Ok(Json(ApiResponse::success(
        "Category updated successfully.",
        category,
    )))
}

/// Delete a category.
///
/// # Errors
///
/// Returns 403 for non-superadmins and 404 for an unknown category.
#[instrument(skip(state, auth), fields(requester = %auth.0.id))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    ensure_can_mutate(&auth)?;

    let repo = CategoryRepository::new(state.pool());
    repo.delete(CategoryId::new(id)).await?;

    tracing::info!(category_id = %id, by = %auth.0.id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn ensure_can_mutate(auth: &RequireAuth) -> Result<(), AppError> {
    let identity = CurrentUser::from_user(&auth.0);
    if !permissions::can_mutate_category(Some(&identity)) {
        return Err(AppError::Forbidden(
            "Only superadmins can modify categories.".to_string(),
        ));
    }
    Ok(())
}

//! OTP route handlers for password recovery.

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use tracing::instrument;

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::routes::auth::parse_email;
use crate::state::AppState;

/// OTP request body.
#[derive(Debug, Deserialize)]
pub struct OtpRequestBody {
    pub email: String,
}

/// OTP verification body.
#[derive(Debug, Deserialize)]
pub struct OtpVerifyBody {
    pub email: String,
    pub otp: String,
}

/// Request a recovery code by email.
///
/// # Errors
///
/// Returns 429 while the per-email cooldown is in effect.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn request(
    State(state): State<AppState>,
    Json(body): Json<OtpRequestBody>,
) -> Result<impl IntoResponse, AppError> {
    let email = parse_email(&body.email)?;
    state.otp().request(&email).await?;

    Ok(Json(ApiResponse::message("OTP sent successfully.")))
}

/// Verify a recovery code. Consuming: a verified code cannot be reused.
///
/// # Errors
///
/// Returns 400 when the code is wrong, expired, or already used.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn verify(
    State(state): State<AppState>,
    Json(body): Json<OtpVerifyBody>,
) -> Result<impl IntoResponse, AppError> {
    let email = parse_email(&body.email)?;
    state.otp().verify(&email, &body.otp).await?;

    Ok(Json(ApiResponse::message("OTP verified successfully.")))
}

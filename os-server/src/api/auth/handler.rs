//! Authentication Handlers
//!
//! Register, login and user listing. Passwords are Argon2-hashed at rest and
//! never serialized back to clients.

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::user;
use crate::utils::validation::{
    validate_required_text, MAX_NAME_LEN, MAX_PASSWORD_LEN,
};
use crate::utils::{AppError, AppResult};
use shared::models::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

/// POST /api/register - create a new user
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<UserResponse>> {
    validate_required_text(&req.username, "username", MAX_NAME_LEN)?;
    validate_required_text(&req.password, "password", MAX_PASSWORD_LEN)?;

    let created = user::create(&state.pool, &req.username, &req.password).await?;
    tracing::info!(username = %created.username, "User registered");
    Ok(Json(created.into()))
}

/// POST /api/login - verify credentials, return the technician name
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let found = user::find_by_username(&state.pool, &req.username).await?;

    // Unified error path to prevent username enumeration
    let found = match found {
        Some(u) => u,
        None => {
            tracing::warn!(username = %req.username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let valid = user::verify_password(&req.password, &found.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !valid {
        tracing::warn!(username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    Ok(Json(LoginResponse {
        success: true,
        message: "Login bem-sucedido!".to_string(),
        user: found.username,
    }))
}

/// GET /api/users - list users without password material
pub async fn list_users(State(state): State<ServerState>) -> AppResult<Json<Vec<UserResponse>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

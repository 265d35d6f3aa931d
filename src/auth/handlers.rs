use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use crate::auth::extractor::SESSION_HEADER;
use crate::error::AppError;
use crate::AppState;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!(username = %req.username, "Received login request");
    match state.auth.login(&req.username, &req.password).await {
        Ok(token) => Ok(HttpResponse::Ok().json(LoginResponse {
            success: true,
            message: "Login successful".to_string(),
            session_id: Some(token),
        })),
        Err(e) => {
            warn!(username = %req.username, error = %e, "Login failed");
            Err(e)
        }
    }
}

pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    // Missing header on logout is a validation failure (400), unlike the
    // 401 a protected route raises for the same omission.
    let token = req
        .headers()
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::ValidationError("No session ID provided".to_string()))?;

    state.auth.logout(token).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Logout successful",
    })))
}

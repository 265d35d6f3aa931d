use crate::auth::gate::Identity;
use crate::error::{AppError, AuthError};
use crate::AppState;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

/// Header carrying the opaque session token.
pub const SESSION_HEADER: &str = "X-Session-ID";

// Protected handlers take `Identity` as a parameter; extraction runs the
// auth gate before the handler body, and the resolved identity lives only
// for that request.
impl FromRequest for Identity {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Identity, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            let state = req
                .app_data::<web::Data<AppState>>()
                .cloned()
                .ok_or_else(|| {
                    AppError::InternalError("application state not configured".to_string())
                })?;

            let token = req
                .headers()
                .get(SESSION_HEADER)
                .and_then(|value| value.to_str().ok())
                .filter(|value| !value.is_empty())
                .map(str::to_owned)
                .ok_or(AuthError::MissingToken)?;

            state.auth.authorize(&token).await
        })
    }
}

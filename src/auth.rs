use crate::error::AppError;
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use megaphone::db::PgPool;
use megaphone::find_user_by_id;
use std::future::{ready, Ready};

/// Header carrying the authenticated user id, set by the identity provider
/// in front of this service.
pub const AUTH_USER_HEADER: &str = "x-auth-user";

/// Explicit tenant scope for one request. Every core operation takes this
/// as a value instead of recovering ambient session state, so the pipeline
/// stays callable without the HTTP layer.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: i32,
    pub user_id: String,
}

fn resolve(req: &HttpRequest) -> Result<TenantContext, AppError> {
    let user_id = req
        .headers()
        .get(AUTH_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Auth("missing session".to_string()))?;

    let pool = req
        .app_data::<web::Data<PgPool>>()
        .ok_or_else(|| AppError::Internal("database pool not configured".to_string()))?;

    let user = find_user_by_id(pool, user_id)
        .map_err(|e| AppError::Internal(e.to_string()))?
        .ok_or_else(|| AppError::Auth("unknown user".to_string()))?;

    Ok(TenantContext {
        tenant_id: user.tenant_id,
        user_id: user.id,
    })
}

impl FromRequest for TenantContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req))
    }
}

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::database::forum::Viewer;
use crate::database::models::Role;
use crate::error::ApiError;

/// Caller identity, set by [`validate_session_middleware`](super::validate_session_middleware)
/// once the token's session has been checked against the database. `role` is
/// read from the profile on every request, not taken from the token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub role: Role,
    pub display_name: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_any_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            let allowed: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
            Err(ApiError::forbidden(format!(
                "This action requires one of the roles: {}",
                allowed.join(", ")
            )))
        }
    }

    /// Admins moderate the forum, so they read unapproved content too
    pub fn viewer(&self) -> Viewer {
        Viewer {
            user_id: self.user_id,
            moderator: self.is_admin(),
        }
    }
}

/// Decodes the bearer token and stores its [`Claims`] on the request.
/// Does not touch the database; session checks happen in the next layer.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let value = header.to_str().map_err(|_| "Invalid Authorization header format")?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or("Authorization header must use Bearer token format")?
        .trim();

    if token.is_empty() {
        return Err("Empty bearer token");
    }
    Ok(token)
}

/// Claims are only present after [`jwt_auth_middleware`] ran
pub(crate) fn claims_of(request: &Request) -> Option<&Claims> {
    request.extensions().get::<Claims>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_malformed_header() {
        assert!(extract_bearer_token(&HeaderMap::new()).is_err());
        assert!(extract_bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer_token(&headers_with("Bearer   ")).is_err());
    }

    #[test]
    fn role_gate() {
        let user = AuthUser {
            user_id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            role: Role::Nurse,
            display_name: "Nia".into(),
            expires_at: Utc::now(),
        };
        assert!(user.require_any_role(&[Role::Nurse, Role::Patient]).is_ok());
        let err = user.require_any_role(&[Role::Counselor]).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert!(!user.is_admin());
    }
}

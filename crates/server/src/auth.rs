use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use configs::PaginationConfig;
use sea_orm::DatabaseConnection;
use tracing::warn;

use service::auth::{repo::seaorm::SeaOrmAuthRepository, AuthService};
use service::Caller;

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub pagination: PaginationConfig,
}

/// Routes reachable without a credential.
fn is_public(method: &Method, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    *method == Method::OPTIONS
        || path == "/health"
        || path.starts_with("/api-docs")
        || path == "/api/users/token"
        || (*method == Method::POST && path == "/api/users")
}

/// `Authorization: Bearer <token>`, falling back to the `auth_token` cookie.
fn bearer_token(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let h = h.to_str().map_err(|_| JsonApiError::unauthenticated("malformed Authorization header"))?;
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => Err(JsonApiError::unauthenticated("expected a Bearer token")),
        };
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// Global middleware: verify the credential and attach the `Caller`.
///
/// Public routes pass through; a valid token on them still yields a caller
/// (user creation needs it to grant elevated roles).
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let public = is_public(req.method(), req.uri().path());
    let path = req.uri().path().to_string();

    let token = match bearer_token(&req) {
        Ok(t) => t,
        Err(_) if public => None,
        Err(e) => {
            warn!(path = %path, "invalid Authorization header");
            return Err(e);
        }
    };

    match token {
        Some(token) => match state.auth.authenticate(&token).await {
            Ok(caller) => {
                req.extensions_mut().insert::<Caller>(caller);
            }
            Err(e) if !public => {
                warn!(path = %path, err = %e, "token validation failed");
                return Err(JsonApiError::unauthenticated("invalid or expired token"));
            }
            Err(_) => {}
        },
        None if !public => {
            warn!(path = %path, "missing Authorization header and auth_token cookie");
            return Err(JsonApiError::unauthenticated("missing bearer token"));
        }
        None => {}
    }
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/api/users/"));
        assert!(is_public(&Method::POST, "/api/users"));
        assert!(is_public(&Method::POST, "/api/users/token"));
        assert!(is_public(&Method::GET, "/api-docs/openapi.json"));
        assert!(!is_public(&Method::GET, "/api/users/"));
        assert!(!is_public(&Method::GET, "/api/expenses/"));
    }

    fn request(headers: &[(header::HeaderName, &str)]) -> Request {
        let mut b = Request::builder().uri("/api/expenses");
        for (k, v) in headers {
            b = b.header(k.clone(), *v);
        }
        b.body(axum::body::Body::empty()).unwrap()
    }

    #[test]
    fn token_comes_from_header_then_cookie() {
        let req = request(&[(header::AUTHORIZATION, "Bearer abc"), (header::COOKIE, "auth_token=zzz")]);
        assert_eq!(bearer_token(&req).unwrap().as_deref(), Some("abc"));

        let req = request(&[(header::COOKIE, "theme=dark; auth_token=xyz; lang=en")]);
        assert_eq!(bearer_token(&req).unwrap().as_deref(), Some("xyz"));

        let req = request(&[(header::COOKIE, "auth_token_old=nope")]);
        assert_eq!(bearer_token(&req).unwrap(), None);

        let req = request(&[(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")]);
        assert!(bearer_token(&req).is_err());
    }
}

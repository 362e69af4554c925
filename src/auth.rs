use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError, models::User};

/// Name of the cookie carrying the signed session.
pub const SESSION_COOKIE: &str = "admin_session";

/// SessionClaims
///
/// Payload of the signed session artifact issued at login. Signed with the
/// shared `SESSION_SECRET` (HS256) and verified on every request by the route
/// guard and the `AdminSession` extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (sub): the admin's email.
    pub sub: String,
    /// The admin's platform user id.
    pub uid: i64,
    /// Session id. Keys the per-session page store.
    pub sid: Uuid,
    /// The backend API token obtained at login, forwarded on backend calls.
    pub backend_token: String,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// AdminSession Extractor Result
///
/// The resolved identity of a signed-in admin.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: Uuid,
    pub email: String,
    pub user_id: i64,
    pub backend_token: String,
    /// Unix time at which the session stops being accepted.
    pub expires_at: usize,
}

impl From<SessionClaims> for AdminSession {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sid,
            email: claims.sub,
            user_id: claims.uid,
            backend_token: claims.backend_token,
            expires_at: claims.exp,
        }
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// issue_session
///
/// Signs a fresh session for `user`, valid for `config.session_ttl_secs`.
pub fn issue_session(
    config: &AppConfig,
    user: &User,
    backend_token: &str,
) -> Result<(String, SessionClaims), jsonwebtoken::errors::Error> {
    let now = now_secs();
    let claims = SessionClaims {
        sub: user.email.clone(),
        uid: user.id,
        sid: Uuid::new_v4(),
        backend_token: backend_token.to_string(),
        iat: now as usize,
        exp: (now + config.session_ttl_secs) as usize,
    };

    let key = EncodingKey::from_secret(config.session_secret.as_bytes());
    let token = encode(&Header::default(), &claims, &key)?;
    Ok((token, claims))
}

/// decode_session
///
/// Verifies signature and expiry. Any failure is reported as `None`; the
/// caller treats it exactly like a missing session.
pub fn decode_session(token: &str, secret: &str) -> Option<SessionClaims> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<SessionClaims>(token, &decoding_key, &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            tracing::debug!("session rejected: {:?}", e.kind());
            None
        }
    }
}

/// cookie_value
///
/// Finds `name` in the `Cookie` header(s).
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// session_from_headers
///
/// Session lookup shared by the route guard and the extractor: the
/// `admin_session` cookie first, then an `Authorization: Bearer` header.
/// A cookie that does not verify falls through to the header.
pub fn session_from_headers(headers: &HeaderMap, config: &AppConfig) -> Option<SessionClaims> {
    let from_cookie = cookie_value(headers, SESSION_COOKIE)
        .and_then(|token| decode_session(&token, &config.session_secret));
    if from_cookie.is_some() {
        return from_cookie;
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| decode_session(token, &config.session_secret))
}

/// Set-Cookie value for a freshly issued session.
pub fn session_cookie(token: &str, ttl_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, ttl_secs
    )
}

/// Set-Cookie value that removes the session.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// AdminSession Extractor Implementation
///
/// Any handler taking `AdminSession` only runs for a valid session; otherwise
/// the request is rejected with 401. The route guard normally redirects
/// before this point, so the rejection only shows for paths it does not cover.
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        session_from_headers(&parts.headers, &config)
            .map(AdminSession::from)
            .ok_or(ApiError::Unauthorized)
    }
}

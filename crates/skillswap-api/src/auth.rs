use axum::async_trait;
use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

/// Authenticated caller. The identity layer resolves the token to a user
/// id; everything behind it trusts this id unconditionally.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: Option<usize>,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AuthConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AuthConfig::from_ref(state);
        authorize_bearer(parts, &config)
    }
}

fn authorize_bearer(parts: &Parts, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected Bearer token".into()))?;

    let validation = Validation::new(Algorithm::HS256);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|err| ApiError::Unauthorized(format!("invalid token: {err}")))?;

    let user_id = data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| ApiError::Unauthorized("token subject is not a user id".into()))?;

    Ok(AuthUser { user_id })
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    use super::*;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: usize,
    }

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.into(),
        }
    }

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn token_for(sub: &str) -> String {
        let claims = TestClaims {
            sub: sub.into(),
            exp: 4_000_000_000,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn resolves_the_subject_to_a_user_id() {
        let token = token_for("42");
        let parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let user = authorize_bearer(&parts, &config()).unwrap();
        assert_eq!(user.user_id, 42);
    }

    #[test]
    fn rejects_missing_header() {
        let parts = parts_with_auth(None);
        assert!(matches!(
            authorize_bearer(&parts, &config()),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_subjects() {
        let token = token_for("not-a-user");
        let parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert!(matches!(
            authorize_bearer(&parts, &config()),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn rejects_tokens_signed_with_another_secret() {
        let claims = TestClaims {
            sub: "42".into(),
            exp: 4_000_000_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();
        let parts = parts_with_auth(Some(&format!("Bearer {token}")));
        assert!(matches!(
            authorize_bearer(&parts, &config()),
            Err(ApiError::Unauthorized(_))
        ));
    }
}

//! Request guard
//!
//! Resolves the acting user from an `Authorization: Bearer <token>` header
//! and enforces ownership before mutations.

use axum::http::{HeaderMap, header};
use uuid::Uuid;

use crate::core::auth::jwt::TokenCodec;
use crate::core::auth::service::AuthError;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();
    let value = values.next().ok_or(AuthError::MalformedHeader)?;
    if values.next().is_some() {
        return Err(AuthError::MalformedHeader);
    }

    let auth_header = value.to_str().map_err(|_| AuthError::MalformedHeader)?;
    let credential = auth_header
        .trim()
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MalformedHeader)?;

    // The scheme may appear only once, anywhere in the header
    if credential.contains(BEARER_PREFIX) {
        return Err(AuthError::MalformedHeader);
    }

    let credential = credential.trim();
    if credential.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(credential.to_string())
}

/// Resolve the user behind the access token in `headers`
pub fn authenticate(headers: &HeaderMap, codec: &dyn TokenCodec) -> Result<Uuid, AuthError> {
    let token = extract_bearer_token(headers)?;

    codec.validate(&token).map_err(|e| {
        tracing::debug!("Access token rejected: {}", e);
        AuthError::Unauthorized
    })
}

/// Only the owner may mutate a resource
pub fn authorize_ownership(actor: Uuid, owner: Uuid) -> Result<(), AuthError> {
    if actor != owner {
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::jwt::{JwtConfig, JwtService};
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token_valid() {
        let token = extract_bearer_token(&headers_with("Bearer my_token_123")).unwrap();
        assert_eq!(token, "my_token_123");
    }

    #[test]
    fn test_extract_bearer_token_trims_whitespace() {
        let token = extract_bearer_token(&headers_with("  Bearer   abc  ")).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let result = extract_bearer_token(&HeaderMap::new());
        assert!(matches!(result, Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn test_extract_bearer_token_invalid_format() {
        let result = extract_bearer_token(&headers_with("Basic base64credentials"));
        assert!(matches!(result, Err(AuthError::MalformedHeader)));

        let result = extract_bearer_token(&headers_with("bearer lowercase"));
        assert!(matches!(result, Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn test_extract_bearer_token_empty_token() {
        let result = extract_bearer_token(&headers_with("Bearer "));
        assert!(matches!(result, Err(AuthError::MalformedHeader)));

        let result = extract_bearer_token(&headers_with("Bearer    "));
        assert!(matches!(result, Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn test_extract_bearer_token_repeated_scheme() {
        let result = extract_bearer_token(&headers_with("Bearer Bearer abc"));
        assert!(matches!(result, Err(AuthError::MalformedHeader)));

        let result = extract_bearer_token(&headers_with("Bearer abc Bearer def"));
        assert!(matches!(result, Err(AuthError::MalformedHeader)));

        let result = extract_bearer_token(&headers_with("Bearer  Bearer abc"));
        assert!(matches!(result, Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn test_extract_bearer_token_scheme_word_inside_credential() {
        let token = extract_bearer_token(&headers_with("Bearer Bearerxyz")).unwrap();
        assert_eq!(token, "Bearerxyz");
    }

    #[test]
    fn test_extract_bearer_token_multiple_headers() {
        let mut headers = headers_with("Bearer one");
        headers.append(header::AUTHORIZATION, HeaderValue::from_static("Bearer two"));

        let result = extract_bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn test_authenticate() {
        let codec = JwtService::new(JwtConfig::new("guard_secret"));
        let user_id = Uuid::new_v4();
        let token = codec.issue(user_id, Duration::minutes(5)).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );

        assert_eq!(authenticate(&headers, &codec).unwrap(), user_id);
    }

    #[test]
    fn test_authenticate_rejects_bad_token() {
        let codec = JwtService::new(JwtConfig::new("guard_secret"));

        let result = authenticate(&headers_with("Bearer not.a.jwt"), &codec);
        assert!(matches!(result, Err(AuthError::Unauthorized)));

        let result = authenticate(&HeaderMap::new(), &codec);
        assert!(matches!(result, Err(AuthError::MalformedHeader)));
    }

    #[test]
    fn test_authorize_ownership() {
        let owner = Uuid::new_v4();

        assert!(authorize_ownership(owner, owner).is_ok());
        assert!(matches!(
            authorize_ownership(Uuid::new_v4(), owner),
            Err(AuthError::Forbidden)
        ));
    }
}

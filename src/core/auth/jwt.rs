//! Access token issuing and validation
//!
//! Access tokens are stateless HS256 JWTs. The server keeps no record of them,
//! so they cannot be revoked before they expire; keep their lifetime short and
//! let refresh tokens carry revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default access token lifetime (1 hour)
const ACCESS_TOKEN_EXPIRATION_SECS: i64 = 60 * 60;

/// Default refresh token lifetime (60 days)
const REFRESH_TOKEN_EXPIRATION_DAYS: i64 = 60;

/// Upper bound accepted for `JWT_ACCESS_EXPIRATION_SECS` (30 days)
const MAX_ACCESS_TOKEN_EXPIRATION_SECS: i64 = 30 * 24 * 60 * 60;

/// Upper bound accepted for `JWT_REFRESH_EXPIRATION_DAYS` (10 years)
const MAX_REFRESH_TOKEN_EXPIRATION_DAYS: i64 = 3650;

/// Issuer written into and required from every token
const DEFAULT_ISSUER: &str = "chirpy";

/// The only algorithm accepted when validating
const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC key for signing tokens
    pub secret: String,
    pub access_token_expiration_secs: i64,
    pub refresh_token_expiration_days: i64,
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiration_secs: ACCESS_TOKEN_EXPIRATION_SECS,
            refresh_token_expiration_days: REFRESH_TOKEN_EXPIRATION_DAYS,
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    /// Create config from environment variables
    pub fn from_env() -> Result<Self, JwtError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| JwtError::MissingSecret)?;
        if secret.is_empty() {
            return Err(JwtError::MissingSecret);
        }

        let access_exp = lifetime_from_env(
            "JWT_ACCESS_EXPIRATION_SECS",
            ACCESS_TOKEN_EXPIRATION_SECS,
            MAX_ACCESS_TOKEN_EXPIRATION_SECS,
        )?;

        let refresh_exp = lifetime_from_env(
            "JWT_REFRESH_EXPIRATION_DAYS",
            REFRESH_TOKEN_EXPIRATION_DAYS,
            MAX_REFRESH_TOKEN_EXPIRATION_DAYS,
        )?;

        let issuer = std::env::var("JWT_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string());

        Ok(Self {
            secret,
            access_token_expiration_secs: access_exp,
            refresh_token_expiration_days: refresh_exp,
            issuer,
        })
    }

    pub fn access_token_expiration(mut self, secs: i64) -> Self {
        self.access_token_expiration_secs = secs;
        self
    }

    pub fn refresh_token_expiration(mut self, days: i64) -> Self {
        self.refresh_token_expiration_days = days;
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::try_seconds(self.access_token_expiration_secs).unwrap_or(Duration::MAX)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::try_days(self.refresh_token_expiration_days).unwrap_or(Duration::MAX)
    }
}

/// Read a positive lifetime no larger than `max`, or `default` when unset
fn lifetime_from_env(var: &'static str, default: i64, max: i64) -> Result<i64, JwtError> {
    let Ok(raw) = std::env::var(var) else {
        return Ok(default);
    };

    match raw.trim().parse::<i64>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        _ => Err(JwtError::InvalidLifetime { var, value: raw }),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT_SECRET environment variable not set")]
    MissingSecret,

    #[error("{var} must be a positive integer within bounds, got {value:?}")]
    InvalidLifetime { var: &'static str, value: String },
}

/// Token issuing/validation errors
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds, rounded up)
    pub exp: i64,
    /// Expiration time in milliseconds; `exp` alone cannot express sub-second lifetimes
    pub exp_ms: i64,
}

impl Claims {
    /// Get user ID as UUID
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Invalid)
    }

    /// Still valid at the deadline itself
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.exp_ms
    }
}

/// Stateless signed identity assertions
pub trait TokenCodec: Send + Sync {
    /// Sign a token for `user_id` that stays valid for `ttl`
    fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, TokenError>;

    /// Verify signature and expiry and return the subject
    fn validate(&self, token: &str) -> Result<Uuid, TokenError>;
}

/// HS256 implementation of `TokenCodec`
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Decode and verify a token, returning its claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        let claims = token_data.claims;

        if claims.is_expired_at(Utc::now().timestamp_millis()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

impl TokenCodec for JwtService {
    fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp_ms = now
            .timestamp_millis()
            .checked_add(ttl.num_milliseconds())
            .ok_or_else(|| TokenError::Encoding("token lifetime out of range".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            // Rounded up so `exp` never fires before `exp_ms`
            exp: exp_ms.div_euclid(1000) + i64::from(exp_ms.rem_euclid(1000) != 0),
            exp_ms,
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    fn validate(&self, token: &str) -> Result<Uuid, TokenError> {
        self.decode_claims(token)?.user_id()
    }
}

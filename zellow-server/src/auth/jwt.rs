//! JWT token service
//!
//! Tokens are issued by the identity provider and verified here with the
//! shared HS256 secret. `generate_token` exists for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::Role;
use thiserror::Error;

use crate::core::config::{Config, ConfigError};
use crate::security_log;

const MIN_SECRET_LEN: usize = 32;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HS256 secret (at least 32 bytes)
    pub secret: String,
    /// Lifetime of tokens minted by [`JwtService::generate_token`]
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl JwtConfig {
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: 1440,
            issuer: "zellow-identity".to_string(),
            audience: "zellow-storefront".to_string(),
        }
    }

    pub(crate) fn from_lookup<F>(lookup: &F, environment: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = match lookup("JWT_SECRET") {
            Some(secret) => {
                if secret.len() < MIN_SECRET_LEN {
                    return Err(ConfigError::SecretTooShort(
                        "JWT_SECRET".into(),
                        MIN_SECRET_LEN,
                    ));
                }
                secret
            }
            None if environment == "development" => {
                tracing::warn!("JWT_SECRET not set! Generating temporary key for development.");
                generate_secure_printable_jwt_secret()
            }
            None => Config::require_secret(lookup, "JWT_SECRET", environment)?,
        };

        Ok(Self {
            secret,
            expiration_minutes: lookup("JWT_EXPIRATION_MINUTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "zellow-identity".to_string()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "zellow-storefront".to_string()),
        })
    }
}

/// Claims carried in the identity token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// Printable random secret for development
pub fn generate_secure_printable_jwt_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        return "ZellowDevelopmentOnlySecretKey-ReplaceInProduction".to_string();
    }
    bytes
        .iter()
        .map(|b| ALLOWED[(*b as usize) % ALLOWED.len()] as char)
        .collect()
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mint a token for a user
    pub fn generate_token(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Authenticated caller, built from verified claims.
///
/// Handlers take it as an argument; see the extractor in `auth::extractor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Reject callers whose role is not in `roles`
    pub fn require_roles(&self, roles: &[Role], action: &str) -> Result<(), AppError> {
        if self.has_any_role(roles) {
            return Ok(());
        }
        security_log!(
            "WARN",
            "permission_denied",
            user_id = self.id.clone(),
            role = self.role.as_str(),
            action = action
        );
        Err(AppError::permission_denied(format!(
            "Role {} may not {}",
            self.role, action
        )))
    }

    /// Reject customers
    pub fn require_staff(&self, action: &str) -> Result<(), AppError> {
        if self.is_staff() {
            return Ok(());
        }
        security_log!(
            "WARN",
            "staff_required",
            user_id = self.id.clone(),
            action = action
        );
        Err(AppError::new(shared::ErrorCode::RoleRequired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::with_secret("unit-test-secret-0123456789abcdef"))
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = service();
        let token = service
            .generate_token("user123", "Wanjiru", "wanjiru@example.com", Role::Dispatch)
            .expect("Failed to generate test token");

        let claims = service
            .validate_token(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.role, Role::Dispatch);

        let user = CurrentUser::from(claims);
        assert!(user.is_staff());
        assert!(!user.is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service()
            .generate_token("u", "n", "e", Role::Customer)
            .unwrap();
        let other = JwtService::with_config(JwtConfig::with_secret("another-secret-0123456789abcdefgh"));
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let mut config = JwtConfig::with_secret("unit-test-secret-0123456789abcdef");
        config.expiration_minutes = -10;
        let service = JwtService::with_config(config);
        let token = service.generate_token("u", "n", "e", Role::Customer).unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn test_require_roles() {
        let user = CurrentUser {
            id: "1".into(),
            name: "Kip".into(),
            email: "kip@example.com".into(),
            role: Role::Driver,
        };
        assert!(user.require_roles(&[Role::Admin, Role::Driver], "dispatch").is_ok());
        let err = user.require_roles(&[Role::Admin], "refund").unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }

    #[test]
    fn test_printable_secret() {
        let a = generate_secure_printable_jwt_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, generate_secure_printable_jwt_secret());
    }
}

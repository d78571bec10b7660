pub mod google;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("Token is past the refresh window")]
    RefreshWindowExpired,
    #[error("JWT secret not configured")]
    MissingSecret,
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Password hash error: {0}")]
    Hash(String),
    #[error("Google verification failed: {0}")]
    GoogleVerification(String),
}

/// JWT claims. A token without tenant context is an *account token* (issued
/// at login); selecting a tenant issues a *tenant token* carrying the tenant
/// slug, id, and database name. Exactly one tenant is ever in scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Account-scoped claims issued at login, before any tenant is selected
    pub fn account(user_id: Uuid, email: String, name: String) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;

        Self {
            sub: user_id,
            email,
            name,
            role: "account".to_string(),
            tenant: None,
            tenant_id: None,
            database: None,
            iss: config::config().security.jwt_issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }

    /// Tenant-scoped claims issued when the user selects a tenant
    pub fn tenant_scoped(
        user_id: Uuid,
        email: String,
        name: String,
        role: String,
        tenant_slug: String,
        tenant_id: Uuid,
        database: String,
    ) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.tenant_token_expiry_hours;

        Self {
            sub: user_id,
            email,
            name,
            role,
            tenant: Some(tenant_slug),
            tenant_id: Some(tenant_id),
            database: Some(database),
            iss: config::config().security.jwt_issuer.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
        }
    }

    pub fn has_tenant(&self) -> bool {
        self.tenant.is_some() && self.database.is_some()
    }

    /// Fresh claims with the same scope and a new issue/expiry window
    pub fn renewed(&self) -> Self {
        let now = Utc::now();
        let expiry_hours = if self.has_tenant() {
            config::config().security.tenant_token_expiry_hours
        } else {
            config::config().security.jwt_expiry_hours
        };

        Self {
            iat: now.timestamp(),
            exp: (now + Duration::hours(expiry_hours as i64)).timestamp(),
            ..self.clone()
        }
    }
}

fn secret() -> Result<&'static str, AuthError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, AuthError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    let mut validation = Validation::default();
    validation.set_issuer(&[&config::config().security.jwt_issuer]);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Decode a token for refresh. Expiry is tolerated as long as the token
/// expired less than `refresh_window_days` ago; signature and issuer are
/// still enforced.
pub fn decode_for_refresh(token: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());
    let mut validation = Validation::default();
    validation.set_issuer(&[&config::config().security.jwt_issuer]);
    validation.validate_exp = false;

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?
        .claims;

    let window = Duration::days(config::config().security.refresh_window_days);
    let expired_at = chrono::DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| AuthError::InvalidToken("Invalid expiry timestamp".to_string()))?;

    if Utc::now() > expired_at + window {
        return Err(AuthError::RefreshWindowExpired);
    }

    Ok(claims)
}

/// Hash a password with Argon2id and a random salt
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_secret() {
        // Config is a process-wide singleton; development default has a secret
        std::env::remove_var("APP_ENV");
    }

    #[test]
    fn account_token_round_trip() {
        ensure_secret();
        let claims = Claims::account(Uuid::new_v4(), "a@b.vn".into(), "An".into());
        let token = generate_jwt(&claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, "account");
        assert!(!decoded.has_tenant());
    }

    #[test]
    fn tenant_token_carries_exactly_one_tenant() {
        ensure_secret();
        let tenant_id = Uuid::new_v4();
        let claims = Claims::tenant_scoped(
            Uuid::new_v4(),
            "a@b.vn".into(),
            "An".into(),
            "owner".into(),
            "cong-ty-abc".into(),
            tenant_id,
            "tenant_0123abcd0123abcd".into(),
        );
        let decoded = validate_jwt(&generate_jwt(&claims).unwrap()).unwrap();

        assert!(decoded.has_tenant());
        assert_eq!(decoded.tenant.as_deref(), Some("cong-ty-abc"));
        assert_eq!(decoded.tenant_id, Some(tenant_id));
    }

    #[test]
    fn renewed_keeps_scope() {
        ensure_secret();
        let claims = Claims::account(Uuid::new_v4(), "a@b.vn".into(), "An".into());
        let renewed = claims.renewed();
        assert_eq!(renewed.sub, claims.sub);
        assert_eq!(renewed.tenant, claims.tenant);
        assert!(renewed.exp >= claims.exp);
    }

    #[test]
    fn rejects_tampered_tokens() {
        ensure_secret();
        let claims = Claims::account(Uuid::new_v4(), "a@b.vn".into(), "An".into());
        let mut token = generate_jwt(&claims).unwrap();
        token.push('x');
        assert!(validate_jwt(&token).is_err());
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("mat-khau-bi-mat").unwrap();
        assert!(verify_password("mat-khau-bi-mat", &hash).unwrap());
        assert!(!verify_password("sai-mat-khau", &hash).unwrap());
    }
}

//! Google ID-token verification for "Sign in with Google".
//!
//! Tokens are checked against Google's `tokeninfo` endpoint rather than a
//! local JWKS cache; login volume does not justify key management here.

use serde::Deserialize;

use crate::auth::AuthError;
use crate::config;

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// The subset of tokeninfo fields the login flow needs
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleIdentity {
    /// Google account subject, stable per user
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub aud: String,
}

/// Verify a Google ID token and return the identity it asserts.
///
/// Fails when the token is rejected by Google, the audience does not match
/// the configured client id, or the email is unverified.
pub async fn verify_id_token(id_token: &str) -> Result<GoogleIdentity, AuthError> {
    let client_id = config::config()
        .security
        .google_client_id
        .as_deref()
        .ok_or_else(|| AuthError::GoogleVerification("Google sign-in is not enabled".to_string()))?;

    let client = reqwest::Client::new();
    let response = client
        .get(TOKENINFO_URL)
        .query(&[("id_token", id_token)])
        .send()
        .await
        .map_err(|e| AuthError::GoogleVerification(format!("tokeninfo request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(AuthError::GoogleVerification("token rejected".to_string()));
    }

    let identity: GoogleIdentity = response
        .json()
        .await
        .map_err(|e| AuthError::GoogleVerification(format!("unexpected tokeninfo body: {e}")))?;

    if identity.aud != client_id {
        tracing::warn!("Google token audience mismatch: {}", identity.aud);
        return Err(AuthError::GoogleVerification("audience mismatch".to_string()));
    }

    if identity.email_verified.as_deref() != Some("true") {
        return Err(AuthError::GoogleVerification("email not verified".to_string()));
    }

    Ok(identity)
}

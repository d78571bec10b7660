use serde_json::{json, Value};

use crate::auth::{self, AuthError, Claims};
use crate::cache::{self, SessionState, SessionStore};
use crate::database::models::User;

/// Standard token response body shared by login, registration, Google
/// sign-in, and refresh.
pub fn token_payload(token: &str, claims: &Claims) -> Value {
    json!({
        "token": token,
        "token_type": "Bearer",
        "expires_in": claims.exp - claims.iat,
        "user": {
            "id": claims.sub,
            "email": claims.email,
            "name": claims.name,
            "role": claims.role,
            "tenant": claims.tenant,
            "tenant_id": claims.tenant_id,
        }
    })
}

/// Issue an account token for a signed-in user
pub fn issue_account_token(user: &User) -> Result<(String, Claims), AuthError> {
    let claims = Claims::account(user.id, user.email.clone(), user.name.clone());
    let token = auth::generate_jwt(&claims)?;
    Ok((token, claims))
}

/// Reset the caller's session to signed-in-without-tenant. Best effort: a
/// missing store only costs the cached state, not the login.
pub async fn reset_session(user: &User) {
    let Some(store) = cache::try_store().await else {
        return;
    };

    let sessions = SessionStore::new(store);
    let state = SessionState::signed_in(user.id, user.email.clone());
    if let Err(e) = sessions.write(&state).await {
        tracing::warn!("Failed to write session for {}: {}", user.id, e);
    }
}

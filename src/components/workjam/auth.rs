use crate::error::{config_error, ShiftResult};
use crate::storage::CredentialStore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

/// Cached bearer token for one user reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkjamCredential {
    pub token: String,
}

/// Strip an optional `Bearer ` prefix and surrounding whitespace
pub fn normalize_token(token: &str) -> String {
    let token = token.trim();
    token
        .strip_prefix("Bearer ")
        .unwrap_or(token)
        .trim()
        .to_string()
}

/// Read the Workjam user id from the `sub` claim of the JWT
pub fn parse_jwt_user_id(token: &str) -> ShiftResult<String> {
    let token = normalize_token(token);
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(config_error("Invalid JWT token format"));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(parts[1].trim_end_matches('='))
        .map_err(|e| config_error(&format!("Invalid JWT payload encoding: {}", e)))?;
    let claims: Value = serde_json::from_slice(&payload)
        .map_err(|e| config_error(&format!("Invalid JWT payload: {}", e)))?;

    let sub = match claims.get("sub") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(config_error("Could not find 'sub' claim in JWT")),
    };

    if sub.is_empty() || !sub.chars().all(|c| c.is_ascii_digit()) {
        return Err(config_error(&format!("JWT 'sub' claim is not a user id: {}", sub)));
    }

    Ok(sub)
}

/// Pick the token to use: an explicit one is cached, otherwise the cached one is used
pub fn resolve_token(
    store: &CredentialStore,
    reference: &str,
    token_override: Option<&str>,
) -> ShiftResult<String> {
    let key = format!("workjam-{}", reference);

    if let Some(token) = token_override.map(normalize_token).filter(|t| !t.is_empty()) {
        store.save(&key, &WorkjamCredential { token: token.clone() })?;
        debug!("Cached Workjam token for reference {}", reference);
        return Ok(token);
    }

    match store.load::<WorkjamCredential>(&key)? {
        Some(credential) => {
            info!("Using cached Workjam token for reference {}", reference);
            Ok(credential.token)
        }
        None => Err(config_error(&format!(
            "No token available for user reference id: {}",
            reference
        ))),
    }
}

#[cfg(test)]
pub(crate) fn test_token(user_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"{}","exp":1}}"#, user_id));
    format!("{}.{}.signature", header, payload)
}

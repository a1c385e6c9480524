//! Session branch and JWT payload decoding.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::persist::KeyValueStore;
use crate::store::Reducer;

use super::{ShopAction, ShopStore};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token has no payload segment")]
    MissingPayload,

    #[error("Token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Token payload is not a JSON object")]
    NotAnObject,
}

/// Decode the payload (middle) segment of a JWT without verifying it.
///
/// Accepts both the base64url alphabet and standard base64, padded or not.
pub fn decode_jwt(token: &str) -> Result<Value, JwtError> {
    let segment = token
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or(JwtError::MissingPayload)?;
    let normalized = segment
        .trim_end_matches('=')
        .replace('+', "-")
        .replace('/', "_");
    let bytes = URL_SAFE_NO_PAD.decode(normalized)?;
    let payload: Value = serde_json::from_slice(&bytes)?;
    if !payload.is_object() {
        return Err(JwtError::NotAnObject);
    }
    Ok(payload)
}

/// Session branch. Empty when logged out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub token: Option<String>,
    pub payload: Option<Value>,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// The `sub` claim of the decoded payload.
    pub fn subject(&self) -> Option<&Value> {
        self.payload.as_ref().and_then(|payload| payload.get("sub"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    Login { token: String },
    Logout,
}

impl AuthAction {
    pub fn kind(&self) -> &'static str {
        match self {
            AuthAction::Login { .. } => "AUTH_LOGIN",
            AuthAction::Logout => "AUTH_LOGOUT",
        }
    }
}

pub struct AuthReducer;

impl Reducer for AuthReducer {
    type State = AuthState;
    type Action = ShopAction;

    fn reduce(&self, state: Option<&Arc<AuthState>>, action: &ShopAction) -> Arc<AuthState> {
        let current = state.cloned().unwrap_or_default();
        match action {
            ShopAction::Auth(AuthAction::Login { token }) => {
                if current.token.as_deref() == Some(token.as_str()) {
                    return current;
                }
                match decode_jwt(token) {
                    Ok(payload) => Arc::new(AuthState {
                        token: Some(token.clone()),
                        payload: Some(payload),
                    }),
                    Err(_) => current,
                }
            }
            ShopAction::Auth(AuthAction::Logout) if *current != AuthState::default() => {
                Arc::new(AuthState::default())
            }
            _ => current,
        }
    }
}

/// Log in with `token`; the raw token is stored under `key` only if the
/// session actually changed. Returns whether it did.
pub fn login(
    token: impl Into<String>,
    storage: Arc<dyn KeyValueStore>,
    key: impl Into<String>,
) -> impl FnOnce(&ShopStore) -> bool {
    let token = token.into();
    let key = key.into();
    move |store: &ShopStore| {
        let changed = store.dispatch(
            AuthAction::Login {
                token: token.clone(),
            }
            .into(),
        );
        if changed {
            storage.set(&key, token);
        } else {
            debug!("login left the session unchanged");
        }
        changed
    }
}

/// Log out and forget the stored token.
pub fn logout(
    storage: Arc<dyn KeyValueStore>,
    key: impl Into<String>,
) -> impl FnOnce(&ShopStore) {
    let key = key.into();
    move |store: &ShopStore| {
        store.dispatch(AuthAction::Logout.into());
        storage.remove(&key);
    }
}

/// Log in again with the token stored under `key`, if any.
pub fn restore_session(
    storage: Arc<dyn KeyValueStore>,
    key: impl Into<String>,
) -> impl FnOnce(&ShopStore) -> bool {
    let key = key.into();
    move |store: &ShopStore| match storage.get(&key) {
        Some(token) => login(token, storage, key)(store),
        None => false,
    }
}

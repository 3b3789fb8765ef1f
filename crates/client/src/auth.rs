//! Wire types for the `/auth` endpoints and normalization of their
//! variants.
//!
//! Backend versions disagree on field names (`access_token` vs
//! `accessToken` vs `token`, `user` vs `profile`, `roles` as a list vs a
//! single `role` string, permissions on the envelope vs on the user).
//! Everything funnels through [`RawAuthResponse`] here and comes out as one
//! canonical shape; nothing past this module sees the ambiguity.

use serde::{Deserialize, Serialize};

use bankline_core::session::{Session, UserIdentity};

use crate::error::ApiError;

/// Request body for `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    /// Username or email -- the backend accepts either in this field.
    pub username: String,
    pub password: String,
}

/// Canonical result of a successful login or refresh call.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub access_token: String,
    /// Present when the backend rotated the refresh token. Absent means
    /// "keep using the one you have".
    pub refresh_token: Option<String>,
    /// Access-token lifetime in seconds, when the backend reports it.
    pub expires_in: Option<i64>,
    /// Identity info, when the backend includes it (login always does,
    /// refresh usually does not).
    pub session: Option<Session>,
}

/// Raw response envelope from `/auth/login`, `/auth/refresh`, and
/// `/auth/me`, accepting every known field-name variant.
#[derive(Debug, Deserialize)]
pub struct RawAuthResponse {
    #[serde(default, alias = "accessToken", alias = "token")]
    pub access_token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "profile")]
    pub user: Option<RawUser>,
    /// Explicit permission list on the envelope (newer backends).
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<i64>,
}

/// Raw user object, wherever it appears.
#[derive(Debug, Deserialize)]
pub struct RawUser {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "displayName", alias = "name")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: Option<OneOrMany>,
    /// Single-role variant sent by the admin backend.
    #[serde(default)]
    pub role: Option<String>,
    /// Explicit permission list on the user (older backends).
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// A field that is either one string or a list of strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

impl RawAuthResponse {
    /// Normalize a login/refresh response. The access token is the one
    /// field every backend version must supply.
    pub fn normalize(self) -> Result<AuthPayload, ApiError> {
        let access_token = self
            .access_token
            .ok_or_else(|| ApiError::Decode("auth response carried no access token".into()))?;

        let envelope_permissions = self.permissions;
        let session = self
            .user
            .map(|raw| raw.normalize(envelope_permissions))
            .transpose()?;

        Ok(AuthPayload {
            access_token,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
            session,
        })
    }
}

impl RawUser {
    /// Normalize to the canonical [`Session`].
    ///
    /// Permission precedence: envelope list, then user-level list, then
    /// empty (meaning "derive from roles").
    fn normalize(self, envelope_permissions: Option<Vec<String>>) -> Result<Session, ApiError> {
        let username = self
            .username
            .or(self.email)
            .ok_or_else(|| ApiError::Decode("user object carried no username or email".into()))?;

        let display_name = self.display_name.unwrap_or_else(|| username.clone());

        let roles = match (self.roles, self.role) {
            (Some(many), _) => many.into_vec(),
            (None, Some(one)) => vec![one],
            (None, None) => vec![],
        };

        let permissions = envelope_permissions
            .or(self.permissions)
            .unwrap_or_default();

        Ok(Session {
            user: UserIdentity {
                id: self.id,
                username,
                display_name,
                roles,
            },
            permissions,
        })
    }
}

/// Normalize a `/auth/me` response, which some backend versions wrap in an
/// envelope and others send as the bare user object.
pub fn session_from_me_response(value: serde_json::Value) -> Result<Session, ApiError> {
    let envelope: RawAuthResponse = serde_json::from_value(value.clone())
        .map_err(|e| ApiError::Decode(format!("unrecognized /auth/me shape: {e}")))?;

    if let Some(user) = envelope.user {
        return user.normalize(envelope.permissions);
    }

    let bare: RawUser = serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("unrecognized /auth/me shape: {e}")))?;
    bare.normalize(None)
}

//! Client-held session state: the credential pair, the authenticated user's
//! identity, and the storage-key contract.
//!
//! Every read/write site in the portals must go through the `KEY_*`
//! constants below. The two apps historically drifted apart on key names,
//! which silently broke cross-reload session restore; a single set of
//! constants is the fix.

use serde::{Deserialize, Serialize};

/// Storage key for the short-lived access token.
pub const KEY_ACCESS_TOKEN: &str = "bankline.access_token";
/// Storage key for the longer-lived refresh token.
pub const KEY_REFRESH_TOKEN: &str = "bankline.refresh_token";
/// Storage key for the serialized [`Session`].
pub const KEY_SESSION: &str = "bankline.session";
/// Storage key for the cached effective-permission list.
pub const KEY_PERMISSIONS: &str = "bankline.permissions";

/// The bearer credentials authorizing requests on behalf of a session.
///
/// Created on successful login or refresh, overwritten whole on each
/// refresh, deleted on logout or refresh failure. Both tokens are opaque to
/// the client; nothing here inspects or decodes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// The authenticated user as the backend describes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    /// Role names held by the user. May name roles this client's static
    /// table does not know.
    pub roles: Vec<String>,
}

/// The client-side representation of the authenticated user, independent of
/// the token pair that authorizes requests on its behalf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: UserIdentity,
    /// Explicit permission list from the backend. Empty means "derive from
    /// roles via the static table" -- see
    /// [`permissions::effective_permissions`](crate::permissions::effective_permissions).
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Session {
    /// True if the user holds the given role. Exact membership, no
    /// super-admin short-circuit: role checks are identity checks, not
    /// capability checks.
    pub fn has_role(&self, role: &str) -> bool {
        self.user.roles.iter().any(|r| r == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(roles: &[&str]) -> Session {
        Session {
            user: UserIdentity {
                id: 7,
                username: "ada@example.com".into(),
                display_name: "Ada".into(),
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
            permissions: vec![],
        }
    }

    #[test]
    fn role_membership_is_exact() {
        let s = session(&["CUSTOMER"]);
        assert!(s.has_role("CUSTOMER"));
        assert!(!s.has_role("ADMIN"));
        assert!(!s.has_role("customer"), "role names are case-sensitive");
    }

    #[test]
    fn session_deserializes_without_permissions_field() {
        // Older backend versions omit the explicit list entirely.
        let json = r#"{"user":{"id":1,"username":"u","display_name":"U","roles":["ADMIN"]}}"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert!(s.permissions.is_empty());
    }
}

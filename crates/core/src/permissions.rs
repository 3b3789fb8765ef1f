//! Permission checks against the current session.
//!
//! Pure functions of `(session, static table)`. There is no active session
//! everywhere `None` is passed, and absence always means *deny*, never an
//! error -- view code queries these before rendering protected routes and
//! action buttons, and a missing session must simply hide them.

use std::collections::HashSet;

use crate::roles::{permissions_for_role, ROLE_SUPER_ADMIN};
use crate::session::Session;

/// The resolved capability set of a session.
///
/// The backend's explicit permission list is authoritative when non-empty;
/// otherwise the set is the union of the static table's entries for every
/// role held. Roles without a table entry contribute nothing.
pub fn effective_permissions(session: &Session) -> HashSet<String> {
    if !session.permissions.is_empty() {
        return session.permissions.iter().cloned().collect();
    }
    session
        .user
        .roles
        .iter()
        .flat_map(|role| permissions_for_role(role))
        .map(|p| p.to_string())
        .collect()
}

fn is_super_admin(session: &Session) -> bool {
    session.has_role(ROLE_SUPER_ADMIN)
}

/// Can this session exercise `permission`?
///
/// Super-admins pass unconditionally, even for permissions absent from
/// their explicit list.
pub fn has_permission(session: Option<&Session>, permission: &str) -> bool {
    let Some(session) = session else {
        return false;
    };
    if is_super_admin(session) {
        return true;
    }
    effective_permissions(session).contains(permission)
}

/// True if at least one of `permissions` is held.
pub fn has_any_permission(session: Option<&Session>, permissions: &[&str]) -> bool {
    let Some(session) = session else {
        return false;
    };
    if is_super_admin(session) {
        return true;
    }
    let effective = effective_permissions(session);
    permissions.iter().any(|p| effective.contains(*p))
}

/// True if every one of `permissions` is held.
pub fn has_all_permissions(session: Option<&Session>, permissions: &[&str]) -> bool {
    let Some(session) = session else {
        return false;
    };
    if is_super_admin(session) {
        return true;
    }
    let effective = effective_permissions(session);
    permissions.iter().all(|p| effective.contains(*p))
}

/// Exact role-membership test. No super-admin short-circuit.
pub fn has_role(session: Option<&Session>, role: &str) -> bool {
    session.is_some_and(|s| s.has_role(role))
}

/// True if at least one of `roles` is held. No super-admin short-circuit.
pub fn has_any_role(session: Option<&Session>, roles: &[&str]) -> bool {
    session.is_some_and(|s| roles.iter().any(|r| s.has_role(r)))
}

//! Navigation-tree filtering by permission.

use serde::{Deserialize, Serialize};

use crate::permissions::{has_all_permissions, has_any_permission};
use crate::roles::ROLE_SUPER_ADMIN;
use crate::session::Session;

/// One entry in a portal's navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub label: String,
    pub route: String,
    /// Permissions gating this entry. Empty means always visible.
    #[serde(default)]
    pub required_permissions: Vec<String>,
    /// When true, all of `required_permissions` must be held; otherwise any
    /// one suffices.
    #[serde(default)]
    pub require_all: bool,
    #[serde(default)]
    pub children: Vec<NavItem>,
}

/// The subtree of `items` visible to the current user.
///
/// Super-admins see everything. Unannotated items are always kept. A child
/// is only considered when its parent is visible: an invisible parent
/// cannot expose a visible child in a tree rendering.
pub fn filter_nav_items(session: Option<&Session>, items: &[NavItem]) -> Vec<NavItem> {
    if session.is_some_and(|s| s.has_role(ROLE_SUPER_ADMIN)) {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item_visible(session, item))
        .map(|item| NavItem {
            children: filter_nav_items(session, &item.children),
            ..item.clone()
        })
        .collect()
}

fn item_visible(session: Option<&Session>, item: &NavItem) -> bool {
    if item.required_permissions.is_empty() {
        return true;
    }
    let required: Vec<&str> = item.required_permissions.iter().map(String::as_str).collect();
    if item.require_all {
        has_all_permissions(session, &required)
    } else {
        has_any_permission(session, &required)
    }
}

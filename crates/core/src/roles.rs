//! Well-known role and permission name constants, plus the static
//! role→permission fallback table.
//!
//! The table is the client-side mirror of the backend's role seed data. It
//! is consulted only when the backend does not send an explicit permission
//! list with the session; an explicit list always wins.

/// Satisfies every permission check unconditionally.
pub const ROLE_SUPER_ADMIN: &str = "SUPER_ADMIN";
pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_CUSTOMER: &str = "CUSTOMER";
pub const ROLE_FRAUD_ANALYST: &str = "FRAUD_ANALYST";
pub const ROLE_KYC_OFFICER: &str = "KYC_OFFICER";
pub const ROLE_SUPPORT: &str = "SUPPORT";

pub const PERM_ACCOUNT_READ: &str = "ACCOUNT_READ";
pub const PERM_ACCOUNT_WRITE: &str = "ACCOUNT_WRITE";
pub const PERM_TXN_READ: &str = "TXN_READ";
pub const PERM_TRANSFER_CREATE: &str = "TRANSFER_CREATE";
pub const PERM_FRAUD_READ: &str = "FRAUD_READ";
pub const PERM_FRAUD_REVIEW: &str = "FRAUD_REVIEW";
pub const PERM_KYC_READ: &str = "KYC_READ";
pub const PERM_KYC_REVIEW: &str = "KYC_REVIEW";
pub const PERM_USER_READ: &str = "USER_READ";
pub const PERM_USER_MANAGE: &str = "USER_MANAGE";

/// Static role → permission table. Never mutated at runtime.
///
/// [`ROLE_SUPER_ADMIN`] has no entry on purpose: it bypasses permission
/// checks entirely rather than enumerating them.
pub const ROLE_PERMISSIONS: &[(&str, &[&str])] = &[
    (
        ROLE_CUSTOMER,
        &[PERM_ACCOUNT_READ, PERM_TXN_READ, PERM_TRANSFER_CREATE],
    ),
    (
        ROLE_ADMIN,
        &[
            PERM_ACCOUNT_READ,
            PERM_ACCOUNT_WRITE,
            PERM_TXN_READ,
            PERM_USER_READ,
            PERM_USER_MANAGE,
        ],
    ),
    (
        ROLE_FRAUD_ANALYST,
        &[PERM_ACCOUNT_READ, PERM_TXN_READ, PERM_FRAUD_READ, PERM_FRAUD_REVIEW],
    ),
    (ROLE_KYC_OFFICER, &[PERM_KYC_READ, PERM_KYC_REVIEW]),
    (ROLE_SUPPORT, &[PERM_ACCOUNT_READ, PERM_USER_READ]),
];

/// Permissions granted by `role`, or an empty slice for unknown roles.
///
/// Unknown roles are not an error: the backend may introduce roles this
/// client has never heard of, and they simply grant nothing here.
pub fn permissions_for_role(role: &str) -> &'static [&'static str] {
    ROLE_PERMISSIONS
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, perms)| *perms)
        .unwrap_or(&[])
}

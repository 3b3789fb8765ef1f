//! Pure domain types shared by the bankline portal clients.
//!
//! Everything in this crate is a function of in-memory data: session and
//! credential shapes, the static role→permission table, permission checks,
//! and navigation-tree filtering. No I/O lives here -- the HTTP side is in
//! `bankline-client`.

pub mod nav;
pub mod permissions;
pub mod roles;
pub mod session;

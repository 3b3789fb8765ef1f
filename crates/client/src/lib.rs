//! HTTP client core shared by the bankline portals.
//!
//! The interesting pieces are [`http::PortalClient`] (attaches bearer
//! credentials, recovers from expired access tokens via a single refresh,
//! and fires the session-expired hook when recovery is impossible) and
//! [`store::SessionStore`] (the injectable durable storage behind it).
//! Permission logic lives in `bankline-core` and never touches the network.

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod store;

pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{PortalClient, SessionHooks};
pub use store::{FileStore, MemoryStore, SessionStore};

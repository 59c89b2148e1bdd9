//! Imena - client for the cooperative contributions API.
//!
//! `gateway` is the authenticated request pipeline, `api` the typed
//! endpoints on top of it, `session` the login lifecycle and `views` the
//! screen-level data (member aggregation, verify toggles, income stats).

pub mod api;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod session;
pub mod store;
pub mod views;

pub use errors::GatewayError;
pub use gateway::{ApiClient, CancelToken, GatewayRequest};
pub use session::{Session, SessionState};

//! Typed operations over the Imena REST API.
//!
//! Each endpoint has a request constructor (so views can issue it with a
//! cancel token) and an `ApiClient` method that issues it and decodes the
//! endpoint's schema.

pub mod auth;
pub mod contributions;
pub mod cooperatives;
pub mod income;

pub mod auth;
pub mod contribution;
pub mod cooperative;
pub mod income;
pub mod user;

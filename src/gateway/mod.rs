pub mod cancel;
pub mod client;
pub mod error_shape;
pub mod request;

pub use cancel::CancelToken;
pub use client::ApiClient;
pub use request::GatewayRequest;

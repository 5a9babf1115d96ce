// homgar-api: Async Rust client for the HomGar / RainPoint cloud API.
//
// Layers, leaf first: token store -> auth session -> transport adapter
// (`ApiClient`) -> raw endpoint methods. Domain normalization lives in
// `homgar-core`.

pub mod api;
pub mod auth;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod request;
pub mod session;
pub mod store;
pub mod token;
pub mod transport;

pub use api::ApiClient;
pub use auth::Credentials;
pub use client::{HomgarClient, VendorCodes};
pub use error::Error;
pub use request::ApiRequest;
pub use session::AuthSession;
pub use store::{CacheError, FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::TokenBundle;
pub use transport::{TlsMode, TransportConfig};

/// Default cloud endpoint used by the vendor's mobile app.
pub const DEFAULT_BASE_URL: &str = "https://region3.homgarus.com";

// basislink-api: Async GraphQL client for the Basis switchboard cloud

pub mod auth;
pub mod client;
pub mod error;
mod graphql;
pub mod transport;
pub mod types;

pub use auth::{OAuthSession, StaticToken, TokenProvider};
pub use client::PanelClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};

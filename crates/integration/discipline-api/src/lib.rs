//! # Discipline API Client
//!
//! HTTP access to the discipline and project collections, plus the OAuth2
//! password grant used to authorize project reads.
//!
//! ```ignore
//! use discipline_api::{DisciplineApi, RestClient};
//! use discipline_config::ApiConfig;
//!
//! let client = RestClient::new(ApiConfig::load(None)?)?;
//! let token = client.fetch_token().await?;
//! let projects = client.list_projects(&token).await?;
//! ```

pub mod client;
pub mod remote;
pub mod wire;

#[cfg(feature = "mock")]
pub mod mock;

pub use client::RestClient;
pub use remote::DisciplineApi;

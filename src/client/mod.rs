//! Client side of the template: a typed API client plus the connection
//! status screen that the `status-client` binary drives.

pub mod api;
pub mod status;

pub use api::{ApiClient, ApiError, HelloSource};
pub use status::{ConnectionState, ConnectionStatus};

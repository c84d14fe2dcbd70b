//! Client side of the catalogue: HTTP transport, wire normalization and the
//! shared catalog store that views subscribe to.

pub mod api;
pub mod store;
pub mod wire;

pub use api::{CatalogApi, ClientError, HttpCatalogApi};
pub use store::{CatalogStore, LoadState, Snapshot};

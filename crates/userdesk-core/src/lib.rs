//! userdesk-core - client-side synchronization for a remote users collection.
//!
//! - `api`: `UserApi` trait and the reqwest-backed `ApiClient`
//! - `form`: flat `FormState`, mapping to and from `UserRecord`, validation
//! - `cache`: `QueryCache` with request de-duplication and invalidation
//! - `mutation`: `UserMutations`, writes followed by cache invalidation
//! - `config`: base URL and timeout settings

pub mod api;
pub mod cache;
pub mod config;
pub mod form;
pub mod models;
pub mod mutation;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, ApiError, ErrorInfo, ErrorKind, UserApi};
pub use cache::{CacheData, CacheEntry, CacheStatus, QueryCache, QueryKey};
pub use config::Config;
pub use form::{to_form_state, to_wire_payload, validate, FieldErrors, FormField, FormState};
pub use models::{Address, Geo, UserPayload, UserRecord};
pub use mutation::{MutationError, UserMutations};

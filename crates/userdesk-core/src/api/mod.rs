//! REST client for the remote `/users` collection.
//!
//! This module provides the `UserApi` trait the cache and mutation layers
//! depend on, and `ApiClient`, its JSON-over-HTTP implementation.
//!
//! The client owns no state beyond its connection pool and never touches
//! the cache.

pub mod client;
pub mod error;

use async_trait::async_trait;

use crate::models::{CreatePayload, UpdatePayload, UserRecord};

pub use client::ApiClient;
pub use error::{ApiError, ErrorInfo, ErrorKind};

/// The five operations of the remote collection.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// `GET /users`
    async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError>;

    /// `GET /users/{id}`; `NotFound` when the id does not exist.
    async fn get_user(&self, id: &str) -> Result<UserRecord, ApiError>;

    /// `POST /users`; the server assigns the id.
    async fn create_user(&self, payload: &CreatePayload) -> Result<UserRecord, ApiError>;

    /// `PUT /users/{id}` with full-replace semantics.
    async fn update_user(&self, payload: &UpdatePayload) -> Result<UserRecord, ApiError>;

    /// `DELETE /users/{id}`. A missing id counts as deleted.
    async fn delete_user(&self, id: &str) -> Result<(), ApiError>;
}
